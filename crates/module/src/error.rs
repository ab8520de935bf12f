//! Market module error types.

use thiserror::Error;

use market_types::AssetId;

/// Errors that can occur in the market module.
///
/// Every error aborts the whole call with no state change; the messages
/// are the stable reason strings surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketError {
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    #[error("Caller is not the owner")]
    NotOwner,

    #[error("Item is already listed")]
    AlreadyListed,

    #[error("Item is not selling")]
    NotSelling,

    #[error("Auction is not active")]
    AuctionNotActive,

    #[error("Not enough funds sent: need {required}, got {got}")]
    InsufficientFunds { required: u64, got: u64 },

    #[error("Bid below threshold: need {required}, got {got}")]
    InsufficientBid { required: u64, got: u64 },

    #[error("Auction is over")]
    AuctionOver,

    #[error("Auction is not over yet")]
    AuctionNotOver,

    #[error("Auction is already finished")]
    AuctionAlreadyFinished,

    #[error("Price and step must be nonzero")]
    InvalidPrice,
}
