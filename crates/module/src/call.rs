//! Call message types for the market module.

use borsh::{BorshDeserialize, BorshSerialize};
use market_types::{Address, AssetId, Currency, Role};

/// Call messages for the market module.
///
/// One variant per public operation; the borsh encoding of this enum is
/// the module's canonical transaction format. Submission order of applied
/// calls is the total order of effects per asset.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum MarketCall {
    // === Minting ===
    /// Mint a new asset to the caller (minter role required).
    CreateItem { uri: String },

    // === Fixed-price listings ===
    /// Offer an owned asset at a fixed price.
    ListItem {
        asset_id: AssetId,
        price: u64,
        currency: Currency,
    },

    /// Buy an actively listed asset.
    BuyItem { asset_id: AssetId },

    /// Withdraw a listing (seller only).
    CancelListing { asset_id: AssetId },

    // === Auctions ===
    /// Put an owned asset under a timed auction.
    ListItemOnAuction {
        asset_id: AssetId,
        starting_price: u64,
        min_step: u64,
        currency: Currency,
    },

    /// Bid on a live auction. Payment of exactly `amount` is collected.
    MakeBid { asset_id: AssetId, amount: u64 },

    /// Settle an auction whose window has elapsed (anyone).
    FinishAuction { asset_id: AssetId },

    /// Withdraw a live auction before its window elapses (seller only).
    CancelAuction { asset_id: AssetId },

    // === Admin ===
    /// Grant a role (admin only).
    GrantRole { role: Role, account: Address },
}
