//! Core type definitions for the NFT market.
//!
//! This crate provides the shared data structures used across the market
//! system: account and asset identifiers, the payment currency variants,
//! listing and auction records, and the observable event log entries.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

// =========================
// IDENTIFIERS
// =========================

/// Generic address type (32 bytes)
pub type Address = [u8; 32];

/// Asset identifier, assigned sequentially starting at 0
pub type AssetId = u64;

/// Account under which the market holds custody: assets under an active
/// sale are owned by it, and escrowed funds are banked under it.
pub const MARKET_VAULT: Address = *b"nft-market/custody-vault________";

// =========================
// PAYMENT CURRENCY
// =========================

/// Payment rail for a listing or auction, fixed at creation time.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize,
    Deserialize,
)]
pub enum Currency {
    /// Settle in the native value transfer attached to the call
    Native,
    /// Settle in the fungible token ledger at the given address
    Token(Address),
}

impl Currency {
    pub fn is_native(&self) -> bool {
        matches!(self, Currency::Native)
    }
}

// =========================
// SALE RECORDS
// =========================

/// A fixed-price listing. Exists iff the asset is currently offered
/// at a fixed price.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Listing {
    pub seller: Address,
    pub currency: Currency,
    pub price: u64,
}

/// A live English auction. Exists iff the asset is currently under auction.
///
/// `current_bid` is the seller's starting price until the first bid is
/// accepted, after which it is the highest accepted bid. The accept
/// threshold for every bid is `current_bid + min_step`.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Auction {
    pub seller: Address,
    pub currency: Currency,
    pub current_bid: u64,
    pub min_step: u64,
    pub bid_count: u32,
    pub highest_bidder: Option<Address>,
    pub start_time: u64,
    pub end_time: u64,
}

impl Auction {
    /// Whether the bidding window is still open at `now`.
    pub fn is_open(&self, now: u64) -> bool {
        now < self.end_time
    }
}

// =========================
// EVENTS
// =========================

/// Observable market events, appended to the state's log for external
/// indexing. Never used for internal control flow.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum MarketEvent {
    CreateItem {
        owner: Address,
        asset_id: AssetId,
    },
    ListItem {
        seller: Address,
        asset_id: AssetId,
        currency: Currency,
        price: u64,
    },
    BuyItem {
        buyer: Address,
        price: u64,
        asset_id: AssetId,
    },
    CancelListing {
        seller: Address,
        asset_id: AssetId,
    },
    ListItemOnAuction {
        seller: Address,
        currency: Currency,
        asset_id: AssetId,
        starting_price: u64,
        step: u64,
        start_time: u64,
        end_time: u64,
    },
    MakeBid {
        bidder: Address,
        asset_id: AssetId,
        amount: u64,
    },
    /// `winner` is the seller and `amount` is zero when the auction
    /// failed to sell.
    FinishAuction {
        winner: Address,
        asset_id: AssetId,
        amount: u64,
        timestamp: u64,
    },
    CancelAuction {
        seller: Address,
        asset_id: AssetId,
        timestamp: u64,
    },
}

// =========================
// ROLES
// =========================

/// Role identifier for capability checks (32 bytes)
pub type Role = [u8; 32];

/// Role allowed to mint new assets
pub const MINTER_ROLE_NAME: &str = "MINTER";

/// Role allowed to grant other roles
pub const ADMIN_ROLE_NAME: &str = "ADMIN";

/// Compute the identifier for a named role.
pub fn role_id(name: &str) -> Role {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(b"MARKET_ROLE_V1:");
    hasher.update(name.as_bytes());
    hasher.finalize().into()
}

pub fn minter_role() -> Role {
    role_id(MINTER_ROLE_NAME)
}

pub fn admin_role() -> Role {
    role_id(ADMIN_ROLE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ids_distinct() {
        assert_ne!(minter_role(), admin_role());
        assert_eq!(role_id("MINTER"), minter_role());
    }

    #[test]
    fn test_vault_is_not_a_default_address() {
        assert_ne!(MARKET_VAULT, [0u8; 32]);
    }

    #[test]
    fn test_currency_serialization() {
        let token = Currency::Token([7u8; 32]);
        let encoded = borsh::to_vec(&token).unwrap();
        let decoded: Currency = borsh::from_slice(&encoded).unwrap();
        assert_eq!(token, decoded);
        assert!(!token.is_native());
        assert!(Currency::Native.is_native());
    }

    #[test]
    fn test_auction_window() {
        let auction = Auction {
            seller: [1u8; 32],
            currency: Currency::Native,
            current_bid: 100,
            min_step: 10,
            bid_count: 0,
            highest_bidder: None,
            start_time: 1000,
            end_time: 2000,
        };
        assert!(auction.is_open(1999));
        assert!(!auction.is_open(2000));
    }
}
