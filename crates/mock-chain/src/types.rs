//! RPC-compatible types for the mock chain.
//!
//! These types are JSON-serializable versions of the core market types.
//! Addresses and asset ledgers are hex-encoded strings; a currency is
//! either the string `"native"` or a hex-encoded token address.

use market_types::{Address, AssetId, Auction, Currency, Listing, MarketEvent};
use serde::{Deserialize, Serialize};

/// Genesis configuration for RPC.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenesisConfigRpc {
    pub admin: Option<String>,
    #[serde(default)]
    pub minters: Vec<String>,
    #[serde(default)]
    pub native_balances: Vec<BalanceRpc>,
    #[serde(default)]
    pub tokens: Vec<TokenGenesisRpc>,
    /// Auction window in seconds; the default 3-day window when absent.
    pub auction_duration: Option<u64>,
    pub initial_timestamp: Option<u64>,
}

/// One account's balance for RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRpc {
    pub address: String,
    pub amount: u64,
}

/// One token ledger's genesis balances for RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGenesisRpc {
    pub token: String,
    #[serde(default)]
    pub balances: Vec<BalanceRpc>,
}

/// Block info response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
    pub timestamp: u64,
}

// ============ Call Parameters ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemParams {
    pub sender: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItemParams {
    pub sender: String,
    pub asset_id: AssetId,
    pub price: u64,
    /// `"native"` or a hex token address
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyItemParams {
    pub sender: String,
    pub asset_id: AssetId,
    /// Attached native value
    #[serde(default)]
    pub value: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAuctionParams {
    pub sender: String,
    pub asset_id: AssetId,
    pub starting_price: u64,
    pub min_step: u64,
    /// `"native"` or a hex token address
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeBidParams {
    pub sender: String,
    pub asset_id: AssetId,
    pub amount: u64,
    /// Attached native value
    #[serde(default)]
    pub value: u64,
}

/// Parameters for calls identified by sender and asset alone
/// (cancel listing, finish auction, cancel auction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemActionParams {
    pub sender: String,
    pub asset_id: AssetId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantRoleParams {
    pub sender: String,
    /// Role name, e.g. `"MINTER"`
    pub role: String,
    pub account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundNativeParams {
    pub address: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintTokenParams {
    pub token: String,
    pub address: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveParams {
    pub sender: String,
    pub token: String,
    /// Amount the market vault may pull from the sender
    pub amount: u64,
}

// ============ Responses ============

/// Listing for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRpc {
    pub asset_id: AssetId,
    pub seller: String,
    pub currency: String,
    pub price: u64,
}

impl ListingRpc {
    pub fn from_listing(asset_id: AssetId, listing: &Listing) -> Self {
        Self {
            asset_id,
            seller: hex::encode(listing.seller),
            currency: format_currency(&listing.currency),
            price: listing.price,
        }
    }
}

/// Auction for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionRpc {
    pub asset_id: AssetId,
    pub seller: String,
    pub currency: String,
    pub current_bid: u64,
    pub min_step: u64,
    pub bid_count: u32,
    pub highest_bidder: Option<String>,
    pub start_time: u64,
    pub end_time: u64,
}

impl AuctionRpc {
    pub fn from_auction(asset_id: AssetId, auction: &Auction) -> Self {
        Self {
            asset_id,
            seller: hex::encode(auction.seller),
            currency: format_currency(&auction.currency),
            current_bid: auction.current_bid,
            min_step: auction.min_step,
            bid_count: auction.bid_count,
            highest_bidder: auction.highest_bidder.map(hex::encode),
            start_time: auction.start_time,
            end_time: auction.end_time,
        }
    }
}

/// Flat event representation for RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEventRpc {
    pub kind: String,
    pub asset_id: AssetId,
    /// Owner, seller, buyer, bidder or winner depending on `kind`
    pub actor: String,
    pub currency: Option<String>,
    pub amount: Option<u64>,
    pub step: Option<u64>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub timestamp: Option<u64>,
}

impl From<&MarketEvent> for MarketEventRpc {
    fn from(event: &MarketEvent) -> Self {
        let blank = |kind: &str, asset_id: AssetId, actor: &Address| Self {
            kind: kind.to_string(),
            asset_id,
            actor: hex::encode(actor),
            currency: None,
            amount: None,
            step: None,
            start_time: None,
            end_time: None,
            timestamp: None,
        };

        match event {
            MarketEvent::CreateItem { owner, asset_id } => blank("CreateItem", *asset_id, owner),
            MarketEvent::ListItem {
                seller,
                asset_id,
                currency,
                price,
            } => Self {
                currency: Some(format_currency(currency)),
                amount: Some(*price),
                ..blank("ListItem", *asset_id, seller)
            },
            MarketEvent::BuyItem {
                buyer,
                price,
                asset_id,
            } => Self {
                amount: Some(*price),
                ..blank("BuyItem", *asset_id, buyer)
            },
            MarketEvent::CancelListing { seller, asset_id } => {
                blank("CancelListing", *asset_id, seller)
            }
            MarketEvent::ListItemOnAuction {
                seller,
                currency,
                asset_id,
                starting_price,
                step,
                start_time,
                end_time,
            } => Self {
                currency: Some(format_currency(currency)),
                amount: Some(*starting_price),
                step: Some(*step),
                start_time: Some(*start_time),
                end_time: Some(*end_time),
                ..blank("ListItemOnAuction", *asset_id, seller)
            },
            MarketEvent::MakeBid {
                bidder,
                asset_id,
                amount,
            } => Self {
                amount: Some(*amount),
                ..blank("MakeBid", *asset_id, bidder)
            },
            MarketEvent::FinishAuction {
                winner,
                asset_id,
                amount,
                timestamp,
            } => Self {
                amount: Some(*amount),
                timestamp: Some(*timestamp),
                ..blank("FinishAuction", *asset_id, winner)
            },
            MarketEvent::CancelAuction {
                seller,
                asset_id,
                timestamp,
            } => Self {
                timestamp: Some(*timestamp),
                ..blank("CancelAuction", *asset_id, seller)
            },
        }
    }
}

// ============ Parsing helpers ============

/// Parse a hex address, with or without `0x` prefix. Shorter inputs are
/// zero-padded at the end.
pub fn parse_address(s: &str) -> Result<Address, String> {
    let bytes =
        hex::decode(s.trim_start_matches("0x")).map_err(|e| format!("Invalid address hex: {e}"))?;
    if bytes.len() > 32 {
        return Err(format!("Address too long: {} bytes", bytes.len()));
    }
    let mut addr = [0u8; 32];
    addr[..bytes.len()].copy_from_slice(&bytes);
    Ok(addr)
}

/// Parse `"native"` or a hex token address.
pub fn parse_currency(s: &str) -> Result<Currency, String> {
    if s == "native" {
        Ok(Currency::Native)
    } else {
        parse_address(s).map(Currency::Token)
    }
}

pub fn format_currency(currency: &Currency) -> String {
    match currency {
        Currency::Native => "native".to_string(),
        Currency::Token(token) => hex::encode(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_pads_short_input() {
        let addr = parse_address("0xff").unwrap();
        assert_eq!(addr[0], 0xff);
        assert_eq!(addr[1..], [0u8; 31]);
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("native").unwrap(), Currency::Native);
        let token = parse_currency(&hex::encode([7u8; 32])).unwrap();
        assert_eq!(token, Currency::Token([7u8; 32]));
        assert!(parse_currency("not-hex").is_err());
    }

    #[test]
    fn test_currency_round_trip() {
        for currency in [Currency::Native, Currency::Token([9u8; 32])] {
            assert_eq!(parse_currency(&format_currency(&currency)).unwrap(), currency);
        }
    }
}
