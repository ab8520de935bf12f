//! Query handlers for the market module.
//!
//! These functions provide read-only access to market state.

use crate::state::MarketState;
use market_types::{Address, AssetId, Auction, Currency, Listing, MarketEvent};
use serde::{Deserialize, Serialize};

/// Query request types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MarketQuery {
    /// Get the current owner of an asset.
    GetOwner { asset_id: AssetId },

    /// Get the metadata URI of an asset.
    GetTokenUri { asset_id: AssetId },

    /// Get the active listing for an asset, if any.
    GetListing { asset_id: AssetId },

    /// Get the active auction for an asset, if any.
    GetAuction { asset_id: AssetId },

    /// Get the current auction price: the starting price until the first
    /// bid, the highest accepted bid after.
    GetCurrentAuctionPrice { asset_id: AssetId },

    /// Get all active listings (paginated).
    ListListings { offset: u64, limit: u64 },

    /// Get all active auctions (paginated).
    ListAuctions { offset: u64, limit: u64 },

    /// Get an account's native balance.
    GetNativeBalance { address: Address },

    /// Get an account's balance on a token ledger.
    GetTokenBalance { token: Address, address: Address },

    /// Get the event log (paginated).
    GetEvents { offset: u64, limit: u64 },
}

/// Query response types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MarketQueryResponse {
    Owner(Option<Address>),
    TokenUri(Option<String>),
    Listing(Option<Listing>),
    Auction(Option<Auction>),
    CurrentAuctionPrice(Option<u64>),
    Listings(Vec<(AssetId, Listing)>),
    Auctions(Vec<(AssetId, Auction)>),
    Balance(u64),
    Events(Vec<MarketEvent>),
}

/// Handle a query.
pub fn handle_query(state: &MarketState, query: MarketQuery) -> MarketQueryResponse {
    match query {
        MarketQuery::GetOwner { asset_id } => {
            MarketQueryResponse::Owner(state.assets.owner_of(asset_id))
        }

        MarketQuery::GetTokenUri { asset_id } => {
            MarketQueryResponse::TokenUri(state.assets.token_uri(asset_id).map(str::to_string))
        }

        MarketQuery::GetListing { asset_id } => {
            MarketQueryResponse::Listing(state.get_listing(asset_id).cloned())
        }

        MarketQuery::GetAuction { asset_id } => {
            MarketQueryResponse::Auction(state.get_auction(asset_id).cloned())
        }

        MarketQuery::GetCurrentAuctionPrice { asset_id } => {
            MarketQueryResponse::CurrentAuctionPrice(current_auction_price(state, asset_id))
        }

        MarketQuery::ListListings { offset, limit } => {
            let mut listings: Vec<(AssetId, Listing)> = state
                .listings
                .iter()
                .map(|(id, listing)| (*id, listing.clone()))
                .collect();
            listings.sort_by_key(|(id, _)| *id);
            MarketQueryResponse::Listings(
                listings
                    .into_iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .collect(),
            )
        }

        MarketQuery::ListAuctions { offset, limit } => {
            let mut auctions: Vec<(AssetId, Auction)> = state
                .auctions
                .iter()
                .map(|(id, auction)| (*id, auction.clone()))
                .collect();
            auctions.sort_by_key(|(id, _)| *id);
            MarketQueryResponse::Auctions(
                auctions
                    .into_iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .collect(),
            )
        }

        MarketQuery::GetNativeBalance { address } => {
            MarketQueryResponse::Balance(state.bank.native_balance(&address))
        }

        MarketQuery::GetTokenBalance { token, address } => {
            MarketQueryResponse::Balance(state.bank.token_balance(&token, &address))
        }

        MarketQuery::GetEvents { offset, limit } => MarketQueryResponse::Events(
            state
                .events
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        ),
    }
}

/// Current auction price for an asset: the starting price until the
/// first accepted bid, the highest accepted bid after.
pub fn current_auction_price(state: &MarketState, asset_id: AssetId) -> Option<u64> {
    state.get_auction(asset_id).map(|a| a.current_bid)
}

/// Summary of an auction for listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuctionSummary {
    pub asset_id: AssetId,
    pub seller: Address,
    pub currency: Currency,
    pub current_bid: u64,
    pub bid_count: u32,
    pub end_time: u64,
}

impl AuctionSummary {
    fn from_auction(asset_id: AssetId, auction: &Auction) -> Self {
        Self {
            asset_id,
            seller: auction.seller,
            currency: auction.currency,
            current_bid: auction.current_bid,
            bid_count: auction.bid_count,
            end_time: auction.end_time,
        }
    }
}

/// Get auctions still accepting bids at `now`.
pub fn live_auctions(state: &MarketState, now: u64) -> Vec<AuctionSummary> {
    let mut live: Vec<AuctionSummary> = state
        .auctions
        .iter()
        .filter(|(_, auction)| auction.is_open(now))
        .map(|(id, auction)| AuctionSummary::from_auction(*id, auction))
        .collect();
    live.sort_by_key(|summary| summary.asset_id);
    live
}

/// Get auctions whose window has elapsed and that await settlement.
pub fn finishable_auctions(state: &MarketState, now: u64) -> Vec<AssetId> {
    let mut ready: Vec<AssetId> = state
        .auctions
        .iter()
        .filter(|(_, auction)| !auction.is_open(now))
        .map(|(id, _)| *id)
        .collect();
    ready.sort_unstable();
    ready
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auction(end_time: u64) -> Auction {
        Auction {
            seller: [1u8; 32],
            currency: Currency::Native,
            current_bid: 100,
            min_step: 10,
            bid_count: 0,
            highest_bidder: None,
            start_time: 0,
            end_time,
        }
    }

    #[test]
    fn test_current_price_query() {
        let mut state = MarketState::new();
        state.auctions.insert(7, auction(1000));

        let response = handle_query(&state, MarketQuery::GetCurrentAuctionPrice { asset_id: 7 });
        assert!(matches!(
            response,
            MarketQueryResponse::CurrentAuctionPrice(Some(100))
        ));

        let response = handle_query(&state, MarketQuery::GetCurrentAuctionPrice { asset_id: 8 });
        assert!(matches!(
            response,
            MarketQueryResponse::CurrentAuctionPrice(None)
        ));
    }

    #[test]
    fn test_live_and_finishable_split() {
        let mut state = MarketState::new();
        state.auctions.insert(1, auction(500));
        state.auctions.insert(2, auction(2000));

        let live = live_auctions(&state, 1000);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].asset_id, 2);

        assert_eq!(finishable_auctions(&state, 1000), vec![1]);
    }

    #[test]
    fn test_balance_query_defaults_to_zero() {
        let state = MarketState::new();
        let response = handle_query(
            &state,
            MarketQuery::GetNativeBalance { address: [9u8; 32] },
        );
        assert!(matches!(response, MarketQueryResponse::Balance(0)));
    }
}
