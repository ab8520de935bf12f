//! In-memory state for the market module.

use crate::assets::AssetRegistry;
use crate::bank::Bank;
use crate::genesis::MarketParams;
use market_types::{Address, AssetId, Auction, Listing, MarketEvent, Role};
use std::collections::{HashMap, HashSet};

/// Market module state.
///
/// The listing and auction maps are the only records of an active sale:
/// a record exists iff the sale is active, and at most one of the two
/// exists per asset at any time.
#[derive(Debug, Default)]
pub struct MarketState {
    /// Asset ownership and metadata
    pub assets: AssetRegistry,

    /// Native and token ledgers, including vault escrow
    pub bank: Bank,

    /// Active fixed-price listings by asset id
    pub listings: HashMap<AssetId, Listing>,

    /// Active auctions by asset id
    pub auctions: HashMap<AssetId, Auction>,

    /// Capability sets by role id
    pub roles: HashMap<Role, HashSet<Address>>,

    /// Market parameters fixed at genesis
    pub params: MarketParams,

    /// Observable event log, in emission order
    pub events: Vec<MarketEvent>,
}

impl MarketState {
    /// Create an empty state with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty state with the given parameters.
    pub fn with_params(params: MarketParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Whether the asset has an active listing or auction.
    pub fn is_on_sale(&self, asset_id: AssetId) -> bool {
        self.listings.contains_key(&asset_id) || self.auctions.contains_key(&asset_id)
    }

    /// Get listing by asset id.
    pub fn get_listing(&self, asset_id: AssetId) -> Option<&Listing> {
        self.listings.get(&asset_id)
    }

    /// Get auction by asset id.
    pub fn get_auction(&self, asset_id: AssetId) -> Option<&Auction> {
        self.auctions.get(&asset_id)
    }

    /// Get mutable auction by asset id.
    pub fn get_auction_mut(&mut self, asset_id: AssetId) -> Option<&mut Auction> {
        self.auctions.get_mut(&asset_id)
    }

    /// Whether `who` holds `role`.
    pub fn has_role(&self, role: Role, who: &Address) -> bool {
        self.roles
            .get(&role)
            .map(|members| members.contains(who))
            .unwrap_or(false)
    }

    /// Add `who` to the capability set of `role`.
    pub fn grant_role(&mut self, role: Role, who: Address) {
        self.roles.entry(role).or_default().insert(who);
    }

    /// Append an observable event to the log.
    pub fn record_event(&mut self, event: MarketEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_types::{minter_role, Currency};

    #[test]
    fn test_roles() {
        let mut state = MarketState::new();
        let alice = [1u8; 32];

        assert!(!state.has_role(minter_role(), &alice));
        state.grant_role(minter_role(), alice);
        assert!(state.has_role(minter_role(), &alice));
    }

    #[test]
    fn test_is_on_sale() {
        let mut state = MarketState::new();
        assert!(!state.is_on_sale(0));

        state.listings.insert(
            0,
            Listing {
                seller: [1u8; 32],
                currency: Currency::Native,
                price: 100,
            },
        );
        assert!(state.is_on_sale(0));
        assert!(!state.is_on_sale(1));

        state.auctions.insert(
            1,
            Auction {
                seller: [1u8; 32],
                currency: Currency::Native,
                current_bid: 100,
                min_step: 10,
                bid_count: 0,
                highest_bidder: None,
                start_time: 0,
                end_time: 100,
            },
        );
        assert!(state.is_on_sale(1));
    }

    #[test]
    fn test_event_log_preserves_order() {
        let mut state = MarketState::new();
        state.record_event(MarketEvent::CreateItem {
            owner: [1u8; 32],
            asset_id: 0,
        });
        state.record_event(MarketEvent::CreateItem {
            owner: [1u8; 32],
            asset_id: 1,
        });
        assert_eq!(state.events.len(), 2);
        assert!(matches!(
            state.events[0],
            MarketEvent::CreateItem { asset_id: 0, .. }
        ));
    }
}
