//! In-memory ownership provider for market assets.
//!
//! Tracks which address owns each asset and the asset's metadata URI.
//! Custody handover during a sale is an ordinary transfer to or from
//! [`MARKET_VAULT`](market_types::MARKET_VAULT).

use crate::error::MarketError;
use market_types::{Address, AssetId};
use std::collections::HashMap;

/// Asset ownership registry.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    /// Next asset ID to assign
    next_asset_id: AssetId,

    /// Current owner per asset
    owners: HashMap<AssetId, Address>,

    /// Metadata URI per asset
    uris: HashMap<AssetId, String>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new asset to `to` and return its id. Ids are sequential
    /// starting at 0.
    pub fn mint(&mut self, to: Address, uri: String) -> AssetId {
        let asset_id = self.next_asset_id;
        self.next_asset_id += 1;
        self.owners.insert(asset_id, to);
        self.uris.insert(asset_id, uri);
        asset_id
    }

    /// Current owner of an asset.
    pub fn owner_of(&self, asset_id: AssetId) -> Option<Address> {
        self.owners.get(&asset_id).copied()
    }

    /// Metadata URI of an asset.
    pub fn token_uri(&self, asset_id: AssetId) -> Option<&str> {
        self.uris.get(&asset_id).map(String::as_str)
    }

    /// Number of assets minted so far.
    pub fn asset_count(&self) -> u64 {
        self.next_asset_id
    }

    /// Transfer an asset. `from` must be the current owner.
    pub fn transfer(
        &mut self,
        asset_id: AssetId,
        from: Address,
        to: Address,
    ) -> Result<(), MarketError> {
        let owner = self
            .owners
            .get_mut(&asset_id)
            .ok_or(MarketError::AssetNotFound(asset_id))?;
        if *owner != from {
            return Err(MarketError::NotOwner);
        }
        *owner = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_assigns_sequential_ids() {
        let mut assets = AssetRegistry::new();
        assert_eq!(assets.mint([1u8; 32], "uri-0".into()), 0);
        assert_eq!(assets.mint([1u8; 32], "uri-1".into()), 1);
        assert_eq!(assets.mint([2u8; 32], "uri-2".into()), 2);
        assert_eq!(assets.asset_count(), 3);
        assert_eq!(assets.token_uri(1), Some("uri-1"));
    }

    #[test]
    fn test_transfer_requires_current_owner() {
        let mut assets = AssetRegistry::new();
        let alice = [1u8; 32];
        let bob = [2u8; 32];

        let id = assets.mint(alice, "uri".into());
        assert_eq!(assets.owner_of(id), Some(alice));

        assert_eq!(
            assets.transfer(id, bob, alice),
            Err(MarketError::NotOwner)
        );

        assets.transfer(id, alice, bob).unwrap();
        assert_eq!(assets.owner_of(id), Some(bob));
    }

    #[test]
    fn test_transfer_unknown_asset() {
        let mut assets = AssetRegistry::new();
        assert_eq!(
            assets.transfer(9, [1u8; 32], [2u8; 32]),
            Err(MarketError::AssetNotFound(9))
        );
    }
}
