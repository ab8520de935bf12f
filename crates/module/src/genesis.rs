//! Genesis configuration for the market module.
//!
//! Defines the initial state of a run: the admin and minter capability
//! sets, initial native and token balances, and the fixed market
//! parameters.

use crate::state::MarketState;
use market_types::{admin_role, minter_role, Address, MARKET_VAULT};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Fixed auction window: 3 days.
pub const AUCTION_DURATION: u64 = 3 * 24 * 60 * 60;

/// Genesis configuration for the market module.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketGenesisConfig {
    /// Account allowed to grant roles after genesis
    pub admin: Option<Address>,

    /// Accounts allowed to mint assets
    pub minters: Vec<Address>,

    /// Initial native balances
    pub native_balances: Vec<BalanceConfig>,

    /// Token ledgers with their initial balances
    pub tokens: Vec<TokenGenesisConfig>,

    /// Market parameters
    pub params: MarketParams,
}

/// One account's initial balance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub address: Address,
    pub amount: u64,
}

/// Configuration for a single token ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenGenesisConfig {
    /// Ledger address used as the `Currency::Token` tag
    pub token: Address,
    pub balances: Vec<BalanceConfig>,
}

/// Parameters fixed for the lifetime of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    /// Length of every auction window, in seconds
    pub auction_duration: u64,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            auction_duration: AUCTION_DURATION,
        }
    }
}

impl Default for MarketGenesisConfig {
    fn default() -> Self {
        Self {
            admin: None,
            minters: Vec::new(),
            native_balances: Vec::new(),
            tokens: Vec::new(),
            params: MarketParams::default(),
        }
    }
}

impl MarketGenesisConfig {
    /// Validate the genesis configuration.
    pub fn validate(&self) -> Result<(), GenesisValidationError> {
        if self.params.auction_duration == 0 {
            return Err(GenesisValidationError::InvalidParams(
                "Auction duration cannot be zero".into(),
            ));
        }

        let mut seen = HashSet::new();
        for token in &self.tokens {
            if !seen.insert(token.token) {
                return Err(GenesisValidationError::DuplicateToken(hex_id(&token.token)));
            }
        }

        for balance in self.all_balances() {
            if balance.address == MARKET_VAULT {
                return Err(GenesisValidationError::ReservedAddress(hex_id(
                    &balance.address,
                )));
            }
        }

        Ok(())
    }

    /// Build the initial market state from this configuration.
    pub fn initialize(self) -> Result<MarketState, GenesisValidationError> {
        self.validate()?;

        let mut state = MarketState::with_params(self.params);

        if let Some(admin) = self.admin {
            state.grant_role(admin_role(), admin);
        }
        for minter in self.minters {
            state.grant_role(minter_role(), minter);
        }

        for balance in self.native_balances {
            state.bank.deposit_native(balance.address, balance.amount);
        }
        for token in self.tokens {
            for balance in token.balances {
                state
                    .bank
                    .mint_token(token.token, balance.address, balance.amount);
            }
        }

        Ok(state)
    }

    fn all_balances(&self) -> impl Iterator<Item = &BalanceConfig> {
        self.native_balances
            .iter()
            .chain(self.tokens.iter().flat_map(|t| t.balances.iter()))
    }
}

fn hex_id(address: &Address) -> String {
    address.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Errors that can occur during genesis validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenesisValidationError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Duplicate token ledger: {0}")]
    DuplicateToken(String),

    #[error("Reserved address in genesis balances: {0}")]
    ReservedAddress(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketGenesisConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = MarketGenesisConfig {
            params: MarketParams { auction_duration: 0 },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let config = MarketGenesisConfig {
            tokens: vec![
                TokenGenesisConfig {
                    token: [3u8; 32],
                    balances: vec![],
                },
                TokenGenesisConfig {
                    token: [3u8; 32],
                    balances: vec![],
                },
            ],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::DuplicateToken(_))
        ));
    }

    #[test]
    fn test_vault_balance_rejected() {
        let config = MarketGenesisConfig {
            native_balances: vec![BalanceConfig {
                address: MARKET_VAULT,
                amount: 1,
            }],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GenesisValidationError::ReservedAddress(_))
        ));
    }

    #[test]
    fn test_initialize_seeds_state() {
        let alice = [1u8; 32];
        let token = [9u8; 32];

        let state = MarketGenesisConfig {
            admin: Some(alice),
            minters: vec![alice],
            native_balances: vec![BalanceConfig {
                address: alice,
                amount: 1000,
            }],
            tokens: vec![TokenGenesisConfig {
                token,
                balances: vec![BalanceConfig {
                    address: alice,
                    amount: 500,
                }],
            }],
            params: MarketParams::default(),
        }
        .initialize()
        .unwrap();

        assert!(state.has_role(admin_role(), &alice));
        assert!(state.has_role(minter_role(), &alice));
        assert_eq!(state.bank.native_balance(&alice), 1000);
        assert_eq!(state.bank.token_balance(&token, &alice), 500);
        assert_eq!(state.params.auction_duration, AUCTION_DURATION);
    }
}
