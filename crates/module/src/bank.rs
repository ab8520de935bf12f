//! Payment rail for the market: a native-value ledger plus one fungible
//! token ledger per token address.
//!
//! Escrow is modeled as funds held under [`MARKET_VAULT`]: `pull` collects
//! a payment into the vault, `push` releases vault funds to a payee. Every
//! operation checks before it mutates, so a failed transfer leaves all
//! ledgers untouched.

use crate::error::MarketError;
use market_types::{Address, Currency, MARKET_VAULT};
use std::collections::HashMap;

/// Balances and allowances of a single fungible token.
#[derive(Debug, Default)]
pub struct TokenLedger {
    balances: HashMap<Address, u64>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), u64>,
}

/// Native and token ledgers used to settle market payments.
#[derive(Debug, Default)]
pub struct Bank {
    native: HashMap<Address, u64>,
    tokens: HashMap<Address, TokenLedger>,
}

impl Bank {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- balances & funding ----

    pub fn native_balance(&self, who: &Address) -> u64 {
        self.native.get(who).copied().unwrap_or(0)
    }

    pub fn token_balance(&self, token: &Address, who: &Address) -> u64 {
        self.tokens
            .get(token)
            .and_then(|ledger| ledger.balances.get(who))
            .copied()
            .unwrap_or(0)
    }

    /// Credit native funds to an account (genesis / test harness only).
    pub fn deposit_native(&mut self, who: Address, amount: u64) {
        *self.native.entry(who).or_insert(0) += amount;
    }

    /// Credit token funds to an account (genesis / test harness only).
    pub fn mint_token(&mut self, token: Address, who: Address, amount: u64) {
        let ledger = self.tokens.entry(token).or_default();
        *ledger.balances.entry(who).or_insert(0) += amount;
    }

    // ---- allowances ----

    /// Set the amount `spender` may pull from `owner` on a token ledger.
    pub fn approve(&mut self, token: Address, owner: Address, spender: Address, amount: u64) {
        let ledger = self.tokens.entry(token).or_default();
        ledger.allowances.insert((owner, spender), amount);
    }

    pub fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> u64 {
        self.tokens
            .get(token)
            .and_then(|ledger| ledger.allowances.get(&(*owner, *spender)))
            .copied()
            .unwrap_or(0)
    }

    // ---- raw transfers ----

    fn native_transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<(), MarketError> {
        let balance = self.native_balance(&from);
        if balance < amount {
            return Err(MarketError::InsufficientFunds {
                required: amount,
                got: balance,
            });
        }
        *self.native.entry(from).or_insert(0) -= amount;
        *self.native.entry(to).or_insert(0) += amount;
        Ok(())
    }

    fn token_transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<(), MarketError> {
        let balance = self.token_balance(&token, &from);
        if balance < amount {
            return Err(MarketError::InsufficientFunds {
                required: amount,
                got: balance,
            });
        }
        let ledger = self.tokens.entry(token).or_default();
        *ledger.balances.entry(from).or_insert(0) -= amount;
        *ledger.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    // ---- market rail ----

    /// Collect `amount` from `payer` into vault custody.
    ///
    /// Native rail: the call must carry an attached value of at least
    /// `amount`; only `amount` leaves the payer, so any excess of the
    /// attached value stays with the caller. Token rail: pulls exactly
    /// `amount` against the vault's allowance; attached value is ignored.
    pub fn pull(
        &mut self,
        currency: Currency,
        payer: Address,
        amount: u64,
        attached: u64,
    ) -> Result<(), MarketError> {
        match currency {
            Currency::Native => {
                if attached < amount {
                    return Err(MarketError::InsufficientFunds {
                        required: amount,
                        got: attached,
                    });
                }
                self.native_transfer(payer, MARKET_VAULT, amount)
            }
            Currency::Token(token) => {
                let allowed = self.allowance(&token, &payer, &MARKET_VAULT);
                if allowed < amount {
                    return Err(MarketError::InsufficientFunds {
                        required: amount,
                        got: allowed,
                    });
                }
                self.token_transfer(token, payer, MARKET_VAULT, amount)?;
                let ledger = self.tokens.entry(token).or_default();
                ledger.allowances.insert((payer, MARKET_VAULT), allowed - amount);
                Ok(())
            }
        }
    }

    /// Release `amount` of vault custody to `payee`.
    pub fn push(
        &mut self,
        currency: Currency,
        payee: Address,
        amount: u64,
    ) -> Result<(), MarketError> {
        match currency {
            Currency::Native => self.native_transfer(MARKET_VAULT, payee, amount),
            Currency::Token(token) => self.token_transfer(token, MARKET_VAULT, payee, amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: Address = [0xAB; 32];

    #[test]
    fn test_native_pull_and_push() {
        let mut bank = Bank::new();
        let payer = [1u8; 32];
        let payee = [2u8; 32];
        bank.deposit_native(payer, 500);

        bank.pull(Currency::Native, payer, 100, 110).unwrap();
        assert_eq!(bank.native_balance(&payer), 400);
        assert_eq!(bank.native_balance(&MARKET_VAULT), 100);

        bank.push(Currency::Native, payee, 100).unwrap();
        assert_eq!(bank.native_balance(&MARKET_VAULT), 0);
        assert_eq!(bank.native_balance(&payee), 100);
    }

    #[test]
    fn test_native_pull_requires_attached_value() {
        let mut bank = Bank::new();
        let payer = [1u8; 32];
        bank.deposit_native(payer, 500);

        let err = bank.pull(Currency::Native, payer, 100, 90).unwrap_err();
        assert_eq!(
            err,
            MarketError::InsufficientFunds {
                required: 100,
                got: 90
            }
        );
        assert_eq!(bank.native_balance(&payer), 500);
    }

    #[test]
    fn test_native_pull_requires_balance() {
        let mut bank = Bank::new();
        let payer = [1u8; 32];
        bank.deposit_native(payer, 50);

        assert!(bank.pull(Currency::Native, payer, 100, 100).is_err());
        assert_eq!(bank.native_balance(&payer), 50);
        assert_eq!(bank.native_balance(&MARKET_VAULT), 0);
    }

    #[test]
    fn test_token_pull_consumes_allowance() {
        let mut bank = Bank::new();
        let payer = [1u8; 32];
        bank.mint_token(TOKEN, payer, 1000);
        bank.approve(TOKEN, payer, MARKET_VAULT, 150);

        bank.pull(Currency::Token(TOKEN), payer, 100, 0).unwrap();
        assert_eq!(bank.token_balance(&TOKEN, &payer), 900);
        assert_eq!(bank.token_balance(&TOKEN, &MARKET_VAULT), 100);
        assert_eq!(bank.allowance(&TOKEN, &payer, &MARKET_VAULT), 50);

        // Remaining allowance no longer covers a second pull of 100.
        let err = bank.pull(Currency::Token(TOKEN), payer, 100, 0).unwrap_err();
        assert_eq!(
            err,
            MarketError::InsufficientFunds {
                required: 100,
                got: 50
            }
        );
    }

    #[test]
    fn test_token_pull_without_approval() {
        let mut bank = Bank::new();
        let payer = [1u8; 32];
        bank.mint_token(TOKEN, payer, 1000);

        assert!(bank.pull(Currency::Token(TOKEN), payer, 100, 0).is_err());
        assert_eq!(bank.token_balance(&TOKEN, &payer), 1000);
    }
}
