//! In-memory vault — the workspace's [`ValueTransfer`] implementation.
//!
//! Tracks per-(account, token) balances plus a custody total per token.
//! All mutations are atomic: either the full operation succeeds or the
//! balances are unchanged.
//!
//! Tokens may be configured with a skim rate to simulate fee-on-transfer
//! behavior: `pull` then delivers less than requested, and returns the
//! measured quantity.

use std::collections::HashMap;

use opensettle_types::{
    constants::BPS_DENOMINATOR, AccountId, OpensettleError, Result, Token, ValueTransfer,
};
use rust_decimal::Decimal;

/// Custodies value on behalf of the settlement core.
///
/// The vault is the source of truth for balance state. Funds `pull`ed out
/// of an account sit in per-token custody until `push`ed to a recipient;
/// the sum of account balances plus custody is constant across transfers.
pub struct Vault {
    /// Per-(account, token) balances.
    balances: HashMap<(AccountId, Token), Decimal>,
    /// Funds held in custody, per token.
    custody: HashMap<Token, Decimal>,
    /// Simulated fee-on-transfer rate per token, in basis points.
    skim_bps: HashMap<Token, u32>,
}

impl Vault {
    /// Create a new empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
            custody: HashMap::new(),
            skim_bps: HashMap::new(),
        }
    }

    /// Credit an account (external deposit into the system).
    pub fn deposit(&mut self, account: AccountId, token: &str, amount: Decimal) {
        *self
            .balances
            .entry((account, token.to_string()))
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Configure a skim rate for a token. Transfers of that token deliver
    /// `amount * (1 - bps/10_000)`.
    pub fn set_skim_bps(&mut self, token: &str, bps: u32) {
        self.skim_bps.insert(token.to_string(), bps);
    }

    /// Funds currently held in custody for a token.
    #[must_use]
    pub fn custody(&self, token: &str) -> Decimal {
        self.custody.get(token).copied().unwrap_or(Decimal::ZERO)
    }

    /// Total supply of a token inside the vault (accounts + custody).
    /// Skimmed quantities leave the system entirely.
    #[must_use]
    pub fn total_supply(&self, token: &str) -> Decimal {
        let accounts: Decimal = self
            .balances
            .iter()
            .filter(|((_, t), _)| t == token)
            .map(|(_, bal)| *bal)
            .sum();
        accounts + self.custody(token)
    }

    fn skimmed(&self, token: &str, amount: Decimal) -> Decimal {
        match self.skim_bps.get(token) {
            Some(bps) => {
                amount - amount * Decimal::from(*bps) / Decimal::from(BPS_DENOMINATOR)
            }
            None => amount,
        }
    }
}

impl Default for Vault {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueTransfer for Vault {
    fn pull(&mut self, from: AccountId, token: &str, amount: Decimal) -> Result<Decimal> {
        let entry = self
            .balances
            .get_mut(&(from, token.to_string()))
            .ok_or(OpensettleError::InsufficientBalance {
                needed: amount,
                available: Decimal::ZERO,
            })?;

        if *entry < amount {
            return Err(OpensettleError::InsufficientBalance {
                needed: amount,
                available: *entry,
            });
        }

        *entry -= amount;
        let received = self.skimmed(token, amount);
        *self
            .custody
            .entry(token.to_string())
            .or_insert(Decimal::ZERO) += received;
        Ok(received)
    }

    fn push(&mut self, to: AccountId, token: &str, amount: Decimal) -> Result<()> {
        let held = self
            .custody
            .get_mut(token)
            .ok_or(OpensettleError::InsufficientBalance {
                needed: amount,
                available: Decimal::ZERO,
            })?;

        if *held < amount {
            return Err(OpensettleError::InsufficientBalance {
                needed: amount,
                available: *held,
            });
        }

        *held -= amount;
        *self
            .balances
            .entry((to, token.to_string()))
            .or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    fn balance(&self, account: AccountId, token: &str) -> Decimal {
        self.balances
            .get(&(account, token.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}
