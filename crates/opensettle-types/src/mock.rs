//! In-memory oracle implementations for tests (feature `test-helpers`).

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::{
    AccountId, BanOracle, Listing, ListingDirectory, ListingId, OpensettleError, RandomnessBeacon,
    ReputationOracle, ReputationTier, Result, StakeOracle,
};

/// Reputation oracle that records every signal it receives.
#[derive(Debug, Default)]
pub struct MockReputation {
    pub tiers: HashMap<AccountId, ReputationTier>,
    /// (seller, buyer, delivery_secs, estimate_secs)
    pub completions: Vec<(AccountId, AccountId, u64, u64)>,
    /// (seller, won)
    pub disputes: Vec<(AccountId, bool)>,
}

impl MockReputation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tier(&mut self, account: AccountId, tier: ReputationTier) {
        self.tiers.insert(account, tier);
    }
}

impl ReputationOracle for MockReputation {
    fn record_completion(
        &mut self,
        seller: AccountId,
        buyer: AccountId,
        delivery_secs: u64,
        estimate_secs: u64,
    ) {
        self.completions
            .push((seller, buyer, delivery_secs, estimate_secs));
    }

    fn record_dispute(&mut self, seller: AccountId, won: bool) {
        self.disputes.push((seller, won));
    }

    fn tier(&self, account: AccountId) -> ReputationTier {
        self.tiers
            .get(&account)
            .copied()
            .unwrap_or(ReputationTier::Newcomer)
    }
}

/// Stake oracle over a plain map; `slash` moves stake to the beneficiary
/// and records the event.
#[derive(Debug, Default)]
pub struct MockStake {
    pub stakes: HashMap<AccountId, Decimal>,
    /// (account, slashed, beneficiary)
    pub slashes: Vec<(AccountId, Decimal, AccountId)>,
}

impl MockStake {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_stake(&mut self, account: AccountId, stake: Decimal) {
        self.stakes.insert(account, stake);
    }
}

impl StakeOracle for MockStake {
    fn stake_of(&self, account: AccountId) -> Decimal {
        self.stakes.get(&account).copied().unwrap_or(Decimal::ZERO)
    }

    fn slash(
        &mut self,
        account: AccountId,
        amount: Decimal,
        beneficiary: AccountId,
    ) -> Result<Decimal> {
        if amount < Decimal::ZERO {
            return Err(OpensettleError::Internal("negative slash".to_string()));
        }
        let held = self.stake_of(account);
        let slashed = amount.min(held);
        self.stakes.insert(account, held - slashed);
        *self.stakes.entry(beneficiary).or_insert(Decimal::ZERO) += slashed;
        self.slashes.push((account, slashed, beneficiary));
        Ok(slashed)
    }
}

/// Ban oracle over a static set.
#[derive(Debug, Default)]
pub struct StaticBans {
    pub banned: HashSet<AccountId>,
}

impl StaticBans {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ban(&mut self, account: AccountId) {
        self.banned.insert(account);
    }
}

impl BanOracle for StaticBans {
    fn is_banned(&self, account: AccountId) -> bool {
        self.banned.contains(&account)
    }
}

/// Listing directory over a static map.
#[derive(Debug, Default)]
pub struct StaticListings {
    pub listings: HashMap<ListingId, Listing>,
}

impl StaticListings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ListingId, listing: Listing) {
        self.listings.insert(id, listing);
    }

    /// Convenience: add an active listing and return its id.
    pub fn add_active(
        &mut self,
        id: u64,
        provider: AccountId,
        token: &str,
        estimated_delivery_secs: u64,
    ) -> ListingId {
        let lid = ListingId(id);
        self.listings.insert(
            lid,
            Listing {
                provider,
                settlement_token: token.to_string(),
                estimated_delivery_secs,
                active: true,
            },
        );
        lid
    }
}

impl ListingDirectory for StaticListings {
    fn listing(&self, id: ListingId) -> Option<Listing> {
        self.listings.get(&id).cloned()
    }
}

/// Beacon returning a fixed byte pattern mixed with the round number.
/// Deterministic, so selection tests can re-derive their panels.
#[derive(Debug, Clone, Copy)]
pub struct FixedBeacon(pub [u8; 32]);

impl Default for FixedBeacon {
    fn default() -> Self {
        Self([0xA5; 32])
    }
}

impl RandomnessBeacon for FixedBeacon {
    fn draw(&mut self, round: u64) -> [u8; 32] {
        let mut out = self.0;
        out[..8].copy_from_slice(&round.to_le_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_stake_slash_is_bounded() {
        let mut stake = MockStake::new();
        let arb = AccountId::new();
        let buyer = AccountId::new();
        stake.set_stake(arb, Decimal::new(100, 0));

        let slashed = stake.slash(arb, Decimal::new(500, 0), buyer).unwrap();
        assert_eq!(slashed, Decimal::new(100, 0));
        assert_eq!(stake.stake_of(arb), Decimal::ZERO);
        assert_eq!(stake.stake_of(buyer), Decimal::new(100, 0));
    }

    #[test]
    fn fixed_beacon_varies_by_round() {
        let mut beacon = FixedBeacon::default();
        assert_ne!(beacon.draw(1), beacon.draw(2));
        assert_eq!(beacon.draw(7), beacon.draw(7));
    }

    #[test]
    fn unknown_account_is_newcomer() {
        let rep = MockReputation::new();
        assert_eq!(rep.tier(AccountId::new()), ReputationTier::Newcomer);
    }
}
