//! Arbitrator model: stake-derived rank and per-arbitrator case load.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ArbitrationConfig;

/// Stake-derived tier bounding the maximum dispute value an arbitrator
/// may be assigned. Rank is a pure function of stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArbitratorRank {
    None,
    Junior,
    Senior,
    Principal,
}

impl ArbitratorRank {
    /// Rank for a given stake under the configured thresholds.
    #[must_use]
    pub fn for_stake(stake: Decimal, config: &ArbitrationConfig) -> Self {
        if stake >= config.principal_stake {
            Self::Principal
        } else if stake >= config.senior_stake {
            Self::Senior
        } else if stake >= config.junior_stake {
            Self::Junior
        } else {
            Self::None
        }
    }

    /// Maximum dispute value this rank may be assigned.
    /// `None` means uncapped (Principal).
    #[must_use]
    pub fn max_dispute_value(self, config: &ArbitrationConfig) -> Option<Decimal> {
        match self {
            Self::None => Some(Decimal::ZERO),
            Self::Junior => Some(config.junior_cap),
            Self::Senior => Some(config.senior_cap),
            Self::Principal => None,
        }
    }

    /// Whether this rank qualifies for a dispute of the given amount.
    #[must_use]
    pub fn covers(self, amount: Decimal, config: &ArbitrationConfig) -> bool {
        match self.max_dispute_value(config) {
            Some(cap) => amount <= cap && self != Self::None,
            None => true,
        }
    }
}

impl fmt::Display for ArbitratorRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Junior => "JUNIOR",
            Self::Senior => "SENIOR",
            Self::Principal => "PRINCIPAL",
        };
        write!(f, "{s}")
    }
}

/// Per-arbitrator registry record. Owned exclusively by the Dispute Engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitratorInfo {
    pub stake: Decimal,
    pub rank: ArbitratorRank,
    /// Inactive arbitrators (unstaking) are never selected.
    pub active: bool,
    /// Cases currently assigned; must be zero before stake withdrawal.
    pub active_cases: u32,
    pub disputes_handled: u64,
    /// Votes that landed with the majority, for alignment stats.
    pub majority_votes: u64,
    /// Set by `begin_unstake`; withdrawal waits until this passes.
    pub cooldown_until: Option<DateTime<Utc>>,
}

impl ArbitratorInfo {
    /// Fresh record for a newly staked arbitrator.
    #[must_use]
    pub fn new(stake: Decimal, config: &ArbitrationConfig) -> Self {
        Self {
            stake,
            rank: ArbitratorRank::for_stake(stake, config),
            active: true,
            active_cases: 0,
            disputes_handled: 0,
            majority_votes: 0,
            cooldown_until: None,
        }
    }

    /// Selectable for a dispute of `amount`?
    #[must_use]
    pub fn eligible_for(&self, amount: Decimal, config: &ArbitrationConfig) -> bool {
        self.active && self.rank.covers(amount, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ArbitrationConfig {
        ArbitrationConfig::default()
    }

    #[test]
    fn rank_thresholds() {
        let c = cfg();
        assert_eq!(
            ArbitratorRank::for_stake(Decimal::new(500, 0), &c),
            ArbitratorRank::None
        );
        assert_eq!(
            ArbitratorRank::for_stake(Decimal::new(1_000, 0), &c),
            ArbitratorRank::Junior
        );
        assert_eq!(
            ArbitratorRank::for_stake(Decimal::new(10_000, 0), &c),
            ArbitratorRank::Senior
        );
        assert_eq!(
            ArbitratorRank::for_stake(Decimal::new(80_000, 0), &c),
            ArbitratorRank::Principal
        );
    }

    #[test]
    fn rank_ordering() {
        assert!(ArbitratorRank::Junior < ArbitratorRank::Senior);
        assert!(ArbitratorRank::Senior < ArbitratorRank::Principal);
    }

    #[test]
    fn caps_cover_amounts() {
        let c = cfg();
        assert!(ArbitratorRank::Junior.covers(Decimal::new(2_500, 0), &c));
        assert!(!ArbitratorRank::Junior.covers(Decimal::new(2_501, 0), &c));
        assert!(ArbitratorRank::Senior.covers(Decimal::new(25_000, 0), &c));
        assert!(!ArbitratorRank::Senior.covers(Decimal::new(25_001, 0), &c));
        // Principal is uncapped.
        assert!(ArbitratorRank::Principal.covers(Decimal::new(1_000_000, 0), &c));
        // Unranked covers nothing.
        assert!(!ArbitratorRank::None.covers(Decimal::ZERO, &c));
    }

    #[test]
    fn new_info_is_active_and_unloaded() {
        let c = cfg();
        let info = ArbitratorInfo::new(Decimal::new(10_000, 0), &c);
        assert!(info.active);
        assert_eq!(info.active_cases, 0);
        assert_eq!(info.rank, ArbitratorRank::Senior);
        assert!(info.eligible_for(Decimal::new(20_000, 0), &c));
        assert!(!info.eligible_for(Decimal::new(30_000, 0), &c));
    }

    #[test]
    fn inactive_never_eligible() {
        let c = cfg();
        let mut info = ArbitratorInfo::new(Decimal::new(100_000, 0), &c);
        info.active = false;
        assert!(!info.eligible_for(Decimal::ONE, &c));
    }
}
