//! Configuration for the three settlement subsystems.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, ReputationTier, Token};

/// Job Ledger policy: fees, dispute windows, treasury routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The protocol's native token; jobs settled in it pay no fee.
    pub native_token: Token,
    /// Fee on non-native jobs, in basis points of the received amount.
    pub fee_bps: u32,
    /// Amounts at or above this get the extended dispute window.
    pub high_value_threshold: Decimal,
    pub standard_window_secs: i64,
    pub extended_window_secs: i64,
    /// Account protocol fees are released to.
    pub treasury: AccountId,
}

impl LedgerConfig {
    /// Default policy with an explicit treasury account.
    #[must_use]
    pub fn with_treasury(treasury: AccountId) -> Self {
        Self {
            treasury,
            ..Self::default()
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            native_token: constants::NATIVE_TOKEN.to_string(),
            fee_bps: constants::DEFAULT_FEE_BPS,
            high_value_threshold: Decimal::from(constants::DEFAULT_HIGH_VALUE_THRESHOLD),
            standard_window_secs: constants::DEFAULT_STANDARD_WINDOW_SECS,
            extended_window_secs: constants::DEFAULT_EXTENDED_WINDOW_SECS,
            treasury: AccountId::nil(),
        }
    }
}

/// Dispute Engine policy: rank thresholds and caps, phase windows,
/// slashing, unstake cooldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrationConfig {
    pub junior_stake: Decimal,
    pub senior_stake: Decimal,
    pub principal_stake: Decimal,
    /// Maximum dispute value a Junior may be assigned.
    pub junior_cap: Decimal,
    /// Maximum dispute value a Senior may be assigned. Principal is uncapped.
    pub senior_cap: Decimal,
    pub evidence_window_secs: i64,
    pub voting_window_secs: i64,
    /// Minimum fraction of the seller's stake slashed on a buyer win (bps).
    pub min_slash_bps: u32,
    pub unstake_cooldown_secs: i64,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            junior_stake: Decimal::from(constants::DEFAULT_JUNIOR_STAKE),
            senior_stake: Decimal::from(constants::DEFAULT_SENIOR_STAKE),
            principal_stake: Decimal::from(constants::DEFAULT_PRINCIPAL_STAKE),
            junior_cap: Decimal::from(constants::DEFAULT_JUNIOR_CAP),
            senior_cap: Decimal::from(constants::DEFAULT_SENIOR_CAP),
            evidence_window_secs: constants::DEFAULT_EVIDENCE_WINDOW_SECS,
            voting_window_secs: constants::DEFAULT_VOTING_WINDOW_SECS,
            min_slash_bps: constants::DEFAULT_MIN_SLASH_BPS,
            unstake_cooldown_secs: constants::DEFAULT_UNSTAKE_COOLDOWN_SECS,
        }
    }
}

/// Insurance policy: premium rate, pool denomination, coverage caps.
///
/// The pool is single-token; insured jobs must settle in `pool_token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceConfig {
    /// Premium rate in basis points of the job amount.
    pub premium_bps: u32,
    pub pool_token: Token,
    /// The pool's own custody account.
    pub pool_account: AccountId,
    /// Where premiums go when no stakers exist (avoids stranded value).
    pub treasury: AccountId,
    pub newcomer_cap: Decimal,
    pub established_cap: Decimal,
    pub trusted_cap: Decimal,
    pub elite_cap: Decimal,
}

impl InsuranceConfig {
    /// Coverage limit for a reputation tier.
    #[must_use]
    pub fn coverage_cap(&self, tier: ReputationTier) -> Decimal {
        match tier {
            ReputationTier::Newcomer => self.newcomer_cap,
            ReputationTier::Established => self.established_cap,
            ReputationTier::Trusted => self.trusted_cap,
            ReputationTier::Elite => self.elite_cap,
        }
    }
}

impl Default for InsuranceConfig {
    fn default() -> Self {
        Self {
            premium_bps: constants::DEFAULT_PREMIUM_BPS,
            pool_token: constants::NATIVE_TOKEN.to_string(),
            pool_account: AccountId::nil(),
            treasury: AccountId::nil(),
            newcomer_cap: Decimal::from(constants::DEFAULT_NEWCOMER_CAP),
            established_cap: Decimal::from(constants::DEFAULT_ESTABLISHED_CAP),
            trusted_cap: Decimal::from(constants::DEFAULT_TRUSTED_CAP),
            elite_cap: Decimal::from(constants::DEFAULT_ELITE_CAP),
        }
    }
}
