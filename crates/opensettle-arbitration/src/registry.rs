//! Staked arbitrator registry.
//!
//! Rank is a pure function of stake (Junior / Senior / Principal), and
//! rank caps the dispute value an arbitrator may be assigned. Leaving is
//! two-phase: `begin_unstake` deactivates immediately (no new cases) and
//! starts the cooldown; `withdraw_stake` requires zero active cases and
//! an elapsed cooldown.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use opensettle_types::{
    AccountId, ArbitrationConfig, ArbitratorInfo, ArbitratorRank, OpensettleError, Result,
};
use rust_decimal::Decimal;

pub struct ArbitratorRegistry {
    arbitrators: HashMap<AccountId, ArbitratorInfo>,
    config: ArbitrationConfig,
}

impl ArbitratorRegistry {
    #[must_use]
    pub fn new(config: ArbitrationConfig) -> Self {
        Self {
            arbitrators: HashMap::new(),
            config,
        }
    }

    /// Stake (or top up) and take the rank the total stake earns.
    /// Staking again while unstaking reactivates and cancels the cooldown.
    ///
    /// # Errors
    /// `StakeBelowMinimum` if the total stays below the Junior threshold.
    pub fn stake(&mut self, account: AccountId, amount: Decimal) -> Result<ArbitratorRank> {
        let total = match self.arbitrators.get(&account) {
            Some(info) => info.stake + amount,
            None => amount,
        };
        if total < self.config.junior_stake {
            return Err(OpensettleError::StakeBelowMinimum {
                minimum: self.config.junior_stake,
            });
        }

        let rank = ArbitratorRank::for_stake(total, &self.config);
        let info = self
            .arbitrators
            .entry(account)
            .or_insert_with(|| ArbitratorInfo::new(Decimal::ZERO, &self.config));
        info.stake = total;
        info.rank = rank;
        info.active = true;
        info.cooldown_until = None;

        tracing::info!(arbitrator = %account.short(), stake = %total, rank = %rank, "arbitrator staked");
        Ok(rank)
    }

    /// Deactivate and start the withdrawal cooldown. Returns when the
    /// stake becomes withdrawable. Open cases stay assigned.
    pub fn begin_unstake(&mut self, account: AccountId, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let cooldown = self.config.unstake_cooldown_secs;
        let info = self.info_mut(account)?;
        if !info.active {
            return Err(OpensettleError::ArbitratorInactive(account));
        }
        let until = now + Duration::seconds(cooldown);
        info.active = false;
        info.cooldown_until = Some(until);
        Ok(until)
    }

    /// Remove the record and return the stake for payout.
    ///
    /// # Errors
    /// `UnstakeNotInitiated`, `ActiveCasesOutstanding`,
    /// `UnstakeCooldownActive`.
    pub fn withdraw_stake(&mut self, account: AccountId, now: DateTime<Utc>) -> Result<Decimal> {
        let info = self.info_mut(account)?;
        let until = info
            .cooldown_until
            .ok_or(OpensettleError::UnstakeNotInitiated(account))?;
        if info.active_cases > 0 {
            return Err(OpensettleError::ActiveCasesOutstanding {
                count: info.active_cases,
            });
        }
        if now < until {
            return Err(OpensettleError::UnstakeCooldownActive { until });
        }
        let stake = info.stake;
        self.arbitrators.remove(&account);
        tracing::info!(arbitrator = %account.short(), stake = %stake, "arbitrator withdrew");
        Ok(stake)
    }

    /// Accounts selectable for a dispute of `amount`, in a deterministic
    /// order so seeded selection is reproducible.
    #[must_use]
    pub fn eligible(&self, amount: Decimal) -> Vec<AccountId> {
        let mut out: Vec<AccountId> = self
            .arbitrators
            .iter()
            .filter(|(_, info)| info.eligible_for(amount, &self.config))
            .map(|(account, _)| *account)
            .collect();
        out.sort_unstable();
        out
    }

    /// Record a panel assignment.
    pub fn assign(&mut self, panel: &[AccountId]) -> Result<()> {
        for account in panel {
            self.info_mut(*account)?.active_cases += 1;
        }
        Ok(())
    }

    /// Record a case closing for one panel member. `with_majority` marks
    /// a ballot that landed on the winning side.
    pub fn case_closed(&mut self, account: AccountId, with_majority: bool) -> Result<()> {
        let info = self.info_mut(account)?;
        info.active_cases = info.active_cases.saturating_sub(1);
        info.disputes_handled += 1;
        if with_majority {
            info.majority_votes += 1;
        }
        Ok(())
    }

    #[must_use]
    pub fn arbitrator(&self, account: AccountId) -> Option<&ArbitratorInfo> {
        self.arbitrators.get(&account)
    }

    #[must_use]
    pub fn config(&self) -> &ArbitrationConfig {
        &self.config
    }

    fn info_mut(&mut self, account: AccountId) -> Result<&mut ArbitratorInfo> {
        self.arbitrators
            .get_mut(&account)
            .ok_or(OpensettleError::ArbitratorNotFound(account))
    }
}
