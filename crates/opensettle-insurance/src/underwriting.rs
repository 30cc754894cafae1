//! Underwriting: insured-job lifecycle and pool custody.
//!
//! The pool is a plain vault account. Creating an insured job pulls
//! `amount + premium` from the buyer through the pool: the premium stays
//! as staker yield (or goes to the treasury when the pool is empty) and
//! the pool funds the job's escrow itself, standing as the refund
//! recipient. In-flight principal reserves an equal slice of deposits as
//! collateral until the job settles.
//!
//! Settlement is lazy and idempotent: the first claim call that finds
//! the job terminal fixes the refund split exactly once; repeat calls
//! pay only what remains.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use opensettle_ledger::JobLedger;
use opensettle_types::{
    constants::BPS_DENOMINATOR, AccountId, BanOracle, InsuranceConfig, InsuredJob, JobId,
    ListingDirectory, ListingId, OpenJob, OpensettleError, ReputationOracle, Result, Ruling,
    Token, ValueTransfer,
};
use rust_decimal::Decimal;

use crate::pool::RewardPool;

pub struct Underwriting {
    pool: RewardPool,
    insured: HashMap<JobId, InsuredJob>,
    config: InsuranceConfig,
    /// Escrowed principal of unsettled insured jobs.
    in_flight: Decimal,
    /// Settled refunds not yet claimed by their buyers.
    refund_liability: Decimal,
}

impl Underwriting {
    #[must_use]
    pub fn new(config: InsuranceConfig) -> Self {
        Self {
            pool: RewardPool::new(),
            insured: HashMap::new(),
            config,
            in_flight: Decimal::ZERO,
            refund_liability: Decimal::ZERO,
        }
    }

    /// Premium for a job of `amount` under the configured rate.
    #[must_use]
    pub fn premium_for(&self, amount: Decimal) -> Decimal {
        amount * Decimal::from(self.config.premium_bps) / Decimal::from(BPS_DENOMINATOR)
    }

    /// Pool balance not reserved against any liability. Withdrawals and
    /// underwriting payouts are capped by this.
    #[must_use]
    pub fn spendable(&self, vault: &dyn ValueTransfer) -> Decimal {
        vault.balance(self.config.pool_account, &self.config.pool_token)
            - self.pool.outstanding_rewards()
            - self.refund_liability
            - self.in_flight
    }

    /// Stake into the pool. Returns the quantity actually credited
    /// (measured after transfer).
    pub fn deposit_to_pool(
        &mut self,
        vault: &mut dyn ValueTransfer,
        staker: AccountId,
        amount: Decimal,
    ) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(OpensettleError::ZeroAmount);
        }
        let received = vault.pull(staker, &self.config.pool_token, amount)?;
        if received <= Decimal::ZERO {
            return Err(OpensettleError::ZeroReceived);
        }
        vault.push(self.config.pool_account, &self.config.pool_token, received)?;
        self.pool.deposit(staker, received);
        tracing::debug!(staker = %staker.short(), amount = %received, "pool deposit");
        Ok(received)
    }

    /// Unstake from the pool, bounded by the solvency invariant.
    ///
    /// # Errors
    /// `InsufficientPoolLiquidity` when reserved liabilities would be
    /// left uncovered; `NotPoolStaker` / `InsufficientBalance` on a bad
    /// position.
    pub fn withdraw_from_pool(
        &mut self,
        vault: &mut dyn ValueTransfer,
        staker: AccountId,
        amount: Decimal,
    ) -> Result<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(OpensettleError::ZeroAmount);
        }
        let spendable = self.spendable(vault);
        if amount > spendable {
            return Err(OpensettleError::InsufficientPoolLiquidity {
                needed: amount,
                spendable,
            });
        }
        self.pool.withdraw(staker, amount)?;
        Self::pay_out(vault, &self.config, staker, amount)
    }

    /// Pay out a staker's accrued premium yield.
    pub fn claim_rewards(
        &mut self,
        vault: &mut dyn ValueTransfer,
        staker: AccountId,
    ) -> Result<Decimal> {
        let rewards = self.pool.take_rewards(staker)?;
        if rewards <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        Self::pay_out(vault, &self.config, staker, rewards)
    }

    /// Open a pool-funded, insured job for `buyer`.
    ///
    /// Pulls `amount + premium` from the buyer in one transfer (skim
    /// shared pro rata), routes the premium into the reward accumulator
    /// (treasury when the pool is empty), and opens the underlying job
    /// with the pool as payer and refund recipient.
    #[allow(clippy::too_many_arguments)]
    pub fn create_insured_job(
        &mut self,
        vault: &mut dyn ValueTransfer,
        ledger: &mut JobLedger,
        listings: &dyn ListingDirectory,
        bans: &dyn BanOracle,
        buyer: AccountId,
        listing_id: ListingId,
        seller: AccountId,
        amount: Decimal,
        token: Token,
        now: DateTime<Utc>,
    ) -> Result<JobId> {
        if token != self.config.pool_token {
            return Err(OpensettleError::TokenMismatch {
                expected: self.config.pool_token.clone(),
                actual: token,
            });
        }
        let mut req = OpenJob::funded(
            buyer,
            self.config.pool_account,
            listing_id,
            seller,
            amount,
            token.clone(),
        );
        // Reject everything the ledger would before any funds move.
        JobLedger::validate_open(listings, bans, &req)?;

        let premium = self.premium_for(amount);
        let total = amount + premium;
        let pulled = vault.pull(buyer, &token, total)?;
        if pulled <= Decimal::ZERO {
            return Err(OpensettleError::ZeroReceived);
        }
        // Any skim falls on principal and premium pro rata.
        let funded_amount = pulled * amount / total;
        let premium_received = pulled - funded_amount;
        vault.push(self.config.pool_account, &token, pulled)?;

        if premium_received > Decimal::ZERO && !self.pool.distribute(premium_received) {
            // No stakers to earn it; don't strand the premium.
            Self::pay_out(vault, &self.config, self.config.treasury, premium_received)?;
        }

        req.amount = funded_amount;
        let job_id = ledger.open_job(vault, listings, bans, req, now)?;
        let escrowed = ledger
            .job(job_id)
            .ok_or_else(|| OpensettleError::Internal("insured job vanished after open".into()))?
            .amount;
        self.in_flight += escrowed;
        self.insured
            .insert(job_id, InsuredJob::new(job_id, buyer, premium_received));

        tracing::info!(job = %job_id, buyer = %buyer.short(), amount = %escrowed, premium = %premium_received, "insured job opened");
        Ok(job_id)
    }

    /// Pay the insured buyer the refund the ruling produced: the full
    /// amount on a buyer win, half on a draw, nothing otherwise.
    /// Idempotent; settles the insurance record on first terminal call.
    pub fn claim_refund(
        &mut self,
        vault: &mut dyn ValueTransfer,
        ledger: &JobLedger,
        job_id: JobId,
        caller: AccountId,
    ) -> Result<Decimal> {
        self.authorize(job_id, caller)?;
        self.settle(ledger, job_id)?;

        let record = self.record(job_id)?;
        let payable = record.refund_amount - record.refund_paid;
        if payable <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        // Release liability only for value the buyer measurably received;
        // a skimmed shortfall stays on the books and claimable.
        let paid = Self::pay_out(vault, &self.config, caller, payable)?;
        self.refund_liability -= paid;
        self.record_mut(job_id)?.refund_paid += paid;
        tracing::info!(job = %job_id, amount = %paid, "insured refund paid");
        Ok(paid)
    }

    /// Pay the buyer's residual loss (escrowed amount minus the settled
    /// refund) out of the underwriters' capital, capped by the buyer's
    /// reputation-tier coverage limit and the pool's spendable balance.
    pub fn file_claim(
        &mut self,
        vault: &mut dyn ValueTransfer,
        ledger: &JobLedger,
        reputation: &dyn ReputationOracle,
        job_id: JobId,
        caller: AccountId,
        _now: DateTime<Utc>,
    ) -> Result<Decimal> {
        self.authorize(job_id, caller)?;
        self.settle(ledger, job_id)?;

        let escrowed = ledger
            .job(job_id)
            .ok_or(OpensettleError::JobNotFound(job_id))?
            .amount;
        let record = self.record(job_id)?;
        let net_loss = escrowed - record.refund_amount - record.claim_paid;
        let cap_left =
            (self.config.coverage_cap(reputation.tier(caller)) - record.claim_paid).max(Decimal::ZERO);
        let entitled = net_loss.min(cap_left);
        if entitled <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        let spendable = self.spendable(vault);
        if spendable <= Decimal::ZERO {
            return Err(OpensettleError::InsufficientPoolLiquidity {
                needed: entitled,
                spendable,
            });
        }
        let payout = entitled.min(spendable);
        let paid = Self::pay_out(vault, &self.config, caller, payout)?;
        self.record_mut(job_id)?.claim_paid += paid;
        tracing::info!(job = %job_id, amount = %paid, "underwriting claim paid");
        Ok(paid)
    }

    #[must_use]
    pub fn insured(&self, job_id: JobId) -> Option<&InsuredJob> {
        self.insured.get(&job_id)
    }

    #[must_use]
    pub fn pool(&self) -> &RewardPool {
        &self.pool
    }

    #[must_use]
    pub fn in_flight(&self) -> Decimal {
        self.in_flight
    }

    #[must_use]
    pub fn refund_liability(&self) -> Decimal {
        self.refund_liability
    }

    #[must_use]
    pub fn config(&self) -> &InsuranceConfig {
        &self.config
    }

    // -- internals ---------------------------------------------------------

    fn authorize(&self, job_id: JobId, caller: AccountId) -> Result<()> {
        let record = self.record(job_id)?;
        if caller != record.buyer {
            return Err(OpensettleError::NotInsuredBuyer(job_id));
        }
        Ok(())
    }

    /// Fix the refund split once, when the job is first seen terminal.
    fn settle(&mut self, ledger: &JobLedger, job_id: JobId) -> Result<()> {
        if self.record(job_id)?.settled {
            return Ok(());
        }
        let job = ledger
            .job(job_id)
            .ok_or(OpensettleError::JobNotFound(job_id))?;
        if !job.status.is_terminal() {
            return Err(OpensettleError::JobNotTerminal(job_id));
        }

        // Mirrors the ledger's disputed payouts: the pool, as refund
        // recipient, received exactly this much back.
        let refund = match job.resolution {
            Some(Ruling::BuyerWins) => job.amount,
            Some(Ruling::Draw) => job.amount / Decimal::from(2u8),
            _ => Decimal::ZERO,
        };
        self.in_flight -= job.amount;
        self.refund_liability += refund;
        let record = self.record_mut(job_id)?;
        record.refund_amount = refund;
        record.settled = true;
        tracing::debug!(job = %job_id, refund = %refund, "insurance settled");
        Ok(())
    }

    fn record(&self, job_id: JobId) -> Result<&InsuredJob> {
        self.insured
            .get(&job_id)
            .ok_or(OpensettleError::NotInsured(job_id))
    }

    fn record_mut(&mut self, job_id: JobId) -> Result<&mut InsuredJob> {
        self.insured
            .get_mut(&job_id)
            .ok_or(OpensettleError::NotInsured(job_id))
    }

    /// Move `amount` out of the pool account to `to`; returns the
    /// measured quantity delivered.
    fn pay_out(
        vault: &mut dyn ValueTransfer,
        config: &InsuranceConfig,
        to: AccountId,
        amount: Decimal,
    ) -> Result<Decimal> {
        let received = vault.pull(config.pool_account, &config.pool_token, amount)?;
        vault.push(to, &config.pool_token, received)?;
        Ok(received)
    }
}
