//! Reward-per-share accumulator over underwriter positions.
//!
//! The standard O(1) technique for spreading variable-timing income
//! across a variable stakeholder set: a global accumulator advances by
//! `reward * SCALE / total_deposited` on every distribution, and each
//! staker's accrual is the accumulator delta since their last checkpoint
//! times their deposit. Every balance change checkpoints first, so no
//! staker ever earns on capital they did not hold.
//!
//! This module is pure bookkeeping; moving the corresponding tokens is
//! the caller's job.

use std::collections::HashMap;

use opensettle_types::{
    constants::REWARD_SCALE_UNITS, AccountId, OpensettleError, PoolStaker, Result,
};
use rust_decimal::Decimal;

pub struct RewardPool {
    stakers: HashMap<AccountId, PoolStaker>,
    total_deposited: Decimal,
    /// Rewards per deposited unit, scaled by [`REWARD_SCALE_UNITS`].
    acc_reward_per_share: Decimal,
    /// Distributed but not yet claimed; a liability against the pool
    /// account.
    outstanding_rewards: Decimal,
}

fn scale() -> Decimal {
    Decimal::from(REWARD_SCALE_UNITS)
}

impl RewardPool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stakers: HashMap::new(),
            total_deposited: Decimal::ZERO,
            acc_reward_per_share: Decimal::ZERO,
            outstanding_rewards: Decimal::ZERO,
        }
    }

    /// Credit a deposit to `account`.
    pub fn deposit(&mut self, account: AccountId, amount: Decimal) {
        let acc = self.acc_reward_per_share;
        let staker = self
            .stakers
            .entry(account)
            .or_insert_with(|| PoolStaker::new(acc));
        Self::checkpoint(staker, acc);
        staker.deposited += amount;
        self.total_deposited += amount;
    }

    /// Debit a withdrawal from `account`.
    ///
    /// # Errors
    /// `NotPoolStaker`, `InsufficientBalance`.
    pub fn withdraw(&mut self, account: AccountId, amount: Decimal) -> Result<()> {
        let acc = self.acc_reward_per_share;
        let staker = self
            .stakers
            .get_mut(&account)
            .ok_or(OpensettleError::NotPoolStaker(account))?;
        Self::checkpoint(staker, acc);
        if staker.deposited < amount {
            return Err(OpensettleError::InsufficientBalance {
                needed: amount,
                available: staker.deposited,
            });
        }
        staker.deposited -= amount;
        self.total_deposited -= amount;
        Ok(())
    }

    /// Spread `amount` across current stakers. Returns `false` (and
    /// changes nothing) when the pool is empty, so the caller can route
    /// the income elsewhere.
    pub fn distribute(&mut self, amount: Decimal) -> bool {
        if self.total_deposited <= Decimal::ZERO || amount <= Decimal::ZERO {
            return false;
        }
        self.acc_reward_per_share += amount * scale() / self.total_deposited;
        self.outstanding_rewards += amount;
        true
    }

    /// Checkpoint and take everything claimable for `account`.
    pub fn take_rewards(&mut self, account: AccountId) -> Result<Decimal> {
        let acc = self.acc_reward_per_share;
        let staker = self
            .stakers
            .get_mut(&account)
            .ok_or(OpensettleError::NotPoolStaker(account))?;
        Self::checkpoint(staker, acc);
        let claimed = staker.pending_rewards;
        staker.pending_rewards = Decimal::ZERO;
        // Accumulator dust can leave the claim a hair above the tracked
        // total; the liability never goes negative.
        self.outstanding_rewards = (self.outstanding_rewards - claimed).max(Decimal::ZERO);
        Ok(claimed)
    }

    /// Claimable rewards for `account` right now (view only).
    #[must_use]
    pub fn pending_of(&self, account: AccountId) -> Decimal {
        self.stakers.get(&account).map_or(Decimal::ZERO, |staker| {
            staker.pending_rewards
                + staker.deposited * (self.acc_reward_per_share - staker.reward_checkpoint)
                    / scale()
        })
    }

    #[must_use]
    pub fn deposited_of(&self, account: AccountId) -> Decimal {
        self.stakers
            .get(&account)
            .map_or(Decimal::ZERO, |s| s.deposited)
    }

    #[must_use]
    pub fn total_deposited(&self) -> Decimal {
        self.total_deposited
    }

    #[must_use]
    pub fn outstanding_rewards(&self) -> Decimal {
        self.outstanding_rewards
    }

    fn checkpoint(staker: &mut PoolStaker, acc: Decimal) {
        let accrued = staker.deposited * (acc - staker.reward_checkpoint) / scale();
        staker.pending_rewards += accrued;
        staker.reward_checkpoint = acc;
    }
}

impl Default for RewardPool {
    fn default() -> Self {
        Self::new()
    }
}
