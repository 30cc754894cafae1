//! Insurance pool model: underwriter positions and insured-job records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, JobId};

/// One underwriter's position in the insurance pool.
///
/// `reward_checkpoint` is the value of the global reward-per-share
/// accumulator at this staker's last balance change; claimable yield is
/// `deposited * (accumulator - checkpoint) / REWARD_SCALE` plus whatever
/// was already moved into `pending_rewards`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStaker {
    pub deposited: Decimal,
    pub reward_checkpoint: Decimal,
    pub pending_rewards: Decimal,
}

impl PoolStaker {
    #[must_use]
    pub fn new(checkpoint: Decimal) -> Self {
        Self {
            deposited: Decimal::ZERO,
            reward_checkpoint: checkpoint,
            pending_rewards: Decimal::ZERO,
        }
    }
}

/// Insurance record for one job. Settlement is lazy and idempotent:
/// `refund_amount` is computed exactly once, when the first settlement
/// call finds the job terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuredJob {
    pub job_id: JobId,
    /// Premium actually received at creation.
    pub premium: Decimal,
    pub buyer: AccountId,
    /// Refund owed to the buyer per the ruling; valid once `settled`.
    pub refund_amount: Decimal,
    pub settled: bool,
    /// Portion of the refund already paid out via `claim_refund`.
    pub refund_paid: Decimal,
    /// Underwriting payout already made via `file_claim`.
    pub claim_paid: Decimal,
}

impl InsuredJob {
    #[must_use]
    pub fn new(job_id: JobId, buyer: AccountId, premium: Decimal) -> Self {
        Self {
            job_id,
            premium,
            buyer,
            refund_amount: Decimal::ZERO,
            settled: false,
            refund_paid: Decimal::ZERO,
            claim_paid: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_staker_is_empty() {
        let s = PoolStaker::new(Decimal::new(42, 0));
        assert_eq!(s.deposited, Decimal::ZERO);
        assert_eq!(s.reward_checkpoint, Decimal::new(42, 0));
        assert_eq!(s.pending_rewards, Decimal::ZERO);
    }

    #[test]
    fn fresh_insured_job_unsettled() {
        let ij = InsuredJob::new(JobId::new(), AccountId::new(), Decimal::new(25, 1));
        assert!(!ij.settled);
        assert_eq!(ij.refund_amount, Decimal::ZERO);
        assert_eq!(ij.premium, Decimal::new(25, 1));
    }
}
