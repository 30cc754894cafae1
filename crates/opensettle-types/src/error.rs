//! Error types for the OpenSettle settlement core.
//!
//! All errors use the `OS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Job Ledger errors
//! - 2xx: Vault / balance errors
//! - 3xx: Dispute errors
//! - 4xx: Arbitrator registry errors
//! - 5xx: Insurance errors
//! - 9xx: General / internal errors
//!
//! Every variant additionally maps onto one of three failure classes
//! ([`ErrorClass`]): validation failures abort with no state change and are
//! corrected by fixing the input; timing failures resolve only by waiting
//! or by another party acting; capacity failures may self-resolve later
//! without caller correction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, DisputeId, DisputeStatus, JobId, JobStatus, Token};

/// How a failed operation can be unblocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input, wrong caller, or wrong state — fix the call.
    Validation,
    /// Too early or too late — wait, or another party must act.
    Timing,
    /// Too few arbitrators or too little liquidity — may self-resolve.
    Capacity,
}

/// Central error enum for all OpenSettle operations.
#[derive(Debug, Error)]
pub enum OpensettleError {
    // =================================================================
    // Job Ledger Errors (1xx)
    // =================================================================
    /// The requested job does not exist.
    #[error("OS_ERR_100: Job not found: {0}")]
    JobNotFound(JobId),

    /// The listing is missing, inactive, or does not match the request.
    #[error("OS_ERR_101: Invalid listing: {reason}")]
    InvalidListing { reason: String },

    /// Buyer and seller are the same account.
    #[error("OS_ERR_102: Self-dealing: buyer and seller are the same account")]
    SelfDealing,

    /// The job amount must be positive.
    #[error("OS_ERR_103: Zero amount")]
    ZeroAmount,

    /// The token does not match the listing's settlement token.
    #[error("OS_ERR_104: Token mismatch: expected {expected}, got {actual}")]
    TokenMismatch { expected: Token, actual: Token },

    /// One of the parties is banned.
    #[error("OS_ERR_105: Party banned: {0}")]
    PartyBanned(AccountId),

    /// The transfer delivered nothing (fully skimmed or broken token).
    #[error("OS_ERR_106: Zero received from value transfer")]
    ZeroReceived,

    /// Caller is not the job's buyer.
    #[error("OS_ERR_107: Caller is not the buyer of job {0}")]
    NotJobBuyer(JobId),

    /// Caller is not the job's seller.
    #[error("OS_ERR_108: Caller is not the seller of job {0}")]
    NotJobSeller(JobId),

    /// The job is in the wrong state for this operation.
    #[error("OS_ERR_109: Invalid job status: expected {expected}, got {actual}")]
    InvalidJobStatus {
        expected: JobStatus,
        actual: JobStatus,
    },

    /// The dispute window has already closed.
    #[error("OS_ERR_110: Dispute window closed at {ended}")]
    DisputeWindowClosed { ended: DateTime<Utc> },

    /// The dispute window is still open (auto-release too early).
    #[error("OS_ERR_111: Dispute window open until {until}")]
    DisputeWindowOpen { until: DateTime<Utc> },

    /// Dispute evidence must be non-empty.
    #[error("OS_ERR_112: Empty evidence")]
    EmptyEvidence,

    /// Resolution was attempted without the dispute capability — the job is
    /// not Disputed, or the presented dispute id does not match the one
    /// recorded at initiation.
    #[error("OS_ERR_113: Resolution not authorized for job {0}")]
    ResolutionNotAuthorized(JobId),

    // =================================================================
    // Vault / Balance Errors (2xx)
    // =================================================================
    /// Not enough balance to perform the operation.
    #[error("OS_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    // =================================================================
    // Dispute Errors (3xx)
    // =================================================================
    /// The requested dispute does not exist.
    #[error("OS_ERR_300: Dispute not found: {0}")]
    DisputeNotFound(DisputeId),

    /// The dispute is in the wrong phase for this operation.
    #[error("OS_ERR_301: Wrong dispute phase: expected {expected}, got {actual}")]
    WrongDisputePhase {
        expected: DisputeStatus,
        actual: DisputeStatus,
    },

    /// The counter-evidence deadline has passed.
    #[error("OS_ERR_302: Evidence deadline passed")]
    EvidenceDeadlinePassed,

    /// The counter-evidence window is still open.
    #[error("OS_ERR_303: Evidence window still open")]
    EvidenceWindowStillOpen,

    /// The voting deadline has passed.
    #[error("OS_ERR_304: Voting closed")]
    VotingClosed,

    /// The voting window is still open and not all votes are in.
    #[error("OS_ERR_305: Voting still open")]
    VotingStillOpen,

    /// Caller is not on the dispute's panel.
    #[error("OS_ERR_306: Not a panel member: {0}")]
    NotPanelMember(AccountId),

    /// This panel member has already voted.
    #[error("OS_ERR_307: Already voted: {0}")]
    AlreadyVoted(AccountId),

    /// No votes were cast before the deadline; the ruling cannot execute
    /// until at least one panel member votes.
    #[error("OS_ERR_308: No votes cast")]
    NoVotesCast,

    // =================================================================
    // Arbitrator Registry Errors (4xx)
    // =================================================================
    /// The account is not a registered arbitrator.
    #[error("OS_ERR_400: Arbitrator not found: {0}")]
    ArbitratorNotFound(AccountId),

    /// Fewer eligible arbitrators than the panel requires.
    #[error("OS_ERR_401: Insufficient arbitrators: need {needed}, have {available}")]
    InsufficientArbitrators { needed: usize, available: usize },

    /// Stake is below the minimum for any rank.
    #[error("OS_ERR_402: Stake below minimum: {minimum}")]
    StakeBelowMinimum { minimum: Decimal },

    /// The arbitrator still has active cases.
    #[error("OS_ERR_403: Active cases outstanding: {count}")]
    ActiveCasesOutstanding { count: u32 },

    /// The unstake cooldown has not elapsed.
    #[error("OS_ERR_404: Unstake cooldown active until {until}")]
    UnstakeCooldownActive { until: DateTime<Utc> },

    /// The arbitrator is inactive (unstaking or never activated).
    #[error("OS_ERR_405: Arbitrator inactive: {0}")]
    ArbitratorInactive(AccountId),

    /// Withdrawal attempted without first beginning an unstake.
    #[error("OS_ERR_406: Unstake not initiated: {0}")]
    UnstakeNotInitiated(AccountId),

    // =================================================================
    // Insurance Errors (5xx)
    // =================================================================
    /// The job carries no insurance record.
    #[error("OS_ERR_500: Job not insured: {0}")]
    NotInsured(JobId),

    /// The job has not reached a terminal state yet.
    #[error("OS_ERR_501: Job not terminal: {0}")]
    JobNotTerminal(JobId),

    /// The pool's spendable balance cannot cover the payout.
    #[error("OS_ERR_502: Insufficient pool liquidity: need {needed}, spendable {spendable}")]
    InsufficientPoolLiquidity { needed: Decimal, spendable: Decimal },

    /// Caller is not the insured buyer of this job.
    #[error("OS_ERR_503: Caller is not the insured buyer of job {0}")]
    NotInsuredBuyer(JobId),

    /// The account has no pool position.
    #[error("OS_ERR_504: Not a pool staker: {0}")]
    NotPoolStaker(AccountId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Per-job conservation invariant violated — critical safety alert.
    #[error("OS_ERR_901: Conservation violation: {reason}")]
    ConservationViolation { reason: String },
}

impl OpensettleError {
    /// The failure class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        use OpensettleError as E;
        match self {
            E::DisputeWindowClosed { .. }
            | E::DisputeWindowOpen { .. }
            | E::EvidenceDeadlinePassed
            | E::EvidenceWindowStillOpen
            | E::VotingClosed
            | E::VotingStillOpen
            | E::NoVotesCast
            | E::UnstakeCooldownActive { .. }
            | E::JobNotTerminal(_) => ErrorClass::Timing,
            E::InsufficientArbitrators { .. } | E::InsufficientPoolLiquidity { .. } => {
                ErrorClass::Capacity
            }
            _ => ErrorClass::Validation,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpensettleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = OpensettleError::JobNotFound(JobId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("OS_ERR_100"), "Got: {msg}");
    }

    #[test]
    fn insufficient_balance_display() {
        let err = OpensettleError::InsufficientBalance {
            needed: Decimal::new(100, 0),
            available: Decimal::new(50, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("OS_ERR_200"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn all_errors_have_os_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(OpensettleError::SelfDealing),
            Box::new(OpensettleError::ZeroReceived),
            Box::new(OpensettleError::NoVotesCast),
            Box::new(OpensettleError::Internal("test".into())),
            Box::new(OpensettleError::InsufficientArbitrators {
                needed: 3,
                available: 1,
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("OS_ERR_"),
                "Error missing OS_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn timing_failures_classified() {
        let err = OpensettleError::DisputeWindowClosed { ended: Utc::now() };
        assert_eq!(err.class(), ErrorClass::Timing);
        let err = OpensettleError::JobNotTerminal(JobId::new());
        assert_eq!(err.class(), ErrorClass::Timing);
    }

    #[test]
    fn capacity_failures_classified() {
        let err = OpensettleError::InsufficientArbitrators {
            needed: 3,
            available: 2,
        };
        assert_eq!(err.class(), ErrorClass::Capacity);
        let err = OpensettleError::InsufficientPoolLiquidity {
            needed: Decimal::ONE,
            spendable: Decimal::ZERO,
        };
        assert_eq!(err.class(), ErrorClass::Capacity);
    }

    #[test]
    fn validation_failures_classified() {
        assert_eq!(OpensettleError::SelfDealing.class(), ErrorClass::Validation);
        assert_eq!(
            OpensettleError::NotJobBuyer(JobId::new()).class(),
            ErrorClass::Validation
        );
    }
}
