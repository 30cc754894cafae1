//! Dispute model: the arbitration case opened over a job when a buyer
//! contests delivery.
//!
//! Lifecycle: `EvidencePhase` (seller may counter) -> `Voting` -> `Resolved`.
//! At most one dispute exists per job; it is created only through the Job
//! Ledger's dispute-open call.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{constants::PANEL_SIZE, AccountId, DisputeId, JobId, Token};

/// Lifecycle phase of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeStatus {
    /// Waiting for the seller's counter-evidence.
    EvidencePhase,
    /// Panel is voting.
    Voting,
    /// Ruling executed. Terminal.
    Resolved,
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EvidencePhase => "EVIDENCE",
            Self::Voting => "VOTING",
            Self::Resolved => "RESOLVED",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a dispute.
///
/// `Draw` arises only on the post-deadline path: with two cast votes split
/// 1-1, neither side holds a majority and the escrow splits evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ruling {
    Pending,
    BuyerWins,
    SellerWins,
    Draw,
}

impl fmt::Display for Ruling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::BuyerWins => "BUYER_WINS",
            Self::SellerWins => "SELLER_WINS",
            Self::Draw => "DRAW",
        };
        write!(f, "{s}")
    }
}

/// Context the Job Ledger hands to the Dispute Engine when opening a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeIntake {
    pub job_id: JobId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub amount: Decimal,
    pub token: Token,
    pub buyer_evidence: String,
}

/// One arbitration case. Owned exclusively by the Dispute Engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub job_id: JobId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub amount: Decimal,
    pub token: Token,
    pub buyer_evidence: String,
    pub seller_evidence: Option<String>,
    /// Exactly three distinct, amount-qualified arbitrators.
    pub panel: [AccountId; PANEL_SIZE],
    /// Per-panel-slot ballot: `Some(true)` favors the buyer.
    pub ballots: [Option<bool>; PANEL_SIZE],
    pub status: DisputeStatus,
    pub ruling: Ruling,
    pub counter_evidence_deadline: DateTime<Utc>,
    pub voting_deadline: DateTime<Utc>,
    /// Seed the panel was drawn from, kept for after-the-fact audit.
    pub selection_seed: [u8; 32],
}

impl Dispute {
    /// Panel slot of `account`, if it is a panel member.
    #[must_use]
    pub fn panel_slot(&self, account: AccountId) -> Option<usize> {
        self.panel.iter().position(|a| *a == account)
    }

    /// Number of ballots cast so far.
    #[must_use]
    pub fn votes_cast(&self) -> usize {
        self.ballots.iter().flatten().count()
    }

    /// Ballots favoring the buyer.
    #[must_use]
    pub fn votes_for_buyer(&self) -> usize {
        self.ballots.iter().flatten().filter(|b| **b).count()
    }

    /// Ballots favoring the seller.
    #[must_use]
    pub fn votes_for_seller(&self) -> usize {
        self.ballots.iter().flatten().filter(|b| !**b).count()
    }

    /// Majority of cast ballots; `Draw` on an even split.
    #[must_use]
    pub fn tally(&self) -> Ruling {
        let buyer = self.votes_for_buyer();
        let seller = self.votes_for_seller();
        match buyer.cmp(&seller) {
            std::cmp::Ordering::Greater => Ruling::BuyerWins,
            std::cmp::Ordering::Less => Ruling::SellerWins,
            std::cmp::Ordering::Equal => Ruling::Draw,
        }
    }

    /// Hex form of the selection seed, for logs and audit tooling.
    #[must_use]
    pub fn seed_hex(&self) -> String {
        hex::encode(self.selection_seed)
    }
}
