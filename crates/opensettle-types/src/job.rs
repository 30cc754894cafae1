//! Job model: one escrowed value-for-service exchange, from funding to
//! final settlement.
//!
//! A job's status only ever advances forward:
//!
//! ```text
//! Active -> Delivered -> Confirmed
//!                     -> Released   (window elapsed, auto-release)
//!                     -> Disputed -> Resolved
//! ```
//!
//! `Confirmed`, `Released`, and `Resolved` are terminal; a job reaches
//! exactly one of them, exactly once.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, DisputeId, JobId, ListingId, Ruling, Token};

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Funded, awaiting delivery.
    Active,
    /// Seller submitted delivery; the dispute window is running.
    Delivered,
    /// Buyer confirmed; funds released. Terminal.
    Confirmed,
    /// Buyer contested delivery; arbitration in progress.
    Disputed,
    /// Window elapsed undisputed; funds auto-released. Terminal.
    Released,
    /// Arbitration ruled; funds settled per the ruling. Terminal.
    Resolved,
}

impl JobStatus {
    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Released | Self::Resolved)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Delivered => "DELIVERED",
            Self::Confirmed => "CONFIRMED",
            Self::Disputed => "DISPUTED",
            Self::Released => "RELEASED",
            Self::Resolved => "RESOLVED",
        };
        write!(f, "{s}")
    }
}

/// One escrowed job. Owned exclusively by the Job Ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub listing_id: ListingId,
    pub buyer: AccountId,
    pub seller: AccountId,
    /// Account the escrow was pulled from. Defaults to the buyer; the
    /// insurance pool funds insured jobs itself.
    pub payer: AccountId,
    /// Account a buyer-win refund is paid to. Defaults to the buyer; the
    /// insurance pool routes insured refunds through its own balance.
    pub refund_recipient: AccountId,
    /// Escrowed quantity **actually received** (skim-adjusted), never the
    /// requested quantity.
    pub amount: Decimal,
    pub token: Token,
    /// Protocol fee, carved out of `amount` on seller-favoring settlement.
    pub fee: Decimal,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    /// End of the buyer's contest window; set on delivery.
    pub dispute_window_end: Option<DateTime<Utc>>,
    pub delivery_metadata: Option<String>,
    /// Link to the arbitration case, set when a dispute opens.
    pub dispute: Option<DisputeId>,
    /// Final ruling, set when a disputed job resolves.
    pub resolution: Option<Ruling>,
    /// Listing's delivery estimate at open time, for the reputation signal.
    pub estimate_secs: u64,
}

impl Job {
    /// Whether the buyer may still contest delivery at `now`.
    #[must_use]
    pub fn in_dispute_window(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Delivered
            && self.dispute_window_end.is_some_and(|end| now <= end)
    }

    /// Seconds between creation and delivery, for the reputation oracle.
    #[must_use]
    pub fn delivery_secs(&self) -> u64 {
        self.delivered_at
            .map(|d| (d - self.created_at).num_seconds().unsigned_abs())
            .unwrap_or(0)
    }
}

/// Request to open a job. Built via [`OpenJob::direct`] for the plain
/// buyer-funded path or [`OpenJob::funded`] when another account (the
/// insurance pool) fronts the escrow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenJob {
    pub buyer: AccountId,
    pub payer: AccountId,
    pub refund_recipient: AccountId,
    pub listing_id: ListingId,
    pub seller: AccountId,
    pub amount: Decimal,
    pub token: Token,
}

impl OpenJob {
    /// Buyer pays and receives any refund.
    #[must_use]
    pub fn direct(
        buyer: AccountId,
        listing_id: ListingId,
        seller: AccountId,
        amount: Decimal,
        token: impl Into<Token>,
    ) -> Self {
        Self {
            buyer,
            payer: buyer,
            refund_recipient: buyer,
            listing_id,
            seller,
            amount,
            token: token.into(),
        }
    }

    /// A third account fronts the escrow and collects any refund.
    #[must_use]
    pub fn funded(
        buyer: AccountId,
        funder: AccountId,
        listing_id: ListingId,
        seller: AccountId,
        amount: Decimal,
        token: impl Into<Token>,
    ) -> Self {
        Self {
            buyer,
            payer: funder,
            refund_recipient: funder,
            listing_id,
            seller,
            amount,
            token: token.into(),
        }
    }
}
