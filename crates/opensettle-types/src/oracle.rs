//! Collaborator seams: traits for the external oracles this core consumes
//! and for the two cross-component calls inside it.
//!
//! The settlement core never reaches out to concrete implementations;
//! reputation, staking, bans, listings, value transfer, and randomness are
//! all injected. The Job Ledger -> Dispute Engine -> Job Ledger call cycle
//! is likewise broken into two trait objects ([`ArbitrationHook`] and
//! [`ResolutionSink`]) so neither crate references the other.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, DisputeId, DisputeIntake, JobId, ListingId, Result, Ruling, Token};

/// Reputation tier of a marketplace account; drives insurance coverage caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReputationTier {
    Newcomer,
    Established,
    Trusted,
    Elite,
}

/// Reputation oracle: consumes settlement outcomes, answers tier queries.
pub trait ReputationOracle {
    /// A job completed in the seller's favor.
    fn record_completion(
        &mut self,
        seller: AccountId,
        buyer: AccountId,
        delivery_secs: u64,
        estimate_secs: u64,
    );

    /// A dispute over the seller's delivery concluded; `won` is the
    /// seller's outcome.
    fn record_dispute(&mut self, seller: AccountId, won: bool);

    fn tier(&self, account: AccountId) -> ReputationTier;
}

/// Stake oracle: external staking positions, slashable on a buyer win.
pub trait StakeOracle {
    fn stake_of(&self, account: AccountId) -> Decimal;

    /// Slash up to `amount` from `account` in favor of `beneficiary`.
    /// Returns the quantity actually slashed.
    fn slash(
        &mut self,
        account: AccountId,
        amount: Decimal,
        beneficiary: AccountId,
    ) -> Result<Decimal>;
}

/// Ban oracle: accounts excluded from opening or serving jobs.
pub trait BanOracle {
    fn is_banned(&self, account: AccountId) -> bool;
}

/// One entry in the external listing directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub provider: AccountId,
    pub settlement_token: Token,
    pub estimated_delivery_secs: u64,
    pub active: bool,
}

/// Read-only listing directory.
pub trait ListingDirectory {
    fn listing(&self, id: ListingId) -> Option<Listing>;
}

/// Value transfer with deposit-from / transfer-to semantics.
///
/// `pull` is **measured**: tokens that skim a transfer fee deliver less
/// than requested, and the returned quantity — never the requested one —
/// is what callers must account with.
pub trait ValueTransfer {
    /// Move `amount` of `token` out of `from` into custody.
    /// Returns the quantity actually received.
    fn pull(&mut self, from: AccountId, token: &str, amount: Decimal) -> Result<Decimal>;

    /// Move `amount` of `token` from custody to `to`.
    fn push(&mut self, to: AccountId, token: &str, amount: Decimal) -> Result<()>;

    fn balance(&self, account: AccountId, token: &str) -> Decimal;
}

/// Verifiable external randomness for panel selection.
///
/// Replaces sequencer-influenceable entropy: the beacon output for a round
/// is fixed before any party knows which round a dispute will consume, and
/// anyone can re-derive the selection from the stored seed afterwards.
pub trait RandomnessBeacon {
    fn draw(&mut self, round: u64) -> [u8; 32];
}

/// Ledger-side entry into the Dispute Engine (Job Ledger -> engine).
pub trait ArbitrationHook {
    /// Open a case for a contested job. Selects the panel or fails with
    /// `InsufficientArbitrators`, leaving the caller free to abort.
    fn open_case(
        &mut self,
        intake: DisputeIntake,
        salt: [u8; 32],
        now: DateTime<Utc>,
    ) -> Result<DisputeId>;
}

/// Engine-side callback into the Job Ledger (engine -> ledger).
///
/// Implementations must verify the capability: the job must be `Disputed`
/// and `dispute_id` must match the link recorded when the dispute opened.
pub trait ResolutionSink {
    fn resolve_disputed_job(
        &mut self,
        vault: &mut dyn ValueTransfer,
        job_id: JobId,
        dispute_id: DisputeId,
        ruling: Ruling,
        now: DateTime<Utc>,
    ) -> Result<()>;
}
