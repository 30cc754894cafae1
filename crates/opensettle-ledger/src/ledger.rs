//! The Job Ledger: escrow custody and the job state machine.
//!
//! State graph (strictly forward, finalize exactly once):
//!
//! ```text
//! Active -> Delivered -> Confirmed            (buyer confirms)
//!                     -> Released             (window elapsed, anyone)
//!                     -> Disputed -> Resolved (engine callback)
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use opensettle_types::{
    AccountId, ArbitrationHook, BanOracle, DisputeId, DisputeIntake, Job, JobId, JobStatus,
    LedgerConfig, Listing, ListingDirectory, OpenJob, OpensettleError, ReputationOracle,
    ResolutionSink, Result, Ruling, ValueTransfer,
};
use rust_decimal::Decimal;

use crate::conservation::SettlementRecord;
use crate::fees;

/// Owns all job state. Collaborators (vault, oracles, the arbitration
/// hook) are passed into each operation rather than held, so the ledger
/// itself carries no references out of the settlement core.
pub struct JobLedger {
    jobs: HashMap<JobId, Job>,
    settlements: HashMap<JobId, SettlementRecord>,
    config: LedgerConfig,
}

impl JobLedger {
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            jobs: HashMap::new(),
            settlements: HashMap::new(),
            config,
        }
    }

    /// Open a job: validate, escrow the funds, record the measured amount.
    ///
    /// The fee is computed from the quantity actually received after the
    /// transfer — zero for the native token, a fixed basis-point fee
    /// otherwise.
    ///
    /// # Errors
    /// `InvalidListing`, `SelfDealing`, `ZeroAmount`, `TokenMismatch`,
    /// `PartyBanned`, `ZeroReceived`, `InsufficientBalance`.
    pub fn open_job(
        &mut self,
        vault: &mut dyn ValueTransfer,
        listings: &dyn ListingDirectory,
        bans: &dyn BanOracle,
        req: OpenJob,
        now: DateTime<Utc>,
    ) -> Result<JobId> {
        let listing = Self::validate_open(listings, bans, &req)?;

        // Escrow the funds. `pull` is measured: skimming tokens deliver
        // less than requested, and the job is sized by what arrived.
        let received = vault.pull(req.payer, &req.token, req.amount)?;
        if received <= Decimal::ZERO {
            return Err(OpensettleError::ZeroReceived);
        }

        let fee = fees::fee_for(received, &req.token, &self.config);
        let id = JobId::new();
        let job = Job {
            id,
            listing_id: req.listing_id,
            buyer: req.buyer,
            seller: req.seller,
            payer: req.payer,
            refund_recipient: req.refund_recipient,
            amount: received,
            token: req.token,
            fee,
            status: JobStatus::Active,
            created_at: now,
            delivered_at: None,
            dispute_window_end: None,
            delivery_metadata: None,
            dispute: None,
            resolution: None,
            estimate_secs: listing.estimated_delivery_secs,
        };

        tracing::info!(job = %id, amount = %received, token = %job.token, "job opened");
        self.settlements.insert(id, SettlementRecord::opened(received));
        self.jobs.insert(id, job);
        Ok(id)
    }

    /// All fund-free validation for an open request. Exposed so callers
    /// that front escrow for a buyer (the insurance pool) can reject a
    /// bad request before moving any money.
    pub fn validate_open(
        listings: &dyn ListingDirectory,
        bans: &dyn BanOracle,
        req: &OpenJob,
    ) -> Result<Listing> {
        if req.amount <= Decimal::ZERO {
            return Err(OpensettleError::ZeroAmount);
        }
        if req.buyer == req.seller {
            return Err(OpensettleError::SelfDealing);
        }

        let listing = listings
            .listing(req.listing_id)
            .ok_or_else(|| OpensettleError::InvalidListing {
                reason: format!("{} not found", req.listing_id),
            })?;
        if !listing.active {
            return Err(OpensettleError::InvalidListing {
                reason: format!("{} is inactive", req.listing_id),
            });
        }
        if listing.provider != req.seller {
            return Err(OpensettleError::InvalidListing {
                reason: format!("{} is not provided by the named seller", req.listing_id),
            });
        }
        if listing.settlement_token != req.token {
            return Err(OpensettleError::TokenMismatch {
                expected: listing.settlement_token,
                actual: req.token.clone(),
            });
        }
        if bans.is_banned(req.buyer) {
            return Err(OpensettleError::PartyBanned(req.buyer));
        }
        if bans.is_banned(req.seller) {
            return Err(OpensettleError::PartyBanned(req.seller));
        }
        Ok(listing)
    }

    /// Seller submits delivery: `Active -> Delivered`, dispute window set.
    pub fn submit_delivery(
        &mut self,
        job_id: JobId,
        caller: AccountId,
        metadata: String,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let config = self.config.clone();
        let job = self.job_mut(job_id)?;
        if caller != job.seller {
            return Err(OpensettleError::NotJobSeller(job_id));
        }
        Self::expect_status(job, JobStatus::Active)?;

        let window = fees::dispute_window_secs(job.amount, &config);
        job.status = JobStatus::Delivered;
        job.delivered_at = Some(now);
        job.dispute_window_end = Some(now + Duration::seconds(window));
        job.delivery_metadata = Some(metadata);
        Ok(())
    }

    /// Buyer confirms delivery: `Delivered -> Confirmed`, funds release.
    pub fn confirm_delivery(
        &mut self,
        vault: &mut dyn ValueTransfer,
        reputation: &mut dyn ReputationOracle,
        job_id: JobId,
        caller: AccountId,
        _now: DateTime<Utc>,
    ) -> Result<()> {
        let job = self.job_ref(job_id)?;
        if caller != job.buyer {
            return Err(OpensettleError::NotJobBuyer(job_id));
        }
        Self::expect_status(job, JobStatus::Delivered)?;
        self.release_to_seller(vault, reputation, job_id, JobStatus::Confirmed)
    }

    /// Buyer contests delivery: `Delivered -> Disputed`.
    ///
    /// The case is opened through the arbitration hook **before** the
    /// ledger commits, so a capacity failure (`InsufficientArbitrators`)
    /// leaves the job untouched and the buyer free to retry.
    pub fn initiate_dispute(
        &mut self,
        engine: &mut dyn ArbitrationHook,
        job_id: JobId,
        caller: AccountId,
        evidence: String,
        salt: [u8; 32],
        now: DateTime<Utc>,
    ) -> Result<DisputeId> {
        let job = self.job_ref(job_id)?;
        if caller != job.buyer {
            return Err(OpensettleError::NotJobBuyer(job_id));
        }
        Self::expect_status(job, JobStatus::Delivered)?;
        let ended = job
            .dispute_window_end
            .ok_or_else(|| OpensettleError::Internal("delivered job missing window".into()))?;
        if now > ended {
            return Err(OpensettleError::DisputeWindowClosed { ended });
        }
        if evidence.trim().is_empty() {
            return Err(OpensettleError::EmptyEvidence);
        }

        let intake = DisputeIntake {
            job_id,
            buyer: job.buyer,
            seller: job.seller,
            amount: job.amount,
            token: job.token.clone(),
            buyer_evidence: evidence,
        };
        let dispute_id = engine.open_case(intake, salt, now)?;

        let job = self.job_mut(job_id)?;
        job.status = JobStatus::Disputed;
        job.dispute = Some(dispute_id);
        tracing::info!(job = %job_id, dispute = %dispute_id, "dispute opened");
        Ok(dispute_id)
    }

    /// Release after the window elapses undisputed: `Delivered -> Released`.
    /// Callable by anyone, so buyer inaction cannot freeze seller funds.
    pub fn auto_release(
        &mut self,
        vault: &mut dyn ValueTransfer,
        reputation: &mut dyn ReputationOracle,
        job_id: JobId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let job = self.job_ref(job_id)?;
        Self::expect_status(job, JobStatus::Delivered)?;
        let until = job
            .dispute_window_end
            .ok_or_else(|| OpensettleError::Internal("delivered job missing window".into()))?;
        if now <= until {
            return Err(OpensettleError::DisputeWindowOpen { until });
        }
        self.release_to_seller(vault, reputation, job_id, JobStatus::Released)
    }

    /// Look up a job.
    #[must_use]
    pub fn job(&self, job_id: JobId) -> Option<&Job> {
        self.jobs.get(&job_id)
    }

    /// Settlement record for a job.
    #[must_use]
    pub fn settlement(&self, job_id: JobId) -> Option<&SettlementRecord> {
        self.settlements.get(&job_id)
    }

    /// Verify the conservation invariant for a finalized job.
    pub fn verify_settlement(&self, job_id: JobId) -> Result<()> {
        self.settlements
            .get(&job_id)
            .ok_or(OpensettleError::JobNotFound(job_id))?
            .verify()
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // -- internals ---------------------------------------------------------

    fn job_ref(&self, job_id: JobId) -> Result<&Job> {
        self.jobs
            .get(&job_id)
            .ok_or(OpensettleError::JobNotFound(job_id))
    }

    fn job_mut(&mut self, job_id: JobId) -> Result<&mut Job> {
        self.jobs
            .get_mut(&job_id)
            .ok_or(OpensettleError::JobNotFound(job_id))
    }

    fn expect_status(job: &Job, expected: JobStatus) -> Result<()> {
        if job.status == expected {
            Ok(())
        } else {
            Err(OpensettleError::InvalidJobStatus {
                expected,
                actual: job.status,
            })
        }
    }

    /// Seller-favoring payout: fee to treasury, remainder to seller, then
    /// the completion signal. Shared by confirmation and auto-release.
    fn release_to_seller(
        &mut self,
        vault: &mut dyn ValueTransfer,
        reputation: &mut dyn ReputationOracle,
        job_id: JobId,
        terminal: JobStatus,
    ) -> Result<()> {
        let (seller, buyer, token, amount, fee, delivery, estimate) = {
            let job = self.job_ref(job_id)?;
            (
                job.seller,
                job.buyer,
                job.token.clone(),
                job.amount,
                job.fee,
                job.delivery_secs(),
                job.estimate_secs,
            )
        };

        if fee > Decimal::ZERO {
            vault.push(self.config.treasury, &token, fee)?;
        }
        vault.push(seller, &token, amount - fee)?;

        let record = self
            .settlements
            .get_mut(&job_id)
            .ok_or(OpensettleError::JobNotFound(job_id))?;
        record.fee = fee;
        record.seller_payout = amount - fee;
        record.verify()?;

        let job = self.job_mut(job_id)?;
        job.status = terminal;
        tracing::debug!(job = %job_id, status = %terminal, "funds released to seller");

        // Bookkeeping is complete; the oracle callout comes last.
        reputation.record_completion(seller, buyer, delivery, estimate);
        Ok(())
    }
}

impl ResolutionSink for JobLedger {
    /// Dispute-engine callback. Capability check: the job must be
    /// `Disputed` and `dispute_id` must match the link recorded at
    /// initiation; the one-way transition makes this run at most once.
    fn resolve_disputed_job(
        &mut self,
        vault: &mut dyn ValueTransfer,
        job_id: JobId,
        dispute_id: DisputeId,
        ruling: Ruling,
        _now: DateTime<Utc>,
    ) -> Result<()> {
        let (seller, recipient, token, amount, fee) = {
            let job = self.job_ref(job_id)?;
            if job.status != JobStatus::Disputed || job.dispute != Some(dispute_id) {
                return Err(OpensettleError::ResolutionNotAuthorized(job_id));
            }
            (
                job.seller,
                job.refund_recipient,
                job.token.clone(),
                job.amount,
                job.fee,
            )
        };

        let (fee_paid, to_seller, refunded) = match ruling {
            // Full amount back, fee-free: the protocol does not profit
            // from a delivery it ruled against.
            Ruling::BuyerWins => {
                vault.push(recipient, &token, amount)?;
                (Decimal::ZERO, Decimal::ZERO, amount)
            }
            Ruling::SellerWins => {
                if fee > Decimal::ZERO {
                    vault.push(self.config.treasury, &token, fee)?;
                }
                vault.push(seller, &token, amount - fee)?;
                (fee, amount - fee, Decimal::ZERO)
            }
            Ruling::Draw => {
                let half = amount / Decimal::from(2u8);
                vault.push(recipient, &token, half)?;
                vault.push(seller, &token, amount - half)?;
                (Decimal::ZERO, amount - half, half)
            }
            Ruling::Pending => return Err(OpensettleError::ResolutionNotAuthorized(job_id)),
        };

        let record = self
            .settlements
            .get_mut(&job_id)
            .ok_or(OpensettleError::JobNotFound(job_id))?;
        record.fee = fee_paid;
        record.seller_payout = to_seller;
        record.buyer_refund = refunded;
        record.verify()?;

        let job = self.job_mut(job_id)?;
        job.status = JobStatus::Resolved;
        job.resolution = Some(ruling);
        tracing::info!(job = %job_id, dispute = %dispute_id, ruling = %ruling, "dispute resolved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensettle_types::mock::{MockReputation, StaticBans, StaticListings};
    use opensettle_types::Listing;

    use crate::vault::Vault;

    struct Setup {
        ledger: JobLedger,
        vault: Vault,
        listings: StaticListings,
        bans: StaticBans,
        reputation: MockReputation,
        treasury: AccountId,
        buyer: AccountId,
        seller: AccountId,
        listing: opensettle_types::ListingId,
    }

    fn setup_with_token(token: &str) -> Setup {
        let treasury = AccountId::new();
        let buyer = AccountId::new();
        let seller = AccountId::new();
        let mut listings = StaticListings::new();
        let listing = listings.add_active(1, seller, token, 3600);
        let mut vault = Vault::new();
        vault.deposit(buyer, token, Decimal::new(100_000, 0));
        Setup {
            ledger: JobLedger::new(LedgerConfig::with_treasury(treasury)),
            vault,
            listings,
            bans: StaticBans::new(),
            reputation: MockReputation::new(),
            treasury,
            buyer,
            seller,
            listing,
        }
    }

    fn setup() -> Setup {
        setup_with_token("SETL")
    }

    fn open(s: &mut Setup, amount: i64) -> JobId {
        let req = OpenJob::direct(
            s.buyer,
            s.listing,
            s.seller,
            Decimal::new(amount, 0),
            s.listings.listings[&s.listing].settlement_token.clone(),
        );
        s.ledger
            .open_job(&mut s.vault, &s.listings, &s.bans, req, Utc::now())
            .unwrap()
    }

    /// Hook stub: hands out a fixed dispute id, or fails on demand.
    struct FakeEngine {
        next: DisputeId,
        fail: bool,
    }

    impl ArbitrationHook for FakeEngine {
        fn open_case(
            &mut self,
            _intake: DisputeIntake,
            _salt: [u8; 32],
            _now: DateTime<Utc>,
        ) -> Result<DisputeId> {
            if self.fail {
                Err(OpensettleError::InsufficientArbitrators {
                    needed: 3,
                    available: 0,
                })
            } else {
                Ok(self.next)
            }
        }
    }

    #[test]
    fn open_job_escrows_and_records() {
        let mut s = setup();
        let id = open(&mut s, 1_000);

        let job = s.ledger.job(id).unwrap();
        assert_eq!(job.status, JobStatus::Active);
        assert_eq!(job.amount, Decimal::new(1_000, 0));
        assert_eq!(job.fee, Decimal::ZERO); // native token
        assert_eq!(s.vault.balance(s.buyer, "SETL"), Decimal::new(99_000, 0));
        assert_eq!(s.vault.custody("SETL"), Decimal::new(1_000, 0));
    }

    #[test]
    fn open_rejects_self_dealing() {
        let mut s = setup();
        let req = OpenJob::direct(s.seller, s.listing, s.seller, Decimal::ONE, "SETL");
        let err = s
            .ledger
            .open_job(&mut s.vault, &s.listings, &s.bans, req, Utc::now())
            .unwrap_err();
        assert!(matches!(err, OpensettleError::SelfDealing));
    }

    #[test]
    fn open_rejects_zero_amount() {
        let mut s = setup();
        let req = OpenJob::direct(s.buyer, s.listing, s.seller, Decimal::ZERO, "SETL");
        let err = s
            .ledger
            .open_job(&mut s.vault, &s.listings, &s.bans, req, Utc::now())
            .unwrap_err();
        assert!(matches!(err, OpensettleError::ZeroAmount));
    }

    #[test]
    fn open_rejects_inactive_listing() {
        let mut s = setup();
        let stale = opensettle_types::ListingId(9);
        s.listings.insert(
            stale,
            Listing {
                provider: s.seller,
                settlement_token: "SETL".to_string(),
                estimated_delivery_secs: 3600,
                active: false,
            },
        );
        let req = OpenJob::direct(s.buyer, stale, s.seller, Decimal::ONE, "SETL");
        let err = s
            .ledger
            .open_job(&mut s.vault, &s.listings, &s.bans, req, Utc::now())
            .unwrap_err();
        assert!(matches!(err, OpensettleError::InvalidListing { .. }));
    }

    #[test]
    fn open_rejects_wrong_provider() {
        let mut s = setup();
        let impostor = AccountId::new();
        let req = OpenJob::direct(s.buyer, s.listing, impostor, Decimal::ONE, "SETL");
        let err = s
            .ledger
            .open_job(&mut s.vault, &s.listings, &s.bans, req, Utc::now())
            .unwrap_err();
        assert!(matches!(err, OpensettleError::InvalidListing { .. }));
    }

    #[test]
    fn open_rejects_token_mismatch() {
        let mut s = setup();
        let req = OpenJob::direct(s.buyer, s.listing, s.seller, Decimal::ONE, "USDC");
        let err = s
            .ledger
            .open_job(&mut s.vault, &s.listings, &s.bans, req, Utc::now())
            .unwrap_err();
        assert!(matches!(err, OpensettleError::TokenMismatch { .. }));
    }

    #[test]
    fn open_rejects_banned_parties() {
        let mut s = setup();
        s.bans.ban(s.buyer);
        let req = OpenJob::direct(s.buyer, s.listing, s.seller, Decimal::ONE, "SETL");
        let err = s
            .ledger
            .open_job(&mut s.vault, &s.listings, &s.bans, req, Utc::now())
            .unwrap_err();
        assert!(matches!(err, OpensettleError::PartyBanned(a) if a == s.buyer));
        // Validation failed before any transfer.
        assert_eq!(s.vault.balance(s.buyer, "SETL"), Decimal::new(100_000, 0));
    }

    #[test]
    fn skimming_token_sizes_job_by_received() {
        let mut s = setup_with_token("USDC");
        s.vault.set_skim_bps("USDC", 100); // 1% transfer fee
        let id = open(&mut s, 1_000);

        let job = s.ledger.job(id).unwrap();
        assert_eq!(job.amount, Decimal::new(990, 0));
        // 250 bps of the 990 received, not of the 1,000 requested.
        assert_eq!(job.fee, Decimal::new(2475, 2));
    }

    #[test]
    fn confirm_releases_fee_and_payout() {
        let mut s = setup_with_token("USDC");
        let id = open(&mut s, 1_000);
        let now = Utc::now();
        s.ledger
            .submit_delivery(id, s.seller, "ipfs://result".into(), now)
            .unwrap();
        s.ledger
            .confirm_delivery(&mut s.vault, &mut s.reputation, id, s.buyer, now)
            .unwrap();

        let job = s.ledger.job(id).unwrap();
        assert_eq!(job.status, JobStatus::Confirmed);
        assert_eq!(s.vault.balance(s.treasury, "USDC"), Decimal::new(25, 0));
        assert_eq!(s.vault.balance(s.seller, "USDC"), Decimal::new(975, 0));
        assert_eq!(s.reputation.completions.len(), 1);
        s.ledger.verify_settlement(id).unwrap();
    }

    #[test]
    fn confirm_requires_buyer_and_delivered() {
        let mut s = setup();
        let id = open(&mut s, 1_000);
        let now = Utc::now();

        let err = s
            .ledger
            .confirm_delivery(&mut s.vault, &mut s.reputation, id, s.buyer, now)
            .unwrap_err();
        assert!(matches!(err, OpensettleError::InvalidJobStatus { .. }));

        s.ledger
            .submit_delivery(id, s.seller, "done".into(), now)
            .unwrap();
        let err = s
            .ledger
            .confirm_delivery(&mut s.vault, &mut s.reputation, id, s.seller, now)
            .unwrap_err();
        assert!(matches!(err, OpensettleError::NotJobBuyer(_)));
    }

    #[test]
    fn submit_delivery_requires_seller() {
        let mut s = setup();
        let id = open(&mut s, 1_000);
        let err = s
            .ledger
            .submit_delivery(id, s.buyer, "fake".into(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, OpensettleError::NotJobSeller(_)));
    }

    #[test]
    fn window_scales_with_amount() {
        let mut s = setup();
        let small = open(&mut s, 1_000);
        let large = open(&mut s, 10_000);
        let now = Utc::now();
        s.ledger
            .submit_delivery(small, s.seller, "a".into(), now)
            .unwrap();
        s.ledger
            .submit_delivery(large, s.seller, "b".into(), now)
            .unwrap();

        let cfg = s.ledger.config().clone();
        let small_end = s.ledger.job(small).unwrap().dispute_window_end.unwrap();
        let large_end = s.ledger.job(large).unwrap().dispute_window_end.unwrap();
        assert_eq!(small_end, now + Duration::seconds(cfg.standard_window_secs));
        assert_eq!(large_end, now + Duration::seconds(cfg.extended_window_secs));
    }

    #[test]
    fn auto_release_too_early_errors() {
        let mut s = setup();
        let id = open(&mut s, 1_000);
        let now = Utc::now();
        s.ledger
            .submit_delivery(id, s.seller, "done".into(), now)
            .unwrap();

        let err = s
            .ledger
            .auto_release(&mut s.vault, &mut s.reputation, id, now)
            .unwrap_err();
        assert!(matches!(err, OpensettleError::DisputeWindowOpen { .. }));
    }

    #[test]
    fn auto_release_matches_confirmed_path() {
        let mut s = setup_with_token("USDC");
        let id = open(&mut s, 1_000);
        let now = Utc::now();
        s.ledger
            .submit_delivery(id, s.seller, "done".into(), now)
            .unwrap();

        let later = now + Duration::days(4);
        s.ledger
            .auto_release(&mut s.vault, &mut s.reputation, id, later)
            .unwrap();

        let job = s.ledger.job(id).unwrap();
        assert_eq!(job.status, JobStatus::Released);
        assert_eq!(s.vault.balance(s.seller, "USDC"), Decimal::new(975, 0));
        assert_eq!(s.vault.balance(s.treasury, "USDC"), Decimal::new(25, 0));
        s.ledger.verify_settlement(id).unwrap();
    }

    #[test]
    fn dispute_window_closed_rejected() {
        let mut s = setup();
        let id = open(&mut s, 1_000);
        let now = Utc::now();
        s.ledger
            .submit_delivery(id, s.seller, "done".into(), now)
            .unwrap();

        let mut engine = FakeEngine {
            next: DisputeId::new(),
            fail: false,
        };
        let err = s
            .ledger
            .initiate_dispute(
                &mut engine,
                id,
                s.buyer,
                "bad".into(),
                [0u8; 32],
                now + Duration::days(30),
            )
            .unwrap_err();
        assert!(matches!(err, OpensettleError::DisputeWindowClosed { .. }));
    }

    #[test]
    fn dispute_requires_evidence() {
        let mut s = setup();
        let id = open(&mut s, 1_000);
        let now = Utc::now();
        s.ledger
            .submit_delivery(id, s.seller, "done".into(), now)
            .unwrap();

        let mut engine = FakeEngine {
            next: DisputeId::new(),
            fail: false,
        };
        let err = s
            .ledger
            .initiate_dispute(&mut engine, id, s.buyer, "  ".into(), [0u8; 32], now)
            .unwrap_err();
        assert!(matches!(err, OpensettleError::EmptyEvidence));
    }

    #[test]
    fn engine_failure_leaves_job_untouched() {
        let mut s = setup();
        let id = open(&mut s, 1_000);
        let now = Utc::now();
        s.ledger
            .submit_delivery(id, s.seller, "done".into(), now)
            .unwrap();

        let mut engine = FakeEngine {
            next: DisputeId::new(),
            fail: true,
        };
        let err = s
            .ledger
            .initiate_dispute(&mut engine, id, s.buyer, "bad".into(), [0u8; 32], now)
            .unwrap_err();
        assert!(matches!(err, OpensettleError::InsufficientArbitrators { .. }));

        let job = s.ledger.job(id).unwrap();
        assert_eq!(job.status, JobStatus::Delivered);
        assert!(job.dispute.is_none());
    }

    #[test]
    fn dispute_commits_link() {
        let mut s = setup();
        let id = open(&mut s, 1_000);
        let now = Utc::now();
        s.ledger
            .submit_delivery(id, s.seller, "done".into(), now)
            .unwrap();

        let dispute_id = DisputeId::new();
        let mut engine = FakeEngine {
            next: dispute_id,
            fail: false,
        };
        let got = s
            .ledger
            .initiate_dispute(&mut engine, id, s.buyer, "bad".into(), [0u8; 32], now)
            .unwrap();
        assert_eq!(got, dispute_id);

        let job = s.ledger.job(id).unwrap();
        assert_eq!(job.status, JobStatus::Disputed);
        assert_eq!(job.dispute, Some(dispute_id));
    }

    fn disputed_job(s: &mut Setup, amount: i64) -> (JobId, DisputeId) {
        let id = open(s, amount);
        let now = Utc::now();
        s.ledger
            .submit_delivery(id, s.seller, "done".into(), now)
            .unwrap();
        let dispute_id = DisputeId::new();
        let mut engine = FakeEngine {
            next: dispute_id,
            fail: false,
        };
        s.ledger
            .initiate_dispute(&mut engine, id, s.buyer, "bad".into(), [0u8; 32], now)
            .unwrap();
        (id, dispute_id)
    }

    #[test]
    fn resolve_buyer_win_is_fee_free() {
        let mut s = setup_with_token("USDC");
        let (id, dispute_id) = disputed_job(&mut s, 1_000);

        s.ledger
            .resolve_disputed_job(&mut s.vault, id, dispute_id, Ruling::BuyerWins, Utc::now())
            .unwrap();

        let job = s.ledger.job(id).unwrap();
        assert_eq!(job.status, JobStatus::Resolved);
        assert_eq!(job.resolution, Some(Ruling::BuyerWins));
        // Full refund, no fee taken.
        assert_eq!(s.vault.balance(s.buyer, "USDC"), Decimal::new(100_000, 0));
        assert_eq!(s.vault.balance(s.treasury, "USDC"), Decimal::ZERO);
        s.ledger.verify_settlement(id).unwrap();
    }

    #[test]
    fn resolve_seller_win_pays_like_confirmation() {
        let mut s = setup_with_token("USDC");
        let (id, dispute_id) = disputed_job(&mut s, 1_000);

        s.ledger
            .resolve_disputed_job(&mut s.vault, id, dispute_id, Ruling::SellerWins, Utc::now())
            .unwrap();

        assert_eq!(s.vault.balance(s.seller, "USDC"), Decimal::new(975, 0));
        assert_eq!(s.vault.balance(s.treasury, "USDC"), Decimal::new(25, 0));
        s.ledger.verify_settlement(id).unwrap();
    }

    #[test]
    fn resolve_draw_splits_evenly() {
        let mut s = setup();
        let (id, dispute_id) = disputed_job(&mut s, 1_000);

        s.ledger
            .resolve_disputed_job(&mut s.vault, id, dispute_id, Ruling::Draw, Utc::now())
            .unwrap();

        assert_eq!(s.vault.balance(s.seller, "SETL"), Decimal::new(500, 0));
        assert_eq!(s.vault.balance(s.buyer, "SETL"), Decimal::new(99_500, 0));
        s.ledger.verify_settlement(id).unwrap();
    }

    #[test]
    fn resolve_requires_matching_dispute_link() {
        let mut s = setup();
        let (id, _dispute_id) = disputed_job(&mut s, 1_000);

        let err = s
            .ledger
            .resolve_disputed_job(
                &mut s.vault,
                id,
                DisputeId::new(),
                Ruling::BuyerWins,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, OpensettleError::ResolutionNotAuthorized(_)));
    }

    #[test]
    fn resolve_runs_at_most_once() {
        let mut s = setup();
        let (id, dispute_id) = disputed_job(&mut s, 1_000);

        s.ledger
            .resolve_disputed_job(&mut s.vault, id, dispute_id, Ruling::SellerWins, Utc::now())
            .unwrap();
        let err = s
            .ledger
            .resolve_disputed_job(&mut s.vault, id, dispute_id, Ruling::BuyerWins, Utc::now())
            .unwrap_err();
        assert!(matches!(err, OpensettleError::ResolutionNotAuthorized(_)));
    }

    #[test]
    fn resolve_rejects_undisputed_job() {
        let mut s = setup();
        let id = open(&mut s, 1_000);
        let err = s
            .ledger
            .resolve_disputed_job(
                &mut s.vault,
                id,
                DisputeId::new(),
                Ruling::BuyerWins,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, OpensettleError::ResolutionNotAuthorized(_)));
    }
}
