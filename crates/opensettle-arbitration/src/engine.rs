//! The Dispute Engine: case lifecycle and ruling execution.
//!
//! A case runs `EvidencePhase -> Voting -> Resolved`. Every deadline has
//! a permissionless advance path so one silent party can never wedge a
//! case: `advance_to_voting` after the evidence deadline, and
//! `execute_ruling` after the voting deadline with at least one ballot.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use opensettle_types::{
    constants::{BPS_DENOMINATOR, PANEL_SIZE},
    AccountId, ArbitrationConfig, ArbitrationHook, Dispute, DisputeId, DisputeIntake,
    DisputeStatus, OpensettleError, RandomnessBeacon, ReputationOracle, ResolutionSink, Result,
    Ruling, StakeOracle, ValueTransfer,
};
use rust_decimal::Decimal;

use crate::registry::ArbitratorRegistry;
use crate::selection;

/// Owns all dispute state and the arbitrator registry. The ledger enters
/// through [`ArbitrationHook`] and gets resolution back through the
/// [`ResolutionSink`] passed into [`execute_ruling`](Self::execute_ruling).
pub struct DisputeEngine {
    disputes: HashMap<DisputeId, Dispute>,
    registry: ArbitratorRegistry,
    beacon: Box<dyn RandomnessBeacon>,
    /// Monotone per-engine counter mixed into every selection seed.
    nonce: u64,
}

impl DisputeEngine {
    #[must_use]
    pub fn new(config: ArbitrationConfig, beacon: Box<dyn RandomnessBeacon>) -> Self {
        Self {
            disputes: HashMap::new(),
            registry: ArbitratorRegistry::new(config),
            beacon,
            nonce: 0,
        }
    }

    /// Seller answers the buyer's evidence; the case moves straight to
    /// voting with a fresh deadline.
    pub fn submit_counter_evidence(
        &mut self,
        dispute_id: DisputeId,
        caller: AccountId,
        evidence: String,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let voting_window = self.registry.config().voting_window_secs;
        let dispute = self.dispute_mut(dispute_id)?;
        Self::expect_phase(dispute, DisputeStatus::EvidencePhase)?;
        if caller != dispute.seller {
            return Err(OpensettleError::NotJobSeller(dispute.job_id));
        }
        if now > dispute.counter_evidence_deadline {
            return Err(OpensettleError::EvidenceDeadlinePassed);
        }
        if evidence.trim().is_empty() {
            return Err(OpensettleError::EmptyEvidence);
        }

        dispute.seller_evidence = Some(evidence);
        dispute.status = DisputeStatus::Voting;
        dispute.voting_deadline = now + Duration::seconds(voting_window);
        Ok(())
    }

    /// Move to voting after the evidence deadline with no seller response.
    /// Callable by anyone.
    pub fn advance_to_voting(&mut self, dispute_id: DisputeId, now: DateTime<Utc>) -> Result<()> {
        let voting_window = self.registry.config().voting_window_secs;
        let dispute = self.dispute_mut(dispute_id)?;
        Self::expect_phase(dispute, DisputeStatus::EvidencePhase)?;
        if now <= dispute.counter_evidence_deadline {
            return Err(OpensettleError::EvidenceWindowStillOpen);
        }
        dispute.status = DisputeStatus::Voting;
        dispute.voting_deadline = now + Duration::seconds(voting_window);
        Ok(())
    }

    /// Cast a ballot. Panel members only, one each, before the deadline.
    pub fn vote(
        &mut self,
        dispute_id: DisputeId,
        caller: AccountId,
        favor_buyer: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let dispute = self.dispute_mut(dispute_id)?;
        Self::expect_phase(dispute, DisputeStatus::Voting)?;
        if now > dispute.voting_deadline {
            return Err(OpensettleError::VotingClosed);
        }
        let slot = dispute
            .panel_slot(caller)
            .ok_or(OpensettleError::NotPanelMember(caller))?;
        if dispute.ballots[slot].is_some() {
            return Err(OpensettleError::AlreadyVoted(caller));
        }
        dispute.ballots[slot] = Some(favor_buyer);
        Ok(())
    }

    /// Tally and execute the ruling: the slash and the ledger callback
    /// run first, then reputation, panel stats, and the terminal status.
    ///
    /// Runs once all three ballots are in, or permissionlessly after the
    /// deadline with at least one ballot cast. A post-deadline 1-1 split
    /// is a `Draw`.
    pub fn execute_ruling(
        &mut self,
        vault: &mut dyn ValueTransfer,
        stake: &mut dyn StakeOracle,
        reputation: &mut dyn ReputationOracle,
        sink: &mut dyn ResolutionSink,
        dispute_id: DisputeId,
        now: DateTime<Utc>,
    ) -> Result<Ruling> {
        let min_slash_bps = self.registry.config().min_slash_bps;
        let (job_id, buyer, seller, panel, ballots, ruling) = {
            let dispute = self
                .disputes
                .get(&dispute_id)
                .ok_or(OpensettleError::DisputeNotFound(dispute_id))?;
            Self::expect_phase(dispute, DisputeStatus::Voting)?;
            if dispute.votes_cast() < PANEL_SIZE {
                if now <= dispute.voting_deadline {
                    return Err(OpensettleError::VotingStillOpen);
                }
                if dispute.votes_cast() == 0 {
                    return Err(OpensettleError::NoVotesCast);
                }
            }
            (
                dispute.job_id,
                dispute.buyer,
                dispute.seller,
                dispute.panel,
                dispute.ballots,
                dispute.tally(),
            )
        };

        // Fallible collaborator calls come first: if the slash or the
        // ledger callback errors, the case is still `Voting` and the call
        // can be retried.
        if ruling == Ruling::BuyerWins {
            let held = stake.stake_of(seller);
            let slash = held * Decimal::from(min_slash_bps) / Decimal::from(BPS_DENOMINATOR);
            if slash > Decimal::ZERO {
                let slashed = stake.slash(seller, slash, buyer)?;
                tracing::info!(dispute = %dispute_id, seller = %seller.short(), amount = %slashed, "seller stake slashed");
            }
        }
        sink.resolve_disputed_job(vault, job_id, dispute_id, ruling, now)?;

        // Commit: reputation, panel stats, terminal status.
        match ruling {
            Ruling::BuyerWins => reputation.record_dispute(seller, false),
            Ruling::SellerWins => reputation.record_dispute(seller, true),
            // No majority: no slash, no reputation event.
            Ruling::Draw | Ruling::Pending => {}
        }
        for (slot, member) in panel.iter().enumerate() {
            let with_majority = match ruling {
                Ruling::BuyerWins => ballots[slot] == Some(true),
                Ruling::SellerWins => ballots[slot] == Some(false),
                Ruling::Draw | Ruling::Pending => false,
            };
            self.registry.case_closed(*member, with_majority)?;
        }
        let dispute = self.dispute_mut(dispute_id)?;
        dispute.status = DisputeStatus::Resolved;
        dispute.ruling = ruling;
        tracing::info!(dispute = %dispute_id, job = %job_id, ruling = %ruling, "ruling executed");
        Ok(ruling)
    }

    #[must_use]
    pub fn dispute(&self, dispute_id: DisputeId) -> Option<&Dispute> {
        self.disputes.get(&dispute_id)
    }

    #[must_use]
    pub fn registry(&self) -> &ArbitratorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ArbitratorRegistry {
        &mut self.registry
    }

    fn dispute_mut(&mut self, dispute_id: DisputeId) -> Result<&mut Dispute> {
        self.disputes
            .get_mut(&dispute_id)
            .ok_or(OpensettleError::DisputeNotFound(dispute_id))
    }

    fn expect_phase(dispute: &Dispute, expected: DisputeStatus) -> Result<()> {
        if dispute.status == expected {
            Ok(())
        } else {
            Err(OpensettleError::WrongDisputePhase {
                expected,
                actual: dispute.status,
            })
        }
    }
}

impl ArbitrationHook for DisputeEngine {
    fn open_case(
        &mut self,
        intake: DisputeIntake,
        salt: [u8; 32],
        now: DateTime<Utc>,
    ) -> Result<DisputeId> {
        self.nonce += 1;
        let draw = self.beacon.draw(self.nonce);
        let seed = selection::derive_seed(&intake, salt, self.nonce, draw);

        let candidates = self.registry.eligible(intake.amount);
        let panel = selection::select_panel(&candidates, seed)?;
        self.registry.assign(&panel)?;

        let config = self.registry.config();
        let counter_evidence_deadline = now + Duration::seconds(config.evidence_window_secs);
        let id = DisputeId::new();
        let dispute = Dispute {
            id,
            job_id: intake.job_id,
            buyer: intake.buyer,
            seller: intake.seller,
            amount: intake.amount,
            token: intake.token,
            buyer_evidence: intake.buyer_evidence,
            seller_evidence: None,
            panel,
            ballots: [None; PANEL_SIZE],
            status: DisputeStatus::EvidencePhase,
            ruling: Ruling::Pending,
            counter_evidence_deadline,
            // Provisional; refreshed when the case actually enters voting.
            voting_deadline: counter_evidence_deadline
                + Duration::seconds(config.voting_window_secs),
            selection_seed: seed,
        };

        tracing::info!(dispute = %id, job = %intake.job_id, seed = %dispute.seed_hex(), "case opened");
        self.disputes.insert(id, dispute);
        Ok(id)
    }
}
