//! # opensettle-ledger
//!
//! **Job Ledger**: the escrow plane of the OpenSettle settlement core.
//! Custodies value for buyer/seller service jobs, drives the job state
//! machine, and computes fees and dispute windows.
//!
//! ## Architecture
//!
//! The ledger owns [`Job`](opensettle_types::Job) state exclusively. All
//! fund movement goes through an injected
//! [`ValueTransfer`](opensettle_types::ValueTransfer) (the [`Vault`] is
//! this crate's in-memory implementation), and every fund-moving
//! operation finishes its bookkeeping before touching any collaborator
//! that could call back.
//!
//! Dispute handling crosses into the arbitration crate only through the
//! [`ArbitrationHook`](opensettle_types::ArbitrationHook) trait on the
//! way out and the [`ResolutionSink`](opensettle_types::ResolutionSink)
//! trait on the way back; the one-way `Disputed -> Resolved` transition
//! plus the recorded dispute link make resolution at-most-once.

pub mod conservation;
pub mod fees;
pub mod ledger;
pub mod vault;

pub use conservation::SettlementRecord;
pub use ledger::JobLedger;
pub use vault::Vault;
