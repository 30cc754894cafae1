//! # opensettle-arbitration
//!
//! **Dispute Engine**: the arbitration plane of the OpenSettle settlement
//! core. Maintains the staked arbitrator registry, draws three-member
//! panels from a verifiable seed, runs the evidence and voting phases,
//! and executes rulings back into the Job Ledger through the
//! [`ResolutionSink`](opensettle_types::ResolutionSink) seam.
//!
//! Panel selection is deterministic given the stored seed: anyone can
//! re-derive a dispute's panel after the fact from the seed recorded on
//! the case.

pub mod engine;
pub mod registry;
pub mod selection;

pub use engine::DisputeEngine;
pub use registry::ArbitratorRegistry;
