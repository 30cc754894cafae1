//! # opensettle-types
//!
//! Shared types, errors, and configuration for the **OpenSettle**
//! marketplace settlement core.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`JobId`], [`DisputeId`], [`AccountId`], [`ListingId`], [`Token`]
//! - **Job model**: [`Job`], [`JobStatus`], [`OpenJob`]
//! - **Dispute model**: [`Dispute`], [`DisputeStatus`], [`Ruling`], [`DisputeIntake`]
//! - **Arbitrator model**: [`ArbitratorInfo`], [`ArbitratorRank`]
//! - **Pool model**: [`PoolStaker`], [`InsuredJob`]
//! - **Collaborator seams**: [`ReputationOracle`], [`StakeOracle`], [`BanOracle`],
//!   [`ListingDirectory`], [`ValueTransfer`], [`RandomnessBeacon`],
//!   [`ArbitrationHook`], [`ResolutionSink`]
//! - **Configuration**: [`LedgerConfig`], [`ArbitrationConfig`], [`InsuranceConfig`]
//! - **Errors**: [`OpensettleError`] with `OS_ERR_` prefix codes
//! - **Constants**: system-wide thresholds and defaults
//!
//! With the `test-helpers` feature enabled, [`mock`] provides in-memory
//! oracle implementations for tests.

pub mod arbitrator;
pub mod config;
pub mod constants;
pub mod dispute;
pub mod error;
pub mod ids;
pub mod job;
pub mod oracle;
pub mod pool;

#[cfg(feature = "test-helpers")]
pub mod mock;

// Re-export all primary types at crate root for ergonomic imports:
//   use opensettle_types::{Job, JobStatus, Dispute, Ruling, ...};

pub use arbitrator::*;
pub use config::*;
pub use dispute::*;
pub use error::*;
pub use ids::*;
pub use job::*;
pub use oracle::*;
pub use pool::*;

// Constants are accessed via `opensettle_types::constants::FOO`
// (not re-exported to avoid name collisions).
