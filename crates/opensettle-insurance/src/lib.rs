//! # opensettle-insurance
//!
//! **Insurance Underwriting**: the coverage plane of the OpenSettle
//! settlement core. Underwriters pool capital and earn job premiums via
//! an O(1) reward-per-share accumulator; insured buyers get their job
//! fronted by the pool and a claim path for losses a ruling leaves
//! uncovered.
//!
//! The pool is single-token and its account is just another vault
//! account; solvency is a balance-sheet identity checked on every
//! withdrawal and claim:
//!
//! ```text
//! pool balance - (unclaimed rewards + refund liabilities + in-flight) >= 0
//! ```

pub mod pool;
pub mod underwriting;

pub use pool::RewardPool;
pub use underwriting::Underwriting;
