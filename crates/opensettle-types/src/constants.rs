//! System-wide constants for the OpenSettle settlement core.

/// The protocol's native settlement token. Jobs settled in it pay no fee.
pub const NATIVE_TOKEN: &str = "SETL";

/// Basis-point denominator (1 bps = 1/10,000).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Default protocol fee on non-native jobs, in basis points (2.5%).
pub const DEFAULT_FEE_BPS: u32 = 250;

/// Job amounts at or above this threshold get the extended dispute window.
pub const DEFAULT_HIGH_VALUE_THRESHOLD: u64 = 5_000;

/// Dispute window for jobs below the high-value threshold (3 days).
pub const DEFAULT_STANDARD_WINDOW_SECS: i64 = 3 * 24 * 3600;

/// Dispute window for jobs at or above the threshold (7 days).
pub const DEFAULT_EXTENDED_WINDOW_SECS: i64 = 7 * 24 * 3600;

/// Seller counter-evidence window after a dispute opens (2 days).
pub const DEFAULT_EVIDENCE_WINDOW_SECS: i64 = 2 * 24 * 3600;

/// Arbitrator voting window (3 days).
pub const DEFAULT_VOTING_WINDOW_SECS: i64 = 3 * 24 * 3600;

/// Cooldown between `begin_unstake` and `withdraw_stake` (7 days).
pub const DEFAULT_UNSTAKE_COOLDOWN_SECS: i64 = 7 * 24 * 3600;

/// Every dispute panel has exactly this many arbitrators.
pub const PANEL_SIZE: usize = 3;

/// Minimum stake for Junior rank.
pub const DEFAULT_JUNIOR_STAKE: u64 = 1_000;

/// Minimum stake for Senior rank.
pub const DEFAULT_SENIOR_STAKE: u64 = 10_000;

/// Minimum stake for Principal rank.
pub const DEFAULT_PRINCIPAL_STAKE: u64 = 50_000;

/// Maximum dispute value a Junior arbitrator may be assigned.
pub const DEFAULT_JUNIOR_CAP: u64 = 2_500;

/// Maximum dispute value a Senior arbitrator may be assigned.
/// Principal arbitrators are uncapped.
pub const DEFAULT_SENIOR_CAP: u64 = 25_000;

/// Minimum fraction of the seller's stake slashed on a buyer win,
/// in basis points (5%).
pub const DEFAULT_MIN_SLASH_BPS: u32 = 500;

/// Default insurance premium rate, in basis points (0.5%).
pub const DEFAULT_PREMIUM_BPS: u32 = 50;

/// Fixed-point scale for the reward-per-share accumulator (1e12).
pub const REWARD_SCALE_UNITS: u64 = 1_000_000_000_000;

/// Default coverage caps per reputation tier.
pub const DEFAULT_NEWCOMER_CAP: u64 = 1_000;
pub const DEFAULT_ESTABLISHED_CAP: u64 = 10_000;
pub const DEFAULT_TRUSTED_CAP: u64 = 50_000;
pub const DEFAULT_ELITE_CAP: u64 = 250_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenSettle";
