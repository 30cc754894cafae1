//! Fee and dispute-window policy.
//!
//! The fee is carved out of the quantity **actually received** by escrow,
//! never the requested quantity, so fee-on-transfer tokens cannot make the
//! ledger promise more than it holds. Jobs settled in the protocol's
//! native token pay no fee.
//!
//! The dispute window scales with amount: standard below the high-value
//! threshold, extended at or above it. Higher-value jobs get
//! proportionally more buyer protection without adding latency to small
//! ones.

use opensettle_types::{constants::BPS_DENOMINATOR, LedgerConfig};
use rust_decimal::Decimal;

/// Protocol fee for a job, computed on the received quantity.
#[must_use]
pub fn fee_for(received: Decimal, token: &str, config: &LedgerConfig) -> Decimal {
    if token == config.native_token {
        Decimal::ZERO
    } else {
        received * Decimal::from(config.fee_bps) / Decimal::from(BPS_DENOMINATOR)
    }
}

/// Dispute-window length in seconds for a job of `amount`.
#[must_use]
pub fn dispute_window_secs(amount: Decimal, config: &LedgerConfig) -> i64 {
    if amount >= config.high_value_threshold {
        config.extended_window_secs
    } else {
        config.standard_window_secs
    }
}
