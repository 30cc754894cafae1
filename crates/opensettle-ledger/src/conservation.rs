//! Per-job conservation invariant.
//!
//! Invariant enforced for every finalized job:
//! ```text
//! fee + seller_payout + buyer_refund == amount received at open
//! ```
//!
//! If this ever breaks, something has gone catastrophically wrong in
//! settlement; the record-and-verify split keeps the check cheap and
//! auditable after the fact.

use opensettle_types::{OpensettleError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where every unit of a job's escrow ended up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Quantity received into escrow at open.
    pub amount: Decimal,
    /// Released to the treasury.
    pub fee: Decimal,
    /// Released to the seller.
    pub seller_payout: Decimal,
    /// Returned to the refund recipient (buyer, or the insurance pool).
    pub buyer_refund: Decimal,
}

impl SettlementRecord {
    /// Open a record for a freshly escrowed amount.
    #[must_use]
    pub fn opened(amount: Decimal) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }

    /// Total released so far.
    #[must_use]
    pub fn released(&self) -> Decimal {
        self.fee + self.seller_payout + self.buyer_refund
    }

    /// Verify the conservation invariant for a finalized job.
    ///
    /// # Errors
    /// Returns [`OpensettleError::ConservationViolation`] if the released
    /// total does not equal the escrowed amount.
    pub fn verify(&self) -> Result<()> {
        if self.released() != self.amount {
            return Err(OpensettleError::ConservationViolation {
                reason: format!(
                    "released {} != escrowed {} (fee={}, seller={}, refund={})",
                    self.released(),
                    self.amount,
                    self.fee,
                    self.seller_payout,
                    self.buyer_refund,
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_path_conserves() {
        let mut rec = SettlementRecord::opened(Decimal::new(1000, 0));
        rec.fee = Decimal::new(25, 0);
        rec.seller_payout = Decimal::new(975, 0);
        rec.verify().unwrap();
    }

    #[test]
    fn buyer_win_path_conserves() {
        let mut rec = SettlementRecord::opened(Decimal::new(1000, 0));
        rec.buyer_refund = Decimal::new(1000, 0);
        rec.verify().unwrap();
    }

    #[test]
    fn draw_split_conserves() {
        let mut rec = SettlementRecord::opened(Decimal::new(1001, 0));
        rec.buyer_refund = Decimal::new(5005, 1); // 500.5
        rec.seller_payout = Decimal::new(5005, 1);
        rec.verify().unwrap();
    }

    #[test]
    fn leak_detected() {
        let mut rec = SettlementRecord::opened(Decimal::new(1000, 0));
        rec.seller_payout = Decimal::new(999, 0);
        let err = rec.verify().unwrap_err();
        assert!(matches!(err, OpensettleError::ConservationViolation { .. }));
    }

    #[test]
    fn double_release_detected() {
        let mut rec = SettlementRecord::opened(Decimal::new(1000, 0));
        rec.seller_payout = Decimal::new(1000, 0);
        rec.buyer_refund = Decimal::new(1000, 0);
        assert!(rec.verify().is_err());
    }
}
