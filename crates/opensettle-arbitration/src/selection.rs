//! Seeded panel selection.
//!
//! The seed commits to the case context (job, parties), a caller salt, an
//! engine-local nonce, and a verifiable randomness beacon draw, hashed
//! under a domain separator. No single party controls every input, and
//! the seed is stored on the dispute so the draw can be re-derived and
//! audited afterwards.

use opensettle_types::{
    constants::PANEL_SIZE, AccountId, DisputeIntake, OpensettleError, Result,
};
use sha2::{Digest, Sha256};

/// Domain separator for panel-selection seeds.
const SEED_DOMAIN: &[u8] = b"opensettle.panel.v1";

/// Derive the selection seed for a case.
#[must_use]
pub fn derive_seed(
    intake: &DisputeIntake,
    salt: [u8; 32],
    nonce: u64,
    beacon_draw: [u8; 32],
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(SEED_DOMAIN);
    hasher.update(salt);
    hasher.update(intake.job_id.0.as_bytes());
    hasher.update(intake.buyer.0.as_bytes());
    hasher.update(intake.seller.0.as_bytes());
    hasher.update(nonce.to_le_bytes());
    hasher.update(beacon_draw);
    hasher.finalize().into()
}

/// Draw exactly [`PANEL_SIZE`] distinct members from `candidates` using
/// `seed`. Deterministic: the same candidates and seed always produce the
/// same panel.
///
/// # Errors
/// `InsufficientArbitrators` if fewer than [`PANEL_SIZE`] candidates.
pub fn select_panel(candidates: &[AccountId], seed: [u8; 32]) -> Result<[AccountId; PANEL_SIZE]> {
    if candidates.len() < PANEL_SIZE {
        return Err(OpensettleError::InsufficientArbitrators {
            needed: PANEL_SIZE,
            available: candidates.len(),
        });
    }

    let mut remaining: Vec<AccountId> = candidates.to_vec();
    let mut panel = [AccountId::nil(); PANEL_SIZE];
    for (round, slot) in panel.iter_mut().enumerate() {
        let pick = index_from_seed(seed, round as u64, remaining.len());
        *slot = remaining.swap_remove(pick);
    }
    Ok(panel)
}

/// Expand the seed into a pick index for one selection round.
///
/// Bias from the modulo is negligible: the round hash is 64 bits of
/// SHA-256 output against candidate counts that fit in a u32.
fn index_from_seed(seed: [u8; 32], round: u64, len: usize) -> usize {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(round.to_le_bytes());
    let digest = hasher.finalize();
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    #[allow(clippy::cast_possible_truncation)]
    let pick = (u64::from_le_bytes(word) % len as u64) as usize;
    pick
}

#[cfg(test)]
mod tests {
    use super::*;
    use opensettle_types::JobId;
    use rust_decimal::Decimal;

    fn intake() -> DisputeIntake {
        DisputeIntake {
            job_id: JobId::new(),
            buyer: AccountId::new(),
            seller: AccountId::new(),
            amount: Decimal::new(1_000, 0),
            token: "SETL".to_string(),
            buyer_evidence: "late".to_string(),
        }
    }

    #[test]
    fn seed_commits_to_all_inputs() {
        let i = intake();
        let base = derive_seed(&i, [1u8; 32], 7, [2u8; 32]);
        assert_ne!(base, derive_seed(&i, [9u8; 32], 7, [2u8; 32]));
        assert_ne!(base, derive_seed(&i, [1u8; 32], 8, [2u8; 32]));
        assert_ne!(base, derive_seed(&i, [1u8; 32], 7, [3u8; 32]));
        assert_ne!(base, derive_seed(&intake(), [1u8; 32], 7, [2u8; 32]));
        assert_eq!(base, derive_seed(&i, [1u8; 32], 7, [2u8; 32]));
    }

    #[test]
    fn panel_is_deterministic_and_distinct() {
        let candidates: Vec<AccountId> = (0..10).map(|_| AccountId::new()).collect();
        let seed = [0x42u8; 32];

        let a = select_panel(&candidates, seed).unwrap();
        let b = select_panel(&candidates, seed).unwrap();
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
        assert_ne!(a[1], a[2]);
        assert_ne!(a[0], a[2]);
        for member in a {
            assert!(candidates.contains(&member));
        }
    }

    #[test]
    fn different_seeds_usually_differ() {
        let candidates: Vec<AccountId> = (0..50).map(|_| AccountId::new()).collect();
        let a = select_panel(&candidates, [1u8; 32]).unwrap();
        let b = select_panel(&candidates, [2u8; 32]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn exactly_three_candidates_selects_all() {
        let candidates: Vec<AccountId> = (0..3).map(|_| AccountId::new()).collect();
        let panel = select_panel(&candidates, [7u8; 32]).unwrap();
        let mut got: Vec<AccountId> = panel.to_vec();
        let mut want = candidates.clone();
        got.sort_unstable();
        want.sort_unstable();
        assert_eq!(got, want);
    }

    #[test]
    fn too_few_candidates_fails() {
        let candidates: Vec<AccountId> = (0..2).map(|_| AccountId::new()).collect();
        let err = select_panel(&candidates, [0u8; 32]).unwrap_err();
        assert!(matches!(
            err,
            OpensettleError::InsufficientArbitrators {
                needed: 3,
                available: 2
            }
        ));
    }
}
