//! Constant-time byte comparison.
//!
//! `==` on slices stops at the first differing byte, which tells a patient
//! attacker how much of their guess was right. Everything identity-related
//! compares through here instead.

use subtle::ConstantTimeEq;

/// Compare two byte slices in time independent of their contents.
///
/// Slices of different lengths compare unequal. Length is not secret in any
/// SGAIP comparison (AIDs are always 32 bytes), so that check may branch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_slices() {
        assert!(constant_time_eq(&[1, 2, 3], &[1, 2, 3]));
        assert!(constant_time_eq(&[], &[]));
    }

    #[test]
    fn test_difference_in_any_position() {
        let base = [0xAAu8; 32];
        for i in 0..32 {
            let mut other = base;
            other[i] ^= 0x01;
            assert!(!constant_time_eq(&base, &other), "mismatch at {i} not caught");
        }
    }

    #[test]
    fn test_length_mismatch() {
        assert!(!constant_time_eq(&[1, 2, 3], &[1, 2]));
    }
}
