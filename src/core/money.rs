//! Monetary rounding and comparison helpers.
//!
//! Amounts are stored as 2-decimal values; every value is rounded half-up at
//! the point of persistence so cent-level drift cannot accumulate across
//! additions. Balance comparisons use a one-cent epsilon.

/// A balance within this distance of zero counts as settled.
pub const BALANCE_EPSILON: f64 = 0.01;

/// Maximum length of a ledger note, in characters.
pub const NOTE_MAX_CHARS: usize = 160;

/// Rounds to 2 decimal places, half away from zero (half-up for prices).
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether a balance is close enough to zero to count as settled.
#[must_use]
pub fn is_settled(balance: f64) -> bool {
    balance.abs() <= BALANCE_EPSILON
}

/// Truncates a ledger note to [`NOTE_MAX_CHARS`] characters.
#[must_use]
pub fn clamp_note(note: &str) -> String {
    note.chars().take(NOTE_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_round2_basic() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.5551), 2.56);
        assert_eq!(round2(10.0 / 3.0), 3.33);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round2_markup_scenario() {
        // 8.00 base at a 1.2 markup must come out as exactly 9.60
        assert_eq!(round2(8.0 * 1.2), 9.6);
        assert_eq!(round2(35.3 * 1.2), 42.36);
    }

    #[test]
    fn test_round2_negative() {
        assert_eq!(round2(-12.504), -12.5);
        assert_eq!(round2(-9.6000000001), -9.6);
    }

    #[test]
    fn test_is_settled() {
        assert!(is_settled(0.0));
        assert!(is_settled(0.01));
        assert!(is_settled(-0.01));
        assert!(!is_settled(0.02));
        assert!(!is_settled(-5.0));
    }

    #[test]
    fn test_clamp_note() {
        let short = "paid in cash";
        assert_eq!(clamp_note(short), short);

        let long = "x".repeat(300);
        assert_eq!(clamp_note(&long).chars().count(), NOTE_MAX_CHARS);
    }
}
