//! Bit-level comparison against the reference packet.

use crate::error::MatchError;

/// Direction counts for differing bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flips {
    /// Bits expected 0, received 1
    pub to_one: u64,

    /// Bits expected 1, received 0
    pub to_zero: u64,
}

impl Flips {
    pub fn total(&self) -> u64 {
        self.to_one + self.to_zero
    }
}

/// Per-packet comparison result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    /// Hamming distance in bits
    pub bit_errors: u64,

    /// Same errors split by direction
    pub flips: Flips,
}

/// Total Hamming distance between two equal-length byte sequences.
///
/// # Errors
/// `MatchError::LengthMismatch` if the lengths differ; the caller counts the
/// record as skipped.
pub fn bit_errors(expected: &[u8], received: &[u8]) -> Result<u64, MatchError> {
    check_len(expected, received)?;
    Ok(expected
        .iter()
        .zip(received)
        .map(|(e, r)| u64::from((e ^ r).count_ones()))
        .sum())
}

/// Split differing bits by direction of change.
///
/// Callers must reject unequal lengths first; extra bytes on either side are
/// not inspected.
pub fn classify_flips(expected: &[u8], received: &[u8]) -> Flips {
    expected
        .iter()
        .zip(received)
        .fold(Flips::default(), |mut flips, (&e, &r)| {
            let diff = e ^ r;
            flips.to_one += u64::from((diff & r).count_ones());
            flips.to_zero += u64::from((diff & e).count_ones());
            flips
        })
}

fn check_len(expected: &[u8], received: &[u8]) -> Result<(), MatchError> {
    if expected.len() != received.len() {
        return Err(MatchError::LengthMismatch {
            expected: expected.len(),
            actual: received.len(),
        });
    }
    Ok(())
}

/// Compares received packets with one fixed reference.
#[derive(Debug, Clone)]
pub struct Matcher {
    expected: Vec<u8>,
}

impl Matcher {
    pub fn new(expected: Vec<u8>) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> &[u8] {
        &self.expected
    }

    /// Reference length in bits.
    pub fn packet_bits(&self) -> u64 {
        self.expected.len() as u64 * 8
    }

    /// Count and classify bit errors in `received`.
    pub fn compare(&self, received: &[u8]) -> Result<Comparison, MatchError> {
        let bit_errors = bit_errors(&self.expected, received)?;
        let flips = classify_flips(&self.expected, received);
        Ok(Comparison { bit_errors, flips })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_has_no_errors() {
        let expected = [0x0F, 0x00, 0x10, 0xE0];
        assert_eq!(bit_errors(&expected, &expected), Ok(0));
        assert_eq!(classify_flips(&expected, &expected), Flips::default());
    }

    #[test]
    fn test_all_bits_flipped() {
        let expected = [0x0F, 0x00, 0x5A];
        let received: Vec<u8> = expected.iter().map(|b| !b).collect();
        assert_eq!(bit_errors(&expected, &received), Ok(24));
    }

    #[test]
    fn test_nibble_swap() {
        assert_eq!(bit_errors(&[0x0F], &[0xF0]), Ok(8));
        let flips = classify_flips(&[0x0F], &[0xF0]);
        assert_eq!(flips, Flips { to_one: 4, to_zero: 4 });
    }

    #[test]
    fn test_flip_directions() {
        // 0x00 -> 0x03: two bits rose; 0xFF -> 0x7F: one bit fell.
        let flips = classify_flips(&[0x00, 0xFF], &[0x03, 0x7F]);
        assert_eq!(flips.to_one, 2);
        assert_eq!(flips.to_zero, 1);
    }

    #[test]
    fn test_flips_sum_to_bit_errors() {
        let expected: Vec<u8> = (0..=255).collect();
        for shift in [1u8, 3, 77, 200] {
            let received: Vec<u8> = expected.iter().map(|b| b.wrapping_mul(shift) ^ 0x21).collect();
            let errors = bit_errors(&expected, &received).unwrap();
            assert_eq!(classify_flips(&expected, &received).total(), errors);
        }
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            bit_errors(&[0x0F, 0x00], &[0x0F]),
            Err(MatchError::LengthMismatch { expected: 2, actual: 1 })
        );
        let matcher = Matcher::new(vec![1, 2, 3]);
        assert!(matcher.compare(&[1, 2, 3, 4]).is_err());
    }

    #[test]
    fn test_matcher_compare() {
        let matcher = Matcher::new(vec![0x0F, 0x00]);
        assert_eq!(matcher.packet_bits(), 16);

        let comparison = matcher.compare(&[0x0E, 0x80]).unwrap();
        assert_eq!(comparison.bit_errors, 2);
        assert_eq!(comparison.flips, Flips { to_one: 1, to_zero: 1 });
    }
}
