//! Hamming(7,4) forward error correction.
//!
//! Each 4-bit nibble is protected by three parity bits and stored in the low
//! seven bits of a byte. A payload byte becomes two codewords: high nibble
//! first, then low nibble.
//!
//! # Codeword Layout
//!
//! ```text
//!  bit:   7    6    5    4    3    2    1    0
//!       +----+----+----+----+----+----+----+----+
//!       | -- | p1 | p2 | d1 | p3 | d2 | d3 | d4 |
//!       +----+----+----+----+----+----+----+----+
//! ```
//!
//! `d1..d4` are the nibble bits from MSB to LSB. The parity groups are
//! `p1 = d1^d2^d4`, `p2 = d1^d3^d4`, `p3 = d2^d3^d4`, which places the seven
//! bits at classic Hamming positions 1..7 reading from bit 6 down to bit 0.
//! A non-zero syndrome is therefore the 1-based position of the flipped bit
//! counted from bit 6, i.e. bit index `7 - syndrome`.
//!
//! # Accuracy Ceiling
//!
//! The code corrects any single-bit error but cannot detect double-bit
//! errors: two flips yield a non-zero syndrome indistinguishable from a
//! single flip, and the codeword is "corrected" to a wrong nibble with no
//! signal. Bit 7 is ignored on decode.

/// Mask for the seven significant bits of a codeword.
pub const CODEWORD_MASK: u8 = 0x7F;

/// Result of decoding one codeword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedNibble {
    /// Recovered 4-bit value
    pub nibble: u8,

    /// A single-bit error was found and flipped back
    pub corrected: bool,

    /// Always false: (7,4) cannot detect errors it cannot correct
    pub uncorrectable: bool,
}

/// Result of decoding a sequence of codeword pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedBytes {
    /// Reassembled bytes, one per codeword pair
    pub bytes: Vec<u8>,

    /// Number of codewords that needed a correction
    pub corrected: usize,

    /// An odd trailing codeword was dropped
    pub dropped_trailing: bool,
}

/// Encode the low four bits of `nibble` into a 7-bit codeword.
pub fn encode_nibble(nibble: u8) -> u8 {
    let d1 = (nibble >> 3) & 1;
    let d2 = (nibble >> 2) & 1;
    let d3 = (nibble >> 1) & 1;
    let d4 = nibble & 1;

    let p1 = d1 ^ d2 ^ d4;
    let p2 = d1 ^ d3 ^ d4;
    let p3 = d2 ^ d3 ^ d4;

    (p1 << 6) | (p2 << 5) | (d1 << 4) | (p3 << 3) | (d2 << 2) | (d3 << 1) | d4
}

/// Decode a (possibly corrupted) codeword, correcting a single-bit error.
pub fn decode_nibble(codeword: u8) -> DecodedNibble {
    let mut code = codeword & CODEWORD_MASK;

    let syndrome = syndrome(code);
    let corrected = syndrome != 0;
    if corrected {
        code ^= 1 << (7 - syndrome);
    }

    let nibble = (((code >> 4) & 1) << 3) | (((code >> 2) & 1) << 2) | (((code >> 1) & 1) << 1) | (code & 1);

    DecodedNibble {
        nibble,
        corrected,
        uncorrectable: false,
    }
}

/// Compute the 3-bit syndrome of a codeword (0 means consistent).
pub fn syndrome(codeword: u8) -> u8 {
    let bit = |i: u8| (codeword >> i) & 1;

    let s1 = bit(6) ^ bit(4) ^ bit(2) ^ bit(0);
    let s2 = bit(5) ^ bit(4) ^ bit(1) ^ bit(0);
    let s3 = bit(3) ^ bit(2) ^ bit(1) ^ bit(0);

    s1 | (s2 << 1) | (s3 << 2)
}

/// Encode one byte into its (high, low) codeword pair.
pub fn encode_byte(byte: u8) -> (u8, u8) {
    (encode_nibble(byte >> 4), encode_nibble(byte & 0x0F))
}

/// Encode a byte slice; the output is twice as long.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for &byte in data {
        let (hi, lo) = encode_byte(byte);
        out.push(hi);
        out.push(lo);
    }
    out
}

/// Decode consecutive codeword pairs back into bytes.
///
/// The first codeword of each pair supplies the high nibble. An odd-length
/// input has its last codeword dropped; this is reported through
/// `dropped_trailing` and a warning, never as an error.
pub fn decode_bytes(codewords: &[u8]) -> DecodedBytes {
    let dropped_trailing = codewords.len() % 2 != 0;
    if dropped_trailing {
        log::warn!(
            "encoded payload has odd length {}; dropping trailing codeword",
            codewords.len()
        );
    }

    let mut decoded = DecodedBytes {
        bytes: Vec::with_capacity(codewords.len() / 2),
        corrected: 0,
        dropped_trailing,
    };

    for pair in codewords.chunks_exact(2) {
        let hi = decode_nibble(pair[0]);
        let lo = decode_nibble(pair[1]);
        decoded.corrected += usize::from(hi.corrected) + usize::from(lo.corrected);
        decoded.bytes.push((hi.nibble << 4) | lo.nibble);
    }

    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_nibbles() {
        for n in 0..16u8 {
            let decoded = decode_nibble(encode_nibble(n));
            assert_eq!(decoded.nibble, n);
            assert!(!decoded.corrected);
            assert!(!decoded.uncorrectable);
        }
    }

    #[test]
    fn test_single_bit_errors_corrected() {
        for n in 0..16u8 {
            for i in 0..7 {
                let decoded = decode_nibble(encode_nibble(n) ^ (1 << i));
                assert_eq!(decoded.nibble, n, "nibble {n:#x}, flipped bit {i}");
                assert!(decoded.corrected);
            }
        }
    }

    #[test]
    fn test_encode_fits_seven_bits() {
        for n in 0..16u8 {
            assert_eq!(encode_nibble(n) & !CODEWORD_MASK, 0);
            assert_eq!(syndrome(encode_nibble(n)), 0);
        }
    }

    #[test]
    fn test_known_codewords() {
        // 0xA = 1010: d1=1 d2=0 d3=1 d4=0 -> p1=1 p2=0 p3=1
        assert_eq!(encode_nibble(0xA), 0b101_1010);
        assert_eq!(encode_nibble(0x0), 0);
        assert_eq!(encode_nibble(0xF), 0x7F);
    }

    #[test]
    fn test_flip_position_three() {
        let decoded = decode_nibble(encode_nibble(0xA) ^ (1 << 3));
        assert_eq!(decoded.nibble, 0xA);
        assert!(decoded.corrected);
    }

    #[test]
    fn test_top_bit_ignored() {
        for n in 0..16u8 {
            let decoded = decode_nibble(encode_nibble(n) | 0x80);
            assert_eq!(decoded.nibble, n);
            assert!(!decoded.corrected);
        }
    }

    #[test]
    fn test_double_bit_errors_terminate() {
        // No detection guarantee: only check a nibble comes back.
        for n in 0..16u8 {
            for i in 0..7 {
                for j in (i + 1)..7 {
                    let decoded = decode_nibble(encode_nibble(n) ^ (1 << i) ^ (1 << j));
                    assert!(decoded.nibble < 16);
                    assert!(!decoded.uncorrectable);
                }
            }
        }
    }

    #[test]
    fn test_bytes_round_trip() {
        let data: Vec<u8> = (0..=255).collect();
        let encoded = encode_bytes(&data);
        assert_eq!(encoded.len(), 512);

        let decoded = decode_bytes(&encoded);
        assert_eq!(decoded.bytes, data);
        assert_eq!(decoded.corrected, 0);
        assert!(!decoded.dropped_trailing);
    }

    #[test]
    fn test_bytes_with_corrections() {
        let mut encoded = encode_bytes(&[0x10, 0xE0]);
        encoded[0] ^= 0x01;
        encoded[3] ^= 0x40;

        let decoded = decode_bytes(&encoded);
        assert_eq!(decoded.bytes, vec![0x10, 0xE0]);
        assert_eq!(decoded.corrected, 2);
    }

    #[test]
    fn test_odd_length_drops_trailing() {
        let mut encoded = encode_bytes(&[0x5A]);
        encoded.push(encode_nibble(0x3));

        let decoded = decode_bytes(&encoded);
        assert_eq!(decoded.bytes, vec![0x5A]);
        assert!(decoded.dropped_trailing);
    }

    #[test]
    fn test_empty_input() {
        let decoded = decode_bytes(&[]);
        assert!(decoded.bytes.is_empty());
        assert!(!decoded.dropped_trailing);
    }
}
