//! Compressible payload samples, as generated on the tag.
//!
//! The firmware fills packets with 16-bit samples drawn from a clamped
//! normal distribution (Box-Muller over a 32-bit LCG). Reproducing the same
//! sequence host-side lets a run check payloads other than the fixed test
//! pattern.

use std::f64::consts::PI;

/// LCG seed used after reset.
pub const DEFAULT_SEED: u32 = 0xABCD;

const LCG_A: u32 = 1_664_525;
const LCG_C: u32 = 1_013_904_223;

const SPREAD: f64 = 0x7FF as f64;
const CENTER: f64 = 0x1FFF as f64;
const CEILING: f64 = 0x3F_FFFF as f64;

/// Deterministic sample source mirroring the tag firmware.
///
/// `file_position` is the byte index of the next sample in the virtual file;
/// it advances by two per sample, and the LCG is reseeded whenever it wraps
/// back to zero.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    seed: u32,
    file_position: u16,
}

impl SampleGenerator {
    pub fn new() -> Self {
        Self {
            seed: DEFAULT_SEED,
            file_position: 0,
        }
    }

    /// Byte index the next sample will occupy.
    pub fn file_position(&self) -> u16 {
        self.file_position
    }

    /// Next raw LCG output.
    pub fn next_random(&mut self) -> u32 {
        self.seed = self.seed.wrapping_mul(LCG_A).wrapping_add(LCG_C);
        self.seed
    }

    /// Next 16-bit sample.
    ///
    /// Values above `u16::MAX` saturate.
    pub fn next_sample(&mut self) -> u16 {
        if self.file_position == 0 {
            self.seed = DEFAULT_SEED;
        }
        self.file_position = self.file_position.wrapping_add(2);

        let u1 = f64::from(self.next_random()) / f64::from(u32::MAX);
        let u2 = f64::from(self.next_random()) / f64::from(u32::MAX);
        let radius = SPREAD * (-2.0 * u1.ln()).sqrt();
        let value = (radius * (2.0 * PI * u2).cos() + CENTER).min(CEILING).max(0.0);

        value as u16
    }

    /// Fill `len` bytes with big-endian samples.
    ///
    /// With `include_index` the first two bytes carry the current file
    /// position (big-endian) instead of a sample. An odd `len` leaves the
    /// last byte as the high half of one more sample.
    pub fn fill(&mut self, len: usize, include_index: bool) -> Vec<u8> {
        if len % 2 != 0 {
            log::warn!("sample buffer length {} is odd; last sample is truncated", len);
        }

        let mut buffer = Vec::with_capacity(len.saturating_add(1));
        if include_index && len >= 2 {
            buffer.extend_from_slice(&self.file_position.to_be_bytes());
        }
        while buffer.len() < len {
            buffer.extend_from_slice(&self.next_sample().to_be_bytes());
        }
        buffer.truncate(len);
        buffer
    }
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_sequence() {
        let mut gen = SampleGenerator::new();
        let first = DEFAULT_SEED.wrapping_mul(LCG_A).wrapping_add(LCG_C);
        assert_eq!(gen.next_random(), first);
        assert_eq!(gen.next_random(), first.wrapping_mul(LCG_A).wrapping_add(LCG_C));
    }

    #[test]
    fn test_determinism() {
        let a = SampleGenerator::new().fill(64, true);
        let b = SampleGenerator::new().fill(64, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_index_prefix_tracks_position() {
        let mut gen = SampleGenerator::new();
        let first = gen.fill(16, true);
        assert_eq!(&first[..2], &[0, 0]);
        assert_eq!(gen.file_position(), 14);

        let second = gen.fill(16, true);
        assert_eq!(&second[..2], &[0, 14]);
    }

    #[test]
    fn test_samples_clustered_around_center() {
        let mut gen = SampleGenerator::new();
        let samples: Vec<u16> = (0..1000).map(|_| gen.next_sample()).collect();
        let mean = samples.iter().map(|&s| f64::from(s)).sum::<f64>() / samples.len() as f64;
        assert!((mean - CENTER).abs() < 300.0, "mean {mean}");
    }

    #[test]
    fn test_reseed_on_wrap() {
        let mut gen = SampleGenerator::new();
        let first = gen.next_sample();
        for _ in 0..(u16::MAX as usize / 2) {
            gen.next_sample();
        }
        assert_eq!(gen.file_position(), 0);
        assert_eq!(gen.next_sample(), first);
    }

    #[test]
    fn test_odd_length() {
        let buffer = SampleGenerator::new().fill(5, false);
        assert_eq!(buffer.len(), 5);
    }
}
