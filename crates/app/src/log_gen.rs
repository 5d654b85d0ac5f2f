//! Synthetic receiver log generation for testing.
//!
//! Produces logs in the receiver's line format with a known amount of
//! damage, so the analyzer can be checked against ground truth.
//!
//! # Design
//!
//! Generated lines are a mix of:
//! - Packets with independent random bit flips (probability `flip_rate`)
//! - Truncated packets (a random number of trailing bytes lost)
//! - Overflow notices without any payload
//!
//! All randomness comes from a seeded ChaCha8 RNG, so a seed reproduces the
//! same log byte for byte.

use berkit_core::codec::PayloadCodec;
use berkit_core::config::format_hex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;

/// Knobs for one synthetic log.
#[derive(Debug, Clone)]
pub struct LogSpec {
    /// Number of lines to write
    pub packets: usize,

    /// Per-bit flip probability on the air
    pub flip_rate: f64,

    /// Fraction of lines with a truncated payload
    pub truncated: f64,

    /// Fraction of lines replaced by an overflow notice
    pub overflow: f64,

    /// Random seed
    pub seed: u64,
}

/// Ground truth for a generated log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogTruth {
    /// Lines carrying a full-length packet
    pub full_packets: u64,

    /// Truncated lines
    pub truncated: u64,

    /// Overflow lines
    pub overflow: u64,

    /// Bits flipped on the air across full-length packets
    pub flipped_bits: u64,
}

/// Generate a receiver log for `expected` protected by `codec`.
///
/// Flips are applied to the protected bytes, so with an error-correcting
/// codec the analyzer should see fewer errors than `flipped_bits`.
pub fn generate_log(expected: &[u8], codec: &dyn PayloadCodec, spec: &LogSpec) -> (Vec<String>, LogTruth) {
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);
    let protected = codec.encode(expected);
    let mut truth = LogTruth::default();
    let mut lines = Vec::with_capacity(spec.packets);

    // Start at noon with ~100 ms between packets.
    let mut clock_ms: u64 = 12 * 3600 * 1000;

    for _ in 0..spec.packets {
        clock_ms += rng.gen_range(80..=120);
        let timestamp = format_clock(clock_ms);

        if rng.gen_bool(spec.overflow.clamp(0.0, 1.0)) {
            truth.overflow += 1;
            lines.push(format!("{timestamp} RX FIFO overflow"));
            continue;
        }

        let mut received = protected.clone();
        let mut flipped = 0;
        for byte in received.iter_mut() {
            for bit in 0..8 {
                if rng.gen_bool(spec.flip_rate.clamp(0.0, 1.0)) {
                    *byte ^= 1 << bit;
                    flipped += 1;
                }
            }
        }

        if received.len() > 1 && rng.gen_bool(spec.truncated.clamp(0.0, 1.0)) {
            let keep = rng.gen_range(1..received.len());
            received.truncate(keep);
            truth.truncated += 1;
        } else {
            truth.full_packets += 1;
            truth.flipped_bits += flipped;
        }

        let rssi: i32 = rng.gen_range(-95..=-60);
        let status = if flipped == 0 { "OK" } else { "CRC error" };
        lines.push(format!("{timestamp} | {} | {rssi} {status}", format_hex(&received, false)));
    }

    (lines, truth)
}

/// Write a generated log to a file.
pub fn write_log(path: &std::path::Path, lines: &[String]) -> std::io::Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()
}

fn format_clock(ms: u64) -> String {
    let secs = ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60,
        ms % 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use berkit_core::codec::{Hamming74, Plain};
    use berkit_core::config::{default_expected, AnalysisConfig, Encoding};
    use std::io::Cursor;

    fn spec(seed: u64) -> LogSpec {
        LogSpec {
            packets: 200,
            flip_rate: 0.002,
            truncated: 0.05,
            overflow: 0.05,
            seed,
        }
    }

    #[test]
    fn test_determinism() {
        let (a, _) = generate_log(&default_expected(), &Plain, &spec(7));
        let (b, _) = generate_log(&default_expected(), &Plain, &spec(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds() {
        let (a, _) = generate_log(&default_expected(), &Plain, &spec(1));
        let (b, _) = generate_log(&default_expected(), &Plain, &spec(2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_plain_log_matches_ground_truth() {
        let expected = default_expected();
        let (lines, truth) = generate_log(&expected, &Plain, &spec(42));
        assert_eq!(lines.len(), 200);

        let report = berkit_core::analyze_reader(
            AnalysisConfig::new(expected),
            Cursor::new(lines.join("\n")),
        )
        .unwrap();

        assert_eq!(report.stats.packets_seen, truth.full_packets);
        assert_eq!(report.stats.skipped, truth.truncated + truth.overflow);
        assert_eq!(report.stats.total_bit_errors, truth.flipped_bits);
    }

    #[test]
    fn test_hamming_log_never_worse_than_single_flips() {
        let expected = default_expected();
        let spec = LogSpec {
            packets: 100,
            flip_rate: 0.0,
            truncated: 0.0,
            overflow: 0.0,
            seed: 3,
        };
        let (lines, truth) = generate_log(&expected, &Hamming74, &spec);
        assert_eq!(truth.flipped_bits, 0);

        let config = AnalysisConfig::new(expected).with_encoding(Encoding::Hamming74);
        let report = berkit_core::analyze_reader(config, Cursor::new(lines.join("\n"))).unwrap();
        assert_eq!(report.stats.packets_seen, 100);
        assert_eq!(report.stats.total_bit_errors, 0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(12 * 3600 * 1000 + 1234), "12:00:01.234");
    }

    #[test]
    fn test_write_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synth.txt");
        write_log(&path, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb\n");
    }
}
