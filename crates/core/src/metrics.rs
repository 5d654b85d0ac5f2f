//! Bit-error statistics for one log scan.
//!
//! This module provides the numbers a test run is judged by:
//! - Bits checked and bit errors (BER, bit reliability)
//! - Per-packet error counts
//! - Flip directions (0 -> 1 vs 1 -> 0)
//! - Skipped lines and codec corrections
//!
//! # Design
//!
//! [`RunStatistics`] is a plain accumulator owned by the scanning loop. All
//! counters are sums, so two partial scans combine with [`RunStatistics::merge`]
//! into exactly the totals of one scan over both halves.

use crate::matcher::Comparison;

/// Milliseconds in a day, for captures running past midnight.
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Mutable per-run accumulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    // === Bits ===
    /// Bits compared against the reference
    pub total_bits: u64,

    /// Bits that differed from the reference
    pub total_bit_errors: u64,

    /// Differing bits that read 1 instead of 0
    pub flips_to_one: u64,

    /// Differing bits that read 0 instead of 1
    pub flips_to_zero: u64,

    // === Records ===
    /// Records that matched the reference length and were compared
    pub packets_seen: u64,

    /// Lines rejected for any reason
    pub skipped: u64,

    /// Bit errors of each accepted packet, in log order
    pub per_packet: Vec<u64>,

    // === Codec ===
    /// Corrections applied by the payload codec
    pub corrected_codewords: u64,

    /// Records the codec could not decode
    pub uncorrectable: u64,

    // === Timing ===
    /// Timestamp of the first accepted record (ms since midnight)
    pub first_timestamp_ms: Option<u64>,

    /// Timestamp of the last accepted record (ms since midnight)
    pub last_timestamp_ms: Option<u64>,
}

impl RunStatistics {
    /// Zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one accepted packet.
    pub fn record(&mut self, packet_bits: u64, comparison: &Comparison, keep_per_packet: bool) {
        self.total_bits += packet_bits;
        self.total_bit_errors += comparison.bit_errors;
        self.flips_to_one += comparison.flips.to_one;
        self.flips_to_zero += comparison.flips.to_zero;
        self.packets_seen += 1;
        if keep_per_packet {
            self.per_packet.push(comparison.bit_errors);
        }
    }

    /// Account for a rejected line.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Note the receive time of an accepted record.
    pub fn observe_timestamp(&mut self, millis: u64) {
        if self.first_timestamp_ms.is_none() {
            self.first_timestamp_ms = Some(millis);
        }
        self.last_timestamp_ms = Some(millis);
    }

    /// Fold statistics of a later part of the same log into these.
    pub fn merge(&mut self, later: RunStatistics) {
        self.total_bits += later.total_bits;
        self.total_bit_errors += later.total_bit_errors;
        self.flips_to_one += later.flips_to_one;
        self.flips_to_zero += later.flips_to_zero;
        self.packets_seen += later.packets_seen;
        self.skipped += later.skipped;
        self.per_packet.extend(later.per_packet);
        self.corrected_codewords += later.corrected_codewords;
        self.uncorrectable += later.uncorrectable;
        self.first_timestamp_ms = self.first_timestamp_ms.or(later.first_timestamp_ms);
        self.last_timestamp_ms = later.last_timestamp_ms.or(self.last_timestamp_ms);
    }

    /// Bit-error rate (errors / bits checked); 0.0 if nothing was checked.
    pub fn ber(&self) -> f64 {
        if self.total_bits == 0 {
            0.0
        } else {
            self.total_bit_errors as f64 / self.total_bits as f64
        }
    }

    /// Fraction of checked bits delivered correctly.
    pub fn bit_reliability(&self) -> f64 {
        1.0 - self.ber()
    }

    /// Time between first and last accepted record, if both were timestamped.
    pub fn span_ms(&self) -> Option<u64> {
        let first = self.first_timestamp_ms?;
        let last = self.last_timestamp_ms?;
        if last >= first {
            Some(last - first)
        } else {
            Some(last + DAY_MS - first)
        }
    }
}

/// Final statistics of a completed scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Reference packet length in bytes
    pub packet_len: usize,

    /// Codec used to undo payload protection
    pub codec: &'static str,

    /// Accumulated counters
    pub stats: RunStatistics,
}

impl Report {
    pub fn ber(&self) -> f64 {
        self.stats.ber()
    }

    pub fn bit_reliability(&self) -> f64 {
        self.stats.bit_reliability()
    }

    /// BER of each accepted packet.
    pub fn per_packet_ber(&self) -> Vec<f64> {
        let bits = (self.packet_len * 8) as f64;
        self.stats
            .per_packet
            .iter()
            .map(|&errors| errors as f64 / bits)
            .collect()
    }

    /// Index and error count of the worst accepted packet.
    pub fn worst_packet(&self) -> Option<(usize, u64)> {
        self.stats
            .per_packet
            .iter()
            .copied()
            .enumerate()
            .max_by_key(|&(i, errors)| (errors, std::cmp::Reverse(i)))
    }

    /// Accepted packets per second over the capture span.
    pub fn packet_rate(&self) -> Option<f64> {
        let span = self.stats.span_ms()?;
        if span == 0 {
            return None;
        }
        Some(self.stats.packets_seen as f64 * 1000.0 / span as f64)
    }

    /// Delivered reference bits per second over the capture span.
    ///
    /// Lost or skipped packets lower this rate but not the BER.
    pub fn data_rate(&self) -> Option<f64> {
        self.packet_rate()
            .map(|rate| rate * (self.packet_len * 8) as f64)
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        let s = &self.stats;

        println!("=== Bit Error Summary ===");
        println!("Codec               : {}", self.codec);
        println!("Packet length       : {} bytes", self.packet_len);
        println!("Packets analyzed    : {}", s.packets_seen);
        println!("Lines skipped       : {}", s.skipped);
        println!("Total bits checked  : {}", s.total_bits);
        println!("Total bit errors    : {}", s.total_bit_errors);
        println!("Bit-Error Rate (BER): {:.6e}", self.ber());
        println!("Bit reliability     : {:.6}%", self.bit_reliability() * 100.0);
        println!();

        println!("=== Flips ===");
        println!("0 -> 1              : {}", s.flips_to_one);
        println!("1 -> 0              : {}", s.flips_to_zero);
        println!();

        if s.corrected_codewords > 0 || s.uncorrectable > 0 {
            println!("=== Codec ===");
            println!("Corrections         : {}", s.corrected_codewords);
            println!("Uncorrectable       : {}", s.uncorrectable);
            println!();
        }

        if let Some((index, errors)) = self.worst_packet() {
            println!("Worst packet        : #{} ({} bit errors)", index, errors);
        }
        if let Some(span) = s.span_ms() {
            println!("Capture span        : {:.3} s", span as f64 / 1000.0);
        }
        if let Some(rate) = self.packet_rate() {
            println!("Packet rate         : {:.2} packets/s", rate);
        }
        if let Some(rate) = self.data_rate() {
            println!("Data rate           : {:.2} bit/s", rate);
        }
    }

    /// Per-packet error counts, one line each (`index errors ber`).
    pub fn print_per_packet(&self) {
        for (i, (errors, ber)) in self
            .stats
            .per_packet
            .iter()
            .zip(self.per_packet_ber())
            .enumerate()
        {
            println!("{i}\t{errors}\t{ber:.6}");
        }
    }

    /// Export as `key=value` lines (for parsing/testing).
    pub fn export_text(&self) -> String {
        let s = &self.stats;
        format!(
            "codec={}\n\
             packet_len={}\n\
             packets_seen={}\n\
             skipped={}\n\
             total_bits={}\n\
             total_bit_errors={}\n\
             ber={:.6e}\n\
             flips_to_one={}\n\
             flips_to_zero={}\n\
             corrected_codewords={}\n\
             uncorrectable={}\n",
            self.codec,
            self.packet_len,
            s.packets_seen,
            s.skipped,
            s.total_bits,
            s.total_bit_errors,
            self.ber(),
            s.flips_to_one,
            s.flips_to_zero,
            s.corrected_codewords,
            s.uncorrectable,
        )
    }
}
