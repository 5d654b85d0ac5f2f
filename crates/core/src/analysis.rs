//! Log scan: parse, decode, match, aggregate.
//!
//! An [`Analyzer`] walks `INIT -> SCANNING -> DONE` exactly once:
//! - `INIT`: [`Analyzer::new`] validates the configuration, counters are zero
//! - `SCANNING`: every [`Analyzer::feed_line`] either accepts a record or
//!   counts it as skipped; no line ever aborts the scan
//! - `DONE`: [`Analyzer::finish`] consumes the analyzer and yields a
//!   [`Report`], or `Error::NoValidPackets` if nothing matched
//!
//! Consuming `self` in `finish` is what keeps the machine from going back.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::codec::PayloadCodec;
use crate::config::{AnalysisConfig, LineFormat};
use crate::error::{CodecError, Error, Result};
use crate::logline::{self, LogRecord};
use crate::matcher::{Comparison, Matcher};
use crate::metrics::{Report, RunStatistics};

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Blank line, counted as skipped
    Blank,
    /// Compared against the reference
    Accepted { bit_errors: u64 },
    /// Neither parser accepted the line
    Unparsed,
    /// Codec could not recover the payload
    Undecodable,
    /// Decoded byte count differs from the reference length
    LengthMismatch { actual: usize },
}

/// Single-owner scanner over one log file.
pub struct Analyzer {
    matcher: Matcher,
    codec: Box<dyn PayloadCodec>,
    line_format: LineFormat,
    per_packet: bool,
    stats: RunStatistics,
    lines: u64,
}

impl Analyzer {
    /// Create an analyzer using the codec selected by `config`.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let codec = config.codec();
        Self::with_codec(config, codec)
    }

    /// Create an analyzer with an explicit codec front end.
    ///
    /// `config.encoding` is ignored; the given codec decodes every record.
    pub fn with_codec(config: AnalysisConfig, codec: Box<dyn PayloadCodec>) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "analyzing against {}-byte reference with codec {}",
            config.packet_len(),
            codec.name()
        );

        Ok(Self {
            matcher: Matcher::new(config.expected),
            codec,
            line_format: config.line_format,
            per_packet: config.per_packet,
            stats: RunStatistics::new(),
            lines: 0,
        })
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// Process one log line.
    pub fn feed_line(&mut self, line: &str) -> LineOutcome {
        self.lines += 1;
        let lineno = self.lines;

        if line.trim().is_empty() {
            self.stats.skip();
            return LineOutcome::Blank;
        }

        let Some(record) = logline::parse(line, self.line_format) else {
            log::debug!("line {}: no packet bytes; skipping", lineno);
            self.stats.skip();
            return LineOutcome::Unparsed;
        };

        self.feed_record(lineno, &record)
    }

    /// Process an already parsed record.
    pub fn feed_record(&mut self, lineno: u64, record: &LogRecord) -> LineOutcome {
        let decoded = match self.codec.decode(&record.bytes) {
            Ok(decoded) => decoded,
            Err(err @ CodecError::Uncorrectable { .. }) => {
                log::warn!("line {}: {}; skipping", lineno, err);
                self.stats.uncorrectable += 1;
                self.stats.skip();
                return LineOutcome::Undecodable;
            }
            Err(err) => {
                log::warn!("line {}: {}; skipping", lineno, err);
                self.stats.skip();
                return LineOutcome::Undecodable;
            }
        };

        let comparison: Comparison = match self.matcher.compare(&decoded.payload) {
            Ok(comparison) => comparison,
            Err(err) => {
                log::warn!("line {}: {}; skipping", lineno, err);
                self.stats.skip();
                return LineOutcome::LengthMismatch {
                    actual: decoded.payload.len(),
                };
            }
        };

        log::trace!(
            "line {}: {} bit errors, {} corrections",
            lineno,
            comparison.bit_errors,
            decoded.corrected
        );

        self.stats.corrected_codewords += decoded.corrected as u64;
        self.stats
            .record(self.matcher.packet_bits(), &comparison, self.per_packet);
        if let Some(millis) = record.timestamp_millis() {
            self.stats.observe_timestamp(millis);
        }

        LineOutcome::Accepted {
            bit_errors: comparison.bit_errors,
        }
    }

    /// Feed every line of `reader`.
    ///
    /// Lines that are not valid UTF-8 are counted as skipped.
    pub fn scan<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in reader.split(b'\n') {
            let line = line?;
            match std::str::from_utf8(&line) {
                Ok(text) => {
                    self.feed_line(text.trim_end_matches('\r'));
                }
                Err(_) => {
                    self.lines += 1;
                    log::warn!("line {}: not valid UTF-8; skipping", self.lines);
                    self.stats.skip();
                }
            }
        }
        Ok(())
    }

    /// End the scan and compute the report.
    ///
    /// # Errors
    /// `Error::NoValidPackets` if not a single record was accepted.
    pub fn finish(self) -> Result<Report> {
        if self.stats.packets_seen == 0 {
            return Err(Error::NoValidPackets {
                skipped: self.stats.skipped,
            });
        }

        Ok(Report {
            packet_len: self.matcher.expected().len(),
            codec: self.codec.name(),
            stats: self.stats,
        })
    }
}

/// Scan everything `reader` yields and produce the report.
pub fn analyze_reader<R: BufRead>(config: AnalysisConfig, reader: R) -> Result<Report> {
    let mut analyzer = Analyzer::new(config)?;
    analyzer.scan(reader)?;
    analyzer.finish()
}

/// Open and scan a log file.
///
/// # Errors
/// - `Error::Io` if the file cannot be opened or read
/// - `Error::NoValidPackets` if no record matched the reference
pub fn analyze_file(config: AnalysisConfig, path: &Path) -> Result<Report> {
    let file = File::open(path)?;
    analyze_reader(config, BufReader::new(file))
}

/// Re-emit a pipe-delimited line with its byte field decoded by `codec`.
///
/// Produces `timestamp | DECODED HEX | trailing`; lines that do not parse as
/// three fields, or whose payload cannot be decoded, yield `None`.
pub fn rewrite_line(line: &str, codec: &dyn PayloadCodec) -> Option<String> {
    let record = logline::parse(line, LineFormat::Fields)?;
    let decoded = match codec.decode(&record.bytes) {
        Ok(decoded) => decoded,
        Err(err) => {
            log::warn!("cannot decode `{}`: {}", line.trim_end(), err);
            return None;
        }
    };

    Some(format!(
        "{} | {} | {}",
        record.timestamp,
        crate::config::format_hex(&decoded.payload, true),
        record.trailing
    ))
}
