//! Receiver log line parsing.
//!
//! Receivers print one line per packet:
//!
//! ```text
//! 15:17:18.394 | 0f 46 bd f8 f7 ea 41 ac | -91 CRC error
//! ```
//!
//! Two parsers share the [`parse`] entry point and are tried in a fixed
//! order:
//! - **Fields**: split strictly on `|`, at least three fields, every token
//!   in the second field a hex byte. One bad token rejects the line.
//! - **Hex run**: search for `| xx xx .. |` anywhere in the line, at least
//!   two two-digit bytes, tolerant of noise around it. Lines without such a
//!   run (overflow notices, banners) simply do not parse.

use crate::config::{parse_hex_byte, LineFormat};
use crate::error::ParseError;

/// One parsed receiver log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Receive timestamp as printed
    pub timestamp: String,

    /// Logged packet bytes (length, sequence, payload)
    pub bytes: Vec<u8>,

    /// Whatever follows the byte field: RSSI, CRC status, ...
    pub trailing: String,
}

impl LogRecord {
    /// Timestamp as milliseconds since midnight, if it reads `HH:MM:SS[.fff]`.
    pub fn timestamp_millis(&self) -> Option<u64> {
        parse_clock_millis(&self.timestamp)
    }
}

/// Parse a line with the parsers enabled by `format`.
///
/// Returns `None` when no enabled parser accepts the line. A bad hex token
/// in an otherwise well-formed pipe line is logged as a warning.
pub fn parse(line: &str, format: LineFormat) -> Option<LogRecord> {
    match format {
        LineFormat::Fields => parse_fields_logged(line),
        LineFormat::HexRun => parse_hex_run(line).ok(),
        LineFormat::Auto => parse_fields_logged(line).or_else(|| parse_hex_run(line).ok()),
    }
}

fn parse_fields_logged(line: &str) -> Option<LogRecord> {
    match parse_fields(line) {
        Ok(record) => Some(record),
        Err(err @ ParseError::InvalidHexToken { .. }) => {
            log::warn!("could not parse hex values in line `{}`: {}", line.trim_end(), err);
            None
        }
        Err(err) => {
            log::trace!("not a field line ({}): `{}`", err, line.trim_end());
            None
        }
    }
}

/// Strict `timestamp | hex bytes | trailing` parser.
///
/// Fields beyond the third are kept as part of `trailing`.
pub fn parse_fields(line: &str) -> Result<LogRecord, ParseError> {
    let parts: Vec<&str> = line.splitn(3, '|').collect();
    if parts.len() < 3 {
        return Err(ParseError::FieldCount { found: parts.len() });
    }

    let bytes = parts[1]
        .split_whitespace()
        .map(parse_hex_byte)
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(LogRecord {
        timestamp: parts[0].trim().to_string(),
        bytes,
        trailing: parts[2].trim().to_string(),
    })
}

/// Find the first `|`-delimited run of two-digit hex bytes in `line`.
///
/// The run must hold at least two bytes and may only be padded with
/// whitespace inside the delimiters.
pub fn parse_hex_run(line: &str) -> Result<LogRecord, ParseError> {
    let pipes: Vec<usize> = line.match_indices('|').map(|(i, _)| i).collect();

    for window in pipes.windows(2) {
        let (open, close) = (window[0], window[1]);
        if let Some(bytes) = hex_run(&line[open + 1..close]) {
            return Ok(LogRecord {
                timestamp: line[..open].trim().to_string(),
                bytes,
                trailing: line[close + 1..].trim().to_string(),
            });
        }
    }

    Err(ParseError::NoHexRun)
}

fn hex_run(segment: &str) -> Option<Vec<u8>> {
    let tokens: Vec<&str> = segment.split_whitespace().collect();
    if tokens.len() < 2 || tokens.iter().any(|t| t.len() != 2) {
        return None;
    }
    tokens.into_iter().map(|t| parse_hex_byte(t).ok()).collect()
}

/// Parse `HH:MM:SS` or `HH:MM:SS.fff` into milliseconds since midnight.
pub fn parse_clock_millis(text: &str) -> Option<u64> {
    let (clock, frac) = match text.trim().split_once('.') {
        Some((clock, frac)) => (clock, Some(frac)),
        None => (text.trim(), None),
    };

    let mut fields = clock.split(':');
    let hours: u64 = fields.next()?.parse().ok()?;
    let minutes: u64 = fields.next()?.parse().ok()?;
    let seconds: u64 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let millis = match frac {
        None => 0,
        Some(frac) if !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()) => {
            // Keep millisecond resolution: "3" -> 300, "394" -> 394, "39412" -> 394.
            let digits: String = frac.chars().chain("00".chars()).take(3).collect();
            digits.parse().ok()?
        }
        Some(_) => return None,
    };

    Some(((hours * 60 + minutes) * 60 + seconds) * 1000 + millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields_line() {
        let record = parse("12:00:00.000 | 0f 00 | -80 OK", LineFormat::Auto).unwrap();
        assert_eq!(record.timestamp, "12:00:00.000");
        assert_eq!(record.bytes, vec![0x0F, 0x00]);
        assert_eq!(record.trailing, "-80 OK");
    }

    #[test]
    fn test_parse_fields_uppercase_and_no_spaces() {
        let record = parse_fields("15:17:18.394 |0F 46 BD|  -91 CRC error").unwrap();
        assert_eq!(record.bytes, vec![0x0F, 0x46, 0xBD]);
        assert_eq!(record.trailing, "-91 CRC error");
    }

    #[test]
    fn test_parse_fields_keeps_extra_pipes_in_trailing() {
        let record = parse_fields("t | 01 02 | -70 | extra").unwrap();
        assert_eq!(record.trailing, "-70 | extra");
    }

    #[test]
    fn test_parse_fields_too_few_fields() {
        assert_eq!(
            parse_fields("12:00:00 | 0f 00"),
            Err(ParseError::FieldCount { found: 2 })
        );
    }

    #[test]
    fn test_parse_fields_bad_token() {
        assert!(matches!(
            parse_fields("t | 0f zz | ok"),
            Err(ParseError::InvalidHexToken { token }) if token == "zz"
        ));
        assert!(parse("t | 0f zz | ok", LineFormat::Fields).is_none());
    }

    #[test]
    fn test_parse_fields_empty_byte_field() {
        let record = parse_fields("t |  | overflow").unwrap();
        assert!(record.bytes.is_empty());
    }

    #[test]
    fn test_hex_run_with_noise() {
        let record = parse_hex_run("RX>> ts=5 | 0f 00 10 |rssi -60 ").unwrap();
        assert_eq!(record.timestamp, "RX>> ts=5");
        assert_eq!(record.bytes, vec![0x0F, 0x00, 0x10]);
        assert_eq!(record.trailing, "rssi -60");
    }

    #[test]
    fn test_hex_run_skips_non_hex_segments() {
        let record = parse_hex_run("a | status ok | 01 02 | b").unwrap();
        assert_eq!(record.bytes, vec![0x01, 0x02]);
        assert_eq!(record.timestamp, "a | status ok");
    }

    #[test]
    fn test_hex_run_requires_two_bytes() {
        assert_eq!(parse_hex_run("t | 0f | x"), Err(ParseError::NoHexRun));
        assert_eq!(parse_hex_run("t | 0f 1 | x"), Err(ParseError::NoHexRun));
        assert_eq!(parse_hex_run("RX FIFO overflow"), Err(ParseError::NoHexRun));
    }

    #[test]
    fn test_auto_falls_back_to_hex_run() {
        // Field 2 is noise, but a later pipe pair holds a clean run.
        let record = parse("t | n/a | 0a 0b |", LineFormat::Auto).unwrap();
        assert_eq!(record.bytes, vec![0x0A, 0x0B]);

        assert!(parse("t | n/a | 0a 0b |", LineFormat::Fields).is_none());
        assert!(parse("overflow", LineFormat::Auto).is_none());
    }

    #[test]
    fn test_hex_run_only_format() {
        assert!(parse("t | 0f | x", LineFormat::HexRun).is_none());
        assert!(parse("t | 0f 00 | x", LineFormat::HexRun).is_some());
    }

    #[test]
    fn test_parse_clock_millis() {
        assert_eq!(parse_clock_millis("00:00:01.5"), Some(1500));
        assert_eq!(parse_clock_millis("15:17:18.394"), Some(55_038_394));
        assert_eq!(parse_clock_millis("01:00:00"), Some(3_600_000));
        assert_eq!(parse_clock_millis("00:00:00.12345"), Some(123));
        assert_eq!(parse_clock_millis("12:61:00"), None);
        assert_eq!(parse_clock_millis("24:00:00"), None);
        assert_eq!(parse_clock_millis("18446744073709551615:00:00"), None);
        assert_eq!(parse_clock_millis("23:59:59.999"), Some(86_399_999));
        assert_eq!(parse_clock_millis("noon"), None);
        assert_eq!(parse_clock_millis("00:00:00.x"), None);
    }
}
