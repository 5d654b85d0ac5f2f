//! berkit-core: bit-error analysis for backscatter test links
//!
//! This library provides the core components for evaluating a test link that:
//! - Protects a fixed payload with Hamming(7,4) forward error correction
//! - Frames it behind a radio sync header with length and sequence bytes
//! - Is received and logged line by line as hex bytes
//!
//! and then measures how many bits arrived wrong.
//!
//! # Architecture
//!
//! Leaves first:
//! - `hamming`: Hamming(7,4) nibble/byte codec
//! - `codec`: swappable payload codecs behind one trait
//! - `packet`: packet framing and its inverse
//! - `logline`: receiver log line parsing
//! - `matcher`: bit-level comparison with the reference packet
//! - `metrics`: run statistics and the final report
//! - `analysis`: the scan loop tying the above together
//! - `config`: run configuration and hex helpers
//! - `firmware`, `sample`: artifacts for the transmitting side
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **Lines never abort a scan**: malformed input is counted, not raised
//! - **Deterministic**: counters are plain sums, so totals do not depend on
//!   how the log is split up

pub mod analysis;
pub mod codec;
pub mod config;
pub mod error;
pub mod firmware;
pub mod hamming;
pub mod logline;
pub mod matcher;
pub mod metrics;
pub mod packet;
pub mod sample;

// Re-export commonly used types
pub use analysis::{analyze_file, analyze_reader, Analyzer};
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use metrics::{Report, RunStatistics};
