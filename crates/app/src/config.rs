//! Command-line configuration for the berkit application.
//!
//! Parses arguments with clap and resolves them into core configuration.
//!
//! # Philosophy
//!
//! Every subcommand works with only the required path: the reference packet,
//! radio and codec default to the firmware test setup.

use std::path::PathBuf;

use berkit_core::config::{self, AnalysisConfig, Encoding, LineFormat, Radio};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[clap(name = "berkit", version, author = "berkit")]
#[clap(about = "Bit-error analysis for backscatter test logs.", long_about = None)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[clap(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute bit-error statistics of a receiver log.
    #[command(arg_required_else_help = true)]
    Analyze(AnalyzeArgs),
    /// Print a receiver log with its payload decoded.
    #[command(arg_required_else_help = true)]
    Decode {
        /// The log file to decode.
        #[arg(required = true)]
        log: PathBuf,
        /// Codec the payload was protected with.
        #[clap(short, long, value_enum, default_value = "hamming")]
        codec: CodecArg,
    },
    /// Generate the predefined packet header for the tag firmware.
    Firmware(FirmwareArgs),
    /// Write a synthetic receiver log with random bit flips.
    Synth(SynthArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// The receiver log file.
    #[arg(required = true)]
    pub log: PathBuf,
    /// Reference packet as space-separated hex bytes.
    #[clap(short, long, default_value = config::DEFAULT_EXPECTED)]
    pub expected: String,
    /// Codec the logged payload was protected with.
    #[clap(short, long, value_enum, default_value = "plain")]
    pub codec: CodecArg,
    /// Leading logged bytes that were sent unencoded.
    #[clap(long, default_value = "0")]
    pub plain_prefix: usize,
    /// Accepted log line shapes.
    #[clap(long, value_enum, default_value = "auto")]
    pub format: FormatArg,
    /// Print the bit-error count of every accepted packet.
    #[clap(long, default_value = "false")]
    pub per_packet: bool,
    /// Print key=value lines instead of the summary.
    #[clap(long, default_value = "false")]
    pub export: bool,
    /// Print the resolved configuration before scanning.
    #[clap(long, default_value = "false")]
    pub print_config: bool,
}

#[derive(Debug, Args)]
pub struct FirmwareArgs {
    /// Codec protecting the payload.
    #[clap(short, long, value_enum, default_value = "hamming")]
    pub codec: CodecArg,
    /// Receiver whose sync word heads the packet.
    #[clap(short, long, value_enum, default_value = "cc2500")]
    pub radio: RadioArg,
    /// Sequence number written into the packet.
    #[clap(short, long, default_value = "0")]
    pub sequence: u8,
    /// Use N bytes of generated samples instead of the fixed test payload.
    #[clap(long)]
    pub samples: Option<usize>,
    /// Where to write the header; stdout if omitted.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SynthArgs {
    /// Where to write the log.
    #[arg(required = true)]
    pub output: PathBuf,
    /// Number of packet lines.
    #[clap(short, long, default_value = "1000")]
    pub packets: usize,
    /// Probability of flipping each transmitted bit.
    #[clap(short, long, default_value = "0.001")]
    pub flip_rate: f64,
    /// Fraction of lines logged with a truncated payload.
    #[clap(long, default_value = "0.0")]
    pub truncated: f64,
    /// Fraction of lines replaced by an overflow notice.
    #[clap(long, default_value = "0.0")]
    pub overflow: f64,
    /// Codec protecting the payload on the air.
    #[clap(short, long, value_enum, default_value = "plain")]
    pub codec: CodecArg,
    /// Reference packet as space-separated hex bytes.
    #[clap(short, long, default_value = config::DEFAULT_EXPECTED)]
    pub expected: String,
    /// Random seed (time-based if omitted).
    #[clap(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodecArg {
    Plain,
    Hamming,
}

impl From<CodecArg> for Encoding {
    fn from(codec: CodecArg) -> Self {
        match codec {
            CodecArg::Plain => Encoding::Plain,
            CodecArg::Hamming => Encoding::Hamming74,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RadioArg {
    Cc2500,
    Cc1352,
}

impl From<RadioArg> for Radio {
    fn from(radio: RadioArg) -> Self {
        match radio {
            RadioArg::Cc2500 => Radio::Cc2500,
            RadioArg::Cc1352 => Radio::Cc1352,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Auto,
    Fields,
    HexRun,
}

impl From<FormatArg> for LineFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Auto => LineFormat::Auto,
            FormatArg::Fields => LineFormat::Fields,
            FormatArg::HexRun => LineFormat::HexRun,
        }
    }
}

impl AnalyzeArgs {
    /// Resolve into the core analysis configuration.
    pub fn to_config(&self) -> berkit_core::Result<AnalysisConfig> {
        let config = AnalysisConfig::from_hex(&self.expected)?
            .with_encoding(self.codec.into())
            .with_plain_prefix(self.plain_prefix)
            .with_line_format(self.format.into())
            .with_per_packet(true);
        config.validate()?;
        Ok(config)
    }
}

/// Resolve a seed: explicit, or derived from the clock.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    })
}

/// Print the resolved analysis configuration in human-readable form.
pub fn print_config(log: &std::path::Path, config: &AnalysisConfig) {
    println!("=== Configuration ===");
    println!("Log file:      {}", log.display());
    println!("Expected:      {}", config::format_hex(&config.expected, false));
    println!("Packet length: {} bytes", config.packet_len());
    println!("Encoding:      {:?}", config.encoding);
    println!("Plain prefix:  {} bytes", config.plain_prefix);
    println!("Line format:   {:?}", config.line_format);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["berkit", "analyze", "run.txt"]).unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };

        let config = args.to_config().unwrap();
        assert_eq!(config.expected, config::default_expected());
        assert_eq!(config.encoding, Encoding::Plain);
        assert_eq!(config.line_format, LineFormat::Auto);
    }

    #[test]
    fn test_analyze_options() {
        let cli = Cli::try_parse_from([
            "berkit",
            "-v",
            "analyze",
            "run.txt",
            "--expected",
            "0f 00",
            "--codec",
            "hamming",
            "--format",
            "hex-run",
        ])
        .unwrap();
        assert!(cli.verbose);

        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.expected, vec![0x0F, 0x00]);
        assert_eq!(config.encoding, Encoding::Hamming74);
        assert_eq!(config.line_format, LineFormat::HexRun);
    }

    #[test]
    fn test_bad_expected_rejected() {
        let cli = Cli::try_parse_from(["berkit", "analyze", "run.txt", "-e", "0f xx"]).unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert!(args.to_config().is_err());
    }

    #[test]
    fn test_missing_log_path() {
        assert!(Cli::try_parse_from(["berkit", "analyze"]).is_err());
    }

    #[test]
    fn test_explicit_seed() {
        assert_eq!(resolve_seed(Some(42)), 42);
    }
}
