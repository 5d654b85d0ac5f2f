mod config;
mod log_gen;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};

use anyhow::{bail, Context, Result};
use berkit_core::{
    analysis::{rewrite_line, Analyzer},
    codec::{Hamming74, PayloadCodec, Plain},
    config::{parse_hex_bytes, Radio, TEST_PAYLOAD},
    firmware::PredefinedPacket,
    packet::MAX_PAYLOAD_LEN,
    sample::SampleGenerator,
};
use clap::Parser;

use crate::config::{AnalyzeArgs, Cli, CodecArg, Command, FirmwareArgs, SynthArgs};
use crate::log_gen::LogSpec;

fn codec_for(codec: CodecArg) -> Box<dyn PayloadCodec> {
    match codec {
        CodecArg::Plain => Box::new(Plain),
        CodecArg::Hamming => Box::new(Hamming74),
    }
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    let config = args.to_config()?;
    if args.print_config {
        config::print_config(&args.log, &config);
    }

    let file = File::open(&args.log).with_context(|| format!("cannot open `{}`", args.log.display()))?;

    let mut analyzer = Analyzer::new(config)?;
    analyzer.scan(BufReader::new(file))?;
    let report = analyzer.finish()?;

    if args.export {
        print!("{}", report.export_text());
    } else {
        report.print_summary();
    }
    if args.per_packet {
        println!();
        report.print_per_packet();
    }

    Ok(())
}

fn decode(log: &std::path::Path, codec: CodecArg) -> Result<()> {
    let codec = codec_for(codec);
    let file = File::open(log).with_context(|| format!("cannot open `{}`", log.display()))?;

    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Some(rewritten) = rewrite_line(&line, codec.as_ref()) {
            println!("{rewritten}");
        }
    }

    Ok(())
}

/// Payload for the predefined packet: generated samples or the fixed test bytes.
fn firmware_payload(samples: Option<usize>) -> Result<Vec<u8>> {
    match samples {
        Some(len) if len == 0 || len > MAX_PAYLOAD_LEN => {
            bail!("--samples must be within 1..={MAX_PAYLOAD_LEN}, got {len}")
        }
        Some(len) => Ok(SampleGenerator::new().fill(len, true)),
        None => Ok(TEST_PAYLOAD.to_vec()),
    }
}

fn firmware(args: FirmwareArgs) -> Result<()> {
    let payload = firmware_payload(args.samples)?;

    let header = Radio::from(args.radio).sync_header();
    let codec = codec_for(args.codec);
    let predefined = PredefinedPacket::new(&header, args.sequence, &payload, codec.as_ref())?;
    let text = predefined.render();

    match args.output {
        Some(path) => {
            fs::write(&path, text).with_context(|| format!("cannot write `{}`", path.display()))?;
            eprintln!(
                "Generated {} ({} ECC, {} byte packet).",
                path.display(),
                codec.name(),
                predefined.packet.len()
            );
        }
        None => print!("{text}"),
    }

    Ok(())
}

fn synth(args: SynthArgs) -> Result<()> {
    for (name, rate) in [
        ("flip-rate", args.flip_rate),
        ("truncated", args.truncated),
        ("overflow", args.overflow),
    ] {
        if !(0.0..=1.0).contains(&rate) {
            bail!("--{name} must be within 0.0..=1.0, got {rate}");
        }
    }

    let expected = parse_hex_bytes(&args.expected)?;
    let spec = LogSpec {
        packets: args.packets,
        flip_rate: args.flip_rate,
        truncated: args.truncated,
        overflow: args.overflow,
        seed: config::resolve_seed(args.seed),
    };
    log::info!("synthesizing {} lines with seed {}", spec.packets, spec.seed);

    let codec = codec_for(args.codec);
    let (lines, truth) = log_gen::generate_log(&expected, codec.as_ref(), &spec);
    log_gen::write_log(&args.output, &lines)
        .with_context(|| format!("cannot write `{}`", args.output.display()))?;

    eprintln!("Seed: {}", spec.seed);
    eprintln!(
        "Wrote {} lines: {} full, {} truncated, {} overflow, {} bits flipped.",
        lines.len(),
        truth.full_packets,
        truth.truncated,
        truth.overflow,
        truth.flipped_bits
    );

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Command::Analyze(args) => analyze(args)?,
        Command::Decode { log, codec } => decode(&log, codec)?,
        Command::Firmware(args) => firmware(args)?,
        Command::Synth(args) => synth(args)?,
    }
    Ok(())
}
