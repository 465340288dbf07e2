//! Hermes Codec Performance Runner
//!
//! Serialize/deserialize N envelope dengan body dan property map
//! ukuran tetap, verifikasi round trip, lalu laporkan waktu dan ukuran.
//!
//! Usage:
//!   cargo run --release --bin hermes_codec_perf -- [OPTIONS]

use std::error::Error;
use std::process;
use std::time::{Duration, Instant};

use hermes_codec::core::BufferKind;
use hermes_codec::protocol::{
    now_ms, BatchDecoder, BatchEncoder, Envelope, EnvelopeCodec, WireFormat,
};
use hermes_codec::workload::build_workload;
use tracing::{error, info};

/// Workload configuration
#[derive(Debug)]
struct PerfConfig {
    messages: usize,
    body_len: usize,
    properties: usize,
    buffer_kind: BufferKind,
    wire_format: WireFormat,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            messages: 20_000,
            body_len: 1_000,
            properties: 100,
            buffer_kind: BufferKind::Heap,
            wire_format: WireFormat::Legacy,
        }
    }
}

/// Hasil satu run
struct PerfReport {
    encode: Duration,
    decode: Duration,
    bytes: usize,
    messages: usize,
}

impl PerfReport {
    fn print(&self) {
        let per_msg = self.bytes / self.messages.max(1);
        println!("\n📊 Hermes Envelope Codec");
        println!("   Messages:        {}", self.messages);
        println!("   Serializing:     {} ms", self.encode.as_millis());
        println!("   Deserializing:   {} ms", self.decode.as_millis());
        println!("   Buffer size:     {} bytes", self.bytes);
        println!("   Size / message:  {} bytes", per_msg);
        println!(
            "   Encode rate:     {:.2} M msgs/sec",
            self.messages as f64 / self.encode.as_secs_f64().max(f64::EPSILON) / 1_000_000.0
        );
        println!(
            "   Decode rate:     {:.2} M msgs/sec",
            self.messages as f64 / self.decode.as_secs_f64().max(f64::EPSILON) / 1_000_000.0
        );
    }
}

fn run(config: &PerfConfig, envelopes: &[Envelope]) -> Result<PerfReport, Box<dyn Error>> {
    let codec = EnvelopeCodec::new(config.wire_format);
    let encoder = BatchEncoder::new(codec);

    let start = Instant::now();
    let batch = encoder.encode(envelopes, config.buffer_kind)?;
    let encode = start.elapsed();

    let start = Instant::now();
    let decoded = BatchDecoder::new(codec, batch.as_bytes()).decode(envelopes.len())?;
    let decode = start.elapsed();

    if decoded != envelopes {
        return Err("decoded envelopes differ from input".into());
    }

    Ok(PerfReport {
        encode,
        decode,
        bytes: batch.len(),
        messages: envelopes.len(),
    })
}

fn parse_args() -> PerfConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = PerfConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--messages" | "-n" => {
                if i + 1 < args.len() {
                    config.messages = args[i + 1].parse().unwrap_or(20_000);
                    i += 1;
                }
            }
            "--body" | "-b" => {
                if i + 1 < args.len() {
                    config.body_len = args[i + 1].parse().unwrap_or(1_000);
                    i += 1;
                }
            }
            "--properties" | "-p" => {
                if i + 1 < args.len() {
                    config.properties = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "--direct" => {
                config.buffer_kind = BufferKind::Direct;
            }
            "--versioned" => {
                config.wire_format = WireFormat::Versioned;
            }
            "--help" | "-h" => {
                println!("Hermes Codec Perf - Envelope Serialization Benchmark\n");
                println!("Usage: hermes_codec_perf [OPTIONS]\n");
                println!("Options:");
                println!("  -n, --messages <N>    Number of envelopes (default: 20000)");
                println!("  -b, --body <BYTES>    Body length (default: 1000)");
                println!("  -p, --properties <N>  Properties per envelope (default: 100)");
                println!("      --direct          Use an mmap-backed direct buffer");
                println!("      --versioned       Prefix envelopes with a version marker");
                println!("  -h, --help            Show this help");
                process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = parse_args();
    info!(?config, "building workload");

    let result = build_workload(config.messages, config.body_len, config.properties, now_ms())
        .map_err(Box::<dyn Error>::from)
        .and_then(|envelopes| run(&config, &envelopes));

    match result {
        Ok(report) => report.print(),
        Err(e) => {
            error!(%e, "perf run failed");
            eprintln!("❌ Codec error: {}", e);
            process::exit(1);
        }
    }
}
