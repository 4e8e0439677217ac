//! wirecodec CLI
//!
//! Command-line front end for the codec layer: decode RESP streams, encode
//! commands, and inspect the protocols in the registry.

use std::fs::File;
use std::io::{self, Read, Write};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use wirecodec::protocol::FrameReader;
use wirecodec::resp::{Decoder, Encoder, RESP};
use wirecodec::{CodecError, Config, ProtocolRegistry, RespValue};

/// wirecodec CLI
#[derive(Parser, Debug)]
#[command(name = "wirecodec-cli")]
#[command(about = "Inspect and produce proxy wire-protocol traffic")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a byte stream and print one value per line
    Decode {
        /// Input file (stdin when omitted)
        #[arg(short, long)]
        file: Option<String>,

        /// Read buffer capacity in bytes
        #[arg(short, long, default_value = "1024")]
        buffer_size: usize,

        /// Protocol carried by the stream
        #[arg(short, long, default_value = "redis")]
        protocol: String,
    },

    /// Print the RESP multi-bulk encoding of a command
    Encode {
        /// Command name and arguments
        #[arg(required = true)]
        args: Vec<String>,
    },

    /// Print a protocol's heartbeat frame as hex
    Heartbeat {
        /// Protocol name
        #[arg(short, long, default_value = "dubbo")]
        protocol: String,

        /// Request id to correlate the heartbeat with
        #[arg(short, long)]
        id: Option<u64>,
    },

    /// List registered protocols
    Protocols,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wirecodec=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Decode {
            file,
            buffer_size,
            protocol,
        } => run_decode(file.as_deref(), buffer_size, &protocol),
        Commands::Encode { args } => run_encode(args),
        Commands::Heartbeat { protocol, id } => run_heartbeat(&protocol, id),
        Commands::Protocols => {
            let registry = ProtocolRegistry::with_defaults(&Config::default());
            for name in registry.names() {
                println!("{}", name);
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn open_input(file: Option<&str>) -> wirecodec::Result<Box<dyn Read>> {
    match file {
        Some(path) => Ok(Box::new(File::open(path)?)),
        None => Ok(Box::new(io::stdin())),
    }
}

fn run_decode(file: Option<&str>, buffer_size: usize, protocol: &str) -> wirecodec::Result<()> {
    let config = Config::builder()
        .read_buffer_size(buffer_size)
        .read_chunk_size(buffer_size)
        .build();
    config.validate()?;
    let input = open_input(file)?;

    // RESP streams go through the streaming decoder directly
    if protocol == RESP.as_str() {
        let mut decoder = Decoder::with_config(input, &config);
        let mut count = 0usize;
        while let Some(value) = decoder.decode_next()? {
            println!("{}", value);
            count += 1;
        }
        tracing::debug!(count, "Decoded RESP values");
        return Ok(());
    }

    let registry = ProtocolRegistry::with_defaults(&config);
    let codec = registry
        .get(protocol)
        .ok_or_else(|| CodecError::Config(format!("unknown protocol: {}", protocol)))?;
    let mut frames = FrameReader::with_config(input, codec, &config);
    while let Some(frame) = frames.next_frame()? {
        println!("{:?}", frame);
    }
    Ok(())
}

fn run_encode(args: Vec<String>) -> wirecodec::Result<()> {
    let stdout = io::stdout();
    let mut encoder = Encoder::new(stdout.lock());
    encoder.encode(&RespValue::command(args), true)
}

fn run_heartbeat(protocol: &str, id: Option<u64>) -> wirecodec::Result<()> {
    let registry = ProtocolRegistry::with_defaults(&Config::default());
    let codec = registry
        .get(protocol)
        .ok_or_else(|| CodecError::Config(format!("unknown protocol: {}", protocol)))?;

    let id = id.unwrap_or_else(wirecodec::id::generate_id);
    let frame = match codec.trigger(id) {
        Some(frame) => frame,
        None => {
            println!("{} has no heartbeat", codec.name());
            return Ok(());
        }
    };

    let bytes = codec.encode(frame.as_ref())?;
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", hex)?;
    Ok(())
}
