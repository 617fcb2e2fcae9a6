//! Easel Player
//!
//! Runs an Easel module headlessly.
//!
//! # Usage
//!
//! ```bash
//! easel-player demo.wasm --frames 120 --capture out.png
//! easel-player demo.wasm --input-script clicks.jsonl --refresh-rate 30
//! RUST_LOG=debug easel-player demo.wasm --trace-protocol
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use easel_core::config;
use easel_player::player::{PlayerConfig, run, save_config};

#[derive(Parser)]
#[command(name = "easel-player")]
#[command(author, version, about = "Easel - run sandboxed drawing modules")]
struct Args {
    /// Module to run (.wasm)
    module: PathBuf,

    /// Stop after this many frames (default: run until the module ends)
    #[arg(long, short = 'n')]
    frames: Option<u64>,

    /// Simulated display refresh rate in Hz (default: from config, 60)
    #[arg(long, short = 'r')]
    refresh_rate: Option<u32>,

    /// Host canvas width in pixels (requires --height)
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Host canvas height in pixels (requires --width)
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// JSON-lines file of input events keyed by frame
    #[arg(long, value_name = "FILE")]
    input_script: Option<PathBuf>,

    /// Save the last presented frame as PNG (file or directory)
    #[arg(long, value_name = "PATH")]
    capture: Option<PathBuf>,

    /// Config file (default: platform config dir)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log every protocol message as JSON
    #[arg(long)]
    trace_protocol: bool,

    /// Write the effective settings back to the config file before running
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.trace_protocol {
        filter = filter.add_directive("easel_core::worker=trace".parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if !args.module.exists() {
        anyhow::bail!("Module file not found: {}", args.module.display());
    }

    let mut bridge = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load(),
    };
    if let Some(rate) = args.refresh_rate {
        if rate == 0 {
            anyhow::bail!("Refresh rate must be at least 1 Hz");
        }
        bridge.runtime.refresh_rate = rate;
    }
    if args.trace_protocol {
        bridge.protocol.trace_messages = true;
    }
    if args.save_config {
        save_config(&bridge, args.config.as_deref())?;
        tracing::info!("Settings saved");
    }

    let config = PlayerConfig {
        module_path: args.module,
        frames: args.frames,
        size: args.width.zip(args.height),
        input_script: args.input_script,
        capture: args.capture,
        bridge,
    };

    let report = run(config)?;
    tracing::info!(
        "Done: {} frames, {} ticks skipped, {} late",
        report.completed,
        report.skipped,
        report.late_ticks
    );
    Ok(())
}
