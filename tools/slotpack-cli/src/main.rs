//! slotpack - sampler slot-container tool
//!
//! # Commands
//!
//! - `slotpack pack` - Bundle audio files into a container image
//! - `slotpack extract` - Recover sample files from a container or raw device
//! - `slotpack inspect` - Show the header and slot table of a container
//!
//! # Usage
//!
//! ```bash
//! # Pack a directory of AIFF/WAV files
//! slotpack pack bank.spk samples/
//!
//! # Write a legacy WTPA2 bank
//! slotpack pack --layout wtpa2 card.img kicks/ snares/
//!
//! # Recover the first 16 slots straight from an SD card
//! slotpack extract --slots 16 /dev/sdb recovered/
//! ```
//!
//! # Config (slotpack.toml)
//!
//! ```toml
//! [format]
//! layout = "slotpack"
//! block_size = 512
//!
//! [names]
//! overflow = "keep-end"
//! duplicates = "number"
//!
//! [pack]
//! on_decode_error = "abort"
//!
//! [extract]
//! audio = "wav"
//! ```

mod config;
mod discover;
mod extract;
mod inspect;
mod pack;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// slotpack - sampler slot-container tool
#[derive(Parser)]
#[command(name = "slotpack")]
#[command(about = "Pack and extract sampler slot containers")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle audio files into a container image
    Pack(pack::PackArgs),

    /// Recover sample files from a container or raw device
    Extract(extract::ExtractArgs),

    /// Show the header and slot table of a container
    Inspect(inspect::InspectArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Pack(args) => pack::execute(args),
        Commands::Extract(args) => extract::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
    }
}
