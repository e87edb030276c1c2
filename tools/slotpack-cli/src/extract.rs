//! Extract command - recover sample files from a container or raw device

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::{info, warn};

use slotpack_audio::{AudioFileKind, AutoCodec};
use slotpack_container::{
    ByteSource, ContainerKind, DirectorySink, Extractor, FileSource, WTPA2_BANK_FORMAT,
    detect_kind, extract_bank,
};

use crate::config::SlotpackConfig;

/// Arguments for the extract command
#[derive(Args)]
pub struct ExtractArgs {
    /// Container file or raw device (e.g. /dev/sdb)
    pub source: PathBuf,

    /// Directory for the extracted samples (created if missing)
    pub target: PathBuf,

    /// Examine at most N slot table entries
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub slots: Option<u64>,

    /// Output audio format (overrides config)
    #[arg(long)]
    pub audio: Option<AudioFileKind>,

    /// Path to slotpack.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute the extract command
pub fn execute(args: ExtractArgs) -> Result<()> {
    let config = SlotpackConfig::load_or_default(args.config.as_deref())?;
    let format = config.format.container_format();
    let codec = AutoCodec::new(args.audio.unwrap_or(config.extract.audio));
    let limit = args.slots.map(|n| n as usize);

    let mut source = FileSource::open(&args.source)
        .with_context(|| format!("Failed to open {}", args.source.display()))?;
    info!("Reading from {}", args.source.display());

    let mut head = [0u8; 8];
    let got = source
        .read_at(0, &mut head)
        .with_context(|| format!("Failed to read {}", args.source.display()))?;
    let Some(kind) = detect_kind(&head[..got], &format, &WTPA2_BANK_FORMAT) else {
        bail!("No slot container or WTPA2 bank found in {}", args.source.display());
    };

    let mut sink = DirectorySink::create(&args.target)
        .with_context(|| format!("Failed to create directory: {}", args.target.display()))?;

    let report = match kind {
        ContainerKind::SlotTable => Extractor::new(&format)?
            .with_slot_limit(limit)
            .extract(&mut source, &codec, &mut sink),
        ContainerKind::Wtpa2Bank => {
            extract_bank(&WTPA2_BANK_FORMAT, &mut source, limit, &codec, &mut sink)
        }
    }
    .with_context(|| format!("Failed to read container: {}", args.source.display()))?;

    for slot in &report.extracted {
        info!("  slot {:>3} -> {}", slot.slot, slot.file_name);
    }
    info!(
        "Extracted {} sample(s) from {} slot(s) into {}",
        report.extracted.len(),
        report.examined,
        args.target.display()
    );

    if !report.is_success() {
        bail!(
            "No samples recovered: {} slot(s) failed",
            report.failures.len()
        );
    }
    if !report.failures.is_empty() {
        warn!("{} slot(s) could not be recovered", report.failures.len());
    }
    Ok(())
}
