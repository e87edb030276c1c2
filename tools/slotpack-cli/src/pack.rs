//! Pack command - bundle audio files into a container image
//!
//! Inputs are decoded up front; the image is only written once every kept
//! input has been laid out successfully.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use slotpack_audio::AutoCodec;
use slotpack_container::bank::bank_accepts;
use slotpack_container::{AudioCodec, PackItem, Packer, WTPA2_BANK_FORMAT, pack_bank};
use slotpack_shared::{MAX_SOURCE_BYTES, read_file_with_limit};

use crate::config::{ContainerLayout, OnDecodeError, SlotpackConfig};
use crate::discover::discover_inputs;

/// Arguments for the pack command
#[derive(Args)]
pub struct PackArgs {
    /// Output container file (`.spk` is added when it has no extension)
    pub output: PathBuf,

    /// Audio files or directories, in slot order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Container layout (overrides config)
    #[arg(long, value_enum)]
    pub layout: Option<ContainerLayout>,

    /// Abort on the first input that cannot be packed
    #[arg(long)]
    pub strict: bool,

    /// Path to slotpack.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute the pack command
pub fn execute(args: PackArgs) -> Result<()> {
    let config = SlotpackConfig::load_or_default(args.config.as_deref())?;
    let layout = args.layout.unwrap_or(config.format.layout);
    let strict = args.strict || config.pack.on_decode_error == OnDecodeError::Abort;

    let codec = AutoCodec::default();
    let mut items = Vec::new();
    let mut skipped = 0usize;
    for path in discover_inputs(&args.inputs) {
        match load_item(&path, &codec, layout) {
            Ok(item) => {
                info!(
                    "  {} -> slot {} ({} Hz, {}-bit, {} ch, {} frames)",
                    path.display(),
                    items.len(),
                    item.audio.sample_rate,
                    item.audio.bit_depth,
                    item.audio.channel_count,
                    item.audio.frame_count
                );
                items.push(item);
            }
            Err(e) if strict => return Err(e),
            Err(e) => {
                warn!("SKIPPED: {:#}", e);
                skipped += 1;
            }
        }
    }

    let mut output = args.output.clone();
    let image = match layout {
        ContainerLayout::Slotpack => {
            let format = config.format.container_format();
            if output.extension().is_none() {
                output.set_extension(format.extension);
            }
            Packer::new(&format)?
                .with_name_policy(config.names)
                .pack(&items)
                .context("Failed to pack container")?
                .to_bytes()
        }
        ContainerLayout::Wtpa2 => {
            pack_bank(&WTPA2_BANK_FORMAT, &items).context("Failed to pack WTPA2 bank")?
        }
    };

    std::fs::write(&output, &image)
        .with_context(|| format!("Failed to write container: {}", output.display()))?;

    info!(
        "Wrote {} samples to {} ({} bytes)",
        items.len(),
        output.display(),
        image.len()
    );
    if skipped > 0 {
        warn!("{} input(s) skipped", skipped);
    }
    Ok(())
}

/// Read and decode one input, checking it fits the target layout
fn load_item(path: &Path, codec: &dyn AudioCodec, layout: ContainerLayout) -> Result<PackItem> {
    let bytes = read_file_with_limit(path, MAX_SOURCE_BYTES)?;
    let audio = codec
        .decode(&bytes)
        .with_context(|| format!("Cannot decode {}", path.display()))?;
    if layout == ContainerLayout::Wtpa2 {
        bank_accepts(&WTPA2_BANK_FORMAT, &audio)
            .with_context(|| format!("Cannot store {} in a WTPA2 slot", path.display()))?;
    }
    Ok(PackItem::new(path.display().to_string(), audio))
}
