//! Inspect command - show a container's header and slot table

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;

use slotpack_container::{
    ByteSource, ContainerKind, Extractor, FileSource, SampleDescriptor, SlotEntry, SlotTable,
    WTPA2_BANK_FORMAT, detect_kind, read_bank_table,
};

use crate::config::SlotpackConfig;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Container file or raw device
    pub source: PathBuf,

    /// Examine at most N slot table entries
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub slots: Option<u64>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Path to slotpack.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    layout: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u16>,
    capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_size: Option<u32>,
    examined: usize,
    slots: Vec<SlotRow>,
}

#[derive(Debug, Serialize)]
struct SlotRow {
    slot: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    descriptor: Option<SampleDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn slot_rows(table: &SlotTable) -> Vec<SlotRow> {
    table
        .entries()
        .iter()
        .enumerate()
        .filter_map(|(slot, entry)| match entry {
            SlotEntry::Empty => None,
            SlotEntry::Occupied(descriptor) => Some(SlotRow {
                slot,
                descriptor: Some(*descriptor),
                error: None,
            }),
            SlotEntry::Invalid(fault) => Some(SlotRow {
                slot,
                descriptor: None,
                error: Some(fault.to_string()),
            }),
        })
        .collect()
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let config = SlotpackConfig::load_or_default(args.config.as_deref())?;
    let format = config.format.container_format();
    let limit = args.slots.map(|n| n as usize);

    let mut source = FileSource::open(&args.source)
        .with_context(|| format!("Failed to open {}", args.source.display()))?;
    let mut head = [0u8; 8];
    let got = source.read_at(0, &mut head)?;

    let report = match detect_kind(&head[..got], &format, &WTPA2_BANK_FORMAT) {
        Some(ContainerKind::SlotTable) => {
            let view = Extractor::new(&format)?
                .with_slot_limit(limit)
                .read_table(&mut source)
                .context("Failed to read slot table")?;
            InspectReport {
                layout: format.name,
                version: Some(view.header.version),
                capacity: view.table.capacity(),
                block_size: Some(view.header.block_size),
                total_size: Some(view.header.total_size),
                examined: view.table.examined(),
                slots: slot_rows(&view.table),
            }
        }
        Some(ContainerKind::Wtpa2Bank) => {
            let table = read_bank_table(&WTPA2_BANK_FORMAT, &mut source, limit)
                .context("Failed to read WTPA2 bank")?;
            InspectReport {
                layout: WTPA2_BANK_FORMAT.name,
                version: None,
                capacity: table.capacity(),
                block_size: None,
                total_size: None,
                examined: table.examined(),
                slots: slot_rows(&table),
            }
        }
        None => bail!("No slot container or WTPA2 bank found in {}", args.source.display()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &InspectReport) {
    println!("Layout:   {}", report.layout);
    if let Some(version) = report.version {
        println!("Version:  {}", version);
    }
    println!("Slots:    {} ({} examined)", report.capacity, report.examined);
    if let Some(block_size) = report.block_size {
        println!("Block:    {} bytes", block_size);
    }
    match report.total_size {
        Some(0) => println!("Size:     unknown"),
        Some(size) => println!("Size:     {} bytes", size),
        None => {}
    }
    println!();

    if report.slots.is_empty() {
        println!("No samples.");
        return;
    }

    println!(
        "{:>4}  {:<16}  {:>6}  {:>4}  {:>2}  {:>9}  {:>10}  {:>8}",
        "SLOT", "NAME", "RATE", "BITS", "CH", "FRAMES", "OFFSET", "SECONDS"
    );
    for row in &report.slots {
        match (&row.descriptor, &row.error) {
            (Some(d), _) => println!(
                "{:>4}  {:<16}  {:>6}  {:>4}  {:>2}  {:>9}  {:>10}  {:>8.3}",
                row.slot,
                d.name(),
                d.sample_rate,
                d.bit_depth,
                d.channel_count,
                d.frame_count,
                d.data_offset,
                d.duration_seconds()
            ),
            (None, Some(error)) => println!("{:>4}  INVALID: {}", row.slot, error),
            (None, None) => {}
        }
    }
}
