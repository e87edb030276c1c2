//! Input discovery
//!
//! A directory contributes its files first, sorted by name, then each
//! subdirectory in name order, recursively. Slot order on the device follows
//! this order.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

/// Expand files and directories into the ordered list of files to pack.
/// Missing paths are reported and skipped.
pub fn discover_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            collect_dir(input, &mut files);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            warn!("{} does not exist, skipping", input.display());
        }
    }
    files
}

fn collect_dir(dir: &Path, files: &mut Vec<PathBuf>) {
    info!("Processing directory {}", dir.display());

    let mut subdirs = Vec::new();
    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in entries {
        match entry {
            Ok(entry) if entry.file_type().is_dir() => subdirs.push(entry.into_path()),
            Ok(entry) if entry.path().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry in {}: {}", dir.display(), e),
        }
    }

    for subdir in subdirs {
        collect_dir(&subdir, files);
    }
}
