//! slotpack.toml configuration
//!
//! Every section is optional; command-line flags override file values.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use slotpack_audio::AudioFileKind;
use slotpack_container::{ContainerFormat, NamePolicy, SLOTPACK_FORMAT};

/// slotpack.toml structure
#[derive(Debug, Default, Deserialize)]
pub struct SlotpackConfig {
    #[serde(default)]
    pub format: FormatSection,
    #[serde(default)]
    pub names: NamePolicy,
    #[serde(default)]
    pub pack: PackSection,
    #[serde(default)]
    pub extract: ExtractSection,
}

/// Image layouts the tool can write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContainerLayout {
    /// Slot-table container
    #[default]
    Slotpack,
    /// Legacy WTPA2 fixed-slot bank
    Wtpa2,
}

/// Container geometry overrides
#[derive(Debug, Default, Deserialize)]
pub struct FormatSection {
    #[serde(default)]
    pub layout: ContainerLayout,
    pub max_slots: Option<u16>,
    pub block_size: Option<u32>,
    pub max_container_size: Option<u32>,
    /// Rate the target plays back natively; other rates are packed with a warning
    pub preferred_sample_rate: Option<u32>,
}

impl FormatSection {
    /// Built-in slot-table format with this section's overrides applied
    pub fn container_format(&self) -> ContainerFormat {
        let mut format = SLOTPACK_FORMAT;
        if let Some(max_slots) = self.max_slots {
            format = format.with_max_slots(max_slots);
        }
        if let Some(block_size) = self.block_size {
            format = format.with_block_size(block_size);
        }
        if let Some(max_container_size) = self.max_container_size {
            format = format.with_max_container_size(max_container_size);
        }
        if self.preferred_sample_rate.is_some() {
            format = format.with_preferred_sample_rate(self.preferred_sample_rate);
        }
        format
    }
}

/// What to do with inputs that cannot be decoded or do not fit a slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnDecodeError {
    #[default]
    Skip,
    Abort,
}

#[derive(Debug, Default, Deserialize)]
pub struct PackSection {
    #[serde(default)]
    pub on_decode_error: OnDecodeError,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractSection {
    /// Format of extracted sample files
    #[serde(default)]
    pub audio: AudioFileKind,
}

impl SlotpackConfig {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Parse configuration from a string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotpack_container::{DuplicateNames, NameOverflow};

    #[test]
    fn test_empty_config() {
        let config = SlotpackConfig::parse("").unwrap();
        assert_eq!(config.format.layout, ContainerLayout::Slotpack);
        assert_eq!(config.format.container_format(), SLOTPACK_FORMAT);
        assert_eq!(config.names, NamePolicy::default());
        assert_eq!(config.pack.on_decode_error, OnDecodeError::Skip);
        assert_eq!(config.extract.audio, AudioFileKind::Aiff);
    }

    #[test]
    fn test_full_config() {
        let config = SlotpackConfig::parse(
            r#"
[format]
layout = "wtpa2"
max_slots = 64
block_size = 4096
max_container_size = 1048576
preferred_sample_rate = 22050

[names]
overflow = "keep-end"
duplicates = "number"

[pack]
on_decode_error = "abort"

[extract]
audio = "wav"
"#,
        )
        .unwrap();

        assert_eq!(config.format.layout, ContainerLayout::Wtpa2);
        let format = config.format.container_format();
        assert_eq!(format.max_slots, 64);
        assert_eq!(format.block_size, 4096);
        assert_eq!(format.max_container_size, 1_048_576);
        assert_eq!(format.preferred_sample_rate, Some(22050));
        assert_eq!(format.magic, SLOTPACK_FORMAT.magic);

        assert_eq!(config.names.overflow, NameOverflow::KeepEnd);
        assert_eq!(config.names.duplicates, DuplicateNames::Number);
        assert_eq!(config.pack.on_decode_error, OnDecodeError::Abort);
        assert_eq!(config.extract.audio, AudioFileKind::Wav);
    }

    #[test]
    fn test_partial_names_section() {
        let config = SlotpackConfig::parse("[names]\nduplicates = \"reject\"\n").unwrap();
        assert_eq!(config.names.overflow, NameOverflow::KeepStart);
        assert_eq!(config.names.duplicates, DuplicateNames::Reject);
    }

    #[test]
    fn test_invalid_value() {
        assert!(SlotpackConfig::parse("[extract]\naudio = \"mp3\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slotpack.toml");
        std::fs::write(&path, "[pack]\non_decode_error = \"abort\"\n").unwrap();

        let config = SlotpackConfig::load(&path).unwrap();
        assert_eq!(config.pack.on_decode_error, OnDecodeError::Abort);
        assert!(SlotpackConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
