//! Slot names and output file names
//!
//! A slot name is the source file stem squeezed into the 16-byte descriptor field.
//! An output file name is a slot name made safe for a filesystem, unique within
//! one extraction run.

use std::path::Path;

use hashbrown::{HashMap, HashSet};
use serde::Deserialize;

use crate::error::PackError;
use crate::formats::NAME_WIDTH;

/// Which part of an over-long name survives truncation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameOverflow {
    #[default]
    KeepStart,
    KeepEnd,
}

/// What to do when two slots end up with the same name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateNames {
    /// Slots are addressed by index, so equal names are harmless
    #[default]
    Allow,
    Reject,
    /// Replace the tail of later duplicates with `~<slot>`
    Number,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamePolicy {
    pub overflow: NameOverflow,
    pub duplicates: DuplicateNames,
}

/// Derive a slot name from a source identifier.
///
/// Uses the file stem, replaces anything outside printable ASCII with `_` and
/// truncates to [`NAME_WIDTH`] bytes. Falls back to the zero-padded slot index.
pub fn slot_name(source: &str, slot: usize, overflow: NameOverflow) -> String {
    let stem = Path::new(source)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cleaned: Vec<u8> = stem
        .chars()
        .map(|c| if (' '..='~').contains(&c) { c as u8 } else { b'_' })
        .collect();

    let trimmed = match overflow {
        NameOverflow::KeepStart => &cleaned[..cleaned.len().min(NAME_WIDTH)],
        NameOverflow::KeepEnd => &cleaned[cleaned.len().saturating_sub(NAME_WIDTH)..],
    };

    let name = String::from_utf8_lossy(trimmed).trim().to_string();
    if name.is_empty() {
        format!("{slot:03}")
    } else {
        name
    }
}

/// Assigns slot names during one pack, applying the duplicate policy
#[derive(Debug, Default)]
pub struct NameAllocator {
    policy: NamePolicy,
    seen: HashMap<String, usize>,
}

impl NameAllocator {
    pub fn new(policy: NamePolicy) -> Self {
        Self {
            policy,
            seen: HashMap::new(),
        }
    }

    pub fn assign(&mut self, source: &str, slot: usize) -> Result<String, PackError> {
        let mut name = slot_name(source, slot, self.policy.overflow);

        if let Some(&first) = self.seen.get(&name) {
            match self.policy.duplicates {
                DuplicateNames::Allow => {}
                DuplicateNames::Reject => {
                    return Err(PackError::DuplicateName {
                        name,
                        first,
                        second: slot,
                    });
                }
                DuplicateNames::Number => name = self.numbered(&name, slot),
            }
        }

        self.seen.entry(name.clone()).or_insert(slot);
        Ok(name)
    }

    /// First `<name>~<slot>` (then `~<slot>-<n>`) not yet taken
    fn numbered(&self, name: &str, slot: usize) -> String {
        let mut attempt = 0usize;
        loop {
            let suffix = match attempt {
                0 => format!("~{slot}"),
                n => format!("~{slot}-{n}"),
            };
            let keep = NAME_WIDTH.saturating_sub(suffix.len()).min(name.len());
            let candidate = format!("{}{}", &name[..keep], suffix);
            if !self.seen.contains_key(&candidate) {
                return candidate;
            }
            attempt += 1;
        }
    }
}

/// Build a unique, filesystem-safe output file name for one extracted slot.
///
/// Characters that are unsafe in paths become `_`. On a case-insensitive
/// collision with an earlier name, `_<slot>` is appended to the stem, then
/// `_<slot>_<n>` until the name is free.
pub fn output_file_name(name: &str, slot: usize, extension: &str, used: &mut HashSet<String>) -> String {
    let mut stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    stem = stem.trim().trim_start_matches('.').to_string();
    if stem.is_empty() {
        stem = format!("{slot:03}");
    }

    let mut file_name = format!("{stem}.{extension}");
    let mut attempt = 0usize;
    while !used.insert(file_name.to_lowercase()) {
        file_name = match attempt {
            0 => format!("{stem}_{slot:03}.{extension}"),
            n => format!("{stem}_{slot:03}_{n}.{extension}"),
        };
        attempt += 1;
    }
    file_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_name_uses_stem() {
        assert_eq!(slot_name("drums/kick.aiff", 0, NameOverflow::KeepStart), "kick");
        assert_eq!(slot_name("snare", 1, NameOverflow::KeepStart), "snare");
    }

    #[test]
    fn test_slot_name_truncation() {
        let source = "samples/an-extremely-long-name.wav";
        assert_eq!(slot_name(source, 0, NameOverflow::KeepStart), "an-extremely-lon");
        assert_eq!(slot_name(source, 0, NameOverflow::KeepEnd), "remely-long-name");
    }

    #[test]
    fn test_slot_name_replaces_non_printable() {
        assert_eq!(slot_name("caf\u{e9}.aif", 0, NameOverflow::KeepStart), "caf_");
        assert_eq!(slot_name("tab\there.aif", 0, NameOverflow::KeepStart), "tab_here");
    }

    #[test]
    fn test_slot_name_fallback() {
        assert_eq!(slot_name("", 7, NameOverflow::KeepStart), "007");
        assert_eq!(slot_name("dir/   .aif", 12, NameOverflow::KeepStart), "012");
    }

    #[test]
    fn test_allocator_allows_duplicates_by_default() {
        let mut names = NameAllocator::default();
        assert_eq!(names.assign("a/loop.aif", 0).unwrap(), "loop");
        assert_eq!(names.assign("b/loop.aif", 1).unwrap(), "loop");
    }

    #[test]
    fn test_allocator_rejects_duplicates() {
        let mut names = NameAllocator::new(NamePolicy {
            duplicates: DuplicateNames::Reject,
            ..Default::default()
        });
        names.assign("a/loop.aif", 0).unwrap();
        let err = names.assign("b/loop.aif", 3).unwrap_err();
        assert!(matches!(
            err,
            PackError::DuplicateName { first: 0, second: 3, .. }
        ));
    }

    #[test]
    fn test_allocator_numbers_duplicates() {
        let mut names = NameAllocator::new(NamePolicy {
            duplicates: DuplicateNames::Number,
            ..Default::default()
        });
        assert_eq!(names.assign("loop.aif", 0).unwrap(), "loop");
        assert_eq!(names.assign("x/loop.aif", 11).unwrap(), "loop~11");

        names.assign("sixteen-chars-xx.aif", 2).unwrap();
        let numbered = names.assign("y/sixteen-chars-xx.aif", 300).unwrap();
        assert_eq!(numbered, "sixteen-char~300");
        assert!(numbered.len() <= NAME_WIDTH);
    }

    #[test]
    fn test_numbered_name_skips_taken_names() {
        let mut names = NameAllocator::new(NamePolicy {
            duplicates: DuplicateNames::Number,
            ..Default::default()
        });
        assert_eq!(names.assign("loop.aif", 0).unwrap(), "loop");
        assert_eq!(names.assign("loop~2.aif", 1).unwrap(), "loop~2");
        assert_eq!(names.assign("x/loop.aif", 2).unwrap(), "loop~2-1");
    }

    #[test]
    fn test_output_file_name_sanitizes() {
        let mut used = HashSet::new();
        assert_eq!(output_file_name("a/b:c", 0, "aiff", &mut used), "a_b_c.aiff");
        assert_eq!(output_file_name("..", 4, "aiff", &mut used), "004.aiff");
    }

    #[test]
    fn test_output_file_name_dedupes_case_insensitively() {
        let mut used = HashSet::new();
        assert_eq!(output_file_name("Kick", 0, "wav", &mut used), "Kick.wav");
        assert_eq!(output_file_name("kick", 5, "wav", &mut used), "kick_005.wav");
        assert_eq!(output_file_name("snare", 6, "wav", &mut used), "snare.wav");
    }

    #[test]
    fn test_output_file_name_skips_taken_fallback() {
        let mut used = HashSet::new();
        assert_eq!(output_file_name("kick", 0, "pcm", &mut used), "kick.pcm");
        assert_eq!(output_file_name("kick_002", 1, "pcm", &mut used), "kick_002.pcm");
        assert_eq!(output_file_name("kick", 2, "pcm", &mut used), "kick_002_1.pcm");
        assert_eq!(used.len(), 3);
    }
}
