//! Destinations for extracted sample files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Receives one encoded audio file per recovered slot
pub trait SampleSink {
    fn write_sample(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Writes files into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the directory (and parents) if missing
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SampleSink for DirectorySink {
    fn write_sample(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.dir.join(file_name), bytes)
    }
}

/// Collects files in memory, in write order
impl SampleSink for Vec<(String, Vec<u8>)> {
    fn write_sample(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()> {
        self.push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
