//! Positioned reads over files, block devices and memory

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Random-access input for extraction
pub trait ByteSource {
    /// Total length, if the source can tell.
    fn available_len(&self) -> Option<u64>;

    /// Fill as much of `buf` as possible from `offset`. Returns the number of
    /// bytes read; fewer than `buf.len()` means the input ended.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
}

/// In-memory container
pub struct SliceSource<'a> {
    bytes: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl ByteSource for SliceSource<'_> {
    fn available_len(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = usize::try_from(offset)
            .unwrap_or(usize::MAX)
            .min(self.bytes.len());
        let n = buf.len().min(self.bytes.len() - start);
        buf[..n].copy_from_slice(&self.bytes[start..start + n]);
        Ok(n)
    }
}

/// Any seekable reader, with a length that may be unknown
pub struct SeekSource<R> {
    inner: R,
    len: Option<u64>,
}

impl<R: Read + Seek> SeekSource<R> {
    pub fn new(inner: R, len: Option<u64>) -> Self {
        Self { inner, len }
    }
}

impl<R: Read + Seek> ByteSource for SeekSource<R> {
    fn available_len(&self) -> Option<u64> {
        self.len
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.seek(SeekFrom::Start(offset))?;
        read_at_most(&mut self.inner, buf)
    }
}

/// A container file or a raw device node
pub type FileSource = SeekSource<File>;

impl FileSource {
    /// Open a regular file or a block device.
    ///
    /// Regular files report their metadata length. Devices report a zero length
    /// there, so their size is probed by seeking to the end; zero again means
    /// unknown.
    pub fn open(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let metadata = file.metadata()?;
        let len = if metadata.is_file() {
            Some(metadata.len())
        } else {
            let end = file.seek(SeekFrom::End(0)).unwrap_or(0);
            file.seek(SeekFrom::Start(0))?;
            (end > 0).then_some(end)
        };
        Ok(Self::new(file, len))
    }
}

/// Read until `buf` is full or the reader is exhausted.
pub fn read_at_most<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
