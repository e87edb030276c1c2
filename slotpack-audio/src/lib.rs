//! Audio file codecs for slotpack
//!
//! Implements the [`AudioCodec`] seam of `slotpack-container` for the sample file
//! formats samplers and DAWs exchange:
//!
//! - [`AiffCodec`] - AIFF and uncompressed AIFF-C (`NONE`, `twos`, `sowt`)
//! - [`WavCodec`] - integer PCM WAV through `hound`
//! - [`AutoCodec`] - sniffs the input format, encodes to a chosen one
//!
//! Codecs never resample or requantize. Only byte order and signedness change
//! on the way into the container's canonical PCM.

pub mod aiff;
pub mod extended;
pub mod wav;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use slotpack_container::{AudioCodec, AudioFormatError, DecodedAudio};

pub use aiff::AiffCodec;
pub use wav::WavCodec;

/// Supported audio file formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFileKind {
    #[default]
    Aiff,
    Wav,
}

impl AudioFileKind {
    /// Identify a file by its magic bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if aiff::is_aiff(bytes) {
            Some(Self::Aiff)
        } else if wav::is_wav(bytes) {
            Some(Self::Wav)
        } else {
            None
        }
    }

    pub fn codec(self) -> &'static dyn AudioCodec {
        match self {
            Self::Aiff => &AiffCodec,
            Self::Wav => &WavCodec,
        }
    }
}

impl fmt::Display for AudioFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Aiff => "aiff",
            Self::Wav => "wav",
        })
    }
}

impl FromStr for AudioFileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aiff" | "aif" | "aifc" => Ok(Self::Aiff),
            "wav" | "wave" => Ok(Self::Wav),
            other => Err(format!("unknown audio format '{other}' (expected aiff or wav)")),
        }
    }
}

/// Decodes whatever it recognises; encodes to `output`
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoCodec {
    pub output: AudioFileKind,
}

impl AutoCodec {
    pub fn new(output: AudioFileKind) -> Self {
        Self { output }
    }
}

impl AudioCodec for AutoCodec {
    fn extension(&self) -> &'static str {
        self.output.codec().extension()
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio, AudioFormatError> {
        AudioFileKind::detect(bytes)
            .ok_or(AudioFormatError::NotRecognized)?
            .codec()
            .decode(bytes)
    }

    fn encode(&self, audio: &DecodedAudio) -> Result<Vec<u8>, AudioFormatError> {
        self.output.codec().encode(audio)
    }
}
