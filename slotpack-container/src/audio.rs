//! Decoded audio and the codec adapter seam
//!
//! Payloads travel through the container as raw PCM in one canonical
//! representation: interleaved frames, signed two's complement, big-endian,
//! `bit_depth / 8` bytes per sample. That is byte-for-byte what an AIFF `SSND`
//! chunk holds, so AIFF sources round-trip without touching a single sample.

use crate::error::AudioFormatError;

/// Sample widths the container can describe
pub const SUPPORTED_BIT_DEPTHS: [u8; 4] = [8, 16, 24, 32];

/// Byte length of `frame_count` frames of the given shape.
pub fn payload_len(frame_count: u32, channel_count: u8, bit_depth: u8) -> u64 {
    frame_count as u64 * channel_count as u64 * (bit_depth as u64 / 8)
}

/// Raw PCM plus the metadata needed to rebuild an audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    /// Canonical PCM bytes (see module docs)
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
    pub bit_depth: u8,
    pub channel_count: u8,
    pub frame_count: u32,
}

impl DecodedAudio {
    pub fn bytes_per_sample(&self) -> usize {
        self.bit_depth as usize / 8
    }

    /// PCM length implied by the metadata
    pub fn expected_len(&self) -> u64 {
        payload_len(self.frame_count, self.channel_count, self.bit_depth)
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }

    /// Structural check: the container can describe this audio and the PCM
    /// length agrees with the metadata.
    pub fn validate(&self) -> Result<(), AudioFormatError> {
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bit_depth) {
            return Err(AudioFormatError::Unsupported(format!(
                "bit depth {} (expected 8, 16, 24 or 32)",
                self.bit_depth
            )));
        }
        if !(1..=2).contains(&self.channel_count) {
            return Err(AudioFormatError::Unsupported(format!(
                "{} channels (expected mono or stereo)",
                self.channel_count
            )));
        }
        if self.sample_rate == 0 {
            return Err(AudioFormatError::Malformed("sample rate is zero".into()));
        }
        if self.frame_count == 0 {
            return Err(AudioFormatError::Malformed("no sample frames".into()));
        }
        if self.pcm.len() as u64 != self.expected_len() {
            return Err(AudioFormatError::Malformed(format!(
                "PCM holds {} bytes, metadata implies {}",
                self.pcm.len(),
                self.expected_len()
            )));
        }
        Ok(())
    }
}

/// Audio Codec Adapter: converts between an audio file format and [`DecodedAudio`].
pub trait AudioCodec {
    /// File extension (without dot) used for encoded output
    fn extension(&self) -> &'static str;

    /// Decode a complete audio file held in memory.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio, AudioFormatError>;

    /// Encode PCM and metadata into a complete audio file.
    fn encode(&self, audio: &DecodedAudio) -> Result<Vec<u8>, AudioFormatError>;
}
