//! WAV codec (integer PCM via `hound`)
//!
//! WAV stores little-endian samples (unsigned at 8 bits); `hound` hands them out
//! as signed integers, which are then written in the canonical big-endian form.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use slotpack_container::{AudioCodec, AudioFormatError, DecodedAudio};

/// True if `bytes` starts like a RIFF/WAVE file
pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

fn wav_error(err: hound::Error) -> AudioFormatError {
    match err {
        hound::Error::Unsupported => AudioFormatError::Unsupported("WAV encoding".into()),
        hound::Error::TooWide => AudioFormatError::Unsupported("sample too wide".into()),
        other => AudioFormatError::Malformed(other.to_string()),
    }
}

/// Sign-extend one canonical big-endian sample
fn sample_from_be(bytes: &[u8]) -> i32 {
    let mut value = 0i32;
    for &b in bytes {
        value = (value << 8) | b as i32;
    }
    let unused = 32 - 8 * bytes.len() as u32;
    (value << unused) >> unused
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

impl AudioCodec for WavCodec {
    fn extension(&self) -> &'static str {
        "wav"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio, AudioFormatError> {
        if !is_wav(bytes) {
            return Err(AudioFormatError::NotRecognized);
        }
        let mut reader = WavReader::new(Cursor::new(bytes)).map_err(wav_error)?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int {
            return Err(AudioFormatError::Unsupported("floating point WAV".into()));
        }
        if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
            return Err(AudioFormatError::Unsupported(format!(
                "{}-bit WAV",
                spec.bits_per_sample
            )));
        }
        let channel_count = u8::try_from(spec.channels)
            .map_err(|_| AudioFormatError::Unsupported(format!("{} channels", spec.channels)))?;

        let samples = reader
            .samples::<i32>()
            .collect::<Result<Vec<i32>, _>>()
            .map_err(wav_error)?;

        let width = spec.bits_per_sample as usize / 8;
        let mut pcm = Vec::with_capacity(samples.len() * width);
        for sample in &samples {
            pcm.extend_from_slice(&sample.to_be_bytes()[4 - width..]);
        }

        let audio = DecodedAudio {
            pcm,
            sample_rate: spec.sample_rate,
            bit_depth: spec.bits_per_sample as u8,
            channel_count,
            frame_count: (samples.len() / spec.channels.max(1) as usize) as u32,
        };
        audio.validate()?;
        Ok(audio)
    }

    fn encode(&self, audio: &DecodedAudio) -> Result<Vec<u8>, AudioFormatError> {
        audio.validate()?;

        let spec = WavSpec {
            channels: audio.channel_count as u16,
            sample_rate: audio.sample_rate,
            bits_per_sample: audio.bit_depth as u16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
            for sample in audio.pcm.chunks_exact(audio.bytes_per_sample()) {
                writer
                    .write_sample(sample_from_be(sample))
                    .map_err(wav_error)?;
            }
            writer.finalize().map_err(wav_error)?;
        }
        Ok(cursor.into_inner())
    }
}
