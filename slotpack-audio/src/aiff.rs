//! AIFF / AIFF-C codec
//!
//! AIFF sample data is already big-endian two's complement, so decoding and
//! encoding copy the `SSND` payload as is. AIFF-C `sowt` files are little-endian
//! and get byte-swapped.
//!
//! ```text
//! "FORM" size "AIFF"|"AIFC"
//!   "COMM" 18+: channels i16, frames u32, bits i16, rate f80 [, compression id]
//!   "SSND" 8+:  offset u32, block size u32, sample data
//! ```

use slotpack_container::{AudioCodec, AudioFormatError, DecodedAudio};
use tracing::debug;

use crate::extended::{read_f80, write_f80};

const FORM: &[u8; 4] = b"FORM";
const AIFF: &[u8; 4] = b"AIFF";
const AIFC: &[u8; 4] = b"AIFC";
const COMM: &[u8; 4] = b"COMM";
const SSND: &[u8; 4] = b"SSND";

/// True if `bytes` starts like an AIFF or AIFF-C file
pub fn is_aiff(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == FORM && (&bytes[8..12] == AIFF || &bytes[8..12] == AIFC)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Swapped,
}

#[derive(Debug)]
struct Common {
    channels: u16,
    frames: u32,
    bits: u16,
    rate: u32,
    compression: Compression,
}

fn be16(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

fn be32(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_common(body: &[u8], aifc: bool) -> Result<Common, AudioFormatError> {
    if body.len() < 18 {
        return Err(AudioFormatError::Malformed("COMM chunk too short".into()));
    }
    let mut rate = [0u8; 10];
    rate.copy_from_slice(&body[8..18]);

    let compression = if aifc {
        match body.get(18..22) {
            None | Some(b"NONE") | Some(b"twos") => Compression::None,
            Some(b"sowt") => Compression::Swapped,
            Some(other) => {
                return Err(AudioFormatError::Unsupported(format!(
                    "AIFF-C compression '{}'",
                    String::from_utf8_lossy(other)
                )));
            }
        }
    } else {
        Compression::None
    };

    Ok(Common {
        channels: be16(body, 0),
        frames: be32(body, 2),
        bits: be16(body, 6),
        rate: read_f80(&rate)?,
        compression,
    })
}

/// AIFF reader and writer
#[derive(Debug, Clone, Copy, Default)]
pub struct AiffCodec;

impl AudioCodec for AiffCodec {
    fn extension(&self) -> &'static str {
        "aiff"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio, AudioFormatError> {
        if !is_aiff(bytes) {
            return Err(AudioFormatError::NotRecognized);
        }
        let aifc = &bytes[8..12] == AIFC;

        let mut common = None;
        let mut sound: Option<&[u8]> = None;
        let mut pos = 12;
        while pos + 8 <= bytes.len() {
            let id = &bytes[pos..pos + 4];
            let size = be32(bytes, pos + 4) as usize;
            let start = pos + 8;
            let end = start.checked_add(size).filter(|&end| end <= bytes.len()).ok_or_else(|| {
                AudioFormatError::Malformed(format!(
                    "chunk '{}' runs past the end of the file",
                    String::from_utf8_lossy(id)
                ))
            })?;
            let body = &bytes[start..end];

            match id {
                id if id == COMM => common = Some(read_common(body, aifc)?),
                id if id == SSND => {
                    if body.len() < 8 {
                        return Err(AudioFormatError::Malformed("SSND chunk too short".into()));
                    }
                    let offset = be32(body, 0) as usize;
                    sound = Some(body.get(8 + offset..).unwrap_or(&[]));
                }
                other => debug!("Skipping AIFF chunk '{}'", String::from_utf8_lossy(other)),
            }

            // Chunks are padded to even length
            pos = end + (size & 1);
        }

        let common = common.ok_or_else(|| AudioFormatError::Malformed("missing COMM chunk".into()))?;
        let sound = sound.ok_or_else(|| AudioFormatError::Malformed("missing SSND chunk".into()))?;

        if common.bits == 0 || common.bits > 32 {
            return Err(AudioFormatError::Unsupported(format!("{}-bit samples", common.bits)));
        }
        let channel_count = u8::try_from(common.channels)
            .map_err(|_| AudioFormatError::Unsupported(format!("{} channels", common.channels)))?;
        // Narrower samples are left-justified in whole bytes
        let bytes_per_sample = common.bits.div_ceil(8) as usize;
        let expected = common.frames as usize * common.channels as usize * bytes_per_sample;
        if sound.len() < expected {
            return Err(AudioFormatError::Malformed(format!(
                "SSND holds {} bytes, COMM declares {}",
                sound.len(),
                expected
            )));
        }

        let mut pcm = sound[..expected].to_vec();
        if common.compression == Compression::Swapped {
            for sample in pcm.chunks_exact_mut(bytes_per_sample) {
                sample.reverse();
            }
        }

        let audio = DecodedAudio {
            pcm,
            sample_rate: common.rate,
            bit_depth: (bytes_per_sample * 8) as u8,
            channel_count,
            frame_count: common.frames,
        };
        audio.validate()?;
        Ok(audio)
    }

    fn encode(&self, audio: &DecodedAudio) -> Result<Vec<u8>, AudioFormatError> {
        audio.validate()?;

        let pad = audio.pcm.len() & 1;
        let comm_size = 18u32;
        let ssnd_size = 8 + audio.pcm.len() as u32;
        let form_size = 4 + (8 + comm_size) + (8 + ssnd_size) + pad as u32;

        let mut out = Vec::with_capacity(8 + form_size as usize);
        out.extend_from_slice(FORM);
        out.extend_from_slice(&form_size.to_be_bytes());
        out.extend_from_slice(AIFF);

        out.extend_from_slice(COMM);
        out.extend_from_slice(&comm_size.to_be_bytes());
        out.extend_from_slice(&(audio.channel_count as u16).to_be_bytes());
        out.extend_from_slice(&audio.frame_count.to_be_bytes());
        out.extend_from_slice(&(audio.bit_depth as u16).to_be_bytes());
        out.extend_from_slice(&write_f80(audio.sample_rate));

        out.extend_from_slice(SSND);
        out.extend_from_slice(&ssnd_size.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes()); // offset
        out.extend_from_slice(&0u32.to_be_bytes()); // block size
        out.extend_from_slice(&audio.pcm);
        if pad == 1 {
            out.push(0);
        }
        Ok(out)
    }
}
