//! IEEE 754 80-bit extended precision, as AIFF stores sample rates
//!
//! Layout: sign (1 bit) | biased exponent (15 bits) | significand (64 bits, explicit
//! integer bit). For normal numbers the value is
//! `significand × 2^(exponent − 16383 − 63)`.

use slotpack_container::AudioFormatError;

const BIAS: i32 = 16383;

/// Decode an extended float holding a sample rate, rounded to the nearest Hz.
pub fn read_f80(bytes: &[u8; 10]) -> Result<u32, AudioFormatError> {
    let sign_exp = u16::from_be_bytes([bytes[0], bytes[1]]);
    let mut significand_bytes = [0u8; 8];
    significand_bytes.copy_from_slice(&bytes[2..10]);
    let significand = u64::from_be_bytes(significand_bytes);

    let negative = sign_exp & 0x8000 != 0;
    let exponent = (sign_exp & 0x7FFF) as i32;

    // Zero and denormals
    if exponent == 0 || significand == 0 {
        return Ok(0);
    }
    if exponent == 0x7FFF {
        return Err(AudioFormatError::Malformed(
            "sample rate is infinity or NaN".into(),
        ));
    }
    if negative {
        return Err(AudioFormatError::Malformed("sample rate is negative".into()));
    }

    let shift = exponent - BIAS - 63;
    if shift >= 0 {
        return Err(AudioFormatError::Unsupported("sample rate out of range".into()));
    }

    let right = (-shift) as u32;
    let value = if right > 64 {
        0
    } else {
        // Round half up; u128 keeps the addition from overflowing
        ((significand as u128 + (1u128 << (right - 1))) >> right) as u64
    };
    u32::try_from(value).map_err(|_| AudioFormatError::Unsupported(format!("sample rate {value} Hz")))
}

/// Encode an integer sample rate exactly.
pub fn write_f80(rate: u32) -> [u8; 10] {
    let mut bytes = [0u8; 10];
    if rate == 0 {
        return bytes;
    }

    let top_bit = 31 - rate.leading_zeros();
    let exponent = (BIAS as u32 + top_bit) as u16;
    let significand = (rate as u64) << (63 - top_bit);

    bytes[0..2].copy_from_slice(&exponent.to_be_bytes());
    bytes[2..10].copy_from_slice(&significand.to_be_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encodings() {
        // 44100 Hz as written by every AIFF encoder
        assert_eq!(
            write_f80(44100),
            [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            write_f80(22050),
            [0x40, 0x0D, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(write_f80(1), [0x3F, 0xFF, 0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_common_rates_roundtrip() {
        for rate in [1, 8000, 11025, 22050, 32000, 44100, 48000, 96000, 192000, u32::MAX] {
            assert_eq!(read_f80(&write_f80(rate)).unwrap(), rate);
        }
    }

    #[test]
    fn test_zero() {
        assert_eq!(write_f80(0), [0; 10]);
        assert_eq!(read_f80(&[0; 10]).unwrap(), 0);
    }

    #[test]
    fn test_fractional_rate_rounds() {
        // 22254.5454... (classic Macintosh rate)
        let bytes = [0x40, 0x0D, 0xAD, 0xDD, 0x17, 0x45, 0xD1, 0x74, 0x5D, 0x17];
        assert_eq!(read_f80(&bytes).unwrap(), 22255);
    }

    #[test]
    fn test_rejects_special_values() {
        let mut nan = [0u8; 10];
        nan[0] = 0x7F;
        nan[1] = 0xFF;
        nan[2] = 0xC0;
        assert!(read_f80(&nan).is_err());

        let mut negative = write_f80(44100);
        negative[0] |= 0x80;
        assert!(read_f80(&negative).is_err());
    }
}
