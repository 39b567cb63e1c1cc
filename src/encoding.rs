//! 8-bit IQ byte quantization, matching `wavingz.h`'s `complex8_convert`
//! and `wave-in.cpp`'s inverse conversion.

use crate::error::{Error, Result};

/// Signed8 (HackRF One `cs8`, amplitude in `[-127, 127]`, center 0) or
/// Unsigned8 (RTL-SDR `cu8`, amplitude in `[0, 255]`, center 127).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteEncoding {
    Signed8,
    Unsigned8,
}

impl ByteEncoding {
    /// Quantize a baseband sample `x` at amplitude `amplitude` to a wire
    /// byte. Fails with `Error::Overflow` if `|x * amplitude| > 127`.
    pub fn encode_sample(self, x: f64, amplitude: f64) -> Result<u8> {
        let scaled = x * amplitude;
        if scaled.abs() > 127.0 {
            return Err(Error::Overflow {
                sample: x,
                amplitude,
            });
        }
        let rounded = scaled.round();
        let byte = match self {
            ByteEncoding::Signed8 => rounded,
            ByteEncoding::Unsigned8 => rounded + 127.0,
        };
        Ok(byte as i64 as u8)
    }

    /// Recover the real-valued baseband sample (in `[-1, 1]`) represented
    /// by wire byte `byte`.
    pub fn to_f64(self, byte: u8) -> f64 {
        match self {
            ByteEncoding::Signed8 => (byte as i8) as f64 / 127.0,
            ByteEncoding::Unsigned8 => byte as f64 / 127.0 - 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_round_trip() {
        let enc = ByteEncoding::Signed8;
        let byte = enc.encode_sample(0.5, 100.0).unwrap();
        assert_eq!(byte as i8, 50);
        assert!((enc.to_f64(byte) - 50.0 / 127.0).abs() < 1e-9);
    }

    #[test]
    fn unsigned_round_trip() {
        let enc = ByteEncoding::Unsigned8;
        let byte = enc.encode_sample(0.0, 100.0).unwrap();
        assert_eq!(byte, 127);
        assert!((enc.to_f64(byte) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn overflow_is_reported() {
        let enc = ByteEncoding::Signed8;
        assert!(enc.encode_sample(2.0, 100.0).is_err());
    }
}
