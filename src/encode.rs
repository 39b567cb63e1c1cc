//! FSK encoder: coherent two-tone IQ synthesis with preamble, SOF, and
//! trailing silence.
//!
//! Ground truth: `wavingz::encoder<Byte>` in `wavingz.h`.

use crate::encoding::ByteEncoding;
use crate::error::{Error, Result};
use crate::filter::Iir;
use crate::math::TAU;

/// Frequency separation between the two FSK tones, in Hz.
const DFREQ: f64 = 20_000.0;
/// Tone multiplier for a "0" bit.
const F0_MUL: f64 = 0.5;
/// Tone multiplier for a "1" bit.
const F1_MUL: f64 = 2.5;
/// Preamble byte, repeated.
const PREAMBLE_BYTE: u8 = 0x55;
/// Start-of-frame marker byte.
const SOF_BYTE: u8 = 0xF0;
/// Number of preamble bytes sent before SOF.
const PREAMBLE_BYTES: usize = 20;
/// Order of the pulse-shaping low-pass filters.
const LP_ORDER: usize = 6;

/// Coherent FSK encoder. Owns the pulse-shaping filters and a monotonic
/// phase counter so that consecutive bytes stay phase-continuous.
pub struct FskEncoder {
    sample_rate: f64,
    amplitude: f64,
    byte_encoding: ByteEncoding,
    ts: u64,
    lp_i: Iir,
    lp_q: Iir,
    sample: u64,
}

impl FskEncoder {
    /// Construct an encoder for `sample_rate`/`baud_rate` (Hz), emitting
    /// samples scaled by `amplitude` and quantized per `byte_encoding`.
    ///
    /// Fails with `Error::Configuration` if the two tones are not
    /// phase-coherent over one symbol period at this sample/baud rate.
    pub fn new(
        sample_rate: f64,
        baud_rate: f64,
        amplitude: f64,
        byte_encoding: ByteEncoding,
    ) -> Result<Self> {
        let ts_f = sample_rate / baud_rate;
        let ts = ts_f as u64;

        let phase = |mul: f64| (TAU * DFREQ * mul * ts_f / sample_rate).sin();
        if (phase(F0_MUL) - phase(F1_MUL)).abs() > 1e-12 {
            return Err(Error::Configuration(
                "sample_rate and baud_rate must be chosen so the two FSK tones stay phase-coherent over one symbol".into(),
            ));
        }

        let cutoff = F1_MUL * DFREQ * 2.5;
        let lp_i = Iir::lowpass(LP_ORDER, sample_rate, cutoff)?;
        let lp_q = Iir::lowpass(LP_ORDER, sample_rate, cutoff)?;

        Ok(FskEncoder {
            sample_rate,
            amplitude,
            byte_encoding,
            ts,
            lp_i,
            lp_q,
            sample: 0,
        })
    }

    /// Emit `Ts` zero-IQ samples through both pulse-shaping filters, used
    /// to seed filter state during the leading and trailing silence.
    fn silence_sample(&mut self) -> Result<(u8, u8)> {
        let i = self.lp_i.feed(0.0);
        let q = self.lp_q.feed(0.0);
        Ok((
            self.byte_encoding.encode_sample(i, self.amplitude)?,
            self.byte_encoding.encode_sample(q, self.amplitude)?,
        ))
    }

    /// Emit the `Ts` IQ sample pairs for one bit (most-significant bit of
    /// `data << index` convention matches the byte-level call site).
    fn bit_samples(&mut self, bit: bool, out: &mut Vec<(u8, u8)>) -> Result<()> {
        let f_shift = (if bit { F1_MUL } else { F0_MUL }) * DFREQ;
        for _ in 0..self.ts {
            let phase = TAU * f_shift * self.sample as f64 / self.sample_rate;
            let i = self.lp_i.feed(phase.sin());
            let q = self.lp_q.feed(phase.cos());
            out.push((
                self.byte_encoding.encode_sample(i, self.amplitude)?,
                self.byte_encoding.encode_sample(q, self.amplitude)?,
            ));
            self.sample += 1;
        }
        Ok(())
    }

    /// Emit the IQ samples for one byte, most-significant bit first.
    fn byte_samples(&mut self, byte: u8, out: &mut Vec<(u8, u8)>) -> Result<()> {
        for i in (0..8).rev() {
            let bit = (byte >> i) & 1 != 0;
            self.bit_samples(bit, out)?;
        }
        Ok(())
    }

    /// Synthesize the full on-air IQ byte sequence for `payload`: 1 ms of
    /// silence to seed filter state, 20 preamble bytes, one SOF byte, the
    /// payload, then `silence_seconds` of trailing silence.
    pub fn encode(&mut self, payload: &[u8], silence_seconds: f64) -> Result<Vec<(u8, u8)>> {
        let mut iq = Vec::new();

        let lead_in_samples = (self.sample_rate / 1000.0) as usize;
        for _ in 0..lead_in_samples {
            iq.push(self.silence_sample()?);
        }

        for _ in 0..PREAMBLE_BYTES {
            self.byte_samples(PREAMBLE_BYTE, &mut iq)?;
        }
        self.byte_samples(SOF_BYTE, &mut iq)?;

        for &byte in payload {
            self.byte_samples(byte, &mut iq)?;
        }

        let trailing_samples = (silence_seconds * self.sample_rate) as usize;
        for _ in 0..trailing_samples {
            iq.push(self.silence_sample()?);
        }

        Ok(iq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_incoherent_sample_baud_combination() {
        // 40 kbaud at 2_000_001 Hz is incoherent under floating-point
        // rounding; the canonical 2_000_000 Hz / 40_000 baud combination
        // must succeed.
        assert!(FskEncoder::new(2_000_001.0, 40_000.0, 100.0, ByteEncoding::Signed8).is_err());
        assert!(FskEncoder::new(2_000_000.0, 40_000.0, 100.0, ByteEncoding::Signed8).is_ok());
    }

    #[test]
    fn encode_produces_expected_sample_count() {
        let mut enc = FskEncoder::new(2_000_000.0, 40_000.0, 100.0, ByteEncoding::Signed8).unwrap();
        let payload = [0xAAu8];
        let iq = enc.encode(&payload, 0.0).unwrap();
        let lead_in = 2_000_000 / 1000;
        let ts = 2_000_000 / 40_000;
        let expected = lead_in + (PREAMBLE_BYTES + 1 + payload.len()) * 8 * ts as usize;
        assert_eq!(iq.len(), expected);
    }

    #[test]
    fn low_amplitude_never_overflows() {
        let mut enc = FskEncoder::new(2_000_000.0, 40_000.0, 5.0, ByteEncoding::Signed8).unwrap();
        assert!(enc.encode(&[0xD2, 0xD6, 0x33, 0x22], 0.01).is_ok());
    }

    #[test]
    fn excessive_amplitude_overflows() {
        let mut enc = FskEncoder::new(2_000_000.0, 40_000.0, 200.0, ByteEncoding::Signed8).unwrap();
        assert!(enc.encode(&[0xFF; 4], 0.0).is_err());
    }
}
