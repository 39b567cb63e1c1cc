//! Two-tier demodulator: filters + FM discriminator feed the sample-rate
//! state machine, which feeds the symbol-rate state machine, which
//! delivers complete frames to the caller's callback.
//!
//! Ground truth: `wavingz::demod::demod_nrz` (wavingz.h/.cpp).

pub mod sample_sm;
pub mod symbol_sm;

use crate::error::Result;
use crate::filter::{Discriminator, Iir};
use num_complex::Complex64;
use sample_sm::SampleMachine;
use symbol_sm::SymbolMachine;

/// Loss-of-signal / signal-present threshold on the 750 Hz low-pass of the
/// discriminator output.
const LOCK_THRESHOLD: f64 = 0.01;
/// Carrier-offset tracker decay during Preamble sync (`0.95` old, `0.05`
/// new); also load-bearing.
const OMEGA_TRACK_OLD: f64 = 0.95;
const OMEGA_TRACK_NEW: f64 = 0.05;

/// The full decode pipeline for one IQ stream: two input low-pass
/// filters, an FM discriminator, a symbol-shaping filter, a lock-detect
/// filter, and the sample/symbol state machine pair.
pub struct Demodulator<F: FnMut(&[u8])> {
    lp_i: Iir,
    lp_q: Iir,
    freq_filter: Iir,
    lock_filter: Iir,
    discriminator: Discriminator,
    sample_sm: SampleMachine,
    symbol_sm: SymbolMachine<F>,
    omega_c: f64,
}

impl<F: FnMut(&[u8])> Demodulator<F> {
    /// Construct a demodulator for `sample_rate` (Hz), delivering complete
    /// frames (as accumulated between SOF and loss-of-signal) to
    /// `on_frame`.
    pub fn new(sample_rate: f64, on_frame: F) -> Result<Self> {
        Ok(Demodulator {
            lp_i: Iir::lowpass(6, sample_rate, 150_000.0)?,
            lp_q: Iir::lowpass(6, sample_rate, 150_000.0)?,
            freq_filter: Iir::lowpass(3, sample_rate, 50_000.0)?,
            lock_filter: Iir::lowpass(3, sample_rate, 750.0)?,
            discriminator: Discriminator::new(),
            sample_sm: SampleMachine::new(),
            symbol_sm: SymbolMachine::new(on_frame),
            omega_c: 0.0,
        })
    }

    /// Push one complex baseband IQ sample through the pipeline. Never
    /// fails: on any anomaly (loss of lock) the pipeline emits `None`
    /// through its state machines, flushing any in-flight frame.
    pub fn push_sample(&mut self, iq: Complex64) {
        let iq = Complex64::new(self.lp_i.feed(iq.re), self.lp_q.feed(iq.im));
        let f = self.discriminator.feed(iq);
        let s = self.freq_filter.feed(f);
        let lock_freq = self.lock_filter.feed(f);

        let signal = lock_freq.abs() > LOCK_THRESHOLD;
        let sample = if signal {
            if self.sample_sm.is_idle() {
                self.omega_c = lock_freq;
            }
            let bit = (s - self.omega_c) < 0.0;
            if self.sample_sm.in_preamble() {
                self.omega_c = OMEGA_TRACK_OLD * self.omega_c + OMEGA_TRACK_NEW * lock_freq;
            }
            Some(bit)
        } else {
            None
        };

        self.sample_sm.process(sample, &mut self.symbol_sm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::FskEncoder;
    use crate::encoding::ByteEncoding;
    use crate::frame::checksum;
    use crate::math::AttoRand;

    fn payload_with_checksum() -> Vec<u8> {
        let payload = vec![0xD2u8, 0xD6, 0x33, 0x22, 0xAA, 0x55, 0x0D, 0xFF, 0x00, 0xFF, 0x00, 0x9F];
        let fcs = checksum(&payload);
        let mut frame = payload;
        frame.push(fcs);
        frame
    }

    fn encode_frame(amplitude: f64, encode_rate: f64, baud_rate: f64) -> Vec<(u8, u8)> {
        let mut enc = FskEncoder::new(encode_rate, baud_rate, amplitude, ByteEncoding::Signed8).unwrap();
        enc.encode(&payload_with_checksum(), 0.05).unwrap()
    }

    fn decode(decode_rate: f64, iq: &[(u8, u8)], noise_sigma: Option<f64>) -> Vec<Vec<u8>> {
        let received = std::cell::RefCell::new(Vec::new());
        let mut demod = Demodulator::new(decode_rate, |buf: &[u8]| received.borrow_mut().push(buf.to_vec())).unwrap();
        let mut rng = AttoRand::new(42);
        let enc = ByteEncoding::Signed8;
        for &(i, q) in iq {
            let mut re = enc.to_f64(i);
            let mut im = enc.to_f64(q);
            if let Some(sigma) = noise_sigma {
                re = sigma * rng.get_gaussian() + 0.9 * re;
                im = sigma * rng.get_gaussian() + 0.9 * im;
            }
            demod.push_sample(Complex64::new(re, im));
        }
        received.into_inner()
    }

    #[test]
    fn round_trip_clean() {
        let frame = payload_with_checksum();
        let iq = encode_frame(100.0, 2_000_000.0, 40_000.0);
        let received = decode(2_048_000.0, &iq, None);
        assert!(!received.is_empty());
        let delivered = &received[0];
        let n = delivered[6] as usize;
        assert!(delivered.len() >= n);
        assert_eq!(&delivered[..n], &frame[..n.min(frame.len())]);
    }

    #[test]
    fn round_trip_low_power() {
        let frame = payload_with_checksum();
        let iq = encode_frame(5.0, 2_000_000.0, 40_000.0);
        let received = decode(2_048_000.0, &iq, None);
        assert!(!received.is_empty());
        let delivered = &received[0];
        let n = delivered[6] as usize;
        assert_eq!(&delivered[..n], &frame[..n.min(frame.len())]);
    }

    #[test]
    fn round_trip_noisy() {
        let frame = payload_with_checksum();
        let iq = encode_frame(100.0, 2_000_000.0, 40_000.0);
        let received = decode(2_048_000.0, &iq, Some(0.1));
        assert!(!received.is_empty());
        let delivered = &received[0];
        let n = delivered[6] as usize;
        assert_eq!(&delivered[..n], &frame[..n.min(frame.len())]);
    }

    #[test]
    fn missing_preamble_produces_no_callback() {
        let received = std::cell::RefCell::new(Vec::new());
        let mut demod = Demodulator::new(2_048_000.0, |buf: &[u8]| received.borrow_mut().push(buf.to_vec())).unwrap();
        for _ in 0..1000 {
            demod.push_sample(Complex64::new(0.0, 0.0));
        }
        assert!(received.borrow().is_empty());
    }
}
