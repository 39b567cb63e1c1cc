//! Streaming direct-form IIR evaluator.
//!
//! Grounded in the original `iir_filter<ORDER>` (dsp.h): front-push ring
//! buffers of input/output history, one inner product per channel per
//! sample. `fundsp::biquad::Biquad` is the same shape specialized to
//! order 2; this is its runtime-order generalization.

use super::butter::FilterCoeffs;
use crate::error::{Error, Result};
use std::collections::VecDeque;

/// A streaming IIR filter evaluator for an order-`N` direct-form filter.
///
/// Owns its coefficients and its input/output history ring buffers.
/// `feed` consumes one input sample and produces one output sample.
#[derive(Clone, Debug)]
pub struct Iir {
    gain: f64,
    b: Vec<f64>,
    a: Vec<f64>,
    x_history: VecDeque<f64>,
    y_history: VecDeque<f64>,
}

impl Iir {
    /// Construct an evaluator from designed coefficients.
    ///
    /// Returns `Error::Configuration` if `a[0] != 1.0` or if `b` is not
    /// palindromic — the same runtime checks `iir_filter`'s constructor
    /// performs via `assert`, made non-fatal for library callers.
    pub fn new(coeffs: FilterCoeffs) -> Result<Self> {
        let FilterCoeffs { gain, b, a } = coeffs;
        if a.first() != Some(&1.0) {
            return Err(Error::Configuration("a[0] must equal 1.0".into()));
        }
        let n = b.len();
        for i in 0..n / 2 {
            if (b[i] - b[n - i - 1]).abs() > 1e-9 {
                return Err(Error::Configuration("b coefficients must be palindromic".into()));
            }
        }
        let order = n - 1;
        Ok(Iir {
            gain,
            b,
            a,
            x_history: VecDeque::from(vec![0.0; order + 1]),
            y_history: VecDeque::from(vec![0.0; order + 1]),
        })
    }

    /// Convenience constructor: design and build in one step.
    pub fn lowpass(order: usize, sample_rate: f64, cutoff: f64) -> Result<Self> {
        Iir::new(super::butter::design(order, sample_rate, cutoff)?)
    }

    /// Feed one input sample, return the filtered output sample.
    #[inline]
    pub fn feed(&mut self, x: f64) -> f64 {
        self.x_history.push_front(x);
        self.x_history.pop_back();

        let forward: f64 = self
            .x_history
            .iter()
            .zip(self.b.iter())
            .map(|(xi, bi)| xi * bi)
            .sum();
        let feedback: f64 = self
            .y_history
            .iter()
            .zip(self.a.iter().skip(1))
            .map(|(yi, ai)| yi * ai)
            .sum();
        let y = self.gain * forward - feedback;

        self.y_history.push_front(y);
        self.y_history.pop_back();
        y
    }

    /// Resets all history to zero, preserving the designed coefficients.
    pub fn reset(&mut self) {
        for v in self.x_history.iter_mut() {
            *v = 0.0;
        }
        for v in self.y_history.iter_mut() {
            *v = 0.0;
        }
    }
}
