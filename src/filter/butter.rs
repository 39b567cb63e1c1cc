//! Butterworth low-pass filter design.
//!
//! Ground truth: Octave's `butter(N, fcf)`, by way of the Exstrom
//! Laboratories `acof_bwlp`/`ccof_bwlp`/`sf_bwlp` routines this module
//! reimplements at runtime-generic order (the original is a C++ template
//! over a compile-time `ORDER`; a heap-backed runtime order is the more
//! idiomatic Rust shape for a filter whose order is chosen at call time).

use crate::error::{Error, Result};
use crate::math::PI;
use num_complex::Complex64;

/// Coefficients of an order-`N` digital filter: `gain`, numerator `b`, and
/// denominator `a`, each of length `N + 1`. Invariants: `a[0] == 1.0`, and
/// `b` is palindromic (`b[i] == b[N - i]`).
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCoeffs {
    pub gain: f64,
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl FilterCoeffs {
    /// Order of the filter (`b.len() - 1`).
    pub fn order(&self) -> usize {
        self.b.len() - 1
    }
}

/// Design a Butterworth low-pass filter of the given `order` for `sample_rate`
/// (Hz) and `-3 dB` `cutoff` frequency (Hz).
///
/// Returns `Error::Configuration` if `cutoff` does not lie in
/// `(0, sample_rate / 2)`, or if `order` is zero.
pub fn design(order: usize, sample_rate: f64, cutoff: f64) -> Result<FilterCoeffs> {
    if order == 0 {
        return Err(Error::Configuration("filter order must be >= 1".into()));
    }
    if !(cutoff > 0.0 && cutoff < sample_rate / 2.0) {
        return Err(Error::Configuration(format!(
            "cutoff {cutoff} Hz must lie in (0, {}) Hz for sample rate {sample_rate} Hz",
            sample_rate / 2.0
        )));
    }

    let fcf = 2.0 * cutoff / sample_rate;
    let a = acof_bwlp(order, fcf);
    let b = ccof_bwlp(order);
    let gain = sf_bwlp(order, fcf);
    Ok(FilterCoeffs { gain, b, a })
}

/// Denominator coefficients `a[0..=order]`, `a[0] == 1.0`.
fn acof_bwlp(order: usize, fcf: f64) -> Vec<f64> {
    let theta = PI * fcf;
    let (st, ct) = (theta.sin(), theta.cos());

    let poles: Vec<Complex64> = (0..order)
        .map(|k| {
            let parg = PI * (2.0 * k as f64 + 1.0) / (2.0 * order as f64);
            let den = 1.0 + st * parg.sin();
            Complex64::new(-ct / den, -st * parg.cos() / den)
        })
        .collect();

    let expanded = binomial_mult(&poles);

    let mut a = Vec::with_capacity(order + 1);
    a.push(1.0);
    for k in 0..order {
        a.push(expanded[k].re);
    }
    a
}

/// Expands `Π(z - p_i)` by iterated binomial multiplication, returning the
/// coefficients of `z^(order-1) .. z^0` (constant term last), as the
/// original `binomial_mult` does.
fn binomial_mult(p: &[Complex64]) -> Vec<Complex64> {
    let mut a = vec![Complex64::new(0.0, 0.0); p.len()];
    for (i, &pi) in p.iter().enumerate() {
        for j in (1..=i).rev() {
            a[j] += pi * a[j - 1];
        }
        a[0] += pi;
    }
    a
}

/// Numerator coefficients: the binomial row `C(order, i)`.
fn ccof_bwlp(order: usize) -> Vec<f64> {
    let mut ccof = vec![0.0; order + 1];
    ccof[0] = 1.0;
    ccof[1] = order as f64;
    let m = order / 2;
    for i in 2..=m {
        ccof[i] = (order - i + 1) as f64 * ccof[i - 1] / i as f64;
        ccof[order - i] = ccof[i];
    }
    ccof[order - 1] = order as f64;
    ccof[order] = 1.0;
    ccof
}

/// Overall gain factor `sf` so that `gain * sum(b) / sum(a)` normalizes the
/// passband to unity.
fn sf_bwlp(order: usize, fcf: f64) -> f64 {
    let omega = PI * fcf;
    let parg0 = PI / (2.0 * order as f64);

    let mut sf = 1.0;
    for k in 0..order / 2 {
        sf *= 1.0 + omega.sin() * ((2 * k + 1) as f64 * parg0).sin();
    }

    let fomega = (omega / 2.0).sin();
    if order % 2 == 1 {
        sf *= fomega + (omega / 2.0).cos();
    }
    fomega.powi(order as i32) / sf
}
