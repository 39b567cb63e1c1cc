//! Crate-wide error type.
//!
//! Configuration and overflow errors are fatal for the offending operation
//! and are returned to the caller, never corrupting already-committed
//! output. The demodulation path itself is infallible by design (see
//! `demod`) and does not use this type.

use thiserror::Error;

/// Errors returned by the encoder and by filter/design construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A filter or encoder was asked to operate with parameters that cannot
    /// produce a valid, coherent signal (e.g. a cutoff frequency outside
    /// `(0, sample_rate / 2)`, or a sample/baud rate pair whose two FSK
    /// tones are not phase-coherent over one symbol period).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A quantized sample exceeded the representable range of an 8-bit IQ
    /// channel (`|sample * amplitude| > 127`).
    #[error("encoder overflow: sample {sample} * amplitude {amplitude} exceeds +-127")]
    Overflow { sample: f64, amplitude: f64 },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
