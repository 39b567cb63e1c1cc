//! Generic Butterworth filter design, a streaming IIR evaluator, and an
//! FM discriminator — the signal-processing primitives the encoder and
//! demodulator pipelines are built from.

pub mod butter;
pub mod discriminator;
pub mod iir;

pub use butter::FilterCoeffs;
pub use discriminator::Discriminator;
pub use iir::Iir;
