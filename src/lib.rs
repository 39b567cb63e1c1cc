//! Software-defined-radio encoder and demodulator for the Z-Wave
//! physical/MAC layer at 40 kbaud FSK in the 868/908 MHz band.
//!
//! Given a stream of complex baseband IQ samples, [`demod::Demodulator`]
//! recovers Z-Wave frames (home-id, node-ids, frame-control, length,
//! command-class, payload, checksum). Given a payload, [`encode::FskEncoder`]
//! synthesizes a baseband IQ signal suitable for transmission via an SDR.
//!
//! Reading/writing raw IQ from a device or file, CLI argument parsing, and
//! command-class-specific payload interpretation are external concerns and
//! are not part of this crate — see `DESIGN.md`.
//!
//! This crate never initializes a logger; it only emits [`log`] records at
//! state-machine transitions and loss-of-signal events, same as any library
//! built against the `log` facade. Wire one up (e.g. `env_logger`) in the
//! embedding application to observe them.

pub mod demod;
pub mod encode;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod frame;
mod math;

pub use demod::Demodulator;
pub use encode::FskEncoder;
pub use encoding::ByteEncoding;
pub use error::{Error, Result};
