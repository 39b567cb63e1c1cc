//! Symbol-rate state machine: SOF location and byte reassembly.
//!
//! Ground truth: `wavingz::demod::state_machine::symbol_sm` (wavingz.cpp).
//! SOF is `1111_0000`; the sample state machine drops the last preamble
//! bit and the first SOF bit during sync, so this machine waits for 5
//! consecutive ones before switching to counting the second nibble's 4
//! zeros.

const SOF_FIRST_NIBBLE_ONES: u32 = 5;
const SOF_SECOND_NIBBLE_ZEROS: u32 = 4;

enum SymbolState {
    SofFirstNibble { ones: u32 },
    SofSecondNibble { zeros: u32 },
    Payload { buffer: Vec<u8>, current: u8, index: u8 },
}

/// Reassembles bits emitted by the sample state machine into bytes,
/// locating the start-of-frame marker and delivering the accumulated
/// payload to `on_frame` when the signal is lost.
pub struct SymbolMachine<F: FnMut(&[u8])> {
    state: SymbolState,
    on_frame: F,
}

impl<F: FnMut(&[u8])> SymbolMachine<F> {
    pub fn new(on_frame: F) -> Self {
        SymbolMachine {
            state: SymbolState::SofFirstNibble { ones: 0 },
            on_frame,
        }
    }

    /// Advance by one bit (`Some(bit)`), or flush on loss-of-signal (`None`).
    pub fn process(&mut self, symbol: Option<bool>) {
        self.state = match (std::mem::replace(&mut self.state, SymbolState::SofFirstNibble { ones: 0 }), symbol) {
            (SymbolState::SofFirstNibble { .. }, None) => SymbolState::SofFirstNibble { ones: 0 },
            (SymbolState::SofFirstNibble { ones }, Some(bit)) => {
                let ones = if bit { ones + 1 } else { 0 };
                if ones == SOF_FIRST_NIBBLE_ONES {
                    log::trace!("symbol_sm: sof_first_nibble -> sof_second_nibble");
                    SymbolState::SofSecondNibble { zeros: 0 }
                } else {
                    SymbolState::SofFirstNibble { ones }
                }
            }

            (SymbolState::SofSecondNibble { .. }, None) => SymbolState::SofFirstNibble { ones: 0 },
            (SymbolState::SofSecondNibble { zeros }, Some(bit)) => {
                if bit {
                    // A stray one restarts SOF search rather than a full
                    // idle-return.
                    SymbolState::SofFirstNibble { ones: 0 }
                } else {
                    let zeros = zeros + 1;
                    if zeros == SOF_SECOND_NIBBLE_ZEROS {
                        log::debug!("symbol_sm: sof_second_nibble -> payload");
                        SymbolState::Payload {
                            buffer: Vec::new(),
                            current: 0,
                            index: 0,
                        }
                    } else {
                        SymbolState::SofSecondNibble { zeros }
                    }
                }
            }

            (SymbolState::Payload { buffer, .. }, None) => {
                log::debug!("symbol_sm: payload -> sof_first_nibble ({} bytes)", buffer.len());
                (self.on_frame)(&buffer);
                SymbolState::SofFirstNibble { ones: 0 }
            }
            (
                SymbolState::Payload {
                    mut buffer,
                    mut current,
                    mut index,
                },
                Some(bit),
            ) => {
                if bit {
                    current |= 1 << (7 - index);
                }
                index += 1;
                if index == 8 {
                    buffer.push(current);
                    current = 0;
                    index = 0;
                }
                SymbolState::Payload { buffer, current, index }
            }
        };
    }
}
