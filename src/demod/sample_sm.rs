//! Sample-rate state machine: signal detection, preamble sync,
//! samples-per-symbol estimation, and bit slicing.
//!
//! Ground truth: `wavingz::demod::state_machine::sample_sm` (wavingz.cpp).
//! The original uses a heap-allocated `state_base_t` hierarchy with
//! virtual dispatch; here the four states are a tagged enum matched in
//! a single `process` method.

use super::symbol_sm::SymbolMachine;

const LEAD_IN_SYMBOLS: u32 = 10;
const SYNC_SYMBOLS: u32 = 20;

#[derive(Debug)]
enum SampleState {
    Idle,
    LeadIn { last: bool, counter: u32 },
    Preamble {
        last: bool,
        samples_counter: u64,
        symbols_counter: u32,
    },
    BitLock {
        last: bool,
        samples_per_symbol: f64,
        num_samples: f64,
    },
}

/// Drives preamble synchronization and bit-slicing from a stream of
/// optional sliced samples (`None` means "no signal this tick").
pub struct SampleMachine {
    state: SampleState,
}

impl SampleMachine {
    pub fn new() -> Self {
        SampleMachine {
            state: SampleState::Idle,
        }
    }

    /// `true` while synchronizing on the preamble (lead-in or preamble
    /// proper) — used by the caller to decide whether to drift the
    /// carrier-offset tracker.
    pub fn in_preamble(&self) -> bool {
        matches!(self.state, SampleState::LeadIn { .. } | SampleState::Preamble { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SampleState::Idle)
    }

    /// Advance the state machine by one tick, forwarding any sliced bit
    /// (or loss-of-signal) to `symbols`.
    pub fn process<F: FnMut(&[u8])>(&mut self, sample: Option<bool>, symbols: &mut SymbolMachine<F>) {
        self.state = match (std::mem::replace(&mut self.state, SampleState::Idle), sample) {
            (SampleState::Idle, None) => SampleState::Idle,
            (SampleState::Idle, Some(s)) => {
                log::trace!("sample_sm: idle -> lead_in");
                SampleState::LeadIn { last: s, counter: 0 }
            }

            (SampleState::LeadIn { .. }, None) => {
                log::trace!("sample_sm: lead_in -> idle (loss of signal)");
                SampleState::Idle
            }
            (SampleState::LeadIn { last, mut counter }, Some(s)) => {
                if s != last {
                    counter += 1;
                }
                if counter == LEAD_IN_SYMBOLS {
                    log::trace!("sample_sm: lead_in -> preamble");
                    SampleState::Preamble {
                        last: s,
                        samples_counter: 0,
                        symbols_counter: 0,
                    }
                } else {
                    SampleState::LeadIn { last: s, counter }
                }
            }

            (SampleState::Preamble { .. }, None) => {
                log::trace!("sample_sm: preamble -> idle (loss of signal)");
                SampleState::Idle
            }
            (
                SampleState::Preamble {
                    last,
                    mut samples_counter,
                    mut symbols_counter,
                },
                Some(s),
            ) => {
                samples_counter += 1;
                if s != last {
                    symbols_counter += 1;
                    if symbols_counter > SYNC_SYMBOLS {
                        let sps = samples_counter as f64 / (symbols_counter - 1) as f64;
                        log::debug!("sample_sm: preamble -> bit_lock (sps={sps})");
                        SampleState::BitLock {
                            last: s,
                            samples_per_symbol: sps,
                            num_samples: 3.0 * sps / 4.0,
                        }
                    } else {
                        SampleState::Preamble {
                            last: s,
                            samples_counter,
                            symbols_counter,
                        }
                    }
                } else {
                    SampleState::Preamble {
                        last: s,
                        samples_counter,
                        symbols_counter,
                    }
                }
            }

            (SampleState::BitLock { .. }, None) => {
                log::debug!("sample_sm: bit_lock -> idle (loss of signal)");
                symbols.process(None);
                SampleState::Idle
            }
            (
                SampleState::BitLock {
                    mut last,
                    samples_per_symbol,
                    mut num_samples,
                },
                Some(s),
            ) => {
                if s != last {
                    last = s;
                    num_samples = 3.0 * samples_per_symbol / 4.0;
                } else {
                    num_samples += 1.0;
                }
                if num_samples >= samples_per_symbol {
                    symbols.process(Some(s));
                    num_samples -= samples_per_symbol;
                }
                SampleState::BitLock {
                    last,
                    samples_per_symbol,
                    num_samples,
                }
            }
        };
    }
}

impl Default for SampleMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demod::symbol_sm::SymbolMachine;

    fn run(samples: &[Option<bool>]) -> (SampleMachine, SymbolMachine<impl FnMut(&[u8])>) {
        let mut sm = SampleMachine::new();
        let mut sym = SymbolMachine::new(|_| {});
        for &s in samples {
            sm.process(s, &mut sym);
        }
        (sm, sym)
    }

    #[test]
    fn idle_stays_idle_on_no_signal() {
        let (sm, _) = run(&[None, None, None]);
        assert!(sm.is_idle());
    }

    #[test]
    fn lead_in_returns_to_idle_on_loss_of_signal() {
        let (sm, _) = run(&[Some(true), None]);
        assert!(sm.is_idle());
    }

    #[test]
    fn ten_edges_advance_past_lead_in() {
        // Alternate every sample: 10 edges after the first sample lands in
        // Preamble, not LeadIn or Idle.
        let mut samples = vec![Some(false)];
        for i in 0..10 {
            samples.push(Some(i % 2 == 0));
        }
        let (sm, _) = run(&samples);
        assert!(sm.in_preamble());
        assert!(!sm.is_idle());
    }

    #[test]
    fn bit_lock_emits_bits_once_estimated() {
        // Synthesize >80 alternating-bit preamble samples at sps=4, then
        // verify the machine reaches BitLock (by observing the symbol
        // machine receives at least one bit before the stream ends).
        let sps = 4usize;
        let mut samples = Vec::new();
        let mut bit = true;
        for _ in 0..60 {
            for _ in 0..sps {
                samples.push(Some(bit));
            }
            bit = !bit;
        }
        let mut sm = SampleMachine::new();
        let mut sym = SymbolMachine::new(|_| {});
        for &s in &samples {
            sm.process(s, &mut sym);
        }
        assert!(matches!(sm.state, SampleState::BitLock { .. }));
    }
}
