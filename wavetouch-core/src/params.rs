//! shared wave-parameter store, the only state mutated by more than
//! one task

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use serde::{Deserialize, Serialize};

pub const MIN_FREQ_HZ: u32 = 10;
pub const MAX_FREQ_HZ: u32 = 10_000;
/// amplitude/duty levels run 0..=MAX_LEVEL (duty in 5% steps)
pub const MAX_LEVEL: u8 = 20;

pub const DEFAULT_FREQ_HZ: u32 = 1_000;
pub const DEFAULT_LEVEL: u8 = 10;

/// Which parameter pair feeds the output.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveMode {
    Sine,
    Pulse,
}

/// Scalar wave parameters, copied in and out of the store whole so no
/// critical section ever spans more than a `Cell` access.
///
/// The store holds values as given; range clamping is the setter
/// caller's job ([`MIN_FREQ_HZ`]..=[`MAX_FREQ_HZ`], 0..=[`MAX_LEVEL`]).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaveParams {
    pub sine_freq: u32,
    pub pulse_freq: u32,
    pub sine_amp: u8,
    pub pulse_duty: u8,
    pub mode: WaveMode,
}

impl WaveParams {
    pub const fn default_values() -> Self {
        Self {
            sine_freq: DEFAULT_FREQ_HZ,
            pulse_freq: DEFAULT_FREQ_HZ,
            sine_amp: DEFAULT_LEVEL,
            pulse_duty: DEFAULT_LEVEL,
            mode: WaveMode::Sine,
        }
    }
}

impl Default for WaveParams {
    fn default() -> Self {
        Self::default_values()
    }
}

/// Mutex-guarded parameter store. Written by the touch consumer and
/// UI collaborators, read by the synthesis task each block cycle.
pub struct ParamStore<M: RawMutex> {
    inner: Mutex<M, Cell<WaveParams>>,
}

impl<M: RawMutex> ParamStore<M> {
    pub const fn new(initial: WaveParams) -> Self {
        Self {
            inner: Mutex::new(Cell::new(initial)),
        }
    }

    pub fn snapshot(&self) -> WaveParams {
        self.inner.lock(|p| p.get())
    }

    pub fn replace(&self, params: WaveParams) {
        self.inner.lock(|p| p.set(params));
    }

    pub fn update(&self, f: impl FnOnce(&mut WaveParams)) {
        self.inner.lock(|p| {
            let mut params = p.get();
            f(&mut params);
            p.set(params);
        });
    }

    pub fn mode(&self) -> WaveMode {
        self.snapshot().mode
    }

    pub fn set_mode(&self, mode: WaveMode) {
        self.update(|p| p.mode = mode);
    }

    pub fn sine_freq(&self) -> u32 {
        self.snapshot().sine_freq
    }

    pub fn set_sine_freq(&self, hz: u32) {
        self.update(|p| p.sine_freq = hz);
    }

    pub fn sine_amp(&self) -> u8 {
        self.snapshot().sine_amp
    }

    pub fn set_sine_amp(&self, level: u8) {
        self.update(|p| p.sine_amp = level);
    }

    pub fn pulse_freq(&self) -> u32 {
        self.snapshot().pulse_freq
    }

    pub fn set_pulse_freq(&self, hz: u32) {
        self.update(|p| p.pulse_freq = hz);
    }

    pub fn pulse_duty(&self) -> u8 {
        self.snapshot().pulse_duty
    }

    pub fn set_pulse_duty(&self, level: u8) {
        self.update(|p| p.pulse_duty = level);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    #[test]
    fn setters_apply_to_the_next_snapshot() {
        let store: ParamStore<CriticalSectionRawMutex> =
            ParamStore::new(WaveParams::default_values());
        store.set_sine_freq(2_500);
        store.set_sine_amp(17);
        store.set_mode(WaveMode::Pulse);

        let p = store.snapshot();
        assert_eq!(p.sine_freq, 2_500);
        assert_eq!(p.sine_amp, 17);
        assert_eq!(p.mode, WaveMode::Pulse);
        // untouched pair keeps its defaults
        assert_eq!(p.pulse_freq, DEFAULT_FREQ_HZ);
        assert_eq!(p.pulse_duty, DEFAULT_LEVEL);
    }
}
