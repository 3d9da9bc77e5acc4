//! capacitive pad scan pipeline: calibration, thresholding and edge
//! detection over an abstract scan engine

use crate::flags::EventFlags;

/// addressable scan channels; boards typically wire only a few
pub const MAX_CHANNELS: usize = 16;

/// Capability interface of a single-engine capacitance scanner:
/// software-trigger a scan, poll its completion flag, read the raw
/// count. Keeps the state machine testable without hardware.
pub trait CapScanner {
    type Error;

    /// Non-blocking scan trigger. One scan in flight at a time; the
    /// caller's scheduling discipline must never overlap starts.
    fn start_scan(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Completion flag of the in-flight scan.
    fn scan_complete(&mut self) -> Result<bool, Self::Error>;

    /// Raw count of the finished scan. Higher means more capacitance
    /// (a firmer touch); implementations invert if their front end
    /// counts the other way.
    fn read_count(&mut self, channel: u8) -> Result<u16, Self::Error>;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PadState {
    Released,
    Touched,
}

#[derive(Clone, Copy)]
struct ChannelLevels {
    /// raw count with the sensor unloaded, set once by calibration
    baseline: u16,
    /// per-electrode tuned margin above baseline
    offset: u16,
    /// baseline + offset; counts strictly above this are a touch
    threshold: u16,
    /// last debounced state, for edge detection
    state: PadState,
}

impl ChannelLevels {
    const fn new() -> Self {
        Self {
            baseline: 0,
            offset: 0,
            threshold: 0,
            state: PadState::Released,
        }
    }
}

/// Per-channel calibration state plus the event-flag group fed by
/// released->touched edges.
pub struct SenseBank<S: CapScanner> {
    scanner: S,
    levels: [ChannelLevels; MAX_CHANNELS],
    flags: &'static EventFlags,
}

impl<S: CapScanner> SenseBank<S> {
    pub fn new(scanner: S, flags: &'static EventFlags) -> Self {
        Self {
            scanner,
            levels: [ChannelLevels::new(); MAX_CHANNELS],
            flags,
        }
    }

    /// Set the experimentally tuned trigger margin for a channel.
    /// Takes effect at the next calibration.
    pub fn set_offset(&mut self, channel: u8, offset: u16) {
        self.levels[usize::from(channel)].offset = offset;
    }

    pub fn state(&self, channel: u8) -> PadState {
        self.levels[usize::from(channel)].state
    }

    /// One blocking scan with the sensor unloaded; stores the baseline
    /// and derives the threshold. The no-touch precondition is the
    /// caller's responsibility and is not verified here.
    pub fn calibrate(&mut self, channel: u8) -> Result<(), S::Error> {
        self.scanner.start_scan(channel)?;
        while !self.scanner.scan_complete()? {}
        let ch = &mut self.levels[usize::from(channel)];
        ch.baseline = self.scanner.read_count(channel)?;
        ch.threshold = ch.baseline.saturating_add(ch.offset);
        Ok(())
    }

    /// Non-blocking trigger; must be paired with a later
    /// [`process_scan`](Self::process_scan) on the same channel.
    pub fn start_scan(&mut self, channel: u8) -> Result<(), S::Error> {
        self.scanner.start_scan(channel)
    }

    /// Busy-wait for the in-flight scan, classify the count and post
    /// the channel bit on a released->touched edge. A stalled engine
    /// hangs here; accepted fail-stop for this class of device.
    pub fn process_scan(&mut self, channel: u8) -> Result<(), S::Error> {
        while !self.scanner.scan_complete()? {}
        let count = self.scanner.read_count(channel)?;
        let ch = &mut self.levels[usize::from(channel)];
        // ties classify as released
        let cur = if count > ch.threshold {
            PadState::Touched
        } else {
            PadState::Released
        };
        if cur == PadState::Touched && ch.state == PadState::Released {
            self.flags.post(1 << channel);
            ch.state = PadState::Touched;
        } else if cur == PadState::Released {
            ch.state = PadState::Released;
        }
        Ok(())
    }
}
