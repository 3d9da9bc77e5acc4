//! touch pad scanning and the event consumer that steps the active
//! wave level

pub mod touch;

use defmt::{info, unwrap, warn};
use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Blocking;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration, Timer};
use wavetouch_core::params::MAX_LEVEL;
use wavetouch_core::{EventFlags, ParamStore, SenseBank, WaveMode, WaveParams};

pub mod pads {
    /// steps the active level down
    pub const DEC: u8 = 10;
    /// steps the active level up
    pub const INC: u8 = 11;

    // trigger margins over the unloaded baseline, tuned per electrode
    pub const DEC_OFFSET: u16 = 0x60;
    pub const INC_OFFSET: u16 = 0x58;
}

/// Round-robin slice. Must exceed the front end's 1 ms filter period
/// so `process_scan` never spins, and stay well under the ~25 ms a
/// human press lasts so no edge is missed.
const SCAN_SLICE: Duration = Duration::from_millis(6);

/// Consumer pend bound; a lapse just means no touch this period.
const PEND_TIMEOUT: Duration = Duration::from_millis(100);

pub type Bank = SenseBank<touch::Mpr121Scanner<I2c<'static, Blocking>>>;

/// Software-pipelined scan loop: one scan engine serves both pads, so
/// each slice processes the pad started the slice before while the
/// other measures.
#[embassy_executor::task]
pub async fn scan(mut bank: Bank) {
    loop {
        unwrap!(bank.start_scan(pads::DEC), "scan trigger");
        Timer::after(SCAN_SLICE).await;
        unwrap!(bank.process_scan(pads::DEC), "scan process");

        unwrap!(bank.start_scan(pads::INC), "scan trigger");
        Timer::after(SCAN_SLICE).await;
        unwrap!(bank.process_scan(pads::INC), "scan process");
    }
}

/// Applies pad edges to the active mode's level: right pad up, left
/// pad down, one step per press, clamped at the range ends (the
/// engines themselves never clamp).
#[embassy_executor::task]
pub async fn consumer(
    flags: &'static EventFlags,
    params: &'static ParamStore<NoopRawMutex>,
    persist: &'static Signal<NoopRawMutex, WaveParams>,
    display: &'static Signal<NoopRawMutex, WaveParams>,
) {
    loop {
        let mask = match with_timeout(PEND_TIMEOUT, flags.wait()).await {
            Ok(mask) => mask,
            // explicit no-event result; keep pending
            Err(_) => continue,
        };

        params.update(|p| {
            let level = match p.mode {
                WaveMode::Sine => &mut p.sine_amp,
                WaveMode::Pulse => &mut p.pulse_duty,
            };
            if mask & (1 << pads::INC) != 0 && *level < MAX_LEVEL {
                *level += 1;
            }
            if mask & (1 << pads::DEC) != 0 {
                *level = level.saturating_sub(1);
            }
        });

        let snapshot = params.snapshot();
        info!(
            "pad edge {=u16:b}: level {=u8}",
            mask,
            match snapshot.mode {
                WaveMode::Sine => snapshot.sine_amp,
                WaveMode::Pulse => snapshot.pulse_duty,
            }
        );
        persist.signal(snapshot);
        display.signal(snapshot);

        if mask & !((1 << pads::INC) | (1 << pads::DEC)) != 0 {
            warn!("edge on unwired channel: {=u16:b}", mask);
        }
    }
}
