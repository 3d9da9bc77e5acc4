//! external display collaborator: renders the numeric state the core
//! exposes, performs no control logic

use core::fmt::Write as _;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use heapless::String;
use ssd1306::mode::DisplayConfigAsync;
use wavetouch_core::{WaveMode, WaveParams};

pub type Display = ssd1306::Ssd1306Async<
    ssd1306::prelude::I2CInterface<embassy_stm32::i2c::I2c<'static, embassy_stm32::mode::Async>>,
    ssd1306::size::DisplaySize128x64,
    ssd1306::mode::TerminalModeAsync,
>;

// 16 columns of 8x8 glyphs; two full rows wrap without cursor moves
fn render(params: &WaveParams) -> String<32> {
    let mut text = String::new();
    match params.mode {
        WaveMode::Sine => {
            let _ = write!(text, "{:<16}", "SINE");
            let _ = write!(text, "{:05}HZ   AMP {:02}", params.sine_freq, params.sine_amp);
        }
        WaveMode::Pulse => {
            let _ = write!(text, "{:<16}", "PULSE");
            let _ = write!(
                text,
                "{:05}HZ  DUTY{:03}",
                params.pulse_freq,
                // levels are 5% duty steps
                5 * u16::from(params.pulse_duty)
            );
        }
    }
    text
}

#[embassy_executor::task]
pub async fn display(mut display: Display, changed: &'static Signal<NoopRawMutex, WaveParams>) {
    display.init().await.unwrap();
    let _ = display.clear().await;
    loop {
        let params = changed.wait().await;
        let _ = display.clear().await;
        let _ = display.write_str(&render(&params)).await;
    }
}
