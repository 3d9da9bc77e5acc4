//! settings persistence in a byte-addressed serial EEPROM (M24C64)

use defmt::warn;
use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Blocking;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use embedded_hal::i2c::I2c as _;
use wavetouch_core::settings::{self, BLOB_LEN};
use wavetouch_core::WaveParams;

pub const ADDR: u8 = 0x50;
const SETTINGS_ADDR: u16 = 0x0000;
/// self-timed write cycle; one blob is exactly one 32-byte page
const WRITE_CYCLE: Duration = Duration::from_millis(5);

pub struct Eeprom {
    i2c: I2c<'static, Blocking>,
}

impl Eeprom {
    pub fn new(i2c: I2c<'static, Blocking>) -> Self {
        Self { i2c }
    }

    /// Read the settings blob back; corruption decodes as defaults.
    pub fn read_settings(&mut self) -> Result<WaveParams, embassy_stm32::i2c::Error> {
        let mut blob = [0u8; BLOB_LEN];
        self.i2c
            .write_read(ADDR, &SETTINGS_ADDR.to_be_bytes(), &mut blob)?;
        Ok(settings::decode(&blob))
    }

    async fn write_blob(&mut self, blob: &[u8; BLOB_LEN]) -> Result<(), embassy_stm32::i2c::Error> {
        let mut frame = [0u8; 2 + BLOB_LEN];
        frame[..2].copy_from_slice(&SETTINGS_ADDR.to_be_bytes());
        frame[2..].copy_from_slice(blob);
        self.i2c.write(ADDR, &frame)?;
        // pace out the part's internal programming cycle
        Timer::after(WRITE_CYCLE).await;
        Ok(())
    }
}

/// Writes the blob after every signaled change. The signal is
/// latest-wins, so a burst of touch steps collapses into one write.
#[embassy_executor::task]
pub async fn persist(mut eeprom: Eeprom, changed: &'static Signal<NoopRawMutex, WaveParams>) {
    loop {
        let params = changed.wait().await;
        let mut blob = [0u8; BLOB_LEN];
        if settings::encode(&params, &mut blob).is_err() {
            warn!("settings blob overflow, not persisted");
            continue;
        }
        if eeprom.write_blob(&blob).await.is_err() {
            warn!("eeprom write failed");
        }
    }
}
