use embedded_hal::i2c::I2c;
use embassy_time::{Duration, Instant};
use wavetouch_core::CapScanner;

/// full scale of the 10-bit filtered count
const FULL_SCALE: u16 = 0x3ff;
/// front-end sample period set by CONFIG2 (1 ms)
const FILTER_PERIOD: Duration = Duration::from_millis(1);

#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
enum Regs {
    E0FDL = 0x04,
    MHDR = 0x2b,
    NHDR = 0x2c,
    NCLR = 0x2d,
    FDLR = 0x2e,
    MHDF = 0x2f,
    NHDF = 0x30,
    NCLF = 0x31,
    FDLF = 0x32,
    NHDT = 0x33,
    NCLT = 0x34,
    FDLT = 0x35,

    DEBOUNCE = 0x5b,
    CONFIG1 = 0x5c,
    CONFIG2 = 0x5d,
    ECR = 0x5e,
    AUTOCONFIG0 = 0x7b,
    UPLIMIT = 0x7d,
    LOWLIMIT = 0x7e,
    TARGETLIMIT = 0x7f,

    SOFTRESET = 0x80,
}

#[derive(Debug)]
pub enum Error<E> {
    Boot,
    I2c(E),
}

impl<E> From<E> for Error<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}

/// MPR121 capacitive front end presented as a scan engine.
///
/// The chip samples all electrodes autonomously every millisecond;
/// thresholding, debouncing and edge detection stay in software, so
/// the on-chip touch detector is left unconfigured and only the raw
/// filtered counts are read. `start_scan` timestamps the trigger and
/// `scan_complete` reports once a full filter period has elapsed.
pub struct Mpr121Scanner<I> {
    i2c: I,
    addr: u8,
    started: Instant,
}

impl<I: I2c> Mpr121Scanner<I> {
    pub fn new(i2c: I, addr: u8) -> Result<Self, Error<I::Error>> {
        let mut scanner = Self {
            i2c,
            addr,
            started: Instant::from_ticks(0),
        };
        scanner.init()?;
        Ok(scanner)
    }

    fn write_byte(&mut self, reg: Regs, byte: u8) -> Result<(), I::Error> {
        self.i2c.write(self.addr, &[reg as u8, byte])
    }

    fn init(&mut self) -> Result<(), Error<I::Error>> {
        // reset & stop
        self.write_byte(Regs::SOFTRESET, 0x63)?;
        self.write_byte(Regs::ECR, 0x00)?;

        // check boot state
        let mut buf = [0u8];
        self.i2c
            .write_read(self.addr, &[Regs::CONFIG2 as u8], &mut buf)?;
        if buf[0] != 0x24 {
            return Err(Error::Boot);
        }

        // rising/falling baseline filters
        self.write_byte(Regs::MHDR, 0x01)?;
        self.write_byte(Regs::NHDR, 0x01)?;
        self.write_byte(Regs::NCLR, 0x0e)?;
        self.write_byte(Regs::FDLR, 0x00)?;

        self.write_byte(Regs::MHDF, 0x01)?;
        self.write_byte(Regs::NHDF, 0x05)?;
        self.write_byte(Regs::NCLF, 0x01)?;
        self.write_byte(Regs::FDLF, 0x00)?;

        self.write_byte(Regs::NHDT, 0x00)?;
        self.write_byte(Regs::NCLT, 0x00)?;
        self.write_byte(Regs::FDLT, 0x00)?;

        self.write_byte(Regs::DEBOUNCE, 0x00)?;
        self.write_byte(Regs::CONFIG1, 0x10)?; // default 16uA charge current
        self.write_byte(Regs::CONFIG2, 0x20)?; // 0.5us encoding, 1ms period

        // autoconfig for Vdd = 3.3V
        self.write_byte(Regs::AUTOCONFIG0, 0x0b)?;
        self.write_byte(Regs::UPLIMIT, 200)?; // (Vdd - 0.7) / Vdd * 256
        self.write_byte(Regs::TARGETLIMIT, 180)?; // UPLIMIT * 0.9
        self.write_byte(Regs::LOWLIMIT, 130)?; // UPLIMIT * 0.65

        // enable 12 electrodes & start
        self.write_byte(Regs::ECR, 0b1000_0000 + 12)?;

        Ok(())
    }
}

impl<I: I2c> CapScanner for Mpr121Scanner<I> {
    type Error = I::Error;

    fn start_scan(&mut self, _channel: u8) -> Result<(), Self::Error> {
        self.started = Instant::now();
        Ok(())
    }

    fn scan_complete(&mut self) -> Result<bool, Self::Error> {
        Ok(self.started.elapsed() >= FILTER_PERIOD)
    }

    fn read_count(&mut self, channel: u8) -> Result<u16, Self::Error> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(
            self.addr,
            &[Regs::E0FDL as u8 + 2 * channel],
            &mut buf,
        )?;
        let raw = u16::from_le_bytes(buf) & FULL_SCALE;
        // filtered counts drop on touch; invert so thresholds rise
        Ok(FULL_SCALE - raw)
    }
}
