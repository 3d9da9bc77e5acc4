#![no_std]
#![no_main]

mod eeprom;
mod input;
mod tui;
mod wave;

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_stm32::time::Hertz;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_sync::zerocopy_channel::Channel as ZeroCopyChannel;
use static_cell::StaticCell;
use wavetouch_core::{EventFlags, ParamStore, SampleBlock, SenseBank, WaveParams, SAMPLES_PER_BLOCK};
use {defmt_rtt as _, panic_probe as _};

embassy_stm32::bind_interrupts!(struct Irqs {
    I2C1_EV => embassy_stm32::i2c::EventInterruptHandler<embassy_stm32::peripherals::I2C1>;
    I2C1_ER => embassy_stm32::i2c::ErrorInterruptHandler<embassy_stm32::peripherals::I2C1>;
});

const MPR121_ADDR: u8 = 0x5a;

static FLAGS: EventFlags = EventFlags::new();
static PERSIST: Signal<NoopRawMutex, WaveParams> = Signal::new();
static DISPLAY: Signal<NoopRawMutex, WaveParams> = Signal::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let config = {
        use embassy_stm32::rcc::*;

        let mut config = embassy_stm32::Config::default();
        config.rcc.hse = Some(Hse {
            freq: Hertz::mhz(16),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll1 = Some(Pll {
            source: PllSource::HSE,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL240,
            divp: Some(PllDiv::DIV2),
            divq: Some(PllDiv::DIV20),
            divr: Some(PllDiv::DIV2),
        });
        config.rcc.pll3 = Some(Pll {
            source: PllSource::HSE,
            prediv: PllPreDiv::DIV6,
            mul: PllMul::MUL295,
            divp: Some(PllDiv::DIV16),
            divq: Some(PllDiv::DIV4),
            divr: Some(PllDiv::DIV32),
        });
        config.rcc.sys = Sysclk::PLL1_P; // 480 MHz
        config.rcc.mux.sai1sel = mux::Saisel::PLL3_P; // 49.2 MHz

        config.rcc.ahb_pre = AHBPrescaler::DIV2; // 240 MHz
        config.rcc.apb1_pre = APBPrescaler::DIV2; // 120 MHz
        config.rcc.apb2_pre = APBPrescaler::DIV2; // 120 MHz
        config.rcc.apb3_pre = APBPrescaler::DIV2; // 120 MHz
        config.rcc.apb4_pre = APBPrescaler::DIV2; // 120 MHz
        config.rcc.voltage_scale = VoltageScale::Scale0;
        config
    };
    let p = embassy_stm32::init(config);

    // restore persisted settings; a blank or corrupt blob reads back
    // as factory defaults
    let i2c4 = embassy_stm32::i2c::I2c::new_blocking(
        p.I2C4,
        p.PB6,
        p.PB7,
        Hertz(400_000),
        Default::default(),
    );
    let mut settings_store = eeprom::Eeprom::new(i2c4);
    let initial = match settings_store.read_settings() {
        Ok(params) => params,
        Err(_) => {
            warn!("eeprom unreachable, using defaults");
            WaveParams::default_values()
        }
    };
    info!("boot settings: {}", initial);

    static PARAMS: StaticCell<ParamStore<NoopRawMutex>> = StaticCell::new();
    let params = PARAMS.init_with(|| ParamStore::new(initial));

    // init touch pads; nothing may touch them until calibration is done
    let i2c2 = embassy_stm32::i2c::I2c::new_blocking(
        p.I2C2,
        p.PB10,
        p.PB11,
        Hertz(400_000),
        Default::default(),
    );
    let scanner = match input::touch::Mpr121Scanner::new(i2c2, MPR121_ADDR) {
        Ok(scanner) => scanner,
        Err(_) => defmt::panic!("mpr121 init failed"),
    };
    let mut bank = SenseBank::new(scanner, &FLAGS);
    bank.set_offset(input::pads::DEC, input::pads::DEC_OFFSET);
    bank.set_offset(input::pads::INC, input::pads::INC_OFFSET);
    unwrap!(bank.calibrate(input::pads::DEC), "calibration");
    unwrap!(bank.calibrate(input::pads::INC), "calibration");

    // init dma pipeline: half-ready handoff is one block deep
    static BLOCK_BUF: StaticCell<[SampleBlock; 1]> = StaticCell::new();
    let block_buf = BLOCK_BUF.init_with(|| [[0u16; SAMPLES_PER_BLOCK]]);
    static BLOCK_CH: StaticCell<ZeroCopyChannel<'static, NoopRawMutex, SampleBlock>> =
        StaticCell::new();
    let (block_tx, block_rx) = BLOCK_CH
        .init_with(|| ZeroCopyChannel::new(block_buf))
        .split();

    let sai_tx = wave::hw::init_sai_tx(p.SAI1, p.PE5, p.PE4, p.PE2, p.PE6, p.DMA1_CH0);
    spawner.must_spawn(wave::producer(params, block_tx));
    spawner.must_spawn(wave::output(sai_tx, block_rx));

    // init ssd1306
    let i2c1 = embassy_stm32::i2c::I2c::new(
        p.I2C1,
        p.PB8,
        p.PB9,
        Irqs,
        p.DMA1_CH2,
        p.DMA1_CH3,
        Hertz(400_000),
        Default::default(),
    );
    let interface = ssd1306::I2CDisplayInterface::new(i2c1);
    let display = ssd1306::Ssd1306Async::new(
        interface,
        ssd1306::size::DisplaySize128x64,
        ssd1306::rotation::DisplayRotation::Rotate0,
    )
    .into_terminal_mode();
    spawner.must_spawn(tui::display(display, &DISPLAY));
    DISPLAY.signal(initial);

    spawner.must_spawn(input::scan(bank));
    spawner.must_spawn(input::consumer(&FLAGS, params, &PERSIST, &DISPLAY));
    spawner.must_spawn(eeprom::persist(settings_store, &PERSIST));

    info!("wavetouch up");
}
