use embassy_stm32::{
    peripherals::SAI1,
    sai::{Dma, FsPin, Instance, MasterClockDivider, MclkPin, Sai, SckPin, SdPin, A},
    Peri,
};
use grounded::uninit::GroundedArrayCell;
use wavetouch_core::{NUM_BLOCKS, SAMPLES_PER_BLOCK};

// two frame slots per sample
pub(super) const HALF_DMA_BUFFER_LEN: usize = SAMPLES_PER_BLOCK * 2;
const DMA_BUFFER_LEN: usize = HALF_DMA_BUFFER_LEN * NUM_BLOCKS;

/// Ping-pong ring the DMA engine drains autonomously and cyclically.
/// Contiguous little-endian sample words; layout is the wire format
/// the output converter expects. Lives in AXI SRAM, reachable by DMA1.
static TX_BUFFER: GroundedArrayCell<u32, DMA_BUFFER_LEN> = GroundedArrayCell::uninit();

pub fn init_sai_tx<'d, T: Instance>(
    instance: Peri<'d, T>,
    sck: Peri<'d, impl SckPin<T, A>>,
    fs: Peri<'d, impl FsPin<T, A>>,
    mclk: Peri<'d, impl MclkPin<T, A>>,
    sd: Peri<'d, impl SdPin<T, A>>,
    dma: Peri<'d, impl Dma<T, A>>,
) -> Sai<'d, T, u32> {
    let (sub_block_tx, _) = embassy_stm32::sai::split_subblocks(instance);
    let tx_config = {
        use embassy_stm32::sai::*;

        let mut config = Config::default();
        config.mode = Mode::Master;
        config.tx_rx = TxRx::Transmitter;
        config.sync_output = true;
        config.clock_strobe = ClockStrobe::Falling;
        // sai1 on pll3_p = 49.2 MHz; 49_200_000 / (48_000 * 256) = 4
        config.master_clock_divider = MasterClockDivider::Div4;
        config.stereo_mono = StereoMono::Stereo;
        config.data_size = DataSize::Data16;
        config.bit_order = BitOrder::MsbFirst;
        config.frame_sync_polarity = FrameSyncPolarity::ActiveHigh;
        config.frame_sync_offset = FrameSyncOffset::OnFirstBit;
        config.frame_length = 64;
        config.frame_sync_active_level_length = word::U7(32);
        config.fifo_threshold = FifoThreshold::Quarter;
        config
    };
    let tx_buffer: &mut [u32] = unsafe {
        TX_BUFFER.initialize_all_copied(0);
        let (ptr, len) = TX_BUFFER.get_ptr_len();
        core::slice::from_raw_parts_mut(ptr, len)
    };

    Sai::new_asynchronous_with_mclk(sub_block_tx, sck, sd, fs, mclk, dma, tx_buffer, tx_config)
}

pub type SaiTx = Sai<'static, SAI1, u32>;
