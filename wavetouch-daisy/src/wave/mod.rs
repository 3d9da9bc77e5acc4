//! synthesis pipeline: producer task refilling the half the DMA just
//! released, handed over through a one-deep zero-copy channel

pub mod hw;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::zerocopy_channel::{Receiver, Sender};
use wavetouch_core::{BlockSynth, ParamStore, SampleBlock};

/// Regenerates fixed-point samples into whichever block the output
/// side hands back. Parameters are snapshotted once per block, so
/// changes land on block boundaries only.
#[embassy_executor::task]
pub async fn producer(
    params: &'static ParamStore<NoopRawMutex>,
    mut block_tx: Sender<'static, NoopRawMutex, SampleBlock>,
) {
    let mut synth = BlockSynth::new();
    loop {
        // blocks until a half is ready for refill, no timeout
        let block = block_tx.send().await;
        let snapshot = params.snapshot();
        synth.fill_block(&snapshot, block);
        block_tx.send_done();
    }
}

/// Feeds committed blocks into the DMA ring. The `write` completion
/// is the interrupt-posted half-ready handoff: while it pends, the
/// hardware owns one half and this task owns the other. If the
/// producer falls behind, the previous buffer is retransmitted
/// (underrun, undetected).
#[embassy_executor::task]
pub async fn output(
    mut sai_tx: hw::SaiTx,
    mut block_rx: Receiver<'static, NoopRawMutex, SampleBlock>,
) {
    let mut buf = [0u32; hw::HALF_DMA_BUFFER_LEN];
    loop {
        let block_fut = block_rx.receive();
        sai_tx.write(&buf).await.unwrap();

        let block = block_fut.await;
        for (i, &s) in block.iter().enumerate() {
            // same sample on both frame slots
            buf[2 * i] = u32::from(s);
            buf[2 * i + 1] = u32::from(s);
        }
        block_rx.receive_done();
    }
}
