#![cfg_attr(not(test), no_std)]
//! hardware-free engines for the touch-controlled waveform generator:
//! capacitive pad scanning/debouncing, fixed-point block synthesis,
//! the shared parameter store and the persisted settings blob

pub mod flags;
pub mod params;
pub mod settings;
pub mod synth;
pub mod touch;

pub use flags::EventFlags;
pub use params::{ParamStore, WaveMode, WaveParams};
pub use synth::BlockSynth;
pub use touch::{CapScanner, SenseBank};

/// output converter sample rate in hz
pub const SAMPLE_RATE: u32 = 48_000;
/// samples per ping-pong buffer half
pub const SAMPLES_PER_BLOCK: usize = 128;
/// buffer halves; dma drains one while the other is refilled
pub const NUM_BLOCKS: usize = 2;

/// one synthesis block, the unit of producer/dma handoff
pub type SampleBlock = [u16; SAMPLES_PER_BLOCK];
