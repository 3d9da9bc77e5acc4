//! fixed-point waveform synthesis, one 128-sample block at a time

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::params::{WaveMode, WaveParams, MAX_LEVEL};
use crate::{SampleBlock, SAMPLE_RATE};

/// unsigned 12-bit converter midpoint; the output is biased here
pub const DAC_MIDSCALE: u16 = 0x7ff;
/// top of the converter's valid range
pub const DAC_MAX: u16 = 0xfff;

const SINE_TABLE_LEN: usize = 1024;
const Q15_ONE: i32 = 32_767;
/// peak swing at level MAX_LEVEL, filling the converter range exactly
const FULL_SWING: i32 = DAC_MIDSCALE as i32;

/// Block producer state: the phase accumulator and a one-cycle Q15
/// sine table built once at startup.
///
/// Phase is kept in frequency*sample ticks modulo [`SAMPLE_RATE`], so
/// `phase / SAMPLE_RATE` is the position within one cycle. With that
/// representation the accumulator wraps after exactly
/// `SAMPLE_RATE / freq` samples whenever `freq` divides the sample
/// rate, and long-run frequency is exact for every frequency. Phase is
/// never reset on parameter changes (continuous-phase modulation).
pub struct BlockSynth {
    phase: u32,
    sine_q15: [i16; SINE_TABLE_LEN],
}

impl BlockSynth {
    pub fn new() -> Self {
        let mut sine_q15 = [0i16; SINE_TABLE_LEN];
        for (i, v) in sine_q15.iter_mut().enumerate() {
            let theta = i as f32 * (core::f32::consts::TAU / SINE_TABLE_LEN as f32);
            *v = (theta.sin() * Q15_ONE as f32) as i16;
        }
        Self { phase: 0, sine_q15 }
    }

    /// Synthesize one block from a parameter snapshot. Parameter
    /// changes land at block boundaries only; the resulting
    /// block-granular discontinuity is an accepted tradeoff.
    ///
    /// Levels above [`MAX_LEVEL`] are the setter caller's bug and are
    /// not re-clamped here.
    pub fn fill_block(&mut self, params: &WaveParams, block: &mut SampleBlock) {
        match params.mode {
            WaveMode::Sine => self.fill_sine(params.sine_freq, params.sine_amp, block),
            WaveMode::Pulse => self.fill_pulse(params.pulse_freq, params.pulse_duty, block),
        }
    }

    fn fill_sine(&mut self, freq: u32, level: u8, block: &mut SampleBlock) {
        for s in block.iter_mut() {
            self.phase = (self.phase + freq) % SAMPLE_RATE;
            let idx = (self.phase * SINE_TABLE_LEN as u32 / SAMPLE_RATE) as usize;
            let sin = i32::from(self.sine_q15[idx]);
            // worst case 32767 * 20 * 2047 stays under i32::MAX
            let swing = sin * i32::from(level) * FULL_SWING / (i32::from(MAX_LEVEL) * Q15_ONE);
            *s = (i32::from(DAC_MIDSCALE) + swing) as u16;
        }
    }

    fn fill_pulse(&mut self, freq: u32, duty_level: u8, block: &mut SampleBlock) {
        for s in block.iter_mut() {
            self.phase = (self.phase + freq) % SAMPLE_RATE;
            // high for the first duty_level/MAX_LEVEL of each cycle
            let high = self.phase * u32::from(MAX_LEVEL) < u32::from(duty_level) * SAMPLE_RATE;
            *s = if high { DAC_MAX } else { 0 };
        }
    }

    #[cfg(test)]
    fn phase(&self) -> u32 {
        self.phase
    }
}

impl Default for BlockSynth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::SAMPLES_PER_BLOCK;

    fn sine_params(freq: u32, amp: u8) -> WaveParams {
        WaveParams {
            sine_freq: freq,
            sine_amp: amp,
            mode: WaveMode::Sine,
            ..WaveParams::default_values()
        }
    }

    fn pulse_params(freq: u32, duty: u8) -> WaveParams {
        WaveParams {
            pulse_freq: freq,
            pulse_duty: duty,
            mode: WaveMode::Pulse,
            ..WaveParams::default_values()
        }
    }

    #[test]
    fn table_spans_one_cycle() {
        let synth = BlockSynth::new();
        assert_eq!(synth.sine_q15[0], 0);
        assert!(synth.sine_q15[SINE_TABLE_LEN / 4] > 32_600);
        assert!(synth.sine_q15[3 * SINE_TABLE_LEN / 4] < -32_600);
    }

    #[test]
    fn phase_wraps_after_sample_rate_over_freq_samples() {
        // 48000 / 1000 = 48 samples per cycle, bit-exact
        let mut synth = BlockSynth::new();
        let mut block = [0u16; SAMPLES_PER_BLOCK];
        synth.fill_block(&sine_params(1_000, 10), &mut block);
        for i in 0..SAMPLES_PER_BLOCK - 48 {
            assert_eq!(block[i], block[i + 48], "sample {} differs a cycle later", i);
        }
        // 128 samples * 1000 Hz: phase accumulated mod 48000
        assert_eq!(synth.phase(), (128 * 1_000) % SAMPLE_RATE);
    }

    #[test]
    fn all_levels_stay_in_converter_range() {
        for level in 0..=MAX_LEVEL {
            let mut synth = BlockSynth::new();
            let mut block = [0u16; SAMPLES_PER_BLOCK];
            // prime number of hz to walk many table entries
            for _ in 0..16 {
                synth.fill_block(&sine_params(9_973, level), &mut block);
                assert!(block.iter().all(|&s| s <= DAC_MAX), "level {}", level);
            }
        }
    }

    #[test]
    fn level_zero_is_flat_midscale() {
        let mut synth = BlockSynth::new();
        let mut block = [0u16; SAMPLES_PER_BLOCK];
        synth.fill_block(&sine_params(1_000, 0), &mut block);
        assert!(block.iter().all(|&s| s == DAC_MIDSCALE));
    }

    #[test]
    fn full_level_reaches_the_rails() {
        let mut synth = BlockSynth::new();
        let mut block = [0u16; SAMPLES_PER_BLOCK];
        // 375 Hz -> 128 samples cover exactly one cycle
        synth.fill_block(&sine_params(375, MAX_LEVEL), &mut block);
        assert!(block.iter().any(|&s| s > DAC_MAX - 4));
        assert!(block.iter().any(|&s| s < 4));
    }

    #[test]
    fn frequency_changes_keep_phase_continuous() {
        let mut synth = BlockSynth::new();
        let mut block = [0u16; SAMPLES_PER_BLOCK];
        synth.fill_block(&sine_params(1_000, 10), &mut block);
        let phase_before = synth.phase();
        synth.fill_block(&sine_params(2_000, 10), &mut block);
        // new frequency advances from the old phase, no reset
        assert_eq!(synth.phase(), (phase_before + 128 * 2_000) % SAMPLE_RATE);
    }

    #[test]
    fn pulse_duty_splits_the_cycle() {
        let mut synth = BlockSynth::new();
        let mut block = [0u16; SAMPLES_PER_BLOCK];
        // 1 kHz: 48-sample cycle; level 10 of 20 -> 24 samples high
        synth.fill_block(&pulse_params(1_000, 10), &mut block);
        let high = block[..96].iter().filter(|&&s| s == DAC_MAX).count();
        assert_eq!(high, 48);
        assert!(block.iter().all(|&s| s == DAC_MAX || s == 0));
    }

    #[test]
    fn pulse_duty_extremes() {
        let mut synth = BlockSynth::new();
        let mut block = [0u16; SAMPLES_PER_BLOCK];
        synth.fill_block(&pulse_params(1_000, 0), &mut block);
        assert!(block.iter().all(|&s| s == 0));
        synth.fill_block(&pulse_params(1_000, MAX_LEVEL), &mut block);
        assert!(block.iter().all(|&s| s == DAC_MAX));
    }
}
