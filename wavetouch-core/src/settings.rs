//! persisted settings blob: postcard-encoded parameters plus a 16-bit
//! byte-sum checksum, sized to one EEPROM page

use crate::params::{WaveParams, MAX_FREQ_HZ, MAX_LEVEL, MIN_FREQ_HZ};

/// fixed EEPROM footprint; checksum lives in the last two bytes
pub const BLOB_LEN: usize = 32;

/// Encode parameters into a settings blob. Unused space is zeroed so
/// the checksum covers a deterministic image.
pub fn encode(params: &WaveParams, blob: &mut [u8; BLOB_LEN]) -> Result<(), postcard::Error> {
    blob.fill(0);
    postcard::to_slice(params, &mut blob[..BLOB_LEN - 2])?;
    let sum = checksum(&blob[..BLOB_LEN - 2]);
    blob[BLOB_LEN - 2..].copy_from_slice(&sum.to_le_bytes());
    Ok(())
}

/// Decode a settings blob read back from the store. A checksum
/// mismatch, undecodable payload or out-of-range value silently
/// falls back to the factory defaults, matching first-boot behavior
/// on a blank part.
pub fn decode(blob: &[u8; BLOB_LEN]) -> WaveParams {
    let stored = u16::from_le_bytes([blob[BLOB_LEN - 2], blob[BLOB_LEN - 1]]);
    if stored != checksum(&blob[..BLOB_LEN - 2]) {
        return WaveParams::default_values();
    }
    match postcard::from_bytes::<WaveParams>(&blob[..BLOB_LEN - 2]) {
        Ok(params) if in_range(&params) => params,
        _ => WaveParams::default_values(),
    }
}

fn in_range(params: &WaveParams) -> bool {
    (MIN_FREQ_HZ..=MAX_FREQ_HZ).contains(&params.sine_freq)
        && (MIN_FREQ_HZ..=MAX_FREQ_HZ).contains(&params.pulse_freq)
        && params.sine_amp <= MAX_LEVEL
        && params.pulse_duty <= MAX_LEVEL
}

fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::WaveMode;

    fn sample_params() -> WaveParams {
        WaveParams {
            sine_freq: 2_400,
            pulse_freq: 60,
            sine_amp: 3,
            pulse_duty: 19,
            mode: WaveMode::Pulse,
        }
    }

    #[test]
    fn roundtrip() {
        let mut blob = [0u8; BLOB_LEN];
        encode(&sample_params(), &mut blob).unwrap();
        assert_eq!(decode(&blob), sample_params());
    }

    #[test]
    fn corruption_falls_back_to_defaults() {
        let mut blob = [0u8; BLOB_LEN];
        encode(&sample_params(), &mut blob).unwrap();
        blob[1] ^= 0x40;
        assert_eq!(decode(&blob), WaveParams::default_values());
    }

    #[test]
    fn blank_part_reads_as_defaults() {
        // fresh EEPROM comes up all ones
        let blob = [0xffu8; BLOB_LEN];
        assert_eq!(decode(&blob), WaveParams::default_values());
    }

    #[test]
    fn out_of_range_values_fall_back_to_defaults() {
        let mut params = sample_params();
        params.sine_freq = MAX_FREQ_HZ + 1;
        let mut blob = [0u8; BLOB_LEN];
        encode(&params, &mut blob).unwrap();
        assert_eq!(decode(&blob), WaveParams::default_values());
    }
}
