//! Conversion of raw accelerometer/gyroscope register counts.
//!
//! The sensor's output registers hold signed 16-bit little-endian words, the
//! gyroscope block (`OUTX_L_G`, 0x22) immediately followed by the
//! accelerometer block (`OUTX_L_A`, 0x28). A burst read of 12 bytes starting
//! at 0x22 therefore yields `gx gy gz ax ay az`.

use pdmon_core::MotionSample;
use serde::{Deserialize, Serialize};

/// Length of one gyroscope + accelerometer burst read.
pub const RAW_BLOCK_LEN: usize = 12;

/// Sensitivities for the configured full-scale ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawScale {
    /// ±2 g range: 0.061 mg per LSB.
    pub accel_mg_per_lsb: f64,
    /// ±250 dps range: 8.75 mdps per LSB.
    pub gyro_mdps_per_lsb: f64,
}

impl Default for RawScale {
    fn default() -> Self {
        Self {
            accel_mg_per_lsb: 0.061,
            gyro_mdps_per_lsb: 8.75,
        }
    }
}

impl RawScale {
    pub fn accel_g(&self, count: i16) -> f64 {
        f64::from(count) * self.accel_mg_per_lsb / 1000.0
    }

    pub fn gyro_dps(&self, count: i16) -> f64 {
        f64::from(count) * self.gyro_mdps_per_lsb / 1000.0
    }

    pub fn from_counts(&self, accel: [i16; 3], gyro: [i16; 3]) -> MotionSample {
        MotionSample::from_arrays(accel.map(|c| self.accel_g(c)), gyro.map(|c| self.gyro_dps(c)))
    }

    /// Decodes one burst read in register order (gyroscope first).
    pub fn decode_block(&self, block: &[u8; RAW_BLOCK_LEN]) -> MotionSample {
        let word = |i: usize| i16::from_le_bytes([block[2 * i], block[2 * i + 1]]);
        let gyro = [word(0), word(1), word(2)];
        let accel = [word(3), word(4), word(5)];
        self.from_counts(accel, gyro)
    }
}
