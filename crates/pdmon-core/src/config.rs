use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Nominal sensor output data rate.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 52.0;
/// Nominal analysis window length.
pub const DEFAULT_WINDOW_SECONDS: f64 = 3.0;

/// Errors raised when a detector configuration cannot produce meaningful scores.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f64),

    #[error("analysis band limit must be finite and non-negative, got {0}")]
    InvalidAnalysisLimit(f64),

    #[error("{name} reference magnitude must be finite and positive, got {value}")]
    InvalidReference { name: &'static str, value: f64 },

    #[error("{name} threshold must be finite and non-negative, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("{name} band is invalid: [{low_hz}, {high_hz}] Hz")]
    InvalidBand {
        name: &'static str,
        low_hz: f64,
        high_hz: f64,
    },

    #[error("freeze score must lie in [0, 100], got {0}")]
    InvalidFreezeScore(f64),
}

/// Frequency interval used to attribute spectral peaks to a symptom.
///
/// The upper edge is always inclusive. The lower edge is inclusive only when
/// `include_low` is set, which lets two adjacent bands share a boundary
/// without both claiming it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub low_hz: f64,
    pub high_hz: f64,
    #[serde(default)]
    pub include_low: bool,
}

impl FrequencyBand {
    /// `[low, high]`
    pub const fn closed(low_hz: f64, high_hz: f64) -> Self {
        Self {
            low_hz,
            high_hz,
            include_low: true,
        }
    }

    /// `(low, high]`
    pub const fn left_open(low_hz: f64, high_hz: f64) -> Self {
        Self {
            low_hz,
            high_hz,
            include_low: false,
        }
    }

    pub fn contains(&self, frequency_hz: f64) -> bool {
        let above_low = if self.include_low {
            frequency_hz >= self.low_hz
        } else {
            frequency_hz > self.low_hz
        };
        above_low && frequency_hz <= self.high_hz
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.low_hz.is_finite() || !self.high_hz.is_finite() || self.low_hz > self.high_hz {
            return Err(ConfigError::InvalidBand {
                name,
                low_hz: self.low_hz,
                high_hz: self.high_hz,
            });
        }
        Ok(())
    }
}

/// Tuning surface of the windowed detector.
///
/// Every field can be changed between windows. Bands and references need
/// per-subject calibration; the defaults are starting points, not validated
/// clinical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Sensor output data rate in Hz.
    pub sample_rate_hz: f64,
    /// Window length `N` in samples.
    pub window_len: usize,
    /// Upper edge of the analyzed band. Bins above `min(this, Nyquist)` are never evaluated.
    pub max_analysis_hz: f64,
    /// Tremor sub-band, nominally `[3, 5]` Hz.
    pub tremor_band: FrequencyBand,
    /// Dyskinesia sub-band, nominally `(5, 7]` Hz.
    pub dyskinesia_band: FrequencyBand,
    /// Spectral magnitude mapped to a tremor score of 100.
    pub tremor_reference: f64,
    /// Spectral magnitude mapped to a dyskinesia score of 100.
    pub dyskinesia_reference: f64,
    /// Acceleration-magnitude standard deviation below which the body counts as still (g).
    pub accel_std_threshold_g: f64,
    /// Angular-rate-magnitude standard deviation below which the body counts as still (dps).
    pub gyro_std_threshold_dps: f64,
    /// Score reported while a freeze is detected.
    pub freeze_score: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::with_window_seconds(DEFAULT_SAMPLE_RATE_HZ, DEFAULT_WINDOW_SECONDS)
    }
}

impl DetectorConfig {
    /// Builds the nominal configuration for a given rate and window duration,
    /// with `N = round(fs * window_seconds)`.
    pub fn with_window_seconds(sample_rate_hz: f64, window_seconds: f64) -> Self {
        Self {
            sample_rate_hz,
            window_len: window_len_for(sample_rate_hz, window_seconds),
            max_analysis_hz: 10.0,
            tremor_band: FrequencyBand::closed(3.0, 5.0),
            dyskinesia_band: FrequencyBand::left_open(5.0, 7.0),
            tremor_reference: 50.0,
            dyskinesia_reference: 50.0,
            accel_std_threshold_g: 0.03,
            gyro_std_threshold_dps: 3.0,
            freeze_score: 80.0,
        }
    }

    /// Window duration implied by `window_len` and `sample_rate_hz`.
    pub fn window_seconds(&self) -> f64 {
        if self.sample_rate_hz > 0.0 {
            self.window_len as f64 / self.sample_rate_hz
        } else {
            0.0
        }
    }

    /// Width of one frequency bin in Hz.
    pub fn bin_width_hz(&self) -> f64 {
        if self.window_len == 0 {
            0.0
        } else {
            self.sample_rate_hz / self.window_len as f64
        }
    }

    /// Checks that the configuration yields finite, bounded scores.
    ///
    /// A zero-length window and bands lying outside `[0, Nyquist]` are
    /// accepted: the detector degrades to zero scores for them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate_hz));
        }
        if !self.max_analysis_hz.is_finite() || self.max_analysis_hz < 0.0 {
            return Err(ConfigError::InvalidAnalysisLimit(self.max_analysis_hz));
        }

        self.tremor_band.validate("tremor")?;
        self.dyskinesia_band.validate("dyskinesia")?;

        for (name, value) in [
            ("tremor", self.tremor_reference),
            ("dyskinesia", self.dyskinesia_reference),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidReference { name, value });
            }
        }

        for (name, value) in [
            ("acceleration std", self.accel_std_threshold_g),
            ("angular-rate std", self.gyro_std_threshold_dps),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if !(0.0..=100.0).contains(&self.freeze_score) {
            return Err(ConfigError::InvalidFreezeScore(self.freeze_score));
        }

        Ok(())
    }
}

/// `round(fs * window_seconds)`, saturating to zero for non-finite or negative products.
pub fn window_len_for(sample_rate_hz: f64, window_seconds: f64) -> usize {
    let samples = (sample_rate_hz * window_seconds).round();
    if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    }
}
