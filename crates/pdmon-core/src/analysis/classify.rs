use serde::{Deserialize, Serialize};

use super::spectral::SpectralPeaks;
use super::stats::WindowStats;
use crate::config::DetectorConfig;

/// Upper bound of every severity score.
pub const MAX_SCORE: f64 = 100.0;

/// The three per-window severity scores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeverityScores {
    pub tremor: f64,
    pub dyskinesia: f64,
    pub freeze: f64,
}

/// `min(100, magnitude / reference · 100)`.
///
/// Written as a comparison rather than `f64::min` so a NaN ratio stays NaN.
#[inline]
pub fn normalized_score(magnitude: f64, reference: f64) -> f64 {
    let score = magnitude / reference * MAX_SCORE;
    if score > MAX_SCORE {
        MAX_SCORE
    } else {
        score
    }
}

/// True when both magnitude sequences are quieter than their thresholds.
pub fn is_frozen(stats: &WindowStats, config: &DetectorConfig) -> bool {
    stats.accel.std_dev < config.accel_std_threshold_g
        && stats.gyro.std_dev < config.gyro_std_threshold_dps
}

/// Maps spectral peaks and time-domain spread to scores.
pub fn classify(
    peaks: &SpectralPeaks,
    stats: &WindowStats,
    config: &DetectorConfig,
) -> SeverityScores {
    SeverityScores {
        tremor: normalized_score(peaks.tremor.magnitude, config.tremor_reference),
        dyskinesia: normalized_score(peaks.dyskinesia.magnitude, config.dyskinesia_reference),
        freeze: if is_frozen(stats, config) {
            config.freeze_score
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::spectral::BandPeak;
    use crate::analysis::stats::Moments;
    use approx::assert_relative_eq;

    fn stats(accel_std: f64, gyro_std: f64) -> WindowStats {
        WindowStats {
            accel: Moments {
                mean: 1.0,
                std_dev: accel_std,
            },
            gyro: Moments {
                mean: 0.0,
                std_dev: gyro_std,
            },
        }
    }

    #[test]
    fn score_is_linear_below_reference() {
        assert_relative_eq!(normalized_score(25.0, 50.0), 50.0);
        assert_relative_eq!(normalized_score(0.0, 50.0), 0.0);
        assert_relative_eq!(normalized_score(50.0, 50.0), 100.0);
    }

    #[test]
    fn score_clamps_to_exactly_one_hundred() {
        assert_eq!(normalized_score(50.000_1, 50.0), 100.0);
        assert_eq!(normalized_score(1e9, 50.0), 100.0);
        assert_eq!(normalized_score(f64::INFINITY, 50.0), 100.0);
    }

    #[test]
    fn nan_magnitude_stays_nan() {
        assert!(normalized_score(f64::NAN, 50.0).is_nan());
    }

    #[test]
    fn freeze_requires_both_domains_still() {
        let config = DetectorConfig::default();
        assert!(is_frozen(&stats(0.01, 1.0), &config));
        assert!(!is_frozen(&stats(0.03, 1.0), &config));
        assert!(!is_frozen(&stats(0.01, 3.0), &config));
        assert!(!is_frozen(&stats(f64::NAN, 0.0), &config));
    }

    #[test]
    fn classify_uses_configured_constants() {
        let mut config = DetectorConfig::default();
        config.tremor_reference = 20.0;
        config.freeze_score = 65.0;
        let peaks = SpectralPeaks {
            dominant: BandPeak {
                frequency_hz: 4.0,
                magnitude: 10.0,
            },
            tremor: BandPeak {
                frequency_hz: 4.0,
                magnitude: 10.0,
            },
            dyskinesia: BandPeak {
                frequency_hz: 6.0,
                magnitude: 5.0,
            },
        };
        let scores = classify(&peaks, &stats(0.0, 0.0), &config);
        assert_relative_eq!(scores.tremor, 50.0);
        assert_relative_eq!(scores.dyskinesia, 10.0);
        assert_eq!(scores.freeze, 65.0);
    }
}
