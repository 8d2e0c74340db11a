use serde::{Deserialize, Serialize};

use crate::analysis::{SeverityScores, SpectralPeaks, WindowStats};

/// Severity scores reduced to the bytes delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SeverityLevels {
    pub tremor: u8,
    pub dyskinesia: u8,
    pub freeze: u8,
}

impl SeverityLevels {
    pub const fn new(tremor: u8, dyskinesia: u8, freeze: u8) -> Self {
        Self {
            tremor,
            dyskinesia,
            freeze,
        }
    }

    pub fn from_scores(scores: &SeverityScores) -> Self {
        Self {
            tremor: score_to_level(scores.tremor),
            dyskinesia: score_to_level(scores.dyskinesia),
            freeze: score_to_level(scores.freeze),
        }
    }

    /// Element-wise maximum, used for session peaks.
    pub fn elementwise_max(self, other: Self) -> Self {
        Self {
            tremor: self.tremor.max(other.tremor),
            dyskinesia: self.dyskinesia.max(other.dyskinesia),
            freeze: self.freeze.max(other.freeze),
        }
    }

    pub fn as_bytes(&self) -> [u8; 3] {
        [self.tremor, self.dyskinesia, self.freeze]
    }
}

/// Truncates toward zero and clamps to `[0, 100]`. NaN maps to 0.
pub fn score_to_level(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.trunc().clamp(0.0, 100.0) as u8
}

/// Everything computed for one window besides the headline scores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowFeatures {
    pub peaks: SpectralPeaks,
    pub stats: WindowStats,
}

/// Outcome of analyzing one complete window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub dominant_frequency_hz: f64,
    pub dominant_magnitude: f64,
    pub tremor_score: f64,
    pub dyskinesia_score: f64,
    pub freeze_score: f64,
    pub features: WindowFeatures,
}

impl DetectionResult {
    pub fn from_parts(features: WindowFeatures, scores: SeverityScores) -> Self {
        Self {
            dominant_frequency_hz: features.peaks.dominant.frequency_hz,
            dominant_magnitude: features.peaks.dominant.magnitude,
            tremor_score: scores.tremor,
            dyskinesia_score: scores.dyskinesia,
            freeze_score: scores.freeze,
            features,
        }
    }

    /// Result for a window with no analyzable bins: every score and the dominant frequency are zero.
    pub fn degenerate(stats: WindowStats) -> Self {
        Self {
            features: WindowFeatures {
                peaks: SpectralPeaks::default(),
                stats,
            },
            ..Self::default()
        }
    }

    pub fn scores(&self) -> SeverityScores {
        SeverityScores {
            tremor: self.tremor_score,
            dyskinesia: self.dyskinesia_score,
            freeze: self.freeze_score,
        }
    }

    pub fn levels(&self) -> SeverityLevels {
        SeverityLevels::from_scores(&self.scores())
    }

    pub fn is_freeze(&self) -> bool {
        self.freeze_score > 0.0
    }
}

/// Receives the severity bytes of every analyzed window.
pub trait SeveritySink: Send + 'static {
    fn publish(&mut self, levels: SeverityLevels);
}

impl<S: SeveritySink + ?Sized> SeveritySink for Box<S> {
    fn publish(&mut self, levels: SeverityLevels) {
        (**self).publish(levels)
    }
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SeveritySink for NullSink {
    fn publish(&mut self, _levels: SeverityLevels) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_truncate_and_clamp() {
        assert_eq!(score_to_level(49.99), 49);
        assert_eq!(score_to_level(100.0), 100);
        assert_eq!(score_to_level(250.0), 100);
        assert_eq!(score_to_level(-3.0), 0);
        assert_eq!(score_to_level(f64::NAN), 0);
        assert_eq!(score_to_level(f64::INFINITY), 100);
    }

    #[test]
    fn result_levels_follow_scores() {
        let result = DetectionResult {
            tremor_score: 73.6,
            dyskinesia_score: 0.4,
            freeze_score: 80.0,
            ..DetectionResult::default()
        };
        assert_eq!(result.levels(), SeverityLevels::new(73, 0, 80));
        assert_eq!(result.levels().as_bytes(), [73, 0, 80]);
        assert!(result.is_freeze());
    }

    #[test]
    fn degenerate_result_is_all_zero() {
        let result = DetectionResult::degenerate(WindowStats::default());
        assert_eq!(result.levels(), SeverityLevels::default());
        assert_eq!(result.dominant_frequency_hz, 0.0);
        assert!(!result.is_freeze());
    }

    #[test]
    fn peak_levels_are_elementwise() {
        let a = SeverityLevels::new(10, 50, 0);
        let b = SeverityLevels::new(30, 20, 80);
        assert_eq!(a.elementwise_max(b), SeverityLevels::new(30, 50, 80));
    }
}
