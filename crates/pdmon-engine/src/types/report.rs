use pdmon_core::{DetectionResult, SeverityLevels, WindowState};
use serde::{Deserialize, Serialize};

use crate::indicator::{IndicatorLights, SymptomIndicator};

/// Everything the engine publishes for one analyzed window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub window_index: u64,
    pub result: DetectionResult,
    pub levels: SeverityLevels,
    pub indicator: SymptomIndicator,
    pub lights: IndicatorLights,
}

impl WindowReport {
    pub fn new(window_index: u64, result: DetectionResult, freeze_threshold: u8) -> Self {
        let levels = result.levels();
        let indicator = SymptomIndicator::from_levels(&levels, freeze_threshold);
        Self {
            window_index,
            result,
            levels,
            indicator,
            lights: indicator.lights(),
        }
    }
}

/// Counters of the engine at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub samples_received: u64,
    pub failed_reads: u64,
    pub rejected_samples: u64,
    pub windows_analyzed: u64,
    /// Samples in the window currently filling, or `N` if it awaits analysis.
    pub window_fill: usize,
    pub window_len: usize,
    pub last_levels: Option<SeverityLevels>,
    pub last_indicator: Option<SymptomIndicator>,
}

impl EngineSnapshot {
    pub fn window_complete(&self) -> bool {
        self.window_len > 0 && self.window_fill == self.window_len
    }
}

pub(crate) fn window_fill(state: WindowState, window_len: usize) -> usize {
    match state {
        WindowState::Filling(count) => count,
        WindowState::Complete => window_len,
    }
}
