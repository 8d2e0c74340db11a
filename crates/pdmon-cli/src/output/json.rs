use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use pdmon_core::SeverityLevels;
use pdmon_engine::SymptomIndicator;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Complete replay output in JSON format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub metadata: Metadata,
    pub windows: Vec<WindowRecord>,
    pub summary: Summary,
}

impl ReplayReport {
    /// Write the report as pretty-printed JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub session_name: String,
    pub imu_file: String,
    pub config_file: Option<String>,
    pub processing_timestamp: String,
    pub imu_sample_count: usize,
    /// Span of the CSV timestamps
    pub duration_seconds: f64,
    pub sample_rate_hz: f64,
    pub window_len: usize,
    pub window_seconds: f64,
}

/// One analyzed window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowRecord {
    pub window_index: u64,
    /// Scheduler time of the analysis tick that produced the window
    pub timestamp_seconds: f64,
    pub dominant_frequency_hz: f64,
    pub dominant_magnitude: f64,
    pub tremor_score: f64,
    pub dyskinesia_score: f64,
    pub freeze_score: f64,
    pub levels: SeverityLevels,
    pub indicator: SymptomIndicator,
    pub accel_mean_g: f64,
    pub accel_std_g: f64,
    pub gyro_mean_dps: f64,
    pub gyro_std_dps: f64,
}

/// Number of windows attributed to each symptom
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorHistogram {
    pub freeze: usize,
    pub tremor: usize,
    pub dyskinesia: usize,
}

impl IndicatorHistogram {
    pub fn record(&mut self, indicator: SymptomIndicator) {
        match indicator {
            SymptomIndicator::Freeze => self.freeze += 1,
            SymptomIndicator::Tremor => self.tremor += 1,
            SymptomIndicator::Dyskinesia => self.dyskinesia += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.freeze + self.tremor + self.dyskinesia
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub windows_analyzed: u64,
    pub samples_received: u64,
    pub failed_reads: u64,
    /// Samples pushed while a complete window was waiting for analysis
    pub rejected_samples: u64,
    /// Samples still in the unfinished last window
    pub trailing_samples: usize,
    pub peak_levels: SeverityLevels,
    pub indicators: IndicatorHistogram,
    pub elapsed_seconds: f64,
}
