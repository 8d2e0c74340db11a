use std::time::Duration;

use pdmon_core::logs::{DetectionLog, DetectionLogEntry};
use pdmon_core::DetectorConfig;
use pdmon_engine::{EngineSnapshot, WindowReport};

use crate::output::{IndicatorHistogram, Metadata, ReplayReport, Summary, WindowRecord};
use crate::types::{ImuSample, SessionData};

/// Collects per-window results during a replay
pub struct AnalysisCollector {
    session: SessionData,
    detector: DetectorConfig,
    log: DetectionLog,
    windows: Vec<WindowRecord>,
    indicators: IndicatorHistogram,
    imu_sample_count: usize,
    duration_seconds: f64,
}

impl AnalysisCollector {
    pub fn new(session: SessionData, detector: DetectorConfig) -> Self {
        Self {
            session,
            detector,
            log: DetectionLog::default(),
            windows: Vec::new(),
            indicators: IndicatorHistogram::default(),
            imu_sample_count: 0,
            duration_seconds: 0.0,
        }
    }

    pub fn set_imu_samples(&mut self, samples: &[ImuSample]) {
        self.imu_sample_count = samples.len();
        self.duration_seconds = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => last.timestamp_secs() - first.timestamp_secs(),
            _ => 0.0,
        };
    }

    pub fn add_report(&mut self, report: &WindowReport, at: Duration) {
        let timestamp_seconds = at.as_secs_f64();
        self.log.push(DetectionLogEntry {
            window_index: report.window_index,
            timestamp_seconds,
            result: report.result,
        });
        self.indicators.record(report.indicator);

        let result = &report.result;
        let stats = &result.features.stats;
        self.windows.push(WindowRecord {
            window_index: report.window_index,
            timestamp_seconds,
            dominant_frequency_hz: result.dominant_frequency_hz,
            dominant_magnitude: result.dominant_magnitude,
            tremor_score: result.tremor_score,
            dyskinesia_score: result.dyskinesia_score,
            freeze_score: result.freeze_score,
            levels: report.levels,
            indicator: report.indicator,
            accel_mean_g: stats.accel.mean,
            accel_std_g: stats.accel.std_dev,
            gyro_mean_dps: stats.gyro.mean,
            gyro_std_dps: stats.gyro.std_dev,
        });
    }

    pub fn log(&self) -> &DetectionLog {
        &self.log
    }

    pub fn finalize(self, snapshot: &EngineSnapshot, elapsed: Duration) -> ReplayReport {
        let AnalysisCollector {
            session,
            detector,
            log,
            windows,
            indicators,
            imu_sample_count,
            duration_seconds,
        } = self;

        let trailing_samples = if snapshot.window_complete() {
            0
        } else {
            snapshot.window_fill
        };

        ReplayReport {
            metadata: Metadata {
                session_name: session.name.clone(),
                imu_file: session.imu_file.display().to_string(),
                config_file: session
                    .config_file
                    .as_ref()
                    .map(|p| p.display().to_string()),
                processing_timestamp: chrono::Utc::now().to_rfc3339(),
                imu_sample_count,
                duration_seconds,
                sample_rate_hz: detector.sample_rate_hz,
                window_len: detector.window_len,
                window_seconds: detector.window_seconds(),
            },
            windows,
            summary: Summary {
                windows_analyzed: snapshot.windows_analyzed,
                samples_received: snapshot.samples_received,
                failed_reads: snapshot.failed_reads,
                rejected_samples: snapshot.rejected_samples,
                trailing_samples,
                peak_levels: log.peak_levels(),
                indicators,
                elapsed_seconds: elapsed.as_secs_f64(),
            },
        }
    }
}
