pub mod errors;
pub mod indicator;
pub mod notify;
pub mod scheduler;
pub mod telemetry;
pub mod types;
pub mod worker;

use std::time::Duration;

use log::{debug, info};
use pdmon_core::{Detector, DetectorConfig, MotionSample, SeveritySink, WindowState};
use serde::{Deserialize, Serialize};

pub use errors::{EngineError, Result};
pub use indicator::{IndicatorLights, SymptomIndicator, DEFAULT_FREEZE_THRESHOLD};
pub use notify::{LogSink, RecordingSink, SeverityService};
pub use scheduler::{RunSummary, SampleSource, SensorRead, TickScheduler};
pub use types::{EngineSnapshot, WindowReport};
pub use worker::{AnalysisWorker, WindowHandoff, WindowProducer, WorkerSummary};

/// Scheduling and reporting constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sensor polling period.
    pub sample_period_ms: u64,
    /// Period of the analysis trigger that consumes complete windows.
    pub analysis_period_ms: u64,
    /// Emit a raw telemetry line whenever the window position is a multiple of this. Zero disables.
    pub raw_trace_interval: usize,
    /// Freeze level from which the indicator shows a freeze.
    pub indicator_freeze_threshold: u8,
    /// Emit the `>name:value` plot lines after each analysis line.
    pub plot_lines: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_period_ms: 19,
            analysis_period_ms: 100,
            raw_trace_interval: 50,
            indicator_freeze_threshold: DEFAULT_FREEZE_THRESHOLD,
            plot_lines: true,
        }
    }
}

impl EngineConfig {
    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms.max(1))
    }

    pub fn analysis_period(&self) -> Duration {
        Duration::from_millis(self.analysis_period_ms.max(1))
    }
}

/// Cooperative monitor: the sample tick feeds the detector, the analysis tick
/// consumes complete windows and publishes their levels to the sink.
///
/// Both ticks run on the caller's thread and never block.
pub struct MonitorEngine<S: SeveritySink> {
    config: EngineConfig,
    detector: Detector,
    sink: S,
    telemetry: Vec<String>,
    samples_received: u64,
    failed_reads: u64,
    last_report: Option<WindowReport>,
}

impl<S: SeveritySink> MonitorEngine<S> {
    /// Construct an engine without validating `detector_config`.
    pub fn new(detector_config: DetectorConfig, config: EngineConfig, sink: S) -> Self {
        info!(
            "monitor engine: fs={} Hz N={} ({:.2} s), sample every {} ms, analysis every {} ms",
            detector_config.sample_rate_hz,
            detector_config.window_len,
            detector_config.window_seconds(),
            config.sample_period_ms,
            config.analysis_period_ms
        );
        Self {
            config,
            detector: Detector::new(detector_config),
            sink,
            telemetry: Vec::new(),
            samples_received: 0,
            failed_reads: 0,
            last_report: None,
        }
    }

    pub fn try_new(detector_config: DetectorConfig, config: EngineConfig, sink: S) -> Result<Self> {
        detector_config.validate()?;
        Ok(Self::new(detector_config, config, sink))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Feeds one sensor read. `None` is a failed read and is only counted.
    /// Returns `true` when this sample completed a window.
    pub fn sample_tick(&mut self, sample: Option<MotionSample>) -> bool {
        let Some(sample) = sample else {
            self.failed_reads += 1;
            return false;
        };

        if let WindowState::Filling(position) = self.detector.state() {
            let interval = self.config.raw_trace_interval;
            if interval > 0 && position % interval == 0 {
                let line = telemetry::raw_line(&sample);
                debug!("{}", line);
                self.telemetry.push(line);
            }
        }

        self.samples_received += 1;
        self.detector.push(&sample)
    }

    /// Analyzes the pending window, if any, and publishes its levels.
    pub fn analysis_tick(&mut self) -> Option<WindowReport> {
        let result = self.detector.analyze()?;
        let window_index = self.detector.windows_analyzed() - 1;
        let report = WindowReport::new(
            window_index,
            result,
            self.config.indicator_freeze_threshold,
        );

        self.sink.publish(report.levels);

        let line = telemetry::analysis_line(&report.result);
        info!("{}", line);
        self.telemetry.push(line);
        if self.config.plot_lines {
            self.telemetry.extend(telemetry::plot_lines(&report.result));
        }

        self.last_report = Some(report);
        Some(report)
    }

    /// Replaces the detector configuration; see [`Detector::reconfigure`].
    pub fn reconfigure(&mut self, detector_config: DetectorConfig) {
        self.detector.reconfigure(detector_config);
    }

    pub fn last_report(&self) -> Option<&WindowReport> {
        self.last_report.as_ref()
    }

    /// Drains the telemetry lines produced since the last call.
    pub fn take_telemetry(&mut self) -> Vec<String> {
        std::mem::take(&mut self.telemetry)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let window_len = self.detector.window_len();
        EngineSnapshot {
            samples_received: self.samples_received,
            failed_reads: self.failed_reads,
            rejected_samples: self.detector.rejected_samples(),
            windows_analyzed: self.detector.windows_analyzed(),
            window_fill: types::report::window_fill(self.detector.state(), window_len),
            window_len,
            last_levels: self.last_report.map(|r| r.levels),
            last_indicator: self.last_report.map(|r| r.indicator),
        }
    }
}
