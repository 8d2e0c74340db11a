pub mod errors;
pub mod imu;
pub mod output;
pub mod types;

use std::path::{Path, PathBuf};

use log::info;
use pdmon_core::time::ManualClock;
use pdmon_core::SeverityLevels;
use pdmon_engine::{MonitorEngine, SensorRead, SeverityService, TickScheduler};

use crate::errors::{ReplayError, Result};
use crate::imu::ImuParser;
use crate::output::{AnalysisCollector, ReplayReport};
use crate::types::{ImuSample, MonitorConfig, SessionData};

/// Everything one replay produces
#[derive(Debug, Clone)]
pub struct ReplayOutput {
    pub report: ReplayReport,
    /// Raw, analysis and plot lines in emission order
    pub telemetry: Vec<String>,
    /// Characteristic values of the notification service after the last window
    pub final_levels: SeverityLevels,
    /// Notifications delivered to a subscribed observer
    pub notifications: usize,
}

/// Replays recorded sessions through the monitor engine on a simulated clock
pub struct SessionReplayer {
    config: MonitorConfig,
}

impl SessionReplayer {
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Parse and replay a CSV session or register dump
    pub fn replay_file<P: AsRef<Path>>(
        &self,
        imu_path: P,
        config_path: Option<PathBuf>,
    ) -> Result<ReplayOutput> {
        let session = SessionData::new(imu_path.as_ref().to_path_buf(), config_path);
        info!("Replaying session: {}", session.name);

        let samples = ImuParser::new(&self.config.input)
            .with_sample_period(self.config.engine.sample_period())
            .parse_file(&session.imu_file)?;
        self.replay_samples(session, &samples)
    }

    /// Feed one row per sample tick, a failed row as a failed read.
    ///
    /// Rows are consumed at the configured sample period; the CSV timestamps
    /// are only reported, not used for pacing.
    pub fn replay_samples(&self, session: SessionData, samples: &[ImuSample]) -> Result<ReplayOutput> {
        if samples.is_empty() {
            return Err(ReplayError::EmptySession);
        }

        let mut service = SeverityService::new();
        let observer = service.subscribe();
        let mut engine = MonitorEngine::try_new(
            self.config.detector.clone(),
            self.config.engine.clone(),
            service,
        )?;
        let mut scheduler = TickScheduler::new(ManualClock::default(), &self.config.engine);

        let mut analysis = AnalysisCollector::new(session, self.config.detector.clone());
        analysis.set_imu_samples(samples);

        let mut rows = samples.iter();
        let mut source = move || match rows.next() {
            Some(row) => SensorRead::from(row.reading),
            None => SensorRead::Exhausted,
        };
        let summary = scheduler.run(&mut engine, &mut source, |report, at| {
            analysis.add_report(report, at);
        });

        let snapshot = engine.snapshot();
        let telemetry = engine.take_telemetry();
        let final_levels = engine.sink().levels();
        let notifications = observer.try_iter().count();

        info!(
            "Replay complete: {} windows, {} samples, {} failed reads, {} rejected",
            snapshot.windows_analyzed,
            snapshot.samples_received,
            snapshot.failed_reads,
            snapshot.rejected_samples
        );

        Ok(ReplayOutput {
            report: analysis.finalize(&snapshot, summary.elapsed),
            telemetry,
            final_levels,
            notifications,
        })
    }
}
