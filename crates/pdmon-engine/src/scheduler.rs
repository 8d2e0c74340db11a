use std::time::Duration;

use log::{debug, info};
use pdmon_core::time::{Clock, PeriodicTrigger};
use pdmon_core::{MotionSample, SeveritySink};

use crate::{EngineConfig, MonitorEngine, WindowReport};

/// Outcome of one sensor poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorRead {
    Sample(MotionSample),
    /// The read failed; the tick is skipped.
    Failed,
    /// No more samples; the run ends.
    Exhausted,
}

impl From<Option<MotionSample>> for SensorRead {
    fn from(sample: Option<MotionSample>) -> Self {
        match sample {
            Some(sample) => Self::Sample(sample),
            None => Self::Failed,
        }
    }
}

/// Anything polled once per sample tick.
pub trait SampleSource {
    fn read(&mut self) -> SensorRead;
}

impl<F> SampleSource for F
where
    F: FnMut() -> SensorRead,
{
    fn read(&mut self) -> SensorRead {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub sample_ticks: u64,
    pub analysis_ticks: u64,
    pub reports: u64,
    pub overruns: u64,
    pub elapsed: Duration,
}

/// Drives the two periodic triggers of a [`MonitorEngine`] from a [`Clock`].
///
/// When both triggers fall due at the same instant the sample tick runs first.
pub struct TickScheduler<C: Clock> {
    clock: C,
    start: Duration,
    sample_trigger: PeriodicTrigger,
    analysis_trigger: PeriodicTrigger,
}

impl<C: Clock> TickScheduler<C> {
    pub fn new(mut clock: C, config: &EngineConfig) -> Self {
        let start = clock.now();
        Self {
            clock,
            start,
            sample_trigger: PeriodicTrigger::new(config.sample_period(), start),
            analysis_trigger: PeriodicTrigger::new(config.analysis_period(), start),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Runs until `source` is exhausted, then gives a last complete window
    /// its analysis. `on_report` receives every report with the elapsed time
    /// of the tick that produced it.
    pub fn run<S, Src, F>(
        &mut self,
        engine: &mut MonitorEngine<S>,
        source: &mut Src,
        mut on_report: F,
    ) -> RunSummary
    where
        S: SeveritySink,
        Src: SampleSource + ?Sized,
        F: FnMut(&WindowReport, Duration),
    {
        let mut summary = RunSummary::default();

        loop {
            let deadline = self
                .sample_trigger
                .next_due()
                .min(self.analysis_trigger.next_due());
            self.clock.sleep_until(deadline);
            let now = self.clock.now();

            if self.sample_trigger.poll(now) {
                summary.sample_ticks += 1;
                match source.read() {
                    SensorRead::Sample(sample) => {
                        engine.sample_tick(Some(sample));
                    }
                    SensorRead::Failed => {
                        engine.sample_tick(None);
                    }
                    SensorRead::Exhausted => {
                        debug!("sample source exhausted after {} ticks", summary.sample_ticks);
                        break;
                    }
                }
            }

            if self.analysis_trigger.poll(now) {
                summary.analysis_ticks += 1;
                if let Some(report) = engine.analysis_tick() {
                    summary.reports += 1;
                    on_report(&report, now - self.start);
                }
            }
        }

        let now = self.clock.now();
        if let Some(report) = engine.analysis_tick() {
            summary.reports += 1;
            on_report(&report, now - self.start);
        }

        summary.overruns = self.sample_trigger.overruns() + self.analysis_trigger.overruns();
        summary.elapsed = now - self.start;
        info!(
            "run finished: {} sample ticks, {} reports, {:.3} s",
            summary.sample_ticks,
            summary.reports,
            summary.elapsed.as_secs_f64()
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingSink;
    use pdmon_core::time::ManualClock;
    use pdmon_core::DetectorConfig;

    fn counting_source(limit: usize) -> impl FnMut() -> SensorRead {
        let mut produced = 0;
        move || {
            if produced == limit {
                return SensorRead::Exhausted;
            }
            produced += 1;
            SensorRead::Sample(MotionSample::from_arrays([0.0, 0.0, 1.0], [0.0; 3]))
        }
    }

    #[test]
    fn ticks_follow_configured_periods() {
        let config = EngineConfig::default();
        let mut engine =
            MonitorEngine::new(DetectorConfig::default(), config.clone(), RecordingSink::new());
        let mut scheduler = TickScheduler::new(ManualClock::default(), &config);
        let mut source = counting_source(100);

        let summary = scheduler.run(&mut engine, &mut source, |_, _| {});

        // 100 samples plus the tick that found the source exhausted.
        assert_eq!(summary.sample_ticks, 101);
        assert_eq!(summary.elapsed, Duration::from_millis(101 * 19));
        assert_eq!(summary.analysis_ticks, 19);
        assert_eq!(summary.reports, 0);
        assert_eq!(summary.overruns, 0);
        assert_eq!(engine.snapshot().samples_received, 100);
    }

    #[test]
    fn last_window_is_flushed_when_source_ends() {
        let mut detector_config = DetectorConfig::default();
        detector_config.window_len = 20;
        let config = EngineConfig::default();
        let mut engine = MonitorEngine::new(detector_config, config.clone(), RecordingSink::new());
        let mut scheduler = TickScheduler::new(ManualClock::default(), &config);
        let mut source = counting_source(20);

        let mut reports = Vec::new();
        let summary = scheduler.run(&mut engine, &mut source, |report, at| {
            reports.push((report.window_index, at))
        });

        // Window completes at 380 ms, before the 400 ms analysis tick; the
        // source is exhausted at 399 ms and the flush picks it up.
        assert_eq!(summary.reports, 1);
        assert_eq!(reports, vec![(0, Duration::from_millis(399))]);
    }
}
