use std::f64::consts::TAU;
use std::time::Duration;

use pdmon_core::time::ManualClock;
use pdmon_core::{DetectorConfig, MotionSample, SeverityLevels};
use pdmon_engine::notify::TREMOR_CHARACTERISTIC_UUID;
use pdmon_engine::{
    EngineConfig, MonitorEngine, SensorRead, SeverityService, SymptomIndicator, TickScheduler,
};

fn tremor_source(total: usize, fail_every: Option<usize>) -> impl FnMut() -> SensorRead {
    let mut index = 0;
    move || {
        if index == total {
            return SensorRead::Exhausted;
        }
        let n = index;
        index += 1;
        if fail_every.is_some_and(|every| n % every == every - 1) {
            return SensorRead::Failed;
        }
        let phase = TAU * 4.0 * n as f64 / 52.0;
        SensorRead::Sample(MotionSample::from_arrays(
            [0.0, 0.0, 1.0 + 0.8 * phase.sin()],
            [30.0 * phase.cos(), 0.0, 0.0],
        ))
    }
}

#[test]
fn ten_second_tremor_session_reports_every_three_seconds() {
    let config = EngineConfig::default();
    let mut service = SeverityService::new();
    let notifications = service.subscribe();
    let mut engine = MonitorEngine::new(DetectorConfig::default(), config.clone(), service);
    let mut scheduler = TickScheduler::new(ManualClock::default(), &config);
    let mut source = tremor_source(526, None);

    let mut reports = Vec::new();
    let summary = scheduler.run(&mut engine, &mut source, |report, at| {
        reports.push((*report, at));
    });

    let times: Vec<Duration> = reports.iter().map(|(_, at)| *at).collect();
    assert_eq!(
        times,
        vec![
            Duration::from_millis(3000),
            Duration::from_millis(6000),
            Duration::from_millis(9000),
        ]
    );
    for (report, _) in &reports {
        assert_eq!(report.levels, SeverityLevels::new(100, 0, 0));
        assert_eq!(report.indicator, SymptomIndicator::Tremor);
        assert!(report.lights.light2);
    }
    assert_eq!(summary.reports, 3);

    // Samples arriving between window completion and the next analysis tick.
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.rejected_samples, 5);
    assert_eq!(snapshot.samples_received, 526);
    assert_eq!(snapshot.windows_analyzed, 3);

    let service = engine.into_sink();
    assert_eq!(service.read(TREMOR_CHARACTERISTIC_UUID), Some(100));
    assert_eq!(notifications.try_iter().count(), 9);
}

#[test]
fn failed_reads_delay_windows_without_corrupting_them() {
    let config = EngineConfig::default();
    let mut engine =
        MonitorEngine::new(DetectorConfig::default(), config.clone(), SeverityService::new());
    let mut scheduler = TickScheduler::new(ManualClock::default(), &config);
    let mut source = tremor_source(400, Some(10));

    let mut reports = Vec::new();
    scheduler.run(&mut engine, &mut source, |report, _| reports.push(*report));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.failed_reads, 40);
    assert_eq!(snapshot.samples_received, 360);
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.levels.freeze == 0));
}
