//! Analysis on a dedicated thread behind a double-buffered handoff.
//!
//! Exactly two [`WindowStorage`]s circulate. The producer fills one while the
//! worker analyzes the other; a full buffer travels to the worker over a
//! bounded channel and comes back empty over a return channel. The producer
//! never blocks: if the window completes while the other buffer is still
//! being analyzed, the complete window stays frozen and further samples are
//! rejected and counted until the buffer returns.
//!
//! Configuration changes travel with the buffers. A new configuration is
//! attached to the first window filled under it, so the worker switches its
//! analyzer exactly at that window and never analyzes a window with
//! parameters it was not sampled under.

use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use pdmon_core::{
    DetectionResult, DetectorConfig, MagnitudePair, MotionSample, SeveritySink, WindowAnalyzer,
    WindowBuffer, WindowStorage,
};

use crate::{EngineError, Result};

/// A full window on its way to the worker.
#[derive(Debug)]
pub struct WindowHandoff {
    pub storage: WindowStorage,
    /// Configuration the window was sampled under, when it differs from the
    /// previous window's.
    pub config: Option<DetectorConfig>,
}

/// Sample-side half of the handoff.
pub struct WindowProducer {
    window: WindowBuffer,
    spare: Option<WindowStorage>,
    full_tx: SyncSender<WindowHandoff>,
    recycle_rx: Receiver<WindowStorage>,
    windows_sent: u64,
    /// Applied to the window being filled, sent with it.
    pending: Option<DetectorConfig>,
    /// Waiting for the complete window to be handed off.
    deferred: Option<DetectorConfig>,
}

impl WindowProducer {
    /// Reduces and appends one sample, handing a complete window to the worker
    /// as soon as a free buffer is available.
    /// Returns `true` if this sample completed a window.
    pub fn push(&mut self, sample: &MotionSample) -> Result<bool> {
        self.push_magnitudes(sample.magnitudes())
    }

    pub fn push_magnitudes(&mut self, pair: MagnitudePair) -> Result<bool> {
        self.try_handoff()?;
        let completed = self.window.push(pair);
        if completed {
            self.try_handoff()?;
        }
        Ok(completed)
    }

    fn try_handoff(&mut self) -> Result<()> {
        if !self.window.is_complete() {
            return Ok(());
        }
        if self.spare.is_none() {
            match self.recycle_rx.try_recv() {
                Ok(storage) => self.spare = Some(storage),
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(EngineError::WorkerDisconnected),
            }
        }
        let Some(spare) = self.spare.take() else {
            return Ok(());
        };
        match self.window.swap_complete(spare) {
            Ok(full) => {
                let handoff = WindowHandoff {
                    storage: full,
                    config: self.pending.take(),
                };
                // Only one buffer can be in flight, so the bounded slot is free.
                self.full_tx
                    .send(handoff)
                    .map_err(|_| EngineError::WorkerDisconnected)?;
                self.windows_sent += 1;
                if let Some(config) = self.deferred.take() {
                    self.stage(config);
                }
            }
            Err(spare) => self.spare = Some(spare),
        }
        Ok(())
    }

    /// Switches to `config` from the next window on.
    ///
    /// A complete window waiting for a free buffer is still handed off under
    /// the configuration it was sampled with. A change of `N` discards the
    /// partial window.
    pub fn reconfigure(&mut self, config: DetectorConfig) {
        if self.window.is_complete() {
            debug!("window awaiting handoff, deferring reconfiguration");
            self.deferred = Some(config);
        } else {
            self.deferred = None;
            self.stage(config);
        }
    }

    fn stage(&mut self, config: DetectorConfig) {
        if config.window_len != self.window.window_len() {
            info!(
                "window length {} -> {} samples, discarding {} buffered",
                self.window.window_len(),
                config.window_len,
                self.window.filled()
            );
            self.window.resize(config.window_len);
        }
        self.pending = Some(config);
    }

    /// Samples dropped because both buffers were busy.
    pub fn dropped(&self) -> u64 {
        self.window.rejected()
    }

    pub fn windows_sent(&self) -> u64 {
        self.windows_sent
    }

    /// Hands over a window that completed while both buffers were busy,
    /// waiting for the worker to free one. Used before shutdown.
    pub fn flush(&mut self) -> Result<()> {
        if self.window.is_complete() && self.spare.is_none() {
            let storage = self
                .recycle_rx
                .recv()
                .map_err(|_| EngineError::WorkerDisconnected)?;
            self.spare = Some(storage);
        }
        self.try_handoff()
    }
}

/// Totals reported by the worker thread when it exits.
#[derive(Debug)]
pub struct WorkerSummary<S> {
    pub sink: S,
    pub windows_analyzed: u64,
}

/// Analysis-side half of the handoff.
pub struct AnalysisWorker<S: SeveritySink> {
    handle: JoinHandle<WorkerSummary<S>>,
    results_rx: Receiver<DetectionResult>,
}

impl<S: SeveritySink> AnalysisWorker<S> {
    /// Starts the worker thread and returns the producer feeding it.
    pub fn spawn(config: DetectorConfig, sink: S) -> Result<(WindowProducer, Self)> {
        let window_len = config.window_len;
        let (full_tx, full_rx) = mpsc::sync_channel::<WindowHandoff>(1);
        let (recycle_tx, recycle_rx) = mpsc::channel::<WindowStorage>();
        let (results_tx, results_rx) = mpsc::channel::<DetectionResult>();

        let analyzer = WindowAnalyzer::new(config);
        let handle = thread::Builder::new()
            .name("pdmon-analysis".to_string())
            .spawn(move || analysis_loop(analyzer, sink, full_rx, recycle_tx, results_tx))?;

        info!("analysis worker started (N={})", window_len);

        let producer = WindowProducer {
            window: WindowBuffer::new(window_len),
            spare: Some(WindowStorage::with_len(window_len)),
            full_tx,
            recycle_rx,
            windows_sent: 0,
            pending: None,
            deferred: None,
        };
        Ok((producer, Self { handle, results_rx }))
    }

    /// Results analyzed so far, without blocking.
    pub fn try_results(&self) -> Vec<DetectionResult> {
        self.results_rx.try_iter().collect()
    }

    /// Closes the producer, waits for the worker to drain and returns the
    /// remaining results with the worker's summary.
    pub fn shutdown(
        self,
        mut producer: WindowProducer,
    ) -> Result<(Vec<DetectionResult>, WorkerSummary<S>)> {
        if let Err(err) = producer.flush() {
            warn!("could not flush final window: {}", err);
        }
        drop(producer);
        let summary = self.handle.join().map_err(|_| EngineError::WorkerPanicked)?;
        let results = self.results_rx.try_iter().collect();
        Ok((results, summary))
    }
}

fn analysis_loop<S: SeveritySink>(
    mut analyzer: WindowAnalyzer,
    mut sink: S,
    full_rx: Receiver<WindowHandoff>,
    recycle_tx: Sender<WindowStorage>,
    results_tx: Sender<DetectionResult>,
) -> WorkerSummary<S> {
    let mut windows_analyzed = 0;
    for WindowHandoff { storage, config } in full_rx {
        if let Some(config) = config {
            debug!("worker switching configuration (N={})", config.window_len);
            analyzer.reconfigure(config);
        }
        let result = analyzer.analyze(storage.view());
        windows_analyzed += 1;
        sink.publish(result.levels());
        debug!(
            "worker analyzed window {}: f_dom={:.2} Hz",
            windows_analyzed, result.dominant_frequency_hz
        );
        // Either side may already be gone during shutdown.
        let _ = results_tx.send(result);
        let _ = recycle_tx.send(storage);
    }
    WorkerSummary {
        sink,
        windows_analyzed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingSink;
    use pdmon_core::SeverityLevels;

    #[test]
    fn windows_round_trip_through_worker() {
        let mut config = DetectorConfig::default();
        config.window_len = 32;
        let sink = RecordingSink::new();
        let (mut producer, worker) = AnalysisWorker::spawn(config, sink.clone()).unwrap();

        let still = MotionSample::from_arrays([0.0, 0.0, 1.0], [0.0; 3]);
        let mut completed = 0;
        for _ in 0..32 {
            if producer.push(&still).unwrap() {
                completed += 1;
            }
        }
        assert_eq!(completed, 1);
        assert_eq!(producer.windows_sent(), 1);

        let (results, summary) = worker.shutdown(producer).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(summary.windows_analyzed, 1);
        assert_eq!(sink.published(), vec![SeverityLevels::new(0, 0, 80)]);
    }

    #[test]
    fn reconfiguration_rides_with_the_next_window() {
        let mut config = DetectorConfig::default();
        config.window_len = 32;
        let sink = RecordingSink::new();
        let (mut producer, worker) = AnalysisWorker::spawn(config.clone(), sink.clone()).unwrap();
        let still = MotionSample::from_arrays([0.0, 0.0, 1.0], [0.0; 3]);

        for _ in 0..10 {
            producer.push(&still).unwrap();
        }
        config.window_len = 16;
        config.freeze_score = 60.0;
        producer.reconfigure(config);

        let mut completed = 0;
        for _ in 0..16 {
            if producer.push(&still).unwrap() {
                completed += 1;
            }
        }
        assert_eq!(completed, 1);

        let (results, summary) = worker.shutdown(producer).unwrap();
        assert_eq!(summary.windows_analyzed, 1);
        assert_eq!(results[0].freeze_score, 60.0);
        assert_eq!(sink.published(), vec![SeverityLevels::new(0, 0, 60)]);
    }
}
