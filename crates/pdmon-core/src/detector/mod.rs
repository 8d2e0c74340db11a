use log::{debug, info};

use crate::analysis::{classify, SpectralBandExtractor, WindowStats};
use crate::config::DetectorConfig;
use crate::contracts::{DetectionResult, WindowFeatures};
use crate::imu::{MagnitudePair, MagnitudeWindow, MotionSample, WindowBuffer, WindowState};

/// Stateless analysis of complete windows.
///
/// Owns the precomputed bin basis, which is rebuilt only when the sample
/// rate, window length or analysis limit change. Split from [`Detector`] so a
/// worker thread can analyze windows it received through a handoff.
#[derive(Debug, Clone)]
pub struct WindowAnalyzer {
    config: DetectorConfig,
    extractor: SpectralBandExtractor,
}

impl WindowAnalyzer {
    pub fn new(config: DetectorConfig) -> Self {
        let extractor = SpectralBandExtractor::new(
            config.sample_rate_hz,
            config.window_len,
            config.max_analysis_hz,
        );
        Self { config, extractor }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn reconfigure(&mut self, config: DetectorConfig) {
        if !self.extractor.matches(
            config.sample_rate_hz,
            config.window_len,
            config.max_analysis_hz,
        ) {
            self.extractor = SpectralBandExtractor::new(
                config.sample_rate_hz,
                config.window_len,
                config.max_analysis_hz,
            );
            debug!(target: "pdmon_core::detector",
                "rebuilt bin basis: N={} fs={} Hz k_max={}",
                config.window_len, config.sample_rate_hz, self.extractor.k_max()
            );
        }
        self.config = config;
    }

    /// Produces exactly one result for `window`. Never fails.
    pub fn analyze(&self, window: MagnitudeWindow<'_>) -> DetectionResult {
        let stats = WindowStats::compute(window.accel, window.gyro);

        // Windows captured before a length change still get their own basis.
        let rebuilt;
        let extractor = if window.len() == self.extractor.window_len() {
            &self.extractor
        } else {
            rebuilt = SpectralBandExtractor::new(
                self.config.sample_rate_hz,
                window.len(),
                self.config.max_analysis_hz,
            );
            &rebuilt
        };

        if extractor.k_max() == 0 {
            debug!(target: "pdmon_core::detector",
                "degenerate window (N={}), reporting zero scores", window.len()
            );
            return DetectionResult::degenerate(stats);
        }

        let peaks = extractor.extract(
            window.accel,
            &self.config.tremor_band,
            &self.config.dyskinesia_band,
        );
        let scores = classify(&peaks, &stats, &self.config);

        debug!(target: "pdmon_core::detector",
            "f_dom={:.2} Hz |X|={:.3} tremor_peak={:.3}@{:.2} dysk_peak={:.3}@{:.2} acc_std={:.4} g gyro_std={:.3} dps",
            peaks.dominant.frequency_hz,
            peaks.dominant.magnitude,
            peaks.tremor.magnitude,
            peaks.tremor.frequency_hz,
            peaks.dyskinesia.magnitude,
            peaks.dyskinesia.frequency_hz,
            stats.accel.std_dev,
            stats.gyro.std_dev
        );

        DetectionResult::from_parts(WindowFeatures { peaks, stats }, scores)
    }
}

/// Windowed detector: owns the window buffer and analyzes each complete window once.
///
/// ```
/// use pdmon_core::{Detector, DetectorConfig, MotionSample};
///
/// let mut detector = Detector::new(DetectorConfig::default());
/// let still = MotionSample::from_arrays([0.0, 0.0, 1.0], [0.0, 0.0, 0.0]);
/// while !detector.push(&still) {}
/// let result = detector.analyze().unwrap();
/// assert_eq!(result.levels().freeze, 80);
/// ```
#[derive(Debug, Clone)]
pub struct Detector {
    analyzer: WindowAnalyzer,
    window: WindowBuffer,
    pending: Option<DetectorConfig>,
    windows_analyzed: u64,
}

impl Detector {
    /// Builds a detector without validating `config`.
    pub fn new(config: DetectorConfig) -> Self {
        let window = WindowBuffer::new(config.window_len);
        Self {
            analyzer: WindowAnalyzer::new(config),
            window,
            pending: None,
            windows_analyzed: 0,
        }
    }

    pub fn try_new(config: DetectorConfig) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &DetectorConfig {
        self.analyzer.config()
    }

    /// Reduces `sample` and appends it. Returns `true` when the window just completed.
    pub fn push(&mut self, sample: &MotionSample) -> bool {
        self.window.push(sample.magnitudes())
    }

    pub fn push_magnitudes(&mut self, accel_g: f64, gyro_dps: f64) -> bool {
        self.window.push(MagnitudePair { accel_g, gyro_dps })
    }

    pub fn is_complete(&self) -> bool {
        self.window.is_complete()
    }

    pub fn state(&self) -> WindowState {
        self.window.state()
    }

    /// Analyzes the complete window and resumes filling from index 0.
    /// Returns `None` while the window is still filling.
    pub fn analyze(&mut self) -> Option<DetectionResult> {
        let result = self.analyzer.analyze(self.window.complete_window()?);
        self.window.release();
        self.windows_analyzed += 1;
        if let Some(config) = self.pending.take() {
            self.apply(config);
        }
        Some(result)
    }

    /// Applies a new configuration between windows.
    ///
    /// A complete window still waiting for [`Detector::analyze`] keeps the
    /// configuration it was sampled under; the new one is applied once that
    /// window has been analyzed. Otherwise a change of window length
    /// discards the partial window and every other change takes effect at
    /// the next analysis.
    pub fn reconfigure(&mut self, config: DetectorConfig) {
        if self.window.is_complete() {
            debug!(target: "pdmon_core::detector",
                "window awaiting analysis, deferring reconfiguration"
            );
            self.pending = Some(config);
            return;
        }
        self.pending = None;
        self.apply(config);
    }

    /// Configuration queued behind the complete window, if any.
    pub fn pending_config(&self) -> Option<&DetectorConfig> {
        self.pending.as_ref()
    }

    fn apply(&mut self, config: DetectorConfig) {
        let current = self.analyzer.config();
        if config.window_len != current.window_len {
            info!(target: "pdmon_core::detector",
                "window length {} -> {} samples, discarding {} buffered",
                current.window_len, config.window_len, self.window.filled()
            );
            self.window.resize(config.window_len);
        }
        if config.sample_rate_hz != current.sample_rate_hz {
            info!(target: "pdmon_core::detector",
                "sample rate {} -> {} Hz", current.sample_rate_hz, config.sample_rate_hz
            );
        }
        self.analyzer.reconfigure(config);
    }

    pub fn window_len(&self) -> usize {
        self.window.window_len()
    }

    pub fn windows_analyzed(&self) -> u64 {
        self.windows_analyzed
    }

    pub fn rejected_samples(&self) -> u64 {
        self.window.rejected()
    }

    pub fn window_mut(&mut self) -> &mut WindowBuffer {
        &mut self.window
    }

    pub fn analyzer(&self) -> &WindowAnalyzer {
        &self.analyzer
    }
}
