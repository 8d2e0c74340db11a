//! Windowed frequency-domain detection of tremor, dyskinesia and freezing-of-gait
//! from inertial magnitudes.

pub mod analysis;
pub mod config;
pub mod contracts;
pub mod detector;
pub mod imu;
pub mod logs;
pub mod time;

pub use analysis::{BandPeak, Moments, SeverityScores, SpectralPeaks, WindowStats};
pub use config::{ConfigError, DetectorConfig, FrequencyBand};
pub use contracts::{DetectionResult, SeverityLevels, SeveritySink, WindowFeatures};
pub use detector::{Detector, WindowAnalyzer};
pub use imu::{MagnitudePair, MotionSample, WindowBuffer, WindowState, WindowStorage};

pub type Result<T> = std::result::Result<T, ConfigError>;
