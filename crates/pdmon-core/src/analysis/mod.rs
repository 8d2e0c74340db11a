pub mod classify;
pub mod spectral;
pub mod stats;

pub use classify::{classify, is_frozen, normalized_score, SeverityScores, MAX_SCORE};
pub use spectral::{max_bin_index, BandPeak, SpectralBandExtractor, SpectralPeaks};
pub use stats::{Moments, WindowStats};
