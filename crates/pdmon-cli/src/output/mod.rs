pub mod analysis;
pub mod json;

pub use analysis::AnalysisCollector;
pub use json::*;
