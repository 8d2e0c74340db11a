pub mod report;

pub use report::{EngineSnapshot, WindowReport};
