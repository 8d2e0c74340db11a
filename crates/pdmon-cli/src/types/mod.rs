pub mod config;
pub mod imu_sample;
pub mod session_data;

pub use config::*;
pub use imu_sample::*;
pub use session_data::*;
