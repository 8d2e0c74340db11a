use std::time::Duration;

use pdmon_core::MotionSample;

/// One row of a recorded session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Timestamp of the row
    pub timestamp: Duration,
    /// Calibrated reading, `None` when the sensor read failed
    pub reading: Option<MotionSample>,
}

impl ImuSample {
    pub fn new(timestamp: Duration, reading: MotionSample) -> Self {
        Self {
            timestamp,
            reading: Some(reading),
        }
    }

    /// A row whose sensor fields were missing or unreadable
    pub fn failed(timestamp: Duration) -> Self {
        Self {
            timestamp,
            reading: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.reading.is_none()
    }

    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp.as_secs_f64()
    }
}
