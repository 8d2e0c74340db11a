use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// One calibrated inertial reading: acceleration in g, angular rate in dps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub accel_g: Vector3<f64>,
    pub gyro_dps: Vector3<f64>,
}

impl MotionSample {
    pub fn new(accel_g: Vector3<f64>, gyro_dps: Vector3<f64>) -> Self {
        Self { accel_g, gyro_dps }
    }

    pub fn from_arrays(accel_g: [f64; 3], gyro_dps: [f64; 3]) -> Self {
        Self {
            accel_g: Vector3::from(accel_g),
            gyro_dps: Vector3::from(gyro_dps),
        }
    }

    /// Reduces both vectors to their Euclidean norms.
    pub fn magnitudes(&self) -> MagnitudePair {
        MagnitudePair {
            accel_g: vector_norm3(self.accel_g.x, self.accel_g.y, self.accel_g.z),
            gyro_dps: vector_norm3(self.gyro_dps.x, self.gyro_dps.y, self.gyro_dps.z),
        }
    }
}

/// Scalar magnitudes of one sample, the unit the window stores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MagnitudePair {
    pub accel_g: f64,
    pub gyro_dps: f64,
}

/// `sqrt(x² + y² + z²)`. Non-finite components propagate.
#[inline]
pub fn vector_norm3(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}
