use serde::{Deserialize, Serialize};

/// Mean and population standard deviation of one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
}

impl Moments {
    /// Two-pass population moments. An empty slice yields zeros.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let count = values.len() as f64;
        let mean = values.iter().sum::<f64>() / count;
        let variance = values
            .iter()
            .map(|x| {
                let d = x - mean;
                d * d
            })
            .sum::<f64>()
            / count;
        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Time-domain features of one window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowStats {
    pub accel: Moments,
    pub gyro: Moments,
}

impl WindowStats {
    pub fn compute(accel: &[f64], gyro: &[f64]) -> Self {
        Self {
            accel: Moments::of(accel),
            gyro: Moments::of(gyro),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn population_moments() {
        let m = Moments::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(m.mean, 5.0);
        assert_relative_eq!(m.std_dev, 2.0);
    }

    #[test]
    fn constant_sequence_has_zero_spread() {
        let m = Moments::of(&[1.02; 156]);
        assert_relative_eq!(m.mean, 1.02, epsilon = 1e-12);
        assert!(m.std_dev < 1e-12);
    }

    #[test]
    fn empty_sequence_is_zero() {
        assert_eq!(Moments::of(&[]), Moments::default());
    }

    #[test]
    fn domains_are_independent() {
        let stats = WindowStats::compute(&[1.0, 1.0], &[0.0, 10.0]);
        assert_relative_eq!(stats.accel.std_dev, 0.0);
        assert_relative_eq!(stats.gyro.mean, 5.0);
        assert_relative_eq!(stats.gyro.std_dev, 5.0);
    }

    #[test]
    fn nan_propagates() {
        let m = Moments::of(&[1.0, f64::NAN]);
        assert!(m.mean.is_nan());
        assert!(m.std_dev.is_nan());
    }
}
