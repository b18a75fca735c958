//! Scalar Kalman filtering of latitude and longitude.
//!
//! Each axis runs an independent 1-D filter with a random-walk model: the
//! prediction keeps the estimate and inflates its variance by the process
//! noise, the update blends in the new reading by the Kalman gain.

use crate::GeoPoint;

/// Default process noise (Q).
pub const DEFAULT_PROCESS_NOISE: f64 = 0.001;

/// Default measurement noise (R).
pub const DEFAULT_MEASUREMENT_NOISE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisEstimate {
    estimate: f64,
    error: f64,
}

impl AxisEstimate {
    fn update(&mut self, measurement: f64, process_noise: f64, measurement_noise: f64) -> f64 {
        let predicted_error = self.error + process_noise;
        let gain = predicted_error / (predicted_error + measurement_noise);

        self.estimate += gain * (measurement - self.estimate);
        self.error = (1.0 - gain) * predicted_error;
        self.estimate
    }
}

/// Independent latitude/longitude Kalman smoother.
#[derive(Debug, Clone)]
pub struct GpsKalmanFilter {
    process_noise: f64,
    measurement_noise: f64,
    state: Option<(AxisEstimate, AxisEstimate)>,
}

impl Default for GpsKalmanFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_NOISE, DEFAULT_MEASUREMENT_NOISE)
    }
}

impl GpsKalmanFilter {
    /// Create a filter with custom process (Q) and measurement (R) noise.
    pub fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            process_noise,
            measurement_noise,
            state: None,
        }
    }

    /// Filter one reading.
    ///
    /// The first reading seeds both estimates and uses the fix's reported
    /// accuracy as the initial error variance; it is returned unchanged.
    pub fn filter(&mut self, point: GeoPoint, accuracy: f64) -> GeoPoint {
        match self.state.as_mut() {
            None => {
                self.state = Some((
                    AxisEstimate {
                        estimate: point.latitude,
                        error: accuracy,
                    },
                    AxisEstimate {
                        estimate: point.longitude,
                        error: accuracy,
                    },
                ));
                point
            }
            Some((lat, lng)) => GeoPoint::new(
                lat.update(point.latitude, self.process_noise, self.measurement_noise),
                lng.update(point.longitude, self.process_noise, self.measurement_noise),
            ),
        }
    }

    /// Current error variance per axis, `None` before the first reading.
    pub fn error_variance(&self) -> Option<(f64, f64)> {
        self.state.map(|(lat, lng)| (lat.error, lng.error))
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Forget all state; the next reading seeds the filter again.
    pub fn reset(&mut self) {
        self.state = None;
    }
}
