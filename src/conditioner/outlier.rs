//! Speed-based outlier rejection.

use log::debug;

use crate::GeoPoint;
use crate::geo_utils::haversine_distance;

/// Default implied-speed ceiling in m/s (about 54 km/h).
pub const DEFAULT_MAX_SPEED_MPS: f64 = 15.0;

/// Rejects fixes that imply an implausible speed from the last accepted fix.
#[derive(Debug, Clone)]
pub struct OutlierDetector {
    max_speed_mps: f64,
    last_valid: Option<(GeoPoint, i64)>,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPEED_MPS)
    }
}

impl OutlierDetector {
    pub fn new(max_speed_mps: f64) -> Self {
        Self {
            max_speed_mps,
            last_valid: None,
        }
    }

    /// Check a fix against the last accepted one.
    ///
    /// The first fix is always accepted. Fixes with no elapsed time since the
    /// reference are accepted without moving the reference. Accepted fixes
    /// otherwise become the new reference.
    pub fn is_outlier(&mut self, point: GeoPoint, timestamp_ms: i64) -> bool {
        let Some((last_point, last_time)) = self.last_valid else {
            self.last_valid = Some((point, timestamp_ms));
            return false;
        };

        let elapsed_secs = (timestamp_ms - last_time) as f64 / 1000.0;
        if elapsed_secs <= 0.0 {
            return false;
        }

        let speed = haversine_distance(&last_point, &point) / elapsed_secs;
        if speed > self.max_speed_mps {
            debug!("Outlier detected: {:.2} m/s", speed);
            return true;
        }

        self.last_valid = Some((point, timestamp_ms));
        false
    }

    /// The last accepted position and its timestamp.
    pub fn reference(&self) -> Option<(GeoPoint, i64)> {
        self.last_valid
    }

    pub fn reset(&mut self) {
        self.last_valid = None;
    }
}
