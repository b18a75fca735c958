//! Update gate: decides whether a fix is worth processing at all.

use log::debug;

use crate::geo_utils::haversine_distance;
use crate::{GeoPoint, GpsFix};

/// Minimum movement in meters for an idle fix to pass.
pub const DEFAULT_IDLE_MOVEMENT_METERS: f64 = 3.0;

/// Fixes worse than this many meters are dropped even while capturing.
pub const DEFAULT_MAX_CAPTURE_ACCURACY: f64 = 50.0;

/// Bounds processing cost while not capturing.
///
/// While capturing every fix passes unless its accuracy is very poor. While
/// idle a fix passes only after the user has moved far enough from the last
/// position that passed.
#[derive(Debug, Clone)]
pub struct UpdateGate {
    min_idle_movement_meters: f64,
    max_capture_accuracy: f64,
    last_position: Option<GeoPoint>,
}

impl Default for UpdateGate {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_MOVEMENT_METERS, DEFAULT_MAX_CAPTURE_ACCURACY)
    }
}

impl UpdateGate {
    pub fn new(min_idle_movement_meters: f64, max_capture_accuracy: f64) -> Self {
        Self {
            min_idle_movement_meters,
            max_capture_accuracy,
            last_position: None,
        }
    }

    pub fn should_process(&mut self, fix: &GpsFix, is_capturing: bool) -> bool {
        if is_capturing {
            if fix.accuracy > self.max_capture_accuracy {
                debug!("Skipping update: poor accuracy {:.1}m", fix.accuracy);
                return false;
            }
            return true;
        }

        let position = fix.point();
        match self.last_position {
            Some(last) if haversine_distance(&last, &position) < self.min_idle_movement_meters => {
                false
            }
            _ => {
                self.last_position = Some(position);
                true
            }
        }
    }

    /// Last idle position that passed the gate.
    pub fn last_position(&self) -> Option<GeoPoint> {
        self.last_position
    }

    pub fn reset(&mut self) {
        self.last_position = None;
    }
}
