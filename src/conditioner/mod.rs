//! # GPS Signal Conditioner
//!
//! Per-trail filters applied to raw fixes before they reach the capture trail:
//! - `gate` - skip fixes that are not worth processing
//! - `outlier` - reject fixes implying implausible speed
//! - `kalman` - per-axis Kalman smoothing
//! - `smoother` - speed-adaptive weighted window, plus whole-trail smoothing
//! - `duty_cycle` - tracking cadence advice for the position source
//!
//! [`GpsProcessor`] chains gate → outlier → smoother for one stream of fixes.

pub mod duty_cycle;
pub mod gate;
pub mod kalman;
pub mod outlier;
pub mod smoother;

pub use duty_cycle::{AccuracyTier, ActivityState, TrackingProfile, recommend_tracking};
pub use gate::UpdateGate;
pub use kalman::GpsKalmanFilter;
pub use outlier::OutlierDetector;
pub use smoother::{AdaptiveSmoother, smooth_trail, weighted_mean, window_for_speed};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GeoPoint, GpsFix};

/// Tunables for the signal conditioner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConditionerConfig {
    /// Kalman process noise (Q). Default: 0.001
    pub process_noise: f64,

    /// Kalman measurement noise (R). Default: 3.0
    pub measurement_noise: f64,

    /// Implied speed above which a fix is an outlier, in m/s.
    /// Default: 15.0 (about 54 km/h)
    pub max_speed_mps: f64,

    /// Samples kept by the adaptive smoother. Default: 10
    pub smoother_capacity: usize,

    /// Movement needed for an idle fix to be processed, in meters. Default: 3.0
    pub idle_movement_meters: f64,

    /// Fixes with worse accuracy are dropped while capturing, in meters. Default: 50.0
    pub max_capture_accuracy: f64,
}

impl Default for ConditionerConfig {
    fn default() -> Self {
        Self {
            process_noise: kalman::DEFAULT_PROCESS_NOISE,
            measurement_noise: kalman::DEFAULT_MEASUREMENT_NOISE,
            max_speed_mps: outlier::DEFAULT_MAX_SPEED_MPS,
            smoother_capacity: smoother::DEFAULT_SMOOTHER_CAPACITY,
            idle_movement_meters: gate::DEFAULT_IDLE_MOVEMENT_METERS,
            max_capture_accuracy: gate::DEFAULT_MAX_CAPTURE_ACCURACY,
        }
    }
}

/// Why the conditioner dropped a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    #[error("Outside update gate")]
    Gated,
    #[error("Speed outlier")]
    Outlier,
}

/// A fix that passed the conditioner, with its smoothed position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedFix {
    pub point: GeoPoint,
    pub timestamp: i64,
    /// Accuracy reported by the source for the raw fix
    pub accuracy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl ProcessedFix {
    /// The conditioned reading as a fix for the capture trail.
    pub fn to_fix(&self) -> GpsFix {
        GpsFix {
            latitude: self.point.latitude,
            longitude: self.point.longitude,
            accuracy: self.accuracy,
            timestamp: self.timestamp,
            speed: self.speed,
        }
    }
}

/// Complete conditioning pipeline for one stream of fixes.
#[derive(Debug, Clone)]
pub struct GpsProcessor {
    gate: UpdateGate,
    outliers: OutlierDetector,
    smoother: AdaptiveSmoother,
}

impl Default for GpsProcessor {
    fn default() -> Self {
        Self::new(&ConditionerConfig::default())
    }
}

impl GpsProcessor {
    pub fn new(config: &ConditionerConfig) -> Self {
        Self {
            gate: UpdateGate::new(config.idle_movement_meters, config.max_capture_accuracy),
            outliers: OutlierDetector::new(config.max_speed_mps),
            smoother: AdaptiveSmoother::new(
                config.smoother_capacity,
                GpsKalmanFilter::new(config.process_noise, config.measurement_noise),
            ),
        }
    }

    /// Run a raw fix through gate, outlier check and smoothing.
    pub fn process(
        &mut self,
        fix: &GpsFix,
        is_capturing: bool,
    ) -> std::result::Result<ProcessedFix, Rejection> {
        if !self.gate.should_process(fix, is_capturing) {
            return Err(Rejection::Gated);
        }

        if self.outliers.is_outlier(fix.point(), fix.timestamp) {
            return Err(Rejection::Outlier);
        }

        let point = self
            .smoother
            .add_point(fix.point(), fix.accuracy, fix.speed.unwrap_or(0.0));
        debug!(
            "Conditioned fix ({:.6}, {:.6}) -> ({:.6}, {:.6})",
            fix.latitude, fix.longitude, point.latitude, point.longitude
        );

        Ok(ProcessedFix {
            point,
            timestamp: fix.timestamp,
            accuracy: fix.accuracy,
            speed: fix.speed,
        })
    }

    /// Tracking cadence advice for the position source.
    pub fn tracking_profile(&self, activity: ActivityState, battery_percent: u8) -> TrackingProfile {
        recommend_tracking(activity, battery_percent)
    }

    /// Clear all filter state.
    pub fn reset(&mut self) {
        self.gate.reset();
        self.outliers.reset();
        self.smoother.reset();
    }
}
