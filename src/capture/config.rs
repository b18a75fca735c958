//! Capture orchestrator configuration.

use serde::{Deserialize, Serialize};

use crate::conditioner::ConditionerConfig;
use crate::error::{CaptureError, Result};

/// Tunables for the capture orchestrator, fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfig {
    /// Minimum distance between consecutive trail points in meters.
    /// Closer fixes are treated as jitter. Default: 5.0
    pub min_point_distance: f64,

    /// Fixes with a reported accuracy above this are rejected, in meters.
    /// Default: 20.0
    pub gps_accuracy_threshold: f64,

    /// Number of points in the trail smoothing window. Default: 3
    pub smoothing_window: usize,

    /// Douglas-Peucker tolerance applied to the closed ring, in meters.
    /// Default: 5.0
    pub simplification_tolerance: f64,

    /// Trail length required before a loop can close, in meters. Default: 50.0
    pub min_loop_distance: f64,

    /// Distance from the start at which the trail counts as closed, in meters.
    /// Default: 15.0
    pub loop_closure_threshold: f64,

    /// Smallest capturable area in square meters. Default: 100.0
    pub min_capture_area: f64,

    /// Largest capturable area in square meters. Default: 500,000.0
    pub max_capture_area: f64,

    /// Owner stamped onto captured territories. Default: "user-1"
    pub owner_id: String,

    /// Signal conditioner settings used by `ingest`.
    pub conditioner: ConditionerConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_point_distance: 5.0,
            gps_accuracy_threshold: 20.0,
            smoothing_window: 3,
            simplification_tolerance: 5.0,
            min_loop_distance: 50.0,
            loop_closure_threshold: 15.0,
            min_capture_area: 100.0,
            max_capture_area: 500_000.0,
            owner_id: "user-1".to_string(),
            conditioner: ConditionerConfig::default(),
        }
    }
}

fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CaptureError::InvalidConfig {
            field,
            reason: format!("must be a finite non-negative number, got {}", value),
        });
    }
    Ok(())
}

impl CaptureConfig {
    /// Check that every tunable is usable.
    pub fn validate(&self) -> Result<()> {
        require_non_negative("minPointDistance", self.min_point_distance)?;
        require_non_negative("gpsAccuracyThreshold", self.gps_accuracy_threshold)?;
        require_non_negative("simplificationTolerance", self.simplification_tolerance)?;
        require_non_negative("minLoopDistance", self.min_loop_distance)?;
        require_non_negative("loopClosureThreshold", self.loop_closure_threshold)?;
        require_non_negative("minCaptureArea", self.min_capture_area)?;
        require_non_negative("maxCaptureArea", self.max_capture_area)?;

        if self.smoothing_window == 0 {
            return Err(CaptureError::InvalidConfig {
                field: "smoothingWindow",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.min_capture_area > self.max_capture_area {
            return Err(CaptureError::InvalidConfig {
                field: "minCaptureArea",
                reason: format!(
                    "{} exceeds maxCaptureArea {}",
                    self.min_capture_area, self.max_capture_area
                ),
            });
        }

        let conditioner = &self.conditioner;
        require_non_negative("conditioner.processNoise", conditioner.process_noise)?;
        require_non_negative("conditioner.measurementNoise", conditioner.measurement_noise)?;
        require_non_negative("conditioner.maxSpeedMps", conditioner.max_speed_mps)?;
        require_non_negative(
            "conditioner.idleMovementMeters",
            conditioner.idle_movement_meters,
        )?;
        require_non_negative(
            "conditioner.maxCaptureAccuracy",
            conditioner.max_capture_accuracy,
        )?;

        Ok(())
    }
}
