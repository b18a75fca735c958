//! # Territory Capture
//!
//! GPS trail processing and polygon capture for location-based territory games.
//!
//! This library provides:
//! - A geometry kernel (haversine distance, shoelace area, Douglas-Peucker
//!   simplification, self-intersection and loop-closure tests, overlap tests)
//! - A GPS signal conditioner (Kalman smoothing, adaptive weighted smoothing,
//!   speed-based outlier rejection, tracking duty-cycle advice)
//! - A capture orchestrator that turns a closed trail into a validated
//!   [`Territory`] with area, centroid and overlap metadata
//!
//! ## Features
//!
//! - **`parallel`** - Run overlap checks against stored territories with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use territory_capture::{CaptureOrchestrator, GpsFix, PointStatus};
//!
//! let mut orchestrator = CaptureOrchestrator::new();
//! orchestrator.start_capture(&GpsFix::new(21.1458, 79.0882, 5.0, 0));
//!
//! let result = orchestrator.add_point(&GpsFix::new(21.1459, 79.0882, 5.0, 2_000));
//! assert!(result.added);
//! assert_eq!(result.reason, PointStatus::Added);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{CaptureError, OptionExt, Result};

// Geographic utilities (distance, projection, bounds)
pub mod geo_utils;

// Stateless geometry kernel
pub mod geometry;
pub use geometry::{
    AreaValidation, ValidationFailure, centroid, close_ring, detect_loop_closure,
    has_self_intersection, point_in_polygon, polygon_area, polygons_overlap, segments_intersect,
    simplify, validate_area,
};

// Per-trail GPS filters
pub mod conditioner;
pub use conditioner::{
    ActivityState, AdaptiveSmoother, ConditionerConfig, GpsKalmanFilter, GpsProcessor,
    OutlierDetector, ProcessedFix, Rejection, TrackingProfile, UpdateGate, recommend_tracking,
};

// Capture state machine and territory records
pub mod capture;
pub use capture::{
    CaptureConfig, CaptureEvent, CaptureObserver, CaptureOrchestrator, CaptureOutcome,
    CaptureResult, CaptureSnapshot, CaptureStats, CaptureStatus, Clock, IngestOutcome,
    ManualClock, PointResult, PointStatus, StartStatus, SystemClock, Territory, TerritoryStore,
};

// Synthetic GPS loops for tests, benchmarks and the CLI
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude in degrees.
///
/// # Example
/// ```
/// use territory_capture::GeoPoint;
/// let point = GeoPoint::new(21.1458, 79.0882); // Nagpur
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A single raw position reading from a location provider.
///
/// Produced by the external position source and consumed once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported horizontal accuracy in meters (lower is better)
    pub accuracy: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Ground speed in m/s, when the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl GpsFix {
    /// Create a fix without a speed reading.
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, timestamp: i64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            timestamp,
            speed: None,
        }
    }

    /// Attach a ground speed reading.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// The position part of the fix.
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Coordinates are present and in range, and accuracy is a usable number.
    pub fn is_well_formed(&self) -> bool {
        self.point().is_valid() && self.accuracy.is_finite() && self.accuracy >= 0.0
    }
}

impl From<&GpsFix> for GeoPoint {
    fn from(fix: &GpsFix) -> Self {
        fix.point()
    }
}

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points. Returns `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Whether the point lies inside or on the edge of the box.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}
