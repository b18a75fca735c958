//! Validation of a finalized capture ring.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::intersect::has_self_intersection;
use super::polygon::polygon_area;
use crate::GeoPoint;

/// Why a ring cannot become a territory.
///
/// The display strings are user-facing and stable.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationFailure {
    #[error("Not enough points")]
    TooFewPoints,
    #[error("Path cannot cross itself")]
    SelfIntersecting,
    #[error("Area too small")]
    TooSmall { area: f64 },
    #[error("Area too large")]
    TooLarge { area: f64 },
}

impl ValidationFailure {
    /// Area measured before the failure, or 0 when none was computed.
    pub fn area(&self) -> f64 {
        match self {
            ValidationFailure::TooFewPoints | ValidationFailure::SelfIntersecting => 0.0,
            ValidationFailure::TooSmall { area } | ValidationFailure::TooLarge { area } => *area,
        }
    }
}

/// Outcome of [`validate_area`]: the area in square meters when valid.
pub type AreaValidation = std::result::Result<f64, ValidationFailure>;

/// Validate a ring for capture.
///
/// Checks run in order: point count, self-intersection, then the
/// `[min_area, max_area]` range (inclusive).
pub fn validate_area(ring: &[GeoPoint], min_area: f64, max_area: f64) -> AreaValidation {
    if ring.len() < 3 {
        return Err(ValidationFailure::TooFewPoints);
    }

    if has_self_intersection(ring) {
        return Err(ValidationFailure::SelfIntersecting);
    }

    let area = polygon_area(ring);

    if area < min_area {
        return Err(ValidationFailure::TooSmall { area });
    }
    if area > max_area {
        return Err(ValidationFailure::TooLarge { area });
    }

    Ok(area)
}
