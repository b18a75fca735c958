//! Loop-closure detection on an in-progress trail.

use crate::GeoPoint;
use crate::geo_utils::{haversine_distance, path_length};

/// Minimum number of trail points before a loop can close.
pub const MIN_LOOP_POINTS: usize = 4;

/// Whether the trail has returned close to its start after enough travel.
///
/// False when the trail has fewer than 4 points or its length is below
/// `min_path_length` meters. Otherwise true iff the last point lies strictly
/// within `closure_threshold` meters of the first.
pub fn detect_loop_closure(path: &[GeoPoint], min_path_length: f64, closure_threshold: f64) -> bool {
    if path.len() < MIN_LOOP_POINTS {
        return false;
    }

    if path_length(path) < min_path_length {
        return false;
    }

    match (path.first(), path.last()) {
        (Some(start), Some(current)) => haversine_distance(start, current) < closure_threshold,
        _ => false,
    }
}
