//! Geographic utility functions.
//!
//! Distance, local projection and metre/degree conversion helpers used by the
//! geometry kernel and the signal conditioner.

use geo::Coord;

use crate::GeoPoint;

/// Mean Earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Meters per degree of longitude at the equator.
pub const METERS_PER_DEG_LNG: f64 = 111_320.0;

/// Meters per degree of latitude.
pub const METERS_PER_DEG_LAT: f64 = 110_540.0;

/// Great-circle distance between two points in meters (haversine).
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlng = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Project a coordinate onto a local plane in meters.
///
/// Equirectangular approximation (`x` east, `y` north). Each point is scaled
/// by the cosine of its own latitude, so this is only meaningful for path
/// extents of a few kilometers.
pub fn local_projection(latitude: f64, longitude: f64) -> Coord<f64> {
    Coord {
        x: longitude * METERS_PER_DEG_LNG * latitude.to_radians().cos(),
        y: latitude * METERS_PER_DEG_LAT,
    }
}

/// [`local_projection`] for a [`GeoPoint`].
#[inline]
pub fn project(point: &GeoPoint) -> Coord<f64> {
    local_projection(point.latitude, point.longitude)
}

/// Sum of consecutive segment distances in meters.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Convert a north-south distance in meters to degrees of latitude.
pub fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

/// Convert an east-west distance in meters to degrees of longitude at a given latitude.
pub fn meters_to_deg_lng(meters: f64, latitude: f64) -> f64 {
    let meters_per_deg = METERS_PER_DEG_LNG * latitude.to_radians().cos();
    if meters_per_deg.abs() < 1e-10 {
        return 0.0;
    }
    meters / meters_per_deg
}

/// Move a point by `east` and `north` meters on the local plane.
pub fn offset_meters(origin: &GeoPoint, east: f64, north: f64) -> GeoPoint {
    GeoPoint::new(
        origin.latitude + meters_to_deg_lat(north),
        origin.longitude + meters_to_deg_lng(east, origin.latitude),
    )
}
