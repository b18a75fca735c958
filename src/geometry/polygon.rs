//! Polygon measurements and containment tests.

use geo::Coord;

use crate::GeoPoint;
use crate::geo_utils::{haversine_distance, project};

/// Rings whose endpoints are closer than this are already closed.
pub const RING_CLOSED_TOLERANCE_METERS: f64 = 1.0;

/// Area of a polygon in square meters (shoelace on the local projection).
///
/// Returns 0 for fewer than 3 points. Works on open or closed rings since the
/// closing edge contributes nothing when first == last.
pub fn polygon_area(ring: &[GeoPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let coords: Vec<Coord<f64>> = ring.iter().map(project).collect();
    let n = coords.len();

    let twice_signed: f64 = (0..n)
        .map(|i| {
            let a = coords[i];
            let b = coords[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();

    (twice_signed / 2.0).abs()
}

/// Arithmetic mean of the ring's coordinates.
///
/// Returns `None` for an empty ring.
pub fn centroid(ring: &[GeoPoint]) -> Option<GeoPoint> {
    if ring.is_empty() {
        return None;
    }
    let n = ring.len() as f64;
    let (lat_sum, lng_sum) = ring.iter().fold((0.0, 0.0), |(lat, lng), p| {
        (lat + p.latitude, lng + p.longitude)
    });
    Some(GeoPoint::new(lat_sum / n, lng_sum / n))
}

/// Even-odd ray casting test with longitude as x and latitude as y.
///
/// Points exactly on an edge may land on either side.
pub fn point_in_polygon(point: &GeoPoint, polygon: &[GeoPoint]) -> bool {
    let x = point.longitude;
    let y = point.latitude;
    let mut inside = false;

    let mut j = match polygon.len() {
        0 => return false,
        n => n - 1,
    };
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].longitude, polygon[i].latitude);
        let (xj, yj) = (polygon[j].longitude, polygon[j].latitude);

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Conservative overlap test: any vertex of one ring inside the other.
///
/// Misses crossings where no vertex is contained (e.g. two thin bars forming
/// a plus sign). Overlap here is informational, not exact intersection.
pub fn polygons_overlap(a: &[GeoPoint], b: &[GeoPoint]) -> bool {
    a.iter().any(|p| point_in_polygon(p, b)) || b.iter().any(|p| point_in_polygon(p, a))
}

/// Close a path into a ring by appending its first point.
///
/// Paths whose endpoints are already within 1 m are returned unchanged.
pub fn close_ring(path: &[GeoPoint]) -> Vec<GeoPoint> {
    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        return Vec::new();
    };

    let mut ring = path.to_vec();
    if haversine_distance(first, last) >= RING_CLOSED_TOLERANCE_METERS {
        ring.push(*first);
    }
    ring
}
