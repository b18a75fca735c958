//! Segment intersection and ring self-intersection tests.
//!
//! Orientation tests run directly on (longitude, latitude); the sign of a
//! cross product does not depend on the local scale, so no projection is needed.

use crate::GeoPoint;

/// Strict counter-clockwise orientation of `a -> b -> c` (x = lng, y = lat).
#[inline]
fn ccw(a: &GeoPoint, b: &GeoPoint, c: &GeoPoint) -> bool {
    (b.longitude - a.longitude) * (c.latitude - a.latitude)
        > (b.latitude - a.latitude) * (c.longitude - a.longitude)
}

/// Whether segment `p1-p2` properly crosses segment `p3-p4`.
///
/// Collinear and endpoint-touching configurations are not reported, so this
/// is meant for non-adjacent segment pairs.
pub fn segments_intersect(p1: &GeoPoint, p2: &GeoPoint, p3: &GeoPoint, p4: &GeoPoint) -> bool {
    ccw(p1, p3, p4) != ccw(p2, p3, p4) && ccw(p1, p2, p3) != ccw(p1, p2, p4)
}

/// Check every pair of non-adjacent edges of a path for a crossing.
///
/// Edges `i` and `i + 1` share a vertex and are skipped. When the path is a
/// closed ring (first point equals last) the first and last edges also share
/// a vertex and are skipped as well. O(n²) in the number of vertices, fine for
/// simplified rings of a few dozen points.
pub fn has_self_intersection(path: &[GeoPoint]) -> bool {
    if path.len() < 4 {
        return false;
    }

    let edge_count = path.len() - 1;
    let closed = path.first() == path.last();

    for i in 0..edge_count {
        for j in (i + 2)..edge_count {
            if closed && i == 0 && j == edge_count - 1 {
                continue;
            }
            if segments_intersect(&path[i], &path[i + 1], &path[j], &path[j + 1]) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    #[test]
    fn test_crossing_segments() {
        assert!(segments_intersect(
            &p(0.0, 0.0),
            &p(1.0, 1.0),
            &p(0.0, 1.0),
            &p(1.0, 0.0)
        ));
    }

    #[test]
    fn test_parallel_segments() {
        assert!(!segments_intersect(
            &p(0.0, 0.0),
            &p(0.0, 1.0),
            &p(1.0, 0.0),
            &p(1.0, 1.0)
        ));
    }

    #[test]
    fn test_closed_ring_either_winding_is_simple() {
        let ccw_ring = vec![
            p(0.0, 0.0),
            p(0.0, 0.001),
            p(0.001, 0.001),
            p(0.001, 0.0),
            p(0.0, 0.0),
        ];
        let mut cw_ring = ccw_ring.clone();
        cw_ring.reverse();

        assert!(!has_self_intersection(&ccw_ring));
        assert!(!has_self_intersection(&cw_ring));
    }

    #[test]
    fn test_bowtie_intersects() {
        let bowtie = vec![
            p(0.0, 0.0),
            p(0.001, 0.001),
            p(0.0, 0.001),
            p(0.001, 0.0),
            p(0.0, 0.0),
        ];
        assert!(has_self_intersection(&bowtie));
    }
}
