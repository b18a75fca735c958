//! Douglas-Peucker path simplification in local meters.

use geo::Coord;

use crate::GeoPoint;
use crate::geo_utils::project;

/// Simplify a path with the Douglas-Peucker algorithm.
///
/// `tolerance_meters` bounds the perpendicular deviation of dropped points
/// from the chord that replaces them. Paths of 2 points or fewer are returned
/// unchanged. When several points share the maximum deviation the first one
/// wins, so output is deterministic.
///
/// For a closed ring the first chord is degenerate (first == last) and the
/// deviation falls back to the distance from the start point, which keeps
/// the far side of the loop.
pub fn simplify(path: &[GeoPoint], tolerance_meters: f64) -> Vec<GeoPoint> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let coords: Vec<Coord<f64>> = path.iter().map(project).collect();
    let mut keep = vec![false; path.len()];
    keep[0] = true;
    keep[path.len() - 1] = true;

    douglas_peucker(&coords, 0, path.len() - 1, tolerance_meters, &mut keep);

    path.iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}

/// Mark the points to keep between `first` and `last` (inclusive endpoints).
fn douglas_peucker(
    coords: &[Coord<f64>],
    first: usize,
    last: usize,
    tolerance: f64,
    keep: &mut [bool],
) {
    if last <= first + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_index = first;
    for i in (first + 1)..last {
        let dist = perpendicular_distance(coords[i], coords[first], coords[last]);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        keep[max_index] = true;
        douglas_peucker(coords, first, max_index, tolerance, keep);
        douglas_peucker(coords, max_index, last, tolerance, keep);
    }
}

/// Distance from `p` to the infinite line through `start` and `end`.
///
/// Degenerates to point distance when `start == end`.
fn perpendicular_distance(p: Coord<f64>, start: Coord<f64>, end: Coord<f64>) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let mag_sq = dx * dx + dy * dy;

    if mag_sq == 0.0 {
        return (p.x - start.x).hypot(p.y - start.y);
    }

    let u = ((p.x - start.x) * dx + (p.y - start.y) * dy) / mag_sq;
    let closest_x = start.x + u * dx;
    let closest_y = start.y + u * dy;

    (p.x - closest_x).hypot(p.y - closest_y)
}
