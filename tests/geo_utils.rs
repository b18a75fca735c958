//! Tests for geo_utils module

use territory_capture::geo_utils::*;
use territory_capture::{Bounds, GeoPoint};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_haversine_distance_same_point() {
    let p = GeoPoint::new(21.1458, 79.0882);
    assert_eq!(haversine_distance(&p, &p), 0.0);
}

#[test]
fn test_haversine_distance_known_value() {
    // London to Paris is approximately 344 km
    let london = GeoPoint::new(51.5074, -0.1278);
    let paris = GeoPoint::new(48.8566, 2.3522);
    let dist = haversine_distance(&london, &paris);
    assert!(approx_eq(dist, 343_560.0, 5000.0)); // Within 5km
}

#[test]
fn test_haversine_symmetric() {
    let a = GeoPoint::new(21.1458, 79.0882);
    let b = GeoPoint::new(21.1500, 79.0950);
    assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
}

#[test]
fn test_haversine_one_millidegree_latitude() {
    // 0.001° of latitude is about 111 m
    let a = GeoPoint::new(21.1458, 79.0882);
    let b = GeoPoint::new(21.1468, 79.0882);
    assert!(approx_eq(haversine_distance(&a, &b), 111.2, 0.5));
}

#[test]
fn test_local_projection_scales() {
    let origin = local_projection(0.0, 0.0);
    assert_eq!(origin.x, 0.0);
    assert_eq!(origin.y, 0.0);

    let north = local_projection(1.0, 0.0);
    assert!(approx_eq(north.y, METERS_PER_DEG_LAT, 1e-9));

    // Longitude degrees shrink with cos(latitude)
    let east = local_projection(60.0, 1.0);
    assert!(approx_eq(east.x, METERS_PER_DEG_LNG * 0.5, 1e-6));
}

#[test]
fn test_offset_meters_inverts_projection() {
    let origin = GeoPoint::new(21.1458, 79.0882);
    let moved = offset_meters(&origin, 30.0, 40.0);

    assert!(approx_eq(project(&moved).y - project(&origin).y, 40.0, 1e-6));
    assert!(approx_eq(
        (moved.longitude - origin.longitude) * METERS_PER_DEG_LNG * origin.latitude.to_radians().cos(),
        30.0,
        1e-6
    ));
    assert!(approx_eq(haversine_distance(&origin, &moved), 50.0, 0.5));
}

#[test]
fn test_path_length() {
    let origin = GeoPoint::new(21.1458, 79.0882);
    let path = vec![
        origin,
        offset_meters(&origin, 0.0, 100.0),
        offset_meters(&origin, 100.0, 100.0),
    ];
    assert!(approx_eq(path_length(&path), 200.0, 2.0));
    assert_eq!(path_length(&path[..1]), 0.0);
    assert_eq!(path_length(&[]), 0.0);
}

#[test]
fn test_bounds_from_points() {
    let points = vec![
        GeoPoint::new(21.14, 79.09),
        GeoPoint::new(21.15, 79.08),
        GeoPoint::new(21.145, 79.085),
    ];
    let bounds = Bounds::from_points(&points).unwrap();
    assert_eq!(bounds.min_lat, 21.14);
    assert_eq!(bounds.max_lat, 21.15);
    assert_eq!(bounds.min_lng, 79.08);
    assert_eq!(bounds.max_lng, 79.09);

    let center = bounds.center();
    assert!(approx_eq(center.latitude, 21.145, 1e-9));
    assert!(approx_eq(center.longitude, 79.085, 1e-9));
    assert!(bounds.contains(&center));
    assert!(!bounds.contains(&GeoPoint::new(21.16, 79.085)));
}

#[test]
fn test_bounds_empty() {
    assert!(Bounds::from_points(&[]).is_none());
}
