//! # Geometry Kernel
//!
//! Pure, stateless functions over [`GeoPoint`](crate::GeoPoint) sequences:
//! - `polygon` - shoelace area, centroid, point-in-polygon, overlap, ring closing
//! - `intersect` - segment and self-intersection tests
//! - `simplify` - Douglas-Peucker simplification in local meters
//! - `loop_closure` - trail loop-closure detection
//! - `validate` - area and shape validation of a captured ring
//!
//! Areas and simplification tolerances are computed on the local
//! equirectangular projection from [`geo_utils`](crate::geo_utils), which is
//! only accurate for rings spanning a few kilometers.

pub mod intersect;
pub mod loop_closure;
pub mod polygon;
pub mod simplify;
pub mod validate;

pub use intersect::{has_self_intersection, segments_intersect};
pub use loop_closure::detect_loop_closure;
pub use polygon::{centroid, close_ring, point_in_polygon, polygon_area, polygons_overlap};
pub use simplify::simplify;
pub use validate::{AreaValidation, ValidationFailure, validate_area};
