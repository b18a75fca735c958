//! Synthetic GPS loops for tests, benchmarks and the CLI.
//!
//! Generates a walked outline of a known shape as a stream of timestamped
//! fixes, with optional Gaussian position noise. The noiseless outline is the
//! ground truth: a rectangle's area is known exactly, a figure-eight is known
//! to cross itself.
//!
//! # Example
//!
//! ```rust
//! use territory_capture::GeoPoint;
//! use territory_capture::synthetic::{LoopScenario, LoopShape};
//!
//! let scenario = LoopScenario::new(
//!     GeoPoint::new(21.1458, 79.0882),
//!     LoopShape::Rectangle { width_meters: 100.0, height_meters: 60.0 },
//! );
//!
//! let fixes = scenario.generate();
//! assert_eq!(fixes.len(), 32); // 320 m perimeter at 10 m spacing
//! ```

use std::f64::consts::PI;

use geo::Coord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo_utils::offset_meters;
use crate::{GeoPoint, GpsFix};

/// Vertices used to approximate curved shapes before resampling.
const CURVE_SAMPLES: usize = 720;

/// Outline walked by a scenario. Every shape starts and ends at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopShape {
    /// Walk east, north, west, then back south.
    Rectangle {
        width_meters: f64,
        height_meters: f64,
    },
    /// Counter-clockwise circle whose southernmost point is the origin.
    Circle { radius_meters: f64 },
    /// Lemniscate of Gerono starting at the tip of its eastern lobe.
    /// The outline crosses itself once, `width_meters` west of the origin.
    FigureEight { width_meters: f64 },
}

/// Configuration for one synthetic loop.
#[derive(Debug, Clone)]
pub struct LoopScenario {
    /// Start and end of the loop.
    pub origin: GeoPoint,
    pub shape: LoopShape,
    /// Distance walked between consecutive fixes.
    pub spacing_meters: f64,
    /// Standard deviation of the position noise; 0 for an exact outline.
    pub noise_sigma_meters: f64,
    /// Accuracy reported on every fix.
    pub accuracy_meters: f64,
    /// Time between consecutive fixes.
    pub interval_ms: i64,
    /// Timestamp of the first fix.
    pub start_ms: i64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl LoopScenario {
    /// A noiseless walk at 10 m spacing, one fix every 2 s, accuracy 5 m.
    pub fn new(origin: GeoPoint, shape: LoopShape) -> Self {
        Self {
            origin,
            shape,
            spacing_meters: 10.0,
            noise_sigma_meters: 0.0,
            accuracy_meters: 5.0,
            interval_ms: 2_000,
            start_ms: 0,
            seed: 42,
        }
    }

    pub fn with_noise(mut self, sigma_meters: f64, seed: u64) -> Self {
        self.noise_sigma_meters = sigma_meters;
        self.seed = seed;
        self
    }

    /// The noiseless outline, one point per fix. The closing point is omitted.
    pub fn outline(&self) -> Vec<GeoPoint> {
        resample_closed(&shape_vertices(self.shape), self.spacing_meters)
            .into_iter()
            .map(|c| offset_meters(&self.origin, c.x, c.y))
            .collect()
    }

    /// Generate the fixes for this scenario.
    pub fn generate(&self) -> Vec<GpsFix> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        resample_closed(&shape_vertices(self.shape), self.spacing_meters)
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let (noise_east, noise_north) = gaussian_pair(&mut rng, self.noise_sigma_meters);
                let point = offset_meters(&self.origin, c.x + noise_east, c.y + noise_north);
                GpsFix::new(
                    point.latitude,
                    point.longitude,
                    self.accuracy_meters,
                    self.start_ms + i as i64 * self.interval_ms,
                )
            })
            .collect()
    }
}

/// Two independent N(0, sigma²) samples via Box-Muller.
fn gaussian_pair(rng: &mut StdRng, sigma: f64) -> (f64, f64) {
    if sigma <= 0.0 {
        return (0.0, 0.0);
    }
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.r#gen();
    let r = (-2.0 * u1.ln()).sqrt() * sigma;
    (r * (2.0 * PI * u2).cos(), r * (2.0 * PI * u2).sin())
}

/// Closed outline in local meters (x east, y north), first vertex repeated last.
fn shape_vertices(shape: LoopShape) -> Vec<Coord<f64>> {
    match shape {
        LoopShape::Rectangle {
            width_meters: w,
            height_meters: h,
        } => vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: w, y: 0.0 },
            Coord { x: w, y: h },
            Coord { x: 0.0, y: h },
            Coord { x: 0.0, y: 0.0 },
        ],
        LoopShape::Circle { radius_meters: r } => (0..=CURVE_SAMPLES)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / CURVE_SAMPLES as f64;
                Coord {
                    x: r * theta.sin(),
                    y: r - r * theta.cos(),
                }
            })
            .collect(),
        LoopShape::FigureEight { width_meters } => {
            let a = width_meters / 2.0;
            (0..=CURVE_SAMPLES)
                .map(|i| {
                    let t = PI / 2.0 + 2.0 * PI * i as f64 / CURVE_SAMPLES as f64;
                    Coord {
                        x: a * t.sin() - a,
                        y: a * t.sin() * t.cos(),
                    }
                })
                .collect()
        }
    }
}

/// Points every `spacing` meters along a closed polyline, starting at its
/// first vertex and stopping before arriving back there.
fn resample_closed(vertices: &[Coord<f64>], spacing: f64) -> Vec<Coord<f64>> {
    let Some(&first) = vertices.first() else {
        return Vec::new();
    };
    if spacing <= 0.0 {
        return vec![first];
    }

    let mut out = vec![first];
    // Distance along the outline of the next point to emit
    let mut next = spacing;
    let mut walked = 0.0;

    for pair in vertices.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
        while length > 0.0 && next < walked + length {
            let f = (next - walked) / length;
            out.push(Coord {
                x: a.x + (b.x - a.x) * f,
                y: a.y + (b.y - a.y) * f,
            });
            next += spacing;
        }
        walked += length;
    }

    // A last point that rounding placed on the closing vertex repeats the start
    if out.len() > 1 && walked - (next - spacing) < 1e-6 {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::haversine_distance;
    use crate::geometry::{close_ring, has_self_intersection, polygon_area};

    const NAGPUR: GeoPoint = GeoPoint {
        latitude: 21.1458,
        longitude: 79.0882,
    };

    fn rectangle() -> LoopScenario {
        LoopScenario::new(
            NAGPUR,
            LoopShape::Rectangle {
                width_meters: 100.0,
                height_meters: 60.0,
            },
        )
    }

    #[test]
    fn test_rectangle_outline_spacing() {
        let outline = rectangle().outline();
        assert_eq!(outline.len(), 32);
        assert_eq!(outline[0], NAGPUR);

        for pair in outline.windows(2) {
            let d = haversine_distance(&pair[0], &pair[1]);
            assert!((d - 10.0).abs() < 0.5, "spacing was {}", d);
        }
    }

    #[test]
    fn test_rectangle_area_matches_dimensions() {
        let area = polygon_area(&close_ring(&rectangle().outline()));
        assert!((area - 6_000.0).abs() < 60.0, "area was {}", area);
    }

    #[test]
    fn test_circle_ends_near_start() {
        let outline = LoopScenario::new(NAGPUR, LoopShape::Circle { radius_meters: 50.0 }).outline();
        let last = outline.last().unwrap();
        assert!(haversine_distance(&outline[0], last) <= 10.5);
        assert!(!has_self_intersection(&close_ring(&outline)));
    }

    #[test]
    fn test_figure_eight_crosses_itself() {
        let outline =
            LoopScenario::new(NAGPUR, LoopShape::FigureEight { width_meters: 80.0 }).outline();
        assert!(has_self_intersection(&close_ring(&outline)));
    }

    #[test]
    fn test_timestamps_and_accuracy() {
        let mut scenario = rectangle();
        scenario.start_ms = 1_000;
        let fixes = scenario.generate();

        assert_eq!(fixes[0].timestamp, 1_000);
        assert_eq!(fixes[1].timestamp, 3_000);
        assert!(fixes.iter().all(|f| f.accuracy == 5.0 && f.is_well_formed()));
    }

    #[test]
    fn test_deterministic_generation() {
        let scenario = rectangle().with_noise(3.0, 7);
        assert_eq!(scenario.generate(), scenario.generate());
    }

    #[test]
    fn test_noise_applied() {
        let exact = rectangle().generate();
        let noisy = rectangle().with_noise(3.0, 7).generate();

        assert_eq!(exact.len(), noisy.len());
        let max_offset = exact
            .iter()
            .zip(&noisy)
            .map(|(a, b)| haversine_distance(&a.point(), &b.point()))
            .fold(0.0, f64::max);
        assert!(max_offset > 0.0);
        assert!(max_offset < 20.0, "noise offset {} is beyond 6 sigma", max_offset);
    }
}
