//! Accuracy- and recency-weighted smoothing.
//!
//! Two users share the same weighting kernel: the streaming
//! [`AdaptiveSmoother`], which picks its window from the current speed, and
//! [`smooth_trail`], which re-derives a whole capture trail with a fixed window.

use std::collections::VecDeque;

use super::kalman::GpsKalmanFilter;
use crate::GeoPoint;

/// Default number of recent samples the adaptive smoother retains.
pub const DEFAULT_SMOOTHER_CAPACITY: usize = 10;

/// A Kalman-filtered sample annotated for weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSample {
    pub point: GeoPoint,
    pub accuracy: f64,
    pub speed: f64,
}

/// Averaging window for a ground speed in m/s.
///
/// Slow movement gets more smoothing, fast movement stays responsive.
pub fn window_for_speed(speed: f64) -> usize {
    if speed < 0.5 {
        5
    } else if speed < 2.0 {
        3
    } else if speed < 4.0 {
        2
    } else {
        1
    }
}

/// Weighted mean of `(point, accuracy)` pairs, oldest first.
///
/// The i-th pair gets weight `(i + 1) / max(accuracy, 1)`. Returns `None`
/// for an empty input.
pub fn weighted_mean<I>(samples: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = (GeoPoint, f64)>,
{
    let mut total_weight = 0.0;
    let mut lat = 0.0;
    let mut lng = 0.0;

    for (index, (point, accuracy)) in samples.into_iter().enumerate() {
        let weight = (index as f64 + 1.0) / accuracy.max(1.0);
        lat += point.latitude * weight;
        lng += point.longitude * weight;
        total_weight += weight;
    }

    (total_weight > 0.0).then(|| GeoPoint::new(lat / total_weight, lng / total_weight))
}

/// Smooth a whole trail with a causal window of `window` points.
///
/// Output point `i` is the [`weighted_mean`] of inputs `i + 1 - window ..= i`
/// (clamped at the start), so every output depends only on the unsmoothed
/// inputs. Single-sample windows copy the input, so the first point never
/// moves and a window of 1 returns the trail unchanged. `accuracies` pairs with `points`;
/// missing entries count as accuracy 1.
pub fn smooth_trail(points: &[GeoPoint], accuracies: &[f64], window: usize) -> Vec<GeoPoint> {
    let window = window.max(1);

    (0..points.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            if start == i {
                return points[i];
            }
            let samples = (start..=i).map(|j| (points[j], accuracies.get(j).copied().unwrap_or(1.0)));
            weighted_mean(samples).unwrap_or(points[i])
        })
        .collect()
}

/// Speed-adaptive smoother over Kalman-filtered samples.
#[derive(Debug, Clone)]
pub struct AdaptiveSmoother {
    recent: VecDeque<WeightedSample>,
    capacity: usize,
    kalman: GpsKalmanFilter,
}

impl Default for AdaptiveSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHER_CAPACITY, GpsKalmanFilter::default())
    }
}

impl AdaptiveSmoother {
    pub fn new(capacity: usize, kalman: GpsKalmanFilter) -> Self {
        let capacity = capacity.max(1);
        Self {
            recent: VecDeque::with_capacity(capacity),
            capacity,
            kalman,
        }
    }

    /// Filter a reading, buffer it and return the smoothed position.
    pub fn add_point(&mut self, point: GeoPoint, accuracy: f64, speed: f64) -> GeoPoint {
        let filtered = self.kalman.filter(point, accuracy);

        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(WeightedSample {
            point: filtered,
            accuracy,
            speed,
        });

        let window = window_for_speed(speed).min(self.recent.len());
        let skip = self.recent.len() - window;
        weighted_mean(self.recent.iter().skip(skip).map(|s| (s.point, s.accuracy)))
            .unwrap_or(filtered)
    }

    /// Buffered samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &WeightedSample> {
        self.recent.iter()
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn reset(&mut self) {
        self.recent.clear();
        self.kalman.reset();
    }
}
