//! Captured territory records and their spatial store.
//!
//! Uses an R-tree of territory bounds so overlap and hit-test queries only
//! run the exact polygon test against nearby candidates.

use geo::{Coord, LineString, Polygon};
use log::debug;
use rand::Rng;
use rstar::{AABB, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::geometry::{point_in_polygon, polygons_overlap};
use crate::{Bounds, GeoPoint};

/// A finalized, validated capture. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Territory {
    /// Unique identifier, e.g. "territory-1718000000000-k3j9x0a1b"
    pub id: String,
    pub owner_id: String,
    /// Closed, simplified ring (first == last within 1 m)
    pub polygon: Vec<GeoPoint>,
    /// Mean of the ring's vertices
    pub center: GeoPoint,
    pub area_sq_meters: f64,
    pub captured_at_epoch_ms: i64,
    /// Time from capture start to finalization
    pub duration_ms: i64,
    /// Distance walked during the capture, in meters
    pub distance_meters: f64,
    pub raw_point_count: usize,
    pub simplified_point_count: usize,
    /// Previously captured territories this one overlaps (informational)
    #[serde(default)]
    pub overlapping_ids: Vec<String>,
}

impl Territory {
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.polygon)
    }

    /// Whether a point lies inside the territory's polygon.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point_in_polygon(point, &self.polygon)
    }

    pub fn overlaps_existing(&self) -> bool {
        !self.overlapping_ids.is_empty()
    }

    /// The polygon as a `geo` polygon with x = longitude, y = latitude.
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        let exterior: LineString<f64> = self
            .polygon
            .iter()
            .map(|p| Coord {
                x: p.longitude,
                y: p.latitude,
            })
            .collect();
        Polygon::new(exterior, vec![])
    }
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a territory id from a timestamp and a random base-36 suffix.
pub fn generate_territory_id(now_ms: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("territory-{}-{}", now_ms, suffix)
}

/// Territory bounds wrapper for R-tree indexing.
#[derive(Debug, Clone)]
struct TerritoryEnvelope {
    index: usize,
    bounds: Bounds,
}

impl RTreeObject for TerritoryEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope_of(&self.bounds)
    }
}

fn envelope_of(bounds: &Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners(
        [bounds.min_lng, bounds.min_lat],
        [bounds.max_lng, bounds.max_lat],
    )
}

/// Insertion-ordered collection of territories with a spatial index.
#[derive(Debug, Default)]
pub struct TerritoryStore {
    territories: Vec<Territory>,
    tree: RTree<TerritoryEnvelope>,
}

impl TerritoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a territory. Territories without vertices are stored but not indexed.
    pub fn insert(&mut self, territory: Territory) {
        let index = self.territories.len();
        if let Some(bounds) = territory.bounds() {
            self.tree.insert(TerritoryEnvelope { index, bounds });
        }
        self.territories.push(territory);
    }

    /// Stored territories whose polygon overlaps `polygon`, in insertion order.
    pub fn find_overlapping(&self, polygon: &[GeoPoint]) -> Vec<&Territory> {
        let Some(bounds) = Bounds::from_points(polygon) else {
            return Vec::new();
        };

        let mut candidates: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope_of(&bounds))
            .map(|e| e.index)
            .collect();
        candidates.sort_unstable();
        debug!(
            "Overlap check: {} candidates of {} territories",
            candidates.len(),
            self.territories.len()
        );

        #[cfg(feature = "parallel")]
        let hits: Vec<usize> = candidates
            .into_par_iter()
            .filter(|&i| polygons_overlap(polygon, &self.territories[i].polygon))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let hits: Vec<usize> = candidates
            .into_iter()
            .filter(|&i| polygons_overlap(polygon, &self.territories[i].polygon))
            .collect();

        hits.into_iter().map(|i| &self.territories[i]).collect()
    }

    /// The earliest captured territory containing `point`.
    pub fn territory_at(&self, point: &GeoPoint) -> Option<&Territory> {
        let probe = AABB::from_point([point.longitude, point.latitude]);
        self.tree
            .locate_in_envelope_intersecting(&probe)
            .map(|e| e.index)
            .filter(|&i| self.territories[i].contains(point))
            .min()
            .map(|i| &self.territories[i])
    }

    pub fn get(&self, id: &str) -> Option<&Territory> {
        self.territories.iter().find(|t| t.id == id)
    }

    pub fn as_slice(&self) -> &[Territory] {
        &self.territories
    }

    pub fn iter(&self) -> impl Iterator<Item = &Territory> {
        self.territories.iter()
    }

    pub fn total_area(&self) -> f64 {
        self.territories.iter().map(|t| t.area_sq_meters).sum()
    }

    pub fn len(&self) -> usize {
        self.territories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    pub fn clear(&mut self) {
        self.territories.clear();
        self.tree = RTree::new();
    }
}
