use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::DomainResult;

/// A single map coordinate as `[x, y]`.
pub type Point = [f64; 2];

/// A closed contour: first and last point identical, at least four points.
pub type Ring = Vec<Point>;

const MIN_RING_POINTS: usize = 4;

/// Polygon geometry: one outer ring plus zero or more interior holes.
///
/// Instances only exist in validated form; `from_rings` is the sole way to
/// build one from wire data, and `to_rings` is its exact structural inverse.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Polygon {
    outer: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    /// Decodes a nested ring set. The first ring is the outer boundary, the
    /// rest are holes. Point order is preserved verbatim.
    pub fn from_rings(rings: &[Ring]) -> DomainResult<Self> {
        let (outer, holes) = rings.split_first().ok_or(DomainError::EmptyCoordinates)?;
        validate_ring(outer)?;
        for hole in holes {
            validate_ring(hole)?;
        }
        Ok(Self {
            outer: outer.clone(),
            holes: holes.to_vec(),
        })
    }

    /// Encodes back to the nested ring representation, outer ring first.
    pub fn to_rings(&self) -> Vec<Ring> {
        let mut rings = Vec::with_capacity(1 + self.holes.len());
        rings.push(self.outer.clone());
        rings.extend(self.holes.iter().cloned());
        rings
    }

    pub fn outer(&self) -> &Ring {
        &self.outer
    }

    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Display area: outer ring area minus the holes. Snapshotted onto the
    /// association at creation time, never recomputed afterwards.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|ring| ring_area(ring)).sum();
        (ring_area(&self.outer) - holes).max(0.0)
    }

    /// A representative point for map centering, guaranteed to lie inside
    /// the polygon. The outer-ring centroid is used when it qualifies; when
    /// a hole or concavity swallows it, the point moves to the midpoint of
    /// the widest covered span on the horizontal line through the centroid.
    pub fn interior_point(&self) -> Point {
        let centroid = ring_centroid(&self.outer);
        if self.contains(centroid) {
            return centroid;
        }
        self.scanline_point(centroid[1]).unwrap_or(centroid)
    }

    fn contains(&self, point: Point) -> bool {
        point_in_ring(&self.outer, point)
            && !self.holes.iter().any(|hole| point_in_ring(hole, point))
    }

    /// Intersects the horizontal line at `y` with every ring. With even-odd
    /// filling the sorted crossings pair up into covered spans; the midpoint
    /// of the widest span is interior.
    fn scanline_point(&self, y: f64) -> Option<Point> {
        let mut crossings = Vec::new();
        for ring in std::iter::once(&self.outer).chain(self.holes.iter()) {
            for pair in ring.windows(2) {
                let [x1, y1] = pair[0];
                let [x2, y2] = pair[1];
                if (y1 <= y) != (y2 <= y) {
                    crossings.push(x1 + (y - y1) / (y2 - y1) * (x2 - x1));
                }
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        crossings
            .chunks_exact(2)
            .max_by(|a, b| (a[1] - a[0]).total_cmp(&(b[1] - b[0])))
            .map(|span| [(span[0] + span[1]) / 2.0, y])
    }
}

/// Even-odd point-in-ring test over the closed ring's edges.
fn point_in_ring(ring: &Ring, [px, py]: Point) -> bool {
    let mut inside = false;
    for pair in ring.windows(2) {
        let [x1, y1] = pair[0];
        let [x2, y2] = pair[1];
        if (y1 <= py) != (y2 <= py) && px < x1 + (py - y1) / (y2 - y1) * (x2 - x1) {
            inside = !inside;
        }
    }
    inside
}

fn validate_ring(ring: &Ring) -> DomainResult<()> {
    if ring.len() < MIN_RING_POINTS {
        return Err(DomainError::IncorrectCoordinates);
    }
    let first = ring.first().ok_or(DomainError::IncorrectCoordinates)?;
    let last = ring.last().ok_or(DomainError::IncorrectCoordinates)?;
    if first != last {
        return Err(DomainError::IncorrectCoordinates);
    }
    Ok(())
}

/// Shoelace area of a closed ring, sign-independent.
fn ring_area(ring: &Ring) -> f64 {
    let mut twice_area = 0.0;
    for pair in ring.windows(2) {
        let [x1, y1] = pair[0];
        let [x2, y2] = pair[1];
        twice_area += x1 * y2 - x2 * y1;
    }
    (twice_area / 2.0).abs()
}

fn ring_centroid(ring: &Ring) -> Point {
    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for pair in ring.windows(2) {
        let [x1, y1] = pair[0];
        let [x2, y2] = pair[1];
        let cross = x1 * y2 - x2 * y1;
        twice_area += cross;
        cx += (x1 + x2) * cross;
        cy += (y1 + y2) * cross;
    }
    if twice_area.abs() < f64::EPSILON {
        // Degenerate ring: average the distinct vertices instead.
        let count = (ring.len() - 1).max(1) as f64;
        let sum = ring[..ring.len() - 1]
            .iter()
            .fold([0.0, 0.0], |acc, [x, y]| [acc[0] + x, acc[1] + y]);
        return [sum[0] / count, sum[1] / count];
    }
    let scale = 3.0 * twice_area;
    [cx / scale, cy / scale]
}
