//! Polygonal outlines, the product of approximating a chain-coded
//! [`super::chain::COutline`] (see [`crate::polyapprox`]).
//!
//! Mirrors `ccstruct/polyblk.h` / `ccstruct/polyvert.h`.

use crate::geometry::{Box, FPoint};

/// One vertex of a polygonal outline ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyPoint {
    pub pos: FPoint,
    /// Vector from this point to the next point in the ring.
    pub vec: FPoint,
}

impl PolyPoint {
    pub fn new(pos: FPoint, vec: FPoint) -> Self {
        Self { pos, vec }
    }
}

/// An ordered ring of [`PolyPoint`]s approximating a chain-coded outline,
/// with its own nested hole outlines.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub points: Vec<PolyPoint>,
    pub children: Vec<Outline>,
}

impl Outline {
    pub fn new(points: Vec<PolyPoint>) -> Self {
        Outline {
            points,
            children: Vec::new(),
        }
    }

    pub fn bounding_box(&self) -> Box {
        let mut bbox = Box::empty();
        for p in &self.points {
            let pt_box = Box::new(
                p.pos.x.floor() as i16,
                p.pos.y.floor() as i16,
                p.pos.x.ceil() as i16,
                p.pos.y.ceil() as i16,
            );
            bbox = bbox.union(&pt_box);
        }
        bbox
    }

    /// Recomputes each point's `vec` as `next.pos - self.pos`, per the
    /// polygonal-approximation finishing step.
    pub fn recompute_vectors(&mut self) {
        let n = self.points.len();
        if n == 0 {
            return;
        }
        let positions: Vec<FPoint> = self.points.iter().map(|p| p.pos).collect();
        for i in 0..n {
            self.points[i].vec = positions[(i + 1) % n] - positions[i];
        }
    }
}

/// A connected component represented as top-level polygonal outlines.
#[derive(Debug, Clone, Default)]
pub struct PBlob {
    pub outlines: Vec<Outline>,
}

impl PBlob {
    pub fn new() -> Self {
        PBlob::default()
    }

    pub fn bounding_box(&self) -> Box {
        self.outlines
            .iter()
            .map(|o| o.bounding_box())
            .fold(Box::empty(), |acc, b| acc.union(&b))
    }
}
