//! The chopped/working representation: `TessLine` rings of `EdgePoint`s,
//! owned by `TBlob`s, owned by a `TWerd`.
//!
//! Per the spec's design-notes decision (§9), `EdgePoint::flags` is
//! replaced by named fields (`hidden`, `fixed`, `run_length`, `dir`) rather
//! than the legacy packed flag bytes.

use crate::containers::{CycleList, NodeId};
use crate::geometry::{Box, FPoint};

/// A vertex of a polygonal outline ring in the chopping/classification
/// working representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    pub pos: FPoint,
    /// Vector from this point to the next point in the ring.
    pub vec: FPoint,
    /// Set when this point lies within a currently-joined seam's hidden
    /// span (§4.3.4); bit 0 of the legacy `flags` byte.
    pub hidden: bool,
    /// Set by the polygonal approximator (§4.2) when this point is a
    /// sharp-bend corner that must survive simplification.
    pub fixed: bool,
    /// Run length of the identical-direction chain-code steps this point
    /// was collapsed from.
    pub run_length: u16,
    /// Direction code in 0..8, the step direction shifted into a
    /// finer-grained octant range.
    pub dir: u8,
}

impl EdgePoint {
    pub fn new(pos: FPoint, vec: FPoint) -> Self {
        EdgePoint {
            pos,
            vec,
            hidden: false,
            fixed: false,
            run_length: 0,
            dir: 0,
        }
    }
}

/// A ring of [`EdgePoint`]s approximating one closed outline (or hole) in
/// the chopped working representation.
#[derive(Clone)]
pub struct TessLine {
    pub ring: CycleList<EdgePoint>,
    pub is_hole: bool,
    /// The chopped blob index this outline belonged to at chop time
    /// (`None` for outlines not produced through [`TWerd::from_blobs`]).
    /// Stable across any number of `chop::join_pieces`/`break_pieces`
    /// cycles, so `break_pieces` can re-cut a joined outline list by
    /// outline identity rather than a separately-tracked length.
    pub piece_tag: Option<u32>,
}

impl TessLine {
    pub fn new(points: Vec<EdgePoint>, is_hole: bool) -> Self {
        let mut ring = CycleList::new();
        for p in points {
            ring.add_to_end(p);
        }
        TessLine { ring, is_hole, piece_tag: None }
    }

    pub fn bounding_box(&self) -> Box {
        let mut bbox = Box::empty();
        for p in self.ring.iter() {
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

    pub fn point_count(&self) -> usize {
        self.ring.len()
    }

    /// Does any point of this ring (within tolerance) sit at `pos`?
    pub fn contains_point(&self, pos: FPoint, tolerance: f32) -> bool {
        self.ring
            .iter()
            .any(|p| (p.pos.x - pos.x).abs() <= tolerance && (p.pos.y - pos.y).abs() <= tolerance)
    }

    /// Finds the id of the point whose position matches `pos` exactly, if
    /// any.
    pub fn find_point(&self, pos: FPoint) -> Option<NodeId> {
        self.ring.ids().find(|&id| {
            let p = self.ring.get(id);
            p.pos.x == pos.x && p.pos.y == pos.y
        })
    }
}

impl std::fmt::Debug for TessLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TessLine")
            .field("points", &self.point_count())
            .field("is_hole", &self.is_hole)
            .field("piece_tag", &self.piece_tag)
            .finish()
    }
}

/// A blob in the chopped working representation: an owned list of outline
/// rings (outer outlines plus any holes, all siblings at this level since
/// chopping does not track hole nesting explicitly).
#[derive(Debug, Default, Clone)]
pub struct TBlob {
    pub outlines: Vec<TessLine>,
}

impl TBlob {
    pub fn new() -> Self {
        TBlob::default()
    }

    pub fn bounding_box(&self) -> Box {
        self.outlines
            .iter()
            .map(|o| o.bounding_box())
            .fold(Box::empty(), |acc, b| acc.union(&b))
    }
}

/// A word in the chopped working representation, the unit the chopping and
/// segmentation-search subsystems operate on.
#[derive(Debug, Default, Clone)]
pub struct TWerd {
    pub blobs: Vec<TBlob>,
    pub latin_script: bool,
}

impl TWerd {
    pub fn new() -> Self {
        TWerd::default()
    }

    /// Builds a `TWerd` from already-chopped blobs, tagging every outline
    /// with its blob's index so `chop::break_pieces` can later re-cut a
    /// joined outline list by outline identity.
    pub fn from_blobs(mut blobs: Vec<TBlob>) -> Self {
        for (i, blob) in blobs.iter_mut().enumerate() {
            for outline in &mut blob.outlines {
                outline.piece_tag = Some(i as u32);
            }
        }
        TWerd {
            blobs,
            latin_script: true,
        }
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    /// Width in image-space units of the chopped blobs `[col, row]`
    /// inclusive, i.e. the union bounding box's width.
    pub fn span_width(&self, col: usize, row: usize) -> i32 {
        let mut bbox = Box::empty();
        for blob in &self.blobs[col..=row] {
            bbox = bbox.union(&blob.bounding_box());
        }
        bbox.width() as i32
    }

    /// Horizontal gap between blobs `i` and `i+1` (negative if they
    /// overlap on x).
    pub fn gap_between(&self, i: usize) -> i32 {
        let a = self.blobs[i].bounding_box();
        let b = self.blobs[i + 1].bounding_box();
        a.x_gap(&b)
    }
}
