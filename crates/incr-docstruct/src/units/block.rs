//! `Block`: a region of the page with a polygonal boundary and row list
//! (§3.3). Mirrors `ccstruct/ocrblock.h` (`BLOCK`) / `ccstruct/pdblock.h`.

use crate::geometry::{Box, IPoint, Rotation};
use crate::outline::CBlob;
use crate::units::row::Row;

/// A (possibly non-rectangular) block boundary, described by independent
/// left-side and right-side vertex chains walked top-to-bottom.
#[derive(Debug, Clone, Default)]
pub struct BlockPolygon {
    pub left_vertices: Vec<IPoint>,
    pub right_vertices: Vec<IPoint>,
}

impl BlockPolygon {
    pub fn rectangle(box_: Box) -> Self {
        BlockPolygon {
            left_vertices: vec![
                IPoint::new(box_.left(), box_.bottom()),
                IPoint::new(box_.left(), box_.top()),
            ],
            right_vertices: vec![
                IPoint::new(box_.right(), box_.bottom()),
                IPoint::new(box_.right(), box_.top()),
            ],
        }
    }

    /// The bounding box of all vertices on both chains.
    pub fn bounding_box(&self) -> Box {
        self.left_vertices
            .iter()
            .chain(self.right_vertices.iter())
            .map(|&p| Box::from_corners(p, p))
            .fold(Box::empty(), |acc, b| acc.union(&b))
    }
}

/// A region of the page: a polygonal boundary, its rows, any raw blobs
/// layout couldn't attach to a row, and the three rotations external
/// layout analysis established.
#[derive(Debug, Default)]
pub struct Block {
    pub boundary: BlockPolygon,
    pub rows: Vec<Row>,
    pub leftover_blobs: Vec<CBlob>,
    /// Layout space -> image space.
    pub re_rotation: Rotation,
    /// Image space -> classifier space (secondary normalization).
    pub classify_rotation: Rotation,
    /// Horizontal skew direction in image coordinates.
    pub skew: Rotation,
    pub filename: String,
    pub median_blob_size: f32,
    pub fixed_pitch: bool,
    pub x_height: f32,
}

impl Block {
    pub fn new(boundary: BlockPolygon) -> Self {
        Block {
            boundary,
            rows: Vec::new(),
            leftover_blobs: Vec::new(),
            re_rotation: Rotation::identity(),
            classify_rotation: Rotation::identity(),
            skew: Rotation::identity(),
            filename: String::new(),
            median_blob_size: 0.0,
            fixed_pitch: false,
            x_height: 0.0,
        }
    }

    /// The §3.3 invariant: the block's polygon bounding box equals its
    /// `Box`.
    pub fn bounding_box(&self) -> Box {
        self.boundary.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_boundary_bbox_matches_box() {
        let b = Box::new(0, 0, 100, 200);
        let block = Block::new(BlockPolygon::rectangle(b));
        assert_eq!(block.bounding_box(), b);
    }
}
