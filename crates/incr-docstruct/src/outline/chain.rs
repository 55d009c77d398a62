//! Chain-coded outlines and the blobs that own them.
//!
//! Mirrors `ccstruct/coutln.h` (`C_OUTLINE`) and `ccstruct/stepblob.h`
//! (`C_BLOB`): a chain code preserves sub-pixel edge information that the
//! polygonal representation in [`crate::outline::poly`] discards.

use crate::error::{DocStructError, Result};
use crate::geometry::{Box, IPoint};

/// The hard limit on chain-code step count, preventing a runaway outline
/// from a corrupted binarization.
pub const MAX_OUTLINE_STEPS: usize = 16_000;

/// One of the four chain-code step directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    Right, // (1, 0)
    Up,    // (0, 1)
    Left,  // (-1, 0)
    Down,  // (0, -1)
}

impl ChainStep {
    pub fn delta(self) -> IPoint {
        match self {
            ChainStep::Right => IPoint::new(1, 0),
            ChainStep::Up => IPoint::new(0, 1),
            ChainStep::Left => IPoint::new(-1, 0),
            ChainStep::Down => IPoint::new(0, -1),
        }
    }

    /// Direction code in 0..4, used as the packed 2-bit chain code value.
    pub fn code(self) -> u8 {
        match self {
            ChainStep::Right => 0,
            ChainStep::Up => 1,
            ChainStep::Left => 2,
            ChainStep::Down => 3,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code & 0x3 {
            0 => Ok(ChainStep::Right),
            1 => Ok(ChainStep::Up),
            2 => Ok(ChainStep::Left),
            3 => Ok(ChainStep::Down),
            _ => unreachable!(),
        }
    }
}

/// Optional sub-pixel edge information attached to a chain-code step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeOffset {
    /// Numerator of the sub-pixel offset fraction.
    pub offset_numerator: i8,
    /// Absolute pixel-value difference across the edge.
    pub pixel_diff: u8,
    /// Gradient direction, in the same units as the step's direction code.
    pub direction: u8,
}

impl EdgeOffset {
    /// `edge_strength == 0` means the gradient conflicts with the step
    /// direction and the step should be skipped by classifiers.
    pub fn edge_strength(&self) -> u8 {
        if self.direction == 0 {
            0
        } else {
            self.pixel_diff
        }
    }
}

/// A single chain-coded closed outline, with optional nested hole outlines.
#[derive(Debug, Clone)]
pub struct COutline {
    pub start: IPoint,
    pub steps: Vec<ChainStep>,
    pub offsets: Vec<Option<EdgeOffset>>,
    bbox: Box,
    pub children: Vec<COutline>,
}

impl COutline {
    /// Builds an outline from a start position and chain-code steps,
    /// validating the step-count limit.
    pub fn new(start: IPoint, steps: Vec<ChainStep>) -> Result<Self> {
        if steps.len() > MAX_OUTLINE_STEPS {
            return Err(DocStructError::InvariantViolation {
                word: 0,
                reason: format!(
                    "outline has {} steps, exceeding the {} limit",
                    steps.len(),
                    MAX_OUTLINE_STEPS
                ),
            });
        }
        let offsets = vec![None; steps.len()];
        let bbox = Self::compute_bbox(start, &steps);
        Ok(COutline {
            start,
            steps,
            offsets,
            bbox,
            children: Vec::new(),
        })
    }

    fn compute_bbox(start: IPoint, steps: &[ChainStep]) -> Box {
        let mut pos = start;
        let mut bbox = Box::from_corners(pos, pos);
        for step in steps {
            pos = pos + step.delta();
            bbox = bbox.union(&Box::from_corners(pos, pos));
        }
        bbox
    }

    pub fn bounding_box(&self) -> Box {
        self.bbox
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Signed area enclosed by the chain code (shoelace formula over the
    /// step vectors), positive for a counter-clockwise outer outline.
    pub fn outer_area(&self) -> i64 {
        let mut pos = self.start;
        let mut area: i64 = 0;
        for step in &self.steps {
            let next = pos + step.delta();
            area += pos.x as i64 * next.y as i64 - next.x as i64 * pos.y as i64;
            pos = next;
        }
        area / 2
    }

    /// Adds `child` as a hole, validating the "opposite sign outer area"
    /// nesting invariant.
    pub fn add_child(&mut self, child: COutline) -> Result<()> {
        let parent_area = self.outer_area();
        let child_area = child.outer_area();
        if parent_area != 0
            && child_area != 0
            && parent_area.signum() == child_area.signum()
        {
            return Err(DocStructError::InvariantViolation {
                word: 0,
                reason: "child outline is not legally nested (area sign matches parent)"
                    .to_string(),
            });
        }
        self.children.push(child);
        Ok(())
    }

    pub fn translate(&mut self, vec: IPoint) {
        self.start = self.start + vec;
        self.bbox = self.bbox.translate(vec);
        for child in &mut self.children {
            child.translate(vec);
        }
    }

    /// All vertex positions visited while walking the chain code, in order,
    /// not including the implicit closing edge back to `start`.
    pub fn vertices(&self) -> Vec<IPoint> {
        let mut pos = self.start;
        let mut out = Vec::with_capacity(self.steps.len());
        out.push(pos);
        for step in &self.steps[..self.steps.len().saturating_sub(1)] {
            pos = pos + step.delta();
            out.push(pos);
        }
        out
    }
}

/// A connected component represented by its chain-coded top-level outlines
/// (each possibly holding hole outlines as children).
#[derive(Debug, Clone, Default)]
pub struct CBlob {
    pub outlines: Vec<COutline>,
}

impl CBlob {
    pub fn new() -> Self {
        CBlob::default()
    }

    pub fn bounding_box(&self) -> Box {
        self.outlines
            .iter()
            .map(|o| o.bounding_box())
            .fold(Box::empty(), |acc, b| acc.union(&b))
    }

    pub fn translate(&mut self, vec: IPoint) {
        for outline in &mut self.outlines {
            outline.translate(vec);
        }
    }
}
