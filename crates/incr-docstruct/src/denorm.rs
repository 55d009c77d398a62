//! Coordinate denormalization: the chain of affine-plus-piecewise-y
//! transforms mapping image space to "baseline-normalized" classifier
//! space and back (§3.4). Mirrors `ccstruct/normalis.h` (`DENORM`).
//!
//! Per the spec's design notes (§9), this is represented as an explicit
//! sequence of transform stages rather than a recursive predecessor-ref
//! chain: stage 0 is applied first (and may additionally invert a block's
//! `re_rotation` when it has no true predecessor of its own), later stages
//! are applied afterward.

use crate::geometry::{FPoint, Rotation};
use crate::units::BaselineSpline;

/// Baseline-normalized cell height; the classifier's full glyph cell.
pub const NORMALIZED_CELL_HEIGHT: f32 = 256.0;
/// Baseline-normalized x-height.
pub const NORMALIZED_X_HEIGHT: f32 = 128.0;
/// Baseline-normalized baseline offset from y = 0.
pub const NORMALIZED_BASELINE_OFFSET: f32 = 64.0;

/// One per-x-range override of the local y origin/scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YSegment {
    pub x_start: f32,
    pub y_coord: f32,
    pub y_scale: f32,
}

/// One stage of the denormalization chain.
#[derive(Debug, Clone)]
pub struct DenormStage {
    pub x_origin: f32,
    pub y_origin: f32,
    pub x_scale: f32,
    pub y_scale: f32,
    pub final_xshift: f32,
    pub final_yshift: f32,
    pub rotation: Option<Rotation>,
    /// Sorted ascending by `x_start`.
    pub y_segments: Vec<YSegment>,
    /// The owning row's baseline, consulted by `Y0` when no y-segment
    /// covers `x`.
    pub baseline: Option<BaselineSpline>,
    /// Set only on the root stage (index 0) when a block is present and
    /// there is no true predecessor: its inverse is applied before this
    /// stage's own local transform.
    pub block_re_rotation: Option<Rotation>,
    pub inverse: bool,
}

impl DenormStage {
    pub fn identity() -> Self {
        DenormStage {
            x_origin: 0.0,
            y_origin: 0.0,
            x_scale: 1.0,
            y_scale: 1.0,
            final_xshift: 0.0,
            final_yshift: 0.0,
            rotation: None,
            y_segments: Vec::new(),
            baseline: None,
            block_re_rotation: None,
            inverse: false,
        }
    }

    /// Binary search for the segment with the greatest `x_start <= x`.
    fn lookup_segment(&self, x: f32) -> Option<&YSegment> {
        let idx = self
            .y_segments
            .partition_point(|seg| seg.x_start <= x);
        if idx == 0 {
            None
        } else {
            Some(&self.y_segments[idx - 1])
        }
    }

    fn y0(&self, x: f32) -> f32 {
        if let Some(seg) = self.lookup_segment(x) {
            seg.y_coord
        } else if let Some(baseline) = &self.baseline {
            baseline.y(x as f64) as f32 + self.y_origin
        } else {
            self.y_origin
        }
    }

    fn ys(&self, x: f32) -> f32 {
        self.lookup_segment(x).map(|s| s.y_scale).unwrap_or(self.y_scale)
    }

    fn apply_local(&self, p: FPoint) -> FPoint {
        let x2 = (p.x - self.x_origin) * self.x_scale + self.final_xshift;
        let y0 = self.y0(p.x);
        let ys = self.ys(p.x);
        let y2 = (p.y - y0) * ys + self.final_yshift;
        let out = FPoint::new(x2, y2);
        match self.rotation {
            Some(r) => r.apply(out),
            None => out,
        }
    }

    fn reverse_local(&self, p: FPoint) -> FPoint {
        let unrotated = match self.rotation {
            Some(r) => r.reverse().apply(p),
            None => p,
        };
        let x1 = if self.x_scale != 0.0 {
            (unrotated.x - self.final_xshift) / self.x_scale + self.x_origin
        } else {
            self.x_origin
        };
        let ys = self.ys(x1);
        let y0 = self.y0(x1);
        let y1 = if ys != 0.0 {
            (unrotated.y - self.final_yshift) / ys + y0
        } else {
            y0
        };
        FPoint::new(x1, y1)
    }
}

/// An ordered sequence of denormalization stages; the full chain from
/// image space to classifier space.
#[derive(Debug, Clone, Default)]
pub struct Denorm {
    stages: Vec<DenormStage>,
}

impl Denorm {
    pub fn new() -> Self {
        Denorm { stages: Vec::new() }
    }

    pub fn push(&mut self, stage: DenormStage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[DenormStage] {
        &self.stages
    }

    pub fn is_inverse(&self) -> bool {
        self.stages.last().map(|s| s.inverse).unwrap_or(false)
    }

    /// Image space -> classifier space.
    pub fn forward(&self, p: FPoint) -> FPoint {
        let mut cur = p;
        for (i, stage) in self.stages.iter().enumerate() {
            if i == 0 {
                if let Some(re_rotation) = stage.block_re_rotation {
                    cur = re_rotation.reverse().apply(cur);
                }
            }
            cur = stage.apply_local(cur);
        }
        cur
    }

    /// Classifier space -> image space.
    pub fn reverse(&self, p: FPoint) -> FPoint {
        let mut cur = p;
        for (i, stage) in self.stages.iter().enumerate().rev() {
            cur = stage.reverse_local(cur);
            if i == 0 {
                if let Some(re_rotation) = stage.block_re_rotation {
                    cur = re_rotation.apply(cur);
                }
            }
        }
        cur
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_then_reverse_round_trips() {
        let mut denorm = Denorm::new();
        let mut stage = DenormStage::identity();
        stage.x_origin = 10.0;
        stage.y_origin = 20.0;
        stage.x_scale = 2.0;
        stage.y_scale = 0.5;
        stage.final_xshift = 5.0;
        stage.final_yshift = 64.0;
        denorm.push(stage);

        let p = FPoint::new(100.0, 150.0);
        let classified = denorm.forward(p);
        let back = denorm.reverse(classified);
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn y_segment_overrides_row_baseline() {
        let mut stage = DenormStage::identity();
        stage.baseline = Some(BaselineSpline::line(0.0, 0.0));
        stage.y_segments = vec![
            YSegment { x_start: 0.0, y_coord: 100.0, y_scale: 1.0 },
            YSegment { x_start: 50.0, y_coord: 200.0, y_scale: 1.0 },
        ];
        assert_eq!(stage.y0(10.0), 100.0);
        assert_eq!(stage.y0(60.0), 200.0);
    }

    #[test]
    fn falls_back_to_baseline_then_origin() {
        let mut stage = DenormStage::identity();
        stage.y_origin = 5.0;
        // No segments, no baseline: y0 == y_origin everywhere.
        assert_eq!(stage.y0(42.0), 5.0);
        stage.baseline = Some(BaselineSpline::line(1.0, 0.0)); // y = x
        assert_eq!(stage.y0(42.0), 42.0 + 5.0);
    }

    #[test]
    fn block_re_rotation_applied_only_on_root_stage() {
        let mut denorm = Denorm::new();
        let mut root = DenormStage::identity();
        root.block_re_rotation = Some(Rotation::new(0.0, 1.0)); // 90 degree
        denorm.push(root);
        denorm.push(DenormStage::identity());

        let p = FPoint::new(1.0, 0.0);
        let out = denorm.forward(p);
        // reverse(re_rotation) of (1,0) with (cx=0, cy=1): (cx,-cy) = (0,-1)
        // (x,y) -> (x*cx - y*cy, x*cy + y*cx) = (0*1 - 0*0, 1*0 + 0*0)... compute directly.
        assert!((out.x - 0.0).abs() < 1e-5);
        assert!((out.y - (-1.0)).abs() < 1e-5);
    }
}
