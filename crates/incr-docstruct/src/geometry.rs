//! Integer/float points and axis-aligned boxes.
//!
//! Mirrors the semantics of `ICOORD`/`FCOORD`/`TBOX` from the legacy
//! `ccstruct/points.h` and `ccstruct/rect.h`: boxes store only their two
//! extreme corners, empty boxes are canonicalized to `(MAX, MAX, -MAX, -MAX)`,
//! and rotation does not itself enlarge a box.

use serde::{Deserialize, Serialize};

/// An integer point in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IPoint {
    pub x: i16,
    pub y: i16,
}

impl IPoint {
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Rotates this point by the unit direction `(cx, cy)`.
    pub fn rotate(&self, cx: f32, cy: f32) -> IPoint {
        let x = self.x as f32;
        let y = self.y as f32;
        IPoint::new(
            (x * cx - y * cy).round() as i16,
            (x * cy + y * cx).round() as i16,
        )
    }

    /// Rotates this point by the reverse of the unit direction `(cx, cy)`.
    pub fn reverse_rotate(&self, cx: f32, cy: f32) -> IPoint {
        self.rotate(cx, -cy)
    }
}

impl std::ops::Add for IPoint {
    type Output = IPoint;
    fn add(self, rhs: IPoint) -> IPoint {
        IPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for IPoint {
    type Output = IPoint;
    fn sub(self, rhs: IPoint) -> IPoint {
        IPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A floating-point point, typically in classifier or polygonal-outline space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FPoint {
    pub x: f32,
    pub y: f32,
}

impl FPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotates this point by the unit direction `(cx, cy)`.
    ///
    /// `(x, y) -> (x*cx - y*cy, x*cy + y*cx)`, valid only when
    /// `cx*cx + cy*cy` is (approximately) 1.
    pub fn rotate(&self, cx: f32, cy: f32) -> FPoint {
        FPoint::new(self.x * cx - self.y * cy, self.x * cy + self.y * cx)
    }

    /// Rotates by the reverse of the unit direction `(cx, cy)`.
    pub fn reverse_rotate(&self, cx: f32, cy: f32) -> FPoint {
        self.rotate(cx, -cy)
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Signed 2-D cross product `self x other`.
    pub fn cross(&self, other: FPoint) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(&self, other: FPoint) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl std::ops::Add for FPoint {
    type Output = FPoint;
    fn add(self, rhs: FPoint) -> FPoint {
        FPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for FPoint {
    type Output = FPoint;
    fn sub(self, rhs: FPoint) -> FPoint {
        FPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for FPoint {
    type Output = FPoint;
    fn neg(self) -> FPoint {
        FPoint::new(-self.x, -self.y)
    }
}

impl From<IPoint> for FPoint {
    fn from(p: IPoint) -> Self {
        FPoint::new(p.x as f32, p.y as f32)
    }
}

/// An axis-aligned integer bounding box.
///
/// The canonical empty box has `bl = (MAX, MAX)` and `tr = (-MAX, -MAX)`,
/// matching the legacy `TBOX` default constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Box {
    pub bl: IPoint,
    pub tr: IPoint,
}

impl Box {
    /// Constructs a box from two opposite corners in any order.
    pub fn from_corners(pt1: IPoint, pt2: IPoint) -> Self {
        let (left, right) = if pt1.x <= pt2.x {
            (pt1.x, pt2.x)
        } else {
            (pt2.x, pt1.x)
        };
        let (bottom, top) = if pt1.y <= pt2.y {
            (pt1.y, pt2.y)
        } else {
            (pt2.y, pt1.y)
        };
        Box {
            bl: IPoint::new(left, bottom),
            tr: IPoint::new(right, top),
        }
    }

    pub fn new(left: i16, bottom: i16, right: i16, top: i16) -> Self {
        Box {
            bl: IPoint::new(left, bottom),
            tr: IPoint::new(right, top),
        }
    }

    /// The canonical empty box.
    pub fn empty() -> Self {
        Box::new(i16::MAX, i16::MAX, -i16::MAX, -i16::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.bl.x >= self.tr.x || self.bl.y >= self.tr.y
    }

    pub fn left(&self) -> i16 {
        self.bl.x
    }
    pub fn right(&self) -> i16 {
        self.tr.x
    }
    pub fn bottom(&self) -> i16 {
        self.bl.y
    }
    pub fn top(&self) -> i16 {
        self.tr.y
    }

    pub fn width(&self) -> i16 {
        if self.is_empty() {
            0
        } else {
            self.tr.x - self.bl.x
        }
    }

    pub fn height(&self) -> i16 {
        if self.is_empty() {
            0
        } else {
            self.tr.y - self.bl.y
        }
    }

    pub fn area(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.width() as i32 * self.height() as i32
        }
    }

    pub fn contains_point(&self, pt: IPoint) -> bool {
        pt.x >= self.bl.x && pt.x <= self.tr.x && pt.y >= self.bl.y && pt.y <= self.tr.y
    }

    pub fn contains_box(&self, other: &Box) -> bool {
        self.contains_point(other.bl) && self.contains_point(other.tr)
    }

    pub fn translate(&self, vec: IPoint) -> Box {
        Box {
            bl: self.bl + vec,
            tr: self.tr + vec,
        }
    }

    pub fn pad(&self, xpad: i16, ypad: i16) -> Box {
        Box::new(
            self.bl.x - xpad,
            self.bl.y - ypad,
            self.tr.x + xpad,
            self.tr.y + ypad,
        )
    }

    /// Rotates only the two stored corners; does not enlarge the box to
    /// contain the rotated content. Use [`Box::rotate_large`] for that.
    pub fn rotate(&self, cx: f32, cy: f32) -> Box {
        Box::from_corners(self.bl.rotate(cx, cy), self.tr.rotate(cx, cy))
    }

    /// Rotates all four corners and returns the union, guaranteeing the
    /// rotated content is fully contained within the result.
    pub fn rotate_large(&self, cx: f32, cy: f32) -> Box {
        let top_left = IPoint::new(self.bl.x, self.tr.y).rotate(cx, cy);
        let bottom_right = IPoint::new(self.tr.x, self.bl.y).rotate(cx, cy);
        let rotated = self.rotate(cx, cy);
        let corner_box = Box::from_corners(top_left, bottom_right);
        rotated.union(&corner_box)
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Box) -> Box {
        Box::new(
            self.bl.x.min(other.bl.x),
            self.bl.y.min(other.bl.y),
            self.tr.x.max(other.tr.x),
            self.tr.y.max(other.tr.y),
        )
    }

    /// Largest box contained in both `self` and `other`; the canonical
    /// empty box if they do not overlap.
    pub fn intersection(&self, other: &Box) -> Box {
        if self.overlap(other) {
            Box::new(
                self.bl.x.max(other.bl.x),
                self.bl.y.max(other.bl.y),
                self.tr.x.min(other.tr.x),
                self.tr.y.min(other.tr.y),
            )
        } else {
            Box::empty()
        }
    }

    /// Do the boxes touch or overlap on both axes?
    pub fn overlap(&self, other: &Box) -> bool {
        other.bl.x <= self.tr.x
            && other.tr.x >= self.bl.x
            && other.bl.y <= self.tr.y
            && other.tr.y >= self.bl.y
    }

    pub fn x_overlap(&self, other: &Box) -> bool {
        other.bl.x <= self.tr.x && other.tr.x >= self.bl.x
    }

    pub fn y_overlap(&self, other: &Box) -> bool {
        other.bl.y <= self.tr.y && other.tr.y >= self.bl.y
    }

    /// Do the boxes overlap by at least half the smaller side on both axes?
    pub fn major_overlap(&self, other: &Box) -> bool {
        let mut x_overlap = self.tr.x.min(other.tr.x) as i32 - self.bl.x.max(other.bl.x) as i32;
        x_overlap += x_overlap;
        if x_overlap < (self.width() as i32).min(other.width() as i32) {
            return false;
        }
        let mut y_overlap = self.tr.y.min(other.tr.y) as i32 - self.bl.y.max(other.bl.y) as i32;
        y_overlap += y_overlap;
        if y_overlap < (self.height() as i32).min(other.height() as i32) {
            return false;
        }
        true
    }

    /// Do the boxes overlap on x by at least half the narrower box's width?
    pub fn major_x_overlap(&self, other: &Box) -> bool {
        let mut overlap = other.width() as i32;
        if self.left() > other.left() {
            overlap -= (self.left() - other.left()) as i32;
        }
        if self.right() < other.right() {
            overlap -= (other.right() - self.right()) as i32;
        }
        overlap >= other.width() as i32 / 2 || overlap >= self.width() as i32 / 2
    }

    /// Do the boxes overlap on y by at least half the shorter box's height?
    pub fn major_y_overlap(&self, other: &Box) -> bool {
        let mut overlap = other.height() as i32;
        if self.bottom() > other.bottom() {
            overlap -= (self.bottom() - other.bottom()) as i32;
        }
        if self.top() < other.top() {
            overlap -= (other.top() - self.top()) as i32;
        }
        overlap >= other.height() as i32 / 2 || overlap >= self.height() as i32 / 2
    }

    /// Gap between the boxes on x; negative when they overlap on x.
    pub fn x_gap(&self, other: &Box) -> i32 {
        self.bl.x.max(other.bl.x) as i32 - self.tr.x.min(other.tr.x) as i32
    }

    /// Gap between the boxes on y; negative when they overlap on y.
    pub fn y_gap(&self, other: &Box) -> i32 {
        self.bl.y.max(other.bl.y) as i32 - self.tr.y.min(other.tr.y) as i32
    }

    /// Fraction of this box's area covered by `other`.
    pub fn overlap_fraction(&self, other: &Box) -> f64 {
        let area = self.area();
        if area > 0 {
            self.intersection(other).area() as f64 / area as f64
        } else {
            0.0
        }
    }

    /// Fraction of this box's x-projection covered by `other`'s.
    pub fn x_overlap_fraction(&self, other: &Box) -> f64 {
        let low = self.left().max(other.left());
        let high = self.right().min(other.right());
        let width = self.right() as i32 - self.left() as i32;
        if width == 0 {
            let x = self.left();
            if other.left() <= x && x <= other.right() {
                1.0
            } else {
                0.0
            }
        } else {
            (0.0f64).max((high as i32 - low as i32) as f64 / width as f64)
        }
    }

    /// Fraction of this box's y-projection covered by `other`'s.
    pub fn y_overlap_fraction(&self, other: &Box) -> f64 {
        let low = self.bottom().max(other.bottom());
        let high = self.top().min(other.top());
        let height = self.top() as i32 - self.bottom() as i32;
        if height == 0 {
            let y = self.bottom();
            if other.bottom() <= y && y <= other.top() {
                1.0
            } else {
                0.0
            }
        } else {
            (0.0f64).max((high as i32 - low as i32) as f64 / height as f64)
        }
    }

    pub fn x_almost_equal(&self, other: &Box, tolerance: i16) -> bool {
        (self.left() - other.left()).abs() <= tolerance
            && (self.right() - other.right()).abs() <= tolerance
    }

    pub fn almost_equal(&self, other: &Box, tolerance: i16) -> bool {
        self.x_almost_equal(other, tolerance)
            && (self.top() - other.top()).abs() <= tolerance
            && (self.bottom() - other.bottom()).abs() <= tolerance
    }
}

impl std::ops::AddAssign<&Box> for Box {
    fn add_assign(&mut self, rhs: &Box) {
        *self = self.union(rhs);
    }
}

impl std::ops::BitAndAssign<&Box> for Box {
    fn bitand_assign(&mut self, rhs: &Box) {
        *self = self.intersection(rhs);
    }
}

/// A unit direction vector `(cx, cy)` with `cx^2 + cy^2 ~= 1`, used
/// throughout the core to represent a rotation without committing to an
/// angle representation (matches the legacy convention of passing an
/// `FCOORD` "rotation" around).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub cx: f32,
    pub cy: f32,
}

impl Rotation {
    pub fn new(cx: f32, cy: f32) -> Self {
        Rotation { cx, cy }
    }

    pub fn identity() -> Self {
        Rotation { cx: 1.0, cy: 0.0 }
    }

    /// The reverse rotation, `(cx, -cy)`.
    pub fn reverse(&self) -> Rotation {
        Rotation::new(self.cx, -self.cy)
    }

    pub fn apply(&self, pt: FPoint) -> FPoint {
        pt.rotate(self.cx, self.cy)
    }

    pub fn apply_box(&self, b: &Box) -> Box {
        b.rotate(self.cx, self.cy)
    }

    pub fn apply_box_large(&self, b: &Box) -> Box {
        b.rotate_large(self.cx, self.cy)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_overlapping_boxes() {
        let a = Box::new(0, 0, 10, 10);
        let b = Box::new(20, 20, 30, 30);
        assert!(!a.overlap(&b));
        assert!(a.intersection(&b).is_empty());
        assert_eq!(a.union(&b), Box::new(0, 0, 30, 30));
        assert_eq!(a.x_gap(&b), 10);
    }

    #[test]
    fn major_overlap_predicate() {
        let a = Box::new(0, 0, 10, 10);
        let b = Box::new(4, 4, 14, 14);
        assert!(a.overlap(&b));
        assert!(a.major_overlap(&b));
        assert_eq!(a.intersection(&b), Box::new(4, 4, 10, 10));
    }

    #[test]
    fn rotate_large_contains_all_corners() {
        let b = Box::new(1, 2, 3, 4);
        let (cx, cy) = (0.0f32, 1.0f32);
        let rotated = b.rotate_large(cx, cy);
        assert!(rotated.contains_point(IPoint::new(1, 2).rotate(cx, cy)));
        assert!(rotated.contains_point(IPoint::new(3, 4).rotate(cx, cy)));
        assert!(rotated.contains_point(IPoint::new(1, 4).rotate(cx, cy)));
        assert!(rotated.contains_point(IPoint::new(3, 2).rotate(cx, cy)));
        assert!(rotated.contains_point(IPoint::new(-4, 1)));
        assert!(rotated.contains_point(IPoint::new(-2, 3)));
    }

    #[test]
    fn union_and_intersection_subset_laws() {
        let a = Box::new(-5, -5, 5, 5);
        let b = Box::new(0, 0, 10, 10);
        let u = a.union(&b);
        let i = a.intersection(&b);
        assert!(u.contains_box(&a));
        assert!(u.contains_box(&b));
        assert!(a.contains_box(&i));
        assert!(b.contains_box(&i));
    }

    #[test]
    fn degenerate_x_overlap_fraction() {
        let a = Box::new(5, 0, 5, 10);
        let within = Box::new(0, 0, 10, 10);
        let outside = Box::new(10, 0, 20, 10);
        assert_eq!(a.x_overlap_fraction(&within), 1.0);
        assert_eq!(a.x_overlap_fraction(&outside), 0.0);
    }
}
