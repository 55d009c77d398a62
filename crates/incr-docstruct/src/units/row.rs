//! `Row`: a line of text within a block (§3.3).
//!
//! Mirrors `ccstruct/ocrrow.h` (`ROW`).

use crate::geometry::Box;
use crate::units::baseline_spline::BaselineSpline;
use crate::units::werd::Werd;

/// A line of text: its word list, baseline, and per-row shape statistics.
#[derive(Debug)]
pub struct Row {
    pub words: Vec<Werd>,
    pub baseline: BaselineSpline,
    pub x_height: f32,
    pub ascenders: f32,
    pub descenders: f32,
    /// Estimated inter-character spacing within words.
    pub kerning: f32,
    /// Estimated inter-word spacing.
    pub space_size: f32,
    pub left_margin: i16,
    pub right_margin: i16,
    pub is_drop_cap: bool,
    /// Back-reference to an externally owned paragraph, if assigned.
    pub paragraph_id: Option<usize>,
}

impl Row {
    pub fn new(baseline: BaselineSpline, x_height: f32) -> Self {
        Row {
            words: Vec::new(),
            baseline,
            x_height,
            ascenders: 0.0,
            descenders: 0.0,
            kerning: 0.0,
            space_size: 0.0,
            left_margin: 0,
            right_margin: 0,
            is_drop_cap: false,
            paragraph_id: None,
        }
    }

    /// Baseline y-coordinate at `x`; the function `Denorm::Y0` calls
    /// through.
    pub fn baseline_y(&self, x: f64) -> f64 {
        self.baseline.y(x)
    }

    /// Body size used by fixed-pitch normalization when non-zero, else
    /// `(x_height + ascenders) * y_scale`.
    pub fn body_size(&self, explicit_body_size: f32, y_scale: f32) -> f32 {
        if explicit_body_size != 0.0 {
            explicit_body_size
        } else {
            (self.x_height + self.ascenders) * y_scale
        }
    }

    /// The union of this row's words' bounding boxes, establishing the
    /// §3.3 invariant `row.bounding_box() == union(words)`.
    pub fn bounding_box(&self) -> Box {
        self.words
            .iter()
            .map(|w| w.bounding_box())
            .fold(Box::empty(), |acc, b| acc.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::CBlob;

    #[test]
    fn bounding_box_is_union_of_words() {
        let mut row = Row::new(BaselineSpline::line(0.0, 0.0), 30.0);
        let w1 = Werd::new(vec![CBlob::new()], vec![false], 0);
        let w2 = Werd::new(vec![CBlob::new()], vec![false], 0);
        row.words.push(w1);
        row.words.push(w2);
        // Both words are empty-blob words so their bbox is canonically
        // empty; the union of two empties stays empty.
        assert!(row.bounding_box().is_empty());
    }

    #[test]
    fn body_size_falls_back_to_xheight_plus_ascenders() {
        let mut row = Row::new(BaselineSpline::line(0.0, 0.0), 100.0);
        row.ascenders = 20.0;
        assert_eq!(row.body_size(0.0, 2.0), 240.0);
        assert_eq!(row.body_size(50.0, 2.0), 50.0);
    }
}
