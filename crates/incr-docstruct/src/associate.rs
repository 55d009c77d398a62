//! Segmentation evaluation: per-candidate width/gap/shape costs for a
//! `(col, row)` chopped-blob range (§4.5). Mirrors
//! `wordrec/associate.h`/`.cpp` (`AssociateStats`/`EvaluateWordSegmentation`).

use crate::denorm::NORMALIZED_X_HEIGHT;
use crate::tess::TWerd;
use crate::units::Row;

/// Per-(col, row) segmentation statistics, rolled up along the search
/// path so variance can be tracked without revisiting earlier states.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AssociateStats {
    pub shape_cost: f32,
    pub bad_shape: bool,
    pub bad_fixed_pitch_right_gap: bool,
    pub gap_sum: i32,
    pub full_wh_ratio: f32,
    pub full_wh_ratio_total: f32,
    pub full_wh_ratio_var: f32,
}

/// The height a candidate's pixel width is normalized against before
/// comparison with `max_char_wh_ratio`.
pub fn normalizing_height(row: Option<&Row>, fixed_pitch: bool, denorm_y_scale: f32) -> f32 {
    match (fixed_pitch, row) {
        (true, Some(row)) => row.body_size(0.0, denorm_y_scale),
        _ => NORMALIZED_X_HEIGHT,
    }
}

/// `FixedPitchWidthCost` (§4.5): penalizes widths over the cap, adds an
/// extra quadratic penalty for gross over-merging, and penalizes
/// too-narrow non-terminal candidates.
pub fn fixed_pitch_width_cost(w: f32, gap: f32, end: bool, cap: f32) -> f32 {
    let mut cost = if w > cap { w } else { 0.0 };
    if w > 2.0 {
        cost += w * w;
    }
    if w + gap < 0.5 && !end {
        cost += 1.0 - (w + gap);
    }
    cost
}

/// Evaluates treating chopped blobs `[col, row]` as one recognized unit.
///
/// `seam_priority_before`/`seam_priority_after` are the priorities of the
/// seams immediately to the left of `col` and right of `row` (when they
/// exist); `gap_before`/`gap_after` are the corresponding raw pixel gaps.
/// `parent` is the rolled-up stats of the state this candidate extends,
/// and `parent_len` its path length (number of prior states).
#[allow(clippy::too_many_arguments)]
pub fn evaluate_segmentation(
    col: usize,
    row: usize,
    word: &TWerd,
    fixed_pitch: bool,
    normalizing_height: f32,
    max_char_wh_ratio: f32,
    seam_priority_before: Option<f32>,
    seam_priority_after: Option<f32>,
    parent: Option<&AssociateStats>,
    parent_len: usize,
) -> AssociateStats {
    let n = word.blob_count();
    let width = word.span_width(col, row) as f32;
    let wh_ratio = if normalizing_height > 0.0 {
        width / normalizing_height
    } else {
        0.0
    };

    let mut bad_shape = wh_ratio > max_char_wh_ratio;

    let mut raw_sum = 0i32;
    let mut positive_sum = 0i32;
    let mut any_positive = false;
    for i in col..row {
        let g = word.gap_between(i);
        raw_sum += g;
        if g > 0 {
            any_positive = true;
            positive_sum += g;
        }
    }
    let gap_sum = if any_positive { positive_sum } else { raw_sum };

    let mut stats = AssociateStats {
        shape_cost: 0.0,
        bad_shape,
        bad_fixed_pitch_right_gap: false,
        gap_sum,
        full_wh_ratio: wh_ratio,
        full_wh_ratio_total: wh_ratio,
        full_wh_ratio_var: 0.0,
    };

    if !fixed_pitch {
        return stats;
    }

    let end_row = row == n.saturating_sub(1);

    if col > 0 {
        let left_gap_norm = if normalizing_height > 0.0 {
            word.gap_between(col - 1) as f32 / normalizing_height
        } else {
            0.0
        };
        let seam_bad = seam_priority_before.map(|p| p > 0.0).unwrap_or(false);
        if (left_gap_norm < 0.03 && col != 0) || seam_bad {
            bad_shape = true;
        }
    }

    let mut right_gap = 0.0f32;
    if !end_row {
        right_gap = if normalizing_height > 0.0 {
            word.gap_between(row) as f32 / normalizing_height
        } else {
            0.0
        };
        let seam_bad = seam_priority_after.map(|p| p > 0.0).unwrap_or(false);
        if right_gap < 0.03 || seam_bad {
            bad_shape = true;
            stats.bad_fixed_pitch_right_gap = right_gap < 0.03;
        }
    }

    let full_wh_ratio = wh_ratio + right_gap;
    let parent_total = parent.map(|p| p.full_wh_ratio_total).unwrap_or(0.0);
    let parent_var = parent.map(|p| p.full_wh_ratio_var).unwrap_or(0.0);
    let total = parent_total + full_wh_ratio;
    let mean = total / (parent_len + 1) as f32;
    let var = parent_var + (mean - full_wh_ratio) * (mean - full_wh_ratio);

    let mut shape_cost =
        fixed_pitch_width_cost(wh_ratio, right_gap, end_row, max_char_wh_ratio) + var;
    if col == 0 && end_row && wh_ratio > max_char_wh_ratio {
        shape_cost += 10.0;
    }

    stats.bad_shape = bad_shape;
    stats.full_wh_ratio = full_wh_ratio;
    stats.full_wh_ratio_total = total;
    stats.full_wh_ratio_var = var;
    stats.shape_cost = shape_cost;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tess::TBlob;

    fn word_with_gaps(widths_and_gaps: &[(i32, i32)]) -> TWerd {
        use crate::geometry::FPoint;
        use crate::tess::{EdgePoint, TessLine};

        let mut word = TWerd::new();
        let mut x = 0i32;
        for &(w, gap_after) in widths_and_gaps {
            let mut blob = TBlob::new();
            blob.outlines.push(TessLine::new(
                vec![
                    EdgePoint::new(FPoint::new(x as f32, 0.0), FPoint::new(0.0, 1.0)),
                    EdgePoint::new(FPoint::new((x + w) as f32, 1.0), FPoint::new(0.0, -1.0)),
                ],
                false,
            ));
            word.blobs.push(blob);
            x += w + gap_after;
        }
        word
    }

    #[test]
    fn wh_ratio_over_cap_marks_bad_shape() {
        let word = word_with_gaps(&[(300, 0)]);
        let stats = evaluate_segmentation(
            0, 0, &word, false, 100.0, 2.0, None, None, None, 0,
        );
        assert!(stats.bad_shape);
    }

    #[test]
    fn gap_sum_uses_positive_gaps_only_when_any_positive() {
        let word = word_with_gaps(&[(10, 5), (10, -2), (10, 0)]);
        let stats = evaluate_segmentation(
            0, 2, &word, false, 100.0, 10.0, None, None, None, 0,
        );
        assert_eq!(stats.gap_sum, 5);
    }

    #[test]
    fn gap_sum_is_negative_sum_when_no_gap_positive() {
        let word = word_with_gaps(&[(10, -3), (10, -1), (10, 0)]);
        let stats = evaluate_segmentation(
            0, 2, &word, false, 100.0, 10.0, None, None, None, 0,
        );
        assert_eq!(stats.gap_sum, -4);
    }

    #[test]
    fn fixed_pitch_width_cost_penalizes_merging_and_narrow_gap() {
        assert_eq!(fixed_pitch_width_cost(1.0, 1.0, true, 2.0), 0.0);
        assert!(fixed_pitch_width_cost(3.0, 0.0, true, 2.0) > 9.0);
        assert!(fixed_pitch_width_cost(0.2, 0.1, false, 2.0) > 0.0);
    }
}
