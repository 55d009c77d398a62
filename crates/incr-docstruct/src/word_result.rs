//! Word-result aggregation (§3.6, §4.8). `WordResult` bundles a word's
//! full per-word working state: the input `Werd`, its chopped and
//! rebuilt forms, the seam array, the denorm chain, the best choice, the
//! reject map and the output box word. Mirrors `ccstruct/pageres.h`
//! (`WERD_RES`).

use crate::chop::{join_pieces, start_seam_list, Seam};
use crate::denorm::{Denorm, DenormStage, NORMALIZED_BASELINE_OFFSET, NORMALIZED_X_HEIGHT};
use crate::error::{DocStructError, Result};
use crate::geometry::Box;
use crate::outline::CBlob;
use crate::polyapprox::approximate_blob;
use crate::choice::WordChoice;
use crate::reject::RejectMap;
use crate::tess::TWerd;
use crate::units::{Block, Row, Werd};

/// Bounding boxes (in image coordinates) of the rebuilt word's blobs,
/// parallel to `best_state`/`best_choice`.
pub type BoxWord = Vec<Box>;

/// The full per-word working state the segmentation search and
/// downstream passes operate on.
#[derive(Debug)]
pub struct WordResult {
    pub input_word: Werd,
    pub chopped_word: TWerd,
    pub seams: Vec<Seam>,
    pub rebuild_word: TWerd,
    /// `best_state[i]` = number of chopped blobs merged into rebuilt blob
    /// `i`; `sum(best_state) == chopped_word.blob_count()`.
    pub best_state: Vec<usize>,
    pub denorm: Denorm,
    pub best_choice: WordChoice,
    pub raw_choice: Vec<crate::choice::BlobChoice>,
    pub reject_map: RejectMap,
    pub box_word: BoxWord,
    pub ground_truth_boxes: Option<Vec<Box>>,
    pub ground_truth_text: Option<String>,
    pub font_id_votes: Vec<(i16, u32)>,
    pub x_height_estimate: Option<f32>,
    pub caps_height_estimate: Option<f32>,
    /// Set when a structural invariant violation or degenerate
    /// recognition aborted this word (§7); the caller routes it through
    /// the reject map unrecognized.
    pub tess_failed: bool,
}

impl WordResult {
    /// Builds the baseline-normalization `Denorm` for a word: a single
    /// stage using the row's baseline and x-height scale when a row is
    /// known, or a fixed origin at the word box's bottom edge otherwise
    /// (§3.4). The block, when present, contributes its image-space
    /// re-rotation as the stage's root-level correction.
    fn build_denorm(werd: &Werd, row: Option<&Row>, block: Option<&Block>) -> Denorm {
        let mut stage = DenormStage::identity();
        stage.block_re_rotation = block.map(|b| b.re_rotation);
        stage.inverse = werd.flags.contains(crate::units::WerdFlags::INVERSE);
        match row {
            Some(row) => {
                stage.baseline = Some(row.baseline.clone());
                stage.y_scale = if row.x_height != 0.0 {
                    NORMALIZED_X_HEIGHT / row.x_height
                } else {
                    1.0
                };
            }
            None => {
                stage.y_origin = werd.bounding_box().bottom() as f32;
                stage.y_scale = 1.0;
            }
        }
        stage.final_yshift = NORMALIZED_BASELINE_OFFSET;
        let mut denorm = Denorm::new();
        denorm.push(stage);
        denorm
    }

    /// `SetupForRecognition` (§4.8): polygonally approximates every blob
    /// of `werd` into the chopped working word, seeds an empty seam per
    /// gap, and populates the denorm chain. Returns `None` for a
    /// blob-less word, matching the spec's "leave all fields in a
    /// consistent empty state" requirement.
    pub fn setup_for_recognition(
        werd: Werd,
        row: Option<&Row>,
        block: Option<&Block>,
        approx_dist: f32,
    ) -> Option<WordResult> {
        if werd.blobs.is_empty() {
            return None;
        }
        let blobs = werd.blobs.iter().map(|b| approximate_blob(b, approx_dist)).collect();
        let chopped_word = TWerd::from_blobs(blobs);
        let seams = start_seam_list(&chopped_word);
        let denorm = Self::build_denorm(&werd, row, block);
        let n = chopped_word.blob_count();

        Some(WordResult {
            input_word: werd,
            chopped_word,
            seams,
            rebuild_word: TWerd::new(),
            best_state: Vec::new(),
            denorm,
            best_choice: WordChoice::empty(),
            raw_choice: Vec::new(),
            reject_map: RejectMap::new(n),
            box_word: Vec::new(),
            ground_truth_boxes: None,
            ground_truth_text: None,
            font_id_votes: Vec::new(),
            x_height_estimate: None,
            caps_height_estimate: None,
            tess_failed: false,
        })
    }

    /// `RebuildBestState` (§4.8): joins consecutive chopped blobs per
    /// `best_state`'s run lengths into `rebuild_word`, reusing
    /// `chop::join_pieces` on a scratch copy of the chopped word so the
    /// hide/reveal bookkeeping the chopper relies on elsewhere stays
    /// correct.
    pub fn rebuild_best_state(&mut self) {
        let mut working = self.chopped_word.clone();
        let mut rebuilt_blobs = Vec::with_capacity(self.best_state.len());
        let mut start = 0usize;
        for &count in &self.best_state {
            debug_assert!(count > 0);
            let end = start + count - 1;
            if end > start {
                join_pieces(&mut working, &self.seams, start, end);
            }
            rebuilt_blobs.push(working.blobs[start].clone());
            start += count;
        }
        self.rebuild_word = TWerd::from_blobs(rebuilt_blobs);
    }

    /// `SetupBoxWord` (§4.8): records each rebuilt blob's bounding box in
    /// image coordinates. The chopped/rebuilt representation already
    /// lives in image space throughout (the denorm chain is consulted
    /// only to produce the classifier-space view passed to the external
    /// classifier), so no coordinate transform is needed here.
    pub fn setup_box_word(&mut self) {
        self.box_word = self
            .rebuild_word
            .blobs
            .iter()
            .map(|blob| blob.bounding_box())
            .collect();
    }

    /// `ClipToOriginalWord` (§4.8): expands each rebuilt box by one
    /// pixel, finds original (pre-chop) blobs with major x-overlap, and
    /// snaps box edges within a 2-pixel tolerance to the matching
    /// original edge.
    pub fn clip_to_original_word(&mut self) {
        for bw in self.box_word.iter_mut() {
            let expanded = bw.pad(1, 1);
            for orig in &self.input_word.blobs {
                let obox = orig.bounding_box();
                if !expanded.major_x_overlap(&obox) {
                    continue;
                }
                let mut left = bw.left();
                let mut right = bw.right();
                let mut bottom = bw.bottom();
                let mut top = bw.top();
                if (left - obox.left()).abs() <= 2 {
                    left = obox.left();
                }
                if (right - obox.right()).abs() <= 2 {
                    right = obox.right();
                }
                if (bottom - obox.bottom()).abs() <= 2 {
                    bottom = obox.bottom();
                }
                if (top - obox.top()).abs() <= 2 {
                    top = obox.top();
                }
                *bw = Box::new(left, bottom, right, top);
            }
        }
    }

    /// `ConditionalBlobMerge` (§4.8): walks adjacent positions, merging
    /// `i` and `i+1` when `class_cb` names a valid merged unichar and
    /// `box_cb` (if given) agrees the boxes should merge. Returns true
    /// iff any merge occurred.
    pub fn conditional_blob_merge(
        &mut self,
        class_cb: impl Fn(i32, i32) -> Option<i32>,
        box_cb: Option<impl Fn(&Box, &Box) -> bool>,
    ) -> bool {
        let mut merged_any = false;
        let mut i = 0;
        while i + 1 < self.best_choice.choices.len() {
            let left_id = self.best_choice.choices[i].unichar_id;
            let right_id = self.best_choice.choices[i + 1].unichar_id;
            let Some(merged_id) = class_cb(left_id, right_id) else {
                i += 1;
                continue;
            };
            let boxes_ok = match &box_cb {
                Some(cb) => cb(&self.box_word[i], &self.box_word[i + 1]),
                None => true,
            };
            if !boxes_ok {
                i += 1;
                continue;
            }

            let mut merged_choice = self.best_choice.choices[i];
            merged_choice.unichar_id = merged_id;
            merged_choice.rating += self.best_choice.choices[i + 1].rating;
            merged_choice.certainty = merged_choice.certainty.min(self.best_choice.choices[i + 1].certainty);
            self.best_choice.choices[i] = merged_choice;
            self.best_choice.choices.remove(i + 1);

            self.best_state[i] += self.best_state[i + 1];
            self.best_state.remove(i + 1);

            self.box_word[i] = self.box_word[i].union(&self.box_word[i + 1]);
            self.box_word.remove(i + 1);

            self.reject_map.merge(i);

            merged_any = true;
            // Re-check the new position i against its new neighbour.
        }
        merged_any
    }

    /// Validates the §3.6 length invariant across the rebuilt fields.
    pub fn check_invariants(&self) -> Result<()> {
        let state_sum: usize = self.best_state.iter().sum();
        if state_sum != self.chopped_word.blob_count() {
            return Err(DocStructError::InvariantViolation {
                word: 0,
                reason: format!(
                    "best_state sums to {state_sum}, chopped word has {} blobs",
                    self.chopped_word.blob_count()
                ),
            });
        }
        let lens = [
            self.best_state.len(),
            self.rebuild_word.blob_count(),
            self.box_word.len(),
            self.best_choice.length(),
        ];
        if lens.iter().any(|&l| l != lens[0]) {
            return Err(DocStructError::InvariantViolation {
                word: 0,
                reason: format!(
                    "best_state/rebuild/box_word/best_choice lengths disagree: {lens:?}"
                ),
            });
        }
        Ok(())
    }

    pub fn leftover_blobs(&self) -> &[CBlob] {
        &self.input_word.rejected_blobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::IPoint;
    use crate::outline::{COutline, ChainStep};

    fn single_blob_werd() -> Werd {
        let outline = COutline::new(
            IPoint::new(0, 0),
            vec![
                ChainStep::Right,
                ChainStep::Right,
                ChainStep::Up,
                ChainStep::Up,
                ChainStep::Left,
                ChainStep::Left,
                ChainStep::Down,
                ChainStep::Down,
            ],
        )
        .unwrap();
        let mut blob = CBlob::new();
        blob.outlines.push(outline);
        Werd::new(vec![blob], vec![false], 0)
    }

    #[test]
    fn setup_for_recognition_rejects_empty_word() {
        let werd = Werd::new(vec![], vec![], 0);
        assert!(WordResult::setup_for_recognition(werd, None, None, 15.0).is_none());
    }

    #[test]
    fn setup_for_recognition_seeds_one_seam_gap_short() {
        let werd = single_blob_werd();
        let wr = WordResult::setup_for_recognition(werd, None, None, 15.0).unwrap();
        assert_eq!(wr.seams.len(), wr.chopped_word.blob_count().saturating_sub(1));
        assert_eq!(wr.reject_map.len(), wr.chopped_word.blob_count());
    }

    #[test]
    fn rebuild_merges_per_best_state() {
        let mut blobs = Vec::new();
        for i in 0..3 {
            let outline = COutline::new(
                IPoint::new(i * 20, 0),
                vec![
                    ChainStep::Right,
                    ChainStep::Right,
                    ChainStep::Up,
                    ChainStep::Up,
                    ChainStep::Left,
                    ChainStep::Left,
                    ChainStep::Down,
                    ChainStep::Down,
                ],
            )
            .unwrap();
            let mut blob = CBlob::new();
            blob.outlines.push(outline);
            blobs.push(blob);
        }
        let inverts = vec![false; 3];
        let werd = Werd::new(blobs, inverts, 0);
        let mut wr = WordResult::setup_for_recognition(werd, None, None, 15.0).unwrap();
        assert_eq!(wr.chopped_word.blob_count(), 3);

        wr.best_state = vec![2, 1];
        wr.best_choice = WordChoice {
            choices: vec![
                crate::choice::BlobChoice::new(1, 0.1, -0.1),
                crate::choice::BlobChoice::new(2, 0.1, -0.1),
            ],
        };
        wr.rebuild_best_state();
        assert_eq!(wr.rebuild_word.blob_count(), 2);
        wr.setup_box_word();
        assert_eq!(wr.box_word.len(), 2);
        assert!(wr.check_invariants().is_ok());
    }
}
