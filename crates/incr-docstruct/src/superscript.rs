//! Superscript/subscript re-recognition (§4.7). Mirrors
//! `wordrec/superscript.cpp` (`Wordrec::SupSubTest`/`Wordrec::fix_sups`).
//!
//! This pass looks at a word's already-rebuilt recognition result,
//! notices when the leading or trailing run of characters sits well
//! above or below the baseline-normalized band, and re-invokes the
//! classifier on that run with its y-position penalty suppressed.
//!
//! Simplification (recorded in DESIGN.md): a leading/trailing run is
//! re-recognized as a single merged unit rather than re-segmented
//! character by character. The §4.7 step 5 fallback — when no whole
//! rebuilt blob qualifies, checking the blob one past the run for
//! chopped pieces that are themselves y-outliers — is implemented in
//! [`partial_outlier_extension`].

use crate::choice::{BlobChoice, BlobClassifier};
use crate::config::DocStructConfig;
use crate::denorm::{Denorm, NORMALIZED_BASELINE_OFFSET, NORMALIZED_X_HEIGHT};
use crate::geometry::{Box, FPoint};
use crate::tess::TWerd;
use crate::units::WerdFlags;
use crate::word_result::WordResult;

/// A rebuilt blob's position relative to the baseline-normalized band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobPosition {
    Superscript,
    Subscript,
    Normal,
}

/// Caller-supplied unicharset facts `fix_word` needs but this crate does
/// not own (§1 "external collaborators named only by interfaces").
pub struct FixWordHooks<'a> {
    pub is_punctuation: &'a dyn Fn(i32) -> bool,
    pub is_italic: &'a dyn Fn(i32) -> bool,
    /// Expected full-size glyph height for a unichar, if the unicharset
    /// carries a top/bottom table entry for it.
    pub expected_height: &'a dyn Fn(i32) -> Option<f32>,
}

fn classify_position(denorm: &Denorm, bbox: Box, cfg: &DocStructConfig) -> BlobPosition {
    let corners = [
        FPoint::new(bbox.left() as f32, bbox.bottom() as f32),
        FPoint::new(bbox.left() as f32, bbox.top() as f32),
        FPoint::new(bbox.right() as f32, bbox.bottom() as f32),
        FPoint::new(bbox.right() as f32, bbox.top() as f32),
    ];
    let ys: Vec<f32> = corners.iter().map(|&p| denorm.forward(p).y).collect();
    let bottom = ys.iter().cloned().fold(f32::INFINITY, f32::min);
    let top = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

    let super_threshold =
        NORMALIZED_BASELINE_OFFSET + NORMALIZED_X_HEIGHT * cfg.superscript_min_y_bottom;
    let sub_threshold =
        NORMALIZED_BASELINE_OFFSET + NORMALIZED_X_HEIGHT * cfg.subscript_max_y_top;

    if bottom >= super_threshold {
        BlobPosition::Superscript
    } else if top <= sub_threshold {
        BlobPosition::Subscript
    } else {
        BlobPosition::Normal
    }
}

/// `avg_certainty` over normal-positioned blobs, discarding the single
/// worst when at least 3 exist. `None` when there is no normal blob to
/// anchor the comparison against.
fn avg_normal_certainty(positions: &[BlobPosition], certainties: &[f32]) -> Option<f32> {
    let mut normal: Vec<f32> = positions
        .iter()
        .zip(certainties)
        .filter(|(p, _)| **p == BlobPosition::Normal)
        .map(|(_, &c)| c)
        .collect();
    if normal.is_empty() {
        return None;
    }
    if normal.len() >= 3 {
        if let Some(worst_idx) = normal
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
        {
            normal.remove(worst_idx);
        }
    }
    Some(normal.iter().sum::<f32>() / normal.len() as f32)
}

/// Longest leading run of identical non-`Normal` position, trimmed to
/// the prefix whose certainty is below `unlikely_threshold`. Returns
/// `(run_len, worst_certainty_in_run)`.
fn find_leading_run(
    positions: &[BlobPosition],
    certainties: &[f32],
    unlikely_threshold: f32,
) -> (usize, f32) {
    if positions.is_empty() || positions[0] == BlobPosition::Normal {
        return (0, f32::INFINITY);
    }
    let run_type = positions[0];
    let raw_run_len = positions.iter().take_while(|&&p| p == run_type).count();

    let mut trimmed = 0;
    let mut worst = f32::INFINITY;
    for &c in certainties.iter().take(raw_run_len) {
        if c < unlikely_threshold {
            trimmed += 1;
            worst = worst.min(c);
        } else {
            break;
        }
    }
    (trimmed, worst)
}

/// Mirror of [`find_leading_run`] from the tail end.
fn find_trailing_run(
    positions: &[BlobPosition],
    certainties: &[f32],
    unlikely_threshold: f32,
) -> (usize, f32) {
    let n = positions.len();
    if n == 0 || positions[n - 1] == BlobPosition::Normal {
        return (0, f32::INFINITY);
    }
    let run_type = positions[n - 1];
    let raw_run_len = positions.iter().rev().take_while(|&&p| p == run_type).count();

    let mut trimmed = 0;
    let mut worst = f32::INFINITY;
    for &c in certainties.iter().rev().take(raw_run_len) {
        if c < unlikely_threshold {
            trimmed += 1;
            worst = worst.min(c);
        } else {
            break;
        }
    }
    (trimmed, worst)
}

/// The raw (untrimmed-by-certainty) same-position run at one end of
/// `positions`: its position type and length. `(Normal, 0)` when the end
/// blob is itself `Normal` (no run at all on that side).
fn raw_run_type_and_len(positions: &[BlobPosition], leading: bool) -> (BlobPosition, usize) {
    if positions.is_empty() {
        return (BlobPosition::Normal, 0);
    }
    let edge = if leading { positions[0] } else { positions[positions.len() - 1] };
    if edge == BlobPosition::Normal {
        return (edge, 0);
    }
    let len = if leading {
        positions.iter().take_while(|&&p| p == edge).count()
    } else {
        positions.iter().rev().take_while(|&&p| p == edge).count()
    };
    (edge, len)
}

/// §4.7 step 5: when step 4 finds no whole qualifying blob, check the one
/// rebuilt blob immediately past the raw run at `blob_idx` for *partial*
/// outlier-ness — some but not all of its chopped pieces fall in the
/// outlier band matching `run_type` — and a certainty at or below
/// `unlikely_threshold`. Qualifying extends the run by this one blob.
fn partial_outlier_extension(
    word: &WordResult,
    blob_idx: usize,
    run_type: BlobPosition,
    certainty: f32,
    unlikely_threshold: f32,
    cfg: &DocStructConfig,
) -> bool {
    if certainty > unlikely_threshold {
        return false;
    }
    let (chop_start, chop_end) = chopped_span(&word.best_state, blob_idx, blob_idx);
    if chop_end <= chop_start {
        // A single chopped piece can't be "partially" outlier.
        return false;
    }
    let outlier_count = (chop_start..=chop_end)
        .filter(|&c| {
            classify_position(&word.denorm, word.chopped_word.blobs[c].bounding_box(), cfg)
                == run_type
        })
        .count();
    let total = chop_end - chop_start + 1;
    outlier_count > 0 && outlier_count < total
}

fn chopped_span(best_state: &[usize], start: usize, end_inclusive: usize) -> (usize, usize) {
    let chop_start: usize = best_state[..start].iter().sum();
    let chop_len: usize = best_state[start..=end_inclusive].iter().sum();
    (chop_start, chop_start + chop_len - 1)
}

/// Re-recognizes chopped blobs `[chop_start, chop_end]` as a single unit
/// with the classifier's y-position penalty suppressed.
fn reclassify_span(
    chopped_word: &TWerd,
    seams: &[crate::chop::Seam],
    chop_start: usize,
    chop_end: usize,
    classifier: &dyn BlobClassifier,
) -> Option<BlobChoice> {
    let mut working = chopped_word.clone();
    if chop_end > chop_start {
        crate::chop::join_pieces(&mut working, seams, chop_start, chop_end);
    }
    let choices = classifier.classify(&working.blobs[chop_start], true);
    choices.into_iter().next()
}

fn height_ok(bbox: Box, unichar_id: i32, cfg: &DocStructConfig, hooks: &FixWordHooks) -> bool {
    match (hooks.expected_height)(unichar_id) {
        Some(expected) if expected > 0.0 => {
            bbox.height() as f32 >= cfg.superscript_scaledown_ratio * expected
        }
        _ => true,
    }
}

fn accepts(
    choice: &BlobChoice,
    bbox: Box,
    original_certainty: f32,
    cfg: &DocStructConfig,
    hooks: &FixWordHooks,
) -> bool {
    !(hooks.is_punctuation)(choice.unichar_id)
        && !(hooks.is_italic)(choice.unichar_id)
        && choice.certainty > cfg.superscript_bettered_certainty * original_certainty
        && height_ok(bbox, choice.unichar_id, cfg, hooks)
}

/// Tries progressively shorter prefixes/suffixes of a run (outer
/// characters first) until one reclassifies and passes the §4.7 step 8
/// acceptance test, or the run is exhausted.
///
/// `leading` selects which end of the run shrinks toward: for a
/// leading run `start` is always `0`; for a trailing run `start` moves
/// inward as the run shortens.
#[allow(clippy::too_many_arguments)]
fn attempt_side(
    word: &WordResult,
    leading: bool,
    max_count: usize,
    total_positions: usize,
    original_certainty: f32,
    classifier: &dyn BlobClassifier,
    cfg: &DocStructConfig,
    hooks: &FixWordHooks,
) -> Option<(usize, usize, BlobChoice)> {
    for count in (1..=max_count).rev() {
        let (start, end) = if leading {
            (0, count - 1)
        } else {
            (total_positions - count, total_positions - 1)
        };
        let (chop_start, chop_end) = chopped_span(&word.best_state, start, end);
        let Some(choice) =
            reclassify_span(&word.chopped_word, &word.seams, chop_start, chop_end, classifier)
        else {
            continue;
        };
        let bbox = word
            .box_word
            .get(start..=end)
            .map(|boxes| boxes.iter().fold(Box::empty(), |acc, b| acc.union(b)))
            .unwrap_or_else(Box::empty);
        if accepts(&choice, bbox, original_certainty, cfg, hooks) {
            return Some((start, end, choice));
        }
    }
    None
}

/// Merges rebuild-level positions `[start, end]` into one, updating
/// `best_state`, `box_word`, `best_choice` and `reject_map` in lockstep,
/// and concatenating the corresponding `rebuild_word` outlines.
fn merge_positions(word: &mut WordResult, start: usize, end: usize, choice: BlobChoice) {
    if end == start {
        word.best_choice.choices[start] = choice;
        return;
    }
    let merged_state: usize = word.best_state[start..=end].iter().sum();
    let merged_box = word.box_word[start..=end]
        .iter()
        .fold(Box::empty(), |acc, b| acc.union(b));

    for idx in (start + 1..=end).rev() {
        word.best_state.remove(idx);
        word.box_word.remove(idx);
        word.best_choice.choices.remove(idx);
        word.reject_map.merge(start);

        let mut outlines = std::mem::take(&mut word.rebuild_word.blobs[idx].outlines);
        word.rebuild_word.blobs[start].outlines.append(&mut outlines);
        word.rebuild_word.blobs.remove(idx);
    }
    word.best_state[start] = merged_state;
    word.box_word[start] = merged_box;
    word.best_choice.choices[start] = choice;
}

/// `fix_word` (§4.7): detects a superscript/subscript run at either end
/// of `word`'s recognized result and, if a y-penalty-suppressed
/// re-classification of that run passes the acceptance test, commits
/// it in place. Returns whether anything changed.
pub fn fix_word(
    word: &mut WordResult,
    classifier: &dyn BlobClassifier,
    cfg: &DocStructConfig,
    hooks: &FixWordHooks,
) -> bool {
    if word.tess_failed
        || word.input_word.flags.contains(WerdFlags::REP_CHAR)
        || word.best_choice.choices.is_empty()
    {
        return false;
    }
    let n = word.rebuild_word.blob_count();
    if n == 0 || word.best_state.len() != n || word.best_choice.choices.len() != n {
        return false;
    }

    let positions: Vec<BlobPosition> = word
        .rebuild_word
        .blobs
        .iter()
        .map(|b| classify_position(&word.denorm, b.bounding_box(), cfg))
        .collect();
    let certainties: Vec<f32> = word.best_choice.choices.iter().map(|c| c.certainty).collect();

    let Some(avg_certainty) = avg_normal_certainty(&positions, &certainties) else {
        return false;
    };
    let unlikely_threshold = avg_certainty * cfg.superscript_worse_certainty;

    let (mut num_leading, mut leading_worst) =
        find_leading_run(&positions, &certainties, unlikely_threshold);
    let (mut num_trailing, mut trailing_worst) =
        find_trailing_run(&positions, &certainties, unlikely_threshold);

    // Step 5: no whole blob qualified on either side. Check one blob past
    // each raw run for a partially-outlier chopped piece before giving up.
    if num_leading == 0 && num_trailing == 0 {
        let (leading_type, leading_raw) = raw_run_type_and_len(&positions, true);
        let (trailing_type, trailing_raw) = raw_run_type_and_len(&positions, false);

        if leading_raw > 0 && leading_raw < n {
            let cert = certainties[leading_raw];
            if partial_outlier_extension(word, leading_raw, leading_type, cert, unlikely_threshold, cfg)
            {
                num_leading = leading_raw + 1;
                leading_worst = cert;
            }
        }
        if trailing_raw > 0
            && trailing_raw < n
            && leading_raw + trailing_raw < n
        {
            let idx = n - 1 - trailing_raw;
            let cert = certainties[idx];
            if partial_outlier_extension(word, idx, trailing_type, cert, unlikely_threshold, cfg) {
                num_trailing = trailing_raw + 1;
                trailing_worst = cert;
            }
        }
    }

    if num_leading + num_trailing > n {
        num_trailing = n - num_leading;
    }
    if num_leading == 0 && num_trailing == 0 {
        return false;
    }

    let mut changed = false;

    if num_leading > 0 {
        if let Some((start, end, choice)) = attempt_side(
            word,
            true,
            num_leading,
            n,
            leading_worst,
            classifier,
            cfg,
            hooks,
        ) {
            merge_positions(word, start, end, choice);
            changed = true;
        }
    }

    // Re-measure `n` since a leading merge may have shortened the word.
    let n = word.rebuild_word.blob_count();
    if num_trailing > 0 && num_trailing <= n {
        if let Some((start, end, choice)) = attempt_side(
            word,
            false,
            num_trailing,
            n,
            trailing_worst,
            classifier,
            cfg,
            hooks,
        ) {
            merge_positions(word, start, end, choice);
            changed = true;
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denorm::DenormStage;
    use crate::geometry::IPoint;
    use crate::outline::{CBlob, COutline, ChainStep};
    use crate::reject::RejectMap;
    use crate::tess::{EdgePoint, TBlob, TessLine};

    struct AlwaysClassifier {
        unichar_id: i32,
        certainty: f32,
    }

    impl BlobClassifier for AlwaysClassifier {
        fn classify(&self, _blob: &crate::tess::TBlob, _suppress_y_penalty: bool) -> Vec<BlobChoice> {
            vec![BlobChoice::new(self.unichar_id, 0.1, self.certainty)]
        }
    }

    fn rect_blob(x: i16, y: i16, w: i16, h: i16) -> CBlob {
        let outline = COutline::new(
            IPoint::new(x, y),
            vec![ChainStep::Right; w as usize]
                .into_iter()
                .chain(vec![ChainStep::Up; h as usize])
                .chain(vec![ChainStep::Left; w as usize])
                .chain(vec![ChainStep::Down; h as usize])
                .collect(),
        )
        .unwrap();
        let mut blob = CBlob::new();
        blob.outlines.push(outline);
        blob
    }

    fn identity_denorm() -> Denorm {
        let mut denorm = Denorm::new();
        denorm.push(DenormStage::identity());
        denorm
    }

    fn no_op_hooks() -> FixWordHooks<'static> {
        FixWordHooks {
            is_punctuation: &|_| false,
            is_italic: &|_| false,
            expected_height: &|_| None,
        }
    }

    fn two_char_word(cfg: &DocStructConfig) -> WordResult {
        // Blob 0 sits high (superscript band), blob 1 spans the normal
        // baseline-to-x-height band (identity denorm, so these are also
        // classifier-space coordinates).
        let blobs = vec![rect_blob(0, 150, 10, 40), rect_blob(20, 64, 30, 128)];
        let inverts = vec![false, false];
        let werd = new_werd(blobs, inverts);
        let mut wr = WordResult::setup_for_recognition(werd, None, None, 15.0).unwrap();
        wr.rebuild_word = wr.chopped_word.clone();
        wr.best_state = vec![1, 1];
        wr.denorm = identity_denorm();
        wr.best_choice = crate::choice::WordChoice {
            choices: vec![BlobChoice::new(1, 0.1, -5.0), BlobChoice::new(2, 0.1, -0.2)],
        };
        wr.box_word = wr.rebuild_word.blobs.iter().map(|b| b.bounding_box()).collect();
        wr.reject_map = RejectMap::new(2);
        let _ = cfg;
        wr
    }

    fn new_werd(blobs: Vec<CBlob>, inverts: Vec<bool>) -> crate::units::Werd {
        crate::units::Werd::new(blobs, inverts, 0)
    }

    #[test]
    fn classify_position_flags_high_blob_as_superscript() {
        let cfg = DocStructConfig::default();
        let denorm = identity_denorm();
        let high = Box::new(0, 150, 10, 200);
        assert_eq!(classify_position(&denorm, high, &cfg), BlobPosition::Superscript);
        let baseline = Box::new(0, 64, 10, 192);
        assert_eq!(classify_position(&denorm, baseline, &cfg), BlobPosition::Normal);
    }

    #[test]
    fn fix_word_rejects_when_no_best_choice() {
        let cfg = DocStructConfig::default();
        let werd = new_werd(vec![rect_blob(0, 0, 10, 10)], vec![false]);
        let mut wr = WordResult::setup_for_recognition(werd, None, None, 15.0).unwrap();
        let classifier = AlwaysClassifier { unichar_id: 1, certainty: -0.1 };
        let hooks = no_op_hooks();
        assert!(!fix_word(&mut wr, &classifier, &cfg, &hooks));
    }

    #[test]
    fn fix_word_commits_accepted_superscript_fix() {
        let cfg = DocStructConfig::default();
        let mut wr = two_char_word(&cfg);
        let classifier = AlwaysClassifier { unichar_id: 9, certainty: -0.05 };
        let hooks = no_op_hooks();
        let changed = fix_word(&mut wr, &classifier, &cfg, &hooks);
        assert!(changed);
        assert_eq!(wr.best_choice.choices[0].unichar_id, 9);
    }

    #[test]
    fn partial_outlier_extension_finds_mixed_chopped_piece() {
        // Chopped blob 1's pieces straddle the superscript band: the first
        // piece is a pure outlier, the second sits squarely on the
        // baseline, so the whole rebuilt blob 1 reads as Normal overall.
        let cfg = DocStructConfig::default();
        let mut chopped = TWerd::new();
        let piece = |x0: f32, y0: f32, x1: f32, y1: f32, tag: u32| {
            let mut b = TBlob::new();
            let mut line = TessLine::new(
                vec![
                    EdgePoint::new(FPoint::new(x0, y0), FPoint::new(0.0, 0.0)),
                    EdgePoint::new(FPoint::new(x1, y1), FPoint::new(0.0, 0.0)),
                ],
                false,
            );
            line.piece_tag = Some(tag);
            b.outlines.push(line);
            b
        };
        chopped.blobs.push(piece(0.0, 150.0, 10.0, 190.0, 0)); // rebuilt blob 0 (superscript)
        chopped.blobs.push(piece(20.0, 150.0, 30.0, 190.0, 1)); // rebuilt blob 1, piece A (outlier)
        chopped.blobs.push(piece(30.0, 64.0, 40.0, 192.0, 1)); // rebuilt blob 1, piece B (normal)
        chopped.blobs.push(piece(50.0, 64.0, 60.0, 192.0, 2)); // rebuilt blob 2 (normal)

        let mut rebuild = TWerd::new();
        rebuild.blobs.push(piece(0.0, 150.0, 10.0, 190.0, 0));
        rebuild.blobs.push(piece(20.0, 64.0, 40.0, 192.0, 1));
        rebuild.blobs.push(piece(50.0, 64.0, 60.0, 192.0, 2));

        let werd = new_werd(
            vec![rect_blob(0, 0, 10, 10), rect_blob(20, 0, 10, 10), rect_blob(50, 0, 10, 10)],
            vec![false, false, false],
        );
        let mut wr = WordResult::setup_for_recognition(werd, None, None, 15.0).unwrap();
        wr.seams = crate::chop::start_seam_list(&chopped);
        wr.chopped_word = chopped;
        wr.rebuild_word = rebuild;
        wr.best_state = vec![1, 2, 1];
        wr.denorm = identity_denorm();
        wr.best_choice = crate::choice::WordChoice {
            choices: vec![
                BlobChoice::new(1, 0.1, -0.1),
                BlobChoice::new(2, 0.1, -2.0),
                BlobChoice::new(3, 0.1, 0.1),
            ],
        };
        wr.box_word = wr.rebuild_word.blobs.iter().map(|b| b.bounding_box()).collect();
        wr.reject_map = RejectMap::new(3);

        // Whole-blob classification alone finds no leading/trailing run
        // (blob 0's certainty clears the bar, blob 1 reads Normal overall)
        // so only the step-5 partial-chopped-piece check can trigger a fix.
        let classifier = AlwaysClassifier { unichar_id: 9, certainty: -0.05 };
        let hooks = no_op_hooks();
        let changed = fix_word(&mut wr, &classifier, &cfg, &hooks);
        assert!(changed);
        assert_eq!(wr.best_choice.choices[0].unichar_id, 9);
        // Blobs 0 and 1 merged into one position; blob 2 is untouched.
        assert_eq!(wr.best_state.len(), 2);
    }

    #[test]
    fn fix_word_leaves_word_untouched_when_no_outlier_run() {
        let cfg = DocStructConfig::default();
        // Both blobs sit squarely within the normal baseline-to-x-height
        // band, so neither end should register as an outlier run.
        let blobs = vec![rect_blob(0, 64, 10, 128), rect_blob(20, 64, 10, 128)];
        let werd = new_werd(blobs, vec![false, false]);
        let mut wr = WordResult::setup_for_recognition(werd, None, None, 15.0).unwrap();
        wr.rebuild_word = wr.chopped_word.clone();
        wr.best_state = vec![1, 1];
        wr.denorm = identity_denorm();
        wr.best_choice = crate::choice::WordChoice {
            choices: vec![BlobChoice::new(1, 0.1, -0.2), BlobChoice::new(2, 0.1, -0.3)],
        };
        wr.box_word = wr.rebuild_word.blobs.iter().map(|b| b.bounding_box()).collect();
        wr.reject_map = RejectMap::new(2);

        let classifier = AlwaysClassifier { unichar_id: 9, certainty: -0.05 };
        let hooks = no_op_hooks();
        assert!(!fix_word(&mut wr, &classifier, &cfg, &hooks));
    }
}
