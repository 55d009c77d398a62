//! Chopping, seams and joins (§4.3). Mirrors `ccstruct/seam.h`/`seam.cpp`.
//!
//! A chopped word's blobs are connected by a parallel array of `Seam`s (one
//! per gap). Recognition explores different groupings of adjacent blobs by
//! repeatedly joining and breaking ranges; a seam records enough state
//! (`width_p`/`width_n`) to know whether it would survive a given join.

use tracing::debug;

use crate::geometry::{FPoint, IPoint};
use crate::tess::{TBlob, TWerd};

const POINT_EPS: f32 = 1e-3;

fn points_match(a: FPoint, b: FPoint) -> bool {
    (a.x - b.x).abs() <= POINT_EPS && (a.y - b.y).abs() <= POINT_EPS
}

/// Two `EdgePoint` positions that, joined, cut an outline in two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub point1: FPoint,
    pub point2: FPoint,
}

impl Split {
    pub fn new(point1: FPoint, point2: FPoint) -> Self {
        Split { point1, point2 }
    }
}

/// A candidate cut between two adjacent chopped blobs, bundling up to
/// three splits (for shapes that need more than one cut line).
#[derive(Debug, Clone)]
pub struct Seam {
    /// Quality of the cut; higher is worse. A positive priority marks the
    /// seam as one the fixed-pitch shape cost should penalize.
    pub priority: f32,
    pub width_p: i8,
    pub width_n: i8,
    pub location: IPoint,
    pub splits: Vec<Split>,
}

impl Seam {
    pub fn new(priority: f32, location: IPoint, splits: Vec<Split>) -> Self {
        debug_assert!(splits.len() <= 3, "a seam holds at most 3 splits");
        Seam {
            priority,
            width_p: 0,
            width_n: 0,
            location,
            splits,
        }
    }
}

/// True iff some outline in `blob` contains `split.point1` and some
/// outline in `blob` contains `split.point2`.
pub fn find_split_in_blob(split: &Split, blob: &TBlob) -> bool {
    let has1 = blob
        .outlines
        .iter()
        .any(|o| o.contains_point(split.point1, POINT_EPS));
    let has2 = blob
        .outlines
        .iter()
        .any(|o| o.contains_point(split.point2, POINT_EPS));
    has1 && has2
}

/// True iff any `EdgePoint` of `other_split` equals a point of any split
/// already belonging to `seam`.
pub fn point_in_seam(seam: &Seam, other_split: &Split) -> bool {
    seam.splits.iter().any(|s| {
        points_match(s.point1, other_split.point1)
            || points_match(s.point1, other_split.point2)
            || points_match(s.point2, other_split.point1)
            || points_match(s.point2, other_split.point2)
    })
}

/// Walks blobs `start, start+dir, start+2*dir, …` within `[0, word.blob_count())`
/// counting how many blobs are needed to locate every split of `seam`.
/// Returns the width, or -1 if a split can never be located.
pub fn account_splits(seam: &Seam, word: &TWerd, start: usize, dir: i32) -> i32 {
    if seam.splits.is_empty() {
        return 0;
    }
    let n = word.blob_count() as i32;
    let mut found = vec![false; seam.splits.len()];
    let mut width = 0i32;
    let mut idx = start as i32;
    while idx >= 0 && idx < n {
        let blob = &word.blobs[idx as usize];
        for (i, s) in seam.splits.iter().enumerate() {
            if !found[i] && find_split_in_blob(s, blob) {
                found[i] = true;
            }
        }
        if found.iter().all(|&f| f) {
            return width;
        }
        width += 1;
        idx += dir;
    }
    -1
}

/// Read-only legality check for inserting `seam` at `index`: true iff every
/// pre-existing seam whose span the insertion would disturb can still be
/// re-accounted successfully.
pub fn test_insert_seam(seams: &[Seam], word: &TWerd, index: usize) -> bool {
    for (j, s) in seams.iter().enumerate().take(index) {
        if j as i32 + s.width_p as i32 == index as i32 - 1
            && account_splits(s, word, j + 1, 1) < 0
        {
            return false;
        }
    }
    for (j, s) in seams.iter().enumerate().skip(index) {
        if j as i32 - s.width_n as i32 == index as i32
            && account_splits(s, word, j + 1, -1) < 0
        {
            return false;
        }
    }
    true
}

/// Inserts `seam` at `index`, updating the `width_p`/`width_n` of every
/// other seam whose accounted span the insertion disturbs (§4.3.3).
pub fn insert_seam(word: &TWerd, index: usize, seam: Seam, seams: &mut Vec<Seam>) {
    for j in 0..index {
        let width_p = seams[j].width_p as i32;
        if j as i32 + width_p >= index as i32 {
            seams[j].width_p += 1;
        } else if width_p + j as i32 == index as i32 - 1 {
            let recomputed = account_splits(&seams[j], word, j + 1, 1);
            seams[j].width_p = recomputed as i8;
        }
    }
    let len = seams.len();
    for j in index..len {
        let width_n = seams[j].width_n as i32;
        if j as i32 - width_n < index as i32 {
            seams[j].width_n += 1;
        } else if j as i32 - width_n == index as i32 {
            let recomputed = account_splits(&seams[j], word, j + 1, -1);
            seams[j].width_n = recomputed as i8;
        }
    }
    seams.insert(index, seam);
    debug!(at = index, "seam inserted");
}

/// One seam per gap, empty splits, priority 0, located at the midpoint of
/// the two blobs' bounding boxes.
pub fn start_seam_list(word: &TWerd) -> Vec<Seam> {
    (1..word.blob_count())
        .map(|b| {
            let left = word.blobs[b - 1].bounding_box();
            let right = word.blobs[b].bounding_box();
            let x = (left.right() + right.left()) / 2;
            let y = ((left.bottom() as i32 + left.top() as i32 + right.bottom() as i32
                + right.top() as i32)
                / 4) as i16;
            Seam::new(0.0, IPoint::new(x, y), Vec::new())
        })
        .collect()
}

fn find_point_in_blob(blob: &TBlob, pos: FPoint) -> Option<(usize, crate::containers::NodeId)> {
    for (oi, outline) in blob.outlines.iter().enumerate() {
        if let Some(id) = outline.find_point(pos) {
            return Some((oi, id));
        }
    }
    None
}

/// Walks `.next` from `start`, setting `hidden` on every visited point,
/// until a point matching `target` is reached (or the ring is exhausted).
fn hide_or_reveal_from(
    outline: &mut crate::tess::TessLine,
    start: crate::containers::NodeId,
    target: FPoint,
    hidden: bool,
) {
    let mut cur = start;
    loop {
        let reached = {
            let pt = outline.ring.get_mut(cur);
            pt.hidden = hidden;
            points_match(pt.pos, target)
        };
        if reached {
            break;
        }
        let next = outline.ring.next(cur);
        if next == start {
            break;
        }
        cur = next;
    }
}

fn set_split_hidden(blob: &mut TBlob, split: &Split, hidden: bool) {
    if let Some((oi, id)) = find_point_in_blob(blob, split.point1) {
        hide_or_reveal_from(&mut blob.outlines[oi], id, split.point2, hidden);
    }
    if let Some((oi, id)) = find_point_in_blob(blob, split.point2) {
        hide_or_reveal_from(&mut blob.outlines[oi], id, split.point1, hidden);
    }
}

pub fn hide_seam(blob: &mut TBlob, seam: &Seam) {
    for split in &seam.splits {
        set_split_hidden(blob, split, true);
    }
}

pub fn reveal_seam(blob: &mut TBlob, seam: &Seam) {
    for split in &seam.splits {
        set_split_hidden(blob, split, false);
    }
}

/// Concatenates the outline lists of chopped blobs `first..=last` onto
/// `blob[first]`, hiding every seam whose span lies fully inside the
/// range.
pub fn join_pieces(word: &mut TWerd, seams: &[Seam], first: usize, last: usize) {
    debug_assert!(first < last);
    let hide_flags: Vec<bool> = (first..last)
        .map(|x| {
            let s = &seams[x];
            (x as i32 - s.width_n as i32) >= first as i32
                && (x as i32 + s.width_p as i32) < last as i32
        })
        .collect();

    for b in (first + 1)..=last {
        let mut outlines = std::mem::take(&mut word.blobs[b].outlines);
        word.blobs[first].outlines.append(&mut outlines);
    }

    for (i, x) in (first..last).enumerate() {
        if hide_flags[i] {
            hide_seam(&mut word.blobs[first], &seams[x]);
        }
    }
    debug!(first, last, "joined chopped blobs");
}

/// Reverses `join_pieces`: reveals the contained seams, then re-cuts the
/// merged outline list at the original per-blob boundaries.
///
/// §4.3.4 describes this as finding, for each successive blob boundary,
/// the point in the ring whose `.next` pointer equals the first outline of
/// the next blob. This crate keeps `TBlob::outlines` as a flat appended
/// `Vec<TessLine>` rather than a pointer-linked ring, so the boundary is
/// found the equivalent way for that representation: each outline carries
/// the `piece_tag` it was stamped with at chop time (`TWerd::from_blobs`),
/// and that identity — not a separately-tracked length — survives any
/// number of join/break cycles. Cutting at the first outline whose tag
/// names the next blob in `[first, last]` is exactly "the point whose
/// successor belongs to the next blob," just keyed by outline identity
/// instead of a `.next` pointer.
pub fn break_pieces(word: &mut TWerd, seams: &[Seam], first: usize, last: usize) {
    for x in first..last {
        reveal_seam(&mut word.blobs[first], &seams[x]);
    }

    let merged = std::mem::take(&mut word.blobs[first].outlines);
    let mut pieces: Vec<Vec<TessLine>> = (first..=last).map(|_| Vec::new()).collect();
    let mut current = first;
    for outline in merged {
        if let Some(tag) = outline.piece_tag {
            let tag = tag as usize;
            if tag > current && tag <= last {
                current = tag;
            }
        }
        pieces[current - first].push(outline);
    }
    for (i, piece) in pieces.into_iter().enumerate() {
        word.blobs[first + i].outlines = piece;
    }
    debug!(first, last, "broke chopped blobs apart");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tess::{EdgePoint, TessLine};

    fn blob_at(x: f32, tag: u32) -> TBlob {
        let mut b = TBlob::new();
        let mut line = TessLine::new(
            vec![
                EdgePoint::new(FPoint::new(x, 0.0), FPoint::new(0.0, 1.0)),
                EdgePoint::new(FPoint::new(x, 1.0), FPoint::new(0.0, -1.0)),
            ],
            false,
        );
        line.piece_tag = Some(tag);
        b.outlines.push(line);
        b
    }

    fn five_blob_word() -> TWerd {
        let mut w = TWerd::new();
        for i in 0..5 {
            w.blobs.push(blob_at(i as f32 * 10.0, i as u32));
        }
        w
    }

    #[test]
    fn seam_insertion_updates_widths_and_splits_are_findable() {
        let word = five_blob_word();
        let mut seams = vec![
            Seam::new(0.0, IPoint::new(5, 0), Vec::new()),
            Seam::new(0.0, IPoint::new(15, 0), Vec::new()),
            Seam::new(0.0, IPoint::new(25, 0), Vec::new()),
            Seam::new(0.0, IPoint::new(35, 0), Vec::new()),
        ];
        let split = Split::new(FPoint::new(20.0, 0.0), FPoint::new(30.0, 0.0));
        let new_seam = Seam::new(0.0, IPoint::new(25, 0), vec![split]);

        insert_seam(&word, 2, new_seam, &mut seams);
        assert_eq!(seams.len(), 5);
        assert_eq!(account_splits(&seams[2], &word, 3, 1), 0);
        assert!(find_split_in_blob(&seams[2].splits[0], &word.blobs[2]));
        assert!(find_split_in_blob(&seams[2].splits[0], &word.blobs[3]));
    }

    #[test]
    fn join_then_break_restores_hidden_state() {
        let mut word = five_blob_word();
        let split = Split::new(FPoint::new(10.0, 0.0), FPoint::new(10.0, 1.0));
        let seams = vec![
            Seam::new(0.0, IPoint::new(5, 0), vec![split]),
            Seam::new(0.0, IPoint::new(15, 0), Vec::new()),
            Seam::new(0.0, IPoint::new(25, 0), Vec::new()),
            Seam::new(0.0, IPoint::new(35, 0), Vec::new()),
        ];

        join_pieces(&mut word, &seams, 0, 1);
        assert_eq!(word.blobs[0].outlines.len(), 2);
        assert_eq!(word.blobs[1].outlines.len(), 0);

        break_pieces(&mut word, &seams, 0, 1);
        assert_eq!(word.blobs[0].outlines.len(), 1);
        assert_eq!(word.blobs[1].outlines.len(), 1);
        for outline in word.blobs[0].outlines.iter().chain(&word.blobs[1].outlines) {
            assert!(outline.ring.iter().all(|p| !p.hidden));
        }
    }

    #[test]
    fn account_splits_reports_missing_split_as_failure() {
        let word = five_blob_word();
        let ghost = Split::new(FPoint::new(999.0, 999.0), FPoint::new(998.0, 998.0));
        let seam = Seam::new(0.0, IPoint::new(0, 0), vec![ghost]);
        assert_eq!(account_splits(&seam, &word, 0, 1), -1);
    }
}
