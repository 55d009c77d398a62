//! Polygonal approximation: turns a chain-coded [`COutline`] into a
//! [`TessLine`] ring of fixed `EdgePoint`s (§4.2). Mirrors
//! `ccstruct/polyaprx.cpp` (`ApproximateOutline`/`edgesteps_to_edgepts`/
//! `fix2`/`poly2`/`cutline`).

use crate::geometry::FPoint;
use crate::outline::{CBlob, COutline, ChainStep};
use crate::tess::{EdgePoint, TBlob, TessLine};

/// Default `approx_dist` tuning constant for [`cutline`]'s decision, also
/// the `DocStructConfig::approx_dist` default.
pub const DEFAULT_APPROX_DIST: f32 = 15.0;

const AREA_FLOOR: i64 = 1200;
const MIN_GAP_AREA_FLOOR: i64 = 450;

fn cardinal_octant(step: ChainStep) -> u8 {
    match step {
        ChainStep::Right => 0,
        ChainStep::Down => 2,
        ChainStep::Left => 4,
        ChainStep::Up => 6,
    }
}

/// True when `b` immediately clockwise-follows `a`, i.e. the pair forms a
/// 45-degree diagonal step.
fn is_diagonal_twin(a: ChainStep, b: ChainStep) -> bool {
    matches!(
        (a, b),
        (ChainStep::Right, ChainStep::Down)
            | (ChainStep::Down, ChainStep::Left)
            | (ChainStep::Left, ChainStep::Up)
            | (ChainStep::Up, ChainStep::Right)
    )
}

/// Phase A: collapse runs of identical direction into single `EdgePoint`s,
/// merging 45-degree step pairs first.
pub fn edgesteps_to_edgepoints(outline: &COutline) -> Vec<EdgePoint> {
    let steps = &outline.steps;
    let n = steps.len();
    let mut elems: Vec<(FPoint, u8)> = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        let a = steps[i];
        if i + 1 < n && is_diagonal_twin(a, steps[i + 1]) {
            let vec = FPoint::from(a.delta()) + FPoint::from(steps[i + 1].delta());
            elems.push((vec, (cardinal_octant(a) + 1) % 8));
            i += 2;
        } else {
            elems.push((FPoint::from(a.delta()), cardinal_octant(a)));
            i += 1;
        }
    }

    let mut points = Vec::new();
    if elems.is_empty() {
        return points;
    }
    let mut pos = FPoint::from(outline.start);
    let mut idx = 0;
    while idx < elems.len() {
        let dir = elems[idx].1;
        let mut vec_sum = FPoint::new(0.0, 0.0);
        let mut run = 0u16;
        while idx < elems.len() && elems[idx].1 == dir {
            vec_sum = vec_sum + elems[idx].0;
            run += 1;
            idx += 1;
        }
        let mut ep = EdgePoint::new(pos, vec_sum);
        ep.run_length = run;
        ep.dir = dir;
        pos = pos + vec_sum;
        points.push(ep);
    }
    points
}

fn octant_diff(a: u8, b: u8) -> i32 {
    (a as i32 - b as i32).rem_euclid(8)
}

/// Phase B, first half: mark sharp bends (and long runs) as `fixed`, then
/// unfix isolated singletons sitting between two equal-direction runs.
fn mark_fixed_corners(points: &mut [EdgePoint]) {
    let n = points.len();
    if n == 0 {
        return;
    }
    for i in 0..n {
        let prev = (i + n - 1) % n;
        let diff = octant_diff(points[i].dir, points[prev].dir);
        let sharp = diff != 0 && diff != 1 && diff != 7;
        if sharp || points[i].run_length >= 8 {
            points[i].fixed = true;
        }
    }
    for i in 0..n {
        let prev = (i + n - 1) % n;
        let next = (i + 1) % n;
        if points[i].fixed
            && points[i].run_length <= 1
            && points[prev].dir == points[next].dir
            && !points[prev].fixed
        {
            points[i].fixed = false;
        }
    }
}

fn dist_sq(a: FPoint, b: FPoint) -> f32 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/// Phase B, second half: enforce a minimum gap between adjacent fixed
/// points (never reducing the fixed count below 3), driven by the
/// outline's bounding area.
fn enforce_min_gap(points: &mut [EdgePoint], area: i64) {
    let n = points.len();
    if n < 4 {
        return;
    }
    let area = area.max(MIN_GAP_AREA_FLOOR);
    let gapmin = (area * 400 / 44_000) as f32;
    loop {
        let fixed_idx: Vec<usize> = (0..n).filter(|&i| points[i].fixed).collect();
        if fixed_idx.len() <= 3 {
            return;
        }
        let mut changed = false;
        for w in 0..fixed_idx.len() {
            let f0 = fixed_idx[w];
            let f1 = fixed_idx[(w + 1) % fixed_idx.len()];
            let f2 = fixed_idx[(w + 2) % fixed_idx.len()];
            let f3 = fixed_idx[(w + 3) % fixed_idx.len()];
            let d12 = dist_sq(points[f1].pos, points[f2].pos);
            if d12 < gapmin {
                let d01 = dist_sq(points[f0].pos, points[f1].pos);
                let d23 = dist_sq(points[f2].pos, points[f3].pos);
                if d01 > d23 {
                    points[f2].fixed = false;
                } else {
                    points[f1].fixed = false;
                }
                changed = true;
                break;
            }
        }
        if !changed {
            return;
        }
        if (0..n).filter(|&i| points[i].fixed).count() <= 3 {
            return;
        }
    }
}

/// Phase C: recursively subdivides the unfixed run between `first` and
/// `last` (circular indices into `points`), fixing the point with the
/// largest perpendicular deviation from the `first`-`last` chord whenever
/// the deviation, mean-squared-deviation, or raw chord length crosses the
/// `approx_dist`-scaled thresholds.
fn cutline(points: &mut [EdgePoint], first: usize, last: usize, area: i64, approx_dist: f32) {
    let n = points.len();
    let next_of = |i: usize| (i + 1) % n;
    if next_of(first) == last {
        return;
    }

    let mut vecsum = points[last].pos - points[first].pos;
    if vecsum.x == 0.0 && vecsum.y == 0.0 {
        let prev = (first + n - 1) % n;
        vecsum = -points[prev].vec;
    }
    let vlen = vecsum.x.abs().max(vecsum.y.abs());
    let vecsum_len = vecsum.length().max(1e-6);

    let mut acc = points[first].vec;
    let mut max_perp_sq = 0f32;
    let mut max_idx = next_of(first);
    let mut sum_sq = 0f32;
    let mut count = 0i64;
    let mut cur = next_of(first);
    while cur != last {
        let perp = acc.cross(vecsum);
        let perp_sq = perp * perp;
        sum_sq += perp_sq;
        count += 1;
        if perp_sq > max_perp_sq {
            max_perp_sq = perp_sq;
            max_idx = cur;
        }
        acc = acc + points[cur].vec;
        cur = next_of(cur);
    }
    if count == 0 {
        return;
    }

    let scaled_max_perp = max_perp_sq / vecsum_len;
    let msd = sum_sq / (vecsum_len * count as f32);
    let approx_sq = (approx_dist * approx_dist).max(1.0);
    let area_f = area as f32;

    let decide = scaled_max_perp * 4500.0 / approx_sq >= 10.0 * area_f
        || msd * 6750.0 / approx_sq >= 10.0 * area_f
        || vlen >= 126.0;

    if decide {
        points[max_idx].fixed = true;
        cutline(points, first, max_idx, area, approx_dist);
        cutline(points, max_idx, last, area, approx_dist);
    }
}

/// Phase C orchestrator: run `cutline` over every currently-fixed-point
/// pair, halving `area` and retrying if fewer than 3 fixed points survive.
fn poly2(points: &mut [EdgePoint], mut area: i64, approx_dist: f32) {
    let n = points.len();
    if n == 0 {
        return;
    }
    loop {
        if !points.iter().any(|p| p.fixed) {
            points[0].fixed = true;
        }
        let eff_area = area.max(AREA_FLOOR);
        let fixed: Vec<usize> = (0..n).filter(|&i| points[i].fixed).collect();
        for w in 0..fixed.len() {
            let first = fixed[w];
            let last = fixed[(w + 1) % fixed.len()];
            cutline(points, first, last, eff_area, approx_dist);
        }
        let fixed_count = points.iter().filter(|p| p.fixed).count();
        if fixed_count >= 3 || area <= 1 {
            return;
        }
        area /= 2;
    }
}

fn recompute_tessline_vectors(line: &mut TessLine) {
    let ids: Vec<_> = line.ring.ids().collect();
    if ids.is_empty() {
        return;
    }
    let positions: Vec<FPoint> = ids.iter().map(|&id| line.ring.get(id).pos).collect();
    for (i, &id) in ids.iter().enumerate() {
        let next_pos = positions[(i + 1) % positions.len()];
        let here = line.ring.get(id).pos;
        line.ring.get_mut(id).vec = next_pos - here;
    }
}

/// Runs the full three-phase approximation on one chain-coded outline,
/// producing a single `TessLine` of its surviving fixed points.
pub fn approximate_outline(outline: &COutline, approx_dist: f32) -> TessLine {
    let mut points = edgesteps_to_edgepoints(outline);
    if points.is_empty() {
        return TessLine::new(Vec::new(), false);
    }

    let bbox = outline.bounding_box();
    let side = bbox.height().max(bbox.width()) as i64;
    let area = side * side;

    mark_fixed_corners(&mut points);
    enforce_min_gap(&mut points, area);
    poly2(&mut points, area.max(AREA_FLOOR), approx_dist);

    let fixed: Vec<EdgePoint> = points.into_iter().filter(|p| p.fixed).collect();
    let mut line = TessLine::new(fixed, false);
    recompute_tessline_vectors(&mut line);
    line
}

fn flatten_outline(outline: &COutline, is_hole: bool, approx_dist: f32, out: &mut TBlob) {
    let mut line = approximate_outline(outline, approx_dist);
    line.is_hole = is_hole;
    out.outlines.push(line);
    for child in &outline.children {
        flatten_outline(child, !is_hole, approx_dist, out);
    }
}

/// Approximates every chain-coded outline (and nested holes) of a `CBlob`,
/// flattening the result into one `TBlob` of sibling `TessLine`s.
pub fn approximate_blob(blob: &CBlob, approx_dist: f32) -> TBlob {
    let mut out = TBlob::new();
    for outline in &blob.outlines {
        flatten_outline(outline, false, approx_dist, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::IPoint;

    fn rectangle_outline(w: i32, h: i32) -> COutline {
        let mut steps = Vec::new();
        steps.extend(std::iter::repeat(ChainStep::Right).take(w as usize));
        steps.extend(std::iter::repeat(ChainStep::Up).take(h as usize));
        steps.extend(std::iter::repeat(ChainStep::Left).take(w as usize));
        steps.extend(std::iter::repeat(ChainStep::Down).take(h as usize));
        COutline::new(IPoint::new(0, 0), steps).unwrap()
    }

    #[test]
    fn rectangle_collapses_to_four_edgepoints() {
        let outline = rectangle_outline(20, 10);
        let points = edgesteps_to_edgepoints(&outline);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].run_length, 20);
        assert_eq!(points[1].run_length, 10);
    }

    #[test]
    fn approximation_yields_at_least_three_points() {
        let outline = rectangle_outline(40, 30);
        let line = approximate_outline(&outline, DEFAULT_APPROX_DIST);
        assert!(line.point_count() >= 3);
    }

    #[test]
    fn approximation_preserves_rectangle_corners() {
        let outline = rectangle_outline(40, 30);
        let line = approximate_outline(&outline, DEFAULT_APPROX_DIST);
        // A clean rectangle's four sharp corners all survive as fixed
        // (sharp-bend) points, so the approximation is itself a
        // quadrilateral.
        assert_eq!(line.point_count(), 4);
        let bbox = line.bounding_box();
        assert_eq!(bbox, outline.bounding_box());
    }

    #[test]
    fn diagonal_pair_merges_into_one_octant() {
        let outline = COutline::new(
            IPoint::new(0, 0),
            vec![
                ChainStep::Right,
                ChainStep::Down,
                ChainStep::Right,
                ChainStep::Down,
                ChainStep::Left,
                ChainStep::Left,
                ChainStep::Up,
                ChainStep::Up,
            ],
        )
        .unwrap();
        let points = edgesteps_to_edgepoints(&outline);
        // The two (Right, Down) pairs merge into one run of the same
        // diagonal octant.
        assert_eq!(points[0].run_length, 2);
        assert_eq!(points[0].dir, (cardinal_octant(ChainStep::Right) + 1) % 8);
    }
}
