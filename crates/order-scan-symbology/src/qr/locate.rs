//! Finder pattern location and symbol geometry estimation.
//!
//! Rows are scanned for the 1:1:3:1:1 dark/light signature, candidates are
//! cross-checked vertically and clustered, and the best three centers are
//! oriented into top-left / top-right / bottom-left.

use nalgebra::Point2;
use order_scan_core::LumaView;

use crate::deadline::Deadline;
use crate::oned::{row_runs, Run};
use crate::DecodeError;

use super::version::{MAX_DIMENSION, MIN_DIMENSION};

/// One clustered finder-pattern candidate.
#[derive(Clone, Copy, Debug)]
struct FinderCandidate {
    center: Point2<f32>,
    module: f32,
    votes: usize,
}

/// A located symbol: the three finder centers plus estimated geometry.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LocatedQr {
    pub top_left: Point2<f32>,
    pub top_right: Point2<f32>,
    pub bottom_left: Point2<f32>,
    pub dimension: usize,
}

const ROW_STRIDE: usize = 2;
const DEADLINE_ROW_CHECK: usize = 32;
const MIN_MODULE_PX: f32 = 1.8;
const MAX_CANDIDATES_FOR_TRIPLES: usize = 8;

/// Locate one QR symbol on the plane.
pub(crate) fn locate(
    plane: &LumaView<'_>,
    threshold: u8,
    deadline: &Deadline,
) -> Result<Option<LocatedQr>, DecodeError> {
    let mut candidates: Vec<FinderCandidate> = Vec::new();

    for (row_index, y) in (0..plane.height).step_by(ROW_STRIDE).enumerate() {
        if row_index % DEADLINE_ROW_CHECK == 0 {
            deadline.check()?;
        }

        let runs = row_runs(plane.row(y), threshold);
        for i in 0..runs.len() {
            if !runs[i].black || i + 5 > runs.len() {
                continue;
            }
            let window = &runs[i..i + 5];
            let Some(module) = finder_ratio_module(window) else {
                continue;
            };

            let center_run = &window[2];
            let cx = center_run.start as f32 + center_run.len as f32 / 2.0;
            let Some((cy, v_module)) = cross_check_vertical(plane, threshold, cx, y, module)
            else {
                continue;
            };

            merge_candidate(
                &mut candidates,
                Point2::new(cx, cy),
                (module + v_module) / 2.0,
            );
        }
    }

    candidates.retain(|c| c.votes >= 2);
    if candidates.len() < 3 {
        return Ok(None);
    }
    Ok(pick_triple(&mut candidates))
}

/// Module size when five runs form a 1:1:3:1:1 finder signature.
fn finder_ratio_module(window: &[Run]) -> Option<f32> {
    let total: usize = window.iter().map(|r| r.len).sum();
    let module = total as f32 / 7.0;
    if module < MIN_MODULE_PX {
        return None;
    }

    let expected = [1.0f32, 1.0, 3.0, 1.0, 1.0];
    for (run, &exp) in window.iter().zip(&expected) {
        let dev = (run.len as f32 / module - exp).abs();
        let limit = if exp > 1.0 { 0.75 } else { 0.5 };
        if dev > limit {
            return None;
        }
    }
    Some(module)
}

/// Walk up and down from `(cx, y)` confirming the vertical 1:1:3:1:1
/// signature; yields the refined center row and vertical module size.
fn cross_check_vertical(
    plane: &LumaView<'_>,
    threshold: u8,
    cx: f32,
    y: usize,
    module: f32,
) -> Option<(f32, f32)> {
    let x = cx.round() as i32;
    if x < 0 || x >= plane.width as i32 {
        return None;
    }
    let x = x as usize;
    let max_run = (module * 5.0).ceil() as usize;
    let is_black = |yy: usize| plane.data[yy * plane.width + x] < threshold;

    if !is_black(y) {
        return None;
    }

    // Center run, then white, then black, both directions.
    let mut up = [0usize; 3];
    let mut yy = y;
    'outer_up: for (phase, slot) in up.iter_mut().enumerate() {
        loop {
            let want_black = phase != 1;
            if is_black(yy) != want_black {
                break;
            }
            *slot += 1;
            if *slot > max_run {
                return None;
            }
            if yy == 0 {
                break 'outer_up;
            }
            yy -= 1;
        }
    }

    let mut down = [0usize; 3];
    let mut yy = y + 1;
    'outer_down: for (phase, slot) in down.iter_mut().enumerate() {
        loop {
            if yy >= plane.height {
                break 'outer_down;
            }
            let want_black = phase != 1;
            if is_black(yy) != want_black {
                break;
            }
            *slot += 1;
            if *slot > max_run {
                return None;
            }
            yy += 1;
        }
    }

    let counts = [
        up[2],
        up[1],
        up[0] + down[0],
        down[1],
        down[2],
    ];
    let total: usize = counts.iter().sum();
    let v_module = total as f32 / 7.0;
    if v_module < MIN_MODULE_PX {
        return None;
    }
    let expected = [1.0f32, 1.0, 3.0, 1.0, 1.0];
    for (&count, &exp) in counts.iter().zip(&expected) {
        let dev = (count as f32 / v_module - exp).abs();
        let limit = if exp > 1.0 { 0.75 } else { 0.5 };
        if dev > limit {
            return None;
        }
    }

    // Center of the middle run: spans [y - up[0] + 1, y + down[0]].
    let top = y as f32 - up[0] as f32 + 1.0;
    let bottom = y as f32 + down[0] as f32;
    Some(((top + bottom) / 2.0, v_module))
}

fn merge_candidate(candidates: &mut Vec<FinderCandidate>, center: Point2<f32>, module: f32) {
    for c in candidates.iter_mut() {
        if (c.center.x - center.x).abs() <= c.module && (c.center.y - center.y).abs() <= c.module {
            let w = c.votes as f32;
            c.center = Point2::new(
                (c.center.x * w + center.x) / (w + 1.0),
                (c.center.y * w + center.y) / (w + 1.0),
            );
            c.module = (c.module * w + module) / (w + 1.0);
            c.votes += 1;
            return;
        }
    }
    candidates.push(FinderCandidate {
        center,
        module,
        votes: 1,
    });
}

/// Choose the three most consistent candidates and orient them.
fn pick_triple(candidates: &mut [FinderCandidate]) -> Option<LocatedQr> {
    candidates.sort_by(|a, b| b.votes.cmp(&a.votes));
    let pool = &candidates[..candidates.len().min(MAX_CANDIDATES_FOR_TRIPLES)];

    let mut best: Option<(f32, [FinderCandidate; 3])> = None;
    for i in 0..pool.len() {
        for j in (i + 1)..pool.len() {
            for k in (j + 1)..pool.len() {
                let trio = [pool[i], pool[j], pool[k]];
                let sizes: Vec<f32> = trio.iter().map(|c| c.module).collect();
                let min = sizes.iter().cloned().fold(f32::INFINITY, f32::min);
                let max = sizes.iter().cloned().fold(0.0f32, f32::max);
                let avg = sizes.iter().sum::<f32>() / 3.0;
                let spread = (max - min) / avg;
                if spread > 0.25 {
                    continue;
                }
                if best.map(|(bs, _)| spread < bs).unwrap_or(true) {
                    best = Some((spread, trio));
                }
            }
        }
    }

    let (_, trio) = best?;
    orient(&trio)
}

/// Identify the right-angle corner as top-left and orient the other two.
fn orient(trio: &[FinderCandidate; 3]) -> Option<LocatedQr> {
    let mut best_idx = 0usize;
    let mut best_cos = f32::INFINITY;
    for i in 0..3 {
        let p = trio[i].center;
        let a = trio[(i + 1) % 3].center;
        let b = trio[(i + 2) % 3].center;
        let v1 = a - p;
        let v2 = b - p;
        let denom = v1.norm() * v2.norm();
        if denom == 0.0 {
            return None;
        }
        let cos = (v1.dot(&v2) / denom).abs();
        if cos < best_cos {
            best_cos = cos;
            best_idx = i;
        }
    }

    let tl = trio[best_idx];
    let p1 = trio[(best_idx + 1) % 3];
    let p2 = trio[(best_idx + 2) % 3];
    let v1 = p1.center - tl.center;
    let v2 = p2.center - tl.center;
    let cross = v1.x * v2.y - v1.y * v2.x;
    let (tr, bl) = if cross > 0.0 { (p1, p2) } else { (p2, p1) };

    let module = (tl.module + tr.module + bl.module) / 3.0;
    let d_tr = (tr.center - tl.center).norm();
    let d_bl = (bl.center - tl.center).norm();
    let dim1 = d_tr / module + 7.0;
    let dim2 = d_bl / module + 7.0;
    if (dim1 - dim2).abs() > 4.0 {
        return None;
    }

    let dimension = snap_dimension((dim1 + dim2) / 2.0)?;
    Some(LocatedQr {
        top_left: tl.center,
        top_right: tr.center,
        bottom_left: bl.center,
        dimension,
    })
}

/// Snap a raw dimension estimate to the nearest supported symbol size.
fn snap_dimension(raw: f32) -> Option<usize> {
    let rounded = raw.round() as i64;
    let mut best: Option<(i64, usize)> = None;
    let mut dim = MIN_DIMENSION;
    while dim <= MAX_DIMENSION {
        let err = (dim as i64 - rounded).abs();
        if best.map(|(be, _)| err < be).unwrap_or(true) {
            best = Some((err, dim));
        }
        dim += 4;
    }
    let (err, dim) = best?;
    (err <= 2).then_some(dim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_scan_core::LumaImage;

    /// Paint a 7x7 finder pattern with its module origin at `(ox, oy)`.
    fn paint_finder(img: &mut LumaImage, ox: usize, oy: usize, px: usize) {
        for my in 0..7 {
            for mx in 0..7 {
                let ring = mx == 0 || my == 0 || mx == 6 || my == 6;
                let core = (2..=4).contains(&mx) && (2..=4).contains(&my);
                if !(ring || core) {
                    continue;
                }
                for dy in 0..px {
                    for dx in 0..px {
                        let x = (ox + mx) * px + dx;
                        let y = (oy + my) * px + dy;
                        img.data[y * img.width + x] = 0;
                    }
                }
            }
        }
    }

    #[test]
    fn locates_synthetic_version1_layout() {
        // Version-1 geometry: 21 modules plus 4 quiet on each side.
        let px = 6;
        let total = 29 * px;
        let mut img = LumaImage {
            width: total,
            height: total,
            data: vec![255; total * total],
        };
        paint_finder(&mut img, 4, 4, px);
        paint_finder(&mut img, 4 + 14, 4, px);
        paint_finder(&mut img, 4, 4 + 14, px);

        let deadline = Deadline::new(None);
        let located = locate(&img.view(), 128, &deadline)
            .expect("no timeout")
            .expect("should locate");

        assert_eq!(located.dimension, 21);
        // Top-left finder center: module (4 + 3.5) * px.
        let expect = 7.5 * px as f32;
        assert!((located.top_left.x - expect).abs() < 2.0);
        assert!((located.top_left.y - expect).abs() < 2.0);
        assert!(located.top_right.x > located.top_left.x + 10.0);
        assert!(located.bottom_left.y > located.top_left.y + 10.0);
    }

    #[test]
    fn blank_plane_locates_nothing() {
        let img = LumaImage {
            width: 64,
            height: 64,
            data: vec![255; 64 * 64],
        };
        let deadline = Deadline::new(None);
        let located = locate(&img.view(), 128, &deadline).expect("no timeout");
        assert!(located.is_none());
    }
}
