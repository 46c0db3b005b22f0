//! Buildable-envelope derivation.
//!
//! The buildable region of a parcel is everything inside the closed
//! boundary ring that is at least the resolved setback distance away from
//! each guarded edge. It is materialized as a 1-unit raster mask over the
//! parcel's integer-snapped bounding box, sampling cell centers; of a
//! multi-part result only the largest 4-connected component is kept.

use tracing::warn;

use crate::parcel::{Parcel, Pt};
use crate::primitives::{dist_point_polyline, point_in_polygon};

/// A binary occupancy grid at 1 linear unit per cell.
#[derive(Debug, Clone)]
pub struct RasterEnvelope {
    /// World coordinate of the grid's lower-left corner.
    pub origin: Pt,
    pub width: usize,
    pub height: usize,
    /// Row-major cell mask, `true` = buildable.
    pub mask: Vec<bool>,
}

impl RasterEnvelope {
    pub fn cell(&self, x: usize, y: usize) -> bool {
        self.mask[y * self.width + x]
    }

    /// Buildable area in squared linear units (one per true cell).
    pub fn area(&self) -> f64 {
        self.mask.iter().filter(|&&b| b).count() as f64
    }

    pub fn is_empty(&self) -> bool {
        !self.mask.iter().any(|&b| b)
    }
}

/// Derive the buildable envelope for a parcel given one setback distance
/// per edge (aligned with `parcel.edges`; `None` = edge not buffered).
///
/// Setback distances must already be in the parcel's linear unit.
/// Returns `None` when the parcel boundary does not polygonize; an
/// envelope with an all-false mask means "no buildable area".
pub fn buildable_envelope(parcel: &Parcel, setbacks: &[Option<f64>]) -> Option<RasterEnvelope> {
    let ring = match parcel.ring() {
        Some(ring) => ring,
        None => {
            warn!(parcel = %parcel.id, "cannot derive buildable envelope: no closed boundary");
            return None;
        }
    };
    let (min_x, min_y, max_x, max_y) = parcel.bounds()?;
    let origin = (min_x.floor(), min_y.floor());
    let width = (max_x.ceil() - origin.0).max(0.0) as usize;
    let height = (max_y.ceil() - origin.1).max(0.0) as usize;
    if width == 0 || height == 0 {
        warn!(parcel = %parcel.id, "degenerate parcel bounds");
        return None;
    }

    let guarded: Vec<(&[Pt], f64)> = parcel
        .edges
        .iter()
        .zip(setbacks.iter())
        .filter_map(|(edge, sb)| sb.map(|d| (edge.points.as_slice(), d)))
        .collect();

    let mut mask = vec![false; width * height];
    for gy in 0..height {
        for gx in 0..width {
            let cx = origin.0 + gx as f64 + 0.5;
            let cy = origin.1 + gy as f64 + 0.5;
            if !point_in_polygon(cx, cy, &ring) {
                continue;
            }
            let clear = guarded
                .iter()
                .all(|&(points, d)| dist_point_polyline((cx, cy), points) >= d);
            if clear {
                mask[gy * width + gx] = true;
            }
        }
    }

    let mut env = RasterEnvelope {
        origin,
        width,
        height,
        mask,
    };
    keep_largest_component(&mut env);
    Some(env)
}

/// Clear every true cell outside the largest 4-connected component.
fn keep_largest_component(env: &mut RasterEnvelope) {
    let (w, h) = (env.width, env.height);
    let mut label = vec![0u32; w * h];
    let mut next = 0u32;
    let mut best: (u32, usize) = (0, 0);

    let mut stack = Vec::new();
    for start in 0..w * h {
        if !env.mask[start] || label[start] != 0 {
            continue;
        }
        next += 1;
        let mut size = 0usize;
        stack.push(start);
        label[start] = next;
        while let Some(idx) = stack.pop() {
            size += 1;
            let (x, y) = (idx % w, idx / w);
            let mut visit = |nx: usize, ny: usize| {
                let nidx = ny * w + nx;
                if env.mask[nidx] && label[nidx] == 0 {
                    label[nidx] = next;
                    stack.push(nidx);
                }
            };
            if x > 0 {
                visit(x - 1, y);
            }
            if x + 1 < w {
                visit(x + 1, y);
            }
            if y > 0 {
                visit(x, y - 1);
            }
            if y + 1 < h {
                visit(x, y + 1);
            }
        }
        if size > best.1 {
            best = (next, size);
        }
    }

    if next > 1 {
        for idx in 0..w * h {
            if env.mask[idx] && label[idx] != best.0 {
                env.mask[idx] = false;
            }
        }
    }
}
