//! Rectangular footprint fit testing.
//!
//! A `width x depth` rectangle fits when some axis-aligned placement of it
//! covers only buildable cells. The scan checks both orientations
//! (width/depth swapped) at every anchor cell, and [`rot_fit`] repeats the
//! whole test with the parcel rotated in fixed-degree steps from 0 up to
//! but excluding 90 degrees. 90 is enough: the orientation swap inside
//! [`fits`] covers the other quadrant and rectangles are symmetric under a
//! further 90-degree rotation.

use crate::envelope::{buildable_envelope, RasterEnvelope};
use crate::parcel::Parcel;

/// Whether a `w x d` cell rectangle fits in the mask in either orientation.
pub fn fits(env: &RasterEnvelope, w: usize, d: usize) -> bool {
    if w == 0 || d == 0 {
        return false;
    }
    for y in 0..env.height {
        for x in 0..env.width {
            if !env.cell(x, y) {
                continue;
            }
            if window_clear(env, x, y, w, d) || window_clear(env, x, y, d, w) {
                return true;
            }
        }
    }
    false
}

fn window_clear(env: &RasterEnvelope, x: usize, y: usize, w: usize, d: usize) -> bool {
    if x + w > env.width || y + d > env.height {
        return false;
    }
    for yy in y..y + d {
        for xx in x..x + w {
            if !env.cell(xx, yy) {
                return false;
            }
        }
    }
    true
}

/// Test a rectangle of real-valued dimensions against an envelope.
/// Dimensions round to whole cells; non-positive dimensions never fit.
pub fn rect_fit(env: &RasterEnvelope, width: f64, depth: f64) -> bool {
    if width <= 0.0 || depth <= 0.0 {
        return false;
    }
    let w = width.round().max(1.0) as usize;
    let d = depth.round().max(1.0) as usize;
    fits(env, w, d)
}

/// Footprint fit with rotation search.
///
/// Rebuilds the buildable envelope with the parcel rotated about its
/// bounding-box center at each step and stops at the first fit.
pub fn rot_fit(
    parcel: &Parcel,
    setbacks: &[Option<f64>],
    width: f64,
    depth: f64,
    step_deg: f64,
) -> bool {
    let step = if step_deg > 0.0 { step_deg } else { 15.0 };
    let center = match parcel.bounds() {
        Some((min_x, min_y, max_x, max_y)) => ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0),
        None => return false,
    };

    let mut rot = 0.0;
    while rot < 90.0 {
        let candidate = if rot == 0.0 {
            parcel.clone()
        } else {
            parcel.rotated_about(center, rot)
        };
        if let Some(env) = buildable_envelope(&candidate, setbacks) {
            if rect_fit(&env, width, depth) {
                return true;
            }
        }
        rot += step;
    }
    false
}
