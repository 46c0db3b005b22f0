//! Setback resolution onto parcel edges.
//!
//! Maps resolved setback constraints onto the parcel's labeled edges,
//! then applies the supplemental rules: the district-boundary minimum,
//! and the side/front "sum" rules whose shortfall is added entirely to
//! the second edge of the pair rather than split evenly.

use tracing::warn;

use zonic_geom::primitives::dist_point_polyline;
use zonic_geom::{Parcel, Pt, Side};

use crate::interpret::Bound;
use crate::resolve::ResolvedConstraint;
use crate::units::to_parcel_units;

/// Resolved setback for one parcel edge, aligned with `parcel.edges`.
#[derive(Debug, Clone, Default)]
pub struct EdgeSetback {
    /// Candidate distances in descending order; two entries mean a
    /// [strict, relaxed] band, empty means no setback applies.
    pub values: Vec<f64>,
    pub unit: Option<String>,
    pub on_boundary: bool,
}

impl EdgeSetback {
    pub fn is_null(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest candidate (the lenient reading of a two-valued bound).
    pub fn relaxed(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Largest candidate.
    pub fn strict(&self) -> Option<f64> {
        self.values.first().copied()
    }

    fn raise_to(&mut self, floor: f64) {
        for v in &mut self.values {
            *v = v.max(floor);
        }
        self.values.dedup();
    }

    fn add(&mut self, amount: f64) {
        if self.values.is_empty() {
            self.values.push(amount);
        } else {
            for v in &mut self.values {
                *v += amount;
            }
        }
    }
}

fn side_spec_type(side: Side) -> &'static str {
    match side {
        Side::Front => "setback_front",
        Side::Rear => "setback_rear",
        Side::InteriorSide => "setback_side_int",
        Side::ExteriorSide => "setback_side_ext",
    }
}

fn find_row<'a>(resolved: &'a [ResolvedConstraint], spec_type: &str) -> Option<&'a ResolvedConstraint> {
    resolved.iter().find(|r| r.spec_type == spec_type)
}

/// Descending candidate list from a resolved min bound.
fn bound_values(bound: &Bound) -> Vec<f64> {
    match bound.values() {
        Some(vs) => {
            let mut out = vs.to_vec();
            out.sort_by(|a, b| b.partial_cmp(a).unwrap());
            out.dedup();
            out
        }
        None => Vec::new(),
    }
}

/// Assign a setback to every parcel edge and apply the supplemental
/// rules. `district_boundary` is the district's boundary ring, consulted
/// only when a `setback_dist_boundary` constraint resolved.
pub fn assign_setbacks(
    parcel: &Parcel,
    resolved: &[ResolvedConstraint],
    district_boundary: Option<&[Pt]>,
    buffer_dist: f64,
) -> Vec<EdgeSetback> {
    let mut setbacks: Vec<EdgeSetback> = Vec::with_capacity(parcel.edges.len());
    let mut missing_side = false;

    for edge in &parcel.edges {
        let mut sb = EdgeSetback::default();
        match edge.side {
            Some(side) => {
                if let Some(row) = find_row(resolved, side_spec_type(side)) {
                    sb.values = bound_values(&row.min_value);
                    sb.unit = row.unit.clone();
                }
            }
            None => missing_side = true,
        }
        setbacks.push(sb);
    }
    if missing_side {
        warn!(parcel = %parcel.id, "edge without side label; setback not considered");
    }

    apply_boundary_rule(parcel, resolved, district_boundary, buffer_dist, &mut setbacks);
    apply_side_sum_rule(parcel, resolved, &mut setbacks);
    apply_front_sum_rule(parcel, resolved, &mut setbacks);

    setbacks
}

/// Edges lying within `buffer_dist` of the district boundary get their
/// setback raised to at least the boundary-distance minimum. Edges with
/// no setback stay null.
fn apply_boundary_rule(
    parcel: &Parcel,
    resolved: &[ResolvedConstraint],
    district_boundary: Option<&[Pt]>,
    buffer_dist: f64,
    setbacks: &mut [EdgeSetback],
) {
    let Some(row) = find_row(resolved, "setback_dist_boundary") else {
        return;
    };
    let Some(dist_b) = bound_values(&row.min_value).first().copied() else {
        return;
    };
    let Some(boundary) = district_boundary else {
        warn!(parcel = %parcel.id, "setback_dist_boundary resolved but district has no boundary geometry");
        return;
    };
    // treat the boundary as a closed ring
    let mut ring: Vec<Pt> = boundary.to_vec();
    if ring.first() != ring.last() {
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
    }

    for (edge, sb) in parcel.edges.iter().zip(setbacks.iter_mut()) {
        let within = !edge.points.is_empty()
            && edge
                .points
                .iter()
                .all(|&p| dist_point_polyline(p, &ring) <= buffer_dist);
        if within {
            sb.on_boundary = true;
            if !sb.is_null() {
                sb.raise_to(dist_b);
            }
        }
    }
}

/// Pick the pair of side edges for the side-sum rule: prefer one
/// interior + one exterior, else two interior, else two exterior. The
/// shortfall lands on the second edge of the pair.
fn side_pair(parcel: &Parcel) -> Option<(usize, usize)> {
    let idxs = |side: Side| -> Vec<usize> {
        parcel
            .edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.side == Some(side))
            .map(|(i, _)| i)
            .collect()
    };
    let int = idxs(Side::InteriorSide);
    let ext = idxs(Side::ExteriorSide);
    if !ext.is_empty() && !int.is_empty() {
        Some((ext[0], int[0]))
    } else if int.len() >= 2 {
        Some((int[0], int[1]))
    } else if ext.len() >= 2 {
        Some((ext[0], ext[1]))
    } else {
        None
    }
}

fn apply_side_sum_rule(
    parcel: &Parcel,
    resolved: &[ResolvedConstraint],
    setbacks: &mut [EdgeSetback],
) {
    let Some(row) = find_row(resolved, "setback_side_sum") else {
        return;
    };
    let Some(required) = bound_values(&row.min_value).first().copied() else {
        return;
    };
    let Some((first, second)) = side_pair(parcel) else {
        warn!(parcel = %parcel.id, "setback_side_sum skipped: not enough side edges");
        return;
    };
    let combined = setbacks[first].relaxed().unwrap_or(0.0)
        + setbacks[second].relaxed().unwrap_or(0.0);
    let shortfall = required - combined;
    if shortfall > 0.0 {
        setbacks[second].add(shortfall);
    }
}

fn apply_front_sum_rule(
    parcel: &Parcel,
    resolved: &[ResolvedConstraint],
    setbacks: &mut [EdgeSetback],
) {
    let Some(row) = find_row(resolved, "setback_front_sum") else {
        return;
    };
    let Some(required) = bound_values(&row.min_value).first().copied() else {
        return;
    };
    let front = parcel
        .edges
        .iter()
        .position(|e| e.side == Some(Side::Front));
    let rear = parcel.edges.iter().position(|e| e.side == Some(Side::Rear));
    let (Some(front), Some(rear)) = (front, rear) else {
        warn!(parcel = %parcel.id, "setback_front_sum skipped: missing front or rear edge");
        return;
    };
    let combined =
        setbacks[front].relaxed().unwrap_or(0.0) + setbacks[rear].relaxed().unwrap_or(0.0);
    let shortfall = required - combined;
    if shortfall > 0.0 {
        setbacks[rear].add(shortfall);
    }
}

/// Whether any edge carries a two-valued setback band, in which case the
/// envelope stage produces a relaxed and a strict variant.
pub fn has_band(setbacks: &[EdgeSetback]) -> bool {
    setbacks.iter().any(|sb| sb.values.len() > 1)
}

/// Per-edge distances in the parcel's linear unit using the lenient
/// component of each band.
pub fn relaxed_distances(setbacks: &[EdgeSetback], parcel_unit: &str) -> Vec<Option<f64>> {
    setbacks
        .iter()
        .map(|sb| {
            sb.relaxed()
                .map(|v| to_parcel_units(v, sb.unit.as_deref(), parcel_unit))
        })
        .collect()
}

/// Per-edge distances using the strict component of each band.
pub fn strict_distances(setbacks: &[EdgeSetback], parcel_unit: &str) -> Vec<Option<f64>> {
    setbacks
        .iter()
        .map(|sb| {
            sb.strict()
                .map(|v| to_parcel_units(v, sb.unit.as_deref(), parcel_unit))
        })
        .collect()
}
