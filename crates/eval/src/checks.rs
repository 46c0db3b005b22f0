//! The generic tri-state range check and its per-attribute instances.
//!
//! Every attribute compliance check (height, stories, floor area, FAR,
//! lot coverage, unit density, bedrooms, unit size, unit quantity) is
//! the same algorithm: normalize the resolved min/max bounds to value
//! lists, compare the building value against both extremes of each list
//! under the side's selection strategy, and combine the two sides.
//! Land-use permissibility is a plain membership gate run first.

use tracing::debug;

use crate::context::FactContext;
use crate::interpret::{Bound, SelectTag};
use crate::resolve::ResolvedConstraint;
use crate::verdict::Verdict;
use crate::zoning::{District, SelectStrategy};

/// Stand-in bound when a side is absent or unresolved: effectively
/// unbounded below / above.
const MIN_DEFAULT: f64 = 0.0;
const MAX_DEFAULT: f64 = 1_000_000.0;

/// One attribute check: which constraint row it reads and which facts
/// supply the values compared against the min and max sides. Most
/// attributes compare one value against both sides; bedrooms and unit
/// size compare their low extreme against the min bound and their high
/// extreme against the max bound.
pub struct AttributeCheck {
    pub spec_type: &'static str,
    pub min_fact: &'static str,
    pub max_fact: &'static str,
}

pub const ATTRIBUTE_CHECKS: &[AttributeCheck] = &[
    AttributeCheck { spec_type: "height", min_fact: "height", max_fact: "height" },
    AttributeCheck { spec_type: "height_eave", min_fact: "height_eave", max_fact: "height_eave" },
    AttributeCheck { spec_type: "stories", min_fact: "stories", max_fact: "stories" },
    AttributeCheck { spec_type: "fl_area", min_fact: "fl_area", max_fact: "fl_area" },
    AttributeCheck { spec_type: "far", min_fact: "far", max_fact: "far" },
    AttributeCheck { spec_type: "lot_coverage", min_fact: "lot_coverage", max_fact: "lot_coverage" },
    AttributeCheck { spec_type: "unit_density", min_fact: "unit_density", max_fact: "unit_density" },
    AttributeCheck { spec_type: "bedrooms", min_fact: "min_beds", max_fact: "max_beds" },
    AttributeCheck { spec_type: "unit_size", min_fact: "min_unit_size", max_fact: "max_unit_size" },
    AttributeCheck { spec_type: "unit_qty", min_fact: "total_units", max_fact: "total_units" },
];

/// Whether the building's use-type is permitted in the district at all.
/// The "other" classification never passes, and neither does a district
/// with no permitted-uses list.
pub fn check_land_use(bldg_type: &str, district: &District) -> bool {
    if bldg_type == "other" {
        return false;
    }
    district.uses_permitted().iter().any(|u| u == bldg_type)
}

/// The generic tri-state range check for one constraint row.
///
/// `min_value`/`max_value` are the building-side values compared against
/// the row's min and max bounds (usually the same number).
pub fn range_check(rc: &ResolvedConstraint, min_value: f64, max_value: f64) -> Verdict {
    // A side that failed to resolve makes the requirement unknowable;
    // the check deliberately fails open.
    if rc.min_select == Some(SelectTag::Unresolvable)
        || rc.max_select == Some(SelectTag::Unresolvable)
    {
        return Verdict::Allowed;
    }

    let min_bounds = bound_list(&rc.min_value, MIN_DEFAULT);
    let max_bounds = bound_list(&rc.max_value, MAX_DEFAULT);

    let min_side = side_verdict(
        list_min(&min_bounds) <= min_value,
        list_max(&min_bounds) <= min_value,
        rc.min_select,
    );
    let max_side = side_verdict(
        list_min(&max_bounds) >= max_value,
        list_max(&max_bounds) >= max_value,
        rc.max_select,
    );
    min_side.combine(max_side)
}

/// Run every applicable attribute check against a resolved table.
///
/// Returns the per-attribute verdicts with their constraint notes;
/// attributes the table does not constrain are Allowed by default, and
/// attributes the building has no value for are skipped.
pub fn check_attributes(
    ctx: &FactContext,
    resolved: &[ResolvedConstraint],
) -> Vec<AttributeVerdict> {
    let mut out = Vec::new();
    for check in ATTRIBUTE_CHECKS {
        let Some(rc) = resolved.iter().find(|r| r.spec_type == check.spec_type) else {
            continue;
        };
        let (Some(min_value), Some(max_value)) =
            (ctx.num(check.min_fact), ctx.num(check.max_fact))
        else {
            debug!(
                spec_type = check.spec_type,
                "building value unavailable; check skipped"
            );
            continue;
        };
        out.push(AttributeVerdict {
            spec_type: check.spec_type,
            verdict: range_check(rc, min_value, max_value),
            constraint_min_note: rc.constraint_min_note.clone(),
            constraint_max_note: rc.constraint_max_note.clone(),
        });
    }
    out
}

/// Verdict for one attribute against one district.
#[derive(Debug, Clone)]
pub struct AttributeVerdict {
    pub spec_type: &'static str,
    pub verdict: Verdict,
    pub constraint_min_note: Option<String>,
    pub constraint_max_note: Option<String>,
}

fn side_verdict(check_low: bool, check_high: bool, select: Option<SelectTag>) -> Verdict {
    match select {
        Some(SelectTag::Strategy(SelectStrategy::Unique)) => {
            if check_low && check_high {
                Verdict::Allowed
            } else if !check_low && !check_high {
                Verdict::Denied
            } else {
                Verdict::Uncertain
            }
        }
        // either, explicit min/max (already reduced to one value), or no
        // strategy: satisfying any bound satisfies the side
        _ => Verdict::from(check_low || check_high),
    }
}

/// Normalize a bound to a non-empty value list, filtering out anything
/// non-finite and falling back to the side default.
fn bound_list(bound: &Bound, default: f64) -> Vec<f64> {
    let values: Vec<f64> = bound
        .values()
        .map(|vs| vs.iter().cloned().filter(|v| v.is_finite()).collect())
        .unwrap_or_default();
    if values.is_empty() {
        vec![default]
    } else {
        values
    }
}

fn list_min(vs: &[f64]) -> f64 {
    vs.iter().cloned().fold(f64::INFINITY, f64::min)
}

fn list_max(vs: &[f64]) -> f64 {
    vs.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(min: Bound, max: Bound) -> ResolvedConstraint {
        ResolvedConstraint {
            constraint_group: "structure_constraints".into(),
            spec_type: "height".into(),
            min_value: min,
            max_value: max,
            unit: Some("ft".into()),
            constraint_min_note: None,
            constraint_max_note: None,
            min_select: None,
            max_select: None,
        }
    }

    #[test]
    fn scalar_bounds_plain_pass_fail() {
        let rc = row(Bound::Scalar(10.0), Bound::Scalar(38.0));
        assert_eq!(range_check(&rc, 35.0, 35.0), Verdict::Allowed);
        assert_eq!(range_check(&rc, 40.0, 40.0), Verdict::Denied);
        assert_eq!(range_check(&rc, 5.0, 5.0), Verdict::Denied);
    }

    #[test]
    fn either_select_passes_when_any_bound_satisfies() {
        // height 35 against max candidates [38, 40]
        let mut rc = row(Bound::Scalar(0.0), Bound::Range(vec![38.0, 40.0]));
        rc.max_select = Some(SelectTag::Strategy(SelectStrategy::Either));
        assert_eq!(range_check(&rc, 35.0, 35.0), Verdict::Allowed);
        // 39 satisfies only the higher candidate, either still passes
        assert_eq!(range_check(&rc, 39.0, 39.0), Verdict::Allowed);
        assert_eq!(range_check(&rc, 41.0, 41.0), Verdict::Denied);
    }

    #[test]
    fn unique_select_tri_state() {
        let mut rc = row(Bound::Scalar(0.0), Bound::Range(vec![38.0, 40.0]));
        rc.max_select = Some(SelectTag::Strategy(SelectStrategy::Unique));
        assert_eq!(range_check(&rc, 35.0, 35.0), Verdict::Allowed);
        assert_eq!(range_check(&rc, 39.0, 39.0), Verdict::Uncertain);
        assert_eq!(range_check(&rc, 41.0, 41.0), Verdict::Denied);
    }

    #[test]
    fn unique_select_on_min_side() {
        let mut rc = row(Bound::Range(vec![500.0, 700.0]), Bound::Missing);
        rc.min_select = Some(SelectTag::Strategy(SelectStrategy::Unique));
        assert_eq!(range_check(&rc, 800.0, 800.0), Verdict::Allowed);
        assert_eq!(range_check(&rc, 600.0, 600.0), Verdict::Uncertain);
        assert_eq!(range_check(&rc, 400.0, 400.0), Verdict::Denied);
    }

    #[test]
    fn unresolvable_select_fails_open() {
        let mut rc = row(Bound::Unresolvable, Bound::Scalar(38.0));
        rc.min_select = Some(SelectTag::Unresolvable);
        // even a value over the max is allowed when a side is unresolvable
        assert_eq!(range_check(&rc, 100.0, 100.0), Verdict::Allowed);
    }

    #[test]
    fn missing_bounds_default_open() {
        let rc = row(Bound::Missing, Bound::Missing);
        assert_eq!(range_check(&rc, 123.0, 123.0), Verdict::Allowed);
    }

    #[test]
    fn uncertain_dominates_allowed_across_sides() {
        let mut rc = row(Bound::Range(vec![10.0, 20.0]), Bound::Scalar(100.0));
        rc.min_select = Some(SelectTag::Strategy(SelectStrategy::Unique));
        assert_eq!(range_check(&rc, 15.0, 15.0), Verdict::Uncertain);
    }

    #[test]
    fn land_use_gate() {
        let district: District = serde_json::from_value(serde_json::json!({
            "name": "R-2",
            "dist_info": {"uses_permitted": {"uses_value": ["1_unit", "2_unit"]}}
        }))
        .unwrap();
        assert!(check_land_use("2_unit", &district));
        assert!(!check_land_use("4_plus", &district));
        assert!(!check_land_use("other", &district));

        let empty: District =
            serde_json::from_value(serde_json::json!({"name": "X"})).unwrap();
        assert!(!check_land_use("1_unit", &empty));
    }
}
