//! Constraint resolution.
//!
//! Walks a district's constraint groups, filters definitions by the
//! building's use-type, and evaluates each definition's bounds into a
//! normalized constraint table. A district with no groups (or none that
//! match the use-type) resolves to an empty table, which callers must
//! treat as "no requirements", never as an error.

use serde::Serialize;

use crate::building::{find_bldg_type, BuildingRecord};
use crate::context::{assemble_context, FactContext};
use crate::interpret::{evaluate_bound, Bound, SelectTag};
use crate::zoning::{District, SelectStrategy, GROUP_ORDER};

use zonic_geom::Parcel;

/// One row of the resolved-constraint table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConstraint {
    /// Which group the definition came from.
    pub constraint_group: String,
    /// Constraint-type tag: `height`, `far`, `setback_front`, ...
    pub spec_type: String,
    pub min_value: Bound,
    pub max_value: Bound,
    pub unit: Option<String>,
    pub constraint_min_note: Option<String>,
    pub constraint_max_note: Option<String>,
    pub min_select: Option<SelectTag>,
    pub max_select: Option<SelectTag>,
}

impl Serialize for Bound {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Bound::Scalar(v) => serializer.serialize_f64(*v),
            Bound::Range(vs) => vs.serialize(serializer),
            Bound::Unresolvable => serializer.serialize_str("unresolvable"),
            Bound::Missing => serializer.serialize_none(),
        }
    }
}

impl Serialize for SelectTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let s = match self {
            SelectTag::Strategy(SelectStrategy::Min) => "min",
            SelectTag::Strategy(SelectStrategy::Max) => "max",
            SelectTag::Strategy(SelectStrategy::Unique) => "unique",
            SelectTag::Strategy(SelectStrategy::Either) => "either",
            SelectTag::Unresolvable => "unresolvable",
        };
        serializer.serialize_str(s)
    }
}

/// Resolve one district's constraints for a building and optional parcel.
pub fn resolve_constraints(
    building: &BuildingRecord,
    district: &District,
    parcel: Option<&Parcel>,
) -> Vec<ResolvedConstraint> {
    let ctx = assemble_context(building, parcel);
    let bldg_type = find_bldg_type(building);
    resolve_in_context(&ctx, &bldg_type, district)
}

/// Resolution against an already-assembled context, for callers that
/// reuse the context across the downstream checks.
pub fn resolve_in_context(
    ctx: &FactContext,
    bldg_type: &str,
    district: &District,
) -> Vec<ResolvedConstraint> {
    let mut rows = Vec::new();

    for group_name in GROUP_ORDER {
        let Some(group) = district.group(group_name) else {
            continue;
        };
        for (spec_type, defs) in group {
            for def in defs {
                if !def.use_name.iter().any(|u| u == bldg_type) {
                    continue;
                }
                let min = evaluate_bound(def.min_val.as_ref(), ctx.scope());
                let max = evaluate_bound(def.max_val.as_ref(), ctx.scope());
                // rows with no bound on either side carry no requirement
                if min.value.is_missing() && max.value.is_missing() {
                    continue;
                }
                rows.push(ResolvedConstraint {
                    constraint_group: group_name.to_string(),
                    spec_type: spec_type.clone(),
                    min_value: normalize(min.value),
                    max_value: normalize(max.value),
                    unit: def.unit.clone(),
                    constraint_min_note: min.note,
                    constraint_max_note: max.note,
                    min_select: min.select,
                    max_select: max.select,
                });
            }
        }
    }
    rows
}

/// Squeeze multi-valued bounds to their `[min, max]` envelope and round
/// resolved values to four decimal places.
fn normalize(bound: Bound) -> Bound {
    match bound {
        Bound::Scalar(v) => Bound::Scalar(round4(v)),
        Bound::Range(vs) if vs.is_empty() => Bound::Unresolvable,
        Bound::Range(vs) => {
            let lo = vs.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = vs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            if lo == hi {
                Bound::Scalar(round4(lo))
            } else {
                Bound::Range(vec![round4(lo), round4(hi)])
            }
        }
        other => other,
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn district(v: serde_json::Value) -> District {
        serde_json::from_value(v).unwrap()
    }

    fn duplex() -> BuildingRecord {
        BuildingRecord {
            use_type: Some("2_unit".into()),
            height: Some(35.0),
            gross_fl_area: Some(2400.0),
            stories: Some(2.0),
            units_2bed: Some(2.0),
            ..BuildingRecord::default()
        }
    }

    #[test]
    fn skips_definitions_for_other_uses() {
        let d = district(json!({
            "name": "R-2",
            "structure_constraints": {
                "height": [
                    {"use_name": ["1_unit"], "max_val": 30.0},
                    {"use_name": ["2_unit", "3_unit"], "max_val": 38.0}
                ]
            }
        }));
        let rows = resolve_constraints(&duplex(), &d, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spec_type, "height");
        assert_eq!(rows[0].max_value, Bound::Scalar(38.0));
        assert_eq!(rows[0].min_value, Bound::Missing);
    }

    #[test]
    fn empty_district_resolves_to_empty_table() {
        let d = district(json!({"name": "U"}));
        assert!(resolve_constraints(&duplex(), &d, None).is_empty());
    }

    #[test]
    fn range_bounds_squeeze_to_envelope() {
        let d = district(json!({
            "name": "R-2",
            "structure_constraints": {
                "height": [{
                    "use_name": ["2_unit"],
                    "max_val": [{"expressions": ["40", "38", "39"], "select": "unique"}]
                }]
            }
        }));
        let rows = resolve_constraints(&duplex(), &d, None);
        assert_eq!(rows[0].max_value, Bound::Range(vec![38.0, 40.0]));
    }

    #[test]
    fn expression_bounds_use_building_facts() {
        let d = district(json!({
            "name": "R-2",
            "lot_constraints": {
                "lot_size": [{
                    "use_name": ["2_unit"],
                    "min_val": [{"expression": "total_units * 2000"}],
                    "unit": "sqft"
                }]
            }
        }));
        let rows = resolve_constraints(&duplex(), &d, None);
        assert_eq!(rows[0].constraint_group, "lot_constraints");
        assert_eq!(rows[0].min_value, Bound::Scalar(4000.0));
    }

    #[test]
    fn resolution_is_pure() {
        let d = district(json!({
            "name": "R-2",
            "structure_constraints": {
                "height": [{"use_name": ["2_unit"], "max_val": [{"expressions": ["38", "40"], "select": "unique"}]}],
                "far": [{"use_name": ["2_unit"], "max_val": 0.6}]
            }
        }));
        let b = duplex();
        let first = resolve_constraints(&b, &d, None);
        let second = resolve_constraints(&b, &d, None);
        assert_eq!(first, second);
    }

    #[test]
    fn unresolvable_bound_is_tagged() {
        let d = district(json!({
            "name": "R-2",
            "structure_constraints": {
                "height": [{
                    "use_name": ["2_unit"],
                    "max_val": [{"conditions": ["no_such_fact > 0"], "expression": 30}]
                }]
            }
        }));
        let rows = resolve_constraints(&duplex(), &d, None);
        assert_eq!(rows[0].max_value, Bound::Unresolvable);
        assert_eq!(rows[0].max_select, Some(SelectTag::Unresolvable));
    }
}
