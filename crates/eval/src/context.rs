//! Fact-context assembly.
//!
//! Builds the flat name-to-value namespace that rule expressions
//! evaluate against: building quantities, parcel lot metrics (converted
//! to feet), and derived ratios. Built fresh per evaluation and never
//! mutated afterwards.

use tracing::warn;

use zonic_core::{Scope, Value};
use zonic_geom::{Parcel, Side};

use crate::building::BuildingRecord;
use crate::units::{linear_to_feet, SQFT_PER_ACRE};

/// An immutable fact namespace for one (building, parcel) pair.
#[derive(Debug, Clone)]
pub struct FactContext {
    scope: Scope,
}

impl FactContext {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scope.get(name)
    }

    /// Numeric fact lookup; `None` for missing or non-numeric facts.
    pub fn num(&self, name: &str) -> Option<f64> {
        match self.scope.get(name) {
            Some(Value::Num(n)) => Some(*n),
            _ => None,
        }
    }
}

/// Assemble the fact context for one building and (optionally) one parcel.
///
/// Missing building fields become null facts (unit counts become 0); a
/// parcel whose boundary has no polygonizable area yields null area
/// metrics and a warning.
pub fn assemble_context(building: &BuildingRecord, parcel: Option<&Parcel>) -> FactContext {
    let mut scope = Scope::new();
    let mut put = |name: &str, v: Value| {
        scope.insert(name.to_string(), v);
    };

    // Lot metrics, converted into feet from the parcel's linear unit.
    let (lot_width, lot_depth, lot_area) = match parcel {
        Some(p) => {
            let factor = linear_to_feet(&p.linear_unit).unwrap_or(1.0);
            let area = p.area();
            let lot_area = if area > 0.0 {
                Some(area * factor * factor)
            } else {
                warn!(parcel = %p.id, "zero polygonizable lot area; lot metrics unavailable");
                None
            };
            (
                Some(p.side_length(Side::Front) * factor),
                Some(p.side_length(Side::InteriorSide) * factor),
                lot_area,
            )
        }
        None => (None, None, None),
    };
    put("lot_width", Value::from(lot_width));
    put("lot_depth", Value::from(lot_depth));
    put("lot_area", Value::from(lot_area));

    // Unit counts by bedroom category; absent counts are zero.
    for bed in 0..=4 {
        put(
            &format!("units_{bed}bed"),
            Value::Num(building.unit_count(bed)),
        );
    }
    let total_units = building
        .total_units
        .unwrap_or_else(|| building.summed_units());
    put("total_units", Value::Num(total_units));
    put("total_bedrooms", Value::from(building.total_bedrooms));

    // Bedroom category range actually present in the building.
    let present: Vec<usize> = (0..=4)
        .filter(|&b| building.unit_count(b) > 0.0)
        .collect();
    let min_beds = present.first().map(|&b| b as f64);
    let max_beds = present.last().map(|&b| b as f64);
    put("bedrooms", Value::from(max_beds));
    put("min_beds", Value::from(min_beds));
    put("max_beds", Value::from(max_beds));

    let fl_area = building.gross_fl_area;
    put("fl_area", Value::from(fl_area));
    put("fl_area_first", Value::from(building.fl_area_first));
    put("fl_area_top", Value::from(building.fl_area_top));
    put("height", Value::from(building.height));
    put("height_eave", Value::from(building.height_eave));
    put("floors", Value::from(building.stories));
    put("stories", Value::from(building.stories));
    put("min_unit_size", Value::from(building.min_unit_size));
    put("max_unit_size", Value::from(building.max_unit_size));
    put("parking", Value::from(building.parking));
    put("parking_enclosed", Value::from(building.parking_enclosed));
    put("parking_covered", Value::from(building.parking_covered));
    put("parking_uncovered", Value::from(building.parking_uncovered));
    put("bldg_width", Value::from(building.width));
    put("bldg_depth", Value::from(building.depth));

    // Derived ratios; null when the denominator is unavailable.
    let far = match (fl_area, lot_area) {
        (Some(fa), Some(la)) if la != 0.0 => Some(fa / la),
        _ => None,
    };
    put("far", Value::from(far));

    let footprint = building.fl_area_first.or_else(|| match (fl_area, building.stories) {
        (Some(fa), Some(st)) if st > 0.0 => Some(fa / st),
        _ => None,
    });
    let lot_coverage = match (footprint, lot_area) {
        (Some(fp), Some(la)) if la != 0.0 => Some(fp / la * 100.0),
        _ => None,
    };
    put("lot_coverage", Value::from(lot_coverage));

    let unit_density = lot_area
        .filter(|&la| la > 0.0)
        .map(|la| total_units / (la / SQFT_PER_ACRE));
    put("unit_density", Value::from(unit_density));

    FactContext { scope }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonic_geom::ParcelEdge;

    fn parcel_m(width: f64, depth: f64) -> Parcel {
        Parcel {
            id: "p1".into(),
            edges: vec![
                ParcelEdge {
                    side: Some(Side::Front),
                    points: vec![(0.0, 0.0), (width, 0.0)],
                },
                ParcelEdge {
                    side: Some(Side::InteriorSide),
                    points: vec![(width, 0.0), (width, depth)],
                },
                ParcelEdge {
                    side: Some(Side::Rear),
                    points: vec![(width, depth), (0.0, depth)],
                },
                ParcelEdge {
                    side: Some(Side::InteriorSide),
                    points: vec![(0.0, depth), (0.0, 0.0)],
                },
            ],
            centroid: Some((width / 2.0, depth / 2.0)),
            linear_unit: "m".into(),
        }
    }

    fn triplex() -> BuildingRecord {
        BuildingRecord {
            gross_fl_area: Some(3000.0),
            stories: Some(2.0),
            fl_area_first: Some(1800.0),
            height: Some(25.0),
            units_1bed: Some(1.0),
            units_2bed: Some(2.0),
            ..BuildingRecord::default()
        }
    }

    #[test]
    fn lot_metrics_converted_to_feet() {
        let ctx = assemble_context(&triplex(), Some(&parcel_m(20.0, 50.0)));
        let lot_width = ctx.num("lot_width").unwrap();
        let lot_area = ctx.num("lot_area").unwrap();
        assert!((lot_width - 20.0 * 3.28084).abs() < 1e-6);
        assert!((lot_area - 1000.0 * 10.76391).abs() < 0.1);
    }

    #[test]
    fn unit_counts_and_bedroom_range() {
        let ctx = assemble_context(&triplex(), None);
        assert_eq!(ctx.num("units_2bed"), Some(2.0));
        assert_eq!(ctx.num("units_0bed"), Some(0.0));
        assert_eq!(ctx.num("total_units"), Some(3.0));
        assert_eq!(ctx.num("min_beds"), Some(1.0));
        assert_eq!(ctx.num("max_beds"), Some(2.0));
        assert_eq!(ctx.num("bedrooms"), Some(2.0));
    }

    #[test]
    fn far_requires_lot_area() {
        let no_parcel = assemble_context(&triplex(), None);
        assert_eq!(no_parcel.get("far"), Some(&Value::Null));

        let with_parcel = assemble_context(&triplex(), Some(&parcel_m(20.0, 50.0)));
        let far = with_parcel.num("far").unwrap();
        let lot_area = with_parcel.num("lot_area").unwrap();
        assert!((far - 3000.0 / lot_area).abs() < 1e-9);
    }

    #[test]
    fn degenerate_parcel_nulls_area_metrics() {
        let line_parcel = Parcel {
            id: "line".into(),
            edges: vec![ParcelEdge {
                side: Some(Side::Front),
                points: vec![(0.0, 0.0), (10.0, 0.0)],
            }],
            centroid: None,
            linear_unit: "m".into(),
        };
        let ctx = assemble_context(&triplex(), Some(&line_parcel));
        assert_eq!(ctx.get("lot_area"), Some(&Value::Null));
        assert_eq!(ctx.get("far"), Some(&Value::Null));
        assert_eq!(ctx.get("unit_density"), Some(&Value::Null));
        // width is still a sum over labeled edges
        assert!(ctx.num("lot_width").is_some());
    }

    #[test]
    fn missing_building_fields_are_null_not_absent() {
        let ctx = assemble_context(&BuildingRecord::default(), None);
        assert_eq!(ctx.get("height"), Some(&Value::Null));
        assert_eq!(ctx.num("total_units"), Some(0.0));
        assert_eq!(ctx.get("bedrooms"), Some(&Value::Null));
    }

    #[test]
    fn derived_lot_coverage_prefers_first_floor() {
        let ctx = assemble_context(&triplex(), Some(&parcel_m(20.0, 50.0)));
        let lot_area = ctx.num("lot_area").unwrap();
        let cov = ctx.num("lot_coverage").unwrap();
        assert!((cov - 1800.0 / lot_area * 100.0).abs() < 1e-9);
    }
}
