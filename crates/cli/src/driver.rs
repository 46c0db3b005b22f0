//! Batch evaluation driver.
//!
//! Pairs each parcel with its governing district, fans the independent
//! per-parcel evaluations out over a rayon worker pool, and reassembles
//! the results in input order by a stable row id. A failure on one
//! parcel degrades that row; it never aborts the batch.

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use zonic_eval::building::{find_bldg_type, BuildingRecord};
use zonic_eval::checks::{check_attributes, check_land_use};
use zonic_eval::context::assemble_context;
use zonic_eval::resolve::{resolve_in_context, ResolvedConstraint};
use zonic_eval::setbacks::{
    assign_setbacks, has_band, relaxed_distances, strict_distances,
};
use zonic_eval::verdict::Verdict;
use zonic_eval::zoning::{District, ZoningDocument};
use zonic_geom::{buildable_envelope, rot_fit, Parcel};
use zonic_geom::primitives::point_in_polygon;

#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Run the envelope/footprint stage on parcels that survive the
    /// compliance checks.
    pub footprint: bool,
    /// Rotation increment for the footprint search, degrees.
    pub rotation_step: f64,
    /// Buffer distance for the district-boundary setback rule, in
    /// parcel linear units.
    pub boundary_buffer: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            footprint: false,
            rotation_step: 15.0,
            boundary_buffer: 5.0,
        }
    }
}

/// One output row of the compliance table.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceRow {
    #[serde(skip)]
    pub row_id: usize,
    pub parcel_id: String,
    pub district: String,
    pub allowed: Verdict,
    /// Constraint types that denied or were uncertain.
    pub reasons: Vec<String>,
    pub constraint_min_note: Option<String>,
    pub constraint_max_note: Option<String>,
    /// Relaxed buildable-envelope area, when the footprint stage ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buildable_area: Option<f64>,
    /// Strict-envelope area, present only for two-valued setbacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buildable_area_strict: Option<f64>,
    /// Whether the building footprint fits the buildable envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fits: Option<bool>,
}

/// Assign each parcel the first district whose boundary contains its
/// centroid. A single boundary-less district governs everything; parcels
/// matching nothing are skipped with a warning.
pub fn pair_parcels<'a>(
    parcels: &'a [Parcel],
    zoning: &'a ZoningDocument,
) -> Vec<(&'a Parcel, &'a District)> {
    let mut pairs = Vec::with_capacity(parcels.len());
    for parcel in parcels {
        let district = parcel.centroid.and_then(|(cx, cy)| {
            zoning.districts.iter().find(|d| {
                d.boundary
                    .as_deref()
                    .is_some_and(|ring| point_in_polygon(cx, cy, ring))
            })
        });
        let district = district.or_else(|| match zoning.districts.as_slice() {
            [only] if only.boundary.is_none() => Some(only),
            _ => None,
        });
        match district {
            Some(d) => pairs.push((parcel, d)),
            None => warn!(parcel = %parcel.id, "no district contains parcel centroid; skipped"),
        }
    }
    pairs
}

/// Evaluate one building against every parcel/district pair.
///
/// Output rows come back in input order regardless of the unordered
/// parallel execution.
pub fn run_batch(
    building: &BuildingRecord,
    zoning: &ZoningDocument,
    parcels: &[Parcel],
    cfg: DriverConfig,
) -> Vec<ComplianceRow> {
    let pairs = pair_parcels(parcels, zoning);
    let mut rows: Vec<ComplianceRow> = pairs
        .into_par_iter()
        .enumerate()
        .map(|(row_id, (parcel, district))| evaluate_row(row_id, building, district, parcel, cfg))
        .collect();
    rows.sort_by_key(|r| r.row_id);
    rows
}

fn evaluate_row(
    row_id: usize,
    building: &BuildingRecord,
    district: &District,
    parcel: &Parcel,
    cfg: DriverConfig,
) -> ComplianceRow {
    let bldg_type = find_bldg_type(building);
    let mut row = ComplianceRow {
        row_id,
        parcel_id: parcel.id.clone(),
        district: district.name.clone(),
        allowed: Verdict::Allowed,
        reasons: Vec::new(),
        constraint_min_note: None,
        constraint_max_note: None,
        buildable_area: None,
        buildable_area_strict: None,
        fits: None,
    };

    // Land use is a precondition gate: a use the district does not
    // permit fails before any range check runs.
    if !check_land_use(&bldg_type, district) {
        row.allowed = Verdict::Denied;
        row.reasons.push("land_use".to_string());
        return row;
    }

    let ctx = assemble_context(building, Some(parcel));
    let resolved = resolve_in_context(&ctx, &bldg_type, district);

    for attr in check_attributes(&ctx, &resolved) {
        if attr.verdict != Verdict::Allowed {
            row.reasons.push(attr.spec_type.to_string());
            if row.constraint_min_note.is_none() {
                row.constraint_min_note = attr.constraint_min_note;
            }
            if row.constraint_max_note.is_none() {
                row.constraint_max_note = attr.constraint_max_note;
            }
        }
        row.allowed = row.allowed.combine(attr.verdict);
    }

    if cfg.footprint && row.allowed != Verdict::Denied {
        apply_footprint_stage(&mut row, building, district, parcel, &resolved, cfg);
    }
    row
}

fn apply_footprint_stage(
    row: &mut ComplianceRow,
    building: &BuildingRecord,
    district: &District,
    parcel: &Parcel,
    resolved: &[ResolvedConstraint],
    cfg: DriverConfig,
) {
    let setbacks = assign_setbacks(
        parcel,
        resolved,
        district.boundary.as_deref(),
        cfg.boundary_buffer,
    );
    let relaxed = relaxed_distances(&setbacks, &parcel.linear_unit);
    let Some(envelope) = buildable_envelope(parcel, &relaxed) else {
        return;
    };
    row.buildable_area = Some(envelope.area());

    if has_band(&setbacks) {
        let strict = strict_distances(&setbacks, &parcel.linear_unit);
        row.buildable_area_strict =
            buildable_envelope(parcel, &strict).map(|env| env.area());
    }

    if let (Some(width), Some(depth)) = (building.width, building.depth) {
        row.fits = Some(rot_fit(parcel, &relaxed, width, depth, cfg.rotation_step));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zoning() -> ZoningDocument {
        serde_json::from_value(json!({
            "districts": [{
                "name": "R-2",
                "dist_info": {"uses_permitted": {"uses_value": ["1_unit", "2_unit"]}},
                "structure_constraints": {
                    "height": [{"use_name": ["2_unit"], "max_val": 38.0}],
                    "setback_front": [{"use_name": ["2_unit"], "min_val": 5.0, "unit": "m"}],
                    "setback_rear": [{"use_name": ["2_unit"], "min_val": 5.0, "unit": "m"}]
                }
            }]
        }))
        .unwrap()
    }

    fn parcel(id: &str) -> Parcel {
        use zonic_geom::{ParcelEdge, Side};
        Parcel {
            id: id.into(),
            edges: vec![
                ParcelEdge {
                    side: Some(Side::Front),
                    points: vec![(0.0, 0.0), (40.0, 0.0)],
                },
                ParcelEdge {
                    side: Some(Side::InteriorSide),
                    points: vec![(40.0, 0.0), (40.0, 50.0)],
                },
                ParcelEdge {
                    side: Some(Side::Rear),
                    points: vec![(40.0, 50.0), (0.0, 50.0)],
                },
                ParcelEdge {
                    side: Some(Side::InteriorSide),
                    points: vec![(0.0, 50.0), (0.0, 0.0)],
                },
            ],
            centroid: Some((20.0, 25.0)),
            linear_unit: "m".into(),
        }
    }

    fn duplex() -> BuildingRecord {
        serde_json::from_value(json!({
            "type": "2_unit",
            "height": 30.0,
            "width": 12.0,
            "depth": 15.0,
            "units_2bed": 2.0
        }))
        .unwrap()
    }

    #[test]
    fn batch_preserves_input_order() {
        let parcels: Vec<Parcel> = (0..8).map(|i| parcel(&format!("p{i}"))).collect();
        let rows = run_batch(&duplex(), &zoning(), &parcels, DriverConfig::default());
        let ids: Vec<&str> = rows.iter().map(|r| r.parcel_id.as_str()).collect();
        assert_eq!(ids, ["p0", "p1", "p2", "p3", "p4", "p5", "p6", "p7"]);
    }

    #[test]
    fn land_use_gate_denies_unpermitted_type() {
        let mut b = duplex();
        b.use_type = Some("4_plus".into());
        let rows = run_batch(&b, &zoning(), &[parcel("p0")], DriverConfig::default());
        assert_eq!(rows[0].allowed, Verdict::Denied);
        assert_eq!(rows[0].reasons, ["land_use"]);
    }

    #[test]
    fn over_height_building_is_denied_with_reason() {
        let mut b = duplex();
        b.height = Some(45.0);
        let rows = run_batch(&b, &zoning(), &[parcel("p0")], DriverConfig::default());
        assert_eq!(rows[0].allowed, Verdict::Denied);
        assert_eq!(rows[0].reasons, ["height"]);
    }

    #[test]
    fn footprint_stage_reports_envelope_and_fit() {
        let cfg = DriverConfig {
            footprint: true,
            ..DriverConfig::default()
        };
        let rows = run_batch(&duplex(), &zoning(), &[parcel("p0")], cfg);
        let row = &rows[0];
        assert_eq!(row.allowed, Verdict::Allowed);
        // 40x50 lot with 5 m front/rear setbacks: 40x40 remains
        assert_eq!(row.buildable_area, Some(1600.0));
        assert_eq!(row.fits, Some(true));
    }

    #[test]
    fn footprint_skipped_for_denied_rows() {
        let mut b = duplex();
        b.height = Some(45.0);
        let cfg = DriverConfig {
            footprint: true,
            ..DriverConfig::default()
        };
        let rows = run_batch(&b, &zoning(), &[parcel("p0")], cfg);
        assert_eq!(rows[0].buildable_area, None);
        assert_eq!(rows[0].fits, None);
    }

    #[test]
    fn centroid_assignment_with_boundaries() {
        let zoning: ZoningDocument = serde_json::from_value(json!({
            "districts": [
                {
                    "name": "R-1",
                    "dist_info": {"uses_permitted": {"uses_value": ["2_unit"]}},
                    "boundary": [[-10.0, -10.0], [100.0, -10.0], [100.0, 100.0], [-10.0, 100.0]]
                },
                {
                    "name": "R-9",
                    "dist_info": {"uses_permitted": {"uses_value": ["2_unit"]}},
                    "boundary": [[1000.0, 1000.0], [2000.0, 1000.0], [2000.0, 2000.0], [1000.0, 2000.0]]
                }
            ]
        }))
        .unwrap();
        let parcels = vec![parcel("inside")];
        let pairs = pair_parcels(&parcels, &zoning);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1.name, "R-1");
    }
}
