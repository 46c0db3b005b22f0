//! Building records and the raw-document unifier.
//!
//! A building arrives either as a flat record of named fields or as a
//! sectioned document (`bldg_info` / `unit_info` / `level_info`) that
//! [`unify_building`] folds into the flat form.

use serde::Deserialize;
use tracing::debug;

use zonic_core::{eval_str, Scope, Value};

use crate::error::ZoningError;
use crate::zoning::Definitions;

/// Flat building summary consumed by the context assembler.
///
/// Every numeric field is optional; absent fields degrade to zero or
/// null facts rather than failing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildingRecord {
    /// Explicit use-type tag ("1_unit", "4_plus", ...); inferred from
    /// unit counts when absent.
    #[serde(rename = "type")]
    pub use_type: Option<String>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub height: Option<f64>,
    pub height_eave: Option<f64>,
    pub height_deck: Option<f64>,
    pub height_top: Option<f64>,
    pub roof_type: Option<String>,
    pub stories: Option<f64>,
    pub gross_fl_area: Option<f64>,
    pub fl_area_first: Option<f64>,
    pub fl_area_top: Option<f64>,
    pub total_units: Option<f64>,
    pub total_bedrooms: Option<f64>,
    pub units_0bed: Option<f64>,
    pub units_1bed: Option<f64>,
    pub units_2bed: Option<f64>,
    pub units_3bed: Option<f64>,
    pub units_4bed: Option<f64>,
    pub min_unit_size: Option<f64>,
    pub max_unit_size: Option<f64>,
    pub parking: Option<f64>,
    pub parking_enclosed: Option<f64>,
    pub parking_covered: Option<f64>,
    pub parking_uncovered: Option<f64>,
}

impl BuildingRecord {
    pub fn from_json(src: &str) -> Result<BuildingRecord, ZoningError> {
        let value: serde_json::Value = serde_json::from_str(src)?;
        if value.get("bldg_info").is_some() {
            unify_building(&value, None)
        } else {
            Ok(serde_json::from_value(value)?)
        }
    }

    /// Unit count for a bedroom category, defaulting to zero.
    pub fn unit_count(&self, bedrooms: usize) -> f64 {
        let field = match bedrooms {
            0 => self.units_0bed,
            1 => self.units_1bed,
            2 => self.units_2bed,
            3 => self.units_3bed,
            _ => self.units_4bed,
        };
        field.unwrap_or(0.0)
    }

    pub fn summed_units(&self) -> f64 {
        (0..=4).map(|b| self.unit_count(b)).sum()
    }
}

/// Determine the building's use-type tag.
///
/// An explicit `type` field wins; otherwise classify by summed unit
/// counts: 1/2/3 units map to "{n}_unit", more to "4_plus", anything
/// else to "other" (which no district ever permits).
pub fn find_bldg_type(building: &BuildingRecord) -> String {
    if let Some(t) = &building.use_type {
        return t.clone();
    }
    let total = building.total_units.unwrap_or_else(|| building.summed_units());
    match total {
        t if t == 1.0 || t == 2.0 || t == 3.0 => format!("{}_unit", t as u32),
        t if t > 3.0 => "4_plus".to_string(),
        _ => "other".to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct SectionedBuilding {
    bldg_info: BldgInfo,
    unit_info: Vec<UnitInfo>,
    level_info: Vec<LevelInfo>,
}

#[derive(Debug, Deserialize)]
struct BldgInfo {
    height_top: Option<f64>,
    width: Option<f64>,
    depth: Option<f64>,
    roof_type: Option<String>,
    parking: Option<f64>,
    height_eave: Option<f64>,
    height_deck: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct UnitInfo {
    fl_area: Option<f64>,
    bedrooms: Option<f64>,
    qty: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LevelInfo {
    level: Option<f64>,
    gross_fl_area: Option<f64>,
}

/// Fold a sectioned building document into a flat [`BuildingRecord`].
///
/// When zoning `definitions` are supplied, the effective `height` comes
/// from the first definition whose roof type matches, evaluated over the
/// top/eave/deck heights; otherwise (and on evaluation failure) it
/// defaults to the top height.
pub fn unify_building(
    doc: &serde_json::Value,
    definitions: Option<&Definitions>,
) -> Result<BuildingRecord, ZoningError> {
    let sectioned: SectionedBuilding = serde_json::from_value(doc.clone())
        .map_err(|e| ZoningError::building(format!("expected bldg_info/unit_info/level_info sections: {e}")))?;

    let info = &sectioned.bldg_info;
    let height_top = info.height_top;
    let height_eave = info.height_eave.or(height_top);
    let height_deck = info.height_deck.or(height_top);
    let roof_type = info.roof_type.clone().unwrap_or_else(|| "flat".to_string());

    let gross_fl_area: f64 = sectioned
        .level_info
        .iter()
        .filter_map(|l| l.gross_fl_area)
        .sum();
    let mut stories: Option<f64> = None;
    let mut first_level: Option<(f64, Option<f64>)> = None;
    let mut top_level: Option<(f64, Option<f64>)> = None;
    for l in &sectioned.level_info {
        let Some(level) = l.level else { continue };
        stories = Some(stories.map_or(level, |s| s.max(level)));
        if first_level.map_or(true, |(f, _)| level < f) {
            first_level = Some((level, l.gross_fl_area));
        }
        if top_level.map_or(true, |(t, _)| level > t) {
            top_level = Some((level, l.gross_fl_area));
        }
    }

    let total_units: f64 = sectioned.unit_info.iter().filter_map(|u| u.qty).sum();
    let total_bedrooms: f64 = sectioned
        .unit_info
        .iter()
        .map(|u| u.bedrooms.unwrap_or(0.0) * u.qty.unwrap_or(0.0))
        .sum();
    let count_units = |pred: &dyn Fn(f64) -> bool| -> f64 {
        sectioned
            .unit_info
            .iter()
            .filter(|u| u.bedrooms.map(pred).unwrap_or(false))
            .filter_map(|u| u.qty)
            .sum()
    };
    let sizes: Vec<f64> = sectioned.unit_info.iter().filter_map(|u| u.fl_area).collect();
    let min_unit_size = sizes.iter().cloned().reduce(f64::min);
    let max_unit_size = sizes.iter().cloned().reduce(f64::max);

    let use_type = if total_units > 3.0 {
        "4_plus".to_string()
    } else {
        format!("{}_unit", total_units as u32)
    };

    let height = effective_height(definitions, &roof_type, height_top, height_eave, height_deck);

    Ok(BuildingRecord {
        use_type: Some(use_type),
        width: info.width,
        depth: info.depth,
        height,
        height_eave,
        height_deck,
        height_top,
        roof_type: Some(roof_type),
        stories,
        gross_fl_area: Some(gross_fl_area),
        fl_area_first: first_level.and_then(|(_, area)| area),
        fl_area_top: top_level.and_then(|(_, area)| area),
        total_units: Some(total_units),
        total_bedrooms: Some(total_bedrooms),
        units_0bed: Some(count_units(&|b| b == 0.0)),
        units_1bed: Some(count_units(&|b| b == 1.0)),
        units_2bed: Some(count_units(&|b| b == 2.0)),
        units_3bed: Some(count_units(&|b| b == 3.0)),
        units_4bed: Some(count_units(&|b| b > 3.0)),
        min_unit_size,
        max_unit_size,
        parking: info.parking.or(Some(0.0)),
        ..BuildingRecord::default()
    })
}

fn effective_height(
    definitions: Option<&Definitions>,
    roof_type: &str,
    height_top: Option<f64>,
    height_eave: Option<f64>,
    height_deck: Option<f64>,
) -> Option<f64> {
    let defs = match definitions {
        Some(d) if !d.height.is_empty() => &d.height,
        _ => return height_top,
    };
    let mut scope = Scope::new();
    scope.insert("height_top".into(), Value::from(height_top));
    scope.insert("height_eave".into(), Value::from(height_eave));
    scope.insert("height_deck".into(), Value::from(height_deck));

    for def in defs {
        if def.roof_type == roof_type {
            return match eval_str(&def.expression, &scope) {
                Ok(Value::Num(n)) => Some(n),
                Ok(_) | Err(_) => {
                    debug!(roof_type, expression = %def.expression, "height definition did not evaluate; using top height");
                    height_top
                }
            };
        }
    }
    height_top
}
