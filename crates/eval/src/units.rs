//! Stateless unit conversion.
//!
//! Zoning constraints and parcel geometries mix feet and meters; the
//! conversions are a fixed table keyed by unit name, with no shared
//! registry instance.

/// Conversion factor from a named linear unit to feet.
pub fn linear_to_feet(unit: &str) -> Option<f64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "ft" | "feet" | "foot" => Some(1.0),
        "m" | "meter" | "meters" | "metre" | "metres" => Some(3.28084),
        "yd" | "yard" | "yards" => Some(3.0),
        "in" | "inch" | "inches" => Some(1.0 / 12.0),
        _ => None,
    }
}

/// Conversion factor from a named area unit to square feet.
pub fn area_to_sqft(unit: &str) -> Option<f64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "sqft" | "ft2" | "square feet" => Some(1.0),
        "sqm" | "m2" | "square meters" => Some(10.7639),
        "acre" | "acres" => Some(43560.0),
        _ => None,
    }
}

/// Square feet per acre, used by unit-density calculations.
pub const SQFT_PER_ACRE: f64 = 43560.0;

/// Convert a setback distance expressed in `unit` into the parcel's
/// linear unit. An unknown or missing unit leaves the value unchanged
/// (the feeds omit the unit when it already matches the geometry).
pub fn to_parcel_units(value: f64, unit: Option<&str>, parcel_unit: &str) -> f64 {
    let (Some(unit), Some(parcel_factor)) = (unit, linear_to_feet(parcel_unit)) else {
        return value;
    };
    match linear_to_feet(unit) {
        Some(factor) => value * factor / parcel_factor,
        None => value,
    }
}
