//! Result-table rendering.

use zonic_eval::interpret::Bound;
use zonic_eval::resolve::ResolvedConstraint;
use zonic_eval::verdict::Verdict;

use crate::driver::ComplianceRow;
use crate::OutputFormat;

pub fn print_resolved(district: &str, rows: &[ResolvedConstraint], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let doc = serde_json::json!({ "district": district, "constraints": rows });
            println!("{}", serde_json::to_string_pretty(&doc).unwrap());
        }
        OutputFormat::Text => {
            println!("district {district}: {} applicable constraints", rows.len());
            for row in rows {
                println!(
                    "  {:<24} min {:<16} max {:<16} {}",
                    row.spec_type,
                    bound_text(&row.min_value),
                    bound_text(&row.max_value),
                    row.unit.as_deref().unwrap_or("")
                );
                if let Some(note) = &row.constraint_min_note {
                    println!("      min note: {note}");
                }
                if let Some(note) = &row.constraint_max_note {
                    println!("      max note: {note}");
                }
            }
        }
    }
}

pub fn print_compliance(rows: &[ComplianceRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows).unwrap());
        }
        OutputFormat::Text => {
            for row in rows {
                let mut line = format!(
                    "{:<12} {:<10} {}",
                    row.parcel_id,
                    row.district,
                    verdict_text(row.allowed)
                );
                if !row.reasons.is_empty() {
                    line.push_str(&format!("  [{}]", row.reasons.join(", ")));
                }
                if let Some(area) = row.buildable_area {
                    line.push_str(&format!("  buildable {area:.0}"));
                }
                if let Some(strict) = row.buildable_area_strict {
                    line.push_str(&format!(" (strict {strict:.0})"));
                }
                if let Some(fits) = row.fits {
                    line.push_str(if fits { "  fits" } else { "  does not fit" });
                }
                println!("{line}");
            }
        }
    }
}

fn verdict_text(v: Verdict) -> &'static str {
    match v {
        Verdict::Allowed => "allowed",
        Verdict::Denied => "denied",
        Verdict::Uncertain => "MAYBE",
    }
}

fn bound_text(bound: &Bound) -> String {
    match bound {
        Bound::Scalar(v) => format!("{v}"),
        Bound::Range(vs) => format!(
            "[{}]",
            vs.iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Bound::Unresolvable => "unresolvable".to_string(),
        Bound::Missing => "-".to_string(),
    }
}
