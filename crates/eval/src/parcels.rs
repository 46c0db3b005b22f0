//! Parcel dataset reader.
//!
//! Parcels arrive as a GeoJSON-shaped feature collection: one LineString
//! feature per boundary edge carrying `parcel_id` and `side` properties,
//! plus one Point feature per parcel with side `centroid`. Features are
//! grouped by parcel id in first-seen order.

use serde::Deserialize;
use tracing::warn;

use zonic_geom::{Parcel, ParcelEdge, Pt, Side};

use crate::error::ZoningError;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Properties {
    parcel_id: String,
    #[serde(default)]
    side: Option<String>,
    #[serde(default)]
    unit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Vec<Pt> },
    Point { coordinates: Pt },
}

/// Parse a parcel feature collection into parcels.
pub fn parcels_from_json(src: &str) -> Result<Vec<Parcel>, ZoningError> {
    let collection: FeatureCollection = serde_json::from_str(src)?;

    let mut parcels: Vec<Parcel> = Vec::new();
    for feature in collection.features {
        let id = feature.properties.parcel_id;
        let idx = match parcels.iter().position(|p| p.id == id) {
            Some(i) => i,
            None => {
                parcels.push(Parcel {
                    id: id.clone(),
                    edges: Vec::new(),
                    centroid: None,
                    linear_unit: feature
                        .properties
                        .unit
                        .clone()
                        .unwrap_or_else(|| "m".to_string()),
                });
                parcels.len() - 1
            }
        };
        let side_label = feature.properties.side.as_deref();

        match feature.geometry {
            Geometry::Point { coordinates } => {
                if side_label == Some("centroid") {
                    parcels[idx].centroid = Some(coordinates);
                } else {
                    warn!(parcel = %parcels[idx].id, "point feature without centroid side ignored");
                }
            }
            Geometry::LineString { coordinates } => {
                if coordinates.len() < 2 {
                    return Err(ZoningError::parcel(format!(
                        "parcel {}: edge with fewer than two coordinates",
                        parcels[idx].id
                    )));
                }
                parcels[idx].edges.push(ParcelEdge {
                    side: side_label.and_then(Side::parse),
                    points: coordinates,
                });
            }
        }
    }
    Ok(parcels)
}
