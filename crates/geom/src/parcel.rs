//! Labeled parcel edges and lot metrics.

use tracing::warn;

use crate::primitives::{polygon_area, polyline_length};

/// A 2D point in the parcel's coordinate system.
pub type Pt = (f64, f64);

/// Which part of the lot boundary an edge belongs to.
///
/// Labels come from upstream parcel datasets as free text; [`Side::parse`]
/// accepts the spellings those feeds actually use. Edges with no
/// recognized label carry `None` and are skipped by setback assignment
/// but still participate in the boundary ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Rear,
    InteriorSide,
    ExteriorSide,
}

impl Side {
    pub fn parse(label: &str) -> Option<Side> {
        match label.trim() {
            "front" => Some(Side::Front),
            "rear" => Some(Side::Rear),
            "Interior side" | "interior side" => Some(Side::InteriorSide),
            "Exterior side" | "exterior side" => Some(Side::ExteriorSide),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Rear => "rear",
            Side::InteriorSide => "Interior side",
            Side::ExteriorSide => "Exterior side",
        }
    }
}

/// One boundary segment of a parcel.
#[derive(Debug, Clone)]
pub struct ParcelEdge {
    pub side: Option<Side>,
    pub points: Vec<Pt>,
}

impl ParcelEdge {
    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }
}

/// A land lot: its boundary edges in ring order plus a centroid point.
///
/// `linear_unit` names the unit of the coordinate system ("m" or "ft");
/// lot metrics are reported in that unit and converted by the caller.
#[derive(Debug, Clone)]
pub struct Parcel {
    pub id: String,
    pub edges: Vec<ParcelEdge>,
    pub centroid: Option<Pt>,
    pub linear_unit: String,
}

impl Parcel {
    /// Sum of edge lengths for one side label.
    pub fn side_length(&self, side: Side) -> f64 {
        self.edges
            .iter()
            .filter(|e| e.side == Some(side))
            .map(|e| e.length())
            .sum()
    }

    /// The closed boundary ring formed by the labeled edges, in input
    /// order, with consecutive duplicate vertices removed. Unlabeled
    /// edges are excluded from boundary and area computations. `None`
    /// when fewer than three distinct vertices remain.
    pub fn ring(&self) -> Option<Vec<Pt>> {
        let mut ring: Vec<Pt> = Vec::new();
        for edge in self.edges.iter().filter(|e| e.side.is_some()) {
            for &p in &edge.points {
                if ring.last() != Some(&p) {
                    ring.push(p);
                }
            }
        }
        // drop a closing vertex that repeats the start
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return None;
        }
        Some(ring)
    }

    /// Lot area in squared coordinate units, 0.0 when the boundary does
    /// not close into a polygon.
    pub fn area(&self) -> f64 {
        match self.ring() {
            Some(ring) => polygon_area(&ring),
            None => {
                warn!(parcel = %self.id, "parcel boundary does not polygonize");
                0.0
            }
        }
    }

    /// Axis-aligned bounding box over all edge vertices.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut it = self.edges.iter().flat_map(|e| e.points.iter().copied());
        let first = it.next()?;
        let mut bounds = (first.0, first.1, first.0, first.1);
        for (x, y) in it {
            bounds.0 = bounds.0.min(x);
            bounds.1 = bounds.1.min(y);
            bounds.2 = bounds.2.max(x);
            bounds.3 = bounds.3.max(y);
        }
        Some(bounds)
    }

    /// A copy with every vertex (and the centroid) rotated about `center`.
    pub fn rotated_about(&self, center: Pt, degrees: f64) -> Parcel {
        use crate::primitives::rotate_point;
        Parcel {
            id: self.id.clone(),
            edges: self
                .edges
                .iter()
                .map(|e| ParcelEdge {
                    side: e.side,
                    points: e
                        .points
                        .iter()
                        .map(|&p| rotate_point(p, center, degrees))
                        .collect(),
                })
                .collect(),
            centroid: self.centroid.map(|p| rotate_point(p, center, degrees)),
            linear_unit: self.linear_unit.clone(),
        }
    }
}
