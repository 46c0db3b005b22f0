//! zonic-geom: parcel geometry for zoning evaluation.
//!
//! A parcel is a chain of boundary edges labeled by side (front, rear,
//! interior side, exterior side) plus a centroid point. This crate derives
//! lot metrics from the labeled edges, materializes the buildable envelope
//! left over after per-edge setbacks, and tests whether a rectangular
//! building footprint fits inside that envelope under rotation.
//!
//! The envelope is held as a 1-unit raster mask rather than an exact
//! polygon: a cell is buildable when its center lies inside the closed
//! parcel ring and at least the setback distance away from every guarded
//! edge. The raster is also what the sliding-window fit test consumes.

pub mod envelope;
pub mod footprint;
pub mod parcel;
pub mod primitives;

pub use envelope::{buildable_envelope, RasterEnvelope};
pub use footprint::{rect_fit, rot_fit};
pub use parcel::{Parcel, ParcelEdge, Pt, Side};
