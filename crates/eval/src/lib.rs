//! zonic-eval: zoning constraint resolution and compliance checking.
//!
//! The pipeline per (building, district, parcel) triple:
//!
//! 1. [`building`] folds a raw building document into a flat record and
//!    classifies its use-type.
//! 2. [`context`] assembles the fact namespace the expression language
//!    evaluates against (building facts, lot metrics, derived ratios).
//! 3. [`interpret`] turns one declarative bound spec (literal, rule, or
//!    rule list) into a concrete [`interpret::Bound`].
//! 4. [`resolve`] walks a district's constraint groups and produces the
//!    resolved-constraint table for the applicable use-type.
//! 5. [`checks`] compares building values against resolved bounds under
//!    the tri-state verdict algebra in [`verdict`].
//! 6. [`setbacks`] maps resolved setback bounds onto parcel edges for the
//!    geometry stage in `zonic-geom`.
//!
//! Evaluation failures inside rule expressions never surface as Rust
//! errors; they collapse to [`interpret::Bound::Unresolvable`] and the
//! checks fail open. [`ZoningError`] is reserved for structural problems
//! in input documents.

pub mod building;
pub mod checks;
pub mod context;
pub mod error;
pub mod interpret;
pub mod parcels;
pub mod resolve;
pub mod setbacks;
pub mod units;
pub mod verdict;
pub mod zoning;

pub use building::{find_bldg_type, BuildingRecord};
pub use context::assemble_context;
pub use error::ZoningError;
pub use interpret::{Bound, SelectTag};
pub use resolve::{resolve_constraints, ResolvedConstraint};
pub use verdict::Verdict;
pub use zoning::{District, ZoningDocument};
