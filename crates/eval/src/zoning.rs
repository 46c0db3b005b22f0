//! The declarative zoning document model.
//!
//! A document maps districts to constraint groups
//! (`structure_constraints`, `lot_constraints`, `other_constraints`);
//! each group maps a constraint-type tag (`height`, `far`,
//! `setback_front`, ...) to a list of constraint definitions scoped by
//! building use. Bound values are polymorphic in the feeds: a bare
//! number, one conditional-rule object, or a list of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use zonic_geom::Pt;

#[derive(Debug, Clone, Deserialize)]
pub struct ZoningDocument {
    pub districts: Vec<District>,
    /// Document-wide definitions (e.g. roof-type-dependent height).
    #[serde(default)]
    pub definitions: Definitions,
}

impl ZoningDocument {
    pub fn from_json(src: &str) -> Result<ZoningDocument, crate::ZoningError> {
        Ok(serde_json::from_str(src)?)
    }
}

pub type ConstraintGroup = BTreeMap<String, Vec<ConstraintDef>>;

#[derive(Debug, Clone, Deserialize)]
pub struct District {
    pub name: String,
    #[serde(default)]
    pub dist_info: DistInfo,
    #[serde(default)]
    pub structure_constraints: ConstraintGroup,
    #[serde(default)]
    pub lot_constraints: ConstraintGroup,
    #[serde(default)]
    pub other_constraints: ConstraintGroup,
    /// District boundary ring, used by the boundary-setback rule and by
    /// centroid-based parcel assignment.
    #[serde(default)]
    pub boundary: Option<Vec<Pt>>,
}

/// The three group names in resolution order.
pub const GROUP_ORDER: [&str; 3] = [
    "structure_constraints",
    "other_constraints",
    "lot_constraints",
];

impl District {
    pub fn group(&self, name: &str) -> Option<&ConstraintGroup> {
        match name {
            "structure_constraints" => Some(&self.structure_constraints),
            "lot_constraints" => Some(&self.lot_constraints),
            "other_constraints" => Some(&self.other_constraints),
            _ => None,
        }
    }

    /// Whether the district defines any constraints at all.
    pub fn has_constraints(&self) -> bool {
        GROUP_ORDER
            .iter()
            .any(|g| self.group(g).is_some_and(|m| !m.is_empty()))
    }

    pub fn uses_permitted(&self) -> &[String] {
        &self.dist_info.uses_permitted.uses_value
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistInfo {
    #[serde(default)]
    pub uses_permitted: UsesPermitted,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsesPermitted {
    #[serde(default)]
    pub uses_value: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub height: Vec<HeightDef>,
}

/// Roof-type-matched effective-height definition.
#[derive(Debug, Clone, Deserialize)]
pub struct HeightDef {
    pub roof_type: String,
    pub expression: String,
}

/// One declarative constraint definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintDef {
    /// Building use-types this definition applies to.
    #[serde(default)]
    pub use_name: Vec<String>,
    #[serde(default)]
    pub min_val: Option<BoundSpec>,
    #[serde(default)]
    pub max_val: Option<BoundSpec>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A bound value as written in the feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BoundSpec {
    Literal(f64),
    Rule(CondRule),
    Rules(Vec<CondRule>),
}

/// One conditional-rule entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CondRule {
    /// Boolean expressions over the fact context; all (AND) or any (OR)
    /// must hold per `logical_operator`.
    #[serde(default, deserialize_with = "one_or_many_strings")]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub logical_operator: Option<String>,
    /// Single result expression, used when the conditions hold.
    #[serde(default)]
    pub expression: Option<RuleExpr>,
    /// Candidate expressions reduced by `select`.
    #[serde(default)]
    pub expressions: Vec<RuleExpr>,
    #[serde(default)]
    pub select: Option<String>,
    #[serde(default)]
    pub select_info: Option<String>,
}

/// Feeds write expressions as strings but bare numbers also occur.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleExpr {
    Num(f64),
    Text(String),
}

impl RuleExpr {
    pub fn as_source(&self) -> String {
        match self {
            RuleExpr::Num(n) => n.to_string(),
            RuleExpr::Text(s) => s.clone(),
        }
    }
}

/// Reduction strategy over candidate bound expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectStrategy {
    Min,
    Max,
    Unique,
    Either,
}

impl SelectStrategy {
    /// Lenient parse; an unrecognized strategy behaves like no strategy
    /// (all candidate values kept unreduced).
    pub fn parse(s: &str) -> Option<SelectStrategy> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" => Some(SelectStrategy::Min),
            "max" => Some(SelectStrategy::Max),
            "unique" => Some(SelectStrategy::Unique),
            "either" => Some(SelectStrategy::Either),
            _ => None,
        }
    }
}

fn one_or_many_strings<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(de)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
