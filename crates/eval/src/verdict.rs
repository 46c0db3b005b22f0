//! Tri-state compliance verdicts.

use serde::{Serialize, Serializer};

/// The outcome of a compliance check.
///
/// `Uncertain` arises when a constraint carries several candidate bounds
/// under a `unique` selection and the value satisfies some but not all of
/// them; a human has to read the ordinance to know which bound governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied,
    Uncertain,
}

impl Verdict {
    /// Dominance combination: Denied > Uncertain > Allowed.
    pub fn combine(self, other: Verdict) -> Verdict {
        use Verdict::*;
        match (self, other) {
            (Denied, _) | (_, Denied) => Denied,
            (Uncertain, _) | (_, Uncertain) => Uncertain,
            (Allowed, Allowed) => Allowed,
        }
    }

    /// Fold many verdicts under dominance; an empty iterator is Allowed
    /// (no requirements means allowed by default).
    pub fn all(verdicts: impl IntoIterator<Item = Verdict>) -> Verdict {
        verdicts
            .into_iter()
            .fold(Verdict::Allowed, Verdict::combine)
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

impl From<bool> for Verdict {
    fn from(b: bool) -> Self {
        if b {
            Verdict::Allowed
        } else {
            Verdict::Denied
        }
    }
}

/// Output tables carry verdicts as `true` / `false` / `"MAYBE"`.
impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Verdict::Allowed => serializer.serialize_bool(true),
            Verdict::Denied => serializer.serialize_bool(false),
            Verdict::Uncertain => serializer.serialize_str("MAYBE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominance_ordering() {
        assert_eq!(Verdict::Denied.combine(Verdict::Allowed), Verdict::Denied);
        assert_eq!(Verdict::Denied.combine(Verdict::Uncertain), Verdict::Denied);
        assert_eq!(
            Verdict::Uncertain.combine(Verdict::Allowed),
            Verdict::Uncertain
        );
        assert_eq!(Verdict::Allowed.combine(Verdict::Allowed), Verdict::Allowed);
    }

    #[test]
    fn fold_empty_is_allowed() {
        assert_eq!(Verdict::all([]), Verdict::Allowed);
    }

    #[test]
    fn fold_mixed() {
        assert_eq!(
            Verdict::all([Verdict::Allowed, Verdict::Uncertain, Verdict::Allowed]),
            Verdict::Uncertain
        );
        assert_eq!(
            Verdict::all([Verdict::Uncertain, Verdict::Denied]),
            Verdict::Denied
        );
    }

    #[test]
    fn serializes_as_tri_state_json() {
        assert_eq!(serde_json::to_string(&Verdict::Allowed).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Verdict::Denied).unwrap(), "false");
        assert_eq!(
            serde_json::to_string(&Verdict::Uncertain).unwrap(),
            "\"MAYBE\""
        );
    }
}
