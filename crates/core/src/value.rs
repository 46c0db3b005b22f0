//! Runtime values for expression evaluation.

use crate::error::ExprError;

/// A runtime value in the expression language.
///
/// `Null` models a fact that is known to be absent (e.g. a building with no
/// recorded parking count). It participates in equality but poisons
/// arithmetic and ordering, so a rule touching missing data fails closed
/// into the caller's unresolvable sentinel rather than producing a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl Value {
    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Num(_) => "number",
            Value::Text(_) => "text",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
        }
    }

    /// Extracts a number, or fails with a type error (`NullOperand` for null).
    pub fn as_num(&self) -> Result<f64, ExprError> {
        match self {
            Value::Num(n) => Ok(*n),
            Value::Null => Err(ExprError::NullOperand),
            other => Err(ExprError::Type {
                message: format!("expected number, got {}", other.type_name()),
            }),
        }
    }

    /// Extracts a boolean, or fails with a type error.
    pub fn as_bool(&self) -> Result<bool, ExprError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Null => Err(ExprError::NullOperand),
            other => Err(ExprError::Type {
                message: format!("expected boolean, got {}", other.type_name()),
            }),
        }
    }

    /// Loose equality across variants: same-variant values compare by
    /// content, mismatched variants are unequal, and null equals only null.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self {
        match n {
            Some(n) => Value::Num(n),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_poisons_arithmetic_access() {
        assert_eq!(Value::Null.as_num(), Err(ExprError::NullOperand));
    }

    #[test]
    fn loose_eq_across_variants() {
        assert!(Value::Num(2.0).loose_eq(&Value::Num(2.0)));
        assert!(!Value::Num(2.0).loose_eq(&Value::Text("2".into())));
        assert!(Value::Null.loose_eq(&Value::Null));
        assert!(!Value::Null.loose_eq(&Value::Num(0.0)));
    }
}
