/// All errors produced while lexing, parsing, or evaluating an expression.
///
/// Callers in the constraint resolver collapse every variant into the
/// unresolvable-bound sentinel; the distinctions exist for diagnostics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid number literal '{text}'")]
    InvalidNumber { text: String },

    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },

    /// A null-valued fact reached an arithmetic or ordering operator.
    #[error("null operand in expression")]
    NullOperand,

    #[error("type error: {message}")]
    Type { message: String },

    #[error("division by zero")]
    DivisionByZero,
}
