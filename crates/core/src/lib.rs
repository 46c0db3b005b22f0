//! zonic-core: the zoning-expression language.
//!
//! Zoning feeds express constraint bounds and applicability conditions as
//! small arithmetic/boolean expression strings over named facts, e.g.
//! `"lot_area * 0.4"` or `"bedrooms >= 2 and total_units <= 3"`. This crate
//! evaluates those strings in a sandbox: a hand-written lexer, a
//! recursive-descent parser into a tagged AST, and a recursive evaluator
//! over an immutable variable scope. There is no access to host-language
//! evaluation, I/O, or any state outside the provided [`Scope`].
//!
//! # Public API
//!
//! - [`parse()`] -- expression string to [`Expr`]
//! - [`eval()`] -- evaluate an [`Expr`] against a [`Scope`]
//! - [`eval_str()`] -- parse and evaluate in one step
//! - [`Value`] -- runtime values (number, text, boolean, null)
//! - [`ExprError`] -- lexing, parsing, and evaluation errors

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{BinOp, Expr, Reduce};
pub use error::ExprError;
pub use eval::{eval, eval_str, Scope};
pub use parser::parse;
pub use value::Value;
