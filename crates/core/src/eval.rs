//! Recursive evaluator over an immutable variable scope.

use std::collections::BTreeMap;

use crate::ast::{BinOp, Expr, Reduce};
use crate::error::ExprError;
use crate::parser::parse;
use crate::value::Value;

/// The expression evaluation namespace: fact name to value.
///
/// Scopes are built once per evaluation and never mutated by the evaluator.
pub type Scope = BTreeMap<String, Value>;

/// Parse and evaluate in one step.
pub fn eval_str(src: &str, scope: &Scope) -> Result<Value, ExprError> {
    let expr = parse(src)?;
    eval(&expr, scope)
}

/// Evaluate an expression against a scope.
///
/// `And`/`Or` short-circuit. Comparisons between numbers use numeric
/// ordering; equality compares loosely across variants. A `Null` fact
/// reaching arithmetic or ordering fails with [`ExprError::NullOperand`].
pub fn eval(expr: &Expr, scope: &Scope) -> Result<Value, ExprError> {
    match expr {
        Expr::Num(n) => Ok(Value::Num(*n)),
        Expr::Str(s) => Ok(Value::Text(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),

        Expr::Var(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::UnknownVariable { name: name.clone() }),

        Expr::Neg(inner) => {
            let n = eval(inner, scope)?.as_num()?;
            Ok(Value::Num(-n))
        }

        Expr::Not(inner) => {
            let b = eval(inner, scope)?.as_bool()?;
            Ok(Value::Bool(!b))
        }

        Expr::Binary { op, left, right } => match op {
            BinOp::And => {
                let l = eval(left, scope)?.as_bool()?;
                if !l {
                    return Ok(Value::Bool(false));
                }
                let r = eval(right, scope)?.as_bool()?;
                Ok(Value::Bool(r))
            }
            BinOp::Or => {
                let l = eval(left, scope)?.as_bool()?;
                if l {
                    return Ok(Value::Bool(true));
                }
                let r = eval(right, scope)?.as_bool()?;
                Ok(Value::Bool(r))
            }
            BinOp::Eq => {
                let l = eval(left, scope)?;
                let r = eval(right, scope)?;
                Ok(Value::Bool(l.loose_eq(&r)))
            }
            BinOp::Neq => {
                let l = eval(left, scope)?;
                let r = eval(right, scope)?;
                Ok(Value::Bool(!l.loose_eq(&r)))
            }
            BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => {
                let l = eval(left, scope)?.as_num()?;
                let r = eval(right, scope)?.as_num()?;
                let b = match op {
                    BinOp::Lt => l < r,
                    BinOp::Lte => l <= r,
                    BinOp::Gt => l > r,
                    BinOp::Gte => l >= r,
                    _ => unreachable!(),
                };
                Ok(Value::Bool(b))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                let l = eval(left, scope)?.as_num()?;
                let r = eval(right, scope)?.as_num()?;
                let n = match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => {
                        if r == 0.0 {
                            return Err(ExprError::DivisionByZero);
                        }
                        l / r
                    }
                    _ => unreachable!(),
                };
                Ok(Value::Num(n))
            }
        },

        Expr::Call { reduce, args } => {
            let mut nums = Vec::with_capacity(args.len());
            for arg in args {
                nums.push(eval(arg, scope)?.as_num()?);
            }
            let folded = match reduce {
                Reduce::Min => nums.iter().cloned().fold(f64::INFINITY, f64::min),
                Reduce::Max => nums.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            };
            Ok(Value::Num(folded))
        }
    }
}
