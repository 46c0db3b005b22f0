//! Conditional-rule interpretation.
//!
//! Turns one declarative bound spec (a literal, one rule object, or a
//! rule list) into a concrete [`Bound`] against a fact context. Every
//! rule whose conditions hold contributes a result, not just the first;
//! candidate `expressions` lists are reduced by their `select` strategy.
//! Any expression failure poisons the whole side into
//! [`Bound::Unresolvable`], which the range checker later fails open.

use zonic_core::{eval_str, ExprError, Scope, Value};

use crate::zoning::{BoundSpec, CondRule, RuleExpr, SelectStrategy};

/// A resolved bound value.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Scalar(f64),
    /// Several candidate values survived resolution.
    Range(Vec<f64>),
    /// Evaluation failed; checks against this side fail open.
    Unresolvable,
    /// The spec carried no bound on this side.
    Missing,
}

impl Bound {
    pub fn is_missing(&self) -> bool {
        matches!(self, Bound::Missing)
    }

    /// Numeric candidates, if any resolved.
    pub fn values(&self) -> Option<&[f64]> {
        match self {
            Bound::Scalar(v) => Some(std::slice::from_ref(v)),
            Bound::Range(vs) => Some(vs),
            _ => None,
        }
    }
}

/// Selection tag carried alongside a resolved bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectTag {
    Strategy(SelectStrategy),
    /// Evaluation failed on this side.
    Unresolvable,
}

/// Outcome of evaluating one bound spec.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundOutcome {
    pub value: Bound,
    pub note: Option<String>,
    pub select: Option<SelectTag>,
}

impl BoundOutcome {
    fn missing() -> Self {
        BoundOutcome {
            value: Bound::Missing,
            note: None,
            select: None,
        }
    }

    fn unresolvable() -> Self {
        BoundOutcome {
            value: Bound::Unresolvable,
            note: None,
            select: Some(SelectTag::Unresolvable),
        }
    }
}

const DEFAULT_NOTE: &str = "unique requirements not specified";

/// Evaluate a bound spec against the fact scope.
pub fn evaluate_bound(spec: Option<&BoundSpec>, scope: &Scope) -> BoundOutcome {
    match spec {
        None => BoundOutcome::missing(),
        Some(BoundSpec::Literal(n)) => BoundOutcome {
            value: Bound::Scalar(*n),
            note: None,
            select: None,
        },
        Some(BoundSpec::Rule(rule)) => {
            // A lone rule whose expression is the NA marker means the
            // bound is deliberately absent for this district.
            if let Some(RuleExpr::Text(s)) = &rule.expression {
                if s.trim().eq_ignore_ascii_case("na") {
                    return BoundOutcome::missing();
                }
            }
            evaluate_rules(std::slice::from_ref(rule), scope)
        }
        Some(BoundSpec::Rules(rules)) => evaluate_rules(rules, scope),
    }
}

/// One accumulated result: a plain value or a multi-valued reduction.
enum Accumulated {
    One(f64),
    Many(Vec<f64>),
}

fn evaluate_rules(rules: &[CondRule], scope: &Scope) -> BoundOutcome {
    let mut results: Vec<Accumulated> = Vec::new();
    let mut note: Option<String> = None;
    let mut select: Option<SelectTag> = None;

    for rule in rules {
        let strategy = rule.select.as_deref().and_then(SelectStrategy::parse);
        if rule.select.is_some() {
            select = strategy.map(SelectTag::Strategy);
        }

        let conditions_met = match conditions_hold(rule, scope) {
            Ok(met) => met,
            Err(_) => return BoundOutcome::unresolvable(),
        };

        if conditions_met {
            if let Some(expr) = &rule.expression {
                match eval_numeric(expr, scope) {
                    Ok(v) => results.push(Accumulated::One(v)),
                    Err(_) => return BoundOutcome::unresolvable(),
                }
            }
        }

        // Candidate lists run regardless of the conditions outcome.
        if !rule.expressions.is_empty() {
            let mut candidates = Vec::with_capacity(rule.expressions.len());
            for expr in &rule.expressions {
                match eval_numeric(expr, scope) {
                    Ok(v) => candidates.push(v),
                    Err(_) => return BoundOutcome::unresolvable(),
                }
            }
            match strategy {
                Some(SelectStrategy::Max) => {
                    let m = candidates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    results.push(Accumulated::One(m));
                }
                Some(SelectStrategy::Min) => {
                    let m = candidates.iter().cloned().fold(f64::INFINITY, f64::min);
                    results.push(Accumulated::One(m));
                }
                Some(SelectStrategy::Unique) | Some(SelectStrategy::Either) => {
                    results.push(Accumulated::Many(dedup(candidates)));
                }
                None => {
                    results.extend(candidates.into_iter().map(Accumulated::One));
                }
            }
            if let Some(info) = &rule.select_info {
                note = Some(info.clone());
            } else if note.is_none() {
                note = Some(DEFAULT_NOTE.to_string());
            }
        }
    }

    let value = match flatten(results) {
        Flat::Empty => Bound::Unresolvable,
        Flat::One(v) => Bound::Scalar(v),
        Flat::Many(vs) => Bound::Range(vs),
    };
    BoundOutcome {
        value,
        note,
        select,
    }
}

fn conditions_hold(rule: &CondRule, scope: &Scope) -> Result<bool, ExprError> {
    if rule.conditions.is_empty() {
        return Ok(true);
    }
    let use_or = rule
        .logical_operator
        .as_deref()
        .is_some_and(|op| op.eq_ignore_ascii_case("or"));
    // any unrecognized operator folds with AND
    let mut met = !use_or;
    for cond in &rule.conditions {
        let holds = match eval_str(cond, scope)? {
            Value::Bool(b) => b,
            other => {
                return Err(ExprError::Type {
                    message: format!("condition produced {}", other.type_name()),
                })
            }
        };
        if use_or {
            met = met || holds;
        } else {
            met = met && holds;
        }
    }
    Ok(met)
}

fn eval_numeric(expr: &RuleExpr, scope: &Scope) -> Result<f64, ExprError> {
    match expr {
        RuleExpr::Num(n) => Ok(*n),
        RuleExpr::Text(src) => match eval_str(src, scope)? {
            Value::Num(n) => Ok(n),
            other => Err(ExprError::Type {
                message: format!("bound expression produced {}", other.type_name()),
            }),
        },
    }
}

fn dedup(values: Vec<f64>) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

enum Flat {
    Empty,
    One(f64),
    Many(Vec<f64>),
}

fn flatten(results: Vec<Accumulated>) -> Flat {
    let mut flat: Vec<f64> = Vec::new();
    for r in results {
        match r {
            Accumulated::One(v) => flat.push(v),
            Accumulated::Many(vs) => flat.extend(vs),
        }
    }
    match flat.len() {
        0 => Flat::Empty,
        1 => Flat::One(flat[0]),
        _ => Flat::Many(flat),
    }
}
