//! Condition mini-language for rule and requirement applicability
//!
//! Grammar: the literal `always`, or comparisons over the analysis context
//! (`process == 'Company Incorporation'`, `entity_type != "Branch"`), joined
//! by `and` / `or`. No parentheses; `and` binds tighter than `or`. Values
//! compare exactly, quoted with either quote style.
//!
//! Unparseable expressions do not abort analysis. Callers pick the safe
//! default for their position: an applicability gate stays open, a trigger
//! condition stays unmet.

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub process: &'a str,
    pub entity_type: &'a str,
}

lazy_static! {
    static ref COMPARISON: Regex = Regex::new(
        r#"^\s*(process|entity_type)\s*(==|!=)\s*(?:'([^']*)'|"([^"]*)")\s*$"#
    )
    .unwrap();
}

/// Evaluates an expression against the context. `None` means the expression
/// is not in the supported grammar.
pub fn evaluate(expr: &str, ctx: &ConditionContext) -> Option<bool> {
    let expr = expr.trim();
    if expr.is_empty() || expr.eq_ignore_ascii_case("always") {
        return Some(true);
    }
    let mut any_clause = false;
    for clause in expr.split(" or ") {
        let mut all_atoms = true;
        for atom in clause.split(" and ") {
            all_atoms &= evaluate_comparison(atom, ctx)?;
        }
        any_clause |= all_atoms;
    }
    Some(any_clause)
}

fn evaluate_comparison(atom: &str, ctx: &ConditionContext) -> Option<bool> {
    let captures = COMPARISON.captures(atom)?;
    let field = match &captures[1] {
        "process" => ctx.process,
        _ => ctx.entity_type,
    };
    let value = captures
        .get(3)
        .or_else(|| captures.get(4))
        .map(|m| m.as_str())?;
    match &captures[2] {
        "==" => Some(field == value),
        _ => Some(field != value),
    }
}

/// Applicability gate: malformed expressions keep the rule applicable.
pub fn applies(expr: &str, ctx: &ConditionContext) -> bool {
    evaluate(expr, ctx).unwrap_or_else(|| {
        tracing::warn!(
            "Unsupported applies_if expression '{}', treating as always applicable",
            expr
        );
        true
    })
}

/// Trigger gate: an empty list always triggers; otherwise any condition must
/// hold, and malformed conditions count as unmet.
pub fn triggers(conditions: &[String], ctx: &ConditionContext) -> bool {
    if conditions.is_empty() {
        return true;
    }
    conditions.iter().any(|condition| {
        evaluate(condition, ctx).unwrap_or_else(|| {
            tracing::warn!(
                "Unsupported trigger_if condition '{}', treating as unmet",
                condition
            );
            false
        })
    })
}
