//! The match-spec interpreter.
//!
//! A single depth-first, left-to-right walk. The only mutable state is the
//! [`EvalContext`] passed down by `&mut`.

use crate::context::EvalContext;
use crate::matchspec::{Action, MatchSpec, MatchValue};
use crate::model::{Block, Modules, Value};
use regex::Regex;
use std::cmp::Ordering;

/// Evaluates match specs against blocks of one scanned module set.
#[derive(Clone, Copy, Debug)]
pub struct Evaluator<'m> {
    modules: &'m Modules,
}

impl<'m> Evaluator<'m> {
    pub fn new(modules: &'m Modules) -> Self {
        Self { modules }
    }

    /// `true` means "no violation": either the spec holds or a precondition made it inapplicable.
    pub fn evaluate(&self, spec: &MatchSpec, target: &Block, ctx: &mut EvalContext) -> bool {
        if !self.preconditions_hold(spec, target, ctx) {
            tracing::trace!(
                action = %spec.action,
                block = %target.full_name(),
                "precondition failed; node is inapplicable"
            );
            return true;
        }

        match spec.action {
            // Every operand runs even once the result is known: earlier operands may bind
            // variables that later operands read.
            Action::And => spec
                .predicates
                .iter()
                .fold(true, |acc, p| self.evaluate(p, target, ctx) & acc),
            Action::Or => spec
                .predicates
                .iter()
                .fold(false, |acc, p| self.evaluate(p, target, ctx) | acc),
            Action::Not => spec
                .predicates
                .first()
                .is_some_and(|p| !self.evaluate(p, target, ctx)),
            Action::RequiresPresence => self.requires_presence(spec, ctx),
            Action::InModule => target.in_module(),
            Action::OfType => self.of_type(spec, target, ctx),
            Action::IsPresent | Action::NotPresent | Action::IsEmpty => {
                self.presence(spec, target, ctx)
            }
            Action::Equals
            | Action::NotEquals
            | Action::StartsWith
            | Action::EndsWith
            | Action::Contains
            | Action::NotContains
            | Action::RegexMatches
            | Action::IsAny
            | Action::IsNone
            | Action::GreaterThan
            | Action::GreaterThanOrEqual
            | Action::LessThan
            | Action::LessThanOrEqual => self.comparison(spec, target, ctx),
        }
    }

    fn preconditions_hold(&self, spec: &MatchSpec, target: &Block, ctx: &mut EvalContext) -> bool {
        spec.pre_conditions
            .iter()
            .fold(true, |acc, pre| self.evaluate(pre, target, ctx) & acc)
    }

    fn presence(&self, spec: &MatchSpec, target: &Block, ctx: &mut EvalContext) -> bool {
        let attribute = target.attribute(&spec.name);
        let children = target.blocks_at(&spec.name);

        let holds = match spec.action {
            Action::IsPresent => attribute.is_some() || !children.is_empty(),
            Action::NotPresent => attribute.is_none() && children.is_empty(),
            Action::IsEmpty => match attribute {
                Some(value) => value.is_empty(),
                None => children.iter().all(|c| c.is_empty()),
            },
            _ => false,
        };
        if !holds {
            return false;
        }

        if let (Some(var), Some(value)) = (&spec.assign_variable, attribute) {
            ctx.bind(var.as_str(), value.render());
        }

        let Some(sub) = spec.sub_match.as_deref() else {
            return true;
        };
        if children.is_empty() {
            return self.evaluate(sub, target, ctx);
        }
        children
            .into_iter()
            .fold(true, |acc, child| self.evaluate(sub, child, ctx) & acc)
    }

    fn comparison(&self, spec: &MatchSpec, target: &Block, ctx: &mut EvalContext) -> bool {
        let Some(actual) = target.attribute(&spec.name) else {
            return spec.ignore_undefined;
        };
        let Some(expected) = spec.value.as_ref() else {
            return false;
        };
        let expected = ctx.substitute(expected);

        let matched = match spec.action {
            Action::Equals => values_equal(actual, &expected),
            Action::NotEquals => !values_equal(actual, &expected),
            Action::StartsWith => {
                text_pair(actual, &expected).is_some_and(|(a, e)| a.starts_with(&e))
            }
            Action::EndsWith => {
                text_pair(actual, &expected).is_some_and(|(a, e)| a.ends_with(&e))
            }
            Action::Contains => contains(actual, &expected),
            Action::NotContains => !contains(actual, &expected),
            Action::RegexMatches => regex_matches(actual, &expected),
            Action::IsAny => is_any(actual, &expected),
            Action::IsNone => !is_any(actual, &expected),
            Action::GreaterThan => numeric_cmp(actual, &expected).is_some_and(Ordering::is_gt),
            Action::GreaterThanOrEqual => {
                numeric_cmp(actual, &expected).is_some_and(Ordering::is_ge)
            }
            Action::LessThan => numeric_cmp(actual, &expected).is_some_and(Ordering::is_lt),
            Action::LessThanOrEqual => {
                numeric_cmp(actual, &expected).is_some_and(Ordering::is_le)
            }
            _ => false,
        };

        if matched && let Some(var) = &spec.assign_variable {
            ctx.bind(var.as_str(), actual.render());
        }
        matched
    }

    fn requires_presence(&self, spec: &MatchSpec, ctx: &mut EvalContext) -> bool {
        // First block in scan order; no relational link to the origin block is checked.
        let Some(found) = self.modules.blocks_of_type(&spec.name).next() else {
            tracing::debug!(block_type = %spec.name, "requiresPresence: no block of type found");
            return false;
        };
        match spec.sub_match.as_deref() {
            Some(sub) => self.evaluate(sub, found, ctx),
            None => true,
        }
    }

    fn of_type(&self, spec: &MatchSpec, target: &Block, ctx: &mut EvalContext) -> bool {
        let (Some(type_label), Some(expected)) = (target.type_label(), spec.value.as_ref()) else {
            return false;
        };
        match &*ctx.substitute(expected) {
            MatchValue::Text(t) => t == type_label,
            MatchValue::List(items) => items.iter().any(|i| i.as_text() == Some(type_label)),
            _ => false,
        }
    }
}

fn values_equal(actual: &Value, expected: &MatchValue) -> bool {
    match (actual, expected) {
        (Value::String(a), MatchValue::Text(e)) => a == e,
        (Value::Bool(a), MatchValue::Bool(e)) => a == e,
        (Value::Number(a), MatchValue::Number(e)) => a == e,
        (Value::String(a), MatchValue::Bool(e)) => *a == e.to_string(),
        (Value::String(_), MatchValue::Number(e)) => actual.as_f64() == Some(*e),
        (Value::Bool(a), MatchValue::Text(e)) => a.to_string() == *e,
        (Value::Number(a), MatchValue::Text(e)) => e.trim().parse::<f64>().ok() == Some(*a),
        (Value::List(items), MatchValue::List(expected)) => {
            items.len() == expected.len()
                && items.iter().zip(expected).all(|(a, e)| values_equal(a, e))
        }
        _ => false,
    }
}

fn text_pair(actual: &Value, expected: &MatchValue) -> Option<(String, String)> {
    Some((actual.scalar_text()?, expected.to_text()?))
}

/// Substring for strings, membership for lists, key presence for maps.
fn contains(actual: &Value, expected: &MatchValue) -> bool {
    match actual {
        Value::List(items) => items.iter().any(|item| values_equal(item, expected)),
        Value::Map(map) => expected.to_text().is_some_and(|k| map.contains_key(&k)),
        _ => text_pair(actual, expected).is_some_and(|(a, e)| a.contains(&e)),
    }
}

fn is_any(actual: &Value, expected: &MatchValue) -> bool {
    match expected {
        MatchValue::List(options) => options.iter().any(|o| values_equal(actual, o)),
        single => values_equal(actual, single),
    }
}

fn numeric_cmp(actual: &Value, expected: &MatchValue) -> Option<Ordering> {
    actual.as_f64()?.partial_cmp(&expected.as_f64()?)
}

fn regex_matches(actual: &Value, expected: &MatchValue) -> bool {
    let (Some(subject), Some(pattern)) = (actual.scalar_text(), expected.to_text()) else {
        return false;
    };
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(&subject),
        Err(err) => {
            tracing::warn!(
                %pattern,
                error = %err,
                "regexMatches: invalid pattern; treating as non-match"
            );
            false
        }
    }
}
