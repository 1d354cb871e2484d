//! The matching-specification tree: one check's pass/fail logic.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed action vocabulary of a [`MatchSpec`] node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    IsPresent,
    NotPresent,
    IsEmpty,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    Contains,
    NotContains,
    RegexMatches,
    IsAny,
    IsNone,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    And,
    Or,
    Not,
    RequiresPresence,
    InModule,
    OfType,
}

impl Action {
    pub const ALL: [Action; 22] = [
        Action::IsPresent,
        Action::NotPresent,
        Action::IsEmpty,
        Action::Equals,
        Action::NotEquals,
        Action::StartsWith,
        Action::EndsWith,
        Action::Contains,
        Action::NotContains,
        Action::RegexMatches,
        Action::IsAny,
        Action::IsNone,
        Action::GreaterThan,
        Action::GreaterThanOrEqual,
        Action::LessThan,
        Action::LessThanOrEqual,
        Action::And,
        Action::Or,
        Action::Not,
        Action::RequiresPresence,
        Action::InModule,
        Action::OfType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::IsPresent => "isPresent",
            Action::NotPresent => "notPresent",
            Action::IsEmpty => "isEmpty",
            Action::Equals => "equals",
            Action::NotEquals => "notEquals",
            Action::StartsWith => "startsWith",
            Action::EndsWith => "endsWith",
            Action::Contains => "contains",
            Action::NotContains => "notContains",
            Action::RegexMatches => "regexMatches",
            Action::IsAny => "isAny",
            Action::IsNone => "isNone",
            Action::GreaterThan => "greaterThan",
            Action::GreaterThanOrEqual => "greaterThanOrEqual",
            Action::LessThan => "lessThan",
            Action::LessThanOrEqual => "lessThanOrEqual",
            Action::And => "and",
            Action::Or => "or",
            Action::Not => "not",
            Action::RequiresPresence => "requiresPresence",
            Action::InModule => "inModule",
            Action::OfType => "ofType",
        }
    }

    /// Exact, case-sensitive lookup of an action name as written in checks files.
    pub fn from_name(name: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.as_str() == name)
    }

    pub fn is_combinator(self) -> bool {
        matches!(self, Action::And | Action::Or | Action::Not)
    }

    /// Existence/emptiness tests; these may carry a submatch.
    pub fn is_presence(self) -> bool {
        matches!(self, Action::IsPresent | Action::NotPresent | Action::IsEmpty)
    }

    /// Leaf actions that compare a resolved attribute against `value`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
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
                | Action::LessThanOrEqual
        )
    }

    /// Actions whose `name` is an attribute path on the target block.
    pub fn reads_attribute(self) -> bool {
        self.is_presence() || self.is_comparison()
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal operand of a comparison. A `Text` equal to a bound variable name is substituted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MatchValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<MatchValue>),
}

impl MatchValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MatchValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MatchValue::Number(n) => Some(*n),
            MatchValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Textual form used for substring/prefix/suffix/regex comparisons.
    pub fn to_text(&self) -> Option<String> {
        match self {
            MatchValue::Text(s) => Some(s.clone()),
            MatchValue::Bool(b) => Some(b.to_string()),
            MatchValue::Number(n) => Some(crate::model::Value::Number(*n).render()),
            MatchValue::List(_) => None,
        }
    }
}

impl From<&str> for MatchValue {
    fn from(value: &str) -> Self {
        MatchValue::Text(value.to_string())
    }
}

impl From<bool> for MatchValue {
    fn from(value: bool) -> Self {
        MatchValue::Bool(value)
    }
}

impl From<f64> for MatchValue {
    fn from(value: f64) -> Self {
        MatchValue::Number(value)
    }
}

impl<T: Into<MatchValue>> From<Vec<T>> for MatchValue {
    fn from(value: Vec<T>) -> Self {
        MatchValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// One node of the matching-specification tree. Each node owns its children.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchSpec {
    pub action: Action,
    /// Attribute path, or the referenced block type for `requiresPresence`.
    pub name: String,
    pub value: Option<MatchValue>,
    pub predicates: Vec<MatchSpec>,
    pub sub_match: Option<Box<MatchSpec>>,
    pub pre_conditions: Vec<MatchSpec>,
    pub assign_variable: Option<String>,
    /// A missing attribute satisfies the node instead of failing it.
    pub ignore_undefined: bool,
}

impl MatchSpec {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            name: String::new(),
            value: None,
            predicates: Vec::new(),
            sub_match: None,
            pre_conditions: Vec::new(),
            assign_variable: None,
            ignore_undefined: false,
        }
    }

    /// Leaf node reading the attribute (or child block) at `name`.
    pub fn leaf<N: Into<String>>(action: Action, name: N) -> Self {
        Self {
            name: name.into(),
            ..Self::new(action)
        }
    }

    pub fn compare<N: Into<String>, V: Into<MatchValue>>(action: Action, name: N, value: V) -> Self {
        Self::leaf(action, name).with_value(value)
    }

    pub fn and(predicates: Vec<MatchSpec>) -> Self {
        Self {
            predicates,
            ..Self::new(Action::And)
        }
    }

    pub fn or(predicates: Vec<MatchSpec>) -> Self {
        Self {
            predicates,
            ..Self::new(Action::Or)
        }
    }

    pub fn not(predicate: MatchSpec) -> Self {
        Self {
            predicates: vec![predicate],
            ..Self::new(Action::Not)
        }
    }

    pub fn requires_presence<N: Into<String>>(block_type: N, sub_match: MatchSpec) -> Self {
        Self::leaf(Action::RequiresPresence, block_type).with_sub_match(sub_match)
    }

    pub fn with_value<V: Into<MatchValue>>(mut self, value: V) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_sub_match(mut self, sub_match: MatchSpec) -> Self {
        self.sub_match = Some(Box::new(sub_match));
        self
    }

    pub fn with_pre_conditions(mut self, pre_conditions: Vec<MatchSpec>) -> Self {
        self.pre_conditions = pre_conditions;
        self
    }

    pub fn assign_to<N: Into<String>>(mut self, variable: N) -> Self {
        self.assign_variable = Some(variable.into());
        self
    }

    pub fn ignoring_undefined(mut self) -> Self {
        self.ignore_undefined = true;
        self
    }

    /// Number of nodes in this subtree, counting predicates, submatches and preconditions.
    pub fn node_count(&self) -> usize {
        1 + self.predicates.iter().map(MatchSpec::node_count).sum::<usize>()
            + self.pre_conditions.iter().map(MatchSpec::node_count).sum::<usize>()
            + self.sub_match.as_deref().map_or(0, MatchSpec::node_count)
    }
}
