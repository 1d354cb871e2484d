use crate::matchspec::MatchValue;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Variable bindings for one (check, block) evaluation.
///
/// Created empty, only ever grows, dropped when the evaluation ends.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalContext {
    vars: BTreeMap<String, String>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`; a later binding of the same name replaces the value.
    pub fn bind<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Replace text operands that exactly name a bound variable; lists are substituted per element.
    pub fn substitute<'a>(&self, value: &'a MatchValue) -> Cow<'a, MatchValue> {
        match value {
            MatchValue::Text(text) => match self.get(text) {
                Some(bound) => Cow::Owned(MatchValue::Text(bound.to_string())),
                None => Cow::Borrowed(value),
            },
            MatchValue::List(items) if items.iter().any(|i| self.binds(i)) => Cow::Owned(
                MatchValue::List(items.iter().map(|i| self.substitute(i).into_owned()).collect()),
            ),
            _ => Cow::Borrowed(value),
        }
    }

    fn binds(&self, value: &MatchValue) -> bool {
        value.as_text().is_some_and(|t| self.vars.contains_key(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_replaces_exact_variable_names_only() {
        let mut ctx = EvalContext::new();
        ctx.bind("TFSEC_VAR_BUCKET_NAME", "test-bucket");

        let exact = MatchValue::from("TFSEC_VAR_BUCKET_NAME");
        assert_eq!(
            ctx.substitute(&exact).into_owned(),
            MatchValue::from("test-bucket")
        );

        let partial = MatchValue::from("TFSEC_VAR_BUCKET_NAME-suffix");
        assert!(matches!(ctx.substitute(&partial), Cow::Borrowed(_)));

        let number = MatchValue::Number(1.0);
        assert!(matches!(ctx.substitute(&number), Cow::Borrowed(_)));
    }

    #[test]
    fn substitute_maps_list_elements() {
        let mut ctx = EvalContext::new();
        ctx.bind("REGION", "eu-west-1");
        let list = MatchValue::from(vec!["us-east-1", "REGION"]);
        assert_eq!(
            ctx.substitute(&list).into_owned(),
            MatchValue::from(vec!["us-east-1", "eu-west-1"])
        );
    }

    #[test]
    fn rebinding_replaces_value() {
        let mut ctx = EvalContext::new();
        ctx.bind("A", "1");
        ctx.bind("A", "2");
        assert_eq!(ctx.get("A"), Some("2"));
        assert_eq!(ctx.len(), 1);
    }
}
