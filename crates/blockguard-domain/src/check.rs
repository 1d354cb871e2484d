use crate::matchspec::MatchSpec;
use crate::model::Block;
use blockguard_types::Severity;

/// Label that matches any type label in `required_labels`.
pub const ANY_LABEL: &str = "*";

/// One user-defined rule: applicability filter, match spec, and metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Check {
    pub code: String,
    pub description: String,
    pub impact: Option<String>,
    pub resolution: Option<String>,
    /// Block kinds the check applies to (`resource`, `data`, `module`, ...).
    pub required_types: Vec<String>,
    /// Accepted type labels; empty accepts every block of a required kind.
    pub required_labels: Vec<String>,
    pub severity: Severity,
    pub match_spec: MatchSpec,
    pub error_message: String,
    pub related_links: Vec<String>,
}

impl Check {
    /// Kind is one of `required_types` and the first label is one of `required_labels`.
    pub fn applies_to(&self, block: &Block) -> bool {
        if !self.required_types.iter().any(|t| t == block.kind()) {
            return false;
        }
        if self.required_labels.is_empty() {
            return true;
        }
        self.required_labels
            .iter()
            .any(|l| l == ANY_LABEL || Some(l.as_str()) == block.type_label())
    }

    pub fn render_message(&self, block: &Block) -> String {
        format!(
            "Custom check failed for resource {}. {}",
            block.full_name(),
            self.error_message
        )
    }
}

/// Checks loaded for one run. Codes are unique; iteration follows insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckRegistry {
    checks: Vec<Check>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` (and keeps the registry unchanged) when the code is already registered.
    pub fn insert(&mut self, check: Check) -> bool {
        if self.get(&check.code).is_some() {
            return false;
        }
        self.checks.push(check);
        true
    }

    pub fn get(&self, code: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.code.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl<'a> IntoIterator for &'a CheckRegistry {
    type Item = &'a Check;
    type IntoIter = std::slice::Iter<'a, Check>;

    fn into_iter(self) -> Self::IntoIter {
        self.checks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchspec::Action;
    use crate::test_support::{check, resource};

    fn present(name: &str) -> MatchSpec {
        MatchSpec::leaf(Action::IsPresent, name)
    }

    #[test]
    fn applies_to_matches_kind_and_first_label_exactly() {
        let c = check("CUS001", "aws_vpc", present("cidr_block"));
        assert!(c.applies_to(&resource("aws_vpc", "main")));
        assert!(!c.applies_to(&resource("aws_vpc_peering", "main")));
        assert!(!c.applies_to(&Block::new("data", &["aws_vpc", "main"])));
        // Position-sensitive: the name label does not count.
        assert!(!c.applies_to(&resource("aws_subnet", "aws_vpc")));
    }

    #[test]
    fn wildcard_and_empty_labels_match_any_type() {
        let mut c = check("CUS001", "*", present("tags"));
        assert!(c.applies_to(&resource("aws_instance", "web")));
        c.required_labels.clear();
        assert!(c.applies_to(&resource("aws_instance", "web")));
    }

    #[test]
    fn insert_rejects_duplicate_codes() {
        let mut registry = CheckRegistry::new();
        assert!(registry.insert(check("CUS001", "aws_vpc", present("a"))));
        assert!(!registry.insert(check("CUS001", "aws_s3_bucket", present("b"))));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("CUS001").map(|c| c.required_labels.clone()),
            Some(vec!["aws_vpc".to_string()])
        );
    }

    #[test]
    fn render_message_names_the_block() {
        let c = check("DP006", "aws_vpc", present("a"));
        assert_eq!(
            c.render_message(&resource("aws_vpc", "main")),
            "Custom check failed for resource aws_vpc.main. DP006 failed"
        );
    }
}
