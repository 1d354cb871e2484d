use crate::check::{Check, CheckRegistry};
use crate::matchspec::MatchSpec;
use crate::model::{Block, Module, Modules};
use crate::policy::{CheckPolicy, EffectiveConfig};
use blockguard_types::{Location, RepoPath, Severity};

pub fn resource(type_label: &str, name: &str) -> Block {
    Block::new("resource", &[type_label, name]).at(Location {
        path: RepoPath::new("main.tf.json"),
        line: Some(1),
        col: None,
    })
}

pub fn root_modules(blocks: Vec<Block>) -> Modules {
    Modules::new(vec![Module::new(RepoPath::default(), blocks)])
}

pub fn check(code: &str, type_label: &str, spec: MatchSpec) -> Check {
    Check {
        code: code.to_string(),
        description: format!("{code} description"),
        impact: None,
        resolution: None,
        required_types: vec!["resource".to_string()],
        required_labels: vec![type_label.to_string()],
        severity: Severity::High,
        match_spec: spec,
        error_message: format!("{code} failed"),
        related_links: Vec::new(),
    }
}

pub fn registry(checks: Vec<Check>) -> CheckRegistry {
    let mut registry = CheckRegistry::new();
    for c in checks {
        assert!(registry.insert(c), "duplicate check code in test registry");
    }
    registry
}

pub fn config() -> EffectiveConfig {
    EffectiveConfig {
        profile: "test".to_string(),
        ..EffectiveConfig::default()
    }
}

pub fn config_with_override(code: &str, policy: CheckPolicy) -> EffectiveConfig {
    let mut cfg = config();
    cfg.checks.insert(code.to_string(), policy);
    cfg
}
