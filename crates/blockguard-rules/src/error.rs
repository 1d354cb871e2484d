use thiserror::Error;

/// Fatal checks-file errors. Nothing is registered when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("malformed rule definition in {file}: {reason}")]
    MalformedRuleDefinition { file: String, reason: String },

    #[error("unsupported action `{action}` in {file} (check {check})")]
    UnsupportedAction {
        file: String,
        check: String,
        action: String,
    },
}

impl RuleError {
    pub(crate) fn malformed(file: &str, reason: impl Into<String>) -> Self {
        RuleError::MalformedRuleDefinition {
            file: file.to_string(),
            reason: reason.into(),
        }
    }

    /// Checks file that produced the error.
    pub fn file(&self) -> &str {
        match self {
            RuleError::MalformedRuleDefinition { file, .. } => file,
            RuleError::UnsupportedAction { file, .. } => file,
        }
    }
}
