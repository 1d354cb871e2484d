//! Validation and conversion from the on-disk model into domain checks.

use crate::error::RuleError;
use crate::model::{CheckDef, MatchSpecDef};
use blockguard_domain::{Action, Check, MatchSpec};

pub(crate) fn to_check(file: &str, index: usize, def: CheckDef) -> Result<Check, RuleError> {
    let code = def.code.trim().to_string();
    if code.is_empty() {
        return Err(RuleError::malformed(
            file,
            format!("checks[{index}]: code must not be empty"),
        ));
    }
    let required_types = non_blank(def.required_types);
    if required_types.is_empty() {
        return Err(RuleError::malformed(
            file,
            format!("check {code}: requiredTypes must list at least one block type"),
        ));
    }

    let match_spec = SpecConverter { file, code: &code }.convert("matchSpec", def.match_spec)?;

    Ok(Check {
        code,
        description: def.description,
        impact: def.impact.filter(|s| !s.is_empty()),
        resolution: def.resolution.filter(|s| !s.is_empty()),
        required_types,
        required_labels: non_blank(def.required_labels),
        severity: def.severity,
        match_spec,
        error_message: def.error_message,
        related_links: def.related_links,
    })
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

struct SpecConverter<'a> {
    file: &'a str,
    code: &'a str,
}

impl SpecConverter<'_> {
    fn convert(&self, path: &str, def: MatchSpecDef) -> Result<MatchSpec, RuleError> {
        let action = Action::from_name(&def.action).ok_or_else(|| RuleError::UnsupportedAction {
            file: self.file.to_string(),
            check: self.code.to_string(),
            action: def.action.clone(),
        })?;

        self.validate_shape(path, action, &def)?;

        let predicates = self.convert_all(path, "predicateMatchSpec", def.predicate_match_spec)?;
        let pre_conditions = self.convert_all(path, "preConditions", def.pre_conditions)?;
        let sub_match = match def.sub_match {
            Some(sub) => Some(Box::new(self.convert(&format!("{path}.subMatch"), *sub)?)),
            None => None,
        };

        Ok(MatchSpec {
            action,
            name: def.name,
            value: def.value,
            predicates,
            sub_match,
            pre_conditions,
            assign_variable: def.assign_variable.filter(|v| !v.is_empty()),
            ignore_undefined: def.ignore_undefined,
        })
    }

    fn convert_all(
        &self,
        path: &str,
        field: &str,
        defs: Vec<MatchSpecDef>,
    ) -> Result<Vec<MatchSpec>, RuleError> {
        defs.into_iter()
            .enumerate()
            .map(|(i, d)| self.convert(&format!("{path}.{field}[{i}]"), d))
            .collect()
    }

    fn validate_shape(&self, path: &str, action: Action, def: &MatchSpecDef) -> Result<(), RuleError> {
        let predicates = def.predicate_match_spec.len();

        if action.is_combinator() {
            if predicates == 0 {
                return Err(self.malformed(path, format!("`{action}` needs at least one predicate")));
            }
            if action == Action::Not && predicates != 1 {
                return Err(self.malformed(
                    path,
                    format!("`not` takes exactly one predicate, found {predicates}"),
                ));
            }
        } else if predicates > 0 {
            return Err(self.malformed(path, format!("`{action}` does not take predicates")));
        }

        if action.reads_attribute() && def.name.trim().is_empty() {
            return Err(self.malformed(path, format!("`{action}` needs an attribute name")));
        }
        if (action.is_comparison() || action == Action::OfType) && def.value.is_none() {
            return Err(self.malformed(path, format!("`{action}` needs a value")));
        }

        if action == Action::RequiresPresence {
            if def.name.trim().is_empty() {
                return Err(self.malformed(path, "`requiresPresence` needs a block type name"));
            }
            if def.sub_match.is_none() {
                return Err(self.malformed(path, "`requiresPresence` needs a subMatch"));
            }
        } else if def.sub_match.is_some() && !action.is_presence() {
            return Err(self.malformed(
                path,
                format!("`{action}` does not take a subMatch"),
            ));
        }

        Ok(())
    }

    fn malformed(&self, path: &str, reason: impl std::fmt::Display) -> RuleError {
        RuleError::malformed(self.file, format!("check {} at {path}: {reason}", self.code))
    }
}
