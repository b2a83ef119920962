//! Rule trait, built-in rule sets, and the validating registry.
//!
//! Rules are discovered from static rule sets rather than reflection: each
//! set contributes boxed `Rule` implementations, and the registry validates
//! every candidate before accepting it. A rule that fails any validation
//! criterion is skipped with a warning, never a panic.

pub mod configs;
pub mod docker;
pub mod finding;
pub mod iac;
pub mod manifest;
pub mod secrets;
pub mod workflow;

pub use finding::{Category, Finding, RuleMetadata, Severity};

use crate::error::{Result, SentinelError};
use crate::parser::ParsedStructure;
use crate::source::SourceFile;

/// A single detection rule. Implementations are stateless and shared
/// across worker threads.
pub trait Rule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;

    /// Cheap pre-filter: whether this rule is relevant to the file at all.
    fn applies_to(&self, file: &SourceFile) -> bool;

    /// Run against one file. `structure` is present only when the file kind
    /// has a structure-aware parser and parsing succeeded.
    fn apply(&self, file: &SourceFile, structure: Option<&ParsedStructure>) -> Vec<Finding>;
}

/// A named group of rules registered together.
pub struct RuleSet {
    pub name: &'static str,
    pub rules: Vec<Box<dyn Rule>>,
}

/// All built-in rule sets.
pub fn builtin_rule_sets() -> Vec<RuleSet> {
    vec![
        RuleSet {
            name: "secrets",
            rules: secrets::rules(),
        },
        RuleSet {
            name: "configs",
            rules: configs::rules(),
        },
        RuleSet {
            name: "docker",
            rules: docker::rules(),
        },
        RuleSet {
            name: "workflow",
            rules: workflow::rules(),
        },
        RuleSet {
            name: "iac",
            rules: iac::rules(),
        },
        RuleSet {
            name: "manifest",
            rules: manifest::rules(),
        },
    ]
}

/// Registry of validated rules. Construction filters out malformed
/// candidates; an empty registry is a fatal configuration error at the
/// engine level.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    rejected: usize,
}

impl RuleRegistry {
    /// Build from the given rule sets, applying an ignore list by rule id.
    pub fn from_sets(sets: Vec<RuleSet>, ignore: &std::collections::HashSet<String>) -> Self {
        let mut rules = Vec::new();
        let mut rejected = 0;

        for set in sets {
            for rule in set.rules {
                let meta = rule.metadata();
                if let Err(reason) = validate(meta) {
                    let err = SentinelError::Discovery {
                        set: set.name.to_string(),
                        message: format!("rule '{}': {}", meta.id, reason),
                    };
                    tracing::warn!(error = %err, "rule rejected");
                    rejected += 1;
                    continue;
                }
                if ignore.contains(meta.id) {
                    tracing::debug!(rule = meta.id, "rule disabled by policy");
                    continue;
                }
                rules.push(rule);
            }
        }

        Self { rules, rejected }
    }

    pub fn builtin(ignore: &std::collections::HashSet<String>) -> Self {
        Self::from_sets(builtin_rule_sets(), ignore)
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Error out when no usable rules remain.
    pub fn ensure_nonempty(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(SentinelError::FatalConfiguration(
                "no valid rules available after discovery".to_string(),
            ));
        }
        Ok(())
    }
}

/// A candidate is accepted only when every criterion holds. Partial
/// conformance (an id but no description, say) is rejected outright, which
/// keeps abstract scaffolding out of the registry.
fn validate(meta: &RuleMetadata) -> std::result::Result<(), &'static str> {
    if meta.id.trim().is_empty() {
        return Err("empty rule id");
    }
    if meta.description.trim().is_empty() {
        return Err("empty description");
    }
    if meta.precedence == 0 || meta.precedence > 100 {
        return Err("precedence out of range 1..=100");
    }
    if !(0.0..=1.0).contains(&meta.confidence) || meta.confidence.is_nan() {
        return Err("confidence out of range 0..=1");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeRule {
        meta: RuleMetadata,
    }

    impl Rule for FakeRule {
        fn metadata(&self) -> &RuleMetadata {
            &self.meta
        }
        fn applies_to(&self, _file: &SourceFile) -> bool {
            true
        }
        fn apply(&self, _file: &SourceFile, _s: Option<&ParsedStructure>) -> Vec<Finding> {
            Vec::new()
        }
    }

    fn fake(id: &'static str, description: &'static str, precedence: u8, confidence: f64) -> Box<dyn Rule> {
        Box::new(FakeRule {
            meta: RuleMetadata {
                id,
                name: "fake",
                description,
                severity: Severity::Low,
                category: Category::Configuration,
                precedence,
                confidence,
                tags: &[],
            },
        })
    }

    #[test]
    fn all_builtin_rules_pass_validation() {
        let registry = RuleRegistry::builtin(&HashSet::new());
        assert_eq!(registry.rejected(), 0);
        assert!(registry.len() >= 20);
    }

    #[test]
    fn builtin_rule_ids_are_unique() {
        let registry = RuleRegistry::builtin(&HashSet::new());
        let mut ids: Vec<_> = registry.rules().iter().map(|r| r.metadata().id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn partially_conformant_rules_rejected() {
        let sets = vec![RuleSet {
            name: "test",
            rules: vec![
                fake("OK_RULE", "valid rule", 80, 0.8),
                fake("", "has description but no id", 80, 0.8),
                fake("NO_DESC", "", 80, 0.8),
                fake("BAD_PRECEDENCE", "precedence zero", 0, 0.8),
                fake("BAD_CONFIDENCE", "confidence above one", 80, 1.5),
            ],
        }];
        let registry = RuleRegistry::from_sets(sets, &HashSet::new());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.rejected(), 4);
    }

    #[test]
    fn ignore_list_disables_rules() {
        let mut ignore = HashSet::new();
        ignore.insert("SECRET_HIGH_ENTROPY".to_string());
        let registry = RuleRegistry::builtin(&ignore);
        assert!(registry
            .rules()
            .iter()
            .all(|r| r.metadata().id != "SECRET_HIGH_ENTROPY"));
    }

    #[test]
    fn empty_registry_is_fatal() {
        let registry = RuleRegistry::from_sets(Vec::new(), &HashSet::new());
        assert!(matches!(
            registry.ensure_nonempty(),
            Err(SentinelError::FatalConfiguration(_))
        ));
    }
}
