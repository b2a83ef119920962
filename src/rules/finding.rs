use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::source::SourceFile;

/// Maximum excerpt length carried on a finding. Excerpts are context
/// snippets, never a vehicle for the full secret value.
pub const MAX_EXCERPT_LEN: usize = 100;

/// A detection produced by a rule. Immutable once produced: deduplication
/// selects among instances, never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable identifier of the producing rule.
    pub rule_id: String,
    pub file_path: PathBuf,
    /// 1-based line number; 0 when not applicable.
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub severity: Severity,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Bounded context snippet.
    pub excerpt: String,
    pub category: Category,
    /// Dedup survivorship rank (see the canonical tier table).
    pub precedence: u8,
    pub tags: BTreeSet<String>,
    /// Populated only by the external enrichment hook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwe_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Secret,
    Configuration,
    SpecializedMisconfiguration,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Secret => write!(f, "secret"),
            Self::Configuration => write!(f, "configuration"),
            Self::SpecializedMisconfiguration => write!(f, "specialized-misconfiguration"),
        }
    }
}

/// Static metadata describing one rule, used for discovery validation and
/// `list-rules` output.
#[derive(Debug, Clone, Serialize)]
pub struct RuleMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub category: Category,
    pub precedence: u8,
    /// Default confidence attached to this rule's findings.
    pub confidence: f64,
    pub tags: &'static [&'static str],
}

impl RuleMetadata {
    /// Build a finding carrying this rule's defaults.
    pub fn finding(&self, file: &SourceFile, line: usize, excerpt: &str) -> Finding {
        Finding {
            rule_id: self.id.to_string(),
            file_path: file.path.clone(),
            line,
            column: None,
            severity: self.severity,
            confidence: self.confidence,
            excerpt: truncate_excerpt(excerpt),
            category: self.category,
            precedence: self.precedence,
            tags: self.tags.iter().map(|t| (*t).to_string()).collect(),
            cwe_id: None,
            remediation: None,
            references: Vec::new(),
        }
    }
}

/// Trim and bound an excerpt to `MAX_EXCERPT_LEN` characters.
pub fn truncate_excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_EXCERPT_LEN {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_EXCERPT_LEN - 3).collect();
    format!("{cut}...")
}
