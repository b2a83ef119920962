//! GitHub Actions workflow rules.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::{yaml::YamlDoc, ParsedStructure};
use crate::rules::{Category, Finding, Rule, RuleMetadata, Severity};
use crate::source::{FileKind, SourceFile};

pub fn rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(BroadPermissionsRule), Box::new(SetOutputRule)]
}

fn workflow<'a>(structure: Option<&'a ParsedStructure>) -> Option<&'a YamlDoc> {
    match structure {
        Some(ParsedStructure::Workflow(doc)) => Some(doc),
        _ => None,
    }
}

struct BroadPermissionsRule;

impl Rule for BroadPermissionsRule {
    fn metadata(&self) -> &RuleMetadata {
        static META: RuleMetadata = RuleMetadata {
            id: "GHA001",
            name: "Workflow-wide broad permissions",
            description: "Top-level permissions grant write-all or read-all to every job",
            severity: Severity::Critical,
            category: Category::SpecializedMisconfiguration,
            precedence: 65,
            confidence: 0.95,
            tags: &["github-actions"],
        };
        &META
    }

    fn applies_to(&self, file: &SourceFile) -> bool {
        file.kind == FileKind::Workflow
    }

    fn apply(&self, file: &SourceFile, structure: Option<&ParsedStructure>) -> Vec<Finding> {
        let Some(doc) = workflow(structure) else {
            return Vec::new();
        };
        match doc.top_level_value("permissions") {
            Some((value, line)) if matches!(value.trim(), "write-all" | "read-all") => {
                vec![self
                    .metadata()
                    .finding(file, line, &format!("permissions: {value}"))]
            }
            _ => Vec::new(),
        }
    }
}

static SET_OUTPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"::set-output\s+name=").expect("valid regex"));

struct SetOutputRule;

impl Rule for SetOutputRule {
    fn metadata(&self) -> &RuleMetadata {
        static META: RuleMetadata = RuleMetadata {
            id: "GHA002",
            name: "Deprecated set-output command",
            description: "Run step uses the injection-prone ::set-output workflow command",
            severity: Severity::High,
            category: Category::SpecializedMisconfiguration,
            precedence: 65,
            confidence: 0.85,
            tags: &["github-actions"],
        };
        &META
    }

    fn applies_to(&self, file: &SourceFile) -> bool {
        file.kind == FileKind::Workflow
    }

    fn apply(&self, file: &SourceFile, structure: Option<&ParsedStructure>) -> Vec<Finding> {
        let Some(doc) = workflow(structure) else {
            return Vec::new();
        };
        doc.run_lines
            .iter()
            .filter(|(_, text)| SET_OUTPUT_RE.is_match(text))
            .map(|(line, text)| self.metadata().finding(file, *line, text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use pretty_assertions::assert_eq;

    fn apply_one(rule: &dyn Rule, content: &str) -> Vec<Finding> {
        let file = SourceFile::new(".github/workflows/ci.yml", content);
        let structure = parser::parse(&file).unwrap();
        rule.apply(&file, structure.as_ref())
    }

    #[test]
    fn write_all_permissions_flagged() {
        let findings = apply_one(
            &BroadPermissionsRule,
            "name: ci\npermissions: write-all\non: [push]\n",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
        assert_eq!(findings[0].severity, Severity::Critical);
    }

    #[test]
    fn read_all_permissions_flagged() {
        let findings = apply_one(
            &BroadPermissionsRule,
            "name: ci\npermissions: read-all\non: [push]\n",
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn scoped_permissions_pass() {
        assert!(apply_one(
            &BroadPermissionsRule,
            "name: ci\npermissions:\n  contents: read\non: [push]\n",
        )
        .is_empty());
    }

    #[test]
    fn set_output_in_run_block_flagged() {
        let content = "name: ci\non: [push]\njobs:\n  build:\n    steps:\n      - run: |\n          echo \"::set-output name=sha::$GITHUB_SHA\"\n";
        let findings = apply_one(&SetOutputRule, content);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 7);
    }

    #[test]
    fn set_output_outside_run_ignored() {
        // Mentioned in a comment only
        let content = "name: ci\n# replaces ::set-output name=old\non: [push]\n";
        assert!(apply_one(&SetOutputRule, content).is_empty());
    }
}
