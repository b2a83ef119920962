//! Terraform/HCL infrastructure rules.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::{
    hcl::{self, HclBlock},
    ParsedStructure,
};
use crate::rules::{Category, Finding, Rule, RuleMetadata, Severity};
use crate::source::{FileKind, SourceFile};

pub fn rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(PublicBucketRule), Box::new(UnencryptedBackendRule)]
}

fn blocks<'a>(structure: Option<&'a ParsedStructure>) -> Option<&'a [HclBlock]> {
    match structure {
        Some(ParsedStructure::Hcl(blocks)) => Some(blocks),
        _ => None,
    }
}

static PRIVATE_ACL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bacl\s*=\s*"private""#).expect("valid regex"));
static ENCRYPT_TRUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bencrypt\s*=\s*true\b").expect("valid regex"));

struct PublicBucketRule;

impl Rule for PublicBucketRule {
    fn metadata(&self) -> &RuleMetadata {
        static META: RuleMetadata = RuleMetadata {
            id: "TFC001",
            name: "S3 bucket without private ACL",
            description: "aws_s3_bucket resource does not pin its ACL to private",
            severity: Severity::High,
            category: Category::SpecializedMisconfiguration,
            precedence: 65,
            confidence: 0.95,
            tags: &["terraform", "aws"],
        };
        &META
    }

    fn applies_to(&self, file: &SourceFile) -> bool {
        file.kind == FileKind::Hcl
    }

    fn apply(&self, file: &SourceFile, structure: Option<&ParsedStructure>) -> Vec<Finding> {
        let Some(blocks) = blocks(structure) else {
            return Vec::new();
        };
        hcl::blocks_of(blocks, "resource", Some("aws_s3_bucket"))
            .into_iter()
            .filter(|b| !b.body_matches(&PRIVATE_ACL_RE))
            .map(|b| self.metadata().finding(file, b.start_line, &b.header()))
            .collect()
    }
}

struct UnencryptedBackendRule;

impl Rule for UnencryptedBackendRule {
    fn metadata(&self) -> &RuleMetadata {
        static META: RuleMetadata = RuleMetadata {
            id: "TFC002",
            name: "Unencrypted S3 state backend",
            description: "backend \"s3\" block does not set encrypt = true",
            severity: Severity::Critical,
            category: Category::SpecializedMisconfiguration,
            precedence: 65,
            confidence: 0.98,
            tags: &["terraform", "aws"],
        };
        &META
    }

    fn applies_to(&self, file: &SourceFile) -> bool {
        file.kind == FileKind::Hcl
    }

    fn apply(&self, file: &SourceFile, structure: Option<&ParsedStructure>) -> Vec<Finding> {
        let Some(blocks) = blocks(structure) else {
            return Vec::new();
        };

        let mut findings = Vec::new();
        for block in blocks {
            for (backend, line) in s3_backends(block) {
                if !ENCRYPT_TRUE_RE.is_match(&backend.body) {
                    findings.push(self.metadata().finding(file, line, &backend.header()));
                }
            }
        }
        findings
    }
}

/// The extractor only sees top-level blocks, so `backend "s3"` nested in a
/// `terraform {}` block is recovered by re-parsing that block's body.
fn s3_backends(block: &HclBlock) -> Vec<(HclBlock, usize)> {
    let is_s3_backend =
        |b: &HclBlock| b.block_type == "backend" && b.label.as_deref() == Some("s3");

    if is_s3_backend(block) {
        let line = block.start_line;
        return vec![(block.clone(), line)];
    }

    if block.block_type != "terraform" {
        return Vec::new();
    }
    let inner_body: String = block
        .body
        .lines()
        .skip(1)
        .collect::<Vec<_>>()
        .join("\n");
    match hcl::parse(&inner_body) {
        Ok(inner) => inner
            .into_iter()
            .filter(|b| is_s3_backend(b))
            .map(|b| {
                let line = block.start_line + b.start_line;
                (b, line)
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use pretty_assertions::assert_eq;

    fn apply_one(rule: &dyn Rule, content: &str) -> Vec<Finding> {
        let file = SourceFile::new("main.tf", content);
        let structure = parser::parse(&file).unwrap();
        rule.apply(&file, structure.as_ref())
    }

    #[test]
    fn bucket_without_acl_flagged() {
        let content = "resource \"aws_s3_bucket\" \"logs\" {\n  bucket = \"my-logs\"\n}\n";
        let findings = apply_one(&PublicBucketRule, content);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "TFC001");
        assert_eq!(findings[0].line, 1);
    }

    #[test]
    fn private_bucket_passes() {
        let content =
            "resource \"aws_s3_bucket\" \"logs\" {\n  bucket = \"my-logs\"\n  acl = \"private\"\n}\n";
        assert!(apply_one(&PublicBucketRule, content).is_empty());
    }

    #[test]
    fn other_resources_ignored() {
        let content = "resource \"aws_instance\" \"web\" {\n  ami = \"ami-123\"\n}\n";
        assert!(apply_one(&PublicBucketRule, content).is_empty());
    }

    #[test]
    fn nested_backend_without_encrypt_flagged() {
        let content = "terraform {\n  backend \"s3\" {\n    bucket = \"state\"\n    key    = \"prod.tfstate\"\n  }\n}\n";
        let findings = apply_one(&UnencryptedBackendRule, content);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);
        assert_eq!(findings[0].severity, Severity::Critical);
    }

    #[test]
    fn encrypted_backend_passes() {
        let content = "terraform {\n  backend \"s3\" {\n    bucket  = \"state\"\n    encrypt = true\n  }\n}\n";
        assert!(apply_one(&UnencryptedBackendRule, content).is_empty());
    }

    #[test]
    fn explicit_encrypt_false_flagged() {
        let content = "terraform {\n  backend \"s3\" {\n    bucket  = \"state\"\n    encrypt = false\n  }\n}\n";
        assert_eq!(apply_one(&UnencryptedBackendRule, content).len(), 1);
    }
}
