use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::PolicyVerdict;
use crate::engine::ScanStats;
use crate::error::Result;
use crate::output::ReportContext;
use crate::rules::Finding;

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: Metadata<'a>,
    summary: Summary,
    findings: &'a [Finding],
    verdict: &'a PolicyVerdict,
    stats: &'a ScanStats,
}

#[derive(Serialize)]
struct Metadata<'a> {
    tool: &'static str,
    version: &'static str,
    scan_path: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct Summary {
    total: usize,
    by_severity: BTreeMap<String, usize>,
    by_category: BTreeMap<String, usize>,
}

/// Render findings as a machine-readable JSON report.
pub fn render(ctx: &ReportContext<'_>) -> Result<String> {
    let mut by_severity = BTreeMap::new();
    let mut by_category = BTreeMap::new();
    for finding in ctx.findings {
        *by_severity.entry(finding.severity.to_string()).or_insert(0) += 1;
        *by_category.entry(finding.category.to_string()).or_insert(0) += 1;
    }

    let report = JsonReport {
        metadata: Metadata {
            tool: "codesentinel",
            version: env!("CARGO_PKG_VERSION"),
            scan_path: ctx.scan_path,
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
        summary: Summary {
            total: ctx.findings.len(),
            by_severity,
            by_category,
        },
        findings: ctx.findings,
        verdict: ctx.verdict,
        stats: ctx.stats,
    };
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Policy;
    use crate::rules::{Category, Severity};
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    #[test]
    fn report_shape() {
        let findings = vec![Finding {
            rule_id: "SECRET_AWS_ACCESS_KEY".into(),
            file_path: PathBuf::from("config.py"),
            line: 1,
            column: None,
            severity: Severity::High,
            confidence: 0.95,
            excerpt: "AWS_KEY = ...".into(),
            category: Category::Secret,
            precedence: 100,
            tags: BTreeSet::new(),
            cwe_id: Some("CWE-798".into()),
            remediation: None,
            references: vec![],
        }];
        let verdict = Policy::default().evaluate(&findings);
        let stats = ScanStats::default();
        let rendered = render(&ReportContext {
            scan_path: "/repo",
            findings: &findings,
            verdict: &verdict,
            stats: &stats,
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["metadata"]["tool"], "codesentinel");
        assert_eq!(value["metadata"]["scan_path"], "/repo");
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["summary"]["by_severity"]["high"], 1);
        assert_eq!(value["findings"][0]["cwe_id"], "CWE-798");
        assert_eq!(value["verdict"]["pass"], false);
    }
}
