use crate::output::ReportContext;
use crate::rules::{Finding, Severity};

/// Render findings as console output, grouped by severity then file path.
pub fn render(ctx: &ReportContext<'_>) -> String {
    let mut output = String::new();

    if ctx.findings.is_empty() {
        output.push_str("\n  No security findings detected.\n\n");
        push_verdict(&mut output, ctx);
        return output;
    }

    // Sort by severity (critical first), then by file path
    let mut sorted: Vec<&Finding> = ctx.findings.iter().collect();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.file_path.cmp(&b.file_path))
            .then(a.line.cmp(&b.line))
    });

    output.push_str(&format!(
        "\n  {} finding(s) detected:\n\n",
        ctx.findings.len()
    ));

    for finding in &sorted {
        let severity_tag = match finding.severity {
            Severity::Critical => "[CRITICAL]",
            Severity::High => "[HIGH]    ",
            Severity::Medium => "[MEDIUM]  ",
            Severity::Low => "[LOW]     ",
        };

        output.push_str(&format!(
            "  {} {} (confidence {:.2})\n",
            severity_tag, finding.rule_id, finding.confidence
        ));
        output.push_str(&format!(
            "           at {}:{}\n",
            finding.file_path.display(),
            finding.line
        ));
        if !finding.excerpt.is_empty() {
            output.push_str(&format!("           {}\n", finding.excerpt));
        }
        if let Some(remediation) = &finding.remediation {
            output.push_str(&format!("           fix: {}\n", remediation));
        }
        output.push('\n');
    }

    push_verdict(&mut output, ctx);
    output
}

fn push_verdict(output: &mut String, ctx: &ReportContext<'_>) {
    let status = if ctx.verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} (threshold: {}, highest: {})\n",
        status,
        ctx.verdict.fail_threshold,
        ctx.verdict
            .highest_severity
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into()),
    ));
    output.push_str(&format!(
        "  Scanned {} file(s), {} duplicate finding(s) collapsed\n\n",
        ctx.stats.files_scanned, ctx.stats.deduplicated,
    ));
}
