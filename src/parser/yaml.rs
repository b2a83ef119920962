//! Minimal YAML-like parser for workflow files.
//!
//! Extracts just the structural facts the workflow rules need: top-level
//! scalar keys with their line numbers, and the line spans of `run:`
//! blocks. This is deliberately not a YAML grammar.

use once_cell::sync::Lazy;
use regex::Regex;

/// Parsed view of a workflow file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YamlDoc {
    /// Top-level `key: scalar` entries as `(key, value, line)`.
    pub top_level: Vec<(String, String, usize)>,
    /// Lines belonging to `run:` blocks, including the `run:` line itself.
    pub run_lines: Vec<(usize, String)>,
}

impl YamlDoc {
    /// First top-level scalar value for `key`, with its line number.
    pub fn top_level_value(&self, key: &str) -> Option<(&str, usize)> {
        self.top_level
            .iter()
            .find(|(k, _, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v, line)| (v.as_str(), *line))
    }
}

static TOP_LEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][\w.-]*)\s*:\s*(.*)$").expect("valid regex"));
static RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\s*run\s*:\s*(.*)$").expect("valid regex"));

/// Parse workflow text. Tab indentation is rejected as malformed (YAML
/// forbids it, and silently misreading indentation would corrupt the
/// run-block spans structure rules depend on).
pub fn parse(content: &str) -> Result<YamlDoc, String> {
    let mut doc = YamlDoc::default();
    let mut run_indent: Option<usize> = None;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_num = idx + 1;

        if raw_line.starts_with('\t') {
            return Err(format!("tab indentation at line {line_num}"));
        }

        let stripped = raw_line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let indent = raw_line.len() - raw_line.trim_start_matches(' ').len();

        // Track run blocks: the run line plus everything indented deeper.
        if let Some(block_indent) = run_indent {
            if indent > block_indent {
                doc.run_lines.push((line_num, stripped.to_string()));
                continue;
            }
            run_indent = None;
        }
        if RUN_RE.is_match(stripped) {
            run_indent = Some(indent);
            doc.run_lines.push((line_num, stripped.to_string()));
            continue;
        }

        if indent == 0 {
            if let Some(caps) = TOP_LEVEL_RE.captures(raw_line) {
                let value = caps[2].trim().trim_matches(|c| c == '"' || c == '\'');
                doc.top_level
                    .push((caps[1].to_string(), value.to_string(), line_num));
            }
        }
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WORKFLOW: &str = "\
name: CI
permissions: write-all
on:
  push:
    branches: [main]
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - run: |
          echo \"::set-output name=sha::$GITHUB_SHA\"
          make build
      - uses: actions/checkout@v4
";

    #[test]
    fn top_level_scalars_with_lines() {
        let doc = parse(WORKFLOW).unwrap();
        assert_eq!(doc.top_level_value("name"), Some(("CI", 1)));
        assert_eq!(doc.top_level_value("permissions"), Some(("write-all", 2)));
        // Nested key is not top-level
        assert_eq!(doc.top_level_value("branches"), None);
    }

    #[test]
    fn run_block_spans_multiline_scripts() {
        let doc = parse(WORKFLOW).unwrap();
        let lines: Vec<&str> = doc.run_lines.iter().map(|(_, l)| l.as_str()).collect();
        assert!(lines.iter().any(|l| l.contains("::set-output")));
        assert!(lines.iter().any(|l| l.contains("make build")));
        // The uses: step after the block is excluded
        assert!(!lines.iter().any(|l| l.contains("actions/checkout")));
    }

    #[test]
    fn quoted_values_unwrapped() {
        let doc = parse("permissions: \"read-all\"\n").unwrap();
        assert_eq!(doc.top_level_value("permissions"), Some(("read-all", 1)));
    }

    #[test]
    fn tab_indentation_is_malformed() {
        assert!(parse("jobs:\n\tbuild: x\n").is_err());
    }
}
