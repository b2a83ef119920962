//! Minimal HCL-like block extractor for IaC files.
//!
//! Finds top-level `type "label" ["label2"] { ... }` blocks by brace
//! counting. Enough structure to ask whether an attribute appears inside a
//! specific block body; not an HCL grammar.

use once_cell::sync::Lazy;
use regex::Regex;

/// One extracted block: `resource "aws_s3_bucket" "logs" { ... }` yields
/// `block_type = "resource"`, `label = "aws_s3_bucket"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HclBlock {
    pub block_type: String,
    pub label: Option<String>,
    pub body: String,
    pub start_line: usize,
}

impl HclBlock {
    /// Case-insensitive attribute test against the block body.
    pub fn body_matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.body)
    }

    /// First line of the block header, for excerpts.
    pub fn header(&self) -> String {
        self.body.lines().next().unwrap_or_default().trim().to_string()
    }
}

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([A-Za-z_][\w-]*)\s+(?:"([^"]*)"\s*)?(?:"[^"]*"\s*)?\{"#)
        .expect("valid regex")
});

/// Extract all top-level blocks. Unbalanced braces at end of input are
/// reported as a parse failure so structure rules skip the file instead of
/// reasoning over a truncated body.
pub fn parse(content: &str) -> Result<Vec<HclBlock>, String> {
    let mut blocks = Vec::new();
    let mut collecting: Option<(String, Option<String>, usize)> = None;
    let mut body_lines: Vec<&str> = Vec::new();
    let mut depth: i32 = 0;

    for (idx, line) in content.lines().enumerate() {
        let line_num = idx + 1;

        match &collecting {
            None => {
                if let Some(caps) = HEADER_RE.captures(line) {
                    let block_type = caps[1].to_string();
                    let label = caps.get(2).map(|m| m.as_str().to_string());
                    depth = brace_delta(line);
                    body_lines = vec![line];
                    if depth <= 0 {
                        blocks.push(HclBlock {
                            block_type,
                            label,
                            body: line.to_string(),
                            start_line: line_num,
                        });
                    } else {
                        collecting = Some((block_type, label, line_num));
                    }
                }
            }
            Some((block_type, label, start_line)) => {
                body_lines.push(line);
                depth += brace_delta(line);
                if depth <= 0 {
                    blocks.push(HclBlock {
                        block_type: block_type.clone(),
                        label: label.clone(),
                        body: body_lines.join("\n"),
                        start_line: *start_line,
                    });
                    collecting = None;
                    body_lines = Vec::new();
                }
            }
        }
    }

    if collecting.is_some() {
        return Err("unbalanced braces at end of input".to_string());
    }
    Ok(blocks)
}

fn brace_delta(line: &str) -> i32 {
    let opens = line.matches('{').count() as i32;
    let closes = line.matches('}').count() as i32;
    opens - closes
}

/// Blocks of a given type, optionally filtered by first label.
pub fn blocks_of<'a>(
    blocks: &'a [HclBlock],
    block_type: &str,
    label: Option<&str>,
) -> Vec<&'a HclBlock> {
    blocks
        .iter()
        .filter(|b| b.block_type.eq_ignore_ascii_case(block_type))
        .filter(|b| match label {
            Some(l) => b.label.as_deref() == Some(l),
            None => true,
        })
        .collect()
}
