//! Minimal Dockerfile parser: an ordered instruction list, nothing more.

use once_cell::sync::Lazy;
use regex::Regex;

/// One Dockerfile instruction with its argument text and source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub keyword: String,
    pub arguments: String,
    pub line: usize,
}

static INSTRUCTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([A-Z]+)\s+(.*)$").expect("valid regex"));

/// Parse into `(keyword, arguments, line)` tuples, handling comments,
/// blank lines, and backslash continuations. Lines that are not valid
/// instructions are skipped rather than failing the file.
pub fn parse(content: &str) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut pending = String::new();
    let mut pending_line = 0;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw_line.trim_end();

        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        if pending.is_empty() {
            pending = line.trim().to_string();
            pending_line = line_num;
        } else {
            pending.push(' ');
            pending.push_str(line.trim());
        }

        if pending.ends_with('\\') {
            pending.truncate(pending.len() - 1);
            pending = pending.trim_end().to_string();
            continue;
        }

        if let Some(caps) = INSTRUCTION_RE.captures(&pending) {
            instructions.push(Instruction {
                keyword: caps[1].to_uppercase(),
                arguments: caps[2].trim().to_string(),
                line: pending_line,
            });
        }
        pending.clear();
        pending_line = 0;
    }

    instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_basic_instructions() {
        let text = "FROM alpine:3.19\nRUN apk add curl\nUSER app\n";
        let parsed = parse(text);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].keyword, "FROM");
        assert_eq!(parsed[2].arguments, "app");
        assert_eq!(parsed[2].line, 3);
    }

    #[test]
    fn skips_comments_and_blanks() {
        let text = "# base image\n\nFROM alpine\n";
        let parsed = parse(text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].line, 3);
    }

    #[test]
    fn joins_backslash_continuations() {
        let text = "RUN apk add \\\n    curl \\\n    jq\n";
        let parsed = parse(text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].keyword, "RUN");
        assert_eq!(parsed[0].arguments, "apk add curl jq");
        assert_eq!(parsed[0].line, 1);
    }

    #[test]
    fn lowercase_keywords_normalized() {
        let parsed = parse("from alpine\n");
        assert_eq!(parsed[0].keyword, "FROM");
    }
}
