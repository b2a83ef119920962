pub mod console;
pub mod json;
pub mod markdown;

use serde::{Deserialize, Serialize};

use crate::config::PolicyVerdict;
use crate::engine::ScanStats;
use crate::error::Result;
use crate::rules::Finding;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            "markdown" | "md" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Everything a renderer needs about one scan run.
pub struct ReportContext<'a> {
    pub scan_path: &'a str,
    pub findings: &'a [Finding],
    pub verdict: &'a PolicyVerdict,
    pub stats: &'a ScanStats,
}

/// Render findings into the specified format.
pub fn render(ctx: &ReportContext<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Console => Ok(console::render(ctx)),
        OutputFormat::Json => json::render(ctx),
        OutputFormat::Markdown => Ok(markdown::render(ctx)),
    }
}
