//! Source file records and collection.
//!
//! The engine core consumes ready-made `SourceFile` records; it never walks
//! the filesystem itself. `collect_files` is the thin gitignore-aware
//! collector used by the CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Programming language of a source file, detected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Shell,
    Json,
    Toml,
    Yaml,
    Ini,
    Env,
    Hcl,
    Dockerfile,
    Markdown,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" => Self::Python,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            "sh" | "bash" | "zsh" => Self::Shell,
            "json" => Self::Json,
            "toml" => Self::Toml,
            "yml" | "yaml" => Self::Yaml,
            "ini" | "cfg" | "conf" => Self::Ini,
            "env" => Self::Env,
            "tf" | "tfvars" | "hcl" => Self::Hcl,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }
}

/// Structural category of a file, used to pick the structure-aware parser
/// and to scope the specialized misconfiguration rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Dockerfile,
    Workflow,
    Hcl,
    PackageManifest,
    Plain,
}

/// One file handed to the scan engine: path, full text, and detected
/// language/kind. The engine never re-reads the path.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    pub language: Language,
    pub kind: FileKind,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let language = detect_language(&path);
        let kind = detect_kind(&path);
        Self {
            path,
            content: content.into(),
            language,
            kind,
        }
    }
}

pub fn detect_language(path: &Path) -> Language {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name == "Dockerfile" || name.starts_with("Dockerfile.") {
        return Language::Dockerfile;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(Language::from_extension)
        .unwrap_or(Language::Unknown)
}

pub fn detect_kind(path: &Path) -> FileKind {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name == "Dockerfile" || name.starts_with("Dockerfile.") {
        return FileKind::Dockerfile;
    }
    if name == "package.json" {
        return FileKind::PackageManifest;
    }
    match detect_language(path) {
        Language::Hcl => FileKind::Hcl,
        Language::Yaml if is_workflow_path(path) => FileKind::Workflow,
        _ => FileKind::Plain,
    }
}

fn is_workflow_path(path: &Path) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    normalized.contains(".github/workflows/")
}

/// Collect scannable files under `root`, honoring gitignore rules and
/// skipping binaries and oversized files. Unreadable entries are logged
/// and skipped, never fatal.
pub fn collect_files(root: &Path, max_file_size: u64) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    let walker = ignore::WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "walk entry skipped");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();

        if let Ok(meta) = entry.metadata() {
            if meta.len() > max_file_size {
                tracing::debug!(file = %path.display(), size = meta.len(), "oversized file skipped");
                continue;
            }
        }

        match std::fs::read(path) {
            Ok(bytes) => {
                if looks_binary(&bytes) {
                    continue;
                }
                let content = String::from_utf8_lossy(&bytes).into_owned();
                files.push(SourceFile::new(path, content));
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "unreadable file skipped");
            }
        }
    }

    Ok(files)
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(1024).any(|&b| b == 0)
}
