//! Structure-aware parsers.
//!
//! Each parser extracts only the structural facts specific rule families
//! need; none of them is a full grammar. Parse failures never abort a
//! scan: the file is skipped for structure-dependent rules while text
//! rules still run against its raw content.

pub mod dockerfile;
pub mod hcl;
pub mod manifest;
pub mod yaml;

use crate::error::{Result, SentinelError};
use crate::source::{FileKind, SourceFile};

/// Structure extracted from one file, keyed by its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStructure {
    Dockerfile(Vec<dockerfile::Instruction>),
    Workflow(yaml::YamlDoc),
    Hcl(Vec<hcl::HclBlock>),
    Manifest(manifest::Manifest),
}

/// Run the parser applicable to the file's kind. `Ok(None)` means the file
/// has no structure-aware parser (plain text); `Err` means the applicable
/// parser rejected the content.
pub fn parse(file: &SourceFile) -> Result<Option<ParsedStructure>> {
    let parse_err = |message: String| SentinelError::Parse {
        file: file.path.display().to_string(),
        message,
    };

    match file.kind {
        FileKind::Dockerfile => Ok(Some(ParsedStructure::Dockerfile(dockerfile::parse(
            &file.content,
        )))),
        FileKind::Workflow => yaml::parse(&file.content)
            .map(|doc| Some(ParsedStructure::Workflow(doc)))
            .map_err(parse_err),
        FileKind::Hcl => hcl::parse(&file.content)
            .map(|blocks| Some(ParsedStructure::Hcl(blocks)))
            .map_err(parse_err),
        FileKind::PackageManifest => manifest::Manifest::parse(&file.content)
            .map(|m| Some(ParsedStructure::Manifest(m)))
            .map_err(parse_err),
        FileKind::Plain => Ok(None),
    }
}
