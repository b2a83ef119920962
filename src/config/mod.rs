//! Configuration loaded from `.codesentinel.toml`.

pub mod policy;

pub use policy::{Policy, PolicyVerdict};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration from `.codesentinel.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Worker threads; 0 means one per logical CPU.
    #[serde(default)]
    pub threads: usize,
    /// Wall-clock budget per rule per file, in milliseconds.
    #[serde(default = "default_rule_budget_ms")]
    pub rule_budget_ms: u64,
    /// Files larger than this are skipped, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_rule_budget_ms() -> u64 {
    2000
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            rule_budget_ms: default_rule_budget_ms(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl ScanConfig {
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# CodeSentinel configuration

[policy]
# Minimum severity to fail the scan (low, medium, high, critical).
fail_on = "high"

# Rule IDs to ignore entirely.
# ignore_rules = ["SECRET_HIGH_ENTROPY"]

# Per-rule severity overrides.
# [policy.overrides]
# "CONFIG_DEBUG_ENABLED" = "low"

[scan]
# Worker threads; 0 uses one per logical CPU.
threads = 0

# Per-rule wall-clock budget per file, in milliseconds.
rule_budget_ms = 2000
"#
    }
}
