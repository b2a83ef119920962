use thiserror::Error;

pub type Result<T> = std::result::Result<T, SentinelError>;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Rule discovery error in set '{set}': {message}")]
    Discovery { set: String, message: String },

    #[error("Rule '{rule_id}' exceeded its time budget on {file}")]
    RuleTimeout { rule_id: String, file: String },

    #[error("Fatal configuration error: {0}")]
    FatalConfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SentinelError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
