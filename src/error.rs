use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Missing configuration value: {0}")]
    ConfigMissing(String),

    #[error("Invalid profile: {0:?}")]
    InvalidProfile(String),

    #[error("External tool failed ({command}): {message}")]
    Tool { command: String, message: String },

    #[error("Alias update incomplete: {0}")]
    Alias(String),

    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Result document error in {file}: {message}")]
    ResultDocument { file: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ScanError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
