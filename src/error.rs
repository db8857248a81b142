use thiserror::Error;

use crate::util::{CommandError, FileError};

#[derive(Debug, Error)]
pub enum GlueError {
    #[error("Invalid {option} option: \"{value}\". Valid options: [\"clean\", \"minified\", \"both\"].")]
    Configuration { option: &'static str, value: String },

    #[error("Path contract error: {0}")]
    PathContract(String),

    #[error("Bundle error: {0}")]
    Bundle(String),

    #[error("Stage error: {0}")]
    Stage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GlueError>;
