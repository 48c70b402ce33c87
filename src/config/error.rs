//! Configuration error types.

use crate::error::{EXIT_CONFIG_IO, EXIT_CONFIG_PARSE};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Manifest is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("Manifest parsing error")]
    Json(#[from] serde_json::Error),

    #[error("Manifest parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Manifest validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Io(..) => EXIT_CONFIG_IO,
            Self::Encoding(_) | Self::Json(_) | Self::Toml(_) | Self::Validation(_) => {
                EXIT_CONFIG_PARSE
            }
        }
    }
}
