//! Build failures and their process exit codes.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Wrong command-line usage.
pub const EXIT_USAGE: u8 = 1;
/// Manifest could not be read.
pub const EXIT_CONFIG_IO: u8 = 2;
/// Manifest could not be parsed or failed validation.
pub const EXIT_CONFIG_PARSE: u8 = 3;
/// Filesystem failure while combining, copying or cleaning up.
pub const EXIT_IO: u8 = 4;
/// External tool could not be launched or ended without a usable status.
pub const EXIT_TOOL: u8 = 5;

/// Pipeline failures that carry their own exit status.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("`{tool}` exited with status {code}")]
    ToolFailed { tool: String, code: i32 },

    #[error("`{tool}` was terminated before reporting an exit status")]
    ToolTerminated { tool: String },

    #[error("`{program}` not found. Please install it first.")]
    ToolMissing { program: String },

    #[error("`{}` is not inside mirrored root `{}`", path.display(), root.display())]
    PrefixMismatch { root: PathBuf, path: PathBuf },
}

impl BuildError {
    pub fn exit_code(&self) -> u8 {
        match self {
            // Pass the tool's status through when the process can express it.
            Self::ToolFailed { code, .. } => u8::try_from(*code)
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(EXIT_TOOL),
            Self::ToolTerminated { .. } | Self::ToolMissing { .. } => EXIT_TOOL,
            Self::PrefixMismatch { .. } => EXIT_IO,
        }
    }
}

/// Map a failed run to the process exit code.
///
/// The first typed cause in the error chain decides; anything untyped is an
/// I/O failure.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<BuildError>() {
            return err.exit_code();
        }
        if let Some(err) = cause.downcast_ref::<ConfigError>() {
            return err.exit_code();
        }
    }
    EXIT_IO
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_tool_status_passes_through() {
        let err = BuildError::ToolFailed {
            tool: "java".into(),
            code: 2,
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_tool_status_out_of_range() {
        for code in [256, -1, 0] {
            let err = BuildError::ToolFailed {
                tool: "java".into(),
                code,
            };
            assert_eq!(err.exit_code(), EXIT_TOOL);
        }
    }

    #[test]
    fn test_exit_code_through_context() {
        let err = anyhow::Error::new(BuildError::ToolFailed {
            tool: "java".into(),
            code: 7,
        })
        .context("js phase failed");
        assert_eq!(exit_code(&err), 7);
    }

    #[test]
    fn test_exit_code_config() {
        let err: anyhow::Error = ConfigError::Validation("bad".into()).into();
        assert_eq!(exit_code(&err), EXIT_CONFIG_PARSE);
    }

    #[test]
    fn test_exit_code_untyped_is_io() {
        let err = std::fs::read("/definitely/missing/file")
            .context("reading")
            .unwrap_err();
        assert_eq!(exit_code(&err), EXIT_IO);
    }

    #[test]
    fn test_error_display() {
        let err = BuildError::ToolMissing {
            program: "java".into(),
        };
        assert_eq!(err.to_string(), "`java` not found. Please install it first.");
    }
}
