//! Bundle minification through external tools.
//!
//! A [`Minifier`] turns one bundle file into its minified counterpart. The
//! shipped implementation, [`ExternalMinifier`], runs a configured command
//! line such as the Closure Compiler or YUI Compressor jars:
//!
//! ```ignore
//! let minifier = ExternalMinifier::new("js", config.js.minifier.clone(), &config.tools);
//! let status = minifier.minify(&bundle, &minified)?;
//! ```

use crate::error::BuildError;
use crate::utils::exec::{Cmd, FilterRule, SILENT_FILTER};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Replaced by the bundle path.
pub const INPUT: &str = "{input}";
/// Replaced by the minified output path.
pub const OUTPUT: &str = "{output}";
/// Replaced by the external tool directory.
pub const TOOLS: &str = "{tools}";

/// Closure Compiler warning noise that is not worth forwarding.
const JAVA_FILTER: FilterRule = FilterRule::new(&["Picked up JAVA_TOOL_OPTIONS", "WARNING:"]);

/// Minifies a single file.
pub trait Minifier: Send + Sync {
    /// Name used in log lines and error messages.
    fn name(&self) -> &str;

    /// Minify `input` into `output`, creating the output's parent directories.
    ///
    /// Returns the tool's exit status: `0` is success. `Err` means the tool
    /// could not be run at all.
    fn minify(&self, input: &Path, output: &Path) -> Result<i32>;
}

/// Runs a command line with `{input}`, `{output}` and `{tools}` placeholders.
#[derive(Debug, Clone)]
pub struct ExternalMinifier {
    name: String,
    command: Vec<String>,
    tools: PathBuf,
    filter: &'static FilterRule,
}

impl ExternalMinifier {
    pub fn new(name: impl Into<String>, command: Vec<String>, tools: &Path) -> Self {
        Self {
            name: name.into(),
            command,
            tools: tools.to_path_buf(),
            filter: &JAVA_FILTER,
        }
    }

    /// Drop the tool's own output from the log.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.filter = if quiet { &SILENT_FILTER } else { &JAVA_FILTER };
        self
    }

    /// Forward every line the tool prints.
    #[cfg(test)]
    fn verbose(mut self) -> Self {
        self.filter = &crate::utils::exec::EMPTY_FILTER;
        self
    }

    /// Substitute placeholders in every argument.
    fn resolve_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let output = output.to_string_lossy();
        let tools = self.tools.to_string_lossy();
        self.command
            .iter()
            .map(|arg| {
                arg.replace(INPUT, &input)
                    .replace(OUTPUT, &output)
                    .replace(TOOLS, &tools)
            })
            .collect()
    }

    /// Bare program names go through `PATH`; anything with a separator is
    /// taken as given.
    fn check_program(program: &str) -> Result<()> {
        let bare = !program.contains(['/', '\\']);
        if bare && which::which(program).is_err() {
            return Err(BuildError::ToolMissing {
                program: program.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Minifier for ExternalMinifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn minify(&self, input: &Path, output: &Path) -> Result<i32> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let args = self.resolve_args(input, output);
        let program = args.first().map(String::as_str).unwrap_or_default();
        Self::check_program(program)?;

        let mut cmd = Cmd::from_slice(&args).filter(self.filter);
        if self.tools.is_dir() {
            cmd = cmd.cwd(&self.tools);
        }
        let output = cmd
            .run()
            .with_context(|| format!("Failed to run {} minifier", self.name))?;

        output.status.code().ok_or_else(|| {
            BuildError::ToolTerminated {
                tool: program.to_string(),
            }
            .into()
        })
    }
}
