//! External command execution utilities.
//!
//! Provides a builder for running external tools with output filtering.
//! Unlike a plain `Command`, a non-zero exit status is NOT turned into an
//! error: callers need the status itself to pass it through.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::from_slice(&["java", "-jar", "closure_compiler.jar", "--js=bundle.js"])
//!     .cwd(tools)
//!     .filter(&SILENT_FILTER)
//!     .run()?;
//! if !output.status.success() { /* ... */ }
//! ```

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Output},
    sync::OnceLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create from a command array (e.g., `["java", "-jar", "tool.jar"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Get the program name for log prefixes and error messages.
    pub fn program_name(&self) -> String {
        Path::new(&self.program)
            .file_stem()
            .unwrap_or(&self.program)
            .to_string_lossy()
            .into_owned()
    }

    /// Run to completion and return the captured output.
    ///
    /// On success, stderr (warnings) is logged through the filter. On
    /// failure, the filtered error text is logged. Either way the caller
    /// decides what the exit status means.
    ///
    /// # Errors
    /// Returns error only if the process cannot be started or waited on.
    pub fn run(self) -> Result<Output> {
        if self.program.is_empty() {
            anyhow::bail!("Empty command");
        }

        let name = self.program_name();
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .with_context(|| format!("Failed to execute `{name}`"))?;

        if output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            filter.log(&name, stderr.trim());
        } else if !filter.is_silent() {
            log!("error"; "{}", format_error(&name, &output, filter));
        }

        Ok(output)
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// Filter rule for skipping entire output blocks or specific prefixes.
///
/// Used to reduce noise in command output logging by ignoring known warnings
/// or irrelevant messages.
#[derive(Debug)]
pub struct FilterRule {
    /// Prefixes to match at the start of output lines.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule with the given prefixes.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    ///
    /// Returns true if the line is empty or starts with any of the skip prefixes.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// An empty prefix matches every line.
    fn is_silent(&self) -> bool {
        self.skip_prefixes.contains(&"")
    }

    /// Lines of `output` that pass the filter, ANSI codes included.
    fn visible_lines<'a>(&self, output: &'a str) -> Vec<&'a str> {
        output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                let trimmed = plain.trim();
                !trimmed.is_empty() && !self.should_skip(trimmed)
            })
            .collect()
    }

    /// Log output lines if not skipped.
    fn log(&self, name: &str, output: &str) {
        let lines = self.visible_lines(output);
        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Stdout filter: skip bulk machine output.
const STDOUT_FILTER: FilterRule = FilterRule::new(&["{", "/*"]);

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Silent filter: skip all output.
pub const SILENT_FILTER: FilterRule = FilterRule::new(&[""]);

/// Format command error message with filtering.
fn format_error(name: &str, output: &Output, filter: &FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("`{name}` failed with {}", output.status);

    let error_lines = filter.visible_lines(&stderr);
    if !error_lines.is_empty() {
        msg.push('\n');
        msg.push_str(&error_lines.join("\n"));
    }

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() && !STDOUT_FILTER.should_skip(stdout_trimmed) {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout_trimmed);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice() {
        let cmd = Cmd::from_slice(&["java", "-jar", "tool.jar"]);
        assert_eq!(cmd.program, OsString::from("java"));
        assert_eq!(cmd.args, [OsString::from("-jar"), OsString::from("tool.jar")]);
    }

    #[test]
    fn test_program_name_strips_directory() {
        assert_eq!(Cmd::from_slice(&["/usr/bin/java"]).program_name(), "java");
        assert_eq!(Cmd::from_slice(&["java", "-jar"]).program_name(), "java");
    }

    #[test]
    fn test_empty_command() {
        let empty: [&str; 0] = [];
        assert!(Cmd::from_slice(&empty).run().is_err());
    }

    #[test]
    fn test_missing_program() {
        let result = Cmd::from_slice(&["definitely-not-a-real-program-xyz"]).run();
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_status_is_returned() {
        let output = Cmd::from_slice(&["sh", "-c", "exit 3"])
            .filter(&SILENT_FILTER)
            .run()
            .unwrap();
        assert_eq!(output.status.code(), Some(3));
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["WARN:", "INFO:"]);

        assert!(filter.should_skip("WARN: something"));
        assert!(filter.should_skip("INFO: something"));
        assert!(!filter.should_skip("ERROR: something"));
        assert!(filter.should_skip(""));
        assert!(!filter.is_silent());
        assert!(SILENT_FILTER.is_silent());
    }

    #[test]
    fn test_visible_lines() {
        let filter = FilterRule::new(&["WARNING"]);
        let lines = filter.visible_lines("WARNING x\n\nerror: y\n  \n\x1b[33mWARNING z\x1b[0m");
        assert_eq!(lines, ["error: y"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_format_error() {
        let status = Command::new("false").status().unwrap();

        static TEST_FILTER: FilterRule = FilterRule::new(&["Ignored:"]);
        let output = Output {
            status,
            stdout: b"partial result".to_vec(),
            stderr: b"Ignored: warning\nFatal error".to_vec(),
        };
        let msg = format_error("test", &output, &TEST_FILTER);

        assert!(msg.starts_with("`test` failed"));
        assert!(msg.contains("Fatal error"));
        assert!(!msg.contains("Ignored"));
        assert!(msg.contains("Stdout:\npartial result"));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("\x1b[1;32mGreen Bold\x1b[0m"), "Green Bold");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
        assert_eq!(
            strip_ansi("Start \x1b[33mYellow\x1b[0m End"),
            "Start Yellow End"
        );
    }
}
