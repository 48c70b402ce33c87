//! Command-line interface definitions.

use anyhow::{Context, Result};
use clap::Parser;
use std::{env, path::PathBuf};

/// JavaScript and CSS bundle compiler
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Build manifest (JSON, or TOML when it ends in `.toml`)
    pub manifest: PathBuf,

    /// Directory holding the minifier jars [default: directory of this executable]
    #[arg(short, long)]
    pub tools: Option<PathBuf>,

    /// Only print warnings, errors and the final result
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// External tool directory: `--tools`, or wherever this executable lives.
    pub fn tools_dir(&self) -> Result<PathBuf> {
        if let Some(tools) = &self.tools {
            return Ok(tools.clone());
        }
        let exe = env::current_exe().context("Failed to locate the running executable")?;
        Ok(exe.parent().map(PathBuf::from).unwrap_or_default())
    }
}

/// Describe the manifest structure, printed alongside usage and manifest errors.
pub fn manifest_help() -> &'static str {
    r#"The manifest is a JSON file accepting the following structure:
{
    "project": string = "project",
    "js": {
        "dirs":           [path] = [],
        "libs":           [path] = [],
        "excludes":       [path] = [],
        "removeExpanded": bool = false,
        "output":         path = "<tools>/compiled",
        "minifier":       [string] = Closure Compiler
    },
    "css": {
        "dirs":           [path] = [],
        "excludes":       [path] = [],
        "removeExpanded": bool = false,
        "output":         path = "<tools>/compiled",
        "minifier":       [string] = YUI Compressor
    },
    "static": [{ "from": path, "to": path }] = []
}
Relative paths are resolved against the manifest's directory."#
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, error::ErrorKind};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_manifest_and_flags() {
        let cli = Cli::try_parse_from(["bundle-compiler", "-q", "--tools", "/opt/jars", "site.json"])
            .unwrap();
        assert_eq!(cli.manifest, PathBuf::from("site.json"));
        assert!(cli.quiet);
        assert_eq!(cli.tools_dir().unwrap(), PathBuf::from("/opt/jars"));
    }

    #[test]
    fn test_manifest_required() {
        let err = Cli::try_parse_from(["bundle-compiler"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_extra_argument_rejected() {
        let err = Cli::try_parse_from(["bundle-compiler", "a.json", "b.json"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_tools_default_to_executable_dir() {
        let cli = Cli::try_parse_from(["bundle-compiler", "site.json"]).unwrap();
        let exe = env::current_exe().unwrap();
        assert_eq!(cli.tools_dir().unwrap(), exe.parent().unwrap());
    }

    #[test]
    fn test_manifest_help_mentions_every_section() {
        let help = manifest_help();
        for key in ["project", "js", "css", "static", "libs", "removeExpanded"] {
            assert!(help.contains(key), "missing {key}");
        }
    }
}
