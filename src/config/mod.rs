//! Build manifest loading and resolution.
//!
//! # Sections
//!
//! | Field     | Purpose                                            |
//! |-----------|----------------------------------------------------|
//! | `project` | Base name of the bundle files                      |
//! | `js`      | Script roots, libraries, exclusions, output        |
//! | `css`     | Stylesheet roots, exclusions, output               |
//! | `static`  | Files and directories mirrored verbatim            |
//!
//! # Example
//!
//! ```json
//! {
//!     "project": "site",
//!     "js": { "libs": ["lib"], "dirs": ["js"], "removeExpanded": true, "output": "build" },
//!     "css": { "dirs": ["css"], "output": "build" },
//!     "static": [{ "from": "images", "to": "build/images" }]
//! }
//! ```
//!
//! Relative paths are resolved against the manifest's own directory, never the
//! working directory. A manifest ending in `.toml` is read as TOML.

mod assets;
pub mod defaults;
mod error;

pub use assets::{ScriptConfig, StaticMapping, StyleConfig};
pub use error::ConfigError;

use crate::log;
use crate::utils::minify::{INPUT, OUTPUT};
use crate::utils::path::absolutize;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Deserializer};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root manifest structure.
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
pub struct BuildConfig {
    /// Absolute path to the manifest (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory holding the external minifier tools (set after loading)
    #[serde(skip)]
    pub tools: PathBuf,

    /// Base name for output bundles
    #[serde(default = "defaults::project", deserialize_with = "project_or_default")]
    #[educe(Default = defaults::project())]
    pub project: String,

    /// Script settings
    #[serde(default)]
    pub js: ScriptConfig,

    /// Stylesheet settings
    #[serde(default)]
    pub css: StyleConfig,

    /// Verbatim copies
    #[serde(default, rename = "static")]
    pub statics: Vec<StaticMapping>,
}

/// `"project": null` names the default project.
fn project_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(defaults::project))
}

/// Manifest syntax, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

impl BuildConfig {
    /// Read, parse, resolve and validate a manifest.
    ///
    /// `tools` is the external tool directory; unset output directories
    /// default to `<tools>/compiled`.
    pub fn load(path: &Path, tools: &Path) -> Result<Self> {
        let path = absolutize(path);
        let bytes = fs::read(&path).map_err(|err| ConfigError::Io(path.clone(), err))?;
        // Undecodable content is a malformed manifest, not an unreadable one
        let content = std::str::from_utf8(&bytes).map_err(ConfigError::from)?;

        let (mut config, ignored) = Self::parse_with_ignored(content, ManifestFormat::from_path(&path))?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, &path);
        }

        config.resolve(&path, tools);
        config.validate()?;
        Ok(config)
    }

    /// Parse manifest content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str, format: ManifestFormat) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let on_ignored = |path: serde_ignored::Path| ignored.push(path.to_string());

        let config = match format {
            ManifestFormat::Json => {
                let mut deserializer = serde_json::Deserializer::from_str(content);
                let config = serde_ignored::deserialize(&mut deserializer, on_ignored)
                    .map_err(ConfigError::from)?;
                deserializer.end().map_err(ConfigError::from)?;
                config
            }
            ManifestFormat::Toml => {
                let deserializer = toml::Deserializer::new(content);
                serde_ignored::deserialize(deserializer, on_ignored).map_err(ConfigError::from)?
            }
        };

        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Make every path absolute, relative to the manifest's directory.
    pub fn resolve(&mut self, manifest: &Path, tools: &Path) {
        let manifest = absolutize(manifest);
        let base = manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let tools = absolutize(tools);
        let fallback = tools.join(defaults::OUTPUT_DIR);

        assets::resolve_all(&mut self.js.dirs, &base);
        assets::resolve_all(&mut self.js.libs, &base);
        assets::resolve_all(&mut self.js.excludes, &base);
        self.js.output = assets::resolve_output(&self.js.output, &base, &fallback);

        assets::resolve_all(&mut self.css.dirs, &base);
        assets::resolve_all(&mut self.css.excludes, &base);
        self.css.output = assets::resolve_output(&self.css.output, &base, &fallback);

        for mapping in &mut self.statics {
            mapping.from = base.join(&mapping.from);
            mapping.to = base.join(&mapping.to);
        }

        self.config_path = manifest;
        self.tools = tools;
    }

    /// Check the resolved configuration.
    pub fn validate(&self) -> Result<()> {
        let project = self.project.trim();
        if project.is_empty() {
            bail!(ConfigError::Validation("[project] must not be empty".into()));
        }
        if project.contains(['/', '\\']) {
            bail!(ConfigError::Validation(
                "[project] must be a file name, not a path".into()
            ));
        }

        Self::check_command("[js.minifier]", &self.js.minifier)?;
        Self::check_command("[css.minifier]", &self.css.minifier)?;
        Ok(())
    }

    /// A minifier command needs a program and both file placeholders.
    fn check_command(field: &str, command: &[String]) -> Result<()> {
        if command.is_empty() {
            bail!(ConfigError::Validation(format!(
                "{field} must have at least one element"
            )));
        }

        for placeholder in [INPUT, OUTPUT] {
            if !command.iter().any(|arg| arg.contains(placeholder)) {
                bail!(ConfigError::Validation(format!(
                    "{field} must reference {placeholder}"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
