//! `js`, `css` and `static` manifest sections.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

// ============================================================================
// Script Section
// ============================================================================

/// `js` section - script discovery and bundling.
///
/// # Example
/// ```json
/// "js": {
///     "libs": ["vendor/jquery.js", "vendor/plugins"],
///     "dirs": ["src"],
///     "excludes": ["src/debug.js"],
///     "removeExpanded": true,
///     "output": "public/js"
/// }
/// ```
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ScriptConfig {
    /// General source roots.
    #[serde(deserialize_with = "nullable")]
    pub dirs: Vec<PathBuf>,

    /// Library roots, walked before `dirs`; their order is load order.
    #[serde(deserialize_with = "nullable")]
    pub libs: Vec<PathBuf>,

    /// Files and directories never bundled.
    #[serde(deserialize_with = "nullable")]
    pub excludes: Vec<PathBuf>,

    /// Delete `<project>.js` once `<project>.min.js` is written.
    #[serde(default = "defaults::r#false", deserialize_with = "nullable")]
    #[educe(Default = false)]
    pub remove_expanded: bool,

    /// Output directory; empty means `<tools>/compiled`.
    #[serde(deserialize_with = "nullable")]
    pub output: PathBuf,

    /// Minifier command with `{input}`, `{output}` and `{tools}` placeholders.
    #[serde(default = "defaults::js::minifier")]
    #[educe(Default = defaults::js::minifier())]
    pub minifier: Vec<String>,
}

// ============================================================================
// Stylesheet Section
// ============================================================================

/// `css` section - stylesheet discovery and bundling.
///
/// Same shape as [`ScriptConfig`] without library roots: stylesheet order
/// is not significant.
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleConfig {
    /// Source roots.
    #[serde(deserialize_with = "nullable")]
    pub dirs: Vec<PathBuf>,

    /// Files and directories never bundled.
    #[serde(deserialize_with = "nullable")]
    pub excludes: Vec<PathBuf>,

    /// Delete `<project>.css` once `<project>.min.css` is written.
    #[serde(default = "defaults::r#false", deserialize_with = "nullable")]
    #[educe(Default = false)]
    pub remove_expanded: bool,

    /// Output directory; empty means `<tools>/compiled`.
    #[serde(deserialize_with = "nullable")]
    pub output: PathBuf,

    /// Minifier command with `{input}`, `{output}` and `{tools}` placeholders.
    #[serde(default = "defaults::css::minifier")]
    #[educe(Default = defaults::css::minifier())]
    pub minifier: Vec<String>,
}

// ============================================================================
// Static Mappings
// ============================================================================

/// One `static` entry: copy `from` verbatim to `to`.
///
/// Both may name a directory (mirrored recursively) or a single file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StaticMapping {
    pub from: PathBuf,
    pub to: PathBuf,
}

// ============================================================================
// Null Handling
// ============================================================================

/// Read an explicit `null` as the type's default, the same as an absent key.
pub(super) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Path Resolution
// ============================================================================

/// Resolve every entry against `base`; absolute entries stay as they are.
pub(super) fn resolve_all(paths: &mut [PathBuf], base: &Path) {
    for path in paths {
        *path = base.join(&*path);
    }
}

/// Resolve an output directory, falling back to `fallback` when unset.
pub(super) fn resolve_output(output: &Path, base: &Path, fallback: &Path) -> PathBuf {
    if output.as_os_str().is_empty() {
        fallback.to_path_buf()
    } else {
        base.join(output)
    }
}
