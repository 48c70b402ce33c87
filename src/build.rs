//! Build orchestration.
//!
//! Runs the asset classes and the static mirror in a fixed order.
//!
//! # Architecture
//!
//! ```text
//! Pipeline::run()
//!     │
//!     ├── Scripts: walk(libs) ++ walk(dirs) ──► first-seen dedupe
//!     │       └── combine ──► <project>.js ──► minify ──► <project>.min.js
//!     │
//!     ├── Styles:  walk(dirs) ──► sorted dedupe
//!     │       └── combine ──► <project>.css ──► minify ──► <project>.min.css
//!     │
//!     └── Statics: plan_mapping() ──► copy_jobs()   (one mapping at a time)
//! ```
//!
//! Each phase finishes its writes before the next one starts. The first
//! failure aborts the build; files already written stay where they are.

use crate::{
    compiler::{
        Exclusions, FileType, Uniqueness, combine_files, copy_jobs, plan_mapping, walk,
    },
    config::BuildConfig,
    error::BuildError,
    log,
    logger::ProgressBars,
    utils::minify::{ExternalMinifier, Minifier},
};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

// ============================================================================
// Phases
// ============================================================================

/// Build phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scripts,
    Styles,
    Statics,
}

impl Phase {
    /// Log prefix for this phase.
    pub const fn module(self) -> &'static str {
        match self {
            Self::Scripts => "js",
            Self::Styles => "css",
            Self::Statics => "static",
        }
    }
}

/// Everything one bundling phase needs, borrowed from the config.
struct AssetClass<'a> {
    phase: Phase,
    ext: &'static str,
    libs: &'a [PathBuf],
    dirs: &'a [PathBuf],
    excludes: &'a [PathBuf],
    output: &'a Path,
    remove_expanded: bool,
    uniqueness: Uniqueness,
}

// ============================================================================
// Reports
// ============================================================================

/// Outcome of one bundling phase that found files.
#[derive(Debug, Clone)]
pub struct BundleReport {
    /// Number of files concatenated
    pub files: usize,
    /// Minifier output
    pub minified: PathBuf,
}

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub elapsed: Duration,
    /// `None` when no script was found.
    pub scripts: Option<BundleReport>,
    /// `None` when no stylesheet was found.
    pub styles: Option<BundleReport>,
    /// Files copied by the static mirror
    pub copied: usize,
}

// ============================================================================
// Pipeline
// ============================================================================

/// One build over a loaded manifest.
pub struct Pipeline<'a> {
    config: &'a BuildConfig,
    scripts: Box<dyn Minifier>,
    styles: Box<dyn Minifier>,
}

impl<'a> Pipeline<'a> {
    /// Pipeline using the manifest's external minifier commands.
    pub fn new(config: &'a BuildConfig, quiet: bool) -> Self {
        let scripts = ExternalMinifier::new(
            Phase::Scripts.module(),
            config.js.minifier.clone(),
            &config.tools,
        )
        .quiet(quiet);
        let styles = ExternalMinifier::new(
            Phase::Styles.module(),
            config.css.minifier.clone(),
            &config.tools,
        )
        .quiet(quiet);
        Self::with_minifiers(config, Box::new(scripts), Box::new(styles))
    }

    /// Pipeline with caller-provided minifiers.
    pub fn with_minifiers(
        config: &'a BuildConfig,
        scripts: Box<dyn Minifier>,
        styles: Box<dyn Minifier>,
    ) -> Self {
        Self {
            config,
            scripts,
            styles,
        }
    }

    /// Run every phase in order.
    pub fn run(&self) -> Result<BuildReport> {
        let start = Instant::now();

        let scripts = self
            .bundle(&self.script_class(), self.scripts.as_ref())
            .with_context(|| format!("[{}] build failed", Phase::Scripts.module()))?;
        let styles = self
            .bundle(&self.style_class(), self.styles.as_ref())
            .with_context(|| format!("[{}] build failed", Phase::Styles.module()))?;
        let copied = self
            .mirror()
            .with_context(|| format!("[{}] copy failed", Phase::Statics.module()))?;

        Ok(BuildReport {
            elapsed: start.elapsed(),
            scripts,
            styles,
            copied,
        })
    }

    fn script_class(&self) -> AssetClass<'_> {
        let js = &self.config.js;
        AssetClass {
            phase: Phase::Scripts,
            ext: "js",
            libs: &js.libs,
            dirs: &js.dirs,
            excludes: &js.excludes,
            output: &js.output,
            remove_expanded: js.remove_expanded,
            uniqueness: Uniqueness::FirstSeen,
        }
    }

    fn style_class(&self) -> AssetClass<'_> {
        let css = &self.config.css;
        AssetClass {
            phase: Phase::Styles,
            ext: "css",
            libs: &[],
            dirs: &css.dirs,
            excludes: &css.excludes,
            output: &css.output,
            remove_expanded: css.remove_expanded,
            uniqueness: Uniqueness::Sorted,
        }
    }

    /// Discover, combine and minify one asset class.
    ///
    /// Returns `None` when nothing was found; combining and minifying are
    /// skipped in that case.
    fn bundle(&self, class: &AssetClass, minifier: &dyn Minifier) -> Result<Option<BundleReport>> {
        let module = class.phase.module();
        let project = &self.config.project;
        let bundle = class.output.join(format!("{project}.{}", class.ext));
        let minified = class.output.join(format!("{project}.min.{}", class.ext));

        // Output from an earlier run must not be folded into this one
        let mut exclusions = Exclusions::new(class.excludes);
        exclusions.insert(&bundle);
        exclusions.insert(&minified);

        let file_type = FileType::new(class.ext);
        let libs = walk(class.libs, &file_type, &exclusions)?;
        let dirs = walk(class.dirs, &file_type, &exclusions)?;
        let files = class.uniqueness.apply(libs.into_iter().chain(dirs));

        if files.is_empty() {
            log!(module; "no .{} files found", class.ext);
            return Ok(None);
        }

        log!(module; "found {} files, combining into {}", files.len(), bundle.display());
        combine_files(&files, &bundle)?;

        log!(module; "minifying into {}", minified.display());
        let status = minifier.minify(&bundle, &minified)?;
        if status != 0 {
            return Err(BuildError::ToolFailed {
                tool: format!("{} minifier", minifier.name()),
                code: status,
            }
            .into());
        }

        if class.remove_expanded {
            fs::remove_file(&bundle)
                .with_context(|| format!("Failed to remove {}", bundle.display()))?;
        }

        log!(module; "complete");
        Ok(Some(BundleReport {
            files: files.len(),
            minified,
        }))
    }

    /// Copy every static mapping, one mapping at a time.
    fn mirror(&self) -> Result<usize> {
        let module = Phase::Statics.module();
        let mut copied = 0;

        for mapping in &self.config.statics {
            log!(module; "copying {}", mapping.from.display());
            let jobs = plan_mapping(mapping)?;

            let progress = ProgressBars::new_filtered(&[(module, jobs.len())]);
            copy_jobs(&jobs, |_| {
                if let Some(progress) = &progress {
                    progress.inc(0);
                }
            })?;
            copied += jobs.len();
        }

        if !self.config.statics.is_empty() {
            log!(module; "complete, {} files", copied);
        }
        Ok(copied)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticMapping;
    use crate::error::exit_code;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    type Calls = Arc<Mutex<Vec<(PathBuf, PathBuf)>>>;

    /// In-process minifier: copies input to output and records the call.
    struct Recording {
        name: &'static str,
        status: i32,
        calls: Calls,
    }

    impl Recording {
        fn new(name: &'static str, status: i32) -> (Box<dyn Minifier>, Calls) {
            let calls = Calls::default();
            let minifier = Self {
                name,
                status,
                calls: Arc::clone(&calls),
            };
            (Box::new(minifier), calls)
        }
    }

    impl Minifier for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn minify(&self, input: &Path, output: &Path) -> Result<i32> {
            self.calls
                .lock()
                .unwrap()
                .push((input.to_path_buf(), output.to_path_buf()));
            fs::create_dir_all(output.parent().unwrap())?;
            fs::copy(input, output)?;
            Ok(self.status)
        }
    }

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(root: &Path) -> BuildConfig {
        let mut config = BuildConfig::default();
        config.project = "site".into();
        config.js.output = root.join("out");
        config.css.output = root.join("out");
        config
    }

    fn run(config: &BuildConfig, js_status: i32) -> (Result<BuildReport>, Calls, Calls) {
        let (js, js_calls) = Recording::new("js", js_status);
        let (css, css_calls) = Recording::new("css", 0);
        let result = Pipeline::with_minifiers(config, js, css).run();
        (result, js_calls, css_calls)
    }

    #[test]
    fn test_end_to_end() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("lib/a.js"), "A");
        touch(&root.join("src/sub/b.js"), "B");
        touch(&root.join("css/y.css"), "y{}");
        touch(&root.join("css/x.css"), "x{}");
        touch(&root.join("img/logo.png"), "png");

        let mut config = config(root);
        config.js.libs = vec![root.join("lib")];
        config.js.dirs = vec![root.join("src")];
        config.css.dirs = vec![root.join("css")];
        config.statics = vec![StaticMapping {
            from: root.join("img"),
            to: root.join("out/img"),
        }];

        let (result, js_calls, css_calls) = run(&config, 0);
        let report = result.unwrap();

        assert_eq!(fs::read_to_string(root.join("out/site.js")).unwrap(), "A\nB\n");
        assert_eq!(fs::read_to_string(root.join("out/site.min.js")).unwrap(), "A\nB\n");
        assert_eq!(fs::read_to_string(root.join("out/site.css")).unwrap(), "x{}\ny{}\n");
        assert_eq!(fs::read_to_string(root.join("out/img/logo.png")).unwrap(), "png");

        assert_eq!(
            *js_calls.lock().unwrap(),
            [(root.join("out/site.js"), root.join("out/site.min.js"))]
        );
        assert_eq!(css_calls.lock().unwrap().len(), 1);

        let scripts = report.scripts.unwrap();
        assert_eq!(scripts.files, 2);
        assert_eq!(scripts.minified, root.join("out/site.min.js"));
        assert_eq!(report.styles.unwrap().files, 2);
        assert_eq!(report.copied, 1);
    }

    #[test]
    fn test_remove_expanded() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("lib/a.js"), "A");
        touch(&root.join("src/sub/b.js"), "B");

        let mut config = config(root);
        config.js.libs = vec![root.join("lib")];
        config.js.dirs = vec![root.join("src")];
        config.js.remove_expanded = true;

        let (result, _, _) = run(&config, 0);
        result.unwrap();

        assert!(!root.join("out/site.js").exists());
        assert_eq!(fs::read_to_string(root.join("out/site.min.js")).unwrap(), "A\nB\n");
    }

    #[test]
    fn test_empty_class_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("src/readme.txt"), "not a script");

        let mut config = config(root);
        config.js.dirs = vec![root.join("src"), root.join("missing")];

        let (result, js_calls, css_calls) = run(&config, 0);
        let report = result.unwrap();

        assert!(report.scripts.is_none());
        assert!(report.styles.is_none());
        assert!(js_calls.lock().unwrap().is_empty());
        assert!(css_calls.lock().unwrap().is_empty());
        assert!(!root.join("out").exists());
    }

    #[test]
    fn test_libraries_come_first() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("src/app.js"), "app");
        touch(&root.join("src/vendor/jquery.js"), "jquery");

        // The library also lives under a general root; it is bundled once, first.
        let mut config = config(root);
        config.js.libs = vec![root.join("src/vendor/jquery.js")];
        config.js.dirs = vec![root.join("src")];

        let (result, _, _) = run(&config, 0);
        assert_eq!(result.unwrap().scripts.unwrap().files, 2);
        assert_eq!(
            fs::read_to_string(root.join("out/site.js")).unwrap(),
            "jquery\napp\n"
        );
    }

    #[test]
    fn test_excludes_and_previous_output() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("js/keep.js"), "keep");
        touch(&root.join("js/debug.js"), "debug");
        // Output directory inside the source root, holding a previous bundle
        touch(&root.join("js/site.js"), "old bundle");
        touch(&root.join("js/site.min.js"), "old min");

        let mut config = config(root);
        config.js.dirs = vec![root.join("js")];
        config.js.excludes = vec![root.join("js/debug.js")];
        config.js.output = root.join("js");

        let (result, _, _) = run(&config, 0);
        assert_eq!(result.unwrap().scripts.unwrap().files, 1);
        assert_eq!(fs::read_to_string(root.join("js/site.js")).unwrap(), "keep\n");
    }

    #[test]
    fn test_minifier_failure_aborts() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("js/a.js"), "A");
        touch(&root.join("css/a.css"), "a{}");
        touch(&root.join("img/x.png"), "x");

        let mut config = config(root);
        config.js.dirs = vec![root.join("js")];
        config.js.remove_expanded = true;
        config.css.dirs = vec![root.join("css")];
        config.statics = vec![StaticMapping {
            from: root.join("img"),
            to: root.join("copy"),
        }];

        let (result, _, css_calls) = run(&config, 9);
        let err = result.unwrap_err();

        assert_eq!(exit_code(&err), 9);
        assert!(format!("{err:#}").contains("exited with status 9"));
        // The bundle stays for inspection, later phases never ran
        assert!(root.join("out/site.js").exists());
        assert!(css_calls.lock().unwrap().is_empty());
        assert!(!root.join("copy").exists());
    }

    #[test]
    fn test_statics_mirror_in_order() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a/1.txt"), "first");
        touch(&root.join("b/1.txt"), "second");
        touch(&root.join("single.txt"), "single");

        let mut config = config(root);
        config.statics = vec![
            StaticMapping {
                from: root.join("a"),
                to: root.join("dest"),
            },
            StaticMapping {
                from: root.join("b"),
                to: root.join("dest"),
            },
            StaticMapping {
                from: root.join("single.txt"),
                to: root.join("dest/renamed.txt"),
            },
            StaticMapping {
                from: root.join("missing"),
                to: root.join("dest/missing"),
            },
        ];

        let (result, _, _) = run(&config, 0);
        assert_eq!(result.unwrap().copied, 3);
        // Later mappings overwrite earlier ones
        assert_eq!(fs::read_to_string(root.join("dest/1.txt")).unwrap(), "second");
        assert_eq!(fs::read_to_string(root.join("dest/renamed.txt")).unwrap(), "single");
        assert!(!root.join("dest/missing").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_source_directory_aborts() {
        use crate::error::EXIT_IO;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("js/a.js"), "A");
        touch(&root.join("js/locked/b.js"), "B");
        let locked = root.join("js/locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let mut config = config(root);
        config.js.dirs = vec![root.join("js")];

        // Permission bits do not bind a privileged user
        if fs::read_dir(&locked).is_err() {
            let (result, js_calls, _) = run(&config, 0);
            let err = result.unwrap_err();
            assert_eq!(exit_code(&err), EXIT_IO);
            assert!(js_calls.lock().unwrap().is_empty());
            assert!(!root.join("out/site.js").exists());
        }
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
