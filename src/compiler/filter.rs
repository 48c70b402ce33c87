//! Candidate file filtering: type match, hidden files, exclusions.

use crate::utils::path::{absolutize, is_hidden};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// File Type
// ============================================================================

/// Requested file type for discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    /// Wildcard `*`: any extension, including none.
    Any,
    /// Extension without the leading dot, compared case-sensitively.
    Ext(String),
}

impl FileType {
    /// Parse a requested type; `*` is the wildcard.
    pub fn new(requested: &str) -> Self {
        match requested {
            "*" => Self::Any,
            ext => Self::Ext(ext.trim_start_matches('.').to_owned()),
        }
    }

    /// Check whether `path` has this type.
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            Self::Any => true,
            Self::Ext(ext) => path
                .extension()
                .is_some_and(|actual| actual == ext.as_str()),
        }
    }
}

// ============================================================================
// File Identity
// ============================================================================

/// Underlying file identity, independent of the path spelling used to reach it.
///
/// Symlinks are followed, so a link and its target share an identity.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    dev: u64,
    ino: u64,
}

#[cfg(unix)]
impl FileId {
    /// Identity of the file at `path`, or `None` if it cannot be stat'ed.
    pub fn of(path: &Path) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }
}

/// Underlying file identity (canonical path on platforms without inodes).
#[cfg(not(unix))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(PathBuf);

#[cfg(not(unix))]
impl FileId {
    /// Identity of the file at `path`, or `None` if it cannot be resolved.
    pub fn of(path: &Path) -> Option<Self> {
        fs::canonicalize(path).ok().map(Self)
    }
}

// ============================================================================
// Exclusion Set
// ============================================================================

/// Paths that must never appear in discovery output.
///
/// Entries are matched by file identity, so any alias of an excluded file
/// (symlink, `..` detour, relative spelling) is excluded too. Entries that do
/// not exist when the set is built are kept as normalized paths only.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    ids: HashSet<FileId>,
    paths: HashSet<PathBuf>,
}

impl Exclusions {
    /// Build an exclusion set from configured paths.
    pub fn new<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = Self::default();
        for entry in entries {
            set.insert(entry.as_ref());
        }
        set
    }

    /// Add a path to the set.
    pub fn insert(&mut self, path: &Path) {
        if let Some(id) = FileId::of(path) {
            self.ids.insert(id);
        }
        self.paths.insert(absolutize(path));
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Check whether `path` denotes an excluded file or directory.
    pub fn contains(&self, path: &Path) -> bool {
        if self.is_empty() {
            return false;
        }
        self.paths.contains(&absolutize(path))
            || FileId::of(path).is_some_and(|id| self.ids.contains(&id))
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Decide whether a candidate path belongs in discovery output.
///
/// All conditions must hold: regular file, not excluded, not hidden,
/// and of the requested type.
pub fn matches(path: &Path, file_type: &FileType, exclusions: &Exclusions) -> bool {
    path.is_file()
        && !is_hidden(path)
        && file_type.matches(path)
        && !exclusions.contains(path)
}

// ============================================================================
// Tests
// ============================================================================
