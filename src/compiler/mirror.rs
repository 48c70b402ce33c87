//! Static file mirroring: copy a source tree under a destination root.

use super::filter::{Exclusions, FileId, FileType};
use super::walk::walk;
use crate::config::StaticMapping;
use crate::error::BuildError;
use crate::utils::path::absolutize;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// One file to copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Discover every non-hidden file under `mapping.from` and compute where it
/// lands under `mapping.to`.
///
/// The destination is the file's path relative to the absolutized source
/// root, rejoined onto the absolutized destination root. A mapping whose
/// source is a single file copies it to `to` itself. A source directory that
/// cannot be listed fails the whole mapping.
pub fn plan_mapping(mapping: &StaticMapping) -> Result<Vec<CopyJob>> {
    let from = absolutize(&mapping.from);
    let to = absolutize(&mapping.to);

    walk([&from], &FileType::Any, &Exclusions::default())?
        .into_iter()
        .map(|source| {
            let dest = reroot(&source, &from, &to)?;
            Ok(CopyJob { source, dest })
        })
        .collect()
}

/// Move `path` from under `from` to the same relative place under `to`.
fn reroot(path: &Path, from: &Path, to: &Path) -> Result<PathBuf, BuildError> {
    let relative = path
        .strip_prefix(from)
        .map_err(|_| BuildError::PrefixMismatch {
            root: from.to_path_buf(),
            path: path.to_path_buf(),
        })?;

    Ok(if relative.as_os_str().is_empty() {
        to.to_path_buf()
    } else {
        to.join(relative)
    })
}

/// Copy all jobs of one mapping, calling `on_copy` after each file.
///
/// Destinations within one mapping are distinct, so copies run in parallel.
/// The first failure aborts the remaining copies.
pub fn copy_jobs<F>(jobs: &[CopyJob], on_copy: F) -> Result<()>
where
    F: Fn(&CopyJob) + Sync,
{
    jobs.par_iter().try_for_each(|job| {
        copy_file(&job.source, &job.dest)?;
        on_copy(job);
        Ok(())
    })
}

/// Copy one file, creating the destination directory on demand.
///
/// Content and permissions are copied; the modification time is carried
/// over where the platform allows it.
pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    if let Ok(meta) = fs::metadata(dest) {
        // Copying a file onto itself would truncate it.
        if FileId::of(source).is_some_and(|id| FileId::of(dest) == Some(id)) {
            return Ok(());
        }
        // A read-only copy from a previous run must not block this one.
        if meta.permissions().readonly() {
            fs::remove_file(dest)
                .with_context(|| format!("Failed to replace {}", dest.display()))?;
        }
    }

    fs::copy(source, dest).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), dest.display())
    })?;

    if let Ok(modified) = fs::metadata(source).and_then(|m| m.modified()) {
        let _ = fs::File::options()
            .write(true)
            .open(dest)
            .and_then(|file| file.set_modified(modified));
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
