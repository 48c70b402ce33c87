//! Breadth-first file discovery over an ordered list of roots.

use super::filter::{self, Exclusions, FileId, FileType};
use crate::utils::path::absolutize;
use anyhow::{Context, Result};
use std::{
    collections::VecDeque,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
};

/// A queued path and the identities of the directories above it.
struct Pending {
    path: PathBuf,
    ancestors: Rc<Vec<FileId>>,
}

/// Walk `roots` in order and collect every file accepted by the filter.
///
/// Uses an explicit FIFO worklist: a directory pops off the front and pushes
/// its children (sorted by name) onto the back, so discovery is breadth-first
/// and reproducible. Roots that do not exist are skipped silently. Excluded
/// directories are pruned before expansion. A directory that is one of its own
/// ancestors (a symlink cycle) is not expanded again; other aliases of a
/// directory are walked like any other path.
///
/// Returned paths are absolute and lexically normalized, and each one has its
/// absolutized root as a path prefix.
///
/// # Errors
/// Fails if an existing directory cannot be listed.
pub fn walk<I, P>(roots: I, file_type: &FileType, exclusions: &Exclusions) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let top = Rc::new(Vec::new());
    let mut queue: VecDeque<Pending> = roots
        .into_iter()
        .map(|root| Pending {
            path: absolutize(root.as_ref()),
            ancestors: Rc::clone(&top),
        })
        .collect();
    let mut found = Vec::new();

    while let Some(Pending { path, ancestors }) = queue.pop_front() {
        if path.is_dir() {
            if exclusions.contains(&path) {
                continue;
            }
            let mut chain = ancestors.as_ref().clone();
            if let Some(id) = FileId::of(&path) {
                if chain.contains(&id) {
                    continue;
                }
                chain.push(id);
            }
            let chain = Rc::new(chain);
            queue.extend(list_children(&path)?.into_iter().map(|child| Pending {
                path: child,
                ancestors: Rc::clone(&chain),
            }));
        } else if filter::matches(&path, file_type, exclusions) {
            found.push(path);
        }
    }

    Ok(found)
}

/// Direct children of a directory, sorted by file name.
///
/// A directory that vanished since it was queued has no children.
fn list_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read directory {}", dir.display()));
        }
    };

    let mut names = entries
        .map(|entry| entry.map(|entry| entry.file_name()))
        .collect::<io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    names.sort();
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

// ============================================================================
// Tests
// ============================================================================
