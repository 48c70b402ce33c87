//! Path normalization helpers.

use std::path::{Component, Path, PathBuf};

/// Make a path absolute and lexically normalized.
///
/// Relative paths are joined onto the current directory. `.` components are
/// dropped and `..` pops the previous component. Symlinks are NOT resolved,
/// so a child joined onto the result always keeps it as a prefix.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    normalize(&joined)
}

/// Lexically normalize a path without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`
                if !matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether the final component of `path` starts with the hidden-file marker.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().first() == Some(&b'.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_normalize_dot_components() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/b/./")), PathBuf::from("/a/b"));
    }

    #[test]
    #[cfg(unix)]
    fn test_normalize_parent_of_root() {
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_absolutize_relative() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolutize(Path::new("x/../y")), cwd.join("y"));
    }

    #[test]
    #[cfg(unix)]
    fn test_absolutize_keeps_absolute() {
        assert_eq!(absolutize(Path::new("/tmp/x")), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new("/a/.DS_Store")));
        assert!(is_hidden(Path::new(".gitignore")));
        assert!(!is_hidden(Path::new("/a/.b/c.js")));
        assert!(!is_hidden(Path::new("app.js")));
    }
}
