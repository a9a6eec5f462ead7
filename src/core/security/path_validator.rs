use std::io;
use std::path::{Component, Path, PathBuf};

use crate::core::config::SecurityConfig;

/// Errors that can occur during path validation
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Path '{path}' is outside allowed root directory '{root}'")]
    OutsideRootDirectory { path: PathBuf, root: PathBuf },

    #[error("Path '{path}' is a symlink and symlinks are not allowed")]
    SymlinkNotAllowed { path: PathBuf },

    #[error("Path is empty")]
    EmptyPath,

    #[error("IO error for path '{path}': {error}")]
    IoError { path: PathBuf, error: io::Error },
}

/// Resolve the destination of a file that is about to be written.
///
/// Without a configured root the path is returned unchanged. With a root,
/// relative paths are taken relative to it, and the nearest existing
/// ancestor is canonicalized so that `..` and symlinked directories cannot
/// lead outside the root. The file itself does not need to exist.
///
/// ```rust,ignore
/// let target = validate_write_path("notes/today.txt", &config.security)?;
/// ```
pub fn validate_write_path(
    input_path: &str,
    security: &SecurityConfig,
) -> Result<PathBuf, PathSecurityError> {
    if input_path.trim().is_empty() {
        return Err(PathSecurityError::EmptyPath);
    }
    let path = Path::new(input_path);

    let Some(root) = &security.root_path else {
        return Ok(path.to_path_buf());
    };

    let canonical_root = root.canonicalize().map_err(|e| PathSecurityError::IoError {
        path: root.clone(),
        error: e,
    })?;

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        canonical_root.join(path)
    };

    if absolute.is_symlink() && !security.allow_symlinks {
        return Err(PathSecurityError::SymlinkNotAllowed { path: absolute });
    }

    let (ancestor, remainder) = split_existing_ancestor(&absolute);
    let canonical_ancestor = ancestor
        .canonicalize()
        .map_err(|e| PathSecurityError::IoError {
            path: ancestor.to_path_buf(),
            error: e,
        })?;

    // Components below the existing ancestor are not resolved by the OS yet.
    let escapes = remainder
        .components()
        .any(|c| matches!(c, Component::ParentDir));
    let resolved = canonical_ancestor.join(&remainder);

    if escapes || !is_within_root(&resolved, &canonical_root) {
        return Err(PathSecurityError::OutsideRootDirectory {
            path: resolved,
            root: canonical_root,
        });
    }

    Ok(resolved)
}

/// Checks if a path is within (or equal to) a root directory
fn is_within_root(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Split `path` into its deepest existing ancestor and the rest.
///
/// A dangling symlink counts as existing, so it is canonicalized (and
/// refused) instead of being written through.
fn split_existing_ancestor(path: &Path) -> (&Path, PathBuf) {
    let mut ancestor = path;
    let mut rest: Vec<&std::ffi::OsStr> = Vec::new();

    while ancestor.symlink_metadata().is_err() {
        let (Some(parent), Some(last)) = (ancestor.parent(), ancestor.components().next_back())
        else {
            break;
        };
        rest.push(last.as_os_str());
        ancestor = parent;
    }

    let remainder = rest.into_iter().rev().collect::<PathBuf>();
    (ancestor, remainder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn security(root: Option<PathBuf>, allow_symlinks: bool) -> SecurityConfig {
        SecurityConfig {
            root_path: root,
            allow_symlinks,
        }
    }

    #[test]
    fn test_no_root_returns_path_unchanged() {
        let result = validate_write_path("some/where/file.txt", &security(None, true)).unwrap();
        assert_eq!(result, PathBuf::from("some/where/file.txt"));
    }

    #[test]
    fn test_empty_path_rejected() {
        let result = validate_write_path("  ", &security(None, true));
        assert!(matches!(result, Err(PathSecurityError::EmptyPath)));
    }

    #[test]
    fn test_new_file_within_root() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested/dir/new.txt");

        let config = security(Some(temp_dir.path().to_path_buf()), true);
        let result = validate_write_path(target.to_str().unwrap(), &config).unwrap();

        let root = temp_dir.path().canonicalize().unwrap();
        assert_eq!(result, root.join("nested/dir/new.txt"));
    }

    #[test]
    fn test_relative_path_resolves_against_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = security(Some(temp_dir.path().to_path_buf()), true);

        let result = validate_write_path("notes.txt", &config).unwrap();
        assert_eq!(result, temp_dir.path().canonicalize().unwrap().join("notes.txt"));
    }

    #[test]
    fn test_path_outside_root() {
        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let outside_file = outside_dir.path().join("outside.txt");

        let config = security(Some(root_dir.path().to_path_buf()), true);
        let result = validate_write_path(outside_file.to_str().unwrap(), &config);

        assert!(matches!(
            result,
            Err(PathSecurityError::OutsideRootDirectory { .. })
        ));
    }

    #[test]
    fn test_path_traversal_blocked() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();

        let config = security(Some(subdir.clone()), true);

        // Existing ancestor traversal
        let existing = subdir.join("../escape.txt");
        assert!(matches!(
            validate_write_path(existing.to_str().unwrap(), &config),
            Err(PathSecurityError::OutsideRootDirectory { .. })
        ));

        // Traversal through directories that do not exist yet
        let pending = subdir.join("new/../../escape.txt");
        assert!(matches!(
            validate_write_path(pending.to_str().unwrap(), &config),
            Err(PathSecurityError::OutsideRootDirectory { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dir_outside_root_blocked() {
        use std::os::unix::fs::symlink;

        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let link = root_dir.path().join("link");
        symlink(outside_dir.path(), &link).unwrap();

        let config = security(Some(root_dir.path().to_path_buf()), true);
        let result = validate_write_path(link.join("file.txt").to_str().unwrap(), &config);

        assert!(matches!(
            result,
            Err(PathSecurityError::OutsideRootDirectory { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_target_disallowed_by_config() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let target_file = temp_dir.path().join("target.txt");
        let link_file = temp_dir.path().join("link.txt");
        fs::write(&target_file, "test").unwrap();
        symlink(&target_file, &link_file).unwrap();

        let allowed = security(Some(temp_dir.path().to_path_buf()), true);
        assert!(validate_write_path(link_file.to_str().unwrap(), &allowed).is_ok());

        let denied = security(Some(temp_dir.path().to_path_buf()), false);
        assert!(matches!(
            validate_write_path(link_file.to_str().unwrap(), &denied),
            Err(PathSecurityError::SymlinkNotAllowed { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_pointing_outside_root_blocked() {
        use std::os::unix::fs::symlink;

        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let escaped = outside_dir.path().join("escaped.txt");
        let link_file = root_dir.path().join("link.txt");
        symlink(&escaped, &link_file).unwrap();

        let dangling_dir = root_dir.path().join("dir");
        symlink(outside_dir.path().join("missing"), &dangling_dir).unwrap();

        let config = security(Some(root_dir.path().to_path_buf()), true);
        assert!(validate_write_path("link.txt", &config).is_err());
        assert!(validate_write_path("dir/file.txt", &config).is_err());
        assert!(!escaped.exists());
    }
}
