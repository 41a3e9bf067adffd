// Discovers the files an upload will carry: the path itself for a single
// file, or every regular file under a directory root.

use crate::error::{PinataError, Result};
use crate::types::{FileEntry, UploadTarget};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Enumerate the files under `path`.
///
/// The path is made absolute and cleaned of `.` and `..` first, so the root
/// always has a real base name. Directory results come back in walk order,
/// which is not sorted. The first I/O error aborts the walk.
pub fn enumerate(path: &Path) -> Result<(UploadTarget, Vec<FileEntry>)> {
    let cwd = std::env::current_dir().map_err(|source| PinataError::Traversal {
        path: path.to_path_buf(),
        source,
    })?;
    let root = resolve_root(path, &cwd);

    let meta = match std::fs::metadata(&root) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PinataError::TargetNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => return Err(PinataError::Traversal { path: root, source }),
    };

    if !meta.is_dir() {
        let entry = FileEntry {
            path: root.clone(),
            size: meta.len(),
        };
        let target = UploadTarget {
            path: root,
            is_single_file: true,
        };
        return Ok((target, vec![entry]));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = entry.map_err(|e| walk_error(&root, e))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let size = entry.metadata().map_err(|e| walk_error(&root, e))?.len();
        files.push(FileEntry {
            path: entry.into_path(),
            size,
        });
    }
    debug!(root = %root.display(), files = files.len(), "enumerated directory");

    let target = UploadTarget {
        path: root,
        is_single_file: false,
    };
    Ok((target, files))
}

fn walk_error(root: &Path, e: walkdir::Error) -> PinataError {
    let path = e.path().unwrap_or(root).to_path_buf();
    PinataError::Traversal {
        path,
        source: e.into(),
    }
}

/// Join `path` onto `cwd` when relative and fold away `.` and `..`
/// lexically. Symlinks are left alone so the root keeps the name it was
/// given.
pub fn resolve_root(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn single_file_is_one_entry() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("note.txt");
        fs::write(&file, b"hello").unwrap();

        let (target, files) = enumerate(&file).unwrap();
        assert!(target.is_single_file);
        assert_eq!(target.base_name(), "note.txt");
        assert_eq!(files, vec![FileEntry { path: file, size: 5 }]);
    }

    #[test]
    fn directory_yields_every_nested_file_once() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join("sub/b.txt"), b"bb").unwrap();
        fs::write(root.join("sub/deeper/c.txt"), b"ccc").unwrap();

        let (target, files) = enumerate(&root).unwrap();
        assert!(!target.is_single_file);
        assert_eq!(files.len(), 3);
        let found: HashSet<_> = files.iter().map(|f| f.path.clone()).collect();
        let expected: HashSet<_> = [
            root.join("a.txt"),
            root.join("sub/b.txt"),
            root.join("sub/deeper/c.txt"),
        ]
        .into_iter()
        .collect();
        assert_eq!(found, expected);
        let total: u64 = files.iter().map(|f| f.size).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn dot_roots_resolve_to_a_named_directory() {
        let cwd = Path::new("/home/me/proj");
        assert_eq!(resolve_root(Path::new("."), cwd), PathBuf::from("/home/me/proj"));
        assert_eq!(resolve_root(Path::new("./"), cwd), PathBuf::from("/home/me/proj"));
        assert_eq!(resolve_root(Path::new(".."), cwd), PathBuf::from("/home/me"));
        assert_eq!(
            resolve_root(Path::new("../proj/./src/.."), cwd),
            PathBuf::from("/home/me/proj")
        );
        assert_eq!(
            resolve_root(Path::new("/data/x/../y"), cwd),
            PathBuf::from("/data/y")
        );
    }

    #[test]
    fn parent_relative_root_keeps_real_name_in_filenames() {
        let dir = tempdir().unwrap();
        let proj = dir.path().join("proj");
        fs::create_dir_all(proj.join("sub")).unwrap();
        fs::write(proj.join("a.txt"), b"a").unwrap();

        // `proj/sub/..` has no file name of its own.
        let (target, files) = enumerate(&proj.join("sub").join("..")).unwrap();
        assert_eq!(target.base_name(), "proj");
        assert_eq!(files.len(), 1);
        assert_eq!(
            crate::multipart::part_filename(&target, &files[0]),
            "proj/a.txt"
        );

        let (dotted, _) = enumerate(&proj.join(".")).unwrap();
        assert_eq!(dotted.base_name(), "proj");
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = tempdir().unwrap();
        let err = enumerate(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PinataError::TargetNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_root_is_a_traversal_failure() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();

        // A regular file used as a directory fails with ENOTDIR, not ENOENT.
        let err = enumerate(&file.join("child")).unwrap_err();
        match err {
            PinataError::Traversal { path, .. } => assert_eq!(path, file.join("child")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_aborts_walk() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("ok.txt"), b"ok").unwrap();
        std::os::unix::fs::symlink(root.join("missing"), root.join("dangling")).unwrap();

        let err = enumerate(&root).unwrap_err();
        assert!(matches!(err, PinataError::Traversal { .. }));
    }
}
