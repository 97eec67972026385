//! Narrow filesystem capability used by every resolver.
//!
//! Resolution code only needs to list a directory, read a file and write a
//! parameters file back. `OsFs` goes to disk; `MemFs` keeps a tree in memory
//! so unit tests can describe an application layout inline.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// One immediate child of a listed directory.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Filesystem operations the resolver depends on.
///
/// `read_dir` returns entries sorted by name so scans are deterministic on
/// every backend.
pub trait FileSystem: Send + Sync {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            // Non-UTF-8 names stay listed so they still take part in basename checks.
            let name = entry.file_name().to_string_lossy().into_owned();
            // Symlinks are not followed; a link to a directory lists as a file.
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntry { name, is_dir });
        }
        entries.sort();
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[derive(Debug, Default)]
struct MemTree {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, String>,
}

impl MemTree {
    fn add_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

/// In-memory tree for tests.
///
/// Writing a file creates its parent directories implicitly.
#[derive(Debug, Default)]
pub struct MemFs {
    tree: RwLock<MemTree>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemFs::add_file`].
    pub fn with_file(self, path: impl AsRef<Path>, contents: &str) -> Self {
        self.add_file(path, contents);
        self
    }

    /// Builder form of [`MemFs::add_dir`].
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path);
        self
    }

    pub fn add_file(&self, path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref();
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        tree.add_parents(path);
        tree.files.insert(path.to_path_buf(), contents.to_string());
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        tree.add_parents(path);
        tree.dirs.insert(path.to_path_buf());
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) -> bool {
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        tree.files.remove(path.as_ref()).is_some()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

impl FileSystem for MemFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        if tree.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{}: not a directory", path.display()),
            ));
        }
        if !tree.dirs.contains(path) {
            return Err(not_found(path));
        }

        let child_name = |child: &Path| -> Option<String> {
            if child.parent()? != path {
                return None;
            }
            child.file_name()?.to_str().map(str::to_string)
        };

        let mut entries: Vec<DirEntry> = tree
            .dirs
            .iter()
            .filter_map(|dir| child_name(dir.as_path()))
            .map(|name| DirEntry { name, is_dir: true })
            .chain(
                tree.files
                    .keys()
                    .filter_map(|file| child_name(file.as_path()))
                    .map(|name| DirEntry {
                        name,
                        is_dir: false,
                    }),
            )
            .collect();
        entries.sort();
        Ok(entries)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        tree.files.get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut tree = self.tree.write().unwrap_or_else(PoisonError::into_inner);
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !tree.dirs.contains(parent) => {
                Err(not_found(parent))
            }
            _ => {
                tree.files.insert(path.to_path_buf(), contents.to_string());
                Ok(())
            }
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        tree.dirs.contains(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let tree = self.tree.read().unwrap_or_else(PoisonError::into_inner);
        tree.files.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_fs_lists_immediate_children_only() {
        let fs = MemFs::new()
            .with_file("app/components/foo.jsonnet", "{}")
            .with_file("app/components/nested/bar.yaml", "")
            .with_dir("app/components/empty");

        let entries = fs.read_dir(Path::new("app/components")).unwrap();
        assert_eq!(
            entries,
            vec![
                DirEntry {
                    name: "empty".to_string(),
                    is_dir: true
                },
                DirEntry {
                    name: "foo.jsonnet".to_string(),
                    is_dir: false
                },
                DirEntry {
                    name: "nested".to_string(),
                    is_dir: true
                },
            ]
        );
    }

    #[test]
    fn mem_fs_distinguishes_missing_and_file_paths() {
        let fs = MemFs::new().with_file("app/components/foo.jsonnet", "{}");

        let missing = fs.read_dir(Path::new("app/other")).unwrap_err();
        assert_eq!(missing.kind(), io::ErrorKind::NotFound);

        let file = fs
            .read_dir(Path::new("app/components/foo.jsonnet"))
            .unwrap_err();
        assert_eq!(file.kind(), io::ErrorKind::NotADirectory);
    }

    #[test]
    fn mem_fs_write_requires_parent() {
        let fs = MemFs::new().with_dir("app");
        fs.write(Path::new("app/params.libsonnet"), "{}").unwrap();
        assert!(fs.is_file(Path::new("app/params.libsonnet")));

        let err = fs.write(Path::new("nope/params.libsonnet"), "{}").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn os_fs_sorts_entries() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join("b.jsonnet"), "").unwrap();
        std::fs::write(temp.path().join("a.yaml"), "").unwrap();
        std::fs::create_dir(temp.path().join("c")).unwrap();

        let entries = OsFs.read_dir(temp.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.yaml", "b.jsonnet", "c"]);
        assert!(entries[2].is_dir);
    }

    #[cfg(unix)]
    #[test]
    fn os_fs_does_not_follow_directory_links() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        std::fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink("real", temp.path().join("link")).unwrap();

        let entries = OsFs.read_dir(temp.path()).unwrap();
        assert_eq!(
            entries,
            vec![
                DirEntry {
                    name: "link".to_string(),
                    is_dir: false
                },
                DirEntry {
                    name: "real".to_string(),
                    is_dir: true
                },
            ]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn os_fs_keeps_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = tempfile::TempDir::new().expect("temp dir");
        std::fs::write(temp.path().join(OsStr::from_bytes(b"bar.\xff")), "").unwrap();

        let entries = OsFs.read_dir(temp.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].name.starts_with("bar."));
    }
}
