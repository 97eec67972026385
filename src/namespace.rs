//! Component namespaces: directories under `components/` that carry a
//! `params.libsonnet`.
//!
//! A `Namespace` is a value recomputed from a path fragment on every call;
//! nothing here caches directory contents.

use crate::app::App;
use crate::component::Component;
use crate::error::{Error, Result};
use crate::fs::{DirEntry, FileSystem};
use crate::{COMPONENT_EXTENSIONS, PARAMS_FILE};
use std::fmt;
use std::path::{Path, PathBuf};

/// A directory in the component tree, identified by its path below
/// `components/`. The root namespace has an empty name.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Namespace {
    name: String,
    dir: PathBuf,
}

impl Namespace {
    /// Build the namespace for `name`, where `""` and `"/"` both mean root.
    pub fn new(app: &App, name: &str) -> Self {
        let name = name.trim_matches('/').to_string();
        let dir = if name.is_empty() {
            app.components_dir()
        } else {
            app.components_dir().join(&name)
        };
        Self { name, dir }
    }

    pub fn root(app: &App) -> Self {
        Self::new(app, "")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn params_path(&self) -> PathBuf {
        self.dir.join(PARAMS_FILE)
    }

    /// Combine the namespace with a local name into the form
    /// [`extract_namespaced_component`] accepts.
    pub fn qualify(&self, local_name: &str) -> String {
        if self.is_root() {
            local_name.to_string()
        } else {
            format!("{}/{}", self.name, local_name)
        }
    }

    /// Enumerate the components that live directly in this namespace.
    ///
    /// Reads the directory fresh on each call. The parameters file and files
    /// without a component extension are skipped.
    pub fn components(&self, app: &App) -> Result<Vec<Component>> {
        let entries = app
            .fs()
            .read_dir(&self.dir)
            .map_err(|err| Error::io("read files in", &self.dir, err))?;

        let mut members = Vec::new();
        for entry in entries {
            if entry.is_dir || entry.name == PARAMS_FILE {
                continue;
            }
            let path = self.dir.join(&entry.name);
            if let Some(component) = Component::from_path(app, self.clone(), &path) {
                members.push(component);
            }
        }
        tracing::trace!(namespace = %self, members = members.len(), "enumerated components");
        Ok(members)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Split `raw` on its last `/` into a namespace and a local component name.
///
/// Everything before the separator names the namespace (empty or `/` is the
/// root namespace); everything after is the local name. No I/O.
pub fn extract_namespaced_component(app: &App, raw: &str) -> (Namespace, String) {
    match raw.rsplit_once('/') {
        Some((ns, local)) => (Namespace::new(app, ns), local.to_string()),
        None => (Namespace::root(app), raw.to_string()),
    }
}

/// Returns true when `path` directly contains a `params.libsonnet` file.
pub fn is_component_dir(fs: &dyn FileSystem, path: &Path) -> Result<bool> {
    let entries = fs
        .read_dir(path)
        .map_err(|err| Error::io("read files in", path, err))?;
    Ok(has_params_file(&entries))
}

/// True when a directory listing includes the parameters file as a file.
pub(crate) fn has_params_file(entries: &[DirEntry]) -> bool {
    entries
        .iter()
        .any(|entry| !entry.is_dir && entry.name == PARAMS_FILE)
}

/// Returns true when `file_name` carries one of the component extensions.
pub(crate) fn has_component_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| COMPONENT_EXTENSIONS.contains(&ext))
}
