//! Enumerates component files for an environment.
//!
//! The locator walks `components/<target>` for each of the environment's
//! targets and collects component files from every directory that qualifies
//! as a namespace. Directories without a parameters file contribute nothing
//! themselves but are still descended into.

use crate::PARAMS_FILE;
use crate::app::App;
use crate::error::{Error, Result, ResultExt};
use crate::fs::FileSystem;
use crate::namespace::{
    Namespace, extract_namespaced_component, has_component_extension, has_params_file,
};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Walks the component tree for one environment.
#[derive(Debug)]
pub struct ComponentPathLocator {
    app: App,
    targets: Vec<String>,
}

impl ComponentPathLocator {
    /// Fails when `env` is not declared in `app.yaml`. An environment without
    /// targets covers the whole tree.
    pub fn new(app: &App, env: &str) -> Result<Self> {
        let spec = app.environment(env)?;
        let targets = if spec.targets.is_empty() {
            vec!["/".to_string()]
        } else {
            spec.targets.clone()
        };
        Ok(Self {
            app: app.clone(),
            targets,
        })
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Every component file under the targets, sorted and de-duplicated.
    pub fn locate(&self) -> Result<Vec<PathBuf>> {
        let mut found = BTreeSet::new();
        for target in &self.targets {
            let ns = Namespace::new(&self.app, target);
            tracing::debug!(namespace = %ns, dir = %ns.dir().display(), "walking component target");
            walk(self.app.fs(), ns.dir(), &mut found)?;
        }
        Ok(found.into_iter().collect())
    }
}

fn walk(fs: &dyn FileSystem, dir: &Path, acc: &mut BTreeSet<PathBuf>) -> Result<()> {
    let entries = fs
        .read_dir(dir)
        .map_err(|err| Error::io("read files in", dir, err))?;
    let is_namespace = has_params_file(&entries);

    for entry in &entries {
        let path = dir.join(&entry.name);
        if entry.is_dir {
            walk(fs, &path, acc)?;
        } else if is_namespace && entry.name != PARAMS_FILE && has_component_extension(&entry.name)
        {
            tracing::trace!(path = %path.display(), "found component");
            acc.insert(path);
        }
    }
    Ok(())
}

/// Every component file path for `env`.
pub fn make_paths(app: &App, env: &str) -> Result<Vec<PathBuf>> {
    let locator =
        ComponentPathLocator::new(app, env).context("create component path locator")?;
    locator.locate()
}

/// Component file paths for `env` grouped by owning namespace.
///
/// Namespaces appear in first-seen order; paths keep the order of
/// [`make_paths`].
pub fn make_paths_by_namespace(
    app: &App,
    env: &str,
) -> Result<IndexMap<Namespace, Vec<PathBuf>>> {
    let paths = make_paths(app, env)?;

    let components = app.components_dir();

    let mut grouped: IndexMap<Namespace, Vec<PathBuf>> = IndexMap::new();
    for path in paths {
        let relative = path.strip_prefix(&components).unwrap_or(&path);
        let (ns, _) = extract_namespaced_component(app, &relative.to_string_lossy());
        grouped.entry(ns).or_default().push(path);
    }
    Ok(grouped)
}
