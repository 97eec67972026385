//! Application context: filesystem handle, root path and `app.yaml`.
//!
//! Every resolver takes an `App` so the backing filesystem stays swappable.
//! `app.yaml` is read once at load time; the component tree itself is always
//! read fresh by the operations that need it.

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::{APP_SPEC_FILE, COMPONENTS_ROOT, ENVIRONMENTS_ROOT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fs};

/// Parsed `app.yaml`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct AppSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentSpec>,
}

/// One environment declared in `app.yaml`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct EnvironmentSpec {
    /// Namespace paths the environment deploys. Empty means the whole tree.
    #[serde(default)]
    pub targets: Vec<String>,
    /// Directory under `environments/`; defaults to the environment name.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Clone)]
pub struct App {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    spec: AppSpec,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root", &self.root)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Load the application rooted at `root`.
    ///
    /// A missing `app.yaml` yields an empty spec so bare component trees still
    /// resolve; a present but unparsable one is an error.
    pub fn load(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let spec_path = root.join(APP_SPEC_FILE);
        let spec = match fs.read_to_string(&spec_path) {
            Ok(raw) if raw.trim().is_empty() => AppSpec::default(),
            Ok(raw) => serde_yaml::from_str(&raw).map_err(|err| Error::Parse {
                path: spec_path.clone(),
                reason: err.to_string(),
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => AppSpec::default(),
            Err(err) => return Err(Error::io("read app spec", spec_path, err)),
        };
        tracing::debug!(root = %root.display(), environments = spec.environments.len(), "loaded app");
        Ok(Self::with_spec(fs, root, spec))
    }

    pub fn with_spec(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>, spec: AppSpec) -> Self {
        Self {
            fs,
            root: root.into(),
            spec,
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn spec(&self) -> &AppSpec {
        &self.spec
    }

    /// `<root>/components`.
    pub fn components_dir(&self) -> PathBuf {
        self.root.join(COMPONENTS_ROOT)
    }

    pub fn environment(&self, name: &str) -> Result<&EnvironmentSpec> {
        self.spec
            .environments
            .get(name)
            .ok_or_else(|| Error::EnvironmentNotFound {
                name: name.to_string(),
            })
    }

    /// Directory holding the environment's parameter overrides.
    pub fn environment_dir(&self, name: &str) -> Result<PathBuf> {
        let spec = self.environment(name)?;
        let rel = spec.path.as_deref().unwrap_or(name);
        Ok(self.root.join(ENVIRONMENTS_ROOT).join(rel))
    }
}

/// Returns true when `candidate` has the on-disk shape of an application.
fn is_app_root(candidate: &Path) -> bool {
    candidate.join(APP_SPEC_FILE).is_file() && candidate.join(COMPONENTS_ROOT).is_dir()
}

fn app_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !is_app_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

/// Climb from `start` to the first ancestor that looks like an application.
pub fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_app_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the application root.
///
/// Honors `KSRESOLVE_APP_ROOT` when it points at a real application, then
/// climbs from `start`.
pub fn find_app_root(start: &Path) -> anyhow::Result<PathBuf> {
    if let Ok(hint) = env::var("KSRESOLVE_APP_ROOT") {
        if let Some(root) = app_root_from_hint(&hint) {
            return Ok(root);
        }
    }

    if let Some(root) = search_upwards(start) {
        return Ok(root);
    }

    anyhow::bail!(
        "Unable to locate an application root above {}. Set KSRESOLVE_APP_ROOT or pass --app.",
        start.display()
    )
}
