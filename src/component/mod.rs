//! Components: named, parameterizable units backed by a single file.
//!
//! The backing formats are a closed set, so `Component` is an enum and each
//! capability dispatches with a `match`. Both variants share `ComponentBase`,
//! which knows where the component lives and how to reach its parameters.

mod jsonnet;
mod params;
mod summary;
mod yaml;

pub use jsonnet::JsonnetComponent;
pub use summary::{Summary, TypeSpec};
pub use yaml::YamlComponent;

use crate::PARAMS_FILE;
use crate::app::App;
use crate::error::Result;
use crate::namespace::Namespace;
use params::ParamsFile;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Options threaded through parameter edits.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParamOptions {
    /// Document index for components that produce several objects.
    pub index: usize,
}

/// One parameter reported by [`Component::params`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NamespaceParameter {
    pub component: String,
    pub index: String,
    pub key: String,
    /// Compact JSON rendering of the value.
    pub value: String,
}

/// A Kubernetes-style object emitted by a component.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Object(Map<String, Value>);

impl Object {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn api_version(&self) -> &str {
        self.0.get("apiVersion").and_then(Value::as_str).unwrap_or("")
    }

    pub fn kind(&self) -> &str {
        self.0.get("kind").and_then(Value::as_str).unwrap_or("")
    }

    /// `metadata.name`, empty when absent.
    pub fn name(&self) -> &str {
        self.0
            .get("metadata")
            .and_then(|meta| meta.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Location and parameter plumbing shared by every component variant.
#[derive(Clone, Debug)]
pub(crate) struct ComponentBase {
    app: App,
    namespace: Namespace,
    name: String,
    path: PathBuf,
}

impl ComponentBase {
    fn name(&self, namespaced: bool) -> String {
        if namespaced {
            self.namespace.qualify(&self.name)
        } else {
            self.name.clone()
        }
    }

    fn local_params(&self) -> Result<ParamsFile> {
        ParamsFile::load(self.app.fs(), &self.namespace.params_path())
    }

    fn env_params(&self, env: &str) -> Result<Option<ParamsFile>> {
        if env.is_empty() {
            return Ok(None);
        }
        let path = self.app.environment_dir(env)?.join(PARAMS_FILE);
        ParamsFile::load(self.app.fs(), &path).map(Some)
    }

    /// Effective parameters for `key`: local values overlaid by the
    /// environment's values for the namespaced key.
    fn resolved_params(&self, key: &str, env: &str) -> Result<Map<String, Value>> {
        let mut resolved = self
            .local_params()?
            .component(key)
            .cloned()
            .unwrap_or_default();
        if let Some(env_params) = self.env_params(env)? {
            if let Some(overrides) = env_params.component(&self.namespace.qualify(key)) {
                params::deep_merge(&mut resolved, overrides);
            }
        }
        Ok(resolved)
    }

    fn report_params(&self, key: &str, index: usize, env: &str) -> Result<Vec<NamespaceParameter>> {
        let resolved = self.resolved_params(key, env)?;
        let mut entries: Vec<NamespaceParameter> = resolved
            .iter()
            .map(|(param, value)| NamespaceParameter {
                component: self.name(true),
                index: index.to_string(),
                key: param.clone(),
                value: value.to_string(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn set_param(&self, key: &str, path: &[String], value: Value) -> Result<()> {
        let mut file = self.local_params()?;
        file.set(key, path, value)?;
        tracing::debug!(component = %self.name(true), key, params = %file.path().display(), "set param");
        file.save(self.app.fs())
    }

    fn delete_param(&self, key: &str, path: &[String]) -> Result<()> {
        let mut file = self.local_params()?;
        file.delete(key, path)?;
        tracing::debug!(component = %self.name(true), key, params = %file.path().display(), "deleted param");
        file.save(self.app.fs())
    }
}

/// A component in one of the supported backing formats.
#[derive(Clone, Debug)]
pub enum Component {
    Jsonnet(JsonnetComponent),
    Yaml(YamlComponent),
}

impl Component {
    /// Build the component backed by `path`, or `None` when the extension is
    /// not a component format.
    pub fn from_path(app: &App, namespace: Namespace, path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        let name = path.file_stem()?.to_str()?.to_string();
        let base = ComponentBase {
            app: app.clone(),
            namespace,
            name,
            path: path.to_path_buf(),
        };
        match ext {
            "jsonnet" => Some(Component::Jsonnet(JsonnetComponent::new(base))),
            "yaml" | "yml" | "json" => Some(Component::Yaml(YamlComponent::new(base))),
            _ => None,
        }
    }

    fn base(&self) -> &ComponentBase {
        match self {
            Component::Jsonnet(c) => &c.base,
            Component::Yaml(c) => &c.base,
        }
    }

    /// Component name; `namespaced` prefixes the namespace path when the
    /// component is not in the root namespace.
    pub fn name(&self, namespaced: bool) -> String {
        self.base().name(namespaced)
    }

    pub fn namespace(&self) -> &Namespace {
        &self.base().namespace
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.base().path
    }

    pub fn objects(&self, env: &str) -> Result<Vec<Object>> {
        match self {
            Component::Jsonnet(c) => c.objects(env),
            Component::Yaml(c) => c.objects(env),
        }
    }

    pub fn set_param(&self, path: &[String], value: Value, options: ParamOptions) -> Result<()> {
        match self {
            Component::Jsonnet(c) => c.set_param(path, value, options),
            Component::Yaml(c) => c.set_param(path, value, options),
        }
    }

    pub fn delete_param(&self, path: &[String], options: ParamOptions) -> Result<()> {
        match self {
            Component::Jsonnet(c) => c.delete_param(path, options),
            Component::Yaml(c) => c.delete_param(path, options),
        }
    }

    /// Parameters for the component. An empty `env` reports local values only.
    pub fn params(&self, env: &str) -> Result<Vec<NamespaceParameter>> {
        match self {
            Component::Jsonnet(c) => c.params(env),
            Component::Yaml(c) => c.params(env),
        }
    }

    pub fn summarize(&self) -> Result<Vec<Summary>> {
        match self {
            Component::Jsonnet(c) => c.summarize(),
            Component::Yaml(c) => c.summarize(),
        }
    }
}
