//! Reading and editing `params.libsonnet`.
//!
//! Parameter files are kept as JSON documents, which Jsonnet accepts
//! unchanged. The top level holds a `global` object and a `components`
//! object keyed by component.

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};

const COMPONENTS_KEY: &str = "components";
const GLOBAL_KEY: &str = "global";

#[derive(Debug)]
pub(crate) struct ParamsFile {
    path: PathBuf,
    root: Map<String, Value>,
}

impl ParamsFile {
    /// Load `path`; a missing or blank file is an empty parameter set.
    pub(crate) fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let raw = match fs.read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(Error::io("read params", path, err)),
        };

        let root = if raw.trim().is_empty() {
            Map::new()
        } else {
            match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) => return Err(params_error(path, "top level must be an object")),
                Err(err) => return Err(params_error(path, err.to_string())),
            }
        };

        let file = Self {
            path: path.to_path_buf(),
            root,
        };
        for key in [COMPONENTS_KEY, GLOBAL_KEY] {
            if file.root.get(key).is_some_and(|v| !v.is_object()) {
                return Err(params_error(path, format!("{key:?} must be an object")));
            }
        }
        Ok(file)
    }

    pub(crate) fn save(&self, fs: &dyn FileSystem) -> Result<()> {
        let mut rendered = serde_json::to_string_pretty(&Value::Object(self.root.clone()))
            .map_err(|err| params_error(&self.path, err.to_string()))?;
        rendered.push('\n');
        fs.write(&self.path, &rendered)
            .map_err(|err| Error::io("write params", &self.path, err))
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Parameters scoped to `key`, or `None` when the component has none.
    pub(crate) fn component(&self, key: &str) -> Option<&Map<String, Value>> {
        self.root
            .get(COMPONENTS_KEY)
            .and_then(Value::as_object)
            .and_then(|components| components.get(key))
            .and_then(Value::as_object)
    }

    pub(crate) fn set(&mut self, key: &str, path: &[String], value: Value) -> Result<()> {
        let Some((last, parents)) = path.split_last() else {
            return Err(params_error(&self.path, "parameter path must not be empty"));
        };

        let components = object_entry(&mut self.root, COMPONENTS_KEY);
        let mut current = object_entry(components, key);
        for segment in parents {
            current = object_entry(current, segment);
        }
        current.insert(last.clone(), value);
        Ok(())
    }

    pub(crate) fn delete(&mut self, key: &str, path: &[String]) -> Result<()> {
        if path.is_empty() {
            return Err(params_error(&self.path, "parameter path must not be empty"));
        }
        let not_found = || Error::ParamNotFound {
            component: key.to_string(),
            key: path.join("."),
        };

        let components = self
            .root
            .get_mut(COMPONENTS_KEY)
            .and_then(Value::as_object_mut)
            .ok_or_else(not_found)?;
        let params = components
            .get_mut(key)
            .and_then(Value::as_object_mut)
            .ok_or_else(not_found)?;
        if !remove_path(params, path) {
            return Err(not_found());
        }
        if params.is_empty() {
            components.remove(key);
        }
        Ok(())
    }
}

fn params_error(path: &Path, reason: impl Into<String>) -> Error {
    Error::Params {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Get `map[key]` as an object, replacing any non-object value.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(inner) => inner,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

/// Remove the value at `path`, pruning parents left empty. Returns false when
/// nothing was there.
fn remove_path(map: &mut Map<String, Value>, path: &[String]) -> bool {
    match path {
        [] => false,
        [last] => map.remove(last).is_some(),
        [head, rest @ ..] => {
            let Some(Value::Object(child)) = map.get_mut(head) else {
                return false;
            };
            let removed = remove_path(child, rest);
            if removed && child.is_empty() {
                map.remove(head);
            }
            removed
        }
    }
}

/// Recursively merge `overlay` into `base`; objects merge, anything else
/// replaces.
pub(crate) fn deep_merge(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}
