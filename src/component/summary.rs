use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Group/version/kind triple identifying a resource schema.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct TypeSpec {
    /// Empty for the core API group.
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl TypeSpec {
    /// Parse `apiVersion` (`version` or `group/version`) and `kind`.
    pub fn new(api_version: &str, kind: &str) -> Result<Self> {
        let malformed = |reason| Error::MalformedTypeSpec {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            reason,
        };

        if kind.trim().is_empty() {
            return Err(malformed("kind is empty"));
        }
        if api_version.trim().is_empty() {
            return Err(malformed("apiVersion is empty"));
        }

        let (group, version) = match api_version.split_once('/') {
            None => ("", api_version),
            Some((group, version)) => {
                if version.contains('/') {
                    return Err(malformed("apiVersion has more than one '/'"));
                }
                if group.is_empty() {
                    return Err(malformed("apiVersion group is empty"));
                }
                (group, version)
            }
        };
        if version.is_empty() {
            return Err(malformed("apiVersion version is empty"));
        }

        Ok(Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        })
    }

    /// `apiVersion` as it appears in a manifest.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// Read-only projection of one object produced by a component.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub component_name: String,
    pub index_str: String,
    pub index: usize,
    /// Backing format of the component (`jsonnet`, `yaml`).
    #[serde(rename = "type")]
    pub kind_of_source: String,
    pub api_version: String,
    pub kind: String,
    pub name: String,
}

impl Summary {
    pub fn type_spec(&self) -> Result<TypeSpec> {
        TypeSpec::new(&self.api_version, &self.kind)
    }
}
