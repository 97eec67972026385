//! Name → file and name → component resolution.
//!
//! `path` works on raw filenames and enforces unique basenames across the
//! whole namespace directory. `extract_component` works on live components
//! and matches on the name each component reports. The two agree as long as
//! a component's name is its file stem.

use crate::app::App;
use crate::component::Component;
use crate::error::{Error, Result};
use crate::namespace::extract_namespaced_component;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Return the backing file for the component called `name`.
///
/// Every file in the namespace takes part in the collision check, not just
/// the requested one, so a directory with ambiguous basenames never resolves.
pub fn path(app: &App, name: &str) -> Result<PathBuf> {
    let (ns, local_name) = extract_namespaced_component(app, name);

    let entries = app
        .fs()
        .read_dir(ns.dir())
        .map_err(|err| Error::io("read files in", ns.dir(), err))?;

    let mut file_name = None;
    let mut seen = BTreeSet::new();
    for entry in entries {
        if entry.is_dir {
            continue;
        }

        let base = basename(&entry.name).to_string();
        if !seen.insert(base.clone()) {
            return Err(Error::AmbiguousName {
                name: name.to_string(),
            });
        }
        if base == local_name {
            file_name = Some(entry.name);
        }
    }

    let Some(file_name) = file_name else {
        return Err(Error::NotFound {
            name: name.to_string(),
        });
    };
    let resolved = ns.dir().join(file_name);
    tracing::debug!(name, path = %resolved.display(), "resolved component path");
    Ok(resolved)
}

/// Find the live component whose unqualified name matches the last segment
/// of `path`.
pub fn extract_component(app: &App, path: &str) -> Result<Component> {
    let (ns, component_name) = extract_namespaced_component(app, path);
    let members = ns.components(app)?;

    members
        .into_iter()
        .find(|member| member.name(false) == component_name)
        .ok_or(Error::ComponentNotFound {
            name: component_name,
        })
}

/// Locate a component by namespace name and local name. `""` and `"/"` both
/// select the root namespace.
pub fn locate_component(app: &App, ns_name: &str, name: &str) -> Result<Component> {
    let mut parts = Vec::with_capacity(2);
    if !ns_name.is_empty() && ns_name != "/" {
        parts.push(ns_name);
    }
    parts.push(name);
    extract_component(app, &parts.join("/"))
}

/// File name with everything from its last `.` stripped. A leading dot counts
/// as the extension, so `.a` reduces to the empty basename.
fn basename(file_name: &str) -> &str {
    file_name
        .rfind('.')
        .map_or(file_name, |dot| &file_name[..dot])
}
