//! Component resolution for ksonnet-style application trees.
//!
//! An application keeps its deployable units under `components/`. Each
//! directory carrying a `params.libsonnet` is a namespace; each file inside
//! it is a component. The crate maps slash-qualified names such as
//! `app/bar` to namespaces and backing files, rejects ambiguous basenames,
//! enumerates the component files of an environment, and exposes the
//! parameter surface of each component.
//!
//! Every operation reads the tree fresh through the injected [`FileSystem`];
//! nothing is cached between calls.

pub mod app;
pub mod component;
pub mod error;
pub mod fs;
pub mod locator;
pub mod namespace;
pub mod resolver;

pub use app::{App, AppSpec, EnvironmentSpec, find_app_root};
pub use component::{
    Component, JsonnetComponent, NamespaceParameter, Object, ParamOptions, Summary, TypeSpec,
    YamlComponent,
};
pub use error::{Error, ErrorKind, Result};
pub use fs::{DirEntry, FileSystem, MemFs, OsFs};
pub use locator::{ComponentPathLocator, make_paths, make_paths_by_namespace};
pub use namespace::{Namespace, extract_namespaced_component, is_component_dir};
pub use resolver::{extract_component, locate_component, path};

/// Directory under the application root that houses components.
pub const COMPONENTS_ROOT: &str = "components";
/// Directory under the application root that houses environments.
pub const ENVIRONMENTS_ROOT: &str = "environments";
/// Parameters file that marks a directory as a namespace.
pub const PARAMS_FILE: &str = "params.libsonnet";
/// Application spec at the root of every app.
pub const APP_SPEC_FILE: &str = "app.yaml";
/// File extensions recognised as components.
pub const COMPONENT_EXTENSIONS: &[&str] = &["jsonnet", "yaml", "yml", "json"];
