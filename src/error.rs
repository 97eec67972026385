//! Error type shared by every resolution operation.
//!
//! Each variant carries the context a caller needs to report the failure
//! (path, component name, offending value). `ErrorKind` gives tests and
//! callers a cheap way to branch on the condition without matching fields.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by namespace scanning, path resolution and parameter edits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A filesystem operation failed.
    #[error("{context} {}: {source}", path.display())]
    Io {
        /// What the operation was doing (e.g. `read files in`).
        context: &'static str,
        /// The path the operation touched.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Two files in one namespace share a basename.
    #[error("found multiple component files with component name {name:?}")]
    AmbiguousName { name: String },

    /// No file in the namespace has the requested basename.
    #[error("no component name {name:?} found")]
    NotFound { name: String },

    /// No live component in the namespace reports the requested name.
    #[error("unable to find component {name:?}")]
    ComponentNotFound { name: String },

    /// `apiVersion`/`kind` could not be parsed into a type spec.
    #[error("malformed type spec (apiVersion {api_version:?}, kind {kind:?}): {reason}")]
    MalformedTypeSpec {
        api_version: String,
        kind: String,
        reason: &'static str,
    },

    /// The environment is not declared in `app.yaml`.
    #[error("environment {name:?} not found")]
    EnvironmentNotFound { name: String },

    /// A parameters file does not have the expected shape.
    #[error("invalid parameters in {}: {reason}", path.display())]
    Params { path: PathBuf, reason: String },

    /// A document could not be parsed.
    #[error("unable to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// `delete_param` targeted a key that does not exist.
    #[error("parameter {key:?} not found for component {component:?}")]
    ParamNotFound { component: String, key: String },

    /// A failure from a nested step, labelled with what the caller was doing.
    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// The component variant cannot perform the requested operation.
    #[error("{operation} is not supported for {component:?}")]
    Unsupported {
        component: String,
        operation: &'static str,
    },
}

/// Condition behind an [`Error`], stripped of context.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Io,
    AmbiguousName,
    NotFound,
    ComponentNotFound,
    MalformedTypeSpec,
    EnvironmentNotFound,
    Params,
    Parse,
    ParamNotFound,
    Unsupported,
}

impl Error {
    /// The condition behind the error, looking through [`Error::Context`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Context { source, .. } => source.kind(),
            Error::Io { .. } => ErrorKind::Io,
            Error::AmbiguousName { .. } => ErrorKind::AmbiguousName,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::ComponentNotFound { .. } => ErrorKind::ComponentNotFound,
            Error::MalformedTypeSpec { .. } => ErrorKind::MalformedTypeSpec,
            Error::EnvironmentNotFound { .. } => ErrorKind::EnvironmentNotFound,
            Error::Params { .. } => ErrorKind::Params,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::ParamNotFound { .. } => ErrorKind::ParamNotFound,
            Error::Unsupported { .. } => ErrorKind::Unsupported,
        }
    }

    /// The underlying `io::ErrorKind` for I/O failures.
    ///
    /// Lets callers tell a missing directory apart from other read failures.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Io { source, .. } => Some(source.kind()),
            Error::Context { source, .. } => source.io_kind(),
            _ => None,
        }
    }

    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            context,
            path: path.into(),
            source,
        }
    }
}

/// Attach a step label to errors, in the manner of `anyhow::Context`.
pub(crate) trait ResultExt<T> {
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|source| Error::Context {
            context,
            source: Box::new(source),
        })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
