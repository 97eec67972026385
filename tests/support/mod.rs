use anyhow::{Context, Result};
use ksresolve::{App, OsFs};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const APP_YAML: &str = "\
name: fixture
environments:
  default: {}
  app-only:
    targets: [app]
";

/// A scratch application on disk. The directory is removed on drop.
pub struct Fixture {
    temp: TempDir,
}

impl Fixture {
    /// Lay out the scenario tree: a root namespace holding `foo.jsonnet` and
    /// an `app` namespace holding `bar.jsonnet`.
    pub fn scenario() -> Result<Self> {
        let fixture = Self {
            temp: TempDir::new().context("failed to allocate app dir")?,
        };
        fixture.write("app.yaml", APP_YAML)?;
        fixture.write("components/params.libsonnet", "{}\n")?;
        fixture.write("components/foo.jsonnet", "{}\n")?;
        fixture.write("components/app/params.libsonnet", "{}\n")?;
        fixture.write("components/app/bar.jsonnet", "{}\n")?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) -> Result<()> {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn app(&self) -> App {
        App::load(Arc::new(OsFs), self.root()).expect("fixture app loads")
    }
}
