use super::{ComponentBase, NamespaceParameter, Object, ParamOptions, Summary};
use crate::error::{Error, Result};
use serde_json::Value;

/// A component written in Jsonnet. Parameters live under the component name.
#[derive(Clone, Debug)]
pub struct JsonnetComponent {
    pub(super) base: ComponentBase,
}

impl JsonnetComponent {
    pub(super) fn new(base: ComponentBase) -> Self {
        Self { base }
    }

    /// Rendering requires a Jsonnet evaluator, which this crate does not ship.
    pub fn objects(&self, _env: &str) -> Result<Vec<Object>> {
        Err(Error::Unsupported {
            component: self.base.name(true),
            operation: "rendering objects",
        })
    }

    // Jsonnet components produce a single parameter scope; the index is unused.
    pub fn set_param(&self, path: &[String], value: Value, _options: ParamOptions) -> Result<()> {
        self.base.set_param(&self.base.name, path, value)
    }

    pub fn delete_param(&self, path: &[String], _options: ParamOptions) -> Result<()> {
        self.base.delete_param(&self.base.name, path)
    }

    pub fn params(&self, env: &str) -> Result<Vec<NamespaceParameter>> {
        self.base.report_params(&self.base.name, 0, env)
    }

    pub fn summarize(&self) -> Result<Vec<Summary>> {
        Ok(vec![Summary {
            component_name: self.base.name(true),
            index_str: "0".to_string(),
            index: 0,
            kind_of_source: "jsonnet".to_string(),
            ..Summary::default()
        }])
    }
}

#[cfg(test)]
mod tests {
    use crate::component::Component;
    use crate::fs::MemFs;
    use crate::{App, ErrorKind, Namespace, ParamOptions};
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;

    const APP_YAML: &str = "environments:\n  prod:\n    targets: []\n";

    fn web_component(fs: Arc<MemFs>) -> Component {
        let app = App::load(fs, "/ks").unwrap();
        let ns = Namespace::new(&app, "app");
        Component::from_path(&app, ns, Path::new("/ks/components/app/web.jsonnet")).unwrap()
    }

    #[test]
    fn params_round_trip_through_namespace_file() {
        let fs = Arc::new(
            MemFs::new()
                .with_file("/ks/app.yaml", APP_YAML)
                .with_file("/ks/components/app/params.libsonnet", "")
                .with_file("/ks/components/app/web.jsonnet", "{}"),
        );
        let web = web_component(Arc::clone(&fs));

        let path = vec!["image".to_string()];
        web.set_param(&path, json!("nginx:1.15"), ParamOptions { index: 4 })
            .unwrap();
        web.set_param(&["replicas".to_string()], json!(2), ParamOptions::default())
            .unwrap();

        let params = web.params("").unwrap();
        let rendered: Vec<_> = params
            .iter()
            .map(|p| (p.component.as_str(), p.index.as_str(), p.key.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("app/web", "0", "image", "\"nginx:1.15\""),
                ("app/web", "0", "replicas", "2"),
            ]
        );

        web.delete_param(&path, ParamOptions::default()).unwrap();
        assert_eq!(web.params("").unwrap().len(), 1);
    }

    #[test]
    fn env_params_override_local_values() {
        let fs = Arc::new(
            MemFs::new()
                .with_file("/ks/app.yaml", APP_YAML)
                .with_file(
                    "/ks/components/app/params.libsonnet",
                    r#"{"components": {"web": {"replicas": 1, "image": "nginx"}}}"#,
                )
                .with_file(
                    "/ks/environments/prod/params.libsonnet",
                    r#"{"components": {"app/web": {"replicas": 5}}}"#,
                )
                .with_file("/ks/components/app/web.jsonnet", "{}"),
        );
        let web = web_component(fs);

        let prod = web.params("prod").unwrap();
        let replicas = prod.iter().find(|p| p.key == "replicas").unwrap();
        assert_eq!(replicas.value, "5");
        let local = web.params("").unwrap();
        let replicas = local.iter().find(|p| p.key == "replicas").unwrap();
        assert_eq!(replicas.value, "1");

        let err = web.params("staging").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EnvironmentNotFound);
    }

    #[test]
    fn summarize_without_rendering() {
        let fs = Arc::new(MemFs::new().with_file("/ks/components/app/web.jsonnet", "{}"));
        let web = web_component(fs);

        let summaries = web.summarize().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].component_name, "app/web");
        assert_eq!(summaries[0].kind_of_source, "jsonnet");

        let err = web.objects("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }
}
