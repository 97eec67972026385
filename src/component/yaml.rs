use super::{ComponentBase, NamespaceParameter, Object, ParamOptions, Summary, params};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// A component holding literal manifests in YAML (or JSON).
///
/// Each document is addressed by its index; its parameters live under
/// `<name>-<index>` and are merged over the document when rendering.
#[derive(Clone, Debug)]
pub struct YamlComponent {
    pub(super) base: ComponentBase,
}

impl YamlComponent {
    pub(super) fn new(base: ComponentBase) -> Self {
        Self { base }
    }

    fn param_key(&self, index: usize) -> String {
        format!("{}-{}", self.base.name, index)
    }

    /// Parse every non-empty document in the backing file.
    fn documents(&self) -> Result<Vec<Object>> {
        let path = &self.base.path;
        let raw = self
            .base
            .app
            .fs()
            .read_to_string(path)
            .map_err(|err| Error::io("read component", path, err))?;
        let parse_error = |reason: String| Error::Parse {
            path: path.clone(),
            reason,
        };

        let mut docs = Vec::new();
        for (idx, document) in serde_yaml::Deserializer::from_str(&raw).enumerate() {
            let value = Value::deserialize(document)
                .map_err(|err| parse_error(format!("document {idx}: {err}")))?;
            match value {
                Value::Null => continue,
                Value::Object(fields) => docs.push(Object::new(fields)),
                _ => return Err(parse_error(format!("document {idx} is not a mapping"))),
            }
        }
        Ok(docs)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let count = self.documents()?.len();
        if index >= count {
            return Err(Error::Params {
                path: self.base.namespace.params_path(),
                reason: format!(
                    "index {index} out of range for {} ({count} documents)",
                    self.base.name(true)
                ),
            });
        }
        Ok(())
    }

    pub fn objects(&self, env: &str) -> Result<Vec<Object>> {
        let mut objects = Vec::new();
        for (index, doc) in self.documents()?.into_iter().enumerate() {
            let overrides = self.base.resolved_params(&self.param_key(index), env)?;
            let mut fields = doc.0;
            params::deep_merge(&mut fields, &overrides);
            objects.push(Object::new(fields));
        }
        Ok(objects)
    }

    pub fn set_param(&self, path: &[String], value: Value, options: ParamOptions) -> Result<()> {
        self.check_index(options.index)?;
        self.base
            .set_param(&self.param_key(options.index), path, value)
    }

    pub fn delete_param(&self, path: &[String], options: ParamOptions) -> Result<()> {
        self.base.delete_param(&self.param_key(options.index), path)
    }

    pub fn params(&self, env: &str) -> Result<Vec<NamespaceParameter>> {
        let mut entries = Vec::new();
        for index in 0..self.documents()?.len() {
            entries.extend(self.base.report_params(&self.param_key(index), index, env)?);
        }
        Ok(entries)
    }

    pub fn summarize(&self) -> Result<Vec<Summary>> {
        Ok(self
            .documents()?
            .iter()
            .enumerate()
            .map(|(index, doc)| Summary {
                component_name: self.base.name(true),
                index_str: index.to_string(),
                index,
                kind_of_source: "yaml".to_string(),
                api_version: doc.api_version().to_string(),
                kind: doc.kind().to_string(),
                name: doc.name().to_string(),
            })
            .collect())
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

    const MANIFESTS: &str = "\
apiVersion: v1
kind: Service
metadata:
  name: web
spec:
  ports:
    - port: 80
---
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 1
";

    fn yaml_component(fs: MemFs) -> Component {
        let fs = fs.with_file("/ks/components/web.yaml", MANIFESTS);
        let app = App::load(Arc::new(fs), "/ks").unwrap();
        let ns = Namespace::root(&app);
        Component::from_path(&app, ns, Path::new("/ks/components/web.yaml")).unwrap()
    }

    #[test]
    fn summarize_reports_each_document() {
        let web = yaml_component(MemFs::new());
        let summaries = web.summarize().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].kind, "Service");
        assert_eq!(summaries[1].index_str, "1");
        assert_eq!(summaries[1].type_spec().unwrap().group, "apps");
        assert!(summaries.iter().all(|s| s.component_name == "web"));
    }

    #[test]
    fn objects_apply_indexed_params() {
        let web = yaml_component(MemFs::new().with_file("/ks/components/params.libsonnet", "{}"));
        web.set_param(
            &["spec".to_string(), "replicas".to_string()],
            json!(4),
            ParamOptions { index: 1 },
        )
        .unwrap();

        let objects = web.objects("").unwrap();
        assert_eq!(objects[0].fields()["spec"], json!({"ports": [{"port": 80}]}));
        assert_eq!(objects[1].fields()["spec"]["replicas"], json!(4));

        let params = web.params("").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].index, "1");
        assert_eq!(params[0].key, "spec");
        assert_eq!(params[0].value, r#"{"replicas":4}"#);
    }

    #[test]
    fn set_param_rejects_out_of_range_index() {
        let web = yaml_component(MemFs::new().with_file("/ks/components/params.libsonnet", "{}"));
        let err = web
            .set_param(&["x".to_string()], json!(1), ParamOptions { index: 2 })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Params);

        let err = web
            .delete_param(&["x".to_string()], ParamOptions { index: 0 })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParamNotFound);
    }

    #[test]
    fn non_mapping_document_is_a_parse_error() {
        let fs = MemFs::new().with_file("/ks/components/list.yaml", "- a\n- b\n");
        let app = App::load(Arc::new(fs), "/ks").unwrap();
        let list = Component::from_path(
            &app,
            Namespace::root(&app),
            Path::new("/ks/components/list.yaml"),
        )
        .unwrap();
        assert_eq!(list.summarize().unwrap_err().kind(), ErrorKind::Parse);
    }
}
