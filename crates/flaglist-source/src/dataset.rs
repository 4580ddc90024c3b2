use std::collections::BTreeMap;
use std::path::Path;

use flaglist_core::state::ListKind;
use thiserror::Error;

use crate::record::Record;
use crate::source::InMemorySource;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML dataset: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON dataset: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown list kind `{0}` in dataset")]
    UnknownKind(String),
    #[error("unsupported dataset extension for {0} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Yaml,
    Json,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Fixture records keyed by list kind, e.g.
///
/// ```yaml
/// features:
///   - id: new-checkout
///     environment_id: env-dev
///     tags: [web]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    lists: BTreeMap<ListKind, Vec<Record>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str, format: DatasetFormat) -> Result<Self, DatasetError> {
        let raw: BTreeMap<String, Vec<Record>> = match format {
            DatasetFormat::Yaml => serde_yaml::from_str(text)?,
            DatasetFormat::Json => serde_json::from_str(text)?,
        };
        let mut lists = BTreeMap::new();
        for (slug, records) in raw {
            let kind = ListKind::from_slug(&slug).ok_or(DatasetError::UnknownKind(slug))?;
            lists.insert(kind, records);
        }
        Ok(Self { lists })
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let format = DatasetFormat::from_path(path)
            .ok_or_else(|| DatasetError::UnsupportedFormat(path.display().to_string()))?;
        let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let dataset = Self::parse(&text, format)?;
        tracing::info!(
            path = %path.display(),
            lists = dataset.lists.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    pub fn records(&self, kind: ListKind) -> &[Record] {
        self.lists.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Backend serving one list. A kind missing from the dataset is an empty list.
    pub fn source(&self, kind: ListKind) -> InMemorySource {
        InMemorySource::new(self.records(kind).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use flaglist_core::contracts::to_request;
    use flaglist_core::state::EnvironmentScope;
    use flaglist_core::state::FilterState;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    use super::*;
    use crate::source::ListDataSource;

    const YAML: &str = r#"
features:
  - id: new-checkout
    name: New checkout
    environment_id: env-dev
    tags: [web]
    enabled: true
    created_at: 2024-03-01T10:00:00Z
  - id: dark-mode
    environment_id: env-dev
    archived: true
segments:
  - id: beta-users
    environment_id: env-dev
    in_use: true
"#;

    #[test]
    fn loads_yaml_by_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("tempfile");
        file.write_all(YAML.as_bytes()).expect("write");

        let dataset = Dataset::load(file.path()).expect("load");
        assert_eq!(dataset.records(ListKind::Features).len(), 2);
        assert_eq!(dataset.records(ListKind::Features)[0].name, "New checkout");
        assert_eq!(dataset.records(ListKind::Features)[1].name, "");
        assert!(dataset.records(ListKind::Segments)[0].in_use);
        assert!(dataset.records(ListKind::Goals).is_empty());
    }

    #[test]
    fn loads_json_and_serves_requests() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fixtures.json");
        std::fs::write(
            &path,
            r#"{"goals": [{"id": "signup", "environment_id": "env-dev"}]}"#,
        )
        .expect("write");

        let dataset = Dataset::load(&path).expect("load");
        let request = to_request(
            &FilterState::defaults_for(ListKind::Goals, 50),
            &EnvironmentScope::new("env-dev"),
        );
        let page = dataset.source(ListKind::Goals).list(&request).expect("list");
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].id, "signup");
    }

    #[test]
    fn rejects_unknown_kind_and_extension() {
        let err = Dataset::parse("flags: []", DatasetFormat::Yaml).expect_err("unknown kind");
        assert!(matches!(err, DatasetError::UnknownKind(kind) if kind == "flags"));

        let err = Dataset::load(Path::new("fixtures.csv")).expect_err("bad extension");
        assert!(matches!(err, DatasetError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.yml");
        let err = Dataset::load(&path).expect_err("missing");
        assert!(err.to_string().contains("missing.yml"));
    }
}
