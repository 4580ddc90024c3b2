use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// One row of any dashboard list. Fields a list kind has no use for stay at
/// their defaults in fixtures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub description: String,
    pub environment_id: String,
    pub tags: Vec<String>,
    pub maintainer: String,
    pub enabled: bool,
    pub archived: bool,
    pub has_experiment: bool,
    pub has_prerequisites: bool,
    pub has_feature_flag_as_rule: bool,
    pub in_use: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn new(id: impl Into<String>, environment_id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            environment_id: environment_id.into(),
            ..Self::default()
        }
    }

    pub fn tags_label(&self) -> String {
        self.tags.join(", ")
    }

    pub(crate) fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        [&self.id, &self.name, &self.description]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
