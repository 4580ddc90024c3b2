use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::state::EnvironmentScope;
use super::state::FilterState;
use super::state::ListStatus;
use super::state::OrderBy;
use super::state::OrderDirection;

/// Request handed to a list backend. Absent filters are skipped on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub environment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    pub cursor: String,
    pub page_size: u32,
    pub order_by: OrderBy,
    pub order_direction: OrderDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_keyword: Option<String>,
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_experiment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_prerequisites: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_feature_flag_as_rule: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_in_use_status: Option<bool>,
}

/// One page of a list response. `total_count` covers the whole matching set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub cursor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_counts: Option<BTreeMap<String, u64>>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            cursor: "0".to_string(),
            status_counts: None,
        }
    }
}

pub fn cursor_for(page: u32, page_size: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(page_size)
}

pub fn to_request(state: &FilterState, scope: &EnvironmentScope) -> ListRequest {
    let search = state.search_query.trim();
    let filters = &state.filters;
    ListRequest {
        environment_id: scope.environment_id.clone(),
        organization_id: scope
            .organization_id
            .clone()
            .filter(|organization| !organization.is_empty()),
        cursor: cursor_for(state.page, state.page_size).to_string(),
        page_size: state.page_size,
        order_by: state.order_by,
        order_direction: state.order_direction,
        search_keyword: (!search.is_empty()).then(|| search.to_string()),
        archived: state.status == ListStatus::Archived,
        maintainer: filters
            .maintainer
            .clone()
            .filter(|maintainer| !maintainer.is_empty()),
        tags: filters
            .tags
            .iter()
            .filter(|tag| !tag.is_empty())
            .cloned()
            .collect(),
        enabled: filters.enabled,
        has_experiment: filters.has_experiment,
        has_prerequisites: filters.has_prerequisites,
        has_feature_flag_as_rule: filters.has_feature_flag_as_rule,
        is_in_use_status: filters.is_in_use_status,
    }
}
