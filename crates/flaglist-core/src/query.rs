//! URL query string mirror of a [`FilterState`].
//!
//! Format: flat `key=value` pairs joined by `&`, percent-encoded, `tags`
//! repeated once per tag, e.g. `page=2&searchQuery=check%20out&tags=web&tags=ios`.

use super::state::FilterKey;
use super::state::FilterState;
use super::state::ListStatus;
use super::state::OrderBy;
use super::state::OrderDirection;
use super::state::FIRST_PAGE;

pub const KEY_PAGE: &str = "page";
pub const KEY_PAGE_SIZE: &str = "pageSize";
pub const KEY_ORDER_BY: &str = "orderBy";
pub const KEY_ORDER_DIRECTION: &str = "orderDirection";
pub const KEY_SEARCH_QUERY: &str = "searchQuery";
pub const KEY_STATUS: &str = "status";

fn decode_component(component: &str) -> Option<String> {
    let spaced = component.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(err) => {
            tracing::debug!(component, %err, "dropping undecodable query component");
            None
        }
    }
}

/// Splits a query string into decoded key/value pairs, keeping order and repeats.
pub fn parse_pairs(query: &str) -> Vec<(String, String)> {
    query
        .trim()
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Some((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn parse_positive(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|parsed| *parsed >= 1)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Builds a [`FilterState`] from a URL query, falling back to `defaults` for
/// every key that is missing or malformed.
pub fn initialize(query: &str, defaults: &FilterState) -> FilterState {
    let pairs = parse_pairs(query);
    let mut state = defaults.clone();
    let mut recognized = 0usize;
    let mut tags_seen = false;

    for (key, value) in &pairs {
        match key.as_str() {
            KEY_PAGE => {
                recognized += 1;
                state.page = parse_positive(value).unwrap_or_else(|| {
                    tracing::debug!(value = %value, "malformed page in query, using default");
                    defaults.page.max(FIRST_PAGE)
                });
            }
            KEY_PAGE_SIZE => {
                recognized += 1;
                state.page_size = parse_positive(value).unwrap_or(defaults.page_size);
            }
            KEY_ORDER_BY => {
                recognized += 1;
                state.order_by = OrderBy::from_query_value(value).unwrap_or(defaults.order_by);
            }
            KEY_ORDER_DIRECTION => {
                recognized += 1;
                state.order_direction =
                    OrderDirection::from_query_value(value).unwrap_or(defaults.order_direction);
            }
            KEY_SEARCH_QUERY => {
                recognized += 1;
                state.search_query = value.clone();
            }
            KEY_STATUS => {
                recognized += 1;
                state.status = ListStatus::from_query_value(value).unwrap_or(defaults.status);
            }
            other => {
                let Some(filter) = FilterKey::from_query_key(other) else {
                    tracing::trace!(key = other, "ignoring unrecognized query key");
                    continue;
                };
                recognized += 1;
                let filters = &mut state.filters;
                match filter {
                    FilterKey::Maintainer => {
                        filters.maintainer = (!value.is_empty()).then(|| value.clone());
                    }
                    FilterKey::Tags => {
                        if !tags_seen {
                            filters.tags.clear();
                            tags_seen = true;
                        }
                        if !value.is_empty() && !filters.tags.contains(value) {
                            filters.tags.push(value.clone());
                        }
                    }
                    FilterKey::Enabled => filters.enabled = parse_bool(value),
                    FilterKey::HasExperiment => filters.has_experiment = parse_bool(value),
                    FilterKey::HasPrerequisites => filters.has_prerequisites = parse_bool(value),
                    FilterKey::HasFeatureFlagAsRule => {
                        filters.has_feature_flag_as_rule = parse_bool(value)
                    }
                    FilterKey::IsInUseStatus => filters.is_in_use_status = parse_bool(value),
                }
            }
        }
    }

    if recognized == 0 {
        tracing::debug!("no recognized keys in query, applying defaults");
        return defaults.clone();
    }
    state
}

/// Collects query pairs, skipping values equal to their default.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    pairs: Vec<(&'static str, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_number(&mut self, key: &'static str, value: u32, default: u32) {
        if value != default {
            self.pairs.push((key, value.to_string()));
        }
    }

    pub fn set_str(&mut self, key: &'static str, value: &str, default: &str) {
        if value != default {
            self.pairs.push((key, value.to_string()));
        }
    }

    pub fn set_optional_str(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            self.pairs.push((key, value.to_string()));
        }
    }

    pub fn set_optional_bool(&mut self, key: &'static str, value: Option<bool>) {
        if let Some(value) = value {
            self.pairs
                .push((key, if value { "true" } else { "false" }.to_string()));
        }
    }

    pub fn push_each(&mut self, key: &'static str, values: &[String]) {
        for value in values.iter().filter(|value| !value.is_empty()) {
            self.pairs.push((key, value.clone()));
        }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn build(self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn builder_for(state: &FilterState, defaults: &FilterState) -> QueryBuilder {
    let mut builder = QueryBuilder::new();
    builder.set_number(KEY_PAGE, state.page, defaults.page);
    builder.set_number(KEY_PAGE_SIZE, state.page_size, defaults.page_size);
    builder.set_str(
        KEY_ORDER_BY,
        state.order_by.as_query_value(),
        defaults.order_by.as_query_value(),
    );
    builder.set_str(
        KEY_ORDER_DIRECTION,
        state.order_direction.as_query_value(),
        defaults.order_direction.as_query_value(),
    );
    builder.set_str(KEY_SEARCH_QUERY, &state.search_query, &defaults.search_query);
    builder.set_str(
        KEY_STATUS,
        state.status.as_query_value(),
        defaults.status.as_query_value(),
    );

    let filters = &state.filters;
    builder.set_optional_str(
        FilterKey::Maintainer.query_key(),
        filters.maintainer.as_deref(),
    );
    if filters.tags != defaults.filters.tags {
        builder.push_each(FilterKey::Tags.query_key(), &filters.tags);
    }
    for key in [
        FilterKey::Enabled,
        FilterKey::HasExperiment,
        FilterKey::HasPrerequisites,
        FilterKey::HasFeatureFlagAsRule,
        FilterKey::IsInUseStatus,
    ] {
        builder.set_optional_bool(key.query_key(), filters.flag(key));
    }
    builder
}

/// Renders `state` as a query string without a leading `?`.
pub fn serialize(state: &FilterState, defaults: &FilterState) -> String {
    builder_for(state, defaults).build()
}

/// The non-default pairs of `state`, unencoded. Used for filter chips.
pub fn active_pairs(state: &FilterState, defaults: &FilterState) -> Vec<(&'static str, String)> {
    builder_for(state, defaults).pairs().to_vec()
}
