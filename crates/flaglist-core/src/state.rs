use serde::Deserialize;
use serde::Serialize;

use super::contracts::ListRequest;
use super::contracts::Page;
use super::error::FetchError;

pub const LIST_PAGE_SIZE: u32 = 50;
pub const FIRST_PAGE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderBy {
    Default,
    Name,
    CreatedAt,
    UpdatedAt,
    Tags,
    Enabled,
}

impl OrderBy {
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Name => "NAME",
            Self::CreatedAt => "CREATED_AT",
            Self::UpdatedAt => "UPDATED_AT",
            Self::Tags => "TAGS",
            Self::Enabled => "ENABLED",
        }
    }

    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "DEFAULT" => Some(Self::Default),
            "NAME" => Some(Self::Name),
            "CREATED_AT" => Some(Self::CreatedAt),
            "UPDATED_AT" => Some(Self::UpdatedAt),
            "TAGS" => Some(Self::Tags),
            "ENABLED" => Some(Self::Enabled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Name => "Name",
            Self::CreatedAt => "Created at",
            Self::UpdatedAt => "Updated at",
            Self::Tags => "Tags",
            Self::Enabled => "Enabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

/// Tab selector: which partition of an entity list is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListStatus {
    Active,
    Archived,
}

impl ListStatus {
    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Archived => "ARCHIVED",
        }
    }

    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(Self::Active),
            "ARCHIVED" => Some(Self::Archived),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Active => Self::Archived,
            Self::Archived => Self::Active,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Archived => "Archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    Features,
    Goals,
    Segments,
    AuditLogs,
    Accounts,
    ApiKeys,
}

const FEATURE_FILTERS: &[FilterKey] = &[
    FilterKey::Maintainer,
    FilterKey::Tags,
    FilterKey::Enabled,
    FilterKey::HasExperiment,
    FilterKey::HasPrerequisites,
    FilterKey::HasFeatureFlagAsRule,
];
const USAGE_FILTERS: &[FilterKey] = &[FilterKey::IsInUseStatus];
const ENABLED_FILTERS: &[FilterKey] = &[FilterKey::Enabled];

const COMMON_SORTS: &[(OrderBy, OrderDirection)] = &[
    (OrderBy::CreatedAt, OrderDirection::Desc),
    (OrderBy::CreatedAt, OrderDirection::Asc),
    (OrderBy::Name, OrderDirection::Asc),
    (OrderBy::Name, OrderDirection::Desc),
    (OrderBy::UpdatedAt, OrderDirection::Desc),
];
const FEATURE_SORTS: &[(OrderBy, OrderDirection)] = &[
    (OrderBy::CreatedAt, OrderDirection::Desc),
    (OrderBy::CreatedAt, OrderDirection::Asc),
    (OrderBy::Name, OrderDirection::Asc),
    (OrderBy::Name, OrderDirection::Desc),
    (OrderBy::UpdatedAt, OrderDirection::Desc),
    (OrderBy::Tags, OrderDirection::Asc),
    (OrderBy::Enabled, OrderDirection::Desc),
];

impl ListKind {
    pub const ALL: [ListKind; 6] = [
        Self::Features,
        Self::Goals,
        Self::Segments,
        Self::AuditLogs,
        Self::Accounts,
        Self::ApiKeys,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Self::Features => "features",
            Self::Goals => "goals",
            Self::Segments => "segments",
            Self::AuditLogs => "audit-logs",
            Self::Accounts => "accounts",
            Self::ApiKeys => "api-keys",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.slug() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Features => "Feature flags",
            Self::Goals => "Goals",
            Self::Segments => "User segments",
            Self::AuditLogs => "Audit logs",
            Self::Accounts => "Accounts",
            Self::ApiKeys => "API keys",
        }
    }

    pub fn accepted_filters(self) -> &'static [FilterKey] {
        match self {
            Self::Features => FEATURE_FILTERS,
            Self::Goals | Self::Segments => USAGE_FILTERS,
            Self::AuditLogs => &[],
            Self::Accounts | Self::ApiKeys => ENABLED_FILTERS,
        }
    }

    pub fn accepts(self, key: FilterKey) -> bool {
        self.accepted_filters().contains(&key)
    }

    pub fn default_order(self) -> (OrderBy, OrderDirection) {
        (OrderBy::CreatedAt, OrderDirection::Desc)
    }

    pub fn sort_options(self) -> &'static [(OrderBy, OrderDirection)] {
        match self {
            Self::Features => FEATURE_SORTS,
            _ => COMMON_SORTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Maintainer,
    Tags,
    Enabled,
    HasExperiment,
    HasPrerequisites,
    HasFeatureFlagAsRule,
    IsInUseStatus,
}

impl FilterKey {
    pub const ALL: [FilterKey; 7] = [
        Self::Maintainer,
        Self::Tags,
        Self::Enabled,
        Self::HasExperiment,
        Self::HasPrerequisites,
        Self::HasFeatureFlagAsRule,
        Self::IsInUseStatus,
    ];

    pub fn query_key(self) -> &'static str {
        match self {
            Self::Maintainer => "maintainer",
            Self::Tags => "tags",
            Self::Enabled => "enabled",
            Self::HasExperiment => "hasExperiment",
            Self::HasPrerequisites => "hasPrerequisites",
            Self::HasFeatureFlagAsRule => "hasFeatureFlagAsRule",
            Self::IsInUseStatus => "isInUseStatus",
        }
    }

    pub fn from_query_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|filter| filter.query_key() == key)
    }
}

/// Optional per-entity filters. `None` (or an empty tag list) means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomainFilters {
    pub maintainer: Option<String>,
    pub tags: Vec<String>,
    pub enabled: Option<bool>,
    pub has_experiment: Option<bool>,
    pub has_prerequisites: Option<bool>,
    pub has_feature_flag_as_rule: Option<bool>,
    pub is_in_use_status: Option<bool>,
}

impl DomainFilters {
    pub fn is_empty(&self) -> bool {
        FilterKey::ALL.into_iter().all(|key| !self.is_present(key))
    }

    pub fn is_present(&self, key: FilterKey) -> bool {
        match key {
            FilterKey::Maintainer => self.maintainer.is_some(),
            FilterKey::Tags => !self.tags.is_empty(),
            FilterKey::Enabled => self.enabled.is_some(),
            FilterKey::HasExperiment => self.has_experiment.is_some(),
            FilterKey::HasPrerequisites => self.has_prerequisites.is_some(),
            FilterKey::HasFeatureFlagAsRule => self.has_feature_flag_as_rule.is_some(),
            FilterKey::IsInUseStatus => self.is_in_use_status.is_some(),
        }
    }

    pub fn active_count(&self) -> usize {
        FilterKey::ALL
            .into_iter()
            .filter(|key| self.is_present(*key))
            .count()
    }

    pub fn flag(&self, key: FilterKey) -> Option<bool> {
        match key {
            FilterKey::Enabled => self.enabled,
            FilterKey::HasExperiment => self.has_experiment,
            FilterKey::HasPrerequisites => self.has_prerequisites,
            FilterKey::HasFeatureFlagAsRule => self.has_feature_flag_as_rule,
            FilterKey::IsInUseStatus => self.is_in_use_status,
            FilterKey::Maintainer | FilterKey::Tags => None,
        }
    }

    pub fn clear(&mut self, key: FilterKey) {
        match key {
            FilterKey::Maintainer => self.maintainer = None,
            FilterKey::Tags => self.tags.clear(),
            FilterKey::Enabled => self.enabled = None,
            FilterKey::HasExperiment => self.has_experiment = None,
            FilterKey::HasPrerequisites => self.has_prerequisites = None,
            FilterKey::HasFeatureFlagAsRule => self.has_feature_flag_as_rule = None,
            FilterKey::IsInUseStatus => self.is_in_use_status = None,
        }
    }

    /// Drops every filter the list kind does not understand.
    pub fn retain_accepted(&mut self, kind: ListKind) {
        for key in FilterKey::ALL {
            if !kind.accepts(key) {
                self.clear(key);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub page: u32,
    pub page_size: u32,
    pub order_by: OrderBy,
    pub order_direction: OrderDirection,
    pub search_query: String,
    pub status: ListStatus,
    #[serde(flatten)]
    pub filters: DomainFilters,
}

impl FilterState {
    pub fn defaults_for(kind: ListKind, page_size: u32) -> Self {
        let (order_by, order_direction) = kind.default_order();
        Self {
            page: FIRST_PAGE,
            page_size: page_size.max(1),
            order_by,
            order_direction,
            search_query: String::new(),
            status: ListStatus::Active,
            filters: DomainFilters::default(),
        }
    }

    /// True when a search or any domain filter narrows the result set.
    pub fn has_active_filters(&self) -> bool {
        !self.search_query.trim().is_empty() || !self.filters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterField {
    Page(u32),
    PageSize(u32),
    OrderBy(OrderBy),
    OrderDirection(OrderDirection),
    SearchQuery(String),
    Status(ListStatus),
    Maintainer(Option<String>),
    Tags(Vec<String>),
    Enabled(Option<bool>),
    HasExperiment(Option<bool>),
    HasPrerequisites(Option<bool>),
    HasFeatureFlagAsRule(Option<bool>),
    IsInUseStatus(Option<bool>),
}

impl FilterField {
    /// The domain filter this field writes, `None` for paging and sort keys.
    pub fn filter_key(&self) -> Option<FilterKey> {
        match self {
            Self::Page(_)
            | Self::PageSize(_)
            | Self::OrderBy(_)
            | Self::OrderDirection(_)
            | Self::SearchQuery(_)
            | Self::Status(_) => None,
            Self::Maintainer(_) => Some(FilterKey::Maintainer),
            Self::Tags(_) => Some(FilterKey::Tags),
            Self::Enabled(_) => Some(FilterKey::Enabled),
            Self::HasExperiment(_) => Some(FilterKey::HasExperiment),
            Self::HasPrerequisites(_) => Some(FilterKey::HasPrerequisites),
            Self::HasFeatureFlagAsRule(_) => Some(FilterKey::HasFeatureFlagAsRule),
            Self::IsInUseStatus(_) => Some(FilterKey::IsInUseStatus),
        }
    }
}

/// A partial update merged into a [`FilterState`] by [`apply_partial`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub fields: Vec<FilterField>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: FilterField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn page(self, page: u32) -> Self {
        self.with(FilterField::Page(page))
    }

    pub fn page_size(self, page_size: u32) -> Self {
        self.with(FilterField::PageSize(page_size))
    }

    pub fn order(self, order_by: OrderBy, order_direction: OrderDirection) -> Self {
        self.with(FilterField::OrderBy(order_by))
            .with(FilterField::OrderDirection(order_direction))
    }

    pub fn search_query(self, query: impl Into<String>) -> Self {
        self.with(FilterField::SearchQuery(query.into()))
    }

    pub fn status(self, status: ListStatus) -> Self {
        self.with(FilterField::Status(status))
    }

    pub fn clear(self, key: FilterKey) -> Self {
        let field = match key {
            FilterKey::Maintainer => FilterField::Maintainer(None),
            FilterKey::Tags => FilterField::Tags(Vec::new()),
            FilterKey::Enabled => FilterField::Enabled(None),
            FilterKey::HasExperiment => FilterField::HasExperiment(None),
            FilterKey::HasPrerequisites => FilterField::HasPrerequisites(None),
            FilterKey::HasFeatureFlagAsRule => FilterField::HasFeatureFlagAsRule(None),
            FilterKey::IsInUseStatus => FilterField::IsInUseStatus(None),
        };
        self.with(field)
    }

    /// Replaces every domain filter; absent values in `filters` clear the key.
    pub fn filters(self, filters: DomainFilters) -> Self {
        self.with(FilterField::Maintainer(filters.maintainer))
            .with(FilterField::Tags(filters.tags))
            .with(FilterField::Enabled(filters.enabled))
            .with(FilterField::HasExperiment(filters.has_experiment))
            .with(FilterField::HasPrerequisites(filters.has_prerequisites))
            .with(FilterField::HasFeatureFlagAsRule(
                filters.has_feature_flag_as_rule,
            ))
            .with(FilterField::IsInUseStatus(filters.is_in_use_status))
    }

    /// Drops fields writing a filter the list kind does not understand.
    pub fn retain_accepted(mut self, kind: ListKind) -> Self {
        self.fields
            .retain(|field| field.filter_key().map_or(true, |key| kind.accepts(key)));
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !tag.is_empty() && !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}

fn assign<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Shallow-merges `patch` into `current`.
///
/// Empty strings and empty tag lists become absent. Invalid `page`/`pageSize`
/// values (zero) are ignored. Any change to a key other than `page` or
/// `pageSize` sends the result back to the first page unless the patch sets
/// `page` itself.
pub fn apply_partial(current: &FilterState, patch: &FilterPatch) -> FilterState {
    let mut next = current.clone();
    let mut explicit_page = None;
    let mut resets_page = false;

    for field in &patch.fields {
        let changed = match field {
            FilterField::Page(page) => {
                if *page >= FIRST_PAGE {
                    explicit_page = Some(*page);
                } else {
                    tracing::debug!(page, "ignoring non-positive page in patch");
                }
                continue;
            }
            FilterField::PageSize(page_size) => {
                if *page_size >= 1 {
                    next.page_size = *page_size;
                } else {
                    tracing::debug!("ignoring zero page size in patch");
                }
                continue;
            }
            FilterField::OrderBy(order_by) => assign(&mut next.order_by, *order_by),
            FilterField::OrderDirection(direction) => {
                assign(&mut next.order_direction, *direction)
            }
            FilterField::SearchQuery(query) => assign(&mut next.search_query, query.clone()),
            FilterField::Status(status) => assign(&mut next.status, *status),
            FilterField::Maintainer(maintainer) => {
                assign(&mut next.filters.maintainer, non_empty(maintainer.clone()))
            }
            FilterField::Tags(tags) => assign(&mut next.filters.tags, normalize_tags(tags)),
            FilterField::Enabled(value) => assign(&mut next.filters.enabled, *value),
            FilterField::HasExperiment(value) => {
                assign(&mut next.filters.has_experiment, *value)
            }
            FilterField::HasPrerequisites(value) => {
                assign(&mut next.filters.has_prerequisites, *value)
            }
            FilterField::HasFeatureFlagAsRule(value) => {
                assign(&mut next.filters.has_feature_flag_as_rule, *value)
            }
            FilterField::IsInUseStatus(value) => {
                assign(&mut next.filters.is_in_use_status, *value)
            }
        };
        resets_page |= changed;
    }

    if let Some(page) = explicit_page {
        next.page = page;
    } else if resets_page {
        next.page = FIRST_PAGE;
    }
    next
}

/// External tenant/environment identifier attached to every list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentScope {
    pub environment_id: String,
    pub organization_id: Option<String>,
}

impl EnvironmentScope {
    pub fn new(environment_id: impl Into<String>) -> Self {
        Self {
            environment_id: environment_id.into(),
            organization_id: None,
        }
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = non_empty(Some(organization_id.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    /// Sequence number of the most recently issued fetch; 0 before the first.
    pub latest_seq: u64,
    pub in_flight: Option<u64>,
    pub last_request: Option<ListRequest>,
    pub error: Option<FetchError>,
    pub page: Option<Page<T>>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            latest_seq: 0,
            in_flight: None,
            last_request: None,
            error: None,
            page: None,
        }
    }
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest_seq && self.in_flight == Some(seq)
    }

    pub fn status_count(&self, status: ListStatus) -> Option<u64> {
        self.page
            .as_ref()
            .and_then(|page| page.status_counts.as_ref())
            .and_then(|counts| counts.get(status.as_query_value()).copied())
    }
}

/// Everything one list page owns: query parameters, URL mirror and fetch lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPageState<T> {
    pub kind: ListKind,
    pub scope: EnvironmentScope,
    pub defaults: FilterState,
    pub filters: FilterState,
    pub url_query: String,
    pub fetch: FetchState<T>,
}

impl<T> ListPageState<T> {
    pub fn new(kind: ListKind, scope: EnvironmentScope, page_size: u32) -> Self {
        let defaults = FilterState::defaults_for(kind, page_size);
        Self {
            kind,
            scope,
            filters: defaults.clone(),
            defaults,
            url_query: String::new(),
            fetch: FetchState::default(),
        }
    }

    pub fn items(&self) -> &[T] {
        self.fetch
            .page
            .as_ref()
            .map(|page| page.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn total_count(&self) -> u64 {
        self.fetch.page.as_ref().map_or(0, |page| page.total_count)
    }
}
