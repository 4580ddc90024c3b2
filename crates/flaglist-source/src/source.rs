use std::cmp::Ordering;
use std::collections::BTreeMap;

use flaglist_core::contracts::ListRequest;
use flaglist_core::contracts::Page;
use flaglist_core::error::FetchError;
use flaglist_core::state::ListStatus;
use flaglist_core::state::OrderBy;
use flaglist_core::state::OrderDirection;

use crate::record::Record;

/// Backend for one dashboard list.
///
/// `total_count` in the returned page is the size of the whole matching set,
/// independent of `page_size` and `cursor`.
pub trait ListDataSource<T> {
    fn list(&self, request: &ListRequest) -> Result<Page<T>, FetchError>;
}

impl<T, S: ListDataSource<T> + ?Sized> ListDataSource<T> for std::sync::Arc<S> {
    fn list(&self, request: &ListRequest) -> Result<Page<T>, FetchError> {
        (**self).list(request)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<Record>,
}

impl InMemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Every filter except the archived partition.
    fn matches(record: &Record, request: &ListRequest) -> bool {
        if record.environment_id != request.environment_id {
            return false;
        }
        if let Some(keyword) = &request.search_keyword {
            if !record.matches_keyword(keyword) {
                return false;
            }
        }
        if let Some(maintainer) = &request.maintainer {
            if &record.maintainer != maintainer {
                return false;
            }
        }
        if !request.tags.is_empty() && !request.tags.iter().any(|tag| record.tags.contains(tag)) {
            return false;
        }
        let flags = [
            (request.enabled, record.enabled),
            (request.has_experiment, record.has_experiment),
            (request.has_prerequisites, record.has_prerequisites),
            (request.has_feature_flag_as_rule, record.has_feature_flag_as_rule),
            (request.is_in_use_status, record.in_use),
        ];
        flags
            .into_iter()
            .all(|(wanted, actual)| wanted.map_or(true, |wanted| wanted == actual))
    }

    fn compare(order_by: OrderBy, left: &Record, right: &Record) -> Ordering {
        match order_by {
            OrderBy::Default | OrderBy::Name => left.name.cmp(&right.name),
            OrderBy::CreatedAt => left.created_at.cmp(&right.created_at),
            OrderBy::UpdatedAt => left.updated_at.cmp(&right.updated_at),
            OrderBy::Tags => left.tags_label().cmp(&right.tags_label()),
            OrderBy::Enabled => left.enabled.cmp(&right.enabled),
        }
    }
}

fn parse_cursor(cursor: &str) -> Result<usize, FetchError> {
    if cursor.is_empty() {
        return Ok(0);
    }
    cursor
        .parse::<usize>()
        .map_err(|_| FetchError::invalid_argument("cursor"))
}

impl ListDataSource<Record> for InMemorySource {
    fn list(&self, request: &ListRequest) -> Result<Page<Record>, FetchError> {
        if request.page_size == 0 {
            return Err(FetchError::invalid_argument("pageSize"));
        }
        let offset = parse_cursor(&request.cursor)?;

        let candidates: Vec<&Record> = self
            .records
            .iter()
            .filter(|record| Self::matches(record, request))
            .collect();

        let archived_count = candidates.iter().filter(|record| record.archived).count() as u64;
        let mut status_counts = BTreeMap::new();
        status_counts.insert(
            ListStatus::Active.as_query_value().to_string(),
            candidates.len() as u64 - archived_count,
        );
        status_counts.insert(
            ListStatus::Archived.as_query_value().to_string(),
            archived_count,
        );

        let mut matching: Vec<&Record> = candidates
            .into_iter()
            .filter(|record| record.archived == request.archived)
            .collect();
        matching.sort_by(|left, right| {
            let ordering = Self::compare(request.order_by, left, right);
            let ordering = match request.order_direction {
                OrderDirection::Asc => ordering,
                OrderDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| left.id.cmp(&right.id))
        });

        let total_count = matching.len() as u64;
        let items: Vec<Record> = matching
            .into_iter()
            .skip(offset)
            .take(request.page_size as usize)
            .cloned()
            .collect();
        tracing::debug!(
            environment = %request.environment_id,
            offset,
            returned = items.len(),
            total_count,
            "served list page"
        );

        Ok(Page {
            cursor: (offset + items.len()).to_string(),
            items,
            total_count,
            status_counts: Some(status_counts),
        })
    }
}

/// Backend that rejects every request with the same error.
#[derive(Debug, Clone)]
pub struct FailingSource {
    error: FetchError,
}

impl FailingSource {
    pub fn new(error: FetchError) -> Self {
        Self { error }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(FetchError::Unavailable(reason.into()))
    }
}

impl<T> ListDataSource<T> for FailingSource {
    fn list(&self, _request: &ListRequest) -> Result<Page<T>, FetchError> {
        Err(self.error.clone())
    }
}
