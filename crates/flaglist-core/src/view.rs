use super::contracts::cursor_for;
use super::error::FetchError;
use super::state::FilterState;
use super::state::ListPageState;
use super::state::ListStatus;

pub fn page_count(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size))
}

/// Last page a list can show; an empty list still has page 1.
pub fn last_page(total_count: u64, page_size: u32) -> u32 {
    let pages = page_count(total_count, page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub page_count: u64,
    pub total_count: u64,
    /// 1-based index of the first item on the current page.
    pub first_item: u64,
    pub last_item: u64,
}

impl Pagination {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.current_page) < self.page_count
    }
}

/// Pagination control model; `None` when everything fits on one page.
pub fn pagination(
    filters: &FilterState,
    total_count: u64,
    items_on_page: usize,
) -> Option<Pagination> {
    if total_count <= u64::from(filters.page_size) {
        return None;
    }
    let offset = cursor_for(filters.page, filters.page_size);
    Some(Pagination {
        current_page: filters.page,
        page_count: page_count(total_count, filters.page_size),
        total_count,
        first_item: (offset + 1).min(total_count),
        last_item: (offset + items_on_page as u64).min(total_count),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionView<'a, T> {
    Loading,
    Error {
        error: &'a FetchError,
    },
    Empty {
        /// A search or filter is active, as opposed to the list having no data.
        filtered: bool,
    },
    Populated {
        items: &'a [T],
        total_count: u64,
        pagination: Option<Pagination>,
    },
}

pub fn project<T>(state: &ListPageState<T>) -> CollectionView<'_, T> {
    let fetch = &state.fetch;
    if fetch.is_loading() {
        return CollectionView::Loading;
    }
    if let Some(error) = &fetch.error {
        return CollectionView::Error { error };
    }
    let Some(page) = &fetch.page else {
        return CollectionView::Loading;
    };
    if page.items.is_empty() {
        return CollectionView::Empty {
            filtered: state.filters.has_active_filters(),
        };
    }
    CollectionView::Populated {
        items: &page.items,
        total_count: page.total_count,
        pagination: pagination(&state.filters, page.total_count, page.items.len()),
    }
}

pub fn empty_message(filtered: bool) -> &'static str {
    if filtered {
        "No results match the current search or filters."
    } else {
        "Nothing here yet."
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTab {
    pub status: ListStatus,
    pub count: Option<u64>,
    pub selected: bool,
}

pub fn status_tabs<T>(state: &ListPageState<T>) -> [StatusTab; 2] {
    [ListStatus::Active, ListStatus::Archived].map(|status| StatusTab {
        status,
        count: state.fetch.status_count(status),
        selected: state.filters.status == status,
    })
}
