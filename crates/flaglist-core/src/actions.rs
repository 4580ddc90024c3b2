use super::contracts::Page;
use super::error::FetchError;
use super::state::DomainFilters;
use super::state::EnvironmentScope;
use super::state::FilterKey;
use super::state::FilterPatch;
use super::state::ListStatus;
use super::state::OrderBy;
use super::state::OrderDirection;

#[derive(Debug, Clone)]
pub enum ListAction<T> {
    User(UserAction),
    Runtime(RuntimeAction<T>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Search(String),
    /// Switches tab; the search box is cleared along with the page.
    SelectStatus(ListStatus),
    ToggleStatus,
    SetSort {
        order_by: OrderBy,
        order_direction: OrderDirection,
    },
    CycleSort,
    ApplyFilters(DomainFilters),
    ClearFilter(FilterKey),
    ClearAll,
    ChangePage(u32),
    NextPage,
    PrevPage,
    ChangePageSize(u32),
    Patch(FilterPatch),
    Retry,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction<T> {
    /// Mount or navigation: rebuild filters from the URL and fetch.
    Initialize {
        query: String,
    },
    SetScope(EnvironmentScope),
    FetchSucceeded {
        seq: u64,
        page: Page<T>,
    },
    FetchFailed {
        seq: u64,
        error: FetchError,
    },
}
