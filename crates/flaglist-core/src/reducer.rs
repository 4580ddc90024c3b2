#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEffect {
    /// Rewrite the address bar in place (no new history entry).
    ReplaceUrl(String),
    Fetch {
        seq: u64,
        request: ListRequest,
    },
    RequestFrame,
}

use super::actions::ListAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::contracts::to_request;
use super::contracts::ListRequest;
use super::query::initialize;
use super::query::serialize;
use super::state::apply_partial;
use super::state::FilterPatch;
use super::state::ListPageState;
use super::state::FIRST_PAGE;
use super::view::last_page;

pub fn reduce<T>(state: &mut ListPageState<T>, action: ListAction<T>) -> Vec<ListEffect> {
    match action {
        ListAction::User(user) => reduce_user(state, user),
        ListAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn reduce_user<T>(state: &mut ListPageState<T>, action: UserAction) -> Vec<ListEffect> {
    match action {
        UserAction::Search(query) => commit(state, FilterPatch::new().search_query(query)),
        UserAction::SelectStatus(status) => {
            if state.filters.status == status {
                return Vec::new();
            }
            commit(state, FilterPatch::new().status(status).search_query(String::new()))
        }
        UserAction::ToggleStatus => {
            let status = state.filters.status.toggle();
            reduce_user(state, UserAction::SelectStatus(status))
        }
        UserAction::SetSort {
            order_by,
            order_direction,
        } => commit(state, FilterPatch::new().order(order_by, order_direction)),
        UserAction::CycleSort => {
            let options = state.kind.sort_options();
            let current = (state.filters.order_by, state.filters.order_direction);
            let next = options
                .iter()
                .position(|option| *option == current)
                .map_or(0, |idx| (idx + 1) % options.len());
            let Some((order_by, order_direction)) = options.get(next).copied() else {
                return Vec::new();
            };
            reduce_user(
                state,
                UserAction::SetSort {
                    order_by,
                    order_direction,
                },
            )
        }
        UserAction::ApplyFilters(filters) => commit(state, FilterPatch::new().filters(filters)),
        UserAction::ClearFilter(key) => commit(state, FilterPatch::new().clear(key)),
        UserAction::ClearAll => {
            if state.filters == state.defaults {
                return Vec::new();
            }
            state.filters = state.defaults.clone();
            sync_and_fetch(state)
        }
        UserAction::ChangePage(page) => commit(state, FilterPatch::new().page(page)),
        UserAction::NextPage => {
            // The last page is only known for the filters that were fetched.
            if state.fetch.is_loading() {
                return Vec::new();
            }
            let page = state.filters.page;
            if let Some(fetched) = &state.fetch.page {
                if page >= last_page(fetched.total_count, state.filters.page_size) {
                    return Vec::new();
                }
            }
            reduce_user(state, UserAction::ChangePage(page.saturating_add(1)))
        }
        UserAction::PrevPage => {
            if state.filters.page <= FIRST_PAGE {
                return Vec::new();
            }
            let page = state.filters.page - 1;
            reduce_user(state, UserAction::ChangePage(page))
        }
        UserAction::ChangePageSize(page_size) => commit(
            state,
            FilterPatch::new().page_size(page_size).page(FIRST_PAGE),
        ),
        UserAction::Patch(patch) => commit(state, patch),
        UserAction::Retry => retry(state),
    }
}

fn reduce_runtime<T>(state: &mut ListPageState<T>, action: RuntimeAction<T>) -> Vec<ListEffect> {
    match action {
        RuntimeAction::Initialize { query } => {
            let mut filters = initialize(&query, &state.defaults);
            filters.filters.retain_accepted(state.kind);
            state.filters = filters;

            let canonical = serialize(&state.filters, &state.defaults);
            let mut effects = Vec::new();
            if canonical != query.trim().trim_start_matches('?') {
                effects.push(ListEffect::ReplaceUrl(canonical.clone()));
            }
            state.url_query = canonical;
            effects.push(issue_fetch(state));
            effects.push(ListEffect::RequestFrame);
            effects
        }
        RuntimeAction::SetScope(scope) => {
            if state.scope == scope {
                return Vec::new();
            }
            tracing::info!(
                kind = state.kind.slug(),
                environment = %scope.environment_id,
                "environment changed"
            );
            state.scope = scope;
            state.filters.page = FIRST_PAGE;
            state.fetch.page = None;
            sync_and_fetch(state)
        }
        RuntimeAction::FetchSucceeded { seq, page } => {
            if !state.fetch.is_latest(seq) {
                tracing::debug!(
                    seq,
                    latest = state.fetch.latest_seq,
                    "discarding stale list response"
                );
                return Vec::new();
            }
            state.fetch.in_flight = None;
            state.fetch.error = None;

            let last = last_page(page.total_count, state.filters.page_size);
            let total_count = page.total_count;
            state.fetch.page = Some(page);
            if state.filters.page > last {
                tracing::info!(
                    kind = state.kind.slug(),
                    requested = state.filters.page,
                    last,
                    total_count,
                    "page past the end, clamping"
                );
                state.filters.page = last;
                return sync_and_fetch(state);
            }
            vec![ListEffect::RequestFrame]
        }
        RuntimeAction::FetchFailed { seq, error } => {
            if !state.fetch.is_latest(seq) {
                tracing::debug!(seq, %error, "discarding stale list failure");
                return Vec::new();
            }
            tracing::warn!(kind = state.kind.slug(), seq, %error, "list fetch failed");
            state.fetch.in_flight = None;
            state.fetch.error = Some(error);
            vec![ListEffect::RequestFrame]
        }
    }
}

fn commit<T>(state: &mut ListPageState<T>, patch: FilterPatch) -> Vec<ListEffect> {
    let patch = patch.retain_accepted(state.kind);
    let next = apply_partial(&state.filters, &patch);
    if next == state.filters {
        return Vec::new();
    }
    state.filters = next;
    sync_and_fetch(state)
}

fn sync_and_fetch<T>(state: &mut ListPageState<T>) -> Vec<ListEffect> {
    let query = serialize(&state.filters, &state.defaults);
    state.url_query = query.clone();
    vec![
        ListEffect::ReplaceUrl(query),
        issue_fetch(state),
        ListEffect::RequestFrame,
    ]
}

fn issue_fetch<T>(state: &mut ListPageState<T>) -> ListEffect {
    let request = to_request(&state.filters, &state.scope);
    start_fetch(state, request)
}

fn start_fetch<T>(state: &mut ListPageState<T>, request: ListRequest) -> ListEffect {
    let seq = state.fetch.latest_seq.saturating_add(1);
    state.fetch.latest_seq = seq;
    state.fetch.in_flight = Some(seq);
    state.fetch.error = None;
    state.fetch.last_request = Some(request.clone());
    tracing::debug!(
        kind = state.kind.slug(),
        seq,
        cursor = %request.cursor,
        page_size = request.page_size,
        "issuing list fetch"
    );
    ListEffect::Fetch { seq, request }
}

fn retry<T>(state: &mut ListPageState<T>) -> Vec<ListEffect> {
    let fetch = match state.fetch.last_request.clone() {
        Some(request) => start_fetch(state, request),
        None => issue_fetch(state),
    };
    vec![fetch, ListEffect::RequestFrame]
}

#[cfg(test)]
mod tests;
