use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use super::ListEffect;
pub(super) use crate::actions::ListAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::contracts::ListRequest;
pub(super) use crate::contracts::Page;
pub(super) use crate::error::FetchError;
pub(super) use crate::state::DomainFilters;
pub(super) use crate::state::EnvironmentScope;
pub(super) use crate::state::FilterKey;
pub(super) use crate::state::FilterPatch;
pub(super) use crate::state::ListKind;
pub(super) use crate::state::ListPageState;
pub(super) use crate::state::ListStatus;
pub(super) use crate::state::OrderBy;
pub(super) use crate::state::OrderDirection;
pub(super) use crate::state::LIST_PAGE_SIZE;

mod page_reset;

type Item = String;

fn state(kind: ListKind) -> ListPageState<Item> {
    ListPageState::new(kind, EnvironmentScope::new("env-dev"), LIST_PAGE_SIZE)
}

/// A features page mounted from `query` whose first fetch already resolved.
fn mounted(query: &str, total_count: u64) -> ListPageState<Item> {
    mounted_as(ListKind::Features, query, total_count)
}

fn mounted_as(kind: ListKind, query: &str, total_count: u64) -> ListPageState<Item> {
    let mut state = state(kind);
    let effects = run_runtime(
        &mut state,
        RuntimeAction::Initialize {
            query: query.to_string(),
        },
    );
    let (seq, _) = fetch_of(&effects);
    let items = (0..total_count.min(u64::from(state.filters.page_size)))
        .map(|idx| format!("flag-{idx}"))
        .collect();
    let effects = run_runtime(
        &mut state,
        RuntimeAction::FetchSucceeded {
            seq,
            page: page(items, total_count),
        },
    );
    assert_eq!(effects, vec![ListEffect::RequestFrame]);
    state
}

fn page(items: Vec<Item>, total_count: u64) -> Page<Item> {
    Page {
        cursor: items.len().to_string(),
        items,
        total_count,
        status_counts: None,
    }
}

fn run_user(state: &mut ListPageState<Item>, action: UserAction) -> Vec<ListEffect> {
    reduce(state, ListAction::User(action))
}

fn run_runtime(state: &mut ListPageState<Item>, action: RuntimeAction<Item>) -> Vec<ListEffect> {
    reduce(state, ListAction::Runtime(action))
}

fn fetch_of(effects: &[ListEffect]) -> (u64, ListRequest) {
    effects
        .iter()
        .find_map(|effect| match effect {
            ListEffect::Fetch { seq, request } => Some((*seq, request.clone())),
            _ => None,
        })
        .expect("effects should contain a fetch")
}

fn url_of(effects: &[ListEffect]) -> Option<&str> {
    effects.iter().find_map(|effect| match effect {
        ListEffect::ReplaceUrl(query) => Some(query.as_str()),
        _ => None,
    })
}

fn assert_url_in_sync(state: &ListPageState<Item>) {
    assert_eq!(
        state.url_query,
        crate::query::serialize(&state.filters, &state.defaults)
    );
}
