use std::collections::VecDeque;

use flaglist_core::actions::ListAction;
use flaglist_core::actions::RuntimeAction;
use flaglist_core::reducer::reduce;
use flaglist_core::reducer::ListEffect;
use flaglist_core::state::ListPageState;
use flaglist_source::ListDataSource;

/// Runs effects to completion on the calling thread, feeding fetch results
/// back into the reducer. Returns the last URL query the reducer asked for.
pub fn drive<T, S>(
    state: &mut ListPageState<T>,
    source: &S,
    effects: Vec<ListEffect>,
) -> Option<String>
where
    S: ListDataSource<T> + ?Sized,
{
    let mut pending: VecDeque<ListEffect> = effects.into();
    let mut url = None;
    while let Some(effect) = pending.pop_front() {
        match effect {
            ListEffect::ReplaceUrl(query) => url = Some(query),
            ListEffect::Fetch { seq, request } => {
                let outcome = match source.list(&request) {
                    Ok(page) => RuntimeAction::FetchSucceeded { seq, page },
                    Err(error) => RuntimeAction::FetchFailed { seq, error },
                };
                pending.extend(reduce(state, ListAction::Runtime(outcome)));
            }
            ListEffect::RequestFrame => {}
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use flaglist_core::actions::UserAction;
    use flaglist_core::error::FetchError;
    use flaglist_core::state::EnvironmentScope;
    use flaglist_core::state::ListKind;
    use flaglist_source::FailingSource;
    use flaglist_source::InMemorySource;
    use flaglist_source::Record;
    use pretty_assertions::assert_eq;

    use super::*;

    fn source(count: usize) -> InMemorySource {
        InMemorySource::new(
            (0..count)
                .map(|idx| Record::new(format!("flag-{idx:03}"), "env-dev"))
                .collect(),
        )
    }

    fn mount(
        query: &str,
        source: &dyn ListDataSource<Record>,
    ) -> (ListPageState<Record>, Option<String>) {
        let mut state =
            ListPageState::new(ListKind::Features, EnvironmentScope::new("env-dev"), 50);
        let effects = reduce(
            &mut state,
            ListAction::Runtime(RuntimeAction::Initialize {
                query: query.to_string(),
            }),
        );
        let url = drive(&mut state, source, effects);
        (state, url)
    }

    #[test]
    fn past_the_end_page_settles_on_last_page() {
        let (state, url) = mount("page=9", &source(120));
        assert_eq!(state.filters.page, 3);
        assert_eq!(url.as_deref(), Some("page=3"));
        assert_eq!(state.items().len(), 20);
        assert!(!state.fetch.is_loading());
    }

    #[test]
    fn user_actions_drive_follow_up_fetches() {
        let source = source(120);
        let (mut state, _) = mount("", &source);
        let effects = reduce(&mut state, ListAction::User(UserAction::NextPage));
        let url = drive(&mut state, &source, effects);
        assert_eq!(url.as_deref(), Some("page=2"));
        assert_eq!(state.items().len(), 50);
    }

    #[test]
    fn failures_land_in_state() {
        let failing = FailingSource::unavailable("offline");
        let (state, url) = mount("", &failing);
        assert_eq!(url, None);
        assert_eq!(
            state.fetch.error,
            Some(FetchError::Unavailable("offline".to_string()))
        );
    }
}
