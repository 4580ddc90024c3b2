use super::*;
use pretty_assertions::assert_eq;

#[test]
fn search_from_page_three_returns_to_first_page() {
    let mut state = mounted("page=3", 200);
    assert_eq!(state.filters.page, 3);

    let effects = run_user(&mut state, UserAction::Search("checkout".to_string()));

    assert_eq!(state.filters.page, 1);
    assert_eq!(state.filters.search_query, "checkout");
    let (_, request) = fetch_of(&effects);
    assert_eq!(request.cursor, "0");
    assert_eq!(request.search_keyword.as_deref(), Some("checkout"));
    assert_eq!(url_of(&effects), Some("searchQuery=checkout"));
    assert_url_in_sync(&state);
}

#[test]
fn switching_to_archived_tab_clears_search_and_page() {
    let mut state = mounted("page=2&searchQuery=beta", 120);

    let effects = run_user(&mut state, UserAction::SelectStatus(ListStatus::Archived));

    assert_eq!(state.filters.status, ListStatus::Archived);
    assert_eq!(state.filters.page, 1);
    assert_eq!(state.filters.search_query, "");
    let (_, request) = fetch_of(&effects);
    assert!(request.archived);
    assert_eq!(request.search_keyword, None);
    assert_eq!(url_of(&effects), Some("status=ARCHIVED"));
}

#[test]
fn selecting_current_tab_is_a_no_op() {
    let mut state = mounted("page=2", 120);
    let effects = run_user(&mut state, UserAction::SelectStatus(ListStatus::Active));
    assert!(effects.is_empty());
    assert_eq!(state.filters.page, 2);
}

#[test]
fn toggle_status_flips_tab() {
    let mut state = mounted("", 10);
    run_user(&mut state, UserAction::ToggleStatus);
    assert_eq!(state.filters.status, ListStatus::Archived);
    run_user(&mut state, UserAction::ToggleStatus);
    assert_eq!(state.filters.status, ListStatus::Active);
}

#[test]
fn page_change_keeps_every_other_key() {
    let mut state = mounted("searchQuery=web&orderBy=NAME&orderDirection=ASC&enabled=true", 300);
    let before = state.filters.clone();

    let effects = run_user(&mut state, UserAction::ChangePage(4));

    assert_eq!(state.filters.page, 4);
    let mut expected = before;
    expected.page = 4;
    assert_eq!(state.filters, expected);
    let (_, request) = fetch_of(&effects);
    assert_eq!(request.cursor, "150");
    assert_eq!(request.enabled, Some(true));
}

#[test]
fn raw_patch_without_page_still_resets() {
    let mut state = mounted("page=5", 400);

    run_user(
        &mut state,
        UserAction::Patch(FilterPatch::new().with(crate::state::FilterField::Maintainer(
            Some("dev@example.com".to_string()),
        ))),
    );

    assert_eq!(state.filters.page, 1);
    assert_eq!(state.filters.filters.maintainer.as_deref(), Some("dev@example.com"));
}

#[test]
fn apply_filters_drops_keys_the_list_does_not_accept() {
    let mut state = state(ListKind::Segments);
    run_runtime(&mut state, RuntimeAction::Initialize { query: String::new() });

    let effects = run_user(
        &mut state,
        UserAction::ApplyFilters(DomainFilters {
            is_in_use_status: Some(false),
            maintainer: Some("dev@example.com".to_string()),
            ..DomainFilters::default()
        }),
    );

    let (_, request) = fetch_of(&effects);
    assert_eq!(request.is_in_use_status, Some(false));
    assert_eq!(request.maintainer, None);
    assert_eq!(url_of(&effects), Some("isInUseStatus=false"));
}

#[test]
fn patch_touching_only_foreign_filters_keeps_page() {
    let mut state = mounted_as(ListKind::Segments, "page=3", 200);

    let effects = run_user(
        &mut state,
        UserAction::Patch(FilterPatch::new().with(crate::state::FilterField::Maintainer(
            Some("dev@example.com".to_string()),
        ))),
    );

    assert!(effects.is_empty());
    assert_eq!(state.filters.page, 3);
    assert_eq!(state.filters.filters.maintainer, None);
    assert_eq!(state.url_query, "page=3");
}

#[test]
fn foreign_keys_in_a_mixed_patch_do_not_block_the_accepted_ones() {
    let mut state = mounted_as(ListKind::Segments, "page=3", 200);

    let effects = run_user(
        &mut state,
        UserAction::Patch(
            FilterPatch::new()
                .with(crate::state::FilterField::Enabled(Some(true)))
                .with(crate::state::FilterField::IsInUseStatus(Some(true))),
        ),
    );

    assert_eq!(state.filters.page, 1);
    assert_eq!(state.filters.filters.enabled, None);
    assert_eq!(url_of(&effects), Some("isInUseStatus=true"));
}

#[test]
fn unchanged_filters_and_foreign_clears_keep_page() {
    let mut state = mounted_as(ListKind::Goals, "page=2&isInUseStatus=true", 200);

    let same = DomainFilters {
        is_in_use_status: Some(true),
        tags: vec!["web".to_string()],
        ..DomainFilters::default()
    };
    assert!(run_user(&mut state, UserAction::ApplyFilters(same)).is_empty());
    assert!(run_user(&mut state, UserAction::ClearFilter(FilterKey::Maintainer)).is_empty());
    assert_eq!(state.filters.page, 2);
}

#[test]
fn clear_filter_removes_single_key() {
    let mut state = mounted("page=2&enabled=false&hasExperiment=true", 100);

    let effects = run_user(&mut state, UserAction::ClearFilter(FilterKey::Enabled));

    assert_eq!(state.filters.filters.enabled, None);
    assert_eq!(state.filters.filters.has_experiment, Some(true));
    assert_eq!(state.filters.page, 1);
    assert_eq!(url_of(&effects), Some("hasExperiment=true"));
}

#[test]
fn clear_all_restores_defaults_and_bare_url() {
    let mut state = mounted("page=2&searchQuery=a&tags=web", 100);

    let effects = run_user(&mut state, UserAction::ClearAll);

    assert_eq!(state.filters, state.defaults);
    assert_eq!(url_of(&effects), Some(""));
    assert!(run_user(&mut state, UserAction::ClearAll).is_empty());
}

#[test]
fn sort_change_resets_page_and_cycles_through_options() {
    let mut state = mounted("page=2", 100);

    run_user(&mut state, UserAction::CycleSort);
    assert_eq!(state.filters.page, 1);
    assert_eq!(
        (state.filters.order_by, state.filters.order_direction),
        (OrderBy::CreatedAt, OrderDirection::Asc)
    );

    for _ in 1..ListKind::Features.sort_options().len() {
        run_user(&mut state, UserAction::CycleSort);
    }
    assert_eq!(
        (state.filters.order_by, state.filters.order_direction),
        ListKind::Features.default_order()
    );
}

#[test]
fn page_size_change_returns_to_first_page() {
    let mut state = mounted("page=3", 200);
    let effects = run_user(&mut state, UserAction::ChangePageSize(20));
    assert_eq!(state.filters.page, 1);
    assert_eq!(state.filters.page_size, 20);
    assert_eq!(url_of(&effects), Some("pageSize=20"));
}

#[test]
fn identical_search_issues_nothing() {
    let mut state = mounted("searchQuery=web", 10);
    assert!(run_user(&mut state, UserAction::Search("web".to_string())).is_empty());
}

#[test]
fn resubmitting_search_or_sort_keeps_page() {
    let mut state = mounted("page=3&searchQuery=web&orderBy=NAME&orderDirection=ASC", 400);

    assert!(run_user(&mut state, UserAction::Search("web".to_string())).is_empty());
    let same_sort = UserAction::SetSort {
        order_by: OrderBy::Name,
        order_direction: OrderDirection::Asc,
    };
    assert!(run_user(&mut state, same_sort).is_empty());
    assert_eq!(state.filters.page, 3);
}
