use super::*;
use shared::{domain::UserId, error::ErrorCode, nav::NavOptions};

use crate::memory::InMemoryWatchedRepository;

fn titles(state: &WatchedViewState) -> Vec<&str> {
    state
        .entries
        .iter()
        .map(|entry| entry.show.title.as_str())
        .collect()
}

fn view_model(
    repository: Arc<InMemoryWatchedRepository>,
) -> Arc<ViewModel<WatchedViewState, WatchedAction>> {
    ViewModel::new(
        SCREEN_NAME,
        WatchedViewState::default(),
        WatchedReducer::new(repository),
    )
}

#[test]
fn account_and_show_actions_are_routed() {
    assert_eq!(
        route(&WatchedAction::Login),
        Some(NavRequest::To {
            target: NavTarget::Account,
            options: None,
        })
    );
    assert_eq!(route(&WatchedAction::OpenUserDetails), route(&WatchedAction::Login));
    assert_eq!(
        route(&WatchedAction::OpenShowDetails(ShowId(42))),
        Some(NavRequest::To {
            target: NavTarget::Show(ShowId(42)),
            options: Some(NavOptions::DEFAULT),
        })
    );
    assert_eq!(route(&WatchedAction::Refresh), None);
    assert_eq!(route(&WatchedAction::Filter("x".into())), None);
}

#[tokio::test]
async fn loads_user_and_sorts_by_last_watched() {
    let view_model = view_model(Arc::new(InMemoryWatchedRepository::seeded()));
    view_model.shutdown().await;

    let state = view_model.state();
    assert_eq!(state.auth_state, AuthState::LoggedIn);
    assert_eq!(state.user.as_ref().map(|user| user.user_id), Some(UserId(1)));
    assert_eq!(titles(&state), vec!["Dark", "Game of Thrones", "Breaking Bad"]);
    assert_eq!(state.available_sorts.len(), 3);
}

#[tokio::test]
async fn sort_and_filter_rebuild_visible_entries() {
    let view_model = view_model(Arc::new(InMemoryWatchedRepository::seeded()));
    view_model
        .submit_action(WatchedAction::ChangeSort(SortOption::Alphabetical))
        .expect("submit");
    view_model
        .submit_action(WatchedAction::Filter("  A ".into()))
        .expect("submit");
    view_model.shutdown().await;

    let state = view_model.state();
    assert!(state.filter_active);
    assert_eq!(titles(&state), vec!["Breaking Bad", "Dark", "Game of Thrones"]);

    let view_model = self::view_model(Arc::new(InMemoryWatchedRepository::seeded()));
    view_model
        .submit_action(WatchedAction::ChangeSort(SortOption::DateAdded))
        .expect("submit");
    view_model
        .submit_action(WatchedAction::Filter("thrones".into()))
        .expect("submit");
    view_model.shutdown().await;
    assert_eq!(titles(&view_model.state()), vec!["Game of Thrones"]);
}

#[tokio::test]
async fn refresh_while_logged_out_reports_unauthorized() {
    let repository = Arc::new(InMemoryWatchedRepository::new(None, Vec::new()));
    let view_model = view_model(Arc::clone(&repository));
    view_model
        .submit_action(WatchedAction::Refresh)
        .expect("submit");
    view_model.shutdown().await;

    let state = view_model.state();
    assert_eq!(state.auth_state, AuthState::LoggedOut);
    assert_eq!(
        state.error.map(|error| error.code),
        Some(ErrorCode::Unauthorized)
    );
    assert_eq!(repository.refreshes().await, 0);
}

#[tokio::test]
async fn refresh_syncs_then_reloads() {
    let repository = Arc::new(InMemoryWatchedRepository::seeded());
    let view_model = view_model(Arc::clone(&repository));
    view_model
        .submit_action(WatchedAction::Refresh)
        .expect("submit");
    view_model.shutdown().await;

    assert_eq!(repository.refreshes().await, 1);
    assert!(view_model.state().error.is_none());
}

#[tokio::test]
async fn refresh_clears_error_after_recovery() {
    let reducer = WatchedReducer::new(Arc::new(InMemoryWatchedRepository::seeded()));
    let failed = WatchedViewState {
        error: Some(ScreenError::from_message("connection refused")),
        ..WatchedViewState::default()
    };

    let next = reducer
        .reduce(&failed, WatchedAction::Refresh)
        .await
        .expect("reduce")
        .expect("new state");
    assert_eq!(next.entries.len(), 3);
    assert!(next.error.is_none());
    assert!(!next.is_loading);
}
