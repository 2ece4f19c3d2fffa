use super::*;
use shared::nav::NavOptions;

use crate::memory::InMemoryPopularShows;

#[test]
fn open_show_details_navigates_with_default_options() {
    assert_eq!(
        route(&PopularAction::OpenShowDetails(ShowId(42))),
        Some(NavRequest::To {
            target: NavTarget::Show(ShowId(42)),
            options: Some(NavOptions::DEFAULT),
        })
    );
    assert_eq!(route(&PopularAction::Refresh), None);
    assert_eq!(route(&PopularAction::LoadMore), None);
}

#[test]
fn paging_config_matches_sixty_item_pages() {
    assert_eq!(PAGING_CONFIG.page_size, 60);
    assert_eq!(PAGING_CONFIG.initial_load_size, 60);
}

#[tokio::test]
async fn starts_paging_on_creation() {
    let source = Arc::new(InMemoryPopularShows::new(150));
    let view_model = ViewModel::new(
        SCREEN_NAME,
        PopularViewState::new(PAGING_CONFIG),
        PopularShowsReducer::new(source.clone()),
    );
    view_model.shutdown().await;

    let state = view_model.state();
    assert_eq!(state.entries.len(), 60);
    assert_eq!(state.next_page, 1);
    assert!(!state.end_reached);
    assert_eq!(source.requests().await, vec![(0, 60)]);
}

#[tokio::test]
async fn load_more_appends_until_the_end() {
    let source = Arc::new(InMemoryPopularShows::new(150));
    let view_model = ViewModel::new(
        SCREEN_NAME,
        PopularViewState::new(PAGING_CONFIG),
        PopularShowsReducer::new(source.clone()),
    );
    for _ in 0..3 {
        view_model
            .submit_action(PopularAction::LoadMore)
            .expect("submit");
    }
    view_model.shutdown().await;

    let state = view_model.state();
    assert_eq!(state.entries.len(), 150);
    assert!(state.end_reached);
    assert_eq!(state.entries[60].page, 1);
    assert_eq!(state.entries[60].page_order, 0);
    assert_eq!(source.requests().await, vec![(0, 60), (1, 60), (2, 60)]);
}

#[tokio::test]
async fn refresh_reloads_the_first_page() {
    let source = Arc::new(InMemoryPopularShows::new(150));
    let view_model = ViewModel::new(
        SCREEN_NAME,
        PopularViewState::new(PAGING_CONFIG),
        PopularShowsReducer::new(source.clone()),
    );
    view_model
        .submit_action(PopularAction::LoadMore)
        .expect("submit");
    view_model
        .submit_action(PopularAction::Refresh)
        .expect("submit");
    view_model.shutdown().await;

    assert_eq!(view_model.state().entries.len(), 60);
    assert_eq!(view_model.state().next_page, 1);
}

#[tokio::test]
async fn uneven_initial_load_keeps_pages_aligned() {
    let source = Arc::new(InMemoryPopularShows::new(500));
    let paging = PagingConfig {
        page_size: 60,
        initial_load_size: 90,
    };
    let view_model = ViewModel::new(
        SCREEN_NAME,
        PopularViewState::new(paging),
        PopularShowsReducer::new(source.clone()),
    );
    view_model
        .submit_action(PopularAction::LoadMore)
        .expect("submit");
    view_model.shutdown().await;

    let state = view_model.state();
    assert_eq!(source.requests().await, vec![(0, 120), (2, 60)]);
    assert_eq!(state.entries.len(), 180);
    let ids: Vec<i64> = state.entries.iter().map(|entry| entry.show.show_id.0).collect();
    let expected: Vec<i64> = (1000..1180).collect();
    assert_eq!(ids, expected);
}
