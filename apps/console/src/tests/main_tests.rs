use relay::{DrainExit, RelayConfig};

use super::*;

#[tokio::test]
async fn popular_session_opens_the_scripted_show() {
    let navigator = Arc::new(BackStackNavigator::new(HOME_ROUTE));
    let screen = popular_screen(
        Arc::new(InMemoryPopularShows::new(250)),
        navigator.clone(),
        RelayConfig::default(),
    );
    let steps = parse_script("start,open-show:42").expect("script");

    let outcome = run_session(screen, &navigator, &steps, script::popular_action)
        .await
        .expect("session");

    let report = outcome.report.expect("drain report");
    assert_eq!(report.navigated, 1);
    assert_eq!(report.exit, DrainExit::Closed);
    assert!(outcome.rejected.is_empty());
    assert_eq!(
        outcome.navigation.back_stack.last().map(String::as_str),
        Some("app.tivi://show/42")
    );
    assert_eq!(outcome.screen, "popular");
}

#[tokio::test]
async fn action_foreign_to_the_screen_fails_before_hosting() {
    let episode_id = EpisodeId(7);
    let navigator = Arc::new(BackStackNavigator::with_stack(
        HOME_ROUTE,
        [NavTarget::Episode(episode_id)],
    ));
    let screen = episode_details_screen(
        episode_id,
        Arc::new(InMemoryEpisodeRepository::seeded()),
        navigator.clone(),
        RelayConfig::default(),
    );
    let steps = parse_script("start,login").expect("script");

    let result = run_session(screen, &navigator, &steps, script::episode_details_action).await;

    assert!(result.is_err());
    assert!(navigator.snapshot().history.is_empty());
}

#[tokio::test]
async fn offers_beyond_capacity_are_reported_as_rejected() {
    let navigator = Arc::new(BackStackNavigator::new(HOME_ROUTE));
    let screen = popular_screen(
        Arc::new(InMemoryPopularShows::new(250)),
        navigator.clone(),
        RelayConfig::default().with_capacity(1),
    );
    let steps = parse_script("open-show:1,open-show:2").expect("script");

    let outcome = run_session(screen, &navigator, &steps, script::popular_action)
        .await
        .expect("session");

    assert_eq!(outcome.rejected.len(), 1);
    assert!(outcome.rejected[0].starts_with("open_show_details"));
    assert!(outcome.report.is_none());
    assert!(navigator.snapshot().history.is_empty());
}

#[tokio::test]
async fn rendered_json_carries_report_and_state() {
    let navigator = Arc::new(BackStackNavigator::new(HOME_ROUTE));
    let screen = watched_screen(
        Arc::new(InMemoryWatchedRepository::seeded()),
        navigator.clone(),
        RelayConfig::default(),
    );
    let steps = parse_script("start,sort:alpha,login").expect("script");

    let outcome = run_session(screen, &navigator, &steps, script::watched_action)
        .await
        .expect("session");
    let rendered = render(&outcome, true).expect("render");
    let json: serde_json::Value = serde_json::from_str(&rendered).expect("json");

    assert_eq!(json["report"]["navigated"], 1);
    assert_eq!(json["report"]["submitted"], 1);
    assert_eq!(json["state"]["sort"], "alphabetical");
    assert_eq!(
        json["navigation"]["back_stack"][1],
        serde_json::Value::from("app.tivi://account")
    );
}
