//! Watched history screen. Account and show destinations are diverted to
//! navigation; sorting, filtering and refresh go to the view model.

use std::{cmp::Reverse, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use relay::{Action, Navigator, Reducer, RelayConfig, ScreenHost, StartMode, ViewModel};
use serde::Serialize;
use shared::{
    domain::{AuthState, ShowId, SortOption, UserSummary, WatchedEntry},
    error::ScreenError,
    nav::{NavRequest, NavTarget},
};
use tracing::debug;

pub const SCREEN_NAME: &str = "watched";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchedAction {
    Refresh,
    Login,
    OpenUserDetails,
    OpenShowDetails(ShowId),
    ChangeSort(SortOption),
    Filter(String),
    ClearError,
}

impl Action for WatchedAction {
    fn name(&self) -> &'static str {
        match self {
            WatchedAction::Refresh => "refresh",
            WatchedAction::Login => "login",
            WatchedAction::OpenUserDetails => "open_user_details",
            WatchedAction::OpenShowDetails(_) => "open_show_details",
            WatchedAction::ChangeSort(_) => "change_sort",
            WatchedAction::Filter(_) => "filter",
            WatchedAction::ClearError => "clear_error",
        }
    }
}

pub fn route(action: &WatchedAction) -> Option<NavRequest> {
    match action {
        WatchedAction::Login | WatchedAction::OpenUserDetails => {
            Some(NavRequest::to(NavTarget::Account))
        }
        WatchedAction::OpenShowDetails(show_id) => {
            Some(NavRequest::to_with_defaults(NavTarget::Show(*show_id)))
        }
        _ => None,
    }
}

#[async_trait]
pub trait WatchedRepository: Send + Sync {
    async fn current_user(&self) -> Result<Option<UserSummary>>;
    async fn watched_shows(&self) -> Result<Vec<WatchedEntry>>;
    /// Syncs watched history from the remote service.
    async fn refresh(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchedViewState {
    pub user: Option<UserSummary>,
    pub auth_state: AuthState,
    /// Visible entries, filtered and sorted.
    pub entries: Vec<WatchedEntry>,
    pub sort: SortOption,
    pub available_sorts: Vec<SortOption>,
    pub filter: String,
    pub filter_active: bool,
    pub is_loading: bool,
    pub error: Option<ScreenError>,
    #[serde(skip)]
    all_entries: Vec<WatchedEntry>,
}

impl Default for WatchedViewState {
    fn default() -> Self {
        Self {
            user: None,
            auth_state: AuthState::LoggedOut,
            entries: Vec::new(),
            sort: SortOption::default(),
            available_sorts: SortOption::ALL.to_vec(),
            filter: String::new(),
            filter_active: false,
            is_loading: true,
            error: None,
            all_entries: Vec::new(),
        }
    }
}

impl WatchedViewState {
    fn rebuild(&mut self) {
        let needle = self.filter.trim().to_lowercase();
        self.filter_active = !needle.is_empty();

        let mut visible: Vec<WatchedEntry> = self
            .all_entries
            .iter()
            .filter(|entry| needle.is_empty() || entry.show.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        match self.sort {
            SortOption::LastWatched => visible.sort_by_key(|entry| Reverse(entry.last_watched)),
            SortOption::Alphabetical => visible.sort_by_key(|entry| entry.show.title.to_lowercase()),
            SortOption::DateAdded => visible.sort_by_key(|entry| Reverse(entry.followed_at)),
        }
        self.entries = visible;
    }
}

pub struct WatchedReducer {
    repository: Arc<dyn WatchedRepository>,
}

impl WatchedReducer {
    pub fn new(repository: Arc<dyn WatchedRepository>) -> Self {
        Self { repository }
    }

    async fn load(&self, state: &WatchedViewState) -> WatchedViewState {
        let mut next = state.clone();
        next.is_loading = false;
        next.error = None;

        match self.repository.current_user().await {
            Ok(user) => {
                next.auth_state = if user.is_some() {
                    AuthState::LoggedIn
                } else {
                    AuthState::LoggedOut
                };
                next.user = user;
            }
            Err(err) => next.error = Some(ScreenError::from_message(format!("{err:#}"))),
        }
        match self.repository.watched_shows().await {
            Ok(entries) => next.all_entries = entries,
            Err(err) => next.error = Some(ScreenError::from_message(format!("{err:#}"))),
        }
        next.rebuild();
        next
    }
}

#[async_trait]
impl Reducer<WatchedViewState, WatchedAction> for WatchedReducer {
    async fn init(&self, state: &WatchedViewState) -> Result<Option<WatchedViewState>> {
        Ok(Some(self.load(state).await))
    }

    async fn reduce(
        &self,
        state: &WatchedViewState,
        action: WatchedAction,
    ) -> Result<Option<WatchedViewState>> {
        let next = match action {
            WatchedAction::Refresh => {
                if let Err(err) = self.repository.refresh().await {
                    let mut next = state.clone();
                    next.error = Some(ScreenError::from_message(format!("{err:#}")));
                    return Ok(Some(next));
                }
                self.load(state).await
            }
            WatchedAction::ChangeSort(sort) => {
                if sort == state.sort {
                    return Ok(None);
                }
                let mut next = state.clone();
                next.sort = sort;
                next.rebuild();
                next
            }
            WatchedAction::Filter(filter) => {
                let mut next = state.clone();
                next.filter = filter;
                next.rebuild();
                next
            }
            WatchedAction::ClearError => WatchedViewState {
                error: None,
                ..state.clone()
            },
            WatchedAction::Login
            | WatchedAction::OpenUserDetails
            | WatchedAction::OpenShowDetails(_) => {
                debug!("navigation action reached the view model; ignoring");
                return Ok(None);
            }
        };
        Ok(Some(next))
    }
}

pub type WatchedScreen = ScreenHost<WatchedViewState, WatchedAction>;

/// Drains only while the screen is started.
pub fn watched_screen(
    repository: Arc<dyn WatchedRepository>,
    navigator: Arc<dyn Navigator>,
    config: RelayConfig,
) -> WatchedScreen {
    let view_model = ViewModel::new(
        SCREEN_NAME,
        WatchedViewState::default(),
        WatchedReducer::new(repository),
    );
    ScreenHost::new(
        SCREEN_NAME,
        config.with_start_mode(StartMode::WhenStarted),
        view_model,
        navigator,
        route,
    )
}

#[cfg(test)]
#[path = "tests/watched_tests.rs"]
mod tests;
