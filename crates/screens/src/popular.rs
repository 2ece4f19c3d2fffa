//! Popular shows screen. The view model starts paging as soon as it is
//! created; opening a show is diverted to navigation.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use relay::{Action, Navigator, Reducer, RelayConfig, ScreenHost, StartMode, ViewModel};
use serde::Serialize;
use shared::{
    domain::{PopularEntry, ShowId},
    error::ScreenError,
    nav::{NavRequest, NavTarget},
};

pub const SCREEN_NAME: &str = "popular";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PagingConfig {
    pub page_size: u32,
    pub initial_load_size: u32,
}

pub const PAGING_CONFIG: PagingConfig = PagingConfig {
    page_size: 60,
    initial_load_size: 60,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopularAction {
    OpenShowDetails(ShowId),
    Refresh,
    LoadMore,
}

impl Action for PopularAction {
    fn name(&self) -> &'static str {
        match self {
            PopularAction::OpenShowDetails(_) => "open_show_details",
            PopularAction::Refresh => "refresh",
            PopularAction::LoadMore => "load_more",
        }
    }
}

pub fn route(action: &PopularAction) -> Option<NavRequest> {
    match action {
        PopularAction::OpenShowDetails(show_id) => {
            Some(NavRequest::to_with_defaults(NavTarget::Show(*show_id)))
        }
        _ => None,
    }
}

#[async_trait]
pub trait PopularShowsSource: Send + Sync {
    async fn load_page(&self, page: u32, page_size: u32) -> Result<Vec<PopularEntry>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularViewState {
    pub paging: PagingConfig,
    pub entries: Vec<PopularEntry>,
    pub next_page: u32,
    pub end_reached: bool,
    pub loading: bool,
    pub error: Option<ScreenError>,
}

impl PopularViewState {
    pub fn new(paging: PagingConfig) -> Self {
        Self {
            paging,
            entries: Vec::new(),
            next_page: 0,
            end_reached: false,
            loading: true,
            error: None,
        }
    }
}

pub struct PopularShowsReducer {
    source: Arc<dyn PopularShowsSource>,
}

impl PopularShowsReducer {
    pub fn new(source: Arc<dyn PopularShowsSource>) -> Self {
        Self { source }
    }

    /// The initial load may span several pages; it is requested as one
    /// oversized page, rounded up to whole pages so the cursor stays aligned.
    async fn load_initial(&self, state: &PopularViewState) -> PopularViewState {
        let paging = state.paging;
        let page_size = paging.page_size.max(1);
        let initial = paging.initial_load_size.max(1).div_ceil(page_size) * page_size;
        let mut next = PopularViewState::new(paging);
        next.loading = false;

        match self.source.load_page(0, initial).await {
            Ok(entries) => {
                next.end_reached = (entries.len() as u32) < initial;
                next.next_page = initial / page_size;
                next.entries = entries;
            }
            Err(err) => next.error = Some(ScreenError::from_message(format!("{err:#}"))),
        }
        next
    }

    async fn load_more(&self, state: &PopularViewState) -> Option<PopularViewState> {
        if state.end_reached {
            return None;
        }
        let page_size = state.paging.page_size.max(1);
        let mut next = state.clone();
        next.loading = false;

        match self.source.load_page(state.next_page, page_size).await {
            Ok(entries) => {
                next.end_reached = (entries.len() as u32) < page_size;
                next.next_page += 1;
                next.entries.extend(entries);
                next.error = None;
            }
            Err(err) => next.error = Some(ScreenError::from_message(format!("{err:#}"))),
        }
        Some(next)
    }
}

#[async_trait]
impl Reducer<PopularViewState, PopularAction> for PopularShowsReducer {
    async fn init(&self, state: &PopularViewState) -> Result<Option<PopularViewState>> {
        Ok(Some(self.load_initial(state).await))
    }

    async fn reduce(
        &self,
        state: &PopularViewState,
        action: PopularAction,
    ) -> Result<Option<PopularViewState>> {
        match action {
            PopularAction::Refresh => Ok(Some(self.load_initial(state).await)),
            PopularAction::LoadMore => Ok(self.load_more(state).await),
            PopularAction::OpenShowDetails(_) => Ok(None),
        }
    }
}

pub type PopularScreen = ScreenHost<PopularViewState, PopularAction>;

/// Drains only while the screen is started.
pub fn popular_screen(
    source: Arc<dyn PopularShowsSource>,
    navigator: Arc<dyn Navigator>,
    config: RelayConfig,
) -> PopularScreen {
    let view_model = ViewModel::new(
        SCREEN_NAME,
        PopularViewState::new(PAGING_CONFIG),
        PopularShowsReducer::new(source),
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
#[path = "tests/popular_tests.rs"]
mod tests;
