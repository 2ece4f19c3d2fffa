//! Episode details screen: shows one episode and its watch history. `Close`
//! leaves the screen; everything else goes to the view model.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use relay::{Action, Navigator, Reducer, RelayConfig, ScreenHost, StartMode, ViewModel};
use serde::Serialize;
use shared::{
    domain::{EpisodeId, EpisodeSummary, EpisodeWatch, WatchId},
    error::{ErrorCode, ScreenError},
    nav::NavRequest,
};

pub const SCREEN_NAME: &str = "episode_details";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeDetailsAction {
    Refresh,
    AddEpisodeWatch,
    RemoveEpisodeWatch(WatchId),
    RemoveAllEpisodeWatches,
    ClearError,
    Close,
}

impl Action for EpisodeDetailsAction {
    fn name(&self) -> &'static str {
        match self {
            EpisodeDetailsAction::Refresh => "refresh",
            EpisodeDetailsAction::AddEpisodeWatch => "add_episode_watch",
            EpisodeDetailsAction::RemoveEpisodeWatch(_) => "remove_episode_watch",
            EpisodeDetailsAction::RemoveAllEpisodeWatches => "remove_all_episode_watches",
            EpisodeDetailsAction::ClearError => "clear_error",
            EpisodeDetailsAction::Close => "close",
        }
    }
}

pub fn route(action: &EpisodeDetailsAction) -> Option<NavRequest> {
    match action {
        EpisodeDetailsAction::Close => Some(NavRequest::Up),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeDetailsViewState {
    pub episode_id: EpisodeId,
    pub episode: Option<EpisodeSummary>,
    pub watches: Vec<EpisodeWatch>,
    pub can_add_watch: bool,
    pub refreshing: bool,
    pub error: Option<ScreenError>,
}

impl EpisodeDetailsViewState {
    pub fn new(episode_id: EpisodeId) -> Self {
        Self {
            episode_id,
            episode: None,
            watches: Vec::new(),
            can_add_watch: false,
            refreshing: true,
            error: None,
        }
    }
}

#[async_trait]
pub trait EpisodeRepository: Send + Sync {
    async fn episode(&self, episode_id: EpisodeId) -> Result<EpisodeSummary>;
    async fn watches(&self, episode_id: EpisodeId) -> Result<Vec<EpisodeWatch>>;
    async fn add_watch(&self, episode_id: EpisodeId, watched_at: DateTime<Utc>)
        -> Result<EpisodeWatch>;
    async fn remove_watch(&self, watch_id: WatchId) -> Result<()>;
    async fn remove_all_watches(&self, episode_id: EpisodeId) -> Result<()>;
}

pub struct EpisodeDetailsReducer {
    repository: Arc<dyn EpisodeRepository>,
}

impl EpisodeDetailsReducer {
    pub fn new(repository: Arc<dyn EpisodeRepository>) -> Self {
        Self { repository }
    }

    async fn load(&self, state: &EpisodeDetailsViewState) -> EpisodeDetailsViewState {
        let mut next = state.clone();
        next.refreshing = false;
        next.error = None;

        match self.repository.episode(state.episode_id).await {
            Ok(episode) => {
                next.can_add_watch = episode.has_aired(Utc::now());
                next.episode = Some(episode);
            }
            Err(err) => {
                next.error = Some(ScreenError::from_message(format!("{err:#}")));
                return next;
            }
        }

        match self.repository.watches(state.episode_id).await {
            Ok(mut watches) => {
                watches.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
                next.watches = watches;
            }
            Err(err) => next.error = Some(ScreenError::from_message(format!("{err:#}"))),
        }
        next
    }

    /// Runs a mutation, then reloads; a failed mutation lands in `error`.
    async fn mutate_then_load<F>(
        &self,
        state: &EpisodeDetailsViewState,
        mutation: F,
    ) -> EpisodeDetailsViewState
    where
        F: std::future::Future<Output = Result<()>> + Send,
    {
        if let Err(err) = mutation.await {
            let mut next = state.clone();
            next.error = Some(ScreenError::from_message(format!("{err:#}")));
            return next;
        }
        self.load(state).await
    }
}

#[async_trait]
impl Reducer<EpisodeDetailsViewState, EpisodeDetailsAction> for EpisodeDetailsReducer {
    async fn init(&self, state: &EpisodeDetailsViewState) -> Result<Option<EpisodeDetailsViewState>> {
        Ok(Some(self.load(state).await))
    }

    async fn reduce(
        &self,
        state: &EpisodeDetailsViewState,
        action: EpisodeDetailsAction,
    ) -> Result<Option<EpisodeDetailsViewState>> {
        let episode_id = state.episode_id;
        let next = match action {
            EpisodeDetailsAction::Refresh => self.load(state).await,
            EpisodeDetailsAction::AddEpisodeWatch => {
                if !state.can_add_watch {
                    let mut next = state.clone();
                    next.error = Some(ScreenError::new(
                        ErrorCode::Validation,
                        format!("episode {} has not aired yet", episode_id.0),
                    ));
                    return Ok(Some(next));
                }
                self.mutate_then_load(state, async {
                    self.repository
                        .add_watch(episode_id, Utc::now())
                        .await
                        .map(|_| ())
                })
                .await
            }
            EpisodeDetailsAction::RemoveEpisodeWatch(watch_id) => {
                self.mutate_then_load(state, self.repository.remove_watch(watch_id))
                    .await
            }
            EpisodeDetailsAction::RemoveAllEpisodeWatches => {
                self.mutate_then_load(state, self.repository.remove_all_watches(episode_id))
                    .await
            }
            EpisodeDetailsAction::ClearError => {
                if state.error.is_none() {
                    return Ok(None);
                }
                EpisodeDetailsViewState {
                    error: None,
                    ..state.clone()
                }
            }
            EpisodeDetailsAction::Close => return Ok(None),
        };
        Ok(Some(next))
    }
}

pub type EpisodeDetailsScreen = ScreenHost<EpisodeDetailsViewState, EpisodeDetailsAction>;

/// Drains immediately for as long as the screen exists, even while stopped.
pub fn episode_details_screen(
    episode_id: EpisodeId,
    repository: Arc<dyn EpisodeRepository>,
    navigator: Arc<dyn Navigator>,
    config: RelayConfig,
) -> EpisodeDetailsScreen {
    let view_model = ViewModel::new(
        SCREEN_NAME,
        EpisodeDetailsViewState::new(episode_id),
        EpisodeDetailsReducer::new(repository),
    );
    ScreenHost::new(
        SCREEN_NAME,
        config.with_start_mode(StartMode::Immediate),
        view_model,
        navigator,
        route,
    )
}

#[cfg(test)]
#[path = "tests/episode_details_tests.rs"]
mod tests;
