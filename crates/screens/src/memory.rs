//! In-memory collaborators backing the screens in the console and in tests.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shared::domain::{
    EpisodeId, EpisodeSummary, EpisodeWatch, PopularEntry, ShowId, ShowSummary, UserId,
    UserSummary, WatchId, WatchedEntry,
};
use tokio::sync::Mutex;

use crate::{
    episode_details::EpisodeRepository, popular::PopularShowsSource, watched::WatchedRepository,
};

fn show(show_id: i64, title: &str, year: i32) -> ShowSummary {
    ShowSummary {
        show_id: ShowId(show_id),
        title: title.to_string(),
        first_aired_year: Some(year),
    }
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 20, 0, 0)
        .single()
        .unwrap_or_default()
}

#[derive(Default)]
struct EpisodeStore {
    episodes: BTreeMap<EpisodeId, EpisodeSummary>,
    watches: Vec<EpisodeWatch>,
    next_watch_id: i64,
    unavailable: bool,
}

#[derive(Default)]
pub struct InMemoryEpisodeRepository {
    store: Mutex<EpisodeStore>,
}

impl InMemoryEpisodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small catalogue: one aired episode with a watch, one unaired episode.
    pub fn seeded() -> Self {
        let mut store = EpisodeStore {
            next_watch_id: 1,
            ..EpisodeStore::default()
        };
        store.episodes.insert(
            EpisodeId(7),
            EpisodeSummary {
                episode_id: EpisodeId(7),
                show_id: ShowId(42),
                season: 1,
                number: 3,
                title: "The Long Night".to_string(),
                first_aired: Some(at(2019, 4, 28)),
            },
        );
        store.episodes.insert(
            EpisodeId(8),
            EpisodeSummary {
                episode_id: EpisodeId(8),
                show_id: ShowId(42),
                season: 1,
                number: 4,
                title: "Upcoming".to_string(),
                first_aired: Some(Utc::now() + Duration::days(30)),
            },
        );
        store.watches.push(EpisodeWatch {
            watch_id: WatchId(1),
            episode_id: EpisodeId(7),
            watched_at: at(2019, 4, 29),
        });
        store.next_watch_id = 2;
        Self {
            store: Mutex::new(store),
        }
    }

    pub async fn insert_episode(&self, episode: EpisodeSummary) {
        self.store
            .lock()
            .await
            .episodes
            .insert(episode.episode_id, episode);
    }

    pub async fn set_unavailable(&self, unavailable: bool) {
        self.store.lock().await.unavailable = unavailable;
    }

    pub async fn watch_count(&self, episode_id: EpisodeId) -> usize {
        self.store
            .lock()
            .await
            .watches
            .iter()
            .filter(|watch| watch.episode_id == episode_id)
            .count()
    }
}

#[async_trait]
impl EpisodeRepository for InMemoryEpisodeRepository {
    async fn episode(&self, episode_id: EpisodeId) -> Result<EpisodeSummary> {
        let store = self.store.lock().await;
        if store.unavailable {
            return Err(anyhow!("episode store unavailable"));
        }
        store
            .episodes
            .get(&episode_id)
            .cloned()
            .ok_or_else(|| anyhow!("episode {} not found", episode_id.0))
    }

    async fn watches(&self, episode_id: EpisodeId) -> Result<Vec<EpisodeWatch>> {
        let store = self.store.lock().await;
        if store.unavailable {
            return Err(anyhow!("episode store unavailable"));
        }
        Ok(store
            .watches
            .iter()
            .filter(|watch| watch.episode_id == episode_id)
            .cloned()
            .collect())
    }

    async fn add_watch(
        &self,
        episode_id: EpisodeId,
        watched_at: DateTime<Utc>,
    ) -> Result<EpisodeWatch> {
        let mut store = self.store.lock().await;
        if store.unavailable {
            return Err(anyhow!("episode store unavailable"));
        }
        if !store.episodes.contains_key(&episode_id) {
            return Err(anyhow!("episode {} not found", episode_id.0));
        }
        let watch = EpisodeWatch {
            watch_id: WatchId(store.next_watch_id.max(1)),
            episode_id,
            watched_at,
        };
        store.next_watch_id = watch.watch_id.0 + 1;
        store.watches.push(watch.clone());
        Ok(watch)
    }

    async fn remove_watch(&self, watch_id: WatchId) -> Result<()> {
        let mut store = self.store.lock().await;
        let before = store.watches.len();
        store.watches.retain(|watch| watch.watch_id != watch_id);
        if store.watches.len() == before {
            return Err(anyhow!("watch {} not found", watch_id.0));
        }
        Ok(())
    }

    async fn remove_all_watches(&self, episode_id: EpisodeId) -> Result<()> {
        self.store
            .lock()
            .await
            .watches
            .retain(|watch| watch.episode_id != episode_id);
        Ok(())
    }
}

/// Serves `total` generated shows in pages, ranked by position.
pub struct InMemoryPopularShows {
    total: u32,
    requests: Mutex<Vec<(u32, u32)>>,
}

impl InMemoryPopularShows {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `(page, page_size)` of every request served so far.
    pub async fn requests(&self) -> Vec<(u32, u32)> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PopularShowsSource for InMemoryPopularShows {
    async fn load_page(&self, page: u32, page_size: u32) -> Result<Vec<PopularEntry>> {
        self.requests.lock().await.push((page, page_size));
        let start = page.saturating_mul(page_size);
        let end = start.saturating_add(page_size).min(self.total);
        Ok((start..end)
            .map(|rank| PopularEntry {
                show: show(
                    1000 + i64::from(rank),
                    &format!("Popular show #{}", rank + 1),
                    2000 + (rank % 20) as i32,
                ),
                page,
                page_order: rank - start,
            })
            .collect())
    }
}

struct WatchedStore {
    user: Option<UserSummary>,
    entries: Vec<WatchedEntry>,
    refreshes: u32,
}

pub struct InMemoryWatchedRepository {
    store: Mutex<WatchedStore>,
}

impl InMemoryWatchedRepository {
    pub fn new(user: Option<UserSummary>, entries: Vec<WatchedEntry>) -> Self {
        Self {
            store: Mutex::new(WatchedStore {
                user,
                entries,
                refreshes: 0,
            }),
        }
    }

    pub fn seeded() -> Self {
        Self::new(
            Some(UserSummary {
                user_id: UserId(1),
                username: "sam".to_string(),
            }),
            vec![
                WatchedEntry {
                    show: show(42, "Game of Thrones", 2011),
                    last_watched: at(2019, 5, 20),
                    followed_at: at(2012, 1, 3),
                },
                WatchedEntry {
                    show: show(7, "Breaking Bad", 2008),
                    last_watched: at(2013, 9, 30),
                    followed_at: at(2010, 6, 1),
                },
                WatchedEntry {
                    show: show(99, "Dark", 2017),
                    last_watched: at(2020, 6, 28),
                    followed_at: at(2018, 1, 15),
                },
            ],
        )
    }

    pub async fn refreshes(&self) -> u32 {
        self.store.lock().await.refreshes
    }
}

#[async_trait]
impl WatchedRepository for InMemoryWatchedRepository {
    async fn current_user(&self) -> Result<Option<UserSummary>> {
        Ok(self.store.lock().await.user.clone())
    }

    async fn watched_shows(&self) -> Result<Vec<WatchedEntry>> {
        Ok(self.store.lock().await.entries.clone())
    }

    async fn refresh(&self) -> Result<()> {
        let mut store = self.store.lock().await;
        if store.user.is_none() {
            return Err(anyhow!("unauthorized: log in to sync watched history"));
        }
        store.refreshes += 1;
        Ok(())
    }
}
