use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ShowId);
id_newtype!(EpisodeId);
id_newtype!(WatchId);
id_newtype!(UserId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowSummary {
    pub show_id: ShowId,
    pub title: String,
    pub first_aired_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode_id: EpisodeId,
    pub show_id: ShowId,
    pub season: u32,
    pub number: u32,
    pub title: String,
    pub first_aired: Option<DateTime<Utc>>,
}

impl EpisodeSummary {
    /// An episode can only be marked watched once it has aired.
    pub fn has_aired(&self, now: DateTime<Utc>) -> bool {
        self.first_aired.is_some_and(|aired| aired <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeWatch {
    pub watch_id: WatchId,
    pub episode_id: EpisodeId,
    pub watched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularEntry {
    pub show: ShowSummary,
    pub page: u32,
    pub page_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedEntry {
    pub show: ShowSummary,
    pub last_watched: DateTime<Utc>,
    pub followed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    LastWatched,
    Alphabetical,
    DateAdded,
}

impl SortOption {
    pub const ALL: [SortOption; 3] = [
        SortOption::LastWatched,
        SortOption::Alphabetical,
        SortOption::DateAdded,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    LoggedOut,
    LoggedIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub username: String,
}
