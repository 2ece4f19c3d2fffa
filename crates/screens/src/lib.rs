//! The three screens that hand user actions to a relay: episode details,
//! popular shows and watched history.

pub mod episode_details;
pub mod memory;
pub mod navigation;
pub mod popular;
pub mod watched;

pub use episode_details::{
    episode_details_screen, EpisodeDetailsAction, EpisodeDetailsScreen, EpisodeDetailsViewState,
    EpisodeRepository,
};
pub use navigation::{BackStackNavigator, NavigationSnapshot, HOME_ROUTE};
pub use popular::{
    popular_screen, PagingConfig, PopularAction, PopularScreen, PopularShowsSource,
    PopularViewState, PAGING_CONFIG,
};
pub use watched::{
    watched_screen, WatchedAction, WatchedRepository, WatchedScreen, WatchedViewState,
};
