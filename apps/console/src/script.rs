//! Comma-separated session scripts: lifecycle moves and actions to offer.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use screens::{EpisodeDetailsAction, PopularAction, WatchedAction};
use shared::domain::{ShowId, SortOption, WatchId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Start,
    Stop,
    Resume,
    Pause,
    Wait(Duration),
    Offer(Token),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Close,
    Refresh,
    AddWatch,
    RemoveWatch(WatchId),
    RemoveAllWatches,
    ClearError,
    OpenShow(ShowId),
    Login,
    OpenUser,
    Sort(SortOption),
    Filter(String),
    LoadMore,
}

pub fn parse_script(raw: &str) -> Result<Vec<Step>> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_step)
        .collect()
}

fn parse_step(raw: &str) -> Result<Step> {
    let (name, arg) = match raw.split_once(':') {
        Some((name, arg)) => (name.trim(), Some(arg.trim())),
        None => (raw, None),
    };
    let require_arg = || arg.ok_or_else(|| anyhow!("step '{name}' needs an argument"));
    let parse_id = || -> Result<i64> {
        let arg = require_arg()?;
        arg.parse()
            .with_context(|| format!("step '{name}' expects a numeric id, got '{arg}'"))
    };

    let step = match name {
        "start" => Step::Start,
        "stop" => Step::Stop,
        "resume" => Step::Resume,
        "pause" => Step::Pause,
        "wait" => {
            let arg = require_arg()?;
            let millis: u64 = arg
                .parse()
                .with_context(|| format!("wait expects milliseconds, got '{arg}'"))?;
            Step::Wait(Duration::from_millis(millis))
        }
        "close" => Step::Offer(Token::Close),
        "refresh" => Step::Offer(Token::Refresh),
        "add-watch" => Step::Offer(Token::AddWatch),
        "remove-watch" => Step::Offer(Token::RemoveWatch(WatchId(parse_id()?))),
        "remove-all-watches" => Step::Offer(Token::RemoveAllWatches),
        "clear-error" => Step::Offer(Token::ClearError),
        "open-show" => Step::Offer(Token::OpenShow(ShowId(parse_id()?))),
        "login" => Step::Offer(Token::Login),
        "open-user" => Step::Offer(Token::OpenUser),
        "load-more" => Step::Offer(Token::LoadMore),
        "sort" => Step::Offer(Token::Sort(parse_sort(require_arg()?)?)),
        "filter" => Step::Offer(Token::Filter(arg.unwrap_or_default().to_string())),
        other => bail!("unknown script step '{other}'"),
    };
    Ok(step)
}

fn parse_sort(raw: &str) -> Result<SortOption> {
    match raw {
        "recent" | "last-watched" => Ok(SortOption::LastWatched),
        "alpha" | "alphabetical" => Ok(SortOption::Alphabetical),
        "added" | "date-added" => Ok(SortOption::DateAdded),
        other => bail!("unknown sort '{other}'"),
    }
}

pub fn episode_details_action(token: &Token) -> Result<EpisodeDetailsAction> {
    Ok(match token {
        Token::Close => EpisodeDetailsAction::Close,
        Token::Refresh => EpisodeDetailsAction::Refresh,
        Token::AddWatch => EpisodeDetailsAction::AddEpisodeWatch,
        Token::RemoveWatch(watch_id) => EpisodeDetailsAction::RemoveEpisodeWatch(*watch_id),
        Token::RemoveAllWatches => EpisodeDetailsAction::RemoveAllEpisodeWatches,
        Token::ClearError => EpisodeDetailsAction::ClearError,
        other => bail!("{other:?} is not available on the episode details screen"),
    })
}

pub fn popular_action(token: &Token) -> Result<PopularAction> {
    Ok(match token {
        Token::OpenShow(show_id) => PopularAction::OpenShowDetails(*show_id),
        Token::Refresh => PopularAction::Refresh,
        Token::LoadMore => PopularAction::LoadMore,
        other => bail!("{other:?} is not available on the popular screen"),
    })
}

pub fn watched_action(token: &Token) -> Result<WatchedAction> {
    Ok(match token {
        Token::Refresh => WatchedAction::Refresh,
        Token::Login => WatchedAction::Login,
        Token::OpenUser => WatchedAction::OpenUserDetails,
        Token::OpenShow(show_id) => WatchedAction::OpenShowDetails(*show_id),
        Token::Sort(sort) => WatchedAction::ChangeSort(*sort),
        Token::Filter(filter) => WatchedAction::Filter(filter.clone()),
        Token::ClearError => WatchedAction::ClearError,
        other => bail!("{other:?} is not available on the watched screen"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_lifecycle_and_action_steps() {
        let steps = parse_script("start, open-show:42 ,wait:5,stop,sort:alpha,filter:dark,,close")
            .expect("script");
        assert_eq!(
            steps,
            vec![
                Step::Start,
                Step::Offer(Token::OpenShow(ShowId(42))),
                Step::Wait(Duration::from_millis(5)),
                Step::Stop,
                Step::Offer(Token::Sort(SortOption::Alphabetical)),
                Step::Offer(Token::Filter("dark".to_string())),
                Step::Offer(Token::Close),
            ]
        );
    }

    #[test]
    fn rejects_unknown_steps_and_bad_ids() {
        assert!(parse_script("jump").is_err());
        assert!(parse_script("open-show:abc").is_err());
        assert!(parse_script("open-show").is_err());
        assert!(parse_script("sort:random").is_err());
    }

    #[test]
    fn tokens_map_to_screen_specific_actions() {
        assert_eq!(
            episode_details_action(&Token::Close).expect("close"),
            EpisodeDetailsAction::Close
        );
        assert_eq!(
            watched_action(&Token::OpenUser).expect("open user"),
            WatchedAction::OpenUserDetails
        );
        assert!(popular_action(&Token::Login).is_err());
        assert!(episode_details_action(&Token::OpenShow(ShowId(1))).is_err());
    }
}
