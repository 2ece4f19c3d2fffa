//! Navigation targets, options and requests shared by screens and navigators.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::domain::{EpisodeId, ShowId};

pub const DEEP_LINK_SCHEME: &str = "app.tivi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NavTarget {
    Account,
    Show(ShowId),
    Episode(EpisodeId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("invalid deep link '{0}': {1}")]
    InvalidUri(String, String),
    #[error("unsupported deep link scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("unknown deep link destination '{0}'")]
    UnknownDestination(String),
    #[error("navigation target unreachable: {0}")]
    Unreachable(String),
}

impl NavTarget {
    pub fn uri_string(&self) -> String {
        match self {
            NavTarget::Account => format!("{DEEP_LINK_SCHEME}://account"),
            NavTarget::Show(show_id) => format!("{DEEP_LINK_SCHEME}://show/{}", show_id.0),
            NavTarget::Episode(episode_id) => {
                format!("{DEEP_LINK_SCHEME}://episode/{}", episode_id.0)
            }
        }
    }

    pub fn to_url(&self) -> Result<Url, NavError> {
        let raw = self.uri_string();
        Url::parse(&raw).map_err(|err| NavError::InvalidUri(raw, err.to_string()))
    }

    pub fn from_uri(raw: &str) -> Result<Self, NavError> {
        let url =
            Url::parse(raw).map_err(|err| NavError::InvalidUri(raw.to_string(), err.to_string()))?;
        if url.scheme() != DEEP_LINK_SCHEME {
            return Err(NavError::UnsupportedScheme(url.scheme().to_string()));
        }

        let host = url.host_str().unwrap_or_default();
        let id = url.path().trim_matches('/');
        let parse_id = || {
            id.parse::<i64>()
                .map_err(|_| NavError::UnknownDestination(raw.to_string()))
        };

        match host {
            "account" if id.is_empty() => Ok(NavTarget::Account),
            "show" => Ok(NavTarget::Show(ShowId(parse_id()?))),
            "episode" => Ok(NavTarget::Episode(EpisodeId(parse_id()?))),
            _ => Err(NavError::UnknownDestination(raw.to_string())),
        }
    }
}

impl fmt::Display for NavTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavOptions {
    /// Reuse the top destination instead of stacking a duplicate.
    pub single_top: bool,
    pub animated: bool,
}

impl NavOptions {
    pub const DEFAULT: NavOptions = NavOptions {
        single_top: true,
        animated: true,
    };
}

impl Default for NavOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavRequest {
    Up,
    To {
        target: NavTarget,
        options: Option<NavOptions>,
    },
}

impl NavRequest {
    pub fn to(target: NavTarget) -> Self {
        NavRequest::To {
            target,
            options: None,
        }
    }

    pub fn to_with_defaults(target: NavTarget) -> Self {
        NavRequest::To {
            target,
            options: Some(NavOptions::DEFAULT),
        }
    }
}
