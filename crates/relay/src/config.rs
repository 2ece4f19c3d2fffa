use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Buffer size of a default buffered channel in the host UI framework.
pub const DEFAULT_RELAY_CAPACITY: usize = 64;

/// When the drain loop is allowed to dequeue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMode {
    /// Drain for as long as the scope is alive.
    #[default]
    Immediate,
    /// Drain only while the scope is at least started; buffer otherwise.
    WhenStarted,
}

/// What happens to buffered actions when the relay is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownPolicy {
    #[default]
    DeliverPending,
    DiscardPending,
}

impl FromStr for TeardownPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "deliver" | "deliver_pending" => Ok(TeardownPolicy::DeliverPending),
            "discard" | "discard_pending" => Ok(TeardownPolicy::DiscardPending),
            other => Err(format!("unknown teardown policy '{other}'")),
        }
    }
}

impl FromStr for StartMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "immediate" => Ok(StartMode::Immediate),
            "when_started" | "started" => Ok(StartMode::WhenStarted),
            other => Err(format!("unknown start mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub capacity: usize,
    pub start_mode: StartMode,
    pub teardown: TeardownPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_RELAY_CAPACITY,
            start_mode: StartMode::default(),
            teardown: TeardownPolicy::default(),
        }
    }
}

impl RelayConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_start_mode(mut self, start_mode: StartMode) -> Self {
        self.start_mode = start_mode;
        self
    }

    pub fn with_teardown(mut self, teardown: TeardownPolicy) -> Self {
        self.teardown = teardown;
        self
    }

    /// Zero-sized buffers are not supported by the channel; clamp to one.
    pub(crate) fn effective_capacity(&self) -> usize {
        self.capacity.max(1)
    }
}
