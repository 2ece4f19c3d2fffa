//! Explicit screen lifetime: the owner moves states, scopes observe them.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Ordered so that `Destroyed` compares below every live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Destroyed,
    Initialized,
    Created,
    Started,
    Resumed,
}

pub struct Lifecycle {
    state: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleState::Initialized);
        Self { state }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn is_at_least(&self, state: LifecycleState) -> bool {
        self.state() >= state
    }

    /// Returns `false` when the state did not change. `Destroyed` is terminal.
    pub fn move_to(&self, next: LifecycleState) -> bool {
        self.state.send_if_modified(|current| {
            if *current == LifecycleState::Destroyed || *current == next {
                return false;
            }
            *current = next;
            true
        })
    }

    pub fn destroy(&self) -> bool {
        self.move_to(LifecycleState::Destroyed)
    }

    pub fn scope(&self) -> LifecycleScope {
        LifecycleScope {
            state: self.state.subscribe(),
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer half handed to tasks that must not outlive the screen. Dropping
/// the owning [`Lifecycle`] counts as destruction.
#[derive(Clone)]
pub struct LifecycleScope {
    state: watch::Receiver<LifecycleState>,
}

impl LifecycleScope {
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn is_at_least(&self, state: LifecycleState) -> bool {
        self.state() >= state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state() == LifecycleState::Destroyed || self.state.has_changed().is_err()
    }

    pub async fn cancelled(&self) {
        let mut state = self.state.clone();
        let _ = state
            .wait_for(|current| *current == LifecycleState::Destroyed)
            .await;
    }

    /// Resolves `true` once the scope reaches `target`, `false` if it is
    /// destroyed first.
    pub async fn wait_until_at_least(&self, target: LifecycleState) -> bool {
        let mut state = self.state.clone();
        let reached = match state
            .wait_for(|current| *current == LifecycleState::Destroyed || *current >= target)
            .await
        {
            Ok(current) => *current != LifecycleState::Destroyed,
            Err(_) => false,
        };
        reached
    }

    pub async fn wait_until_below(&self, target: LifecycleState) {
        let mut state = self.state.clone();
        let _ = state.wait_for(|current| *current < target).await;
    }
}
