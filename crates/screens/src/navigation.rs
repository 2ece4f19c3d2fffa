use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use relay::Navigator;
use serde::Serialize;
use shared::nav::{NavError, NavOptions, NavRequest, NavTarget};
use tracing::info;

pub const HOME_ROUTE: &str = "app.tivi://home";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationSnapshot {
    pub back_stack: Vec<String>,
    pub history: Vec<NavRequest>,
}

/// In-memory navigator over a stack of route URIs. The bottom entry is the
/// start destination and can never be popped.
pub struct BackStackNavigator {
    inner: Mutex<NavigationSnapshot>,
}

impl BackStackNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(NavigationSnapshot {
                back_stack: vec![start.into()],
                history: Vec::new(),
            }),
        }
    }

    /// Start destination with `routes` already pushed on top of it.
    pub fn with_stack<I>(start: impl Into<String>, routes: I) -> Self
    where
        I: IntoIterator<Item = NavTarget>,
    {
        let navigator = Self::new(start);
        {
            let mut inner = navigator.lock();
            inner
                .back_stack
                .extend(routes.into_iter().map(|target| target.uri_string()));
        }
        navigator
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        self.lock().clone()
    }

    pub fn current(&self) -> Option<String> {
        self.lock().back_stack.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavigationSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Navigator for BackStackNavigator {
    async fn navigate(&self, target: NavTarget, options: Option<NavOptions>) -> Result<()> {
        let route = target.to_url()?.to_string();
        let mut inner = self.lock();
        inner.history.push(NavRequest::To { target, options });

        let single_top = options.is_some_and(|options| options.single_top);
        if single_top && inner.back_stack.last() == Some(&route) {
            info!(%route, "already at destination");
            return Ok(());
        }
        info!(%route, "navigating");
        inner.back_stack.push(route);
        Ok(())
    }

    async fn navigate_up(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.back_stack.len() <= 1 {
            return Err(NavError::Unreachable("already at the start destination".to_string()).into());
        }
        inner.history.push(NavRequest::Up);
        let left = inner.back_stack.pop();
        info!(route = ?left, "navigated up");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::ShowId;

    use super::*;

    #[tokio::test]
    async fn single_top_does_not_stack_duplicates() {
        let navigator = BackStackNavigator::new(HOME_ROUTE);
        let target = NavTarget::Show(ShowId(42));
        navigator
            .navigate(target, Some(NavOptions::DEFAULT))
            .await
            .expect("navigate");
        navigator
            .navigate(target, Some(NavOptions::DEFAULT))
            .await
            .expect("navigate");

        let snapshot = navigator.snapshot();
        assert_eq!(
            snapshot.back_stack,
            vec![HOME_ROUTE.to_string(), "app.tivi://show/42".to_string()]
        );
        assert_eq!(snapshot.history.len(), 2);
    }

    #[tokio::test]
    async fn navigate_without_options_always_pushes() {
        let navigator = BackStackNavigator::new(HOME_ROUTE);
        navigator
            .navigate(NavTarget::Account, None)
            .await
            .expect("navigate");
        navigator
            .navigate(NavTarget::Account, None)
            .await
            .expect("navigate");
        assert_eq!(navigator.snapshot().back_stack.len(), 3);
    }

    #[tokio::test]
    async fn cannot_navigate_up_from_start_destination() {
        let navigator = BackStackNavigator::new(HOME_ROUTE);
        let err = navigator.navigate_up().await.expect_err("should fail");
        assert!(err.to_string().contains("unreachable"));
        assert_eq!(navigator.current().as_deref(), Some(HOME_ROUTE));
    }
}
