//! Routing of dequeued actions to navigation or to the state controller.

use std::{fmt, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use shared::nav::{NavOptions, NavRequest, NavTarget};
use tracing::{debug, warn};

use crate::error::SubmitError;

/// A discrete user intent emitted by a screen.
pub trait Action: fmt::Debug + Send + 'static {
    /// Stable name used as a structured logging field.
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait Controller<A: Action>: Send + Sync {
    async fn submit(&self, action: A) -> Result<(), SubmitError>;
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, target: NavTarget, options: Option<NavOptions>) -> Result<()>;
    async fn navigate_up(&self) -> Result<()>;
}

/// Maps the action variants a screen diverts to navigation. Anything without
/// a route goes to the controller.
pub trait DispatchTable<A>: Send + Sync {
    fn route(&self, action: &A) -> Option<NavRequest>;
}

impl<A, F> DispatchTable<A> for F
where
    F: Fn(&A) -> Option<NavRequest> + Send + Sync,
{
    fn route(&self, action: &A) -> Option<NavRequest> {
        self(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Navigated,
    Submitted,
    Failed,
}

pub struct Dispatcher<A: Action> {
    table: Arc<dyn DispatchTable<A>>,
    controller: Arc<dyn Controller<A>>,
    navigator: Arc<dyn Navigator>,
}

impl<A: Action> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            controller: Arc::clone(&self.controller),
            navigator: Arc::clone(&self.navigator),
        }
    }
}

impl<A: Action> Dispatcher<A> {
    pub fn new(
        table: impl DispatchTable<A> + 'static,
        controller: Arc<dyn Controller<A>>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            table: Arc::new(table),
            controller,
            navigator,
        }
    }

    /// Applies one action. Failures are logged and reported as
    /// [`Dispatch::Failed`]; they never escape to the caller.
    pub async fn dispatch(&self, action: A) -> Dispatch {
        let name = action.name();
        let Some(request) = self.table.route(&action) else {
            return match self.controller.submit(action).await {
                Ok(()) => {
                    debug!(action = name, "submitted action to controller");
                    Dispatch::Submitted
                }
                Err(err) => {
                    warn!(action = name, error = %err, "controller rejected action; continuing");
                    Dispatch::Failed
                }
            };
        };

        let result = match request {
            NavRequest::Up => self.navigator.navigate_up().await,
            NavRequest::To { target, options } => self.navigator.navigate(target, options).await,
        };
        match result {
            Ok(()) => {
                debug!(action = name, ?request, "relayed action to navigation");
                Dispatch::Navigated
            }
            Err(err) => {
                warn!(action = name, ?request, error = %err, "navigation failed; continuing");
                Dispatch::Failed
            }
        }
    }
}
