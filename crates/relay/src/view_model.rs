//! State-owning controller with its own sequential action queue.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use shared::error::ScreenError;
use tokio::{
    sync::{
        broadcast,
        mpsc::{self, error::TrySendError},
        watch,
    },
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use crate::{
    dispatch::{Action, Controller},
    error::SubmitError,
};

const ERROR_EVENT_CAPACITY: usize = 32;

/// Default size of a view model's pending-action queue.
pub const DEFAULT_PENDING_CAPACITY: usize = 64;

#[async_trait]
pub trait Reducer<S, A>: Send + Sync
where
    S: Send + Sync + 'static,
    A: Send + 'static,
{
    /// Runs once before the first action, e.g. to kick off paging.
    async fn init(&self, _state: &S) -> Result<Option<S>> {
        Ok(None)
    }

    /// Returns the next state, or `None` when the action changes nothing.
    async fn reduce(&self, state: &S, action: A) -> Result<Option<S>>;
}

struct Shared<S> {
    state: watch::Sender<S>,
    errors: broadcast::Sender<ScreenError>,
}

impl<S> Shared<S> {
    fn publish(&self, next: S) {
        self.state.send_replace(next);
    }

    fn report(&self, label: &'static str, action: &'static str, err: anyhow::Error) {
        warn!(view_model = label, action, error = %err, "action failed; state unchanged");
        let _ = self
            .errors
            .send(ScreenError::from_message(format!("{err:#}")));
    }
}

pub struct ViewModel<S, A> {
    label: &'static str,
    shared: Arc<Shared<S>>,
    capacity: usize,
    pending: Mutex<Option<mpsc::Sender<A>>>,
    processor: Mutex<Option<JoinHandle<()>>>,
}

impl<S, A> ViewModel<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    /// Spawns the processing task on the current tokio runtime.
    pub fn new<R>(label: &'static str, initial: S, reducer: R) -> Arc<Self>
    where
        R: Reducer<S, A> + 'static,
    {
        Self::with_capacity(label, initial, reducer, DEFAULT_PENDING_CAPACITY)
    }

    pub fn with_capacity<R>(
        label: &'static str,
        initial: S,
        reducer: R,
        capacity: usize,
    ) -> Arc<Self>
    where
        R: Reducer<S, A> + 'static,
    {
        let capacity = capacity.max(1);
        let (state, _) = watch::channel(initial);
        let (errors, _) = broadcast::channel(ERROR_EVENT_CAPACITY);
        let shared = Arc::new(Shared { state, errors });
        let (pending, receiver) = mpsc::channel(capacity);

        let processor = tokio::spawn(process(label, reducer, receiver, Arc::clone(&shared)));

        Arc::new(Self {
            label,
            capacity,
            shared,
            pending: Mutex::new(Some(pending)),
            processor: Mutex::new(Some(processor)),
        })
    }

    pub fn state(&self) -> S {
        self.shared.state.borrow().clone()
    }

    pub fn observe(&self) -> watch::Receiver<S> {
        self.shared.state.subscribe()
    }

    pub fn state_stream(&self) -> WatchStream<S> {
        WatchStream::new(self.observe())
    }

    pub fn subscribe_errors(&self) -> broadcast::Receiver<ScreenError> {
        self.shared.errors.subscribe()
    }

    /// Queues the action for the processing task; returns before it runs.
    /// A full queue rejects the action instead of waiting.
    pub fn submit_action(&self, action: A) -> Result<(), SubmitError> {
        let guard = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(pending) = guard.as_ref() else {
            debug!(view_model = self.label, action = action.name(), "ignored action after clear");
            return Err(SubmitError::Closed);
        };
        match pending.try_send(action) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(action)) => {
                warn!(
                    view_model = self.label,
                    action = action.name(),
                    capacity = self.capacity,
                    "pending queue full"
                );
                Err(SubmitError::Rejected(format!(
                    "pending queue full (capacity {})",
                    self.capacity
                )))
            }
            Err(TrySendError::Closed(_)) => Err(SubmitError::Closed),
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Stops accepting actions. Already queued actions are still applied.
    pub fn clear(&self) {
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            debug!(view_model = self.label, "cleared view model");
        }
    }

    /// Clears and waits for the queued actions to be applied.
    pub async fn shutdown(&self) {
        self.clear();
        let processor = self
            .processor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(processor) = processor {
            if let Err(err) = processor.await {
                warn!(view_model = self.label, error = %err, "view model processor ended abnormally");
            }
        }
    }
}

#[async_trait]
impl<S, A> Controller<A> for ViewModel<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    async fn submit(&self, action: A) -> Result<(), SubmitError> {
        self.submit_action(action)
    }
}

async fn process<S, A, R>(
    label: &'static str,
    reducer: R,
    mut receiver: mpsc::Receiver<A>,
    shared: Arc<Shared<S>>,
) where
    S: Clone + Send + Sync + 'static,
    A: Action,
    R: Reducer<S, A>,
{
    let current = shared.state.borrow().clone();
    match reducer.init(&current).await {
        Ok(Some(next)) => shared.publish(next),
        Ok(None) => {}
        Err(err) => shared.report(label, "init", err),
    }

    while let Some(action) = receiver.recv().await {
        let name = action.name();
        let current = shared.state.borrow().clone();
        match reducer.reduce(&current, action).await {
            Ok(Some(next)) => {
                debug!(view_model = label, action = name, "applied action");
                shared.publish(next);
            }
            Ok(None) => debug!(view_model = label, action = name, "action left state unchanged"),
            Err(err) => shared.report(label, name, err),
        }
    }

    debug!(view_model = label, "pending actions drained");
}

#[cfg(test)]
#[path = "tests/view_model_tests.rs"]
mod tests;
