//! Ordered, buffered, single-consumer hand-off between a screen's UI callbacks
//! and its dispatcher.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        watch, OwnedMutexGuard,
    },
    task::JoinHandle,
};
use tracing::{debug, info, info_span, Instrument};

use crate::{
    config::{RelayConfig, StartMode, TeardownPolicy},
    dispatch::{Action, Dispatch, Dispatcher},
    error::{OfferError, RelayError},
    lifecycle::{LifecycleScope, LifecycleState},
};

struct RelayShared<A> {
    label: &'static str,
    capacity: usize,
    sender: Mutex<Option<mpsc::Sender<A>>>,
    closed: watch::Sender<bool>,
}

impl<A: Action> RelayShared<A> {
    fn offer(&self, action: A) -> Result<(), OfferError> {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = guard.as_ref() else {
            debug!(relay = self.label, action = action.name(), "dropped action offered after close");
            return Err(OfferError::Closed);
        };

        match sender.try_send(action) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(action)) => {
                debug!(relay = self.label, action = action.name(), "relay buffer full");
                Err(OfferError::Full(self.capacity))
            }
            Err(TrySendError::Closed(_)) => Err(OfferError::Closed),
        }
    }

    fn close(&self) -> bool {
        let previous = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.closed.send_replace(true);
        previous.is_some()
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// Cloneable producer handle given to UI callbacks.
pub struct ActionSender<A> {
    shared: Arc<RelayShared<A>>,
}

impl<A> Clone for ActionSender<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: Action> ActionSender<A> {
    pub fn offer(&self, action: A) -> Result<(), OfferError> {
        self.shared.offer(action)
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainExit {
    /// The owning scope was destroyed; undelivered actions stay buffered.
    #[default]
    Cancelled,
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub delivered: usize,
    pub navigated: usize,
    pub submitted: usize,
    pub failed: usize,
    pub discarded: usize,
    pub exit: DrainExit,
}

pub struct DrainHandle {
    handle: JoinHandle<DrainReport>,
}

impl DrainHandle {
    pub async fn join(self) -> Result<DrainReport, RelayError> {
        self.handle
            .await
            .map_err(|err| RelayError::DrainTask(err.to_string()))
    }

    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

pub struct ActionRelay<A> {
    shared: Arc<RelayShared<A>>,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<A>>>,
    config: RelayConfig,
}

impl<A: Action> ActionRelay<A> {
    pub fn new(label: &'static str, config: RelayConfig) -> Self {
        let capacity = config.effective_capacity();
        let (sender, receiver) = mpsc::channel(capacity);
        let (closed, _) = watch::channel(false);
        Self {
            shared: Arc::new(RelayShared {
                label,
                capacity,
                sender: Mutex::new(Some(sender)),
                closed,
            }),
            receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
            config,
        }
    }

    pub fn config(&self) -> RelayConfig {
        self.config
    }

    pub fn sender(&self) -> ActionSender<A> {
        ActionSender {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Non-blocking enqueue. Does not wait for the action to be dispatched.
    pub fn offer(&self, action: A) -> Result<(), OfferError> {
        self.shared.offer(action)
    }

    /// Rejects all later offers. Returns `false` if the relay was already
    /// closed.
    pub fn close(&self) -> bool {
        let closed_now = self.shared.close();
        if closed_now {
            debug!(relay = self.shared.label, teardown = ?self.config.teardown, "closed action relay");
        }
        closed_now
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    pub fn is_draining(&self) -> bool {
        self.receiver.try_lock().is_err()
    }

    /// Spawns the drain loop on the current tokio runtime. The loop holds the
    /// receiver for its whole life, so only one drain can run at a time.
    pub fn start(
        &self,
        scope: LifecycleScope,
        dispatcher: Dispatcher<A>,
    ) -> Result<DrainHandle, RelayError> {
        if self.is_closed() && self.config.teardown == TeardownPolicy::DiscardPending {
            return Err(RelayError::Closed);
        }
        let receiver = Arc::clone(&self.receiver)
            .try_lock_owned()
            .map_err(|_| RelayError::AlreadyDraining)?;

        let label = self.shared.label;
        let closed = self.shared.closed.subscribe();
        let span = info_span!("action_relay", relay = label);
        let handle = tokio::spawn(
            drain(receiver, scope, dispatcher, closed, self.config).instrument(span),
        );
        Ok(DrainHandle { handle })
    }
}

enum Step<A> {
    Exit(DrainExit),
    Paused,
    Resumed,
    Next(A),
}

async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    let _ = closed.wait_for(|closed| *closed).await;
}

async fn drain<A: Action>(
    mut receiver: OwnedMutexGuard<mpsc::Receiver<A>>,
    scope: LifecycleScope,
    dispatcher: Dispatcher<A>,
    mut closed: watch::Receiver<bool>,
    config: RelayConfig,
) -> DrainReport {
    let discard = config.teardown == TeardownPolicy::DiscardPending;
    let when_started = config.start_mode == StartMode::WhenStarted;
    let mut report = DrainReport::default();

    debug!(start_mode = ?config.start_mode, "action relay drain started");

    let exit = loop {
        if when_started && !scope.is_at_least(LifecycleState::Started) {
            let step: Step<A> = tokio::select! {
                biased;
                _ = wait_closed(&mut closed), if discard => Step::Exit(DrainExit::Closed),
                started = scope.wait_until_at_least(LifecycleState::Started) => {
                    if started { Step::Resumed } else { Step::Exit(DrainExit::Cancelled) }
                }
            };
            match step {
                Step::Exit(exit) => break exit,
                _ => debug!("action relay drain resumed"),
            }
        }

        let step = tokio::select! {
            biased;
            _ = wait_closed(&mut closed), if discard => Step::Exit(DrainExit::Closed),
            _ = scope.cancelled() => Step::Exit(DrainExit::Cancelled),
            _ = scope.wait_until_below(LifecycleState::Started), if when_started => Step::Paused,
            action = receiver.recv() => match action {
                Some(action) => Step::Next(action),
                None => Step::Exit(DrainExit::Closed),
            },
        };

        let action = match step {
            Step::Exit(exit) => break exit,
            Step::Paused => {
                debug!("action relay drain paused until started");
                continue;
            }
            Step::Resumed => continue,
            Step::Next(action) => action,
        };

        report.delivered += 1;
        let outcome = tokio::select! {
            biased;
            _ = scope.cancelled() => None,
            outcome = dispatcher.dispatch(action) => Some(outcome),
        };
        match outcome {
            Some(Dispatch::Navigated) => report.navigated += 1,
            Some(Dispatch::Submitted) => report.submitted += 1,
            Some(Dispatch::Failed) => report.failed += 1,
            None => break DrainExit::Cancelled,
        }
    };

    if exit == DrainExit::Closed && discard {
        while receiver.try_recv().is_ok() {
            report.discarded += 1;
        }
    }
    report.exit = exit;

    info!(
        exit = ?report.exit,
        delivered = report.delivered,
        navigated = report.navigated,
        submitted = report.submitted,
        failed = report.failed,
        discarded = report.discarded,
        "action relay drain finished"
    );
    report
}

#[cfg(test)]
#[path = "tests/relay_tests.rs"]
mod tests;
