//! Hosting side of a screen: wires a view model, a relay and a navigator to
//! one lifecycle.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::{RelayConfig, StartMode, TeardownPolicy},
    dispatch::{Action, Controller, DispatchTable, Dispatcher, Navigator},
    error::RelayError,
    lifecycle::{Lifecycle, LifecycleState},
    relay::{ActionRelay, ActionSender, DrainHandle, DrainReport},
    view_model::ViewModel,
};

pub struct ScreenHost<S, A: Action> {
    name: &'static str,
    instance_id: Uuid,
    lifecycle: Lifecycle,
    relay: ActionRelay<A>,
    view_model: Arc<ViewModel<S, A>>,
    dispatcher: Dispatcher<A>,
    drain: Option<DrainHandle>,
}

impl<S, A> ScreenHost<S, A>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    pub fn new(
        name: &'static str,
        config: RelayConfig,
        view_model: Arc<ViewModel<S, A>>,
        navigator: Arc<dyn Navigator>,
        table: impl DispatchTable<A> + 'static,
    ) -> Self {
        let controller: Arc<dyn Controller<A>> = view_model.clone();
        Self {
            name,
            instance_id: Uuid::new_v4(),
            lifecycle: Lifecycle::new(),
            relay: ActionRelay::new(name, config),
            view_model,
            dispatcher: Dispatcher::new(table, controller, navigator),
            drain: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn relay(&self) -> &ActionRelay<A> {
        &self.relay
    }

    pub fn view_model(&self) -> &Arc<ViewModel<S, A>> {
        &self.view_model
    }

    /// Producer handle for UI callbacks.
    pub fn actioner(&self) -> ActionSender<A> {
        self.relay.sender()
    }

    pub fn on_create(&mut self) {
        self.lifecycle.move_to(LifecycleState::Created);
        debug!(screen = self.name, instance = %self.instance_id, "screen created");
    }

    /// Starts draining unless a drain is already running. A `WhenStarted`
    /// drain paused by `on_stop` resumes by itself.
    pub fn on_start(&mut self) -> Result<(), RelayError> {
        self.lifecycle.move_to(LifecycleState::Started);
        if self.relay.is_draining() {
            return Ok(());
        }

        let drain = self
            .relay
            .start(self.lifecycle.scope(), self.dispatcher.clone())?;
        self.drain = Some(drain);
        info!(
            screen = self.name,
            instance = %self.instance_id,
            start_mode = ?self.relay.config().start_mode,
            "screen started action relay"
        );
        Ok(())
    }

    pub fn on_resume(&mut self) {
        self.lifecycle.move_to(LifecycleState::Resumed);
    }

    pub fn on_pause(&mut self) {
        self.lifecycle.move_to(LifecycleState::Started);
    }

    pub fn on_stop(&mut self) {
        self.lifecycle.move_to(LifecycleState::Created);
        debug!(screen = self.name, instance = %self.instance_id, "screen stopped");
    }

    /// Closes the relay, cancels the lifecycle and clears the view model.
    /// Buffered actions are delivered first only when the teardown policy and
    /// the current state allow the drain to run to completion.
    pub async fn on_destroy(&mut self) -> Option<DrainReport> {
        self.relay.close();

        let config = self.relay.config();
        let can_finish = config.teardown == TeardownPolicy::DeliverPending
            && (config.start_mode == StartMode::Immediate
                || self.lifecycle.is_at_least(LifecycleState::Started));
        if !can_finish {
            self.lifecycle.destroy();
        }

        let report = match self.drain.take() {
            Some(drain) => match drain.join().await {
                Ok(report) => Some(report),
                Err(err) => {
                    warn!(screen = self.name, instance = %self.instance_id, error = %err, "drain ended abnormally");
                    None
                }
            },
            None => None,
        };

        self.lifecycle.destroy();
        self.view_model.shutdown().await;
        info!(screen = self.name, instance = %self.instance_id, ?report, "screen destroyed");
        report
    }
}
