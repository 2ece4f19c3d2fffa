use super::*;
use std::time::Duration;

use anyhow::anyhow;
use futures::StreamExt;
use shared::error::ErrorCode;
use tokio::time::timeout;

#[derive(Debug)]
enum CounterAction {
    Add(i64),
    Explode,
    Noop,
}

impl Action for CounterAction {
    fn name(&self) -> &'static str {
        match self {
            CounterAction::Add(_) => "add",
            CounterAction::Explode => "explode",
            CounterAction::Noop => "noop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CounterState {
    value: i64,
    history: Vec<i64>,
    initialized: bool,
}

struct CounterReducer;

#[async_trait]
impl Reducer<CounterState, CounterAction> for CounterReducer {
    async fn init(&self, state: &CounterState) -> Result<Option<CounterState>> {
        Ok(Some(CounterState {
            initialized: true,
            ..state.clone()
        }))
    }

    async fn reduce(
        &self,
        state: &CounterState,
        action: CounterAction,
    ) -> Result<Option<CounterState>> {
        match action {
            CounterAction::Add(amount) => {
                let mut next = state.clone();
                next.value += amount;
                next.history.push(amount);
                Ok(Some(next))
            }
            CounterAction::Explode => Err(anyhow!("counter storage unavailable")),
            CounterAction::Noop => Ok(None),
        }
    }
}

fn initial() -> CounterState {
    CounterState {
        value: 0,
        history: Vec::new(),
        initialized: false,
    }
}

#[tokio::test]
async fn applies_actions_in_submission_order() {
    let view_model = ViewModel::new("counter", initial(), CounterReducer);
    for amount in [3, -1, 10] {
        view_model
            .submit_action(CounterAction::Add(amount))
            .expect("submit");
    }
    view_model.shutdown().await;

    let state = view_model.state();
    assert!(state.initialized);
    assert_eq!(state.value, 12);
    assert_eq!(state.history, vec![3, -1, 10]);
}

#[tokio::test]
async fn failed_action_keeps_state_and_emits_error() {
    let view_model = ViewModel::new("counter", initial(), CounterReducer);
    let mut errors = view_model.subscribe_errors();

    view_model
        .submit_action(CounterAction::Add(5))
        .expect("submit");
    view_model
        .submit_action(CounterAction::Explode)
        .expect("submit");
    view_model.submit_action(CounterAction::Noop).expect("submit");

    let error = timeout(Duration::from_secs(1), errors.recv())
        .await
        .expect("error in time")
        .expect("error event");
    assert_eq!(error.code, ErrorCode::Unavailable);

    view_model.shutdown().await;
    assert_eq!(view_model.state().value, 5);
}

#[tokio::test]
async fn submit_after_clear_is_rejected() {
    let view_model = ViewModel::new("counter", initial(), CounterReducer);
    view_model.clear();
    view_model.clear();

    assert!(view_model.is_cleared());
    assert_eq!(
        view_model.submit_action(CounterAction::Add(1)),
        Err(SubmitError::Closed)
    );
    assert_eq!(
        Controller::submit(view_model.as_ref(), CounterAction::Add(1)).await,
        Err(SubmitError::Closed)
    );
}

#[tokio::test]
async fn observers_see_published_states() {
    let view_model = ViewModel::new("counter", initial(), CounterReducer);
    let mut observer = view_model.observe();

    view_model
        .submit_action(CounterAction::Add(2))
        .expect("submit");
    let state = timeout(
        Duration::from_secs(1),
        observer.wait_for(|state| state.value == 2),
    )
    .await
    .expect("state in time")
    .expect("state")
    .clone();
    assert_eq!(state.history, vec![2]);

    let mut stream = view_model.state_stream();
    let latest = timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("stream in time")
        .expect("stream item");
    assert_eq!(latest.value, 2);
}

#[tokio::test]
async fn full_pending_queue_rejects_without_blocking() {
    let view_model = ViewModel::with_capacity("counter", initial(), CounterReducer, 2);
    view_model
        .submit_action(CounterAction::Add(1))
        .expect("submit");
    view_model
        .submit_action(CounterAction::Add(2))
        .expect("submit");

    assert!(matches!(
        view_model.submit_action(CounterAction::Add(4)),
        Err(SubmitError::Rejected(_))
    ));

    view_model.shutdown().await;
    assert_eq!(view_model.state().value, 3);
}
