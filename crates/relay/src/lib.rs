//! Pending-action relay between a screen's UI callbacks and the state
//! controller that owns the screen's state.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod relay;
pub mod view_model;

pub use config::{RelayConfig, StartMode, TeardownPolicy, DEFAULT_RELAY_CAPACITY};
pub use dispatch::{Action, Controller, Dispatch, DispatchTable, Dispatcher, Navigator};
pub use error::{OfferError, RelayError, SubmitError};
pub use host::ScreenHost;
pub use lifecycle::{Lifecycle, LifecycleScope, LifecycleState};
pub use relay::{ActionRelay, ActionSender, DrainExit, DrainHandle, DrainReport};
pub use view_model::{Reducer, ViewModel, DEFAULT_PENDING_CAPACITY};
