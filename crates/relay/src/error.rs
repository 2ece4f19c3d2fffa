use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OfferError {
    #[error("action relay is closed")]
    Closed,
    #[error("action relay buffer is full (capacity {0})")]
    Full(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("action relay already has an active drain")]
    AlreadyDraining,
    #[error("action relay is closed and discards pending actions")]
    Closed,
    #[error("action relay drain task failed: {0}")]
    DrainTask(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("controller no longer accepts actions")]
    Closed,
    #[error("controller rejected action: {0}")]
    Rejected(String),
}
