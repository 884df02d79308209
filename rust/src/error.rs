//! Error type shared by every fallible network operation.

use thiserror::Error;

use crate::models::{EventId, OperationId};

/// Errors returned by network queries and mutating commands.
///
/// A mutating command that returns an error leaves the model untouched and
/// fires no notification.
#[derive(Error, Debug)]
pub enum NetError {
    #[error("Event not found: {0}")]
    UnknownEvent(EventId),
    #[error("Operation not found: {0}")]
    UnknownOperation(OperationId),
    #[error("Event {event} still has {count} incident operation(s)")]
    EventHasOperations { event: EventId, count: usize },
    #[error("Position {position} is out of range (length {len})")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("Invalid operation duration: {0}")]
    InvalidWaitTime(f64),
    #[error("Event number {0} is already in use")]
    DuplicateNumber(i32),
    #[error("Operation {0} has no end event")]
    DanglingOperation(OperationId),
    #[error("Network is not correct: {0}")]
    InvalidNetwork(String),
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
