//! Change notifications published by the network model.
//!
//! Listeners are plain callbacks invoked synchronously, in registration
//! order, after a mutation has been applied. A listener only sees the
//! change record; it cannot reach back into the model while the mutation
//! is in progress.

use std::fmt;

use crate::models::{EventId, OperationId};

/// A single change published by [`crate::NetModel`].
#[derive(Clone, Debug, PartialEq)]
pub enum NetChange {
    /// Everything is about to be removed. Drop any held ids.
    BeforeClear,
    EventIdChanged { event: EventId, n: i32 },
    EventNameChanged { event: EventId, name: String },
    OperationEndEventChanged {
        operation: OperationId,
        end: Option<EventId>,
    },
    OperationNameChanged { operation: OperationId, name: String },
    OperationWaitTimeChanged { operation: OperationId, wait_time: f64 },
    AfterEventAdd { event: EventId },
    AfterEventInsert { event: EventId, position: usize },
    /// The event still exists while this is delivered.
    BeforeEventDelete { event: EventId },
    AfterOperationAdd { operation: OperationId },
    AfterOperationInsert { operation: OperationId, position: usize },
    /// The operation still exists while this is delivered.
    BeforeOperationDelete { operation: OperationId },
    /// Sent once per mutating call, after the specific change.
    Updated,
}

impl NetChange {
    /// Short, stable name of the change kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BeforeClear => "before_clear",
            Self::EventIdChanged { .. } => "event_id_changed",
            Self::EventNameChanged { .. } => "event_name_changed",
            Self::OperationEndEventChanged { .. } => "operation_end_event_changed",
            Self::OperationNameChanged { .. } => "operation_name_changed",
            Self::OperationWaitTimeChanged { .. } => "operation_wait_time_changed",
            Self::AfterEventAdd { .. } => "after_event_add",
            Self::AfterEventInsert { .. } => "after_event_insert",
            Self::BeforeEventDelete { .. } => "before_event_delete",
            Self::AfterOperationAdd { .. } => "after_operation_add",
            Self::AfterOperationInsert { .. } => "after_operation_insert",
            Self::BeforeOperationDelete { .. } => "before_operation_delete",
            Self::Updated => "updated",
        }
    }
}

impl fmt::Display for NetChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventIdChanged { event, n } => write!(f, "{event} renumbered to {n}"),
            Self::EventNameChanged { event, name } => write!(f, "{event} renamed to {name:?}"),
            Self::OperationEndEventChanged { operation, end } => match end {
                Some(end) => write!(f, "{operation} now ends at {end}"),
                None => write!(f, "{operation} detached from its end event"),
            },
            Self::OperationNameChanged { operation, name } => {
                write!(f, "{operation} renamed to {name:?}")
            }
            Self::OperationWaitTimeChanged {
                operation,
                wait_time,
            } => write!(f, "{operation} duration set to {wait_time}"),
            Self::AfterEventAdd { event } => write!(f, "{event} added"),
            Self::AfterEventInsert { event, position } => {
                write!(f, "{event} inserted at {position}")
            }
            Self::BeforeEventDelete { event } => write!(f, "{event} about to be deleted"),
            Self::AfterOperationAdd { operation } => write!(f, "{operation} added"),
            Self::AfterOperationInsert {
                operation,
                position,
            } => write!(f, "{operation} inserted at {position}"),
            Self::BeforeOperationDelete { operation } => {
                write!(f, "{operation} about to be deleted")
            }
            Self::BeforeClear | Self::Updated => f.write_str(self.kind()),
        }
    }
}

/// Handle returned by [`Listeners::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&NetChange)>;

/// Registered change listeners.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    callbacks: Vec<(ListenerId, Callback)>,
}

impl Listeners {
    pub fn subscribe(&mut self, callback: impl FnMut(&NetChange) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the listener was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(lid, _)| *lid != id);
        self.callbacks.len() != before
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn emit(&mut self, change: &NetChange) {
        for (_, callback) in &mut self.callbacks {
            callback(change);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.callbacks.len())
            .finish()
    }
}
