//! Core data types for the project network.
//!
//! Events and operations live in arenas owned by [`crate::graph::NetGraph`]
//! and refer to each other through stable integer ids, never through
//! references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width used when formatting event numbers inside path and operation codes.
pub const NUMBER_WIDTH: usize = 3;

/// Separator placed between event numbers in codes.
pub const CODE_DIVIDER: &str = " -";

/// Stable identity of an event (index into the event arena).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub(crate) u32);

impl EventId {
    /// Raw arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Stable identity of an operation (index into the operation arena).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub(crate) u32);

impl OperationId {
    /// Raw arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

/// 2-D placement of an event. Owned by the editor, stored alongside the event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A milestone node of the network.
#[derive(Clone, Debug)]
pub struct Event {
    pub(crate) n: i32,
    pub(crate) name: String,
    pub(crate) point: Point,
    pub(crate) incoming: Vec<OperationId>,
    pub(crate) outgoing: Vec<OperationId>,
}

impl Event {
    pub(crate) fn new(n: i32) -> Self {
        Self {
            n,
            name: String::new(),
            point: Point::default(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Display number.
    pub fn n(&self) -> i32 {
        self.n
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn point(&self) -> Point {
        self.point
    }

    /// Operations ending at this event, in insertion order.
    pub fn incoming(&self) -> &[OperationId] {
        &self.incoming
    }

    /// Operations starting at this event, in insertion order.
    pub fn outgoing(&self) -> &[OperationId] {
        &self.outgoing
    }

    /// Number of incident operations (both directions).
    pub fn degree(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }

    /// Event number right-aligned to [`NUMBER_WIDTH`].
    pub fn formatted(&self) -> String {
        format_number(self.n)
    }
}

/// A duration-bearing edge between two events.
///
/// `end` is `None` for a dangling operation. `begin` is only `None` while the
/// operation is being wired up by the graph.
#[derive(Clone, Debug)]
pub struct Operation {
    pub(crate) begin: Option<EventId>,
    pub(crate) end: Option<EventId>,
    pub(crate) wait_time: f64,
    pub(crate) name: String,
}

impl Operation {
    pub(crate) fn new(wait_time: f64) -> Self {
        Self {
            begin: None,
            end: None,
            wait_time,
            name: String::new(),
        }
    }

    pub fn begin(&self) -> Option<EventId> {
        self.begin
    }

    pub fn end(&self) -> Option<EventId> {
        self.end
    }

    /// Duration of the operation.
    pub fn wait_time(&self) -> f64 {
        self.wait_time
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Both endpoints are set.
    pub fn is_connected(&self) -> bool {
        self.begin.is_some() && self.end.is_some()
    }
}

/// Format an event number the way codes display it.
pub fn format_number(n: i32) -> String {
    format!("{:>width$}", n, width = NUMBER_WIDTH)
}

/// Placeholder for a missing event inside a code.
pub fn empty_formatted() -> String {
    " ".repeat(NUMBER_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(1), "  1");
        assert_eq!(format_number(42), " 42");
        assert_eq!(format_number(1234), "1234");
        assert_eq!(empty_formatted(), "   ");
    }

    #[test]
    fn test_fresh_operation_is_unconnected() {
        let op = Operation::new(2.5);
        assert!(!op.is_connected());
        assert_eq!(op.wait_time(), 2.5);
        assert!(op.name().is_empty());
    }
}
