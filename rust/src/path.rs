//! Ordered event sequences with incrementally maintained weight and code.

use crate::graph::NetGraph;
use crate::models::{EventId, OperationId, CODE_DIVIDER};

/// A route through the network.
///
/// Weight and code are updated as events are added at either end, so
/// [`Path::prepend`] and [`Path::append`] are the only ways to grow a path.
#[derive(Clone, Debug, Default)]
pub struct Path {
    events: Vec<EventId>,
    weight: f64,
    code: String,
}

impl Path {
    /// Path made of a single event (weight zero).
    pub fn new(graph: &NetGraph, event: EventId) -> Self {
        Self {
            events: vec![event],
            weight: 0.0,
            code: graph.formatted(Some(event)),
        }
    }

    /// Build a path from a full event sequence.
    pub fn from_events(graph: &NetGraph, events: &[EventId]) -> Self {
        let mut path = Self::default();
        for &event in events {
            path.append(graph, event);
        }
        path
    }

    pub fn events(&self) -> &[EventId] {
        &self.events
    }

    /// Sum of the durations of the traversed operations.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Event numbers joined by the code divider.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first(&self) -> Option<EventId> {
        self.events.first().copied()
    }

    pub fn last(&self) -> Option<EventId> {
        self.events.last().copied()
    }

    pub fn contains_event(&self, event: EventId) -> bool {
        self.events.contains(&event)
    }

    /// Grow the path at its start. `event` must have an operation into the
    /// current first event.
    pub fn prepend(&mut self, graph: &NetGraph, event: EventId) {
        let formatted = graph.formatted(Some(event));
        match self.first() {
            Some(first) => {
                let step = graph.weight_between(event, first);
                debug_assert!(step.is_some(), "no operation {event} -> {first}");
                self.weight += step.unwrap_or(0.0);
                self.code = format!("{formatted}{CODE_DIVIDER}{}", self.code);
            }
            None => self.code = formatted,
        }
        self.events.insert(0, event);
    }

    /// Grow the path at its end. The current last event must have an
    /// operation into `event`.
    pub fn append(&mut self, graph: &NetGraph, event: EventId) {
        let formatted = graph.formatted(Some(event));
        match self.last() {
            Some(last) => {
                let step = graph.weight_between(last, event);
                debug_assert!(step.is_some(), "no operation {last} -> {event}");
                self.weight += step.unwrap_or(0.0);
                self.code.push_str(CODE_DIVIDER);
                self.code.push_str(&formatted);
            }
            None => self.code = formatted,
        }
        self.events.push(event);
    }

    /// True if the path traverses `op`.
    pub fn contains_operation(&self, graph: &NetGraph, op: OperationId) -> bool {
        let Some(operation) = graph.operation(op) else {
            return false;
        };
        let (Some(begin), Some(end)) = (operation.begin(), operation.end()) else {
            return false;
        };
        self.events
            .windows(2)
            .any(|pair| pair[0] == begin && pair[1] == end)
    }

    /// Operations traversed by the path, in order.
    pub fn operations(&self, graph: &NetGraph) -> Vec<OperationId> {
        self.events
            .windows(2)
            .filter_map(|pair| graph.operation_between(pair[0], pair[1]))
            .collect()
    }

    /// Weight of the sub-path running from `from` to `to`, if `from` occurs
    /// at or before `to` on this path.
    pub fn segment_weight(&self, graph: &NetGraph, from: EventId, to: EventId) -> Option<f64> {
        let start = self.events.iter().position(|&e| e == from)?;
        let stop = self.events.iter().position(|&e| e == to)?;
        if start > stop {
            return None;
        }
        Some(
            self.events[start..=stop]
                .windows(2)
                .filter_map(|pair| graph.weight_between(pair[0], pair[1]))
                .sum(),
        )
    }
}

impl PartialEq for Path {
    /// Two paths are equal when they visit the same events in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.events == other.events
    }
}

impl Eq for Path {}
