//! Entity layer: event/operation arenas and adjacency primitives.
//!
//! `connect*`/`disconnect*` are the only functions that touch adjacency
//! lists. Everything that adds, removes or rewires operations is built on
//! top of them so that an operation listed in `event.outgoing` always has
//! `begin == event`, and one listed in `event.incoming` always has
//! `end == event`. Breaking that pairing is a bug, so it is asserted rather
//! than reported.

use rustc_hash::FxHashSet;

use crate::models::{
    empty_formatted, Event, EventId, Operation, OperationId, CODE_DIVIDER,
};

/// Arena storage for the network entities.
///
/// Ids index the arenas directly and are not reused until the graph is
/// cleared, so a stale id simply resolves to `None`. The order vectors hold
/// the canonical creation/display order.
#[derive(Clone, Debug, Default)]
pub struct NetGraph {
    events: Vec<Option<Event>>,
    operations: Vec<Option<Operation>>,
    event_order: Vec<EventId>,
    operation_order: Vec<OperationId>,
}

impl NetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn event_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.get_mut(id.index()).and_then(Option::as_mut)
    }

    #[inline]
    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn operation_mut(&mut self, id: OperationId) -> Option<&mut Operation> {
        self.operations.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Event ids in canonical order.
    pub fn event_ids(&self) -> &[EventId] {
        &self.event_order
    }

    /// Operation ids in canonical order.
    pub fn operation_ids(&self) -> &[OperationId] {
        &self.operation_order
    }

    /// Events in canonical order.
    pub fn events(&self) -> impl Iterator<Item = (EventId, &Event)> + '_ {
        self.event_order
            .iter()
            .filter_map(move |&id| self.event(id).map(|e| (id, e)))
    }

    /// Operations in canonical order.
    pub fn operations(&self) -> impl Iterator<Item = (OperationId, &Operation)> + '_ {
        self.operation_order
            .iter()
            .filter_map(move |&id| self.operation(id).map(|o| (id, o)))
    }

    pub fn event_count(&self) -> usize {
        self.event_order.len()
    }

    pub fn operation_count(&self) -> usize {
        self.operation_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_order.is_empty()
    }

    /// Display number of an event, if it exists.
    pub fn number(&self, id: EventId) -> Option<i32> {
        self.event(id).map(Event::n)
    }

    /// Event number right-aligned, or blanks for a missing event.
    pub fn formatted(&self, id: Option<EventId>) -> String {
        id.and_then(|id| self.event(id))
            .map(Event::formatted)
            .unwrap_or_else(empty_formatted)
    }

    /// First event carrying display number `n`.
    pub fn event_by_number(&self, n: i32) -> Option<EventId> {
        self.events().find(|(_, e)| e.n == n).map(|(id, _)| id)
    }

    /// First operation going from `begin` to `end`.
    pub fn operation_between(&self, begin: EventId, end: EventId) -> Option<OperationId> {
        self.event(begin)?
            .outgoing
            .iter()
            .copied()
            .find(|&op| self.operation(op).and_then(Operation::end) == Some(end))
    }

    /// Duration of the first operation going from `begin` to `end`.
    pub fn weight_between(&self, begin: EventId, end: EventId) -> Option<f64> {
        self.operation_between(begin, end)
            .and_then(|op| self.operation(op))
            .map(Operation::wait_time)
    }

    /// Code of an operation: `"  1 -  2"`.
    pub fn operation_code(&self, id: OperationId) -> String {
        match self.operation(id) {
            Some(op) => format!(
                "{}{}{}",
                self.formatted(op.begin),
                CODE_DIVIDER,
                self.formatted(op.end)
            ),
            None => String::new(),
        }
    }

    /// Number for a new event: one past the largest number in use, or the
    /// smallest free positive number once `i32::MAX` is taken.
    pub fn next_number(&self) -> i32 {
        let max = self.events().map(|(_, e)| e.n).max().unwrap_or(0);
        max.checked_add(1).unwrap_or_else(|| self.smallest_free_number())
    }

    fn smallest_free_number(&self) -> i32 {
        let used: FxHashSet<i32> = self.events().map(|(_, e)| e.n).collect();
        (1..=i32::MAX).find(|n| !used.contains(n)).unwrap_or(i32::MIN)
    }

    // Arena management

    /// Create an event and place it at `position` in the canonical order.
    pub(crate) fn insert_event(&mut self, position: usize, n: i32) -> EventId {
        debug_assert!(position <= self.event_order.len());
        let id = EventId(self.events.len() as u32);
        self.events.push(Some(Event::new(n)));
        self.event_order.insert(position, id);
        id
    }

    /// Drop an event that has no incident operations.
    pub(crate) fn remove_event(&mut self, id: EventId) -> Option<Event> {
        let slot = self.events.get_mut(id.index())?;
        debug_assert!(slot.as_ref().map_or(true, |e| e.degree() == 0));
        let event = slot.take()?;
        self.event_order.retain(|&e| e != id);
        Some(event)
    }

    /// Create an unconnected operation at the end of the canonical order.
    pub(crate) fn alloc_operation(&mut self, wait_time: f64) -> OperationId {
        let id = OperationId(self.operations.len() as u32);
        self.operations.push(Some(Operation::new(wait_time)));
        self.operation_order.push(id);
        id
    }

    /// Drop an operation that has already been disconnected from both ends.
    pub(crate) fn remove_operation(&mut self, id: OperationId) -> Option<Operation> {
        let slot = self.operations.get_mut(id.index())?;
        debug_assert!(slot
            .as_ref()
            .map_or(true, |o| o.begin.is_none() && o.end.is_none()));
        let op = slot.take()?;
        self.operation_order.retain(|&o| o != id);
        Some(op)
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
        self.operations.clear();
        self.event_order.clear();
        self.operation_order.clear();
    }

    // Adjacency primitives

    /// Attach `op` to `event` as its begin event (appended to `outgoing`).
    pub(crate) fn connect_begin(&mut self, event: EventId, op: OperationId) {
        let position = self.event(event).map_or(0, |e| e.outgoing.len());
        self.connect_begin_at(event, op, position);
    }

    /// Attach `op` to `event` as its begin event at `position` in `outgoing`.
    pub(crate) fn connect_begin_at(&mut self, event: EventId, op: OperationId, position: usize) {
        if let Some(o) = self.operation_mut(op) {
            debug_assert!(o.begin.is_none(), "operation already has a begin event");
            o.begin = Some(event);
        }
        if let Some(e) = self.event_mut(event) {
            debug_assert!(!e.outgoing.contains(&op));
            let position = position.min(e.outgoing.len());
            e.outgoing.insert(position, op);
        }
    }

    /// Attach `op` to `event` as its end event.
    pub(crate) fn connect_end(&mut self, op: OperationId, event: EventId) {
        if let Some(o) = self.operation_mut(op) {
            debug_assert!(o.end.is_none(), "operation already has an end event");
            o.end = Some(event);
        }
        if let Some(e) = self.event_mut(event) {
            debug_assert!(!e.incoming.contains(&op));
            e.incoming.push(op);
        }
    }

    /// Attach both endpoints of `op`.
    pub(crate) fn connect(&mut self, begin: EventId, op: OperationId, end: EventId) {
        self.connect_begin(begin, op);
        self.connect_end(op, end);
    }

    /// Inverse of [`Self::connect_begin`].
    pub(crate) fn disconnect_begin(&mut self, event: EventId, op: OperationId) {
        if let Some(o) = self.operation_mut(op) {
            debug_assert_eq!(o.begin, Some(event));
            o.begin = None;
        }
        if let Some(e) = self.event_mut(event) {
            let before = e.outgoing.len();
            e.outgoing.retain(|&o| o != op);
            debug_assert_eq!(before, e.outgoing.len() + 1);
        }
    }

    /// Inverse of [`Self::connect_end`].
    pub(crate) fn disconnect_end(&mut self, op: OperationId, event: EventId) {
        if let Some(o) = self.operation_mut(op) {
            debug_assert_eq!(o.end, Some(event));
            o.end = None;
        }
        if let Some(e) = self.event_mut(event) {
            let before = e.incoming.len();
            e.incoming.retain(|&o| o != op);
            debug_assert_eq!(before, e.incoming.len() + 1);
        }
    }

    /// Detach `op` from whatever endpoints it has.
    pub(crate) fn disconnect_all(&mut self, op: OperationId) {
        let (begin, end) = match self.operation(op) {
            Some(o) => (o.begin, o.end),
            None => return,
        };
        if let Some(end) = end {
            self.disconnect_end(op, end);
        }
        if let Some(begin) = begin {
            self.disconnect_begin(begin, op);
        }
    }
}
