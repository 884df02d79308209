//! The network model: owner of the graph, its caches and its listeners.
//!
//! All mutation goes through [`NetModel`]. Each successful command applies
//! its change through the entity layer, empties every cache, then notifies
//! listeners with the specific change followed by [`NetChange::Updated`].
//! A failed command returns an error and changes nothing.
//!
//! Listeners must not try to mutate the model from a callback. In Rust the
//! model is mutably borrowed for the duration of the call, so this cannot
//! compile; wrappers that share the model dynamically must refuse it.

use crate::cache::NetCache;
use crate::config::NetConfig;
use crate::error::NetError;
use crate::graph::NetGraph;
use crate::models::{Event, EventId, Operation, OperationId, Point};
use crate::observer::{ListenerId, Listeners, NetChange};
use crate::path::Path;
use crate::paths::{find_paths, max_path_weight, max_paths, max_weight, select_max, sort_paths};
use crate::report::{build_report, NetReport};
use crate::timing::Timing;
use crate::validation::{self, Defect};
use crate::{log_changes, log_checks, log_debug};
use std::fmt;

/// Project network with cached derived collections.
#[derive(Debug, Default)]
pub struct NetModel {
    pub(crate) graph: NetGraph,
    pub(crate) cache: NetCache,
    listeners: Listeners,
    config: NetConfig,
}

impl NetModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NetConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Read-only view of the entity layer.
    pub fn graph(&self) -> &NetGraph {
        &self.graph
    }

    /// Cache slots, exposed for inspection.
    pub fn cache(&self) -> &NetCache {
        &self.cache
    }

    // Listeners

    pub fn subscribe(&mut self, callback: impl FnMut(&NetChange) + 'static) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Fire [`NetChange::Updated`] without changing anything.
    pub fn update(&mut self) {
        self.notify(&NetChange::Updated);
    }

    pub(crate) fn notify(&mut self, change: &NetChange) {
        self.listeners.emit(change);
    }

    /// Invalidate caches, then publish `changes` followed by `Updated`.
    fn commit(&mut self, changes: &[NetChange]) {
        self.cache.invalidate_all();
        for change in changes {
            self.notify(change);
        }
        self.notify(&NetChange::Updated);
    }

    // Read queries

    /// Event ids in canonical order.
    pub fn events(&self) -> &[EventId] {
        self.graph.event_ids()
    }

    /// Operation ids in canonical order.
    pub fn operations(&self) -> &[OperationId] {
        self.graph.operation_ids()
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.graph.event(id)
    }

    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.graph.operation(id)
    }

    /// Event at `index` in canonical order.
    pub fn event_at(&self, index: usize) -> Option<EventId> {
        self.graph.event_ids().get(index).copied()
    }

    pub fn first_event(&self) -> Option<EventId> {
        self.graph.event_ids().first().copied()
    }

    pub fn last_event(&self) -> Option<EventId> {
        self.graph.event_ids().last().copied()
    }

    pub fn event_count(&self) -> usize {
        self.graph.event_count()
    }

    pub fn operation_count(&self) -> usize {
        self.graph.operation_count()
    }

    pub fn event_by_number(&self, n: i32) -> Option<EventId> {
        self.graph.event_by_number(n)
    }

    pub fn operation_by_events(&self, begin: EventId, end: EventId) -> Option<OperationId> {
        self.graph.operation_between(begin, end)
    }

    pub fn operation_code(&self, id: OperationId) -> String {
        self.graph.operation_code(id)
    }

    /// The unique begin and end events, each `None` unless exactly one exists.
    pub fn begin_end_events(&self) -> (Option<EventId>, Option<EventId>) {
        (self.begin_event(), self.end_event())
    }

    /// The only event without incoming operations, if there is exactly one.
    pub fn begin_event(&self) -> Option<EventId> {
        match validation::begin_events(&self.graph).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// The only event without outgoing operations, if there is exactly one.
    pub fn end_event(&self) -> Option<EventId> {
        match validation::end_events(&self.graph).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Events ordered by display number (ties keep canonical order).
    pub fn sorted_events(&self) -> &[EventId] {
        self.cache.sorted_events.get_or_fill(|| {
            let mut ids = self.graph.event_ids().to_vec();
            ids.sort_by_key(|&id| self.graph.number(id).unwrap_or(i32::MAX));
            ids
        })
    }

    /// Operations ordered by begin number, then end number (dangling last).
    pub fn sorted_operations(&self) -> &[OperationId] {
        self.cache.sorted_operations.get_or_fill(|| {
            let mut ids = self.graph.operation_ids().to_vec();
            ids.sort_by_key(|&id| {
                let op = self.graph.operation(id);
                let begin = op
                    .and_then(Operation::begin)
                    .and_then(|e| self.graph.number(e))
                    .unwrap_or(i32::MAX);
                let end = op.and_then(Operation::end).and_then(|e| self.graph.number(e));
                (begin, end.is_none(), end.unwrap_or(0))
            });
            ids
        })
    }

    /// Every path from the begin event to the end event, heaviest first.
    ///
    /// Empty unless the network has a unique begin and end event. The
    /// returned slice is the same allocation on every call until the next
    /// mutation.
    pub fn full_paths(&self) -> &[Path] {
        self.cache.full_paths.get_or_fill(|| {
            let mut paths = match self.begin_end_events() {
                (Some(begin), Some(end)) => find_paths(&self.graph, begin, end),
                _ => Vec::new(),
            };
            sort_paths(&mut paths);
            log_debug!(self.config.verbosity, "[net] enumerated {} full path(s)", paths.len());
            paths
        })
    }

    /// Full paths of maximum weight. A network may have several.
    pub fn critical_paths(&self) -> &[Path] {
        self.cache.critical_paths.get_or_fill(|| {
            let critical = select_max(self.full_paths(), self.config.tolerance);
            log_debug!(self.config.verbosity, "[net] {} critical path(s)", critical.len());
            critical
        })
    }

    pub fn critical_path_weight(&self) -> f64 {
        max_weight(self.critical_paths())
    }

    /// Every simple path between two events.
    pub fn paths_between(&self, start: EventId, end: EventId) -> Vec<Path> {
        find_paths(&self.graph, start, end)
    }

    /// Heaviest paths between two events.
    pub fn max_paths(&self, start: EventId, end: EventId) -> Vec<Path> {
        max_paths(&self.graph, start, end, self.config.tolerance)
    }

    pub fn max_path_weight(&self, start: EventId, end: EventId) -> f64 {
        max_path_weight(&self.graph, start, end)
    }

    // Validation

    pub fn defects(&self) -> Vec<Defect> {
        let defects = validation::find_defects(&self.graph);
        for defect in &defects {
            log_checks!(self.config.verbosity, "[net] defect: {}", defect);
        }
        defects
    }

    pub fn is_correct(&self) -> bool {
        validation::find_defects(&self.graph).is_empty()
    }

    /// Like [`Self::is_correct`], with the diagnostic text on failure.
    pub fn check(&self) -> Result<(), NetError> {
        let defects = self.defects();
        if defects.is_empty() {
            Ok(())
        } else {
            Err(NetError::InvalidNetwork(validation::describe(&defects)))
        }
    }

    pub fn has_no_loops(&self) -> bool {
        validation::has_no_loops(&self.graph)
    }

    pub fn has_no_multi_edges(&self) -> bool {
        validation::has_no_multi_edges(&self.graph)
    }

    pub fn has_one_begin_event(&self) -> bool {
        validation::has_one_begin_event(&self.graph)
    }

    pub fn has_one_end_event(&self) -> bool {
        validation::has_one_end_event(&self.graph)
    }

    pub fn has_no_unconnected_events(&self) -> bool {
        validation::has_no_unconnected_events(&self.graph)
    }

    pub fn has_no_unconnected_operations(&self) -> bool {
        validation::has_no_unconnected_operations(&self.graph)
    }

    // Derived metrics

    /// Timing engine over the current network. Fails on an incorrect network.
    pub fn timing(&self) -> Result<Timing<'_>, NetError> {
        Timing::new(self)
    }

    /// Path, event and operation tables for a correct network.
    pub fn report(&self) -> Result<NetReport, NetError> {
        build_report(self, &self.timing()?)
    }

    // Mutation commands

    fn require_event(&self, id: EventId) -> Result<&Event, NetError> {
        self.graph.event(id).ok_or(NetError::UnknownEvent(id))
    }

    fn require_operation(&self, id: OperationId) -> Result<&Operation, NetError> {
        self.graph.operation(id).ok_or(NetError::UnknownOperation(id))
    }

    fn require_wait_time(&self, wait_time: f64) -> Result<(), NetError> {
        if wait_time.is_finite() && wait_time >= 0.0 {
            Ok(())
        } else {
            log_checks!(self.config.verbosity, "[net] rejected duration {}", wait_time);
            Err(NetError::InvalidWaitTime(wait_time))
        }
    }

    /// Append a new event numbered after every existing one.
    pub fn add_event(&mut self) -> EventId {
        let n = self.graph.next_number();
        let id = self.graph.insert_event(self.graph.event_count(), n);
        log_changes!(self.config.verbosity, "[net] added event {} ({})", n, id);
        self.commit(&[NetChange::AfterEventAdd { event: id }]);
        id
    }

    /// Insert a new event at `position` in canonical order.
    pub fn insert_event(&mut self, position: usize) -> Result<EventId, NetError> {
        let len = self.graph.event_count();
        if position > len {
            return Err(NetError::PositionOutOfRange { position, len });
        }
        let n = self.graph.next_number();
        let id = self.graph.insert_event(position, n);
        log_changes!(
            self.config.verbosity,
            "[net] inserted event {} ({}) at {}",
            n,
            id,
            position
        );
        self.commit(&[NetChange::AfterEventInsert {
            event: id,
            position,
        }]);
        Ok(id)
    }

    /// Remove an event. Fails while any operation still touches it.
    pub fn remove_event(&mut self, id: EventId) -> Result<(), NetError> {
        let count = self.require_event(id)?.degree();
        if count > 0 {
            log_checks!(
                self.config.verbosity,
                "[net] refused to remove {}: {} incident operation(s)",
                id,
                count
            );
            return Err(NetError::EventHasOperations { event: id, count });
        }
        self.notify(&NetChange::BeforeEventDelete { event: id });
        self.graph.remove_event(id);
        log_changes!(self.config.verbosity, "[net] removed event {}", id);
        self.commit(&[]);
        Ok(())
    }

    fn check_new_operation(
        &self,
        begin: EventId,
        end: Option<EventId>,
        wait_time: f64,
    ) -> Result<(), NetError> {
        self.require_event(begin)?;
        if let Some(end) = end {
            self.require_event(end)?;
        }
        self.require_wait_time(wait_time)
    }

    /// Create an operation from `begin` to `end` (`None` leaves it dangling).
    pub fn add_operation(
        &mut self,
        begin: EventId,
        end: Option<EventId>,
        wait_time: f64,
    ) -> Result<OperationId, NetError> {
        self.add_named_operation(begin, end, wait_time, "")
    }

    /// Like [`Self::add_operation`], naming the operation in the same command.
    pub fn add_named_operation(
        &mut self,
        begin: EventId,
        end: Option<EventId>,
        wait_time: f64,
        name: &str,
    ) -> Result<OperationId, NetError> {
        self.check_new_operation(begin, end, wait_time)?;
        let id = self.graph.alloc_operation(wait_time);
        if let Some(op) = self.graph.operation_mut(id) {
            op.name = name.to_string();
        }
        match end {
            Some(end) => self.graph.connect(begin, id, end),
            None => self.graph.connect_begin(begin, id),
        }
        log_changes!(
            self.config.verbosity,
            "[net] added operation {} ({}), duration {}",
            self.graph.operation_code(id),
            id,
            wait_time
        );
        self.commit(&[NetChange::AfterOperationAdd { operation: id }]);
        Ok(id)
    }

    /// Like [`Self::add_operation`], placing the operation at `position` in
    /// the begin event's outgoing list.
    pub fn insert_operation(
        &mut self,
        begin: EventId,
        end: Option<EventId>,
        wait_time: f64,
        position: usize,
    ) -> Result<OperationId, NetError> {
        self.check_new_operation(begin, end, wait_time)?;
        let len = self.require_event(begin)?.outgoing().len();
        if position > len {
            return Err(NetError::PositionOutOfRange { position, len });
        }
        let id = self.graph.alloc_operation(wait_time);
        self.graph.connect_begin_at(begin, id, position);
        if let Some(end) = end {
            self.graph.connect_end(id, end);
        }
        log_changes!(
            self.config.verbosity,
            "[net] inserted operation {} ({}) at {}",
            self.graph.operation_code(id),
            id,
            position
        );
        self.commit(&[NetChange::AfterOperationInsert {
            operation: id,
            position,
        }]);
        Ok(id)
    }

    /// Detach an operation from both events and drop it.
    pub fn remove_operation(&mut self, id: OperationId) -> Result<(), NetError> {
        self.require_operation(id)?;
        self.notify(&NetChange::BeforeOperationDelete { operation: id });
        let code = self.graph.operation_code(id);
        self.graph.disconnect_all(id);
        self.graph.remove_operation(id);
        log_changes!(self.config.verbosity, "[net] removed operation {} ({})", code, id);
        self.commit(&[]);
        Ok(())
    }

    /// Renumber an event. Numbers must stay unique.
    pub fn set_event_number(&mut self, id: EventId, n: i32) -> Result<(), NetError> {
        self.require_event(id)?;
        if self.graph.event_by_number(n).is_some_and(|other| other != id) {
            return Err(NetError::DuplicateNumber(n));
        }
        if let Some(event) = self.graph.event_mut(id) {
            event.n = n;
        }
        log_changes!(self.config.verbosity, "[net] {} renumbered to {}", id, n);
        self.commit(&[NetChange::EventIdChanged { event: id, n }]);
        Ok(())
    }

    pub fn set_event_name(&mut self, id: EventId, name: &str) -> Result<(), NetError> {
        self.require_event(id)?;
        if let Some(event) = self.graph.event_mut(id) {
            event.name = name.to_string();
        }
        log_changes!(self.config.verbosity, "[net] {} renamed to {:?}", id, name);
        self.commit(&[NetChange::EventNameChanged {
            event: id,
            name: name.to_string(),
        }]);
        Ok(())
    }

    /// Move an event on the canvas. Placement is not structural: no cache is
    /// touched and nothing is published.
    pub fn set_event_point(&mut self, id: EventId, point: Point) -> Result<(), NetError> {
        let event = self.graph.event_mut(id).ok_or(NetError::UnknownEvent(id))?;
        event.point = point;
        Ok(())
    }

    /// Re-target (or detach, with `None`) the end of an operation.
    /// Setting the current end again is a no-op.
    pub fn set_operation_end_event(
        &mut self,
        id: OperationId,
        end: Option<EventId>,
    ) -> Result<(), NetError> {
        let current = self.require_operation(id)?.end();
        if let Some(end) = end {
            self.require_event(end)?;
        }
        if current == end {
            return Ok(());
        }
        if let Some(old) = current {
            self.graph.disconnect_end(id, old);
        }
        if let Some(new) = end {
            self.graph.connect_end(id, new);
        }
        log_changes!(
            self.config.verbosity,
            "[net] operation {} now {}",
            id,
            self.graph.operation_code(id)
        );
        self.commit(&[NetChange::OperationEndEventChanged { operation: id, end }]);
        Ok(())
    }

    pub fn set_operation_name(&mut self, id: OperationId, name: &str) -> Result<(), NetError> {
        self.require_operation(id)?;
        if let Some(op) = self.graph.operation_mut(id) {
            op.name = name.to_string();
        }
        log_changes!(self.config.verbosity, "[net] {} renamed to {:?}", id, name);
        self.commit(&[NetChange::OperationNameChanged {
            operation: id,
            name: name.to_string(),
        }]);
        Ok(())
    }

    pub fn set_operation_wait_time(
        &mut self,
        id: OperationId,
        wait_time: f64,
    ) -> Result<(), NetError> {
        self.require_operation(id)?;
        self.require_wait_time(wait_time)?;
        if let Some(op) = self.graph.operation_mut(id) {
            op.wait_time = wait_time;
        }
        log_changes!(
            self.config.verbosity,
            "[net] {} duration set to {}",
            id,
            wait_time
        );
        self.commit(&[NetChange::OperationWaitTimeChanged {
            operation: id,
            wait_time,
        }]);
        Ok(())
    }

    /// Remove every event and operation. `BeforeClear` goes out first.
    pub fn clear(&mut self) {
        self.notify(&NetChange::BeforeClear);
        self.graph.clear();
        log_changes!(self.config.verbosity, "[net] cleared");
        self.commit(&[]);
    }
}

/// Plain-text dump: events in canonical order, then operations.
impl fmt::Display for NetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "events: {}", self.event_count())?;
        for (_, event) in self.graph.events() {
            writeln!(f, "{} {:?}", event.formatted(), event.name())?;
        }
        writeln!(f, "operations: {}", self.operation_count())?;
        for (id, op) in self.graph.operations() {
            writeln!(
                f,
                "{} {} {:?}",
                self.graph.operation_code(id),
                op.wait_time(),
                op.name()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheState;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Linear chain 1 -(5)-> 2 -(3)-> 3.
    fn chain() -> (NetModel, Vec<EventId>) {
        let mut net = NetModel::new();
        let e: Vec<EventId> = (0..3).map(|_| net.add_event()).collect();
        net.add_operation(e[0], Some(e[1]), 5.0).unwrap();
        net.add_operation(e[1], Some(e[2]), 3.0).unwrap();
        (net, e)
    }

    fn recorder(net: &mut NetModel) -> Rc<RefCell<Vec<NetChange>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        net.subscribe(move |c| sink.borrow_mut().push(c.clone()));
        log
    }

    #[test]
    fn test_chain_has_one_full_path() {
        let (net, e) = chain();
        assert!(net.is_correct());
        assert_eq!(net.begin_end_events(), (Some(e[0]), Some(e[2])));

        let paths = net.full_paths();
        assert_eq!(paths.len(), 1);
        assert!((paths[0].weight() - 8.0).abs() < 1e-9);
        assert_eq!(paths[0].code(), "  1 -  2 -  3");
        assert!((net.critical_path_weight() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_events_are_numbered_sequentially() {
        let (net, e) = chain();
        let numbers: Vec<i32> = e.iter().map(|&id| net.event(id).unwrap().n()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(net.event_by_number(2), Some(e[1]));
        assert_eq!(net.first_event(), Some(e[0]));
        assert_eq!(net.last_event(), Some(e[2]));
        assert_eq!(net.event_at(1), Some(e[1]));
        assert_eq!(net.event_at(3), None);
    }

    #[test]
    fn test_full_paths_cached_until_mutation() {
        let (mut net, e) = chain();
        let first = net.full_paths().as_ptr();
        let second = net.full_paths().as_ptr();
        assert_eq!(first, second);
        assert_eq!(net.cache().full_paths.state(), CacheState::Valid);

        let op = net.operation_by_events(e[0], e[1]).unwrap();
        net.set_operation_wait_time(op, 1.0).unwrap();
        assert_eq!(net.cache().valid_count(), 0);
        assert!((net.full_paths()[0].weight() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_every_mutation_invalidates_caches() {
        let (mut net, e) = chain();
        let warm = |net: &NetModel| {
            net.full_paths();
            net.critical_paths();
            net.sorted_events();
            net.sorted_operations();
            assert_eq!(net.cache().valid_count(), 4);
        };

        warm(&net);
        net.set_event_name(e[0], "start").unwrap();
        assert_eq!(net.cache().valid_count(), 0);

        warm(&net);
        net.set_event_number(e[0], 10).unwrap();
        assert_eq!(net.cache().valid_count(), 0);

        warm(&net);
        let extra = net.add_event();
        assert_eq!(net.cache().valid_count(), 0);

        net.full_paths();
        net.remove_event(extra).unwrap();
        assert_eq!(net.cache().valid_count(), 0);
    }

    #[test]
    fn test_remove_event_with_operations_fails() {
        let (mut net, e) = chain();
        let log = recorder(&mut net);

        let err = net.remove_event(e[1]).unwrap_err();
        assert!(matches!(err, NetError::EventHasOperations { count: 2, .. }));
        assert_eq!(net.event_count(), 3);
        assert_eq!(net.operation_count(), 2);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_remove_operation_then_event() {
        let (mut net, e) = chain();
        let op = net.operation_by_events(e[1], e[2]).unwrap();
        net.remove_operation(op).unwrap();
        assert!(net.operation(op).is_none());
        assert!(net.event(e[1]).unwrap().outgoing().is_empty());
        assert!(net.event(e[2]).unwrap().incoming().is_empty());

        net.remove_event(e[2]).unwrap();
        assert_eq!(net.event_count(), 2);
        assert!(net.is_correct());
        assert!(matches!(
            net.remove_operation(op),
            Err(NetError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_notification_order() {
        let (mut net, e) = chain();
        let log = recorder(&mut net);

        net.set_event_name(e[1], "mid").unwrap();
        let op = net.add_operation(e[0], Some(e[2]), 1.0).unwrap();
        net.remove_operation(op).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                NetChange::EventNameChanged {
                    event: e[1],
                    name: "mid".to_string()
                },
                NetChange::Updated,
                NetChange::AfterOperationAdd { operation: op },
                NetChange::Updated,
                NetChange::BeforeOperationDelete { operation: op },
                NetChange::Updated,
            ]
        );
    }

    #[test]
    fn test_each_command_publishes_its_change_then_updated() {
        let (mut net, e) = chain();
        let op = net.operation_by_events(e[0], e[1]).unwrap();
        let log = recorder(&mut net);
        let take = |log: &Rc<RefCell<Vec<NetChange>>>| -> Vec<NetChange> {
            log.borrow_mut().drain(..).collect()
        };

        net.set_event_number(e[2], 7).unwrap();
        assert_eq!(
            take(&log),
            vec![NetChange::EventIdChanged { event: e[2], n: 7 }, NetChange::Updated]
        );

        let added = net.add_event();
        assert_eq!(
            take(&log),
            vec![NetChange::AfterEventAdd { event: added }, NetChange::Updated]
        );

        let inserted = net.insert_event(0).unwrap();
        assert_eq!(
            take(&log),
            vec![
                NetChange::AfterEventInsert {
                    event: inserted,
                    position: 0
                },
                NetChange::Updated
            ]
        );

        let parallel = net.insert_operation(e[0], None, 1.5, 1).unwrap();
        assert_eq!(
            take(&log),
            vec![
                NetChange::AfterOperationInsert {
                    operation: parallel,
                    position: 1
                },
                NetChange::Updated
            ]
        );

        net.set_operation_end_event(parallel, Some(added)).unwrap();
        assert_eq!(
            take(&log),
            vec![
                NetChange::OperationEndEventChanged {
                    operation: parallel,
                    end: Some(added)
                },
                NetChange::Updated
            ]
        );

        net.set_operation_name(op, "dig").unwrap();
        assert_eq!(
            take(&log),
            vec![
                NetChange::OperationNameChanged {
                    operation: op,
                    name: "dig".to_string()
                },
                NetChange::Updated
            ]
        );

        net.set_operation_wait_time(op, 2.0).unwrap();
        assert_eq!(
            take(&log),
            vec![
                NetChange::OperationWaitTimeChanged {
                    operation: op,
                    wait_time: 2.0
                },
                NetChange::Updated
            ]
        );

        net.remove_event(inserted).unwrap();
        assert_eq!(
            take(&log),
            vec![NetChange::BeforeEventDelete { event: inserted }, NetChange::Updated]
        );
    }

    #[test]
    fn test_named_operation_is_one_command() {
        let (mut net, e) = chain();
        let log = recorder(&mut net);
        let op = net.add_named_operation(e[0], Some(e[2]), 4.0, "pour").unwrap();

        assert_eq!(net.operation(op).unwrap().name(), "pour");
        assert_eq!(
            *log.borrow(),
            vec![NetChange::AfterOperationAdd { operation: op }, NetChange::Updated]
        );
    }

    #[test]
    fn test_add_event_after_renumber_to_max() {
        let (mut net, e) = chain();
        net.set_event_number(e[2], i32::MAX).unwrap();

        let added = net.add_event();
        assert_eq!(net.event(added).unwrap().n(), 3);
        let inserted = net.insert_event(0).unwrap();
        assert_eq!(net.event(inserted).unwrap().n(), 4);
        assert_eq!(net.event_by_number(i32::MAX), Some(e[2]));
    }

    #[test]
    fn test_display_lists_events_and_operations() {
        let (mut net, e) = chain();
        net.set_event_name(e[0], "start").unwrap();
        let op = net.operation_by_events(e[1], e[2]).unwrap();
        net.set_operation_name(op, "finish").unwrap();

        assert_eq!(
            net.to_string(),
            "events: 3\n  1 \"start\"\n  2 \"\"\n  3 \"\"\n\
             operations: 2\n  1 -  2 5 \"\"\n  2 -  3 3 \"finish\"\n"
        );
    }

    #[test]
    fn test_clear_notifies_before_removing() {
        let (mut net, _) = chain();
        let log = recorder(&mut net);
        net.clear();
        assert_eq!(net.event_count(), 0);
        assert_eq!(net.operation_count(), 0);
        assert_eq!(*log.borrow(), vec![NetChange::BeforeClear, NetChange::Updated]);
        assert!(net.full_paths().is_empty());
    }

    #[test]
    fn test_insert_event_position() {
        let (mut net, e) = chain();
        let inserted = net.insert_event(1).unwrap();
        assert_eq!(net.events(), &[e[0], inserted, e[1], e[2]]);
        assert_eq!(net.event(inserted).unwrap().n(), 4);
        assert!(matches!(
            net.insert_event(9),
            Err(NetError::PositionOutOfRange { position: 9, len: 4 })
        ));
    }

    #[test]
    fn test_insert_operation_position() {
        let (mut net, e) = chain();
        let existing = net.operation_by_events(e[0], e[1]).unwrap();
        let inserted = net.insert_operation(e[0], Some(e[2]), 2.0, 0).unwrap();
        assert_eq!(net.event(e[0]).unwrap().outgoing(), &[inserted, existing]);
        assert!(net.insert_operation(e[0], None, 1.0, 5).is_err());
        assert_eq!(net.operation_count(), 3);
    }

    #[test]
    fn test_illegal_mutations_leave_model_unchanged() {
        let (mut net, e) = chain();
        let op = net.operation_by_events(e[0], e[1]).unwrap();
        let log = recorder(&mut net);

        assert!(matches!(
            net.set_operation_wait_time(op, -1.0),
            Err(NetError::InvalidWaitTime(_))
        ));
        assert!(net.set_operation_wait_time(op, f64::NAN).is_err());
        assert!(matches!(
            net.set_event_number(e[0], 2),
            Err(NetError::DuplicateNumber(2))
        ));
        let stale = net.add_event();
        net.remove_event(stale).unwrap();
        log.borrow_mut().clear();
        assert!(net.add_operation(e[0], Some(stale), 1.0).is_err());
        assert!(net.set_operation_end_event(op, Some(stale)).is_err());

        assert!(log.borrow().is_empty());
        assert_eq!(net.operation(op).unwrap().wait_time(), 5.0);
        assert_eq!(net.operation_count(), 2);
    }

    #[test]
    fn test_set_operation_end_event() {
        let (mut net, e) = chain();
        let op = net.operation_by_events(e[0], e[1]).unwrap();
        net.set_operation_end_event(op, None).unwrap();
        assert!(!net.has_no_unconnected_operations());
        assert!(net.event(e[1]).unwrap().incoming().is_empty());

        net.set_operation_end_event(op, Some(e[1])).unwrap();
        assert!(net.is_correct());
        assert_eq!(net.event(e[1]).unwrap().incoming(), &[op]);
    }

    #[test]
    fn test_two_events_without_operations() {
        let mut net = NetModel::new();
        net.add_event();
        net.add_event();
        let err = net.check().unwrap_err();
        assert!(err.to_string().contains("unconnected events"));
        assert!(net.timing().is_err());
    }

    #[test]
    fn test_single_event_network() {
        let mut net = NetModel::new();
        let only = net.add_event();
        assert!(net.is_correct());
        assert_eq!(net.full_paths().len(), 1);
        assert_eq!(net.critical_path_weight(), 0.0);
        let timing = net.timing().unwrap();
        assert_eq!(timing.early_time(only).unwrap(), 0.0);
        assert_eq!(timing.late_time(only).unwrap(), 0.0);
    }

    #[test]
    fn test_sorted_collections() {
        let (mut net, e) = chain();
        net.set_event_number(e[0], 7).unwrap();
        assert_eq!(net.sorted_events(), &[e[1], e[2], e[0]]);

        let ab = net.operation_by_events(e[0], e[1]).unwrap();
        let bc = net.operation_by_events(e[1], e[2]).unwrap();
        let dangling = net.add_operation(e[1], None, 1.0).unwrap();
        assert_eq!(net.sorted_operations(), &[bc, dangling, ab]);
    }

    #[test]
    fn test_set_event_point_is_silent() {
        let (mut net, e) = chain();
        net.full_paths();
        let log = recorder(&mut net);
        net.set_event_point(e[0], Point::new(10, 20)).unwrap();
        assert_eq!(net.event(e[0]).unwrap().point(), Point::new(10, 20));
        assert!(log.borrow().is_empty());
        assert_eq!(net.cache().full_paths.state(), CacheState::Valid);
    }
}
