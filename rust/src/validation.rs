//! Structural checks for a project network.
//!
//! Each check answers "is this defect absent?" and runs in time linear in
//! the size of the graph. Cycle detection uses Kahn's algorithm rather than
//! path enumeration.

use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use thiserror::Error;

use crate::graph::NetGraph;
use crate::models::EventId;

/// A structural defect found by validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    #[error("network has loops")]
    Loops,
    #[error("network has multiple operations between the same events")]
    MultiEdges,
    #[error("network must have exactly one begin event (found {0})")]
    BeginEventCount(usize),
    #[error("network must have exactly one end event (found {0})")]
    EndEventCount(usize),
    #[error("network has unconnected events")]
    UnconnectedEvents,
    #[error("network has unconnected operations")]
    UnconnectedOperations,
}

/// No operation is a self-loop and the directed graph has no cycle.
pub fn has_no_loops(graph: &NetGraph) -> bool {
    let self_loop = graph
        .operations()
        .any(|(_, op)| op.begin().is_some() && op.begin() == op.end());
    !self_loop && topological_order(graph).is_some()
}

/// No two operations share the same (begin, end) pair.
pub fn has_no_multi_edges(graph: &NetGraph) -> bool {
    let mut seen: FxHashSet<(EventId, EventId)> =
        FxHashSet::with_capacity_and_hasher(graph.operation_count(), Default::default());
    graph
        .operations()
        .filter_map(|(_, op)| Some((op.begin()?, op.end()?)))
        .all(|pair| seen.insert(pair))
}

/// Events without incoming operations.
pub fn begin_events(graph: &NetGraph) -> Vec<EventId> {
    graph
        .events()
        .filter(|(_, e)| e.incoming().is_empty())
        .map(|(id, _)| id)
        .collect()
}

/// Events without outgoing operations.
pub fn end_events(graph: &NetGraph) -> Vec<EventId> {
    graph
        .events()
        .filter(|(_, e)| e.outgoing().is_empty())
        .map(|(id, _)| id)
        .collect()
}

pub fn has_one_begin_event(graph: &NetGraph) -> bool {
    begin_events(graph).len() == 1
}

pub fn has_one_end_event(graph: &NetGraph) -> bool {
    end_events(graph).len() == 1
}

/// Every event touches at least one operation. A lone event is allowed.
pub fn has_no_unconnected_events(graph: &NetGraph) -> bool {
    graph.event_count() == 1 || graph.events().all(|(_, e)| e.degree() > 0)
}

/// Every operation has both endpoints.
pub fn has_no_unconnected_operations(graph: &NetGraph) -> bool {
    graph.operations().all(|(_, op)| op.is_connected())
}

/// Run every check and collect the defects found, in a fixed order.
pub fn find_defects(graph: &NetGraph) -> Vec<Defect> {
    let mut defects = Vec::new();
    if !has_no_unconnected_events(graph) {
        defects.push(Defect::UnconnectedEvents);
    }
    if !has_no_unconnected_operations(graph) {
        defects.push(Defect::UnconnectedOperations);
    }
    if !has_no_loops(graph) {
        defects.push(Defect::Loops);
    }
    if !has_no_multi_edges(graph) {
        defects.push(Defect::MultiEdges);
    }
    let begins = begin_events(graph).len();
    if begins != 1 {
        defects.push(Defect::BeginEventCount(begins));
    }
    let ends = end_events(graph).len();
    if ends != 1 {
        defects.push(Defect::EndEventCount(ends));
    }
    defects
}

/// Join defects into one diagnostic line per defect.
pub fn describe(defects: &[Defect]) -> String {
    defects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Topological order of the events using only fully connected operations,
/// or `None` if the graph has a cycle.
pub fn topological_order(graph: &NetGraph) -> Option<Vec<EventId>> {
    let mut in_degree: rustc_hash::FxHashMap<EventId, usize> = graph
        .events()
        .map(|(id, e)| {
            let connected = e
                .incoming()
                .iter()
                .filter(|&&op| graph.operation(op).is_some_and(|o| o.begin().is_some()))
                .count();
            (id, connected)
        })
        .collect();

    let mut queue: VecDeque<EventId> = graph
        .event_ids()
        .iter()
        .copied()
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut order = Vec::with_capacity(graph.event_count());
    while let Some(id) = queue.pop_front() {
        order.push(id);
        let Some(event) = graph.event(id) else {
            continue;
        };
        for &op in event.outgoing() {
            let Some(end) = graph.operation(op).and_then(|o| o.end()) else {
                continue;
            };
            if let Some(degree) = in_degree.get_mut(&end) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(end);
                }
            }
        }
    }

    (order.len() == graph.event_count()).then_some(order)
}
