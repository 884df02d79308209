//! Event and operation time metrics (forward/backward propagation).
//!
//! Times are derived from the cached full paths: the early time of an event
//! is the heaviest prefix from the begin event to it, and its late time is
//! the critical weight minus the heaviest suffix from it to the end event.
//! Nothing here is cached; a [`Timing`] borrows the model and recomputes on
//! every call.

use chrono::{Duration, NaiveDate};
use rustc_hash::FxHashSet;

use crate::error::NetError;
use crate::graph::NetGraph;
use crate::models::{EventId, OperationId};
use crate::network::NetModel;
use crate::path::Path;
use crate::paths::{approx_eq, max_weight};
use crate::validation;

/// Timing engine bound to a network that passed validation.
pub struct Timing<'a> {
    graph: &'a NetGraph,
    full_paths: &'a [Path],
    critical_ops: FxHashSet<OperationId>,
    begin: EventId,
    end: EventId,
    critical_weight: f64,
    tolerance: f64,
    project_start: Option<NaiveDate>,
}

impl<'a> Timing<'a> {
    pub(crate) fn new(model: &'a NetModel) -> Result<Self, NetError> {
        let defects = model.defects();
        if !defects.is_empty() {
            return Err(NetError::InvalidNetwork(validation::describe(&defects)));
        }
        let (Some(begin), Some(end)) = model.begin_end_events() else {
            return Err(NetError::InvalidNetwork(
                "network has no unique begin/end event".to_string(),
            ));
        };

        let graph = model.graph();
        let critical_paths = model.critical_paths();
        let critical_ops = critical_paths
            .iter()
            .flat_map(|p| p.operations(graph))
            .collect();

        Ok(Self {
            graph,
            full_paths: model.full_paths(),
            critical_ops,
            begin,
            end,
            critical_weight: max_weight(critical_paths),
            tolerance: model.config().tolerance,
            project_start: model.config().project_start,
        })
    }

    /// Weight of the critical path(s).
    pub fn critical_path_weight(&self) -> f64 {
        self.critical_weight
    }

    pub fn begin_event(&self) -> EventId {
        self.begin
    }

    pub fn end_event(&self) -> EventId {
        self.end
    }

    /// Round values within tolerance of zero to exactly zero.
    fn snap(&self, value: f64) -> f64 {
        if approx_eq(value, 0.0, self.tolerance * self.critical_weight.max(1.0)) {
            0.0
        } else {
            value
        }
    }

    fn require_event(&self, event: EventId) -> Result<(), NetError> {
        self.graph
            .event(event)
            .map(|_| ())
            .ok_or(NetError::UnknownEvent(event))
    }

    /// (begin, end, duration) of a connected operation.
    fn endpoints(&self, op: OperationId) -> Result<(EventId, EventId, f64), NetError> {
        let operation = self
            .graph
            .operation(op)
            .ok_or(NetError::UnknownOperation(op))?;
        match (operation.begin(), operation.end()) {
            (Some(begin), Some(end)) => Ok((begin, end, operation.wait_time())),
            _ => Err(NetError::DanglingOperation(op)),
        }
    }

    /// Heaviest segment between two events over all full paths.
    fn longest_segment(&self, from: EventId, to: EventId) -> f64 {
        self.full_paths
            .iter()
            .filter_map(|p| p.segment_weight(self.graph, from, to))
            .fold(0.0, f64::max)
    }

    // Events

    /// Earliest occurrence time of an event.
    pub fn early_time(&self, event: EventId) -> Result<f64, NetError> {
        self.require_event(event)?;
        Ok(self.longest_segment(self.begin, event))
    }

    /// Latest occurrence time that does not delay the end event.
    pub fn late_time(&self, event: EventId) -> Result<f64, NetError> {
        self.require_event(event)?;
        Ok(self.critical_weight - self.longest_segment(event, self.end))
    }

    /// Event reserve: late time minus early time.
    pub fn event_reserve(&self, event: EventId) -> Result<f64, NetError> {
        let reserve = self.late_time(event)? - self.early_time(event)?;
        Ok(self.snap(reserve))
    }

    /// Reserve of a full path: how much it can grow before becoming critical.
    pub fn path_reserve(&self, path: &Path) -> f64 {
        self.snap(self.critical_weight - path.weight())
    }

    pub fn early_date(&self, event: EventId) -> Result<Option<NaiveDate>, NetError> {
        Ok(self.to_date(self.early_time(event)?))
    }

    pub fn late_date(&self, event: EventId) -> Result<Option<NaiveDate>, NetError> {
        Ok(self.to_date(self.late_time(event)?))
    }

    fn to_date(&self, days: f64) -> Option<NaiveDate> {
        self.project_start
            .and_then(|start| offset_date(start, days))
    }

    // Operations

    pub fn early_start(&self, op: OperationId) -> Result<f64, NetError> {
        let (begin, _, _) = self.endpoints(op)?;
        self.early_time(begin)
    }

    pub fn late_start(&self, op: OperationId) -> Result<f64, NetError> {
        let (_, end, duration) = self.endpoints(op)?;
        Ok(self.late_time(end)? - duration)
    }

    pub fn early_finish(&self, op: OperationId) -> Result<f64, NetError> {
        let (begin, _, duration) = self.endpoints(op)?;
        Ok(self.early_time(begin)? + duration)
    }

    pub fn late_finish(&self, op: OperationId) -> Result<f64, NetError> {
        let (_, end, _) = self.endpoints(op)?;
        self.late_time(end)
    }

    /// Full reserve: late(j) - early(i) - d.
    pub fn full_reserve(&self, op: OperationId) -> Result<f64, NetError> {
        let (begin, end, duration) = self.endpoints(op)?;
        let reserve = self.late_time(end)? - self.early_time(begin)? - duration;
        Ok(self.snap(reserve))
    }

    /// Free reserve: early(j) - early(i) - d.
    pub fn free_reserve(&self, op: OperationId) -> Result<f64, NetError> {
        let (begin, end, duration) = self.endpoints(op)?;
        let reserve = self.early_time(end)? - self.early_time(begin)? - duration;
        Ok(self.snap(reserve))
    }

    /// True if the operation lies on a critical path (zero full reserve).
    pub fn in_critical_path(&self, op: OperationId) -> Result<bool, NetError> {
        self.endpoints(op)?;
        Ok(self.critical_ops.contains(&op))
    }

    /// Intensity factor `(t(Lmax) - t'cr) / (tcr - t'cr)`.
    ///
    /// `t(Lmax)` is the heaviest full path through the operation and `t'cr`
    /// the largest total duration of critical operations lying on such a
    /// path. Critical operations score 1.
    pub fn intensity_factor(&self, op: OperationId) -> Result<f64, NetError> {
        let full = self.full_reserve(op)?;
        if full == 0.0 {
            return Ok(1.0);
        }
        let longest = self.critical_weight - full;
        let overlap = self
            .full_paths
            .iter()
            .filter(|p| {
                p.contains_operation(self.graph, op)
                    && approx_eq(p.weight(), longest, self.tolerance)
            })
            .map(|p| self.critical_weight_on(p))
            .fold(0.0, f64::max);

        let denominator = self.critical_weight - overlap;
        if approx_eq(denominator, 0.0, self.tolerance * self.critical_weight.max(1.0)) {
            return Ok(1.0);
        }
        Ok(((longest - overlap) / denominator).clamp(0.0, 1.0))
    }

    /// Total duration of the critical operations traversed by `path`.
    fn critical_weight_on(&self, path: &Path) -> f64 {
        path.operations(self.graph)
            .into_iter()
            .filter(|op| self.critical_ops.contains(op))
            .filter_map(|op| self.graph.operation(op))
            .map(|o| o.wait_time())
            .sum()
    }
}

/// Calendar date `days` after `start`, rounding partial days up.
pub fn offset_date(start: NaiveDate, days: f64) -> Option<NaiveDate> {
    if !days.is_finite() {
        return None;
    }
    start.checked_add_signed(Duration::days(days.ceil() as i64))
}
