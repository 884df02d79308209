//! Metric tables for the path, event and operation views.
//!
//! Rows are plain values; laying them out is up to the caller.

use chrono::NaiveDate;
use pyo3::prelude::*;

use crate::error::NetError;
use crate::network::NetModel;
use crate::timing::Timing;

/// One full path: `L`, `t(L)`, `R(L)`.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct PathRow {
    #[pyo3(get)]
    pub code: String,
    #[pyo3(get)]
    pub weight: f64,
    #[pyo3(get)]
    pub reserve: f64,
}

#[pymethods]
impl PathRow {
    fn __repr__(&self) -> String {
        format!(
            "PathRow(code={:?}, weight={}, reserve={})",
            self.code, self.weight, self.reserve
        )
    }
}

/// One event: `i`, early time, late time, `R(i)`.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct EventRow {
    #[pyo3(get)]
    pub number: i32,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub early: f64,
    #[pyo3(get)]
    pub late: f64,
    #[pyo3(get)]
    pub reserve: f64,
    #[pyo3(get)]
    pub early_date: Option<NaiveDate>,
    #[pyo3(get)]
    pub late_date: Option<NaiveDate>,
}

#[pymethods]
impl EventRow {
    fn __repr__(&self) -> String {
        format!(
            "EventRow(number={}, early={}, late={}, reserve={})",
            self.number, self.early, self.late, self.reserve
        )
    }
}

/// One operation: `i-j`, duration, start/finish times, reserves and
/// intensity factor.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct OperationRow {
    #[pyo3(get)]
    pub code: String,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub wait_time: f64,
    #[pyo3(get)]
    pub early_start: f64,
    #[pyo3(get)]
    pub late_start: f64,
    #[pyo3(get)]
    pub early_finish: f64,
    #[pyo3(get)]
    pub late_finish: f64,
    #[pyo3(get)]
    pub full_reserve: f64,
    #[pyo3(get)]
    pub free_reserve: f64,
    #[pyo3(get)]
    pub intensity: f64,
    #[pyo3(get)]
    pub critical: bool,
}

#[pymethods]
impl OperationRow {
    fn __repr__(&self) -> String {
        format!(
            "OperationRow(code={:?}, wait_time={}, full_reserve={}, free_reserve={}, intensity={})",
            self.code, self.wait_time, self.full_reserve, self.free_reserve, self.intensity
        )
    }
}

/// All three tables for one network state.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct NetReport {
    #[pyo3(get)]
    pub critical_path_weight: f64,
    #[pyo3(get)]
    pub paths: Vec<PathRow>,
    #[pyo3(get)]
    pub events: Vec<EventRow>,
    #[pyo3(get)]
    pub operations: Vec<OperationRow>,
}

#[pymethods]
impl NetReport {
    fn __repr__(&self) -> String {
        format!(
            "NetReport(critical_path_weight={}, paths={}, events={}, operations={})",
            self.critical_path_weight,
            self.paths.len(),
            self.events.len(),
            self.operations.len()
        )
    }
}

/// Fill the tables in display order: paths heaviest first, events by
/// number, operations by code.
pub fn build_report(model: &NetModel, timing: &Timing<'_>) -> Result<NetReport, NetError> {
    let paths = model
        .full_paths()
        .iter()
        .map(|p| PathRow {
            code: p.code().to_string(),
            weight: p.weight(),
            reserve: timing.path_reserve(p),
        })
        .collect();

    let mut events = Vec::with_capacity(model.event_count());
    for &id in model.sorted_events() {
        let event = model.event(id).ok_or(NetError::UnknownEvent(id))?;
        events.push(EventRow {
            number: event.n(),
            name: event.name().to_string(),
            early: timing.early_time(id)?,
            late: timing.late_time(id)?,
            reserve: timing.event_reserve(id)?,
            early_date: timing.early_date(id)?,
            late_date: timing.late_date(id)?,
        });
    }

    let mut operations = Vec::with_capacity(model.operation_count());
    for &id in model.sorted_operations() {
        let op = model.operation(id).ok_or(NetError::UnknownOperation(id))?;
        operations.push(OperationRow {
            code: model.operation_code(id),
            name: op.name().to_string(),
            wait_time: op.wait_time(),
            early_start: timing.early_start(id)?,
            late_start: timing.late_start(id)?,
            early_finish: timing.early_finish(id)?,
            late_finish: timing.late_finish(id)?,
            full_reserve: timing.full_reserve(id)?,
            free_reserve: timing.free_reserve(id)?,
            intensity: timing.intensity_factor(id)?,
            critical: timing.in_critical_path(id)?,
        });
    }

    Ok(NetReport {
        critical_path_weight: timing.critical_path_weight(),
        paths,
        events,
        operations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diamond_report() {
        let mut net = NetModel::new();
        let e: Vec<_> = (0..4).map(|_| net.add_event()).collect();
        net.add_operation(e[0], Some(e[1]), 2.0).unwrap();
        net.add_operation(e[1], Some(e[3]), 2.0).unwrap();
        net.add_operation(e[0], Some(e[2]), 5.0).unwrap();
        net.add_operation(e[2], Some(e[3]), 1.0).unwrap();
        net.set_event_name(e[0], "start").unwrap();

        let report = net.report().unwrap();
        assert_eq!(report.critical_path_weight, 6.0);
        assert_eq!(
            report.paths,
            vec![
                PathRow {
                    code: "  1 -  3 -  4".to_string(),
                    weight: 6.0,
                    reserve: 0.0
                },
                PathRow {
                    code: "  1 -  2 -  4".to_string(),
                    weight: 4.0,
                    reserve: 2.0
                },
            ]
        );

        let numbers: Vec<i32> = report.events.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(report.events[0].name, "start");
        assert_eq!(report.events[1].reserve, 2.0);
        assert!(report.events[0].early_date.is_none());

        let codes: Vec<&str> = report.operations.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["  1 -  2", "  1 -  3", "  2 -  4", "  3 -  4"]);
        let critical: Vec<bool> = report.operations.iter().map(|r| r.critical).collect();
        assert_eq!(critical, vec![false, true, false, true]);
    }

    #[test]
    fn test_report_requires_correct_network() {
        let mut net = NetModel::new();
        net.add_event();
        net.add_event();
        assert!(matches!(net.report(), Err(NetError::InvalidNetwork(_))));
    }
}
