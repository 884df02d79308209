//! Rust implementation of the PERT/CPM project network model.
//!
//! A network is a directed graph of milestone events joined by
//! duration-bearing operations. This crate validates the network,
//! enumerates its paths and computes the critical path metrics, with
//! results cached until the next mutation.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;
use rustc_hash::FxHashMap;

pub mod cache;
mod config;
mod error;
pub mod graph;
pub mod logging;
mod models;
mod network;
pub mod observer;
pub mod path;
pub mod paths;
mod report;
pub mod snapshot;
pub mod timing;
pub mod validation;

pub use cache::{CacheSlot, CacheState, NetCache};
pub use config::{NetConfig, DEFAULT_TOLERANCE};
pub use error::NetError;
pub use graph::NetGraph;
pub use models::{Event, EventId, Operation, OperationId, Point};
pub use network::NetModel;
pub use observer::{ListenerId, NetChange};
pub use path::Path;
pub use report::{EventRow, NetReport, OperationRow, PathRow};
pub use snapshot::{EventRecord, NetSnapshot, OperationRecord};
pub use timing::Timing;
pub use validation::Defect;

impl From<NetError> for PyErr {
    fn from(err: NetError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

/// Python handle on a network model.
///
/// Events and operations are referred to by their integer ids. Callbacks
/// registered with `subscribe` run synchronously after each change and must
/// not call back into the model; doing so raises a borrow error inside the
/// callback.
#[pyclass(name = "NetModel", unsendable)]
pub struct PyNetModel {
    inner: NetModel,
    listeners: FxHashMap<u64, ListenerId>,
    next_listener: u64,
}

fn event_id(raw: u32) -> EventId {
    EventId(raw)
}

fn operation_id(raw: u32) -> OperationId {
    OperationId(raw)
}

fn path_tuples(paths: &[Path]) -> Vec<(String, f64)> {
    paths
        .iter()
        .map(|p| (p.code().to_string(), p.weight()))
        .collect()
}

#[pymethods]
impl PyNetModel {
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<NetConfig>) -> Self {
        Self {
            inner: NetModel::with_config(config.unwrap_or_default()),
            listeners: FxHashMap::default(),
            next_listener: 0,
        }
    }

    // Mutations

    fn add_event(&mut self) -> u32 {
        self.inner.add_event().raw()
    }

    fn insert_event(&mut self, position: usize) -> PyResult<u32> {
        Ok(self.inner.insert_event(position)?.raw())
    }

    fn remove_event(&mut self, event: u32) -> PyResult<()> {
        Ok(self.inner.remove_event(event_id(event))?)
    }

    #[pyo3(signature = (begin, end=None, wait_time=0.0, name=None))]
    fn add_operation(
        &mut self,
        begin: u32,
        end: Option<u32>,
        wait_time: f64,
        name: Option<String>,
    ) -> PyResult<u32> {
        let id = self.inner.add_named_operation(
            event_id(begin),
            end.map(event_id),
            wait_time,
            name.as_deref().unwrap_or(""),
        )?;
        Ok(id.raw())
    }

    #[pyo3(signature = (begin, end, wait_time, position))]
    fn insert_operation(
        &mut self,
        begin: u32,
        end: Option<u32>,
        wait_time: f64,
        position: usize,
    ) -> PyResult<u32> {
        let id = self.inner.insert_operation(
            event_id(begin),
            end.map(event_id),
            wait_time,
            position,
        )?;
        Ok(id.raw())
    }

    fn remove_operation(&mut self, operation: u32) -> PyResult<()> {
        Ok(self.inner.remove_operation(operation_id(operation))?)
    }

    fn set_event_number(&mut self, event: u32, n: i32) -> PyResult<()> {
        Ok(self.inner.set_event_number(event_id(event), n)?)
    }

    fn set_event_name(&mut self, event: u32, name: &str) -> PyResult<()> {
        Ok(self.inner.set_event_name(event_id(event), name)?)
    }

    fn set_event_point(&mut self, event: u32, x: i32, y: i32) -> PyResult<()> {
        Ok(self.inner.set_event_point(event_id(event), Point::new(x, y))?)
    }

    #[pyo3(signature = (operation, end=None))]
    fn set_operation_end_event(&mut self, operation: u32, end: Option<u32>) -> PyResult<()> {
        Ok(self
            .inner
            .set_operation_end_event(operation_id(operation), end.map(event_id))?)
    }

    fn set_operation_name(&mut self, operation: u32, name: &str) -> PyResult<()> {
        Ok(self.inner.set_operation_name(operation_id(operation), name)?)
    }

    fn set_operation_wait_time(&mut self, operation: u32, wait_time: f64) -> PyResult<()> {
        Ok(self
            .inner
            .set_operation_wait_time(operation_id(operation), wait_time)?)
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn update(&mut self) {
        self.inner.update();
    }

    // Queries

    fn events(&self) -> Vec<u32> {
        self.inner.events().iter().map(|id| id.raw()).collect()
    }

    fn operations(&self) -> Vec<u32> {
        self.inner.operations().iter().map(|id| id.raw()).collect()
    }

    fn event_number(&self, event: u32) -> PyResult<i32> {
        let id = event_id(event);
        let event = self.inner.event(id).ok_or(NetError::UnknownEvent(id))?;
        Ok(event.n())
    }

    fn event_name(&self, event: u32) -> PyResult<String> {
        let id = event_id(event);
        let event = self.inner.event(id).ok_or(NetError::UnknownEvent(id))?;
        Ok(event.name().to_string())
    }

    fn event_point(&self, event: u32) -> PyResult<(i32, i32)> {
        let id = event_id(event);
        let point = self.inner.event(id).ok_or(NetError::UnknownEvent(id))?.point();
        Ok((point.x, point.y))
    }

    /// (begin, end, wait_time, name) of an operation.
    fn operation_info(&self, operation: u32) -> PyResult<(Option<u32>, Option<u32>, f64, String)> {
        let id = operation_id(operation);
        let op = self
            .inner
            .operation(id)
            .ok_or(NetError::UnknownOperation(id))?;
        Ok((
            op.begin().map(EventId::raw),
            op.end().map(EventId::raw),
            op.wait_time(),
            op.name().to_string(),
        ))
    }

    fn operation_code(&self, operation: u32) -> String {
        self.inner.operation_code(operation_id(operation))
    }

    fn begin_event(&self) -> Option<u32> {
        self.inner.begin_event().map(EventId::raw)
    }

    fn end_event(&self) -> Option<u32> {
        self.inner.end_event().map(EventId::raw)
    }

    fn event_by_number(&self, n: i32) -> Option<u32> {
        self.inner.event_by_number(n).map(EventId::raw)
    }

    fn operation_by_events(&self, begin: u32, end: u32) -> Option<u32> {
        self.inner
            .operation_by_events(event_id(begin), event_id(end))
            .map(OperationId::raw)
    }

    fn sorted_events(&self) -> Vec<u32> {
        self.inner.sorted_events().iter().map(|id| id.raw()).collect()
    }

    fn sorted_operations(&self) -> Vec<u32> {
        self.inner
            .sorted_operations()
            .iter()
            .map(|id| id.raw())
            .collect()
    }

    /// Full paths as (code, weight), heaviest first.
    fn full_paths(&self) -> Vec<(String, f64)> {
        path_tuples(self.inner.full_paths())
    }

    fn critical_paths(&self) -> Vec<(String, f64)> {
        path_tuples(self.inner.critical_paths())
    }

    fn critical_path_weight(&self) -> f64 {
        self.inner.critical_path_weight()
    }

    fn is_correct(&self) -> bool {
        self.inner.is_correct()
    }

    /// Diagnostic text, or None when the network is correct.
    fn diagnostic(&self) -> Option<String> {
        self.inner.check().err().map(|e| e.to_string())
    }

    /// Metric tables. Raises ValueError on an incorrect network.
    fn report(&self) -> PyResult<NetReport> {
        Ok(self.inner.report()?)
    }

    // Persistence

    fn to_json(&self) -> PyResult<String> {
        let text = serde_json::to_string(&self.inner.snapshot()).map_err(NetError::from)?;
        Ok(text)
    }

    fn load_json(&mut self, data: &str) -> PyResult<()> {
        Ok(self.inner.read_from(data.as_bytes())?)
    }

    // Notifications

    /// Register `callback(kind, description)`; returns a handle for
    /// `unsubscribe`.
    fn subscribe(&mut self, callback: PyObject) -> u64 {
        let id = self.inner.subscribe(move |change: &NetChange| {
            Python::with_gil(|py| {
                if let Err(err) = callback.call1(py, (change.kind(), change.to_string())) {
                    err.print(py);
                }
            });
        });
        let handle = self.next_listener;
        self.next_listener += 1;
        self.listeners.insert(handle, id);
        handle
    }

    fn unsubscribe(&mut self, handle: u64) -> bool {
        match self.listeners.remove(&handle) {
            Some(id) => self.inner.unsubscribe(id),
            None => false,
        }
    }

    fn __len__(&self) -> usize {
        self.inner.event_count()
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "NetModel(events={}, operations={}, correct={})",
            self.inner.event_count(),
            self.inner.operation_count(),
            self.inner.is_correct()
        )
    }
}

/// The pertnet.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Model
    m.add_class::<PyNetModel>()?;

    // Config and report types
    m.add_class::<NetConfig>()?;
    m.add_class::<NetReport>()?;
    m.add_class::<PathRow>()?;
    m.add_class::<EventRow>()?;
    m.add_class::<OperationRow>()?;

    Ok(())
}
