//! Persistence of the full event/operation set.
//!
//! Events are written first, in canonical order; operations follow and
//! refer to their endpoints by position in the event list. Reading the
//! document back yields the same numbers, names, placements, endpoints and
//! durations, along with each event's incoming and outgoing operation order.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::error::NetError;
use crate::models::{Event, EventId, OperationId, Point};
use crate::network::NetModel;
use crate::observer::NetChange;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub n: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub point: Point,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Position of the begin event in [`NetSnapshot::events`].
    pub begin: usize,
    /// Position of the end event, `None` for a dangling operation.
    pub end: Option<usize>,
    pub wait_time: f64,
    #[serde(default)]
    pub name: String,
    /// Position in the begin event's outgoing list. Missing slots keep
    /// document order.
    #[serde(default)]
    pub begin_slot: Option<usize>,
    /// Position in the end event's incoming list.
    #[serde(default)]
    pub end_slot: Option<usize>,
}

/// Serializable image of a network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetSnapshot {
    pub version: u32,
    pub events: Vec<EventRecord>,
    pub operations: Vec<OperationRecord>,
}

impl NetSnapshot {
    /// Reject anything [`NetModel::restore`] could not rebuild exactly.
    pub fn validate(&self) -> Result<(), NetError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(NetError::InvalidSnapshot(format!(
                "unsupported version {}",
                self.version
            )));
        }
        let mut numbers = rustc_hash::FxHashSet::default();
        for record in &self.events {
            if !numbers.insert(record.n) {
                return Err(NetError::DuplicateNumber(record.n));
            }
        }
        let len = self.events.len();
        for (i, record) in self.operations.iter().enumerate() {
            let out_of_range = record.begin >= len || record.end.is_some_and(|end| end >= len);
            if out_of_range {
                return Err(NetError::InvalidSnapshot(format!(
                    "operation {i} refers to a missing event"
                )));
            }
            if !record.wait_time.is_finite() || record.wait_time < 0.0 {
                return Err(NetError::InvalidWaitTime(record.wait_time));
            }
        }
        Ok(())
    }
}

impl NetModel {
    /// Capture the current network.
    pub fn snapshot(&self) -> NetSnapshot {
        let graph = self.graph();
        let position = |id: EventId| graph.event_ids().iter().position(|&e| e == id);

        let events = graph
            .events()
            .map(|(_, e)| EventRecord {
                n: e.n(),
                name: e.name().to_string(),
                point: e.point(),
            })
            .collect();

        let operations = graph
            .operations()
            .filter_map(|(id, op)| {
                let begin = op.begin()?;
                let slot_in = |event: EventId, list: fn(&Event) -> &[OperationId]| {
                    graph
                        .event(event)
                        .and_then(|e| list(e).iter().position(|&o| o == id))
                };
                Some(OperationRecord {
                    begin: position(begin)?,
                    end: op.end().and_then(position),
                    wait_time: op.wait_time(),
                    name: op.name().to_string(),
                    begin_slot: slot_in(begin, Event::outgoing),
                    end_slot: op.end().and_then(|end| slot_in(end, Event::incoming)),
                })
            })
            .collect();

        NetSnapshot {
            version: SNAPSHOT_VERSION,
            events,
            operations,
        }
    }

    /// Replace the network with the contents of `snapshot`.
    ///
    /// The snapshot is checked first; on error the model is untouched. On
    /// success listeners see `BeforeClear` and then a single `Updated`.
    pub fn restore(&mut self, snapshot: &NetSnapshot) -> Result<(), NetError> {
        snapshot.validate()?;

        self.notify(&NetChange::BeforeClear);
        self.graph.clear();

        let ids: Vec<EventId> = snapshot
            .events
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let id = self.graph.insert_event(i, record.n);
                if let Some(event) = self.graph.event_mut(id) {
                    event.name = record.name.clone();
                    event.point = record.point;
                }
                id
            })
            .collect();

        let records = &snapshot.operations;
        let op_ids: Vec<OperationId> = records
            .iter()
            .map(|record| {
                let id = self.graph.alloc_operation(record.wait_time);
                if let Some(op) = self.graph.operation_mut(id) {
                    op.name = record.name.clone();
                }
                id
            })
            .collect();

        // Appending in slot order rebuilds every adjacency list in its
        // recorded order; the sort is stable so unslotted records keep
        // document order.
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by_key(|&i| records[i].begin_slot.unwrap_or(usize::MAX));
        for &i in &order {
            self.graph.connect_begin(ids[records[i].begin], op_ids[i]);
        }
        order.sort_by_key(|&i| (records[i].end_slot.unwrap_or(usize::MAX), i));
        for &i in &order {
            if let Some(end) = records[i].end {
                self.graph.connect_end(op_ids[i], ids[end]);
            }
        }

        crate::log_changes!(
            self.config().verbosity,
            "[net] restored {} event(s), {} operation(s)",
            ids.len(),
            snapshot.operations.len()
        );
        self.cache.invalidate_all();
        self.notify(&NetChange::Updated);
        Ok(())
    }

    /// Write the network as JSON.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), NetError> {
        serde_json::to_writer(writer, &self.snapshot())?;
        Ok(())
    }

    /// Replace the network with one read from JSON.
    pub fn read_from<R: Read>(&mut self, reader: R) -> Result<(), NetError> {
        let snapshot: NetSnapshot = serde_json::from_reader(reader)?;
        self.restore(&snapshot)
    }
}
