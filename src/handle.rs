//! Channel endpoints connecting a vertex's runtime task to the worker.
//!
//! Vertices and the worker never share state directly; every interaction
//! crosses one of these two channel pairs. Handles are looked up by
//! [`VertexId`], never passed around as direct references, so the graph and
//! the channel plumbing can evolve independently (spec.md §9).

use std::collections::HashMap;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::StructuralError;
use crate::protocol::{Ack, Request, VertexMsg};
use crate::vertex::VertexId;

/// The worker's view of one vertex: where to deliver its events and acks.
#[derive(Clone)]
pub struct VertexHandle {
    pub inbox: Sender<VertexMsg>,
    pub ack: Sender<Ack>,
}

/// A vertex task's view of the worker: where to send requests, and where to
/// receive events and acks from.
pub struct WorkerHandle {
    pub requests: Sender<(VertexId, Request)>,
    pub acks: Receiver<Ack>,
    pub inbox: Receiver<VertexMsg>,
}

/// Builds the two channel pairs for a newly registered vertex. `requests_tx`
/// is the worker's single shared request channel; every vertex gets a clone
/// of the same sender.
pub fn new_channels(
    capacity: usize,
    requests_tx: Sender<(VertexId, Request)>,
) -> (VertexHandle, WorkerHandle) {
    let (inbox_tx, inbox_rx) = bounded(capacity);
    let (ack_tx, ack_rx) = bounded(capacity);
    (
        VertexHandle { inbox: inbox_tx, ack: ack_tx },
        WorkerHandle { requests: requests_tx, acks: ack_rx, inbox: inbox_rx },
    )
}

/// The worker's table of registered vertex handles.
#[derive(Default)]
pub struct HandleRegistry {
    handles: HashMap<VertexId, VertexHandle>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        HandleRegistry { handles: HashMap::new() }
    }

    pub fn register(&mut self, id: VertexId, handle: VertexHandle) {
        self.handles.insert(id, handle);
    }

    pub fn get(&self, id: VertexId) -> Result<&VertexHandle, StructuralError> {
        self.handles.get(&id).ok_or(StructuralError::MissingHandle(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_of_unregistered_vertex_is_structural_error() {
        let registry = HandleRegistry::new();
        assert!(registry.get(VertexId(7)).is_err());
    }

    #[test]
    fn registered_handle_round_trips() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let (handle, worker_handle) = new_channels(8, tx);
        let mut registry = HandleRegistry::new();
        registry.register(VertexId(1), handle);
        assert!(registry.get(VertexId(1)).is_ok());
        drop(worker_handle);
    }
}
