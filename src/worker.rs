//! The single-process scheduler: owns the progress tracker and every
//! vertex's handle, and multiplexes all vertex requests onto one event loop.

use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, select, Receiver, Sender};

use crate::config::Config;
use crate::error::{FlowError, StructuralError};
use crate::graph::Graph;
use crate::handle::{new_channels, HandleRegistry, WorkerHandle};
use crate::pointstamp::Pointstamp;
use crate::protocol::{Ack, Request, VertexMsg};
use crate::timestamp::Timestamp;
use crate::tracker::{ProgressTracker, TrackerError};
use crate::vertex::VertexId;

/// The scheduler. Built once per dataflow, handed to every vertex's runtime
/// task via the handles returned from [`Worker::register_vertex`], then
/// driven to completion with [`Worker::run`].
pub struct Worker {
    tracker: ProgressTracker,
    handles: HandleRegistry,
    requests_tx: Sender<(VertexId, Request)>,
    requests_rx: Receiver<(VertexId, Request)>,
    shutdown_rx: Receiver<()>,
    pending_notifications: Vec<(VertexId, Timestamp)>,
    config: Config,
}

/// A `Send + Clone` handle that stops a running [`Worker`] from any other
/// thread.
///
/// Every vertex task holds a clone of the same `Receiver<()>`; a message
/// sent on the matching `Sender` would only ever reach one of them
/// (`crossbeam_channel` is mpmc, not broadcast), so shutdown is instead
/// signalled by dropping the sole `Sender` — every outstanding `recv()` on
/// any clone then fails immediately, all at once. The `Sender` lives behind
/// a mutex here only so `cancel` can take and drop it through a shared `&self`.
#[derive(Clone)]
pub struct CancelToken(Arc<Mutex<Option<Sender<()>>>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.lock().unwrap().take();
    }
}

impl Worker {
    /// Builds a worker over `graph` and the [`CancelToken`] that stops it.
    pub fn new(graph: Graph, config: Config) -> (Self, CancelToken) {
        let (requests_tx, requests_rx) = bounded(config.channel_capacity);
        let (shutdown_tx, shutdown_rx) = bounded(0);
        let worker = Worker {
            tracker: ProgressTracker::new(graph),
            handles: HandleRegistry::new(),
            requests_tx,
            requests_rx,
            shutdown_rx,
            pending_notifications: Vec::new(),
            config,
        };
        (worker, CancelToken(Arc::new(Mutex::new(Some(shutdown_tx)))))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the channel pair for `id` and registers the worker-side half,
    /// returning the vertex-side half for a runtime task to take ownership
    /// of. Call [`Worker::shutdown_recv`] separately for the cooperative
    /// cancellation signal the task should select on alongside its inbox.
    pub fn register_vertex(&mut self, id: VertexId) -> WorkerHandle {
        let (vertex_handle, worker_handle) = new_channels(self.config.channel_capacity, self.requests_tx.clone());
        self.handles.register(id, vertex_handle);
        worker_handle
    }

    pub fn shutdown_recv(&self) -> Receiver<()> {
        self.shutdown_rx.clone()
    }

    fn ack(&self, vertex: VertexId, ack: Ack) {
        match self.handles.get(vertex) {
            Ok(handle) => {
                if handle.ack.send(ack).is_err() {
                    log::warn!("worker: ack channel for {:?} is gone", vertex);
                }
            }
            Err(e) => log::error!("worker: cannot ack {:?}: {}", vertex, e),
        }
    }

    fn handle_incre_oc(&mut self, pointstamp: Pointstamp) -> Result<(), FlowError> {
        let target = pointstamp.src_vertex();
        self.tracker.incre_oc(pointstamp)?;
        self.ack(target, Ack::Applied);
        self.dispatch_notifications();
        Ok(())
    }

    fn handle_decre_oc(&mut self, pointstamp: Pointstamp) -> Result<(), FlowError> {
        let waiting = pointstamp.target_vertex();
        match self.tracker.decre_oc(&pointstamp) {
            Ok(()) => {
                self.ack(waiting, Ack::Applied);
                self.dispatch_notifications();
                Ok(())
            }
            Err(TrackerError::Protocol(e)) => {
                log::debug!("worker: decre_oc rejected for {:?}: {}", pointstamp, e);
                self.ack(waiting, Ack::Rejected(e));
                Ok(())
            }
            Err(TrackerError::Structural(e)) => Err(FlowError::Structural(e)),
        }
    }

    fn handle_send_by(&self, edge: crate::vertex::Edge, timestamp: Timestamp, message: crate::message::Message) -> Result<(), FlowError> {
        let dir = self.tracker.graph().get_dir(edge.src, edge.target)?;
        let handle = self.handles.get(edge.target).map_err(FlowError::Structural)?;
        let event = VertexMsg::OnRecv { edge, timestamp, message, dir };
        if handle.inbox.send(event).is_err() {
            return Err(FlowError::Structural(StructuralError::MissingHandle(edge.target)));
        }
        Ok(())
    }

    fn handle_notify_at(&mut self, vertex: VertexId, timestamp: Timestamp) {
        self.pending_notifications.push((vertex, timestamp));
        self.dispatch_notifications();
    }

    /// Delivers `OnNotify` for every pending request whose pointstamp has
    /// entered the frontier, then releases the hold `core_notify_at` placed
    /// on it. A notification fires at most once per request.
    fn dispatch_notifications(&mut self) {
        let mut ready = Vec::new();
        self.pending_notifications.retain(|(vertex, ts)| {
            let ps = Pointstamp::Vertex { vertex: *vertex, timestamp: ts.clone() };
            let due = self.tracker.counter(&ps).map(|c| c.in_frontier()).unwrap_or(true);
            if due {
                ready.push((*vertex, ts.clone()));
            }
            !due
        });

        for (vertex, ts) in ready {
            if let Ok(handle) = self.handles.get(vertex) {
                if handle.inbox.send(VertexMsg::OnNotify { timestamp: ts.clone() }).is_err() {
                    log::warn!("worker: inbox for {:?} is gone, dropping notification", vertex);
                }
            }
            let ps = Pointstamp::Vertex { vertex, timestamp: ts };
            if let Err(e) = self.tracker.decre_oc(&ps) {
                log::debug!("worker: releasing notify hold on {:?}: {}", vertex, e);
            }
        }
    }

    fn handle_request(&mut self, req: Request) -> Result<(), FlowError> {
        match req {
            Request::IncreOc { pointstamp } => self.handle_incre_oc(pointstamp),
            Request::DecreOc { pointstamp } => self.handle_decre_oc(pointstamp),
            Request::SendBy { edge, timestamp, message } => self.handle_send_by(edge, timestamp, message),
            Request::NotifyAt { vertex, timestamp } => {
                self.handle_notify_at(vertex, timestamp);
                Ok(())
            }
        }
    }

    /// Drives the scheduling loop until every vertex's requests channel is
    /// closed or [`Worker::cancel`] fires. Returns on the first
    /// `StructuralError`; anything less severe is logged and the offending
    /// request dropped.
    pub fn run(&mut self) -> Result<(), FlowError> {
        loop {
            select! {
                recv(self.requests_rx) -> msg => match msg {
                    Ok((_src, req)) => self.handle_request(req)?,
                    Err(_) => break,
                },
                recv(self.shutdown_rx) -> _ => break,
            }
        }
        Ok(())
    }
}
