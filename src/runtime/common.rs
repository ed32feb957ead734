//! Shared request-handling plumbing every vertex runtime task is built on.
//!
//! Mirrors the request/ack core embedded in every operator of the original
//! (`coreSendBy`/`coreIncreOC`/`coreDecreOC`/`tsCheckAndUpdate`): a watermark
//! check, then the incre/decre-oc request/ack round trips, kept in one place
//! so `input.rs`, `inspect.rs`, `filter.rs`, `binary.rs`, `ingress.rs`,
//! `feedback.rs`, and `egress.rs` only add their own forwarding logic.

use crossbeam_channel::{select, Receiver};

use crate::error::ProtocolError;
use crate::handle::WorkerHandle;
use crate::message::Message;
use crate::pointstamp::Pointstamp;
use crate::protocol::{Ack, Request, VertexMsg};
use crate::timestamp::Timestamp;
use crate::vertex::{Edge, VertexId, VertexType};

/// Per-vertex request/ack plumbing plus the watermark that guards against
/// timestamp regressions on this vertex's input.
pub struct OpCore {
    id: VertexId,
    typ: VertexType,
    handle: WorkerHandle,
    shutdown: Receiver<()>,
    watermark: Timestamp,
}

impl OpCore {
    pub fn new(id: VertexId, typ: VertexType, handle: WorkerHandle, shutdown: Receiver<()>) -> Self {
        OpCore { id, typ, handle, shutdown, watermark: Timestamp::new() }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn typ(&self) -> VertexType {
        self.typ
    }

    /// A clone of the shutdown signal, for operators that need to fold it
    /// into a `select!` of their own (alongside an external feed, say).
    pub fn shutdown_recv(&self) -> Receiver<()> {
        self.shutdown.clone()
    }

    /// Rejects `ts` if it strictly precedes this vertex's current watermark,
    /// otherwise advances the watermark to `ts`.
    pub fn ts_check_and_update(&mut self, ts: &Timestamp) -> Result<(), ProtocolError> {
        if ts.le(&self.watermark) && *ts != self.watermark {
            return Err(ProtocolError::TimestampRegression {
                ts: ts.clone(),
                watermark: self.watermark.clone(),
            });
        }
        self.watermark = ts.clone();
        Ok(())
    }

    fn request(&self, req: Request) -> Ack {
        if self.handle.requests.send((self.id, req)).is_err() {
            return Ack::Rejected(ProtocolError::UnknownPointstamp);
        }
        select! {
            recv(self.handle.acks) -> ack => ack.unwrap_or(Ack::Rejected(ProtocolError::UnknownPointstamp)),
            recv(self.shutdown) -> _ => Ack::Rejected(ProtocolError::UnknownPointstamp),
        }
    }

    /// Registers intent to send on `edge` at `timestamp`, then transmits.
    /// Returns once the worker has acked the occurrence increment; the send
    /// itself is fire-and-forget from the vertex's perspective.
    pub fn core_send_by(&self, edge: Edge, timestamp: Timestamp, message: Message) -> Result<(), ProtocolError> {
        let pointstamp = Pointstamp::from_edge(edge, timestamp.clone());
        match self.request(Request::IncreOc { pointstamp }) {
            Ack::Applied => {}
            Ack::Rejected(e) => return Err(e),
        }
        let _ = self.handle.requests.send((self.id, Request::SendBy { edge, timestamp, message }));
        Ok(())
    }

    /// Holds the frontier open at `timestamp` until the worker delivers the
    /// matching `OnNotify`.
    pub fn core_notify_at(&self, timestamp: Timestamp) -> Result<(), ProtocolError> {
        let pointstamp = Pointstamp::Vertex { vertex: self.id, timestamp: timestamp.clone() };
        match self.request(Request::IncreOc { pointstamp }) {
            Ack::Applied => {}
            Ack::Rejected(e) => return Err(e),
        }
        let _ = self.handle.requests.send((self.id, Request::NotifyAt { vertex: self.id, timestamp }));
        Ok(())
    }

    /// Registers one occurrence of `pointstamp` directly, with no paired
    /// `SendBy`/`NotifyAt` to follow. Used by `close_epoch`'s successor-epoch
    /// install (spec.md §6, `original_source/graph/graph.go`'s `PreProcess`
    /// lifecycle), where the occurrence being created isn't a send at all —
    /// it's the open-ended "more input may still arrive at this epoch" claim
    /// that `Graph::pre_process` makes once at startup for epoch zero.
    pub fn core_incre_oc(&self, pointstamp: Pointstamp) -> Result<(), ProtocolError> {
        match self.request(Request::IncreOc { pointstamp }) {
            Ack::Applied => Ok(()),
            Ack::Rejected(e) => Err(e),
        }
    }

    /// Retires the occurrence at `pointstamp`, once a received message or a
    /// delivered notification has been fully processed.
    pub fn core_decre_oc(&self, pointstamp: Pointstamp) -> Result<(), ProtocolError> {
        match self.request(Request::DecreOc { pointstamp }) {
            Ack::Applied => Ok(()),
            Ack::Rejected(e) => Err(e),
        }
    }

    /// Blocks for the next worker-delivered event, or `None` on cooperative
    /// shutdown.
    pub fn recv(&self) -> Option<VertexMsg> {
        select! {
            recv(self.handle.inbox) -> msg => msg.ok(),
            recv(self.shutdown) -> _ => None,
        }
    }
}
