//! Messages exchanged between a vertex's runtime task and the worker's
//! scheduling loop.
//!
//! `Request`/`Ack` flow vertex-to-worker; `VertexMsg` flows worker-to-vertex.
//! Every `Request` is acknowledged before the requesting vertex may act on
//! it: a `SendBy` is only transmitted once its `IncreOc` is acked, and an
//! `OnRecv` is only delivered once its `DecreOc` is acked (spec.md §4.5).

use crate::error::ProtocolError;
use crate::message::Message;
use crate::pointstamp::Pointstamp;
use crate::timestamp::Timestamp;
use crate::vertex::{Direction, Edge, VertexId};

/// A vertex's outbound request to the worker's scheduler.
#[derive(Clone, Debug)]
pub enum Request {
    /// Register one more occurrence of `pointstamp`. Acked to
    /// `pointstamp.src_vertex()`: for an edge pointstamp that is the vertex
    /// about to send, which is always the requester itself.
    IncreOc { pointstamp: Pointstamp },

    /// Retire one occurrence of `pointstamp`. Acked to
    /// `pointstamp.target_vertex()`: the vertex that is about to consume the
    /// corresponding `OnRecv`, which is not necessarily the requester.
    DecreOc { pointstamp: Pointstamp },

    /// Transmit `message` along `edge`, timestamped `timestamp`. Only sent
    /// after the matching `IncreOc` for `Pointstamp::from_edge(edge, timestamp)`
    /// has been acked.
    SendBy { edge: Edge, timestamp: Timestamp, message: Message },

    /// Ask to be woken with `OnNotify` once `timestamp` enters the frontier
    /// at `vertex`.
    NotifyAt { vertex: VertexId, timestamp: Timestamp },
}

/// The worker's reply to a [`Request`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ack {
    Applied,
    Rejected(ProtocolError),
}

/// A worker-delivered event for a vertex's runtime task to act on.
#[derive(Clone, Debug)]
pub enum VertexMsg {
    /// A message arrived on `edge`. `dir` is resolved from the graph's
    /// direction map so a `Binary` vertex's single inbox can tell its two
    /// inbound streams apart without consulting the graph itself.
    OnRecv { edge: Edge, timestamp: Timestamp, message: Message, dir: Direction },

    /// `timestamp` has entered the frontier at this vertex: no other active
    /// pointstamp could still produce an event at or before it.
    OnNotify { timestamp: Timestamp },

    /// Cooperative shutdown: stop accepting new work and exit the task.
    Shutdown,
}
