//! Error taxonomy for the scheduler.
//!
//! `StructuralError` is fatal: it indicates the graph or timestamp lattice
//! was used in a way that cannot produce a meaningful computation, and
//! surfaces through [`crate::worker::Worker::run`]'s `Result`.
//!
//! `ProtocolError` and `UserError` are handled locally (logged and dropped)
//! by whichever component observes them; they are exposed here so that call
//! sites which *do* want to propagate one (tests, mostly) have a real type
//! to match on rather than a bare string.

use thiserror::Error;

use crate::vertex::VertexId;

/// Fatal errors: the run is aborted and the error reported to the operator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// A `Feedback` or `Egress` rewrite was applied to a timestamp with no
    /// loop coordinates to increment or pop.
    #[error("rewrite on empty coordinate vector for timestamp {0:?}")]
    EmptyCoords(crate::timestamp::Timestamp),

    /// An edge referenced a vertex id that was never registered.
    #[error("vertex {0:?} not registered")]
    UnknownVertex(VertexId),

    /// `Graph::get_dir` was asked about an edge that was never inserted.
    #[error("no recorded direction for edge {src:?} -> {target:?}")]
    UnknownDirection { src: VertexId, target: VertexId },

    /// A vertex handle was requested for an id that has no registered
    /// handle; the worker cannot route a message to it.
    #[error("no handle registered for vertex {0:?}")]
    MissingHandle(VertexId),
}

/// Non-fatal errors: logged at the site they occur, and the offending
/// request or accounting step is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A request arrived at a vertex with a timestamp older than the
    /// vertex's current watermark.
    #[error("timestamp {ts:?} precedes vertex watermark {watermark:?}")]
    TimestampRegression {
        ts: crate::timestamp::Timestamp,
        watermark: crate::timestamp::Timestamp,
    },

    /// `decre_oc` was called on a pointstamp that is not in the active set.
    #[error("decre_oc on unknown pointstamp")]
    UnknownPointstamp,
}

/// Wraps whatever a user-supplied callback (`Inspect`/`Filter`/`Binary`)
/// returns as an error. The message is logged and the record dropped; the
/// pipeline continues.
#[derive(Error, Debug, Clone)]
#[error("user callback failed: {0}")]
pub struct UserError(pub String);

/// Top-level error returned from [`crate::worker::Worker::run`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
}
