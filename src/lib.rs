//! A progress-tracking scheduler for single-process dataflow computations.
//!
//! A computation is a graph of vertices (see [`vertex`]) connected by
//! directed edges, each message carrying a [`timestamp::Timestamp`] drawn
//! from a partial order. The [`tracker::ProgressTracker`] maintains, for
//! every pointstamp any vertex has touched, whether some other still-active
//! pointstamp could still produce an event that precedes it — this is what
//! lets a vertex safely act on "no more data at timestamp T is coming"
//! without a global barrier. [`worker::Worker`] is the single event loop
//! that every vertex's runtime task (see [`runtime`]) talks to in order to
//! make that tracking happen; [`dataflow`] assembles vertices and a worker
//! into a runnable computation.

pub mod config;
pub mod dataflow;
pub mod error;
pub mod graph;
pub mod handle;
pub mod message;
pub mod pointstamp;
pub mod protocol;
pub mod runtime;
pub mod timestamp;
pub mod tracker;
pub mod vertex;
pub mod worker;

pub use config::Config;
pub use dataflow::{Scope, Stream};
pub use error::{FlowError, ProtocolError, StructuralError, UserError};
pub use message::Message;
pub use timestamp::Timestamp;
pub use vertex::{Direction, Edge, VertexId, VertexType};
pub use worker::{CancelToken, Worker};
