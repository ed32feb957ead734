//! Pointstamps and their occurrence/precursor counters.

use crate::timestamp::Timestamp;
use crate::vertex::{Edge, VertexId};

/// A location (vertex or edge) paired with a logical timestamp: a unit of
/// work that might still produce events.
///
/// `Vertex` pointstamps are used for `NotifyAt` and for a vertex's own
/// scheduling; `Edge` pointstamps are used for `SendBy` on a real edge
/// (`src != target`). Identity is structural (location discriminant + ids +
/// timestamp), per spec.md §9 — no interning or string hashing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pointstamp {
    Vertex { vertex: VertexId, timestamp: Timestamp },
    Edge { edge: Edge, timestamp: Timestamp },
}

impl Pointstamp {
    /// Builds the pointstamp a worker request implies: a `Vertex`
    /// pointstamp when the edge is a self-loop (`src == target`, as used by
    /// `NotifyAt`), an `Edge` pointstamp otherwise.
    pub fn from_edge(edge: Edge, timestamp: Timestamp) -> Self {
        if edge.is_self() {
            Pointstamp::Vertex { vertex: edge.src, timestamp }
        } else {
            Pointstamp::Edge { edge, timestamp }
        }
    }

    /// The vertex at which events following this pointstamp would first be
    /// observed: a vertex pointstamp's own vertex, or an edge pointstamp's
    /// target.
    pub fn target_vertex(&self) -> VertexId {
        match self {
            Pointstamp::Vertex { vertex, .. } => *vertex,
            Pointstamp::Edge { edge, .. } => edge.target,
        }
    }

    /// The vertex a pointstamp's *source* side names: a vertex pointstamp's
    /// own vertex, or an edge pointstamp's `src`.
    pub fn src_vertex(&self) -> VertexId {
        match self {
            Pointstamp::Vertex { vertex, .. } => *vertex,
            Pointstamp::Edge { edge, .. } => edge.src,
        }
    }

    pub fn timestamp(&self) -> &Timestamp {
        match self {
            Pointstamp::Vertex { timestamp, .. } => timestamp,
            Pointstamp::Edge { timestamp, .. } => timestamp,
        }
    }
}

/// Occurrence count (outstanding events at a pointstamp) and precursor count
/// (number of other active pointstamps that could-result-in this one).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointstampCounter {
    pub oc: u64,
    pub pc: u64,
}

impl PointstampCounter {
    /// `oc > 0` means the pointstamp is active.
    pub fn is_active(&self) -> bool {
        self.oc > 0
    }

    /// `pc == 0` means the pointstamp is in the frontier: no other active
    /// pointstamp could-result-in it, so a notification for it may be
    /// delivered.
    pub fn in_frontier(&self) -> bool {
        self.pc == 0
    }
}
