//! The active pointstamp set and its occurrence/precursor accounting.

use std::collections::HashMap;

use thiserror::Error;

use crate::error::{ProtocolError, StructuralError};
use crate::graph::Graph;
use crate::pointstamp::{Pointstamp, PointstampCounter};

/// Either failure mode `decre_oc` can hit: a `could_result_in` query against
/// an unregistered vertex (fatal), or a decrement against a pointstamp that
/// was never (or no longer) active (logged and dropped by the caller).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Owns the graph and the set of currently active pointstamps, keeping each
/// one's occurrence count (oc) and precursor count (pc) up to date as
/// pointstamps come and go.
///
/// `pc` for a pointstamp `p` is the number of *other* active pointstamps `z`
/// with `z could-result-in p`; this is recomputed incrementally rather than
/// from scratch on every call, so `incre_oc`/`decre_oc` only touch the
/// pointstamps actually affected by the change.
pub struct ProgressTracker {
    graph: Graph,
    active: HashMap<Pointstamp, PointstampCounter>,
}

impl ProgressTracker {
    /// Builds a tracker over `graph`, seeding the initial active set from
    /// `Graph::pre_process` directly (the seeds have no precursors by
    /// construction, so there is nothing for `incre_oc`'s general path to
    /// compute).
    pub fn new(graph: Graph) -> Self {
        let mut active = HashMap::new();
        for (ps, counter) in graph.pre_process() {
            active.insert(ps, counter);
        }
        ProgressTracker { graph, active }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn is_active(&self, ps: &Pointstamp) -> bool {
        self.active.get(ps).map(PointstampCounter::is_active).unwrap_or(false)
    }

    pub fn counter(&self, ps: &Pointstamp) -> Option<PointstampCounter> {
        self.active.get(ps).copied()
    }

    /// The pointstamps with `pc == 0`: no other active pointstamp could
    /// still produce one of these, so they are eligible for notification.
    pub fn frontier(&self) -> impl Iterator<Item = &Pointstamp> {
        self.active.iter().filter(|(_, c)| c.in_frontier()).map(|(p, _)| p)
    }

    /// Marks one more occurrence of `ps`. A repeat call on an already-active
    /// pointstamp only bumps its oc; pc accounting runs once, the first time
    /// a pointstamp becomes active.
    pub fn incre_oc(&mut self, ps: Pointstamp) -> Result<(), StructuralError> {
        if let Some(counter) = self.active.get_mut(&ps) {
            counter.oc += 1;
            return Ok(());
        }

        let existing: Vec<Pointstamp> = self.active.keys().cloned().collect();

        let mut pc = 0u64;
        for z in &existing {
            if self.graph.could_result_in(z, &ps)? {
                pc += 1;
            }
        }
        self.active.insert(ps.clone(), PointstampCounter { oc: 1, pc });

        for q in &existing {
            if self.graph.could_result_in(&ps, q)? {
                if let Some(counter) = self.active.get_mut(q) {
                    counter.pc += 1;
                }
            }
        }
        Ok(())
    }

    /// Marks one fewer occurrence of `ps`. Once its oc reaches zero it is
    /// removed from the active set and every remaining pointstamp it was a
    /// precursor of has its pc decremented.
    ///
    /// Errors with [`ProtocolError::UnknownPointstamp`] if `ps` is not
    /// currently active; the caller logs this and drops the request rather
    /// than treating it as fatal.
    pub fn decre_oc(&mut self, ps: &Pointstamp) -> Result<(), TrackerError> {
        let counter = self.active.get_mut(ps).ok_or(ProtocolError::UnknownPointstamp)?;
        counter.oc -= 1;
        if counter.oc > 0 {
            return Ok(());
        }
        self.active.remove(ps);

        let remaining: Vec<Pointstamp> = self.active.keys().cloned().collect();
        for q in &remaining {
            if self.graph.could_result_in(ps, q)? {
                if let Some(counter) = self.active.get_mut(q) {
                    counter.pc = counter.pc.saturating_sub(1);
                }
            }
        }
        Ok(())
    }
}
