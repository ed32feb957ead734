//! A partially ordered measure of progress at each scheduler location.
//!
//! A [`Timestamp`] pairs an epoch (advanced only by external input) with a
//! vector of loop coordinates, one per enclosing loop scope. The partial
//! order and the per-vertex-type rewrites defined here are what the
//! could-result-in BFS in [`crate::graph`] walks.

use crate::error::StructuralError;
use crate::vertex::VertexType;

/// `(epoch, coords)`: `coords` has one entry per enclosing loop scope, in
/// outside-to-inside order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub epoch: u32,
    pub coords: Vec<u32>,
}

impl Timestamp {
    /// The timestamp of the first epoch, outside any loop scope.
    pub fn new() -> Self {
        Timestamp { epoch: 0, coords: Vec::new() }
    }

    pub fn with_epoch(epoch: u32) -> Self {
        Timestamp { epoch, coords: Vec::new() }
    }

    /// Partial order: `self <= other`.
    ///
    /// A strictly later epoch is never `<=` an earlier one. Within equal
    /// epochs, `coords` compare lexicographically over their common prefix;
    /// the first index at which they disagree decides the order, and if one
    /// is a strict prefix of the other, the shorter one is `<=`.
    pub fn le(&self, other: &Timestamp) -> bool {
        if self.epoch > other.epoch {
            return false;
        }
        if self.epoch < other.epoch {
            return true;
        }
        let mlen = self.coords.len().min(other.coords.len());
        for i in 0..mlen {
            if self.coords[i] < other.coords[i] {
                return true;
            }
            if self.coords[i] > other.coords[i] {
                return false;
            }
        }
        self.coords.len() <= other.coords.len()
    }

    /// Applies the outbound-edge rewrite that a vertex of type `typ`
    /// performs on every timestamp it forwards.
    pub fn rewrite(&mut self, typ: VertexType) -> Result<(), StructuralError> {
        match typ {
            VertexType::Ingress => {
                self.coords.push(0);
                Ok(())
            }
            VertexType::Feedback => {
                match self.coords.last_mut() {
                    Some(last) => {
                        *last += 1;
                        Ok(())
                    }
                    None => Err(StructuralError::EmptyCoords(self.clone())),
                }
            }
            VertexType::Egress => {
                if self.coords.pop().is_none() {
                    Err(StructuralError::EmptyCoords(self.clone()))
                } else {
                    Ok(())
                }
            }
            VertexType::Input
            | VertexType::Inspect
            | VertexType::Filter
            | VertexType::Unary
            | VertexType::Binary => Ok(()),
        }
    }

    /// A copy of `self` with `rewrite(typ)` applied, for use at BFS steps
    /// where the original timestamp must be retained.
    pub fn rewritten(&self, typ: VertexType) -> Result<Timestamp, StructuralError> {
        let mut copy = self.clone();
        copy.rewrite(typ)?;
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(epoch: u32, coords: &[u32]) -> Timestamp {
        Timestamp { epoch, coords: coords.to_vec() }
    }

    #[test]
    fn le_is_reflexive() {
        let t = ts(3, &[1, 2]);
        assert!(t.le(&t));
    }

    #[test]
    fn le_on_epoch() {
        assert!(ts(1, &[]).le(&ts(2, &[])));
        assert!(!ts(2, &[]).le(&ts(1, &[])));
    }

    #[test]
    fn le_on_coords_prefix() {
        // equal epoch, one vector a strict prefix of the other: shorter is <=.
        assert!(ts(0, &[1]).le(&ts(0, &[1, 2])));
        assert!(!ts(0, &[1, 2]).le(&ts(0, &[1])));
    }

    #[test]
    fn le_on_coords_disagreement() {
        assert!(ts(0, &[1, 5]).le(&ts(0, &[2, 0])));
        assert!(!ts(0, &[2, 0]).le(&ts(0, &[1, 5])));
    }

    #[test]
    fn le_is_transitive_example() {
        let a = ts(0, &[0]);
        let b = ts(0, &[1]);
        let c = ts(1, &[]);
        assert!(a.le(&b) && b.le(&c) && a.le(&c));
    }

    #[test]
    fn ingress_then_egress_is_identity() {
        let mut t = ts(2, &[5]);
        t.rewrite(VertexType::Ingress).unwrap();
        t.rewrite(VertexType::Egress).unwrap();
        assert_eq!(t, ts(2, &[5]));
    }

    #[test]
    fn feedback_is_strictly_greater() {
        let before = ts(0, &[0]);
        let after = before.rewritten(VertexType::Feedback).unwrap();
        assert!(before.le(&after));
        assert!(!after.le(&before));
    }

    #[test]
    fn feedback_on_empty_coords_is_structural_error() {
        let mut t = ts(0, &[]);
        assert!(t.rewrite(VertexType::Feedback).is_err());
    }

    #[test]
    fn egress_on_empty_coords_is_structural_error() {
        let mut t = ts(0, &[]);
        assert!(t.rewrite(VertexType::Egress).is_err());
    }

    #[test]
    fn passthrough_kinds_are_identity() {
        for typ in [VertexType::Input, VertexType::Inspect, VertexType::Filter, VertexType::Unary, VertexType::Binary] {
            let mut t = ts(1, &[3, 4]);
            let before = t.clone();
            t.rewrite(typ).unwrap();
            assert_eq!(t, before);
        }
    }
}
