//! The `Binary` vertex: two inbound edges, one outbound edge. Both inbound
//! streams share the single inbox and ack channel `OpCore` already gives
//! every vertex; `dir` on each `OnRecv` is how this vertex tells them apart
//! (spec.md's Open Question on binary ack routing — resolved by keying acks
//! on vertex id, not on which side a message arrived from).

use std::thread;

use crate::pointstamp::Pointstamp;
use crate::protocol::VertexMsg;
use crate::vertex::{Direction, Edge};

use super::common::OpCore;

/// Spawns the task backing a `Binary` vertex. `merge` sees which side a
/// message arrived on and decides what, if anything, to forward; returning
/// `None` drops the message (still retiring its occurrence).
pub fn spawn<F>(mut core: OpCore, downstream: Edge, mut merge: F) -> thread::JoinHandle<()>
where
    F: FnMut(Direction, crate::message::Message) -> Option<crate::message::Message> + Send + 'static,
{
    thread::spawn(move || {
        while let Some(event) = core.recv() {
            match event {
                VertexMsg::OnRecv { edge, timestamp, message, dir } => {
                    if let Err(e) = core.ts_check_and_update(&timestamp) {
                        log::warn!("binary {:?}: {}", core.id(), e);
                        continue;
                    }
                    let consumed = Pointstamp::from_edge(edge, timestamp.clone());
                    if let Err(e) = core.core_decre_oc(consumed) {
                        log::warn!("binary {:?}: decre_oc rejected: {}", core.id(), e);
                    }
                    if let Some(out) = merge(dir, message) {
                        if let Err(e) = core.core_send_by(downstream, timestamp, out) {
                            log::warn!("binary {:?}: send rejected: {}", core.id(), e);
                        }
                    }
                }
                VertexMsg::OnNotify { .. } => {}
                VertexMsg::Shutdown => break,
            }
        }
    })
}
