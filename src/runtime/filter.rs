//! The `Filter` vertex: forwards a message only if a predicate accepts it.

use std::thread;

use crate::pointstamp::Pointstamp;
use crate::protocol::VertexMsg;
use crate::vertex::Edge;

use super::common::OpCore;

/// Spawns the task backing a `Filter` vertex. A rejected message is dropped
/// silently — filtering is its ordinary job, not an error — but the
/// occurrence it consumed is still retired either way.
pub fn spawn<F>(mut core: OpCore, downstream: Edge, mut predicate: F) -> thread::JoinHandle<()>
where
    F: FnMut(&crate::message::Message) -> bool + Send + 'static,
{
    thread::spawn(move || {
        while let Some(event) = core.recv() {
            match event {
                VertexMsg::OnRecv { edge, timestamp, message, .. } => {
                    if let Err(e) = core.ts_check_and_update(&timestamp) {
                        log::warn!("filter {:?}: {}", core.id(), e);
                        continue;
                    }
                    let consumed = Pointstamp::from_edge(edge, timestamp.clone());
                    if let Err(e) = core.core_decre_oc(consumed) {
                        log::warn!("filter {:?}: decre_oc rejected: {}", core.id(), e);
                    }
                    if predicate(&message) {
                        if let Err(e) = core.core_send_by(downstream, timestamp, message) {
                            log::warn!("filter {:?}: send rejected: {}", core.id(), e);
                        }
                    }
                }
                VertexMsg::OnNotify { .. } => {}
                VertexMsg::Shutdown => break,
            }
        }
    })
}
