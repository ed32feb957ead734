//! The `Inspect` vertex: observes every message that passes through without
//! changing it.

use std::thread;

use crate::error::UserError;
use crate::pointstamp::Pointstamp;
use crate::protocol::VertexMsg;
use crate::vertex::Edge;

use super::common::OpCore;

/// Spawns the task backing an `Inspect` vertex. `observe` is run for its
/// side effect only; its return value never changes what gets forwarded. A
/// callback error is logged and the message still passes through —
/// inspection is diagnostic, not a filter. `downstream` is `None` when this
/// is the terminal vertex of a dataflow: the message is still observed, just
/// not forwarded anywhere.
pub fn spawn<F>(mut core: OpCore, downstream: Option<Edge>, mut observe: F) -> thread::JoinHandle<()>
where
    F: FnMut(&crate::message::Message, &crate::timestamp::Timestamp) -> Result<(), UserError> + Send + 'static,
{
    thread::spawn(move || {
        while let Some(event) = core.recv() {
            match event {
                VertexMsg::OnRecv { edge, timestamp, message, .. } => {
                    if let Err(e) = core.ts_check_and_update(&timestamp) {
                        log::warn!("inspect {:?}: {}", core.id(), e);
                        continue;
                    }
                    let consumed = Pointstamp::from_edge(edge, timestamp.clone());
                    if let Err(e) = core.core_decre_oc(consumed) {
                        log::warn!("inspect {:?}: decre_oc rejected: {}", core.id(), e);
                    }
                    if let Err(e) = observe(&message, &timestamp) {
                        log::warn!("inspect {:?}: observer failed: {}", core.id(), e);
                    }
                    if let Some(downstream) = downstream {
                        if let Err(e) = core.core_send_by(downstream, timestamp, message) {
                            log::warn!("inspect {:?}: send rejected: {}", core.id(), e);
                        }
                    }
                }
                VertexMsg::OnNotify { .. } => {}
                VertexMsg::Shutdown => break,
            }
        }
    })
}
