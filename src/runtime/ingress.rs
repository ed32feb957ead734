//! The `Ingress` vertex: enters a loop scope, pushing a fresh coordinate
//! onto every timestamp it forwards.

use std::thread;

use crate::pointstamp::Pointstamp;
use crate::protocol::VertexMsg;
use crate::vertex::Edge;

use super::common::OpCore;

pub fn spawn(mut core: OpCore, downstream: Edge) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Some(event) = core.recv() {
            match event {
                VertexMsg::OnRecv { edge, timestamp, message, .. } => {
                    if let Err(e) = core.ts_check_and_update(&timestamp) {
                        log::warn!("ingress {:?}: {}", core.id(), e);
                        continue;
                    }
                    let consumed = Pointstamp::from_edge(edge, timestamp.clone());
                    if let Err(e) = core.core_decre_oc(consumed) {
                        log::warn!("ingress {:?}: decre_oc rejected: {}", core.id(), e);
                    }
                    match timestamp.rewritten(core.typ()) {
                        Ok(inner_ts) => {
                            if let Err(e) = core.core_send_by(downstream, inner_ts, message) {
                                log::warn!("ingress {:?}: send rejected: {}", core.id(), e);
                            }
                        }
                        Err(e) => log::error!("ingress {:?}: {}", core.id(), e),
                    }
                }
                VertexMsg::OnNotify { .. } => {}
                VertexMsg::Shutdown => break,
            }
        }
    })
}
