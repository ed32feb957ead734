//! The `Feedback` vertex: routes a loop body's output back to the body's
//! own input for another iteration, incrementing the innermost timestamp
//! coordinate each time around.

use std::thread;

use crate::pointstamp::Pointstamp;
use crate::protocol::VertexMsg;
use crate::vertex::Edge;

use super::common::OpCore;

pub fn spawn(mut core: OpCore, body_in: Edge) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Some(event) = core.recv() {
            match event {
                VertexMsg::OnRecv { edge, timestamp, message, .. } => {
                    if let Err(e) = core.ts_check_and_update(&timestamp) {
                        log::warn!("feedback {:?}: {}", core.id(), e);
                        continue;
                    }
                    let consumed = Pointstamp::from_edge(edge, timestamp.clone());
                    if let Err(e) = core.core_decre_oc(consumed) {
                        log::warn!("feedback {:?}: decre_oc rejected: {}", core.id(), e);
                    }
                    match timestamp.rewritten(core.typ()) {
                        Ok(next_ts) => {
                            if let Err(e) = core.core_send_by(body_in, next_ts, message) {
                                log::warn!("feedback {:?}: send rejected: {}", core.id(), e);
                            }
                        }
                        Err(e) => log::error!("feedback {:?}: {}", core.id(), e),
                    }
                }
                VertexMsg::OnNotify { .. } => {}
                VertexMsg::Shutdown => break,
            }
        }
    })
}
