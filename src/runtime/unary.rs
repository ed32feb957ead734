//! The `Unary` vertex: a one-in, one-out transform. This is what a dataflow
//! loop's body is built from (see [`crate::dataflow`]).

use std::thread;

use crate::error::UserError;
use crate::pointstamp::Pointstamp;
use crate::protocol::VertexMsg;
use crate::vertex::Edge;

use super::common::OpCore;

pub fn spawn<F>(mut core: OpCore, downstream: Edge, mut transform: F) -> thread::JoinHandle<()>
where
    F: FnMut(crate::message::Message) -> Result<crate::message::Message, UserError> + Send + 'static,
{
    thread::spawn(move || {
        while let Some(event) = core.recv() {
            match event {
                VertexMsg::OnRecv { edge, timestamp, message, .. } => {
                    if let Err(e) = core.ts_check_and_update(&timestamp) {
                        log::warn!("unary {:?}: {}", core.id(), e);
                        continue;
                    }
                    let consumed = Pointstamp::from_edge(edge, timestamp.clone());
                    if let Err(e) = core.core_decre_oc(consumed) {
                        log::warn!("unary {:?}: decre_oc rejected: {}", core.id(), e);
                    }
                    match transform(message) {
                        Ok(out) => {
                            if let Err(e) = core.core_send_by(downstream, timestamp, out) {
                                log::warn!("unary {:?}: send rejected: {}", core.id(), e);
                            }
                        }
                        Err(e) => log::warn!("unary {:?}: transform failed: {}", core.id(), e),
                    }
                }
                VertexMsg::OnNotify { .. } => {}
                VertexMsg::Shutdown => break,
            }
        }
    })
}
