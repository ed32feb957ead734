//! The `Egress` vertex: the loop-continue/exit decision point. `should_loop`
//! is evaluated on every message the body produces; while it answers `true`
//! the message goes back around the loop unchanged, and only once it
//! answers `false` does the timestamp actually leave the loop scope (its
//! innermost coordinate popped) on its way to `exit`.

use std::thread;

use crate::pointstamp::Pointstamp;
use crate::protocol::VertexMsg;
use crate::vertex::Edge;

use super::common::OpCore;

pub fn spawn<F>(
    mut core: OpCore,
    loop_back: Edge,
    exit: Edge,
    mut should_loop: F,
) -> thread::JoinHandle<()>
where
    F: FnMut(&crate::message::Message) -> bool + Send + 'static,
{
    thread::spawn(move || {
        while let Some(event) = core.recv() {
            match event {
                VertexMsg::OnRecv { edge, timestamp, message, .. } => {
                    if let Err(e) = core.ts_check_and_update(&timestamp) {
                        log::warn!("egress {:?}: {}", core.id(), e);
                        continue;
                    }
                    let consumed = Pointstamp::from_edge(edge, timestamp.clone());
                    if let Err(e) = core.core_decre_oc(consumed) {
                        log::warn!("egress {:?}: decre_oc rejected: {}", core.id(), e);
                    }
                    if should_loop(&message) {
                        if let Err(e) = core.core_send_by(loop_back, timestamp, message) {
                            log::warn!("egress {:?}: loop-back send rejected: {}", core.id(), e);
                        }
                    } else {
                        match timestamp.rewritten(core.typ()) {
                            Ok(outer_ts) => {
                                if let Err(e) = core.core_send_by(exit, outer_ts, message) {
                                    log::warn!("egress {:?}: exit send rejected: {}", core.id(), e);
                                }
                            }
                            Err(e) => log::error!("egress {:?}: {}", core.id(), e),
                        }
                    }
                }
                VertexMsg::OnNotify { .. } => {}
                VertexMsg::Shutdown => break,
            }
        }
    })
}
