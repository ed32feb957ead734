//! The `Input` vertex: the only kind of vertex driven by something outside
//! the graph rather than by an upstream `OnRecv`.

use std::thread;

use crossbeam_channel::{select, Receiver};

use crate::message::Message;
use crate::pointstamp::Pointstamp;
use crate::timestamp::Timestamp;
use crate::vertex::Edge;

use super::common::OpCore;

/// One item handed to an `Input` vertex from the outside.
pub enum Feed {
    /// Advance to `epoch` and forward `message`.
    Advance { epoch: u32, message: Message },

    /// No more data is coming at `epoch`: install the pointstamp for
    /// `epoch + 1` and retire `epoch`'s, per `close_epoch` (spec.md §6,
    /// supplemented from `original_source/graph/graph.go`'s `PreProcess`
    /// doc comment — see `SPEC_FULL.md` §11.1). `epoch` must equal this
    /// vertex's currently open epoch; anything else is a protocol error,
    /// logged and ignored.
    CloseEpoch(u32),

    /// Close the input entirely: retire whatever epoch pointstamp is still
    /// open, then stop the task.
    Close,
}

/// Spawns the task backing an `Input` vertex. `feed` carries externally
/// produced messages; `downstream` is its single outbound edge.
///
/// `Graph::pre_process` seeds the epoch-zero pointstamp for this vertex
/// before the worker starts, so `open_epoch` tracks that claim here without
/// re-issuing the `IncreOc` for it.
pub fn spawn(mut core: OpCore, downstream: Edge, feed: Receiver<Feed>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut open_epoch = 0u32;
        loop {
            select! {
                recv(feed) -> item => match item {
                    Ok(Feed::Advance { epoch, message }) => {
                        let ts = Timestamp::with_epoch(epoch);
                        if let Err(e) = core.ts_check_and_update(&ts) {
                            log::warn!("input {:?}: {}", core.id(), e);
                            continue;
                        }
                        if let Err(e) = core.core_send_by(downstream, ts, message) {
                            log::warn!("input {:?}: send rejected: {}", core.id(), e);
                        }
                    }
                    Ok(Feed::CloseEpoch(epoch)) => {
                        if epoch != open_epoch {
                            log::warn!(
                                "input {:?}: close_epoch({}) does not match open epoch {}",
                                core.id(), epoch, open_epoch,
                            );
                            continue;
                        }
                        let next = Pointstamp::Vertex {
                            vertex: core.id(),
                            timestamp: Timestamp::with_epoch(epoch + 1),
                        };
                        if let Err(e) = core.core_incre_oc(next) {
                            log::warn!("input {:?}: advancing to epoch {}: {}", core.id(), epoch + 1, e);
                            continue;
                        }
                        let current = Pointstamp::Vertex {
                            vertex: core.id(),
                            timestamp: Timestamp::with_epoch(epoch),
                        };
                        if let Err(e) = core.core_decre_oc(current) {
                            log::warn!("input {:?}: retiring epoch {}: {}", core.id(), epoch, e);
                        }
                        open_epoch = epoch + 1;
                    }
                    Ok(Feed::Close) | Err(_) => {
                        let current = Pointstamp::Vertex {
                            vertex: core.id(),
                            timestamp: Timestamp::with_epoch(open_epoch),
                        };
                        if let Err(e) = core.core_decre_oc(current) {
                            log::debug!("input {:?}: closing: {}", core.id(), e);
                        }
                        break;
                    }
                },
                recv(core.shutdown_recv()) -> _ => break,
            }
        }
    })
}
