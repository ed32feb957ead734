//! A small builder for assembling vertices and edges into a graph and, once
//! the whole shape is known, spawning the runtime task behind each one.
//!
//! A [`Stream`] stands for "the output of some vertex that hasn't picked a
//! destination yet". Each builder method wires its input stream's edge into
//! the graph immediately (both endpoints already exist by then) but defers
//! building its own outbound [`Edge`] until [`Scope::build`], since that
//! depends on whichever vertex is built *after* it and ends up consuming its
//! `Stream`. A `Stream` nobody ever consumes is valid too — it is simply the
//! terminal output of the dataflow.

use std::cell::Cell;
use std::rc::Rc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Sender};

use crate::config::Config;
use crate::error::UserError;
use crate::graph::Graph;
use crate::message::Message;
use crate::runtime::{self, input::Feed, OpCore};
use crate::timestamp::Timestamp;
use crate::vertex::{Direction, Edge, VertexId, VertexIdFactory, VertexType};
use crate::worker::{CancelToken, Worker};

type DownstreamSlot = Rc<Cell<Option<VertexId>>>;
type Spawner = Box<dyn FnOnce(&mut Worker) -> JoinHandle<()>>;

/// The as-yet-undetermined destination of one vertex's output.
#[derive(Clone)]
pub struct Stream {
    id: VertexId,
    downstream: DownstreamSlot,
}

impl Stream {
    pub fn vertex_id(&self) -> VertexId {
        self.id
    }
}

/// Accumulates a dataflow's vertices and edges; [`Scope::build`] hands the
/// finished graph to a fresh [`Worker`] and spawns every vertex's task.
pub struct Scope {
    graph: Graph,
    ids: VertexIdFactory,
    spawners: Vec<Spawner>,
}

impl Scope {
    pub fn new() -> Self {
        Scope { graph: Graph::new(), ids: VertexIdFactory::new(), spawners: Vec::new() }
    }

    /// Wires `input`'s edge into the newly created vertex `id` and records
    /// `id` as `input`'s resolved downstream.
    fn consume(&mut self, input: &Stream, id: VertexId, dir: Direction) {
        self.graph
            .insert_edge(input.id, id, dir)
            .expect("both endpoints were just registered");
        input.downstream.set(Some(id));
    }

    /// Adds an `Input` vertex. Returns its output stream and the sender the
    /// caller uses to feed it epochs of data from outside the graph.
    pub fn new_input(&mut self) -> (Stream, Sender<Feed>) {
        let id = self.ids.next();
        self.graph.insert_vertex(id, VertexType::Input);
        let (feed_tx, feed_rx) = unbounded();

        let downstream: DownstreamSlot = Rc::new(Cell::new(None));
        let downstream_for_spawner = Rc::clone(&downstream);
        self.spawners.push(Box::new(move |worker: &mut Worker| {
            let wh = worker.register_vertex(id);
            let core = OpCore::new(id, VertexType::Input, wh, worker.shutdown_recv());
            let target = downstream_for_spawner.get().expect("input stream never consumed");
            runtime::input::spawn(core, Edge::new(id, target), feed_rx)
        }));

        (Stream { id, downstream }, feed_tx)
    }

    /// Adds an `Inspect` vertex. `observe` runs for its side effect only;
    /// the stream passes through unchanged.
    pub fn inspect<F>(&mut self, input: Stream, observe: F) -> Stream
    where
        F: FnMut(&Message, &Timestamp) -> Result<(), UserError> + Send + 'static,
    {
        let id = self.ids.next();
        self.graph.insert_vertex(id, VertexType::Inspect);
        self.consume(&input, id, Direction::Left);

        let downstream: DownstreamSlot = Rc::new(Cell::new(None));
        let downstream_for_spawner = Rc::clone(&downstream);
        self.spawners.push(Box::new(move |worker: &mut Worker| {
            let wh = worker.register_vertex(id);
            let core = OpCore::new(id, VertexType::Inspect, wh, worker.shutdown_recv());
            let edge = downstream_for_spawner.get().map(|target| Edge::new(id, target));
            runtime::inspect::spawn(core, edge, observe)
        }));

        Stream { id, downstream }
    }

    /// Adds a `Filter` vertex: `predicate` decides which messages continue.
    pub fn filter<F>(&mut self, input: Stream, predicate: F) -> Stream
    where
        F: FnMut(&Message) -> bool + Send + 'static,
    {
        let id = self.ids.next();
        self.graph.insert_vertex(id, VertexType::Filter);
        self.consume(&input, id, Direction::Left);

        let downstream: DownstreamSlot = Rc::new(Cell::new(None));
        let downstream_for_spawner = Rc::clone(&downstream);
        self.spawners.push(Box::new(move |worker: &mut Worker| {
            let wh = worker.register_vertex(id);
            let core = OpCore::new(id, VertexType::Filter, wh, worker.shutdown_recv());
            let target = downstream_for_spawner.get().expect("filter stream never consumed");
            runtime::filter::spawn(core, Edge::new(id, target), predicate)
        }));

        Stream { id, downstream }
    }

    /// Adds a `Unary` vertex: `transform` maps each message to zero-or-one
    /// output (an `Err` drops it and logs why).
    pub fn map<F>(&mut self, input: Stream, transform: F) -> Stream
    where
        F: FnMut(Message) -> Result<Message, UserError> + Send + 'static,
    {
        let id = self.ids.next();
        self.graph.insert_vertex(id, VertexType::Unary);
        self.consume(&input, id, Direction::Left);

        let downstream: DownstreamSlot = Rc::new(Cell::new(None));
        let downstream_for_spawner = Rc::clone(&downstream);
        self.spawners.push(Box::new(move |worker: &mut Worker| {
            let wh = worker.register_vertex(id);
            let core = OpCore::new(id, VertexType::Unary, wh, worker.shutdown_recv());
            let target = downstream_for_spawner.get().expect("unary stream never consumed");
            runtime::unary::spawn(core, Edge::new(id, target), transform)
        }));

        Stream { id, downstream }
    }

    /// Adds a `Binary` vertex joining `left` and `right`. `merge` sees which
    /// side each message arrived on.
    pub fn binary<F>(&mut self, left: Stream, right: Stream, merge: F) -> Stream
    where
        F: FnMut(Direction, Message) -> Option<Message> + Send + 'static,
    {
        let id = self.ids.next();
        self.graph.insert_vertex(id, VertexType::Binary);
        self.consume(&left, id, Direction::Left);
        self.consume(&right, id, Direction::Right);

        let downstream: DownstreamSlot = Rc::new(Cell::new(None));
        let downstream_for_spawner = Rc::clone(&downstream);
        self.spawners.push(Box::new(move |worker: &mut Worker| {
            let wh = worker.register_vertex(id);
            let core = OpCore::new(id, VertexType::Binary, wh, worker.shutdown_recv());
            let target = downstream_for_spawner.get().expect("binary stream never consumed");
            runtime::binary::spawn(core, Edge::new(id, target), merge)
        }));

        Stream { id, downstream }
    }

    /// Wires a loop scope: `input` enters through an `Ingress`, runs through
    /// a `Unary` body, and `should_loop` (evaluated by the scope's `Egress`)
    /// decides whether each result goes back around via `Feedback` or exits
    /// the loop. Returns the exit stream.
    pub fn loop_scope<B, P>(&mut self, input: Stream, body: B, should_loop: P) -> Stream
    where
        B: FnMut(Message) -> Result<Message, UserError> + Send + 'static,
        P: FnMut(&Message) -> bool + Send + 'static,
    {
        let ingress_id = self.ids.next();
        let body_id = self.ids.next();
        let feedback_id = self.ids.next();
        let egress_id = self.ids.next();

        self.graph.insert_vertex(ingress_id, VertexType::Ingress);
        self.graph.insert_vertex(body_id, VertexType::Unary);
        self.graph.insert_vertex(feedback_id, VertexType::Feedback);
        self.graph.insert_vertex(egress_id, VertexType::Egress);

        self.consume(&input, ingress_id, Direction::Left);
        self.graph.insert_edge(ingress_id, body_id, Direction::Left).unwrap();
        self.graph.insert_edge(feedback_id, body_id, Direction::Left).unwrap();
        self.graph.insert_edge(body_id, egress_id, Direction::Left).unwrap();
        self.graph.insert_edge(egress_id, feedback_id, Direction::Left).unwrap();

        self.spawners.push(Box::new(move |worker: &mut Worker| {
            let wh = worker.register_vertex(ingress_id);
            let core = OpCore::new(ingress_id, VertexType::Ingress, wh, worker.shutdown_recv());
            runtime::ingress::spawn(core, Edge::new(ingress_id, body_id))
        }));

        self.spawners.push(Box::new(move |worker: &mut Worker| {
            let wh = worker.register_vertex(body_id);
            let core = OpCore::new(body_id, VertexType::Unary, wh, worker.shutdown_recv());
            runtime::unary::spawn(core, Edge::new(body_id, egress_id), body)
        }));

        self.spawners.push(Box::new(move |worker: &mut Worker| {
            let wh = worker.register_vertex(feedback_id);
            let core = OpCore::new(feedback_id, VertexType::Feedback, wh, worker.shutdown_recv());
            runtime::feedback::spawn(core, Edge::new(feedback_id, body_id))
        }));

        let downstream: DownstreamSlot = Rc::new(Cell::new(None));
        let downstream_for_spawner = Rc::clone(&downstream);
        self.spawners.push(Box::new(move |worker: &mut Worker| {
            let wh = worker.register_vertex(egress_id);
            let core = OpCore::new(egress_id, VertexType::Egress, wh, worker.shutdown_recv());
            let exit_target = downstream_for_spawner.get().expect("loop exit stream never consumed");
            runtime::egress::spawn(
                core,
                Edge::new(egress_id, feedback_id),
                Edge::new(egress_id, exit_target),
                should_loop,
            )
        }));

        Stream { id: egress_id, downstream }
    }

    /// Finalizes the graph, builds a [`Worker`] over it, and spawns every
    /// vertex's runtime task. Returns the worker (drive it with
    /// [`Worker::run`]), the [`CancelToken`] that stops it, and the task
    /// handles (join them after cancelling).
    pub fn build(self, config: Config) -> (Worker, CancelToken, Vec<JoinHandle<()>>) {
        let (mut worker, cancel) = Worker::new(self.graph, config);
        let handles = self.spawners.into_iter().map(|spawn| spawn(&mut worker)).collect();
        (worker, cancel, handles)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::new()
    }
}
