// Copyright (c) 2021-2023 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

//! Flow networks and the push-relabel maximum-flow algorithm.
//!
//! A [`FlowNetwork`] is a directed graph in which every edge carries a
//! non-negative capacity. Two pseudonodes, [`SOURCE`] and [`SINK`], exist
//! next to the user nodes `0..num_nodes`. By default every node is
//! connected from the source and to the sink with unbounded capacity; the
//! first edge the caller adds incident to a pseudonode removes all
//! automatic edges of that pseudonode and makes the caller responsible
//! for its wiring.
//!
//! The maximum flow is computed by the relabel-to-front variant of the
//! push-relabel algorithm.
//!
//! # Example
//!
//! ```
//! use flownet::FlowNetwork;
//!
//! let mut g = FlowNetwork::<i64>::new(6);
//! for &(u, v, cap) in &[
//!     (0, 1, 15), (0, 2, 4), (1, 3, 12), (3, 2, 3),
//!     (2, 4, 10), (4, 1, 5), (4, 5, 10), (3, 5, 7),
//! ] {
//!     g.add_edge(u, v, cap).unwrap();
//! }
//!
//! g.push_relabel();
//!
//! assert_eq!(g.outflow(), 14);
//! assert_eq!(g.flow(0, 1), 10);
//! assert_eq!(g.flow(0, 2), 4);
//! ```

use std::cmp::min;
use std::collections::{HashMap, HashSet};
use std::fmt;

use num_traits::{Bounded, NumAssign, Signed};
use serde::de;
use serde_derive::{Deserialize, Serialize};

/// The id of the source pseudonode.
pub const SOURCE: isize = -2;

/// The id of the sink pseudonode.
pub const SINK: isize = -1;

/// The internal slot of the source pseudonode.
pub(crate) const SOURCE_ID: usize = 0;

/// The internal slot of the sink pseudonode.
pub(crate) const SINK_ID: usize = 1;

/// Convert a user-facing node id to its internal slot.
pub(crate) fn internal_id(external: isize) -> usize {
    (external + 2) as usize
}

/// Convert an internal slot back to the user-facing node id.
pub(crate) fn external_id(internal: usize) -> isize {
    internal as isize - 2
}

/// A directed edge between two internal slots.
///
/// Every edge implicitly has a reverse edge. The reverse direction never
/// owns a capacity entry; pushing flow against an edge reduces the
/// recorded flow of its forward twin instead.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct Edge {
    pub(crate) from: usize,
    pub(crate) to: usize,
}

impl Edge {
    /// Construct an edge between user-facing node ids.
    pub(crate) fn new(from: isize, to: isize) -> Self {
        Edge {
            from: internal_id(from),
            to: internal_id(to),
        }
    }

    pub(crate) fn reverse(self) -> Self {
        Edge {
            from: self.to,
            to: self.from,
        }
    }
}

// Edges serialize as a "from:to" string so the edge-keyed maps survive
// human-readable formats, which require string map keys.
impl serde::Serialize for Edge {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&format_args!("{}:{}", self.from, self.to))
    }
}

impl<'de> serde::Deserialize<'de> for Edge {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct EdgeVisitor;

        impl<'de> de::Visitor<'de> for EdgeVisitor {
            type Value = Edge;

            fn expecting(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
                write!(fmt, "an edge encoded as \"from:to\"")
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<Edge, E>
            where
                E: de::Error,
            {
                let mut parts = value.splitn(2, ':');
                let from = parts.next().and_then(|s| s.parse().ok());
                let to = parts.next().and_then(|s| s.parse().ok());
                match (from, to) {
                    (Some(from), Some(to)) => Ok(Edge { from, to }),
                    _ => Err(E::custom(format!("invalid edge key '{}'", value))),
                }
            }
        }

        deserializer.deserialize_str(EdgeVisitor)
    }
}

/// Error returned when a graph operation receives invalid arguments.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// A node id outside the known range was used.
    UnknownNode(isize),
    /// An edge may not end at the source pseudonode.
    TargetsSource,
    /// An edge may not leave the sink pseudonode.
    LeavesSink,
    /// Edge capacities must be non-negative.
    NegativeCapacity,
    /// Edge demands must be non-negative.
    NegativeDemand,
    /// An edge demand may not exceed the edge capacity.
    DemandExceedsCapacity,
    /// The minimum storage of a node must be non-negative.
    NegativeStorage,
    /// The minimum storage of a node may not exceed its maximum storage.
    StorageBoundsReversed,
    /// The source and sink pseudonodes cannot be used in this operation.
    PseudonodeNotAllowed,
    /// A node order must mention every user node exactly once.
    NodeOrderLength { expected: usize },
    /// A node order mentioned some node twice.
    NodeOrderDuplicate(isize),
    /// The graph contains a directed cycle.
    Cyclic,
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        use self::Error::*;
        match self {
            UnknownNode(id) => write!(fmt, "no node with id {} is known", id),
            TargetsSource => write!(fmt, "no edge can target the source pseudonode"),
            LeavesSink => write!(fmt, "no edge can leave the sink pseudonode"),
            NegativeCapacity => write!(fmt, "edge capacities must be non-negative"),
            NegativeDemand => write!(fmt, "edge demands must be non-negative"),
            DemandExceedsCapacity => write!(fmt, "edge demand exceeds the edge capacity"),
            NegativeStorage => write!(fmt, "minimum storage must be non-negative"),
            StorageBoundsReversed => write!(fmt, "minimum storage exceeds maximum storage"),
            PseudonodeNotAllowed => {
                write!(fmt, "the source and sink pseudonodes cannot be used here")
            }
            NodeOrderLength { expected } => {
                write!(fmt, "node order must contain exactly {} node ids", expected)
            }
            NodeOrderDuplicate(id) => {
                write!(fmt, "node order contains node {} more than once", id)
            }
            Cyclic => write!(fmt, "graph has a cycle"),
        }
    }
}

impl std::error::Error for Error {}

/// The result type of all fallible graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A directed graph with edge capacities for maximum-flow problems.
///
/// User nodes carry the ids `0..num_nodes`. Each node starts its life
/// connected from [`SOURCE`] and to [`SINK`] with capacity
/// `F::max_value()`; adding an edge incident to a pseudonode switches
/// that pseudonode to manual wiring and removes all of its automatic
/// edges for the lifetime of the graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowNetwork<F = i64> {
    /// Number of user nodes, excluding the two pseudonodes.
    num_nodes: usize,
    /// Internal slots in the reverse of the order nodes are discharged.
    node_order: Vec<usize>,
    /// Out-neighbor slots of each slot.
    adjacency: Vec<HashSet<usize>>,
    /// Neighbor slots of each slot in discharge visiting order.
    visit_lists: Vec<Vec<usize>>,
    /// Capacity of each edge. A missing entry means no forward capacity.
    capacity: HashMap<Edge, F>,
    /// Current flow of each edge.
    preflow: HashMap<Edge, F>,
    /// Excess flow of each slot.
    excess: Vec<F>,
    /// Height of each slot.
    label: Vec<usize>,
    /// Position in the visit list where discharging resumes.
    seen: Vec<usize>,
    manual_source: bool,
    manual_sink: bool,
    /// The number of relabel operations of the last `push_relabel` run.
    pub cnt_relabel: usize,
}

impl<F> FlowNetwork<F>
where
    F: NumAssign + Signed + Bounded + Ord + Copy,
{
    /// Create a network with `num_nodes` user nodes.
    ///
    /// Every node is auto-wired to the source and sink pseudonodes.
    pub fn new(num_nodes: usize) -> Self {
        let mut g = FlowNetwork {
            num_nodes,
            node_order: Vec::new(),
            adjacency: vec![HashSet::new(); num_nodes + 2],
            visit_lists: Vec::new(),
            capacity: HashMap::with_capacity(2 * num_nodes),
            preflow: HashMap::with_capacity(2 * num_nodes),
            excess: vec![F::zero(); num_nodes + 2],
            label: vec![0; num_nodes + 2],
            seen: vec![0; num_nodes + 2],
            manual_source: false,
            manual_sink: false,
            cnt_relabel: 0,
        };
        for v in 0..num_nodes as isize {
            g.add_edge_raw(SOURCE, v, F::max_value());
            g.add_edge_raw(v, SINK, F::max_value());
        }
        g
    }

    /// Return the number of user nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Append a new node and return its id.
    ///
    /// The node is auto-wired to each pseudonode that is still in
    /// automatic mode.
    pub fn add_node(&mut self) -> isize {
        let id = self.num_nodes as isize;
        self.num_nodes += 1;
        self.excess.push(F::zero());
        self.label.push(0);
        self.seen.push(0);
        self.adjacency.push(HashSet::new());
        if !self.manual_source {
            self.add_edge_raw(SOURCE, id, F::max_value());
        }
        if !self.manual_sink {
            self.add_edge_raw(id, SINK, F::max_value());
        }
        id
    }

    /// Set the capacity of the edge from `from` to `to`.
    ///
    /// Adding an edge twice overwrites its capacity. The endpoints may be
    /// [`SOURCE`] and [`SINK`]; the first such edge switches the
    /// respective pseudonode to manual wiring. While a pseudonode is
    /// still wired automatically, adding an edge removes the automatic
    /// `SOURCE → to` and `from → SINK` edges because the endpoints are no
    /// longer dangling.
    pub fn add_edge(&mut self, from: isize, to: isize, capacity: F) -> Result<()> {
        if from < SOURCE || from >= self.num_nodes as isize {
            return Err(Error::UnknownNode(from));
        }
        if to < SOURCE || to >= self.num_nodes as isize {
            return Err(Error::UnknownNode(to));
        }
        if to == SOURCE {
            return Err(Error::TargetsSource);
        }
        if from == SINK {
            return Err(Error::LeavesSink);
        }
        if capacity < F::zero() {
            return Err(Error::NegativeCapacity);
        }
        if from == SOURCE {
            self.enable_manual_source();
        }
        if to == SINK {
            self.enable_manual_sink();
        }

        self.add_edge_raw(from, to, capacity);

        // The endpoints are not dangling anymore, drop their automatic
        // pseudonode edges.
        if !self.manual_source {
            self.capacity.remove(&Edge {
                from: SOURCE_ID,
                to: internal_id(to),
            });
            self.adjacency[SOURCE_ID].remove(&internal_id(to));
        }
        if !self.manual_sink {
            self.capacity.remove(&Edge {
                from: internal_id(from),
                to: SINK_ID,
            });
            self.adjacency[internal_id(from)].remove(&SINK_ID);
        }
        Ok(())
    }

    /// Store an edge without validation or wiring side effects.
    pub(crate) fn add_edge_raw(&mut self, from: isize, to: isize, capacity: F) {
        self.capacity.insert(Edge::new(from, to), capacity);
        self.adjacency[internal_id(from)].insert(internal_id(to));
    }

    /// Add `delta` on top of the recorded raw capacity of an edge.
    pub(crate) fn raise_edge_raw(&mut self, from: isize, to: isize, delta: F) {
        let cur = self.capacity_raw(from, to);
        self.add_edge_raw(from, to, cur + delta);
    }

    /// The recorded capacity of an edge without any demand offsets.
    pub(crate) fn capacity_raw(&self, from: isize, to: isize) -> F {
        self.capacity
            .get(&Edge::new(from, to))
            .copied()
            .unwrap_or_else(F::zero)
    }

    /// Remove every edge leaving the source and entering the sink.
    ///
    /// The adjacency sets are kept, so the pseudonodes remain reachable
    /// for residual traversal.
    pub(crate) fn clear_pseudonode_edges(&mut self) {
        self.capacity
            .retain(|e, _| e.from != SOURCE_ID && e.to != SINK_ID);
    }

    fn enable_manual_source(&mut self) {
        if self.manual_source {
            return;
        }
        self.manual_source = true;
        for u in 2..self.num_nodes + 2 {
            self.capacity.remove(&Edge { from: SOURCE_ID, to: u });
            self.adjacency[SOURCE_ID].remove(&u);
        }
    }

    fn enable_manual_sink(&mut self) {
        if self.manual_sink {
            return;
        }
        self.manual_sink = true;
        for u in 2..self.num_nodes + 2 {
            self.capacity.remove(&Edge { from: u, to: SINK_ID });
            self.adjacency[u].remove(&SINK_ID);
        }
    }

    /// Return the amount of flow entering the sink.
    ///
    /// After [`push_relabel`](FlowNetwork::push_relabel) this is the value
    /// of a maximum flow.
    pub fn outflow(&self) -> F {
        let mut result = F::zero();
        for (e, &flow) in &self.preflow {
            if e.to == SINK_ID {
                result += flow;
            }
        }
        result
    }

    /// Return the flow along an edge, or zero before the flow has been
    /// computed.
    pub fn flow(&self, from: isize, to: isize) -> F {
        self.preflow
            .get(&Edge::new(from, to))
            .copied()
            .unwrap_or_else(F::zero)
    }

    /// Return the capacity of an edge, or zero if the edge is unknown.
    pub fn capacity(&self, from: isize, to: isize) -> F {
        self.capacity_raw(from, to)
    }

    /// Return the residual capacity of an edge.
    ///
    /// For an edge with forward capacity this is the remaining slack
    /// `capacity - flow`; otherwise it is the amount of flow on the
    /// reverse edge that could be cancelled.
    pub fn residual(&self, from: isize, to: isize) -> F {
        self.residual_edge(Edge::new(from, to))
    }

    pub(crate) fn residual_edge(&self, e: Edge) -> F {
        let cap = self.capacity.get(&e).copied().unwrap_or_else(F::zero);
        if cap == F::zero() {
            self.preflow
                .get(&e.reverse())
                .copied()
                .unwrap_or_else(F::zero)
        } else {
            cap - self.preflow.get(&e).copied().unwrap_or_else(F::zero)
        }
    }

    pub(crate) fn capacity_map(&self) -> &HashMap<Edge, F> {
        &self.capacity
    }

    pub(crate) fn preflow_map(&self) -> &HashMap<Edge, F> {
        &self.preflow
    }

    pub(crate) fn neighbors(&self, u: usize) -> &HashSet<usize> {
        &self.adjacency[u]
    }

    /// Set the order in which nodes are initially discharged.
    ///
    /// `node_ids` must be a permutation of `0..num_nodes`; otherwise an
    /// error is returned and the current order is kept. Adding a node
    /// later resets the order to the default (descending by id).
    ///
    /// The order only fixes the initial discharge sequence; relabeling
    /// during the algorithm reorders nodes in unintuitive ways.
    pub fn set_node_order(&mut self, node_ids: &[isize]) -> Result<()> {
        if node_ids.len() != self.num_nodes {
            return Err(Error::NodeOrderLength {
                expected: self.num_nodes,
            });
        }
        let mut unique = HashSet::with_capacity(node_ids.len());
        let mut order = vec![0; self.num_nodes];
        for (i, &id) in node_ids.iter().enumerate() {
            if id < 0 || id >= self.num_nodes as isize {
                return Err(Error::UnknownNode(id));
            }
            if !unique.insert(id) {
                return Err(Error::NodeOrderDuplicate(id));
            }
            // reversed, because the solver queue pops from the back
            order[self.num_nodes - 1 - i] = internal_id(id);
        }
        self.node_order = order;
        Ok(())
    }

    /// Compute a maximum flow with the relabel-to-front push-relabel
    /// algorithm.
    ///
    /// Each node is visited in the node order and discharged; whenever a
    /// discharge raises the node's height, the node moves to the back of
    /// the queue and the scan restarts there. All bookkeeping is rebuilt
    /// on every call, so the method can be re-run after mutating the
    /// graph.
    pub fn push_relabel(&mut self) {
        self.reset();
        let mut queue = self.node_order.clone();
        let mut p = queue.len();
        while p > 0 {
            let u = queue[p - 1];
            let old_label = self.label[u];
            self.discharge(u);
            if self.label[u] > old_label {
                queue.remove(p - 1);
                queue.push(u);
                p = queue.len();
            } else {
                p -= 1;
            }
        }
    }

    /// Push excess out of `u` until none is left, relabeling `u` whenever
    /// its visit list is exhausted.
    fn discharge(&mut self, u: usize) {
        while self.excess[u] > F::zero() {
            if self.seen[u] == self.visit_lists[u].len() {
                self.relabel(u);
                self.seen[u] = 0;
            } else {
                let v = self.visit_lists[u][self.seen[u]];
                let e = Edge { from: u, to: v };
                if self.residual_edge(e) > F::zero() && self.label[u] == self.label[v] + 1 {
                    self.push(e);
                } else {
                    self.seen[u] += 1;
                }
            }
        }
    }

    /// Move as much excess as the residual capacity admits across `e`.
    fn push(&mut self, e: Edge) {
        debug_assert!(self.residual_edge(e) > F::zero());
        debug_assert_eq!(self.label[e.from], self.label[e.to] + 1);

        let delta = min(self.excess[e.from], self.residual_edge(e));
        debug_assert!(delta > F::zero());
        if self.capacity.get(&e).copied().unwrap_or_else(F::zero) > F::zero() {
            *self.preflow.entry(e).or_insert_with(F::zero) += delta;
        } else {
            *self.preflow.entry(e.reverse()).or_insert_with(F::zero) -= delta;
        }
        self.excess[e.from] -= delta;
        self.excess[e.to] += delta;
    }

    /// Raise the height of `u` to one above its lowest residual neighbor.
    fn relabel(&mut self, u: usize) {
        debug_assert!(self.excess[u] > F::zero());

        self.cnt_relabel += 1;
        let min_label = self.visit_lists[u]
            .iter()
            .filter(|&&v| self.residual_edge(Edge { from: u, to: v }) > F::zero())
            .map(|&v| self.label[v])
            .min();
        match min_label {
            Some(h) => {
                // every residual neighbor is at least as high as `u` once
                // the visit list is exhausted
                debug_assert!(h + 1 > self.label[u]);
                self.label[u] = h + 1;
            }
            // A node with excess but no residual neighbor cannot be
            // produced through the public API.
            None => panic!(
                "cannot relabel node {}: no residual edge remains",
                external_id(u)
            ),
        }
    }

    /// Rebuild all solver bookkeeping for a fresh run.
    fn reset(&mut self) {
        if self.node_order.len() != self.num_nodes {
            self.node_order = (0..self.num_nodes)
                .map(|i| internal_id((self.num_nodes - 1 - i) as isize))
                .collect();
        }

        // Rebuild the visit lists against the current node order. The
        // first neighbor visited must be the last entry of the order, and
        // the pseudonodes are visited before any user node.
        let slots = self.adjacency.len();
        self.visit_lists = vec![Vec::new(); slots];
        for u in 0..slots {
            let mut list = Vec::new();
            for &v in [SINK_ID, SOURCE_ID]
                .iter()
                .chain(self.node_order.iter().rev())
            {
                if self.adjacency[u].contains(&v) || self.adjacency[v].contains(&u) {
                    list.push(v);
                }
            }
            self.visit_lists[u] = list;
        }

        self.label[SOURCE_ID] = self.num_nodes + 2;
        self.label[SINK_ID] = 0;
        for v in 0..self.num_nodes {
            self.label[v + 2] = 0;
        }
        self.preflow.clear();
        for x in &mut self.excess {
            *x = F::zero();
        }
        for s in &mut self.seen {
            *s = 0;
        }
        self.cnt_relabel = 0;

        // Saturate the source edges. Each source edge is limited to the
        // target's total outgoing capacity instead of its recorded
        // capacity, which keeps the unbounded automatic edges from
        // flooding the excess counters.
        let mut total = F::zero();
        for u in 2..self.num_nodes + 2 {
            let e = Edge {
                from: SOURCE_ID,
                to: u,
            };
            if !self.capacity.contains_key(&e) {
                continue;
            }
            let mut outgoing = F::zero();
            for &v in &self.adjacency[u] {
                if v == SOURCE_ID || v == SINK_ID {
                    continue;
                }
                outgoing += self
                    .capacity
                    .get(&Edge { from: u, to: v })
                    .copied()
                    .unwrap_or_else(F::zero);
            }
            total += outgoing;
            self.capacity.insert(e, outgoing);
            self.excess[u] = outgoing;
            self.preflow.insert(e, outgoing);
        }
        self.excess[SOURCE_ID] = -total;
    }
}
