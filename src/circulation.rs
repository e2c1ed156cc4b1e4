// Copyright (c) 2022, 2023 Frank Fischer <frank-fischer@shadow-soft.de>
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

//! Circulations with lower bounds.
//!
//! A [`Circulation`] is a flow network whose edges may carry a demand (a
//! lower bound on the flow) and whose nodes may supply or consume flow.
//! Instead of maximizing flow between two distinguished nodes, a
//! circulation asks whether any flow meets every demand. The question is
//! answered by rewriting the graph into an auxiliary maximum-flow problem
//! whose value saturates exactly when the instance is feasible: every
//! demand edge is relaxed to its residual capacity while the pseudonodes
//! take the role of a super-source and super-sink injecting the demanded
//! amounts; node demands route through an extra pair of auxiliary nodes
//! chained between the super-source and super-sink.
//!
//! # Example
//!
//! ```
//! use flownet::Circulation;
//!
//! let mut c = Circulation::<i64>::new(6);
//! for &(u, v, cap, demand) in &[
//!     (0, 1, 15, 0), (0, 2, 4, 0), (1, 3, 12, 0), (3, 2, 3, 0),
//!     (2, 4, 10, 0), (4, 1, 5, 4), (4, 5, 10, 0), (3, 5, 7, 0),
//! ] {
//!     c.add_edge(u, v, cap, demand).unwrap();
//! }
//! c.set_node_demand(0, -4).unwrap();
//! c.set_node_demand(5, 4).unwrap();
//!
//! c.push_relabel();
//!
//! // the edge demand and the positive node demand both saturate
//! assert!(c.satisfies_demand());
//! assert_eq!(c.outflow(), 8);
//! assert!(c.flow(4, 1) >= 4);
//! ```

use std::collections::HashMap;

use num_traits::{Bounded, NumAssign, Signed};
use serde_derive::{Deserialize, Serialize};

use crate::network::{external_id, Edge, Error, FlowNetwork, Result, SINK, SOURCE};

/// A flow network with demands on its edges and nodes.
///
/// Edges registered through [`add_edge`](Circulation::add_edge) carry a
/// lower bound; nodes may be given a supply (negative demand) or a demand
/// through [`set_node_demand`](Circulation::set_node_demand). The
/// pseudonodes are reserved for the feasibility reduction and cannot be
/// used in a circulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Circulation<F = i64> {
    network: FlowNetwork<F>,
    /// Lower bound of each edge; only nonzero bounds are recorded.
    edge_demand: HashMap<Edge, F>,
    node_demand: HashMap<isize, F>,
    /// Auxiliary node supplying all node demands.
    node_source: Option<isize>,
    /// Auxiliary node consuming all node demands.
    node_sink: Option<isize>,
    /// The outflow a feasible instance must reach.
    target_value: F,
}

impl<F> Circulation<F>
where
    F: NumAssign + Signed + Bounded + Ord + Copy,
{
    /// Create a circulation with `num_nodes` user nodes.
    pub fn new(num_nodes: usize) -> Self {
        Circulation {
            network: FlowNetwork::new(num_nodes),
            edge_demand: HashMap::new(),
            node_demand: HashMap::new(),
            node_source: None,
            node_sink: None,
            target_value: F::zero(),
        }
    }

    /// Return the underlying flow network.
    pub fn network(&self) -> &FlowNetwork<F> {
        &self.network
    }

    /// Return the number of user nodes, auxiliary nodes included.
    pub fn num_nodes(&self) -> usize {
        self.network.num_nodes()
    }

    /// Append a new node and return its id.
    pub fn add_node(&mut self) -> isize {
        self.network.add_node()
    }

    /// Set the order in which nodes are initially discharged.
    pub fn set_node_order(&mut self, node_ids: &[isize]) -> Result<()> {
        self.network.set_node_order(node_ids)
    }

    /// Set the capacity and demand of an edge.
    ///
    /// The flow along the edge must end up in `demand..=capacity` for the
    /// circulation to be feasible. Adding an edge twice overwrites both
    /// values. Pseudonode endpoints are rejected.
    pub fn add_edge(&mut self, from: isize, to: isize, capacity: F, demand: F) -> Result<()> {
        if from == SOURCE || from == SINK || to == SOURCE || to == SINK {
            return Err(Error::PseudonodeNotAllowed);
        }
        if demand < F::zero() {
            return Err(Error::NegativeDemand);
        }
        if capacity < demand {
            return Err(Error::DemandExceedsCapacity);
        }
        // the network sees the edge relaxed to its residual capacity
        self.network.add_edge(from, to, capacity - demand)?;
        let e = Edge::new(from, to);
        if demand == F::zero() {
            self.edge_demand.remove(&e);
        } else {
            self.edge_demand.insert(e, demand);
        }
        Ok(())
    }

    /// Set the demand of a node.
    ///
    /// A positive demand makes the node consume flow, a negative demand
    /// makes it supply flow. The first nonzero demand allocates the two
    /// auxiliary nodes and the bypass between them; a zero demand clears
    /// any surrogate edges added earlier.
    pub fn set_node_demand(&mut self, node: isize, demand: F) -> Result<()> {
        if node == SOURCE || node == SINK {
            return Err(Error::PseudonodeNotAllowed);
        }
        if node < 0 || node >= self.network.num_nodes() as isize {
            return Err(Error::UnknownNode(node));
        }
        if demand == F::zero() {
            if let (Some(ns), Some(nk)) = (self.node_source, self.node_sink) {
                self.network.add_edge(ns, node, F::zero())?;
                self.network.add_edge(node, nk, F::zero())?;
            }
        } else {
            if self.node_source.is_none() {
                let ns = self.network.add_node();
                let nk = self.network.add_node();
                self.network.add_edge(nk, ns, F::max_value())?;
                self.node_source = Some(ns);
                self.node_sink = Some(nk);
            }
            if let (Some(ns), Some(nk)) = (self.node_source, self.node_sink) {
                if demand > F::zero() {
                    self.network.add_edge(node, nk, demand)?;
                } else {
                    self.network.add_edge(ns, node, -demand)?;
                }
            }
        }
        self.node_demand.insert(node, demand);
        Ok(())
    }

    /// Return the capacity of an edge including its demand.
    pub fn capacity(&self, from: isize, to: isize) -> F {
        self.network.capacity(from, to) + self.edge_demand(from, to)
    }

    /// Return the flow along an edge including its demand.
    ///
    /// The value is only meaningful once
    /// [`push_relabel`](Circulation::push_relabel) has been run.
    pub fn flow(&self, from: isize, to: isize) -> F {
        self.network.flow(from, to) + self.edge_demand(from, to)
    }

    /// Return the demand of an edge.
    pub fn edge_demand(&self, from: isize, to: isize) -> F {
        self.edge_demand
            .get(&Edge::new(from, to))
            .copied()
            .unwrap_or_else(F::zero)
    }

    /// Return the demand of a node.
    pub fn node_demand(&self, node: isize) -> F {
        self.node_demand
            .get(&node)
            .copied()
            .unwrap_or_else(F::zero)
    }

    /// Return the total amount of flow circulating through the network.
    pub fn outflow(&self) -> F {
        self.network.outflow()
    }

    /// Return `true` iff the computed flow meets every demand.
    ///
    /// The reduction is feasible exactly when the auxiliary maximum flow
    /// saturates the demanded amount.
    pub fn satisfies_demand(&self) -> bool {
        self.network.outflow() == self.target_value
    }

    /// `true` if some edge or node carries a nonzero demand.
    fn has_demands(&self) -> bool {
        !self.edge_demand.is_empty() || self.node_demand.values().any(|&d| d != F::zero())
    }

    /// Find a feasible circulation, if one exists.
    ///
    /// Without any demand this is a plain maximum-flow computation. With
    /// demands the network is rewritten first: the pseudonodes lose their
    /// automatic wiring and become the super-source and super-sink, and
    /// each demand `d` on an edge `(u, v)` adds `d` units of super-source
    /// capacity into `v` and `d` units of super-sink capacity out of `u`.
    /// Whenever node demands exist the auxiliary node pair is chained
    /// between the super nodes and the bypass is closed, so node demands
    /// stay enforced alongside any edge demands. The rewrite is rebuilt
    /// from scratch on every call, so re-solving an unchanged instance
    /// yields the same flow.
    pub fn push_relabel(&mut self) {
        if !self.has_demands() {
            self.network.push_relabel();
            return;
        }
        // The pseudonodes stop being flow endpoints and turn into the
        // super-source and super-sink of the reduction.
        self.network.clear_pseudonode_edges();

        let mut target = F::zero();
        for (&e, &demand) in &self.edge_demand {
            debug_assert!(demand > F::zero());
            let from = external_id(e.from);
            let to = external_id(e.to);
            self.network.raise_edge_raw(SOURCE, to, demand);
            self.network.raise_edge_raw(from, SINK, demand);
            target += demand;
        }

        if self.node_demand.values().any(|&d| d != F::zero()) {
            // Chain the auxiliary pair between the super nodes and close
            // the bypass; the node demands must be routed for the flow to
            // saturate, also when edge demands are present.
            if let (Some(ns), Some(nk)) = (self.node_source, self.node_sink) {
                self.network.add_edge_raw(SOURCE, ns, F::max_value());
                self.network.add_edge_raw(nk, SINK, F::max_value());
                self.network.add_edge_raw(nk, ns, F::zero());
                for &d in self.node_demand.values() {
                    if d > F::zero() {
                        target += d;
                    }
                }
            }
        }
        self.target_value = target;

        self.network.push_relabel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_validation() {
        let mut c = Circulation::<i64>::new(3);
        assert_eq!(c.add_edge(SOURCE, 0, 1, 0), Err(Error::PseudonodeNotAllowed));
        assert_eq!(c.add_edge(0, SINK, 1, 0), Err(Error::PseudonodeNotAllowed));
        assert_eq!(c.add_edge(0, 1, 1, -1), Err(Error::NegativeDemand));
        assert_eq!(c.add_edge(0, 1, 1, 2), Err(Error::DemandExceedsCapacity));
        c.add_edge(0, 1, 5, 2).unwrap();
        assert_eq!(c.capacity(0, 1), 5);
        assert_eq!(c.edge_demand(0, 1), 2);
        // clearing the demand drops the record
        c.add_edge(0, 1, 5, 0).unwrap();
        assert_eq!(c.edge_demand(0, 1), 0);
        assert_eq!(c.capacity(0, 1), 5);
    }

    #[test]
    fn test_set_node_demand_validation() {
        let mut c = Circulation::<i64>::new(2);
        assert_eq!(c.set_node_demand(SOURCE, 1), Err(Error::PseudonodeNotAllowed));
        assert_eq!(c.set_node_demand(5, 1), Err(Error::UnknownNode(5)));
        assert_eq!(c.num_nodes(), 2);
        // a zero demand must not allocate the auxiliary nodes
        c.set_node_demand(0, 0).unwrap();
        assert_eq!(c.num_nodes(), 2);
        c.set_node_demand(0, 3).unwrap();
        assert_eq!(c.num_nodes(), 4);
        assert_eq!(c.node_demand(0), 3);
    }

    #[test]
    fn test_no_demands_falls_back_to_maxflow() {
        let mut c = Circulation::<i64>::new(3);
        c.add_edge(0, 1, 4, 0).unwrap();
        c.add_edge(1, 2, 2, 0).unwrap();
        c.push_relabel();
        assert_eq!(c.outflow(), 2);
    }

    #[test]
    fn test_serde() {
        let mut c = Circulation::<i64>::new(3);
        c.add_edge(0, 1, 5, 2).unwrap();
        c.add_edge(1, 2, 5, 2).unwrap();
        c.add_edge(2, 0, 5, 2).unwrap();
        c.push_relabel();

        let serialized = serde_json::to_string(&c).unwrap();
        let d: Circulation<i64> = serde_json::from_str(&serialized).unwrap();
        assert_eq!(d.satisfies_demand(), c.satisfies_demand());
        assert_eq!(d.flow(0, 1), c.flow(0, 1));
        assert_eq!(d.edge_demand(0, 1), 2);
    }
}
