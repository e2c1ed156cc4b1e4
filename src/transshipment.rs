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

//! Transshipments: circulations with node storage.
//!
//! A [`Transshipment`] relaxes a circulation by letting each node keep
//! some amount of flow instead of forwarding it, within a per-node
//! storage window. This models networks in which flow leaks or is
//! consumed at certain points. A transshipment is reduced to a
//! circulation by routing the stored flow over an extra edge into a
//! single auxiliary *leak* node, bounded by the storage window.
//!
//! # Example
//!
//! ```
//! use flownet::Transshipment;
//!
//! let mut t = Transshipment::<i64>::new(2);
//! t.add_edge(0, 1, 10, 0).unwrap();
//! t.set_node_bounds(1, 0, 4).unwrap();
//!
//! t.push_relabel();
//!
//! assert_eq!(t.outflow(), 4);
//! assert_eq!(t.node_flow(1), 4);
//! ```

use std::collections::HashMap;

use num_traits::{Bounded, NumAssign, Signed};
use serde_derive::{Deserialize, Serialize};

use crate::circulation::Circulation;
use crate::network::{Error, Result, SINK, SOURCE};

/// The storage window of a node.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub(crate) struct Bounds<F> {
    pub(crate) storage_min: F,
    pub(crate) storage_max: F,
}

/// A circulation in which nodes may store flow.
///
/// By default every node stores nothing; a storage window is opened with
/// [`set_node_bounds`](Transshipment::set_node_bounds).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transshipment<F = i64> {
    circulation: Circulation<F>,
    bounds: HashMap<isize, Bounds<F>>,
    /// Auxiliary node absorbing all stored flow.
    leak_node: Option<isize>,
}

impl<F> Transshipment<F>
where
    F: NumAssign + Signed + Bounded + Ord + Copy,
{
    /// Create a transshipment with `num_nodes` user nodes.
    pub fn new(num_nodes: usize) -> Self {
        Transshipment {
            circulation: Circulation::new(num_nodes),
            bounds: HashMap::new(),
            leak_node: None,
        }
    }

    /// Return the underlying circulation.
    pub fn circulation(&self) -> &Circulation<F> {
        &self.circulation
    }

    /// Return the number of user nodes, auxiliary nodes included.
    pub fn num_nodes(&self) -> usize {
        self.circulation.num_nodes()
    }

    /// Set the capacity and demand of an edge.
    pub fn add_edge(&mut self, from: isize, to: isize, capacity: F, demand: F) -> Result<()> {
        self.circulation.add_edge(from, to, capacity, demand)
    }

    /// Set the demand of a node.
    pub fn set_node_demand(&mut self, node: isize, demand: F) -> Result<()> {
        self.circulation.set_node_demand(node, demand)
    }

    /// Set the bounds on the amount of flow a node may store.
    pub fn set_node_bounds(&mut self, node: isize, storage_min: F, storage_max: F) -> Result<()> {
        if node == SOURCE || node == SINK {
            return Err(Error::PseudonodeNotAllowed);
        }
        if node < 0 || node >= self.circulation.num_nodes() as isize {
            return Err(Error::UnknownNode(node));
        }
        if storage_min < F::zero() {
            return Err(Error::NegativeStorage);
        }
        if storage_max < storage_min {
            return Err(Error::StorageBoundsReversed);
        }
        self.bounds.insert(
            node,
            Bounds {
                storage_min,
                storage_max,
            },
        );
        Ok(())
    }

    pub(crate) fn bounds(&self) -> &HashMap<isize, Bounds<F>> {
        &self.bounds
    }

    /// Return the amount of flow stored at a node.
    ///
    /// The value is only meaningful once
    /// [`push_relabel`](Transshipment::push_relabel) has been run.
    pub fn node_flow(&self, node: isize) -> F {
        match self.leak_node {
            Some(leak) => self.circulation.flow(node, leak),
            None => F::zero(),
        }
    }

    /// Return the flow along an edge including its demand.
    pub fn flow(&self, from: isize, to: isize) -> F {
        self.circulation.flow(from, to)
    }

    /// Return the total amount of flow circulating through the network.
    pub fn outflow(&self) -> F {
        self.circulation.outflow()
    }

    /// Return `true` iff the computed flow meets every demand.
    pub fn satisfies_demand(&self) -> bool {
        self.circulation.satisfies_demand()
    }

    /// Find a valid transshipment, if one exists.
    ///
    /// Stored flow is drained over one auxiliary leak node: every bounded
    /// node gets a circulation edge to the leak node with the storage
    /// window as capacity and demand. The storage edges are refreshed on
    /// every call, so bounds may change between solves.
    pub fn push_relabel(&mut self) {
        let leak = match self.leak_node {
            Some(leak) => leak,
            None => {
                let leak = self.circulation.add_node();
                self.leak_node = Some(leak);
                leak
            }
        };
        for (&node, b) in &self.bounds {
            self.circulation
                .add_edge(node, leak, b.storage_max, b.storage_min)
                .expect("storage bounds are validated when they are set");
        }
        self.circulation.push_relabel();
    }
}
