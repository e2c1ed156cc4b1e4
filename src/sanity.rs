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

//! Validators for solved flow problems.
//!
//! The checks never mutate the instance; each returns the first
//! [`Violation`] it finds. They are meant to certify the output of
//! [`push_relabel`](crate::FlowNetwork::push_relabel): capacities are
//! obeyed, flow is conserved where it must be, no augmenting path
//! remains, and all demands and storage windows are met.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use num_traits::{Bounded, NumAssign, Signed};

use crate::circulation::Circulation;
use crate::network::{external_id, Edge, FlowNetwork, SINK_ID, SOURCE_ID};
use crate::transshipment::Transshipment;

/// A defect found in a solved instance.
#[derive(Debug, PartialEq, Eq)]
pub enum Violation {
    /// The flow along the edge exceeds its capacity.
    CapacityExceeded { from: isize, to: isize },
    /// Flow was recorded on an edge that has no capacity record.
    PhantomFlow { from: isize, to: isize },
    /// The inflow of the node does not equal its outflow.
    Imbalanced(isize),
    /// The residual graph contains a source-sink path, so the flow is
    /// not maximum.
    AugmentingPath,
    /// The flow along the edge is below its demand.
    DemandUnmet { from: isize, to: isize },
    /// The node stores more flow than its maximum storage.
    StorageOverflow(isize),
    /// The node stores less flow than its minimum storage.
    StorageUnderflow(isize),
}

impl fmt::Display for Violation {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        use self::Violation::*;
        match self {
            CapacityExceeded { from, to } => {
                write!(fmt, "flow on edge {} -> {} exceeds its capacity", from, to)
            }
            PhantomFlow { from, to } => write!(
                fmt,
                "flow reported on edge {} -> {} without a capacity record",
                from, to
            ),
            Imbalanced(node) => {
                write!(fmt, "node {} does not have its inflow equal to its outflow", node)
            }
            AugmentingPath => write!(
                fmt,
                "found an augmenting path from source to sink; flow is not maximum"
            ),
            DemandUnmet { from, to } => {
                write!(fmt, "flow on edge {} -> {} is below its demand", from, to)
            }
            StorageOverflow(node) => {
                write!(fmt, "node {} stores more flow than its maximum storage", node)
            }
            StorageUnderflow(node) => {
                write!(fmt, "node {} stores less flow than its minimum storage", node)
            }
        }
    }
}

impl std::error::Error for Violation {}

/// Check a solved flow network.
///
/// Verifies that no edge carries more flow than its capacity, that no
/// flow is recorded on unknown edges and that the residual graph admits
/// no augmenting path. With `enforce_conservation`, the inflow of every
/// user node must equal its outflow.
pub fn flow_network<F>(
    g: &FlowNetwork<F>,
    enforce_conservation: bool,
) -> std::result::Result<(), Violation>
where
    F: NumAssign + Signed + Bounded + Ord + Copy,
{
    let mut balance: HashMap<usize, F> = HashMap::new();
    for (&e, &flow) in g.preflow_map() {
        if let Some(&cap) = g.capacity_map().get(&e) {
            if flow > cap {
                return Err(Violation::CapacityExceeded {
                    from: external_id(e.from),
                    to: external_id(e.to),
                });
            }
            *balance.entry(e.from).or_insert_with(F::zero) -= flow;
            *balance.entry(e.to).or_insert_with(F::zero) += flow;
        } else {
            let reverse_known = g.capacity_map().contains_key(&e.reverse());
            if flow > F::zero() || (flow < F::zero() && !reverse_known) {
                return Err(Violation::PhantomFlow {
                    from: external_id(e.from),
                    to: external_id(e.to),
                });
            }
        }
    }
    if enforce_conservation {
        for (&v, &diff) in &balance {
            if v != SOURCE_ID && v != SINK_ID && diff != F::zero() {
                return Err(Violation::Imbalanced(external_id(v)));
            }
        }
    }
    augmenting_path_check(g)
}

/// Search the residual graph for a source-sink path.
fn augmenting_path_check<F>(g: &FlowNetwork<F>) -> std::result::Result<(), Violation>
where
    F: NumAssign + Signed + Bounded + Ord + Copy,
{
    let mut frontier = VecDeque::new();
    let mut visited = HashSet::new();
    frontier.push_back(SOURCE_ID);
    visited.insert(SOURCE_ID);
    while let Some(u) = frontier.pop_front() {
        for v in 0..g.num_nodes() + 2 {
            if !visited.contains(&v) && g.residual_edge(Edge { from: u, to: v }) > F::zero() {
                if v == SINK_ID {
                    return Err(Violation::AugmentingPath);
                }
                visited.insert(v);
                frontier.push_back(v);
            }
        }
    }
    Ok(())
}

/// Check a solved circulation.
///
/// Includes the [`flow_network`] checks with conservation enforced; the
/// demand of every edge is verified once
/// [`satisfies_demand`](Circulation::satisfies_demand) holds.
pub fn circulation<F>(c: &Circulation<F>) -> std::result::Result<(), Violation>
where
    F: NumAssign + Signed + Bounded + Ord + Copy,
{
    flow_network(c.network(), true)?;
    if !c.satisfies_demand() {
        // nothing more to check unless the demand was satisfied
        return Ok(());
    }
    for &e in c.network().preflow_map().keys() {
        let from = external_id(e.from);
        let to = external_id(e.to);
        if c.flow(from, to) < c.edge_demand(from, to) {
            return Err(Violation::DemandUnmet { from, to });
        }
    }
    Ok(())
}

/// Check a solved transshipment.
///
/// Includes the [`circulation`] and [`flow_network`] checks; conservation
/// is not enforced on the raw network because storage nodes legitimately
/// consume flow. Storage windows are verified against
/// [`node_flow`](Transshipment::node_flow), the lower ends only once
/// [`satisfies_demand`](Transshipment::satisfies_demand) holds.
pub fn transshipment<F>(t: &Transshipment<F>) -> std::result::Result<(), Violation>
where
    F: NumAssign + Signed + Bounded + Ord + Copy,
{
    flow_network(t.circulation().network(), false)?;
    for (&node, b) in t.bounds() {
        if t.node_flow(node) > b.storage_max {
            return Err(Violation::StorageOverflow(node));
        }
    }
    if !t.satisfies_demand() {
        return Ok(());
    }
    for (&node, b) in t.bounds() {
        if t.node_flow(node) < b.storage_min {
            return Err(Violation::StorageUnderflow(node));
        }
    }
    circulation(t.circulation())
}
