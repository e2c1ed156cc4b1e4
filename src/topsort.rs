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

//! Topological sorting of flow networks.
//!
//! # Example
//!
//! ```
//! use flownet::{topsort, FlowNetwork};
//!
//! let mut g = FlowNetwork::<i64>::new(4);
//! g.add_edge(3, 1, 1).unwrap();
//! g.add_edge(1, 0, 1).unwrap();
//! g.add_edge(1, 2, 1).unwrap();
//!
//! let order = topsort(&g, |u, v| u < v).unwrap();
//! assert_eq!(order, vec![3, 1, 0, 2]);
//! ```

use std::collections::HashSet;

use num_traits::{Bounded, NumAssign, Signed};

use crate::collections::BinHeap;
use crate::network::{external_id, Error, FlowNetwork, Result, SINK_ID, SOURCE_ID};

/// Compute a topological order of the user nodes.
///
/// Only edges with positive capacity are considered. The sort starts
/// from the nodes without incoming edges (the source pseudonode is
/// always among them) and breaks ties between simultaneously ready
/// nodes with the `less` comparator. The pseudonodes are excluded from
/// the result, but a pseudonode that is ready alongside user nodes
/// still takes part in comparisons, as [`SOURCE`](crate::SOURCE) or
/// [`SINK`](crate::SINK). If the capacity graph contains a directed
/// cycle, [`Error::Cyclic`] is returned.
pub fn topsort<F, L>(g: &FlowNetwork<F>, less: L) -> Result<Vec<isize>>
where
    F: NumAssign + Signed + Bounded + Ord + Copy,
    L: Fn(isize, isize) -> bool,
{
    let slots = g.num_nodes() + 2;

    // remaining unvisited in-neighbors of every slot
    let mut unvisited: Vec<HashSet<usize>> = vec![HashSet::new(); slots];
    for (&e, &cap) in g.capacity_map() {
        if cap > F::zero() {
            unvisited[e.to].insert(e.from);
        }
    }

    let mut roots = BinHeap::new(|&u: &usize, &v: &usize| less(external_id(u), external_id(v)));
    let mut ready = vec![false; slots];
    for v in 0..slots {
        if unvisited[v].is_empty() {
            ready[v] = true;
            if v != SINK_ID {
                roots.push(v);
            }
        }
    }

    let mut result = Vec::with_capacity(g.num_nodes());
    while let Some(next) = roots.pop_min() {
        if next != SOURCE_ID && next != SINK_ID {
            result.push(external_id(next));
        }
        for &v in g.neighbors(next) {
            unvisited[v].remove(&next);
            if unvisited[v].is_empty() && !ready[v] {
                ready[v] = true;
                if v != SINK_ID {
                    roots.push(v);
                }
            }
        }
    }

    if unvisited.iter().any(|set| !set.is_empty()) {
        return Err(Error::Cyclic);
    }
    Ok(result)
}
