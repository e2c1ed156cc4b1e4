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

use flownet::{topsort, Error, FlowNetwork};

#[test]
fn test_cycle_is_detected() {
    let mut g = FlowNetwork::<i64>::new(3);
    g.add_edge(0, 1, 1).unwrap();
    g.add_edge(1, 2, 1).unwrap();
    g.add_edge(2, 0, 1).unwrap();
    assert_eq!(topsort(&g, |u, v| u < v), Err(Error::Cyclic));
}

#[test]
fn test_cycle_with_acyclic_prefix() {
    let mut g = FlowNetwork::<i64>::new(4);
    g.add_edge(0, 1, 1).unwrap();
    g.add_edge(1, 2, 1).unwrap();
    g.add_edge(2, 3, 1).unwrap();
    g.add_edge(3, 1, 1).unwrap();
    assert_eq!(topsort(&g, |u, v| u < v), Err(Error::Cyclic));
}

#[test]
fn test_order_is_topological() {
    let mut g = FlowNetwork::<i64>::new(5);
    let edges: &[(isize, isize)] = &[(3, 1), (1, 0), (1, 2), (0, 4), (2, 4)];
    for &(u, v) in edges {
        g.add_edge(u, v, 1).unwrap();
    }
    let order = topsort(&g, |u, v| u < v).unwrap();
    assert_eq!(order.len(), 5);
    let position = |x: isize| order.iter().position(|&y| y == x).unwrap();
    for &(u, v) in edges {
        assert!(position(u) < position(v), "edge {} -> {}", u, v);
    }
}

#[test]
fn test_ties_follow_the_comparator() {
    let mut g = FlowNetwork::<i64>::new(4);
    g.add_edge(0, 1, 1).unwrap();
    g.add_edge(0, 2, 1).unwrap();
    g.add_edge(0, 3, 1).unwrap();
    assert_eq!(topsort(&g, |u, v| u < v).unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(topsort(&g, |u, v| u > v).unwrap(), vec![0, 3, 2, 1]);
}

#[test]
fn test_zero_capacity_edges_are_ignored() {
    let mut g = FlowNetwork::<i64>::new(2);
    g.add_edge(0, 1, 1).unwrap();
    // a cycle of zero capacity does not count
    g.add_edge(1, 0, 0).unwrap();
    assert_eq!(topsort(&g, |u, v| u < v).unwrap(), vec![0, 1]);
}
