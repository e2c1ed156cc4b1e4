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

use flownet::{sanity, FlowNetwork, SINK, SOURCE};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_classic_max_flow() {
    let edges: &[(isize, isize, i64)] = &[
        (0, 1, 15),
        (0, 2, 4),
        (1, 3, 12),
        (3, 2, 3),
        (2, 4, 10),
        (4, 1, 5),
        (4, 5, 10),
        (3, 5, 7),
    ];
    let mut g = FlowNetwork::<i64>::new(6);
    for &(u, v, cap) in edges {
        g.add_edge(u, v, cap).unwrap();
    }

    g.push_relabel();

    assert_eq!(g.outflow(), 14);

    let expected: &[(isize, isize, i64)] = &[
        (0, 1, 10),
        (0, 2, 4),
        (1, 3, 10),
        (3, 2, 3),
        (2, 4, 7),
        (4, 1, 0),
        (4, 5, 7),
        (3, 5, 7),
    ];
    for &(u, v, flow) in expected {
        assert_eq!(g.flow(u, v), flow, "edge {} -> {}", u, v);
    }

    assert_eq!(sanity::flow_network(&g, true), Ok(()));
}

#[test]
fn test_flow_respects_capacities() {
    let mut g = FlowNetwork::<i64>::new(6);
    for &(u, v, cap) in &[
        (0, 1, 15),
        (0, 2, 4),
        (1, 3, 12),
        (3, 2, 3),
        (2, 4, 10),
        (4, 1, 5),
        (4, 5, 10),
        (3, 5, 7),
    ] {
        g.add_edge(u, v, cap).unwrap();
    }
    g.push_relabel();
    for u in 0..6 {
        for v in 0..6 {
            assert!(g.flow(u, v) <= g.capacity(u, v), "edge {} -> {}", u, v);
            assert!(g.flow(u, v) >= 0, "edge {} -> {}", u, v);
        }
    }
}

#[test]
fn test_resolve_is_idempotent() {
    let mut g = FlowNetwork::<i64>::new(6);
    for &(u, v, cap) in &[
        (0, 1, 15),
        (0, 2, 4),
        (1, 3, 12),
        (3, 2, 3),
        (2, 4, 10),
        (4, 1, 5),
        (4, 5, 10),
        (3, 5, 7),
    ] {
        g.add_edge(u, v, cap).unwrap();
    }
    g.push_relabel();
    let outflow = g.outflow();
    let mut flows = vec![];
    for u in 0..6 {
        for v in 0..6 {
            flows.push(g.flow(u, v));
        }
    }
    g.push_relabel();
    assert_eq!(g.outflow(), outflow);
    let mut again = vec![];
    for u in 0..6 {
        for v in 0..6 {
            again.push(g.flow(u, v));
        }
    }
    assert_eq!(flows, again);
}

#[test]
fn test_resolve_after_growing() {
    let mut g = FlowNetwork::<i64>::new(3);
    g.add_edge(0, 1, 4).unwrap();
    g.add_edge(1, 2, 6).unwrap();
    g.push_relabel();
    assert_eq!(g.outflow(), 4);

    // widen the bottleneck over a new node and solve again
    let w = g.add_node();
    g.add_edge(0, w, 3).unwrap();
    g.add_edge(w, 2, 3).unwrap();
    g.push_relabel();
    assert_eq!(g.outflow(), 7);
    assert_eq!(sanity::flow_network(&g, true), Ok(()));
}

#[test]
fn test_manual_source_mode() {
    let mut g = FlowNetwork::<i64>::new(3);
    g.add_edge(SOURCE, 0, 5).unwrap();
    assert_eq!(g.capacity(SOURCE, 0), 5);
    assert_eq!(g.capacity(SOURCE, 1), 0);
    assert_eq!(g.capacity(SOURCE, 2), 0);
    for v in 0..3 {
        assert_eq!(g.capacity(v, SINK), i64::max_value());
    }
}

#[test]
fn test_stale_flow_is_not_maximum() {
    let mut g = FlowNetwork::<i64>::new(3);
    g.add_edge(0, 1, 5).unwrap();
    g.add_edge(1, 2, 2).unwrap();
    g.push_relabel();
    assert_eq!(sanity::flow_network(&g, true), Ok(()));

    // raising a capacity without re-solving opens an augmenting path
    g.add_edge(1, 2, 9).unwrap();
    assert_eq!(
        sanity::flow_network(&g, true),
        Err(sanity::Violation::AugmentingPath)
    );
    g.push_relabel();
    assert_eq!(sanity::flow_network(&g, true), Ok(()));
}

/// Kuhn's augmenting-path algorithm, used as an independent maximum
/// matching oracle.
fn max_matching(n_right: usize, adj: &[Vec<usize>]) -> usize {
    fn try_augment(
        u: usize,
        adj: &[Vec<usize>],
        seen: &mut [bool],
        matched: &mut [Option<usize>],
    ) -> bool {
        for &v in &adj[u] {
            if !seen[v] {
                seen[v] = true;
                if matched[v].map_or(true, |w| try_augment(w, adj, seen, matched)) {
                    matched[v] = Some(u);
                    return true;
                }
            }
        }
        false
    }

    let mut matched: Vec<Option<usize>> = vec![None; n_right];
    let mut result = 0;
    for u in 0..adj.len() {
        let mut seen = vec![false; n_right];
        if try_augment(u, adj, &mut seen, &mut matched) {
            result += 1;
        }
    }
    result
}

#[test]
fn test_bipartite_matching() {
    const LEFT: usize = 10;
    const RIGHT: usize = 10;

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut adj = vec![vec![]; LEFT];
        for l in 0..LEFT {
            for r in 0..RIGHT {
                if rng.gen_bool(0.3) {
                    adj[l].push(r);
                }
            }
        }

        // Nodes 0..LEFT are unit gates in front of the left layer, so a
        // left node cannot emit more than one unit no matter how the
        // source edge is saturated.
        let mut g = FlowNetwork::<i64>::new(2 * LEFT + RIGHT);
        for l in 0..LEFT as isize {
            g.add_edge(l, LEFT as isize + l, 1).unwrap();
        }
        for (l, targets) in adj.iter().enumerate() {
            for &r in targets {
                g.add_edge((LEFT + l) as isize, (2 * LEFT + r) as isize, 1)
                    .unwrap();
            }
        }
        for r in 0..RIGHT as isize {
            g.add_edge(2 * LEFT as isize + r, SINK, 1).unwrap();
        }

        g.push_relabel();

        assert_eq!(
            g.outflow() as usize,
            max_matching(RIGHT, &adj),
            "seed {}",
            seed
        );
        assert_eq!(sanity::flow_network(&g, true), Ok(()), "seed {}", seed);
    }
}
