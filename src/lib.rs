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

//! A library for flow optimization problems on directed graphs.
//!
//! Three kinds of problems are supported, each on top of the previous
//! one:
//!
//! 1. [`FlowNetwork`]: maximum flow from a source to a sink pseudonode,
//!    computed with the relabel-to-front push-relabel algorithm.
//! 2. [`Circulation`]: feasibility of a flow meeting lower bounds on
//!    edges and supplies/demands on nodes.
//! 3. [`Transshipment`]: a circulation in which nodes may store a
//!    bounded amount of flow.
//!
//! Nodes are connected to the pseudonodes automatically until the caller
//! adds an edge incident to [`SOURCE`] or [`SINK`] and takes over the
//! wiring. The [`sanity`] module certifies solved instances, and the
//! [`topsort`](topsort()) function orders the nodes of an acyclic
//! network topologically.

// # Data structures

pub mod network;
pub use self::network::{Error, FlowNetwork, Result, SINK, SOURCE};

pub mod circulation;
pub use self::circulation::Circulation;

pub mod transshipment;
pub use self::transshipment::Transshipment;

pub mod collections;

// # Algorithms

pub mod topsort;
pub use self::topsort::topsort;

pub mod sanity;
