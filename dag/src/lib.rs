// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! A minimal directed-graph wrapper around [`petgraph`] used to track
//! capability edges and produce a deterministic topological order.

use std::collections::HashMap;

use petgraph::prelude::{DiGraph, NodeIndex as PgNodeIndex};
use petgraph::Direction::Outgoing;

pub type NodeIndex = PgNodeIndex<u32>;

/// Simplistic encapsulation of petgraph APIs, trimmed to exactly the
/// operations the resolver needs: build up nodes/edges incrementally,
/// then resolve a topological order or a cycle.
#[derive(Debug, Clone)]
pub struct Dag<N>(DiGraph<N, (), u32>);

impl<N> Default for Dag<N> {
    fn default() -> Self {
        Self(DiGraph::default())
    }
}

impl<N> Dag<N>
where
    N: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds node `N` to the graph and returns the index. If `N` already
    /// exists, returns the index of the existing node.
    pub fn add_node_or_get_index(&mut self, node: N) -> NodeIndex {
        if let Some(index) = self.get_index(&node) {
            index
        } else {
            self.0.add_node(node)
        }
    }

    pub fn node_exists(&self, node: &N) -> bool {
        self.get_index(node).is_some()
    }

    pub fn get_index(&self, node: &N) -> Option<NodeIndex> {
        self.0.node_indices().find(|i| self.0[*i] == *node)
    }

    /// Add an edge `from -> to` meaning "`from` depends on `to`", i.e.
    /// `to` must be initialized before `from`. Unlike moss's transaction
    /// graph this does not refuse cyclical edges up front: cycles are a
    /// resolve-time error, detected by [`Dag::toposort`], so callers can
    /// report the offending path.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if self.0.find_edge(from, to).is_none() {
            self.0.add_edge(from, to, ());
        }
    }

    pub fn iter_nodes(&self) -> impl Iterator<Item = &'_ N> {
        self.0.node_indices().map(|i| &self.0[i])
    }

    /// Depth-first topological sort with three-color cycle detection.
    ///
    /// A post-order DFS over `from -> to` (depends-on) edges already
    /// yields dependencies before dependents, with no final reversal
    /// needed. Nodes are visited in ascending [`NodeIndex`] order (the
    /// order they were first added), and each node's outgoing edges are
    /// walked in the order they were added. Petgraph's `Graph` stores
    /// each node's edge list as a singly linked list built by
    /// prepending, so `neighbors_directed` yields them in reverse
    /// insertion order; we collect and reverse to restore forward order
    /// before recursing.
    pub fn toposort(&self) -> Result<Vec<N>, Cycle<N>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Color {
            Gray,
            Black,
        }

        // absence from `color` means white (unvisited)
        let mut color: HashMap<NodeIndex, Color> = HashMap::new();
        let mut order = Vec::with_capacity(self.0.node_count());
        let mut stack: Vec<NodeIndex> = Vec::new();

        for start in self.0.node_indices() {
            if matches!(color.get(&start), Some(Color::Black)) {
                continue;
            }
            visit(self, start, &mut color, &mut order, &mut stack)?;
        }

        return Ok(order);

        fn visit<N: Clone>(
            dag: &Dag<N>,
            node: NodeIndex,
            color: &mut HashMap<NodeIndex, Color>,
            order: &mut Vec<N>,
            stack: &mut Vec<NodeIndex>,
        ) -> Result<(), Cycle<N>> {
            match color.get(&node) {
                Some(Color::Black) => return Ok(()),
                Some(Color::Gray) => {
                    let start = stack.iter().position(|&n| n == node).unwrap_or(0);
                    let path = stack[start..]
                        .iter()
                        .chain(std::iter::once(&node))
                        .map(|&i| dag.0[i].clone())
                        .collect();
                    return Err(Cycle { path });
                }
                _ => {}
            }

            color.insert(node, Color::Gray);
            stack.push(node);

            let mut children: Vec<NodeIndex> =
                dag.0.neighbors_directed(node, Outgoing).collect();
            children.reverse();
            for child in children {
                visit(dag, child, color, order, stack)?;
            }

            stack.pop();
            color.insert(node, Color::Black);
            order.push(dag.0[node].clone());
            Ok(())
        }
    }
}

/// A detected cycle, carrying the path of nodes from the first repeated
/// node back to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle<N> {
    pub path: Vec<N>,
}
