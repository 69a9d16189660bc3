// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Turns an [`EdgeMap`] into an initialization order, via the `dag`
//! crate's three-color DFS.

use dag::Dag;

use crate::edge_map::EdgeMap;
use crate::error::ResolveError;

/// Builds a dependency graph from `edge_map` (a resource depends on the
/// owner of each provider it was matched against) and topologically
/// sorts it. Nodes are added to the `Dag` in `edge_map`'s visitation
/// order, which is what makes the result deterministic for a given
/// resolver run.
pub fn order(edge_map: &EdgeMap) -> Result<Vec<String>, ResolveError> {
    let mut dag: Dag<String> = Dag::new();

    for (name, _) in edge_map.iter() {
        dag.add_node_or_get_index(name.to_string());
    }

    for (name, edges) in edge_map.iter() {
        let from = dag.add_node_or_get_index(name.to_string());
        for edge in edges {
            let to = dag.add_node_or_get_index(edge.provider.owner.clone());
            dag.add_edge(from, to);
        }
    }

    dag.toposort()
        .map_err(|cycle| ResolveError::CycleDetected { path: cycle.path })
}
