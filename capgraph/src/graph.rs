// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! A read-only, renderer-neutral projection of an [`EdgeMap`].
//! PNG/SVG/DOT/JSON emitters are external collaborators; this
//! module only produces the node/edge/cluster data they would consume.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::edge_map::EdgeMap;

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub name: String,
    pub scope: Option<String>,
    pub attrs: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub rule: String,
    pub match_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphCluster {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub clusters: Vec<GraphCluster>,
}

/// Builds the export payload. Nodes come from every resource named in
/// `edge_map` (the synthetic `__build_ctx__` root included, since its
/// edges describe the originally requested features); edges read
/// `from = provider, to = requirer` (the resource that provides the
/// capability, to the resource whose requirement it satisfies); clusters
/// are derived from the `scope` attribute when one
/// is present, grounded on `stone`'s treatment of scope/architecture as
/// an orthogonal grouping over the same flat package list.
pub fn export(catalog: &Catalog, edge_map: &EdgeMap) -> Graph {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut clusters: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, resource_edges) in edge_map.iter() {
        let (scope, attrs) = match catalog.get_resource(name) {
            Ok(resource) => (resource.scope.clone(), resource.attrs.clone()),
            Err(_) => (None, Map::new()),
        };

        if let Some(scope) = &scope {
            clusters.entry(scope.clone()).or_default().push(name.to_string());
        }

        nodes.push(GraphNode {
            name: name.to_string(),
            scope,
            attrs,
        });

        for edge in resource_edges {
            edges.push(GraphEdge {
                from: edge.provider.owner.clone(),
                to: name.to_string(),
                rule: edge.requirement.to_string(),
                match_name: edge.match_name.clone(),
            });
        }
    }

    let clusters = clusters
        .into_iter()
        .map(|(name, members)| GraphCluster { name, members })
        .collect();

    Graph { nodes, edges, clusters }
}
