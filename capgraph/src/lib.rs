// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! `capgraph` resolves a declarative capability dependency graph:
//! resources declare typed capabilities they provide and require (with
//! cardinality), a seed set of requested features drives a walk that
//! builds the edge graph, and the edge graph is topologically sorted
//! into an initialization order.
//!
//! Out of scope, handled by collaborators outside this crate: persisted
//! resource definitions, configuration file loading/merging, and
//! PNG/DOT rendering of [`graph::export`]'s payload.

pub mod catalog;
pub mod edge_map;
pub mod error;
pub mod graph;
pub mod index;
pub mod link;
pub mod resolver;
pub mod resource;
pub mod rule;
mod topo;

pub use catalog::Catalog;
pub use edge_map::EdgeMap;
pub use error::{CatalogError, ResolveError};
pub use link::{Candidate, DefaultStrategy, EdgeLink, MatchContext, MatchFailure, MatchStrategy, ProviderLink, RequirementLink};
pub use resolver::{DebugObserver, LogObserver, Resolver, BUILD_CTX};
pub use resource::{Resource, ResourceConfig};
pub use rule::Cardinality;
