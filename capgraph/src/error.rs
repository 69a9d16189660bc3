// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Error taxonomy, grounded on `moss::registry::transaction::Error`'s
//! shape: one flat enum, one variant per failure kind, carrying exactly
//! the diagnostic context each failure needs to be actionable.

use thiserror::Error;

use crate::link::{Candidate, RequirementLink};
use crate::rule::Cardinality;

/// Errors raised while building or mutating a [`crate::catalog::Catalog`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("malformed rule: {0}")]
    MalformedRule(String),

    #[error("resource `{0}` already exists in the catalog")]
    DuplicateResource(String),

    #[error("no such resource: `{0}`")]
    UnknownResource(String),
}

/// Errors raised while resolving a feature set against a catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(
        "requirement `{requirement}` on `{resource}` (effective `{effective}`, cardinality `{cardinality}`) found {} candidate(s): {candidates:?}",
        candidates.len()
    )]
    UnsatisfiedRequirement {
        resource: String,
        requirement: RequirementLink,
        effective: RequirementLink,
        cardinality: Cardinality,
        candidates: Vec<Candidate>,
    },

    #[error(
        "requirement `{requirement}` on `{resource}` (effective `{effective}`) is ambiguous: {candidates:?}"
    )]
    AmbiguousRequirement {
        resource: String,
        requirement: RequirementLink,
        effective: RequirementLink,
        candidates: Vec<Candidate>,
    },

    #[error("dependency cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },
}
