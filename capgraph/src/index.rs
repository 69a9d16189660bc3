// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! A flat, ordered index of every provider link in a catalog.
//! Rebuilt on demand rather than incrementally maintained: catalogs in
//! this domain run to dozens or hundreds of resources, so a linear scan
//! is cheap and avoids keeping a second mutable structure in sync.

use crate::catalog::Catalog;
use crate::link::ProviderLink;

/// Concatenates every resource's `provides` list, resources in catalog
/// order and links within a resource in declaration order.
pub fn build_provider_index(catalog: &Catalog) -> Vec<ProviderLink> {
    catalog
        .iter()
        .flat_map(|resource| resource.provides.iter().cloned())
        .collect()
}
