// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! The resource catalog: an insertion-ordered `name -> Resource` map.
//! Determinism is a contract, so lookups by
//! name go through a `HashMap<String, usize>` index into a `Vec` that
//! preserves declaration order — the same "ordered vector, not hash
//! iteration order" discipline applied to the provider
//! index and `dag`'s node storage.

use std::collections::HashMap;

use crate::error::CatalogError;
use crate::resource::{Resource, ResourceConfig};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a resource. If `name` already exists and
    /// `force` is false, fails with `DuplicateResource`; the catalog is
    /// left unchanged. With `force`, the resource is replaced in place
    /// so insertion order (and hence every downstream tie-break) is
    /// unaffected by the replacement.
    pub fn add_resource(
        &mut self,
        name: impl Into<String>,
        scope: Option<String>,
        config: ResourceConfig,
        force: bool,
    ) -> Result<(), CatalogError> {
        let name = name.into();

        if let Some(&index) = self.index.get(&name) {
            if !force {
                return Err(CatalogError::DuplicateResource(name));
            }
            let resource = Resource::from_config(name, scope, config)?;
            self.resources[index] = resource;
            return Ok(());
        }

        let resource = Resource::from_config(name.clone(), scope, config)?;
        self.index.insert(name, self.resources.len());
        self.resources.push(resource);
        Ok(())
    }

    /// Bulk form of [`Catalog::add_resource`]. Not atomic: a failure
    /// partway through leaves earlier entries added.
    pub fn add_resources(
        &mut self,
        entries: impl IntoIterator<Item = (String, ResourceConfig)>,
        scope: Option<String>,
        force: bool,
    ) -> Result<(), CatalogError> {
        for (name, config) in entries {
            self.add_resource(name, scope.clone(), config, force)?;
        }
        Ok(())
    }

    pub fn get_resource(&self, name: &str) -> Result<&Resource, CatalogError> {
        self.index
            .get(name)
            .map(|&i| &self.resources[i])
            .ok_or_else(|| CatalogError::UnknownResource(name.to_string()))
    }

    /// Resources filtered by `scope` if provided, else all, in
    /// insertion order.
    pub fn get_resources(&self, scope: Option<&str>) -> Vec<&Resource> {
        self.resources
            .iter()
            .filter(|r| match scope {
                Some(s) => r.scope.as_deref() == Some(s),
                None => true,
            })
            .collect()
    }

    /// Ordered iteration over every resource in the catalog.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
