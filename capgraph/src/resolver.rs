// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! The resolution engine: seeds a synthetic root from the
//! requested feature list, walks requirements depth-first building an
//! [`EdgeMap`], then hands the result to [`crate::topo`] for ordering.

use std::collections::HashMap;

use log::debug;

use crate::catalog::Catalog;
use crate::edge_map::EdgeMap;
use crate::error::ResolveError;
use crate::link::{Candidate, DefaultStrategy, MatchContext, MatchFailure, MatchStrategy, ProviderLink, RequirementLink};
use crate::rule::{parse_requirement, Cardinality};
use crate::{index, topo};

/// Name of the synthetic seed resource.
pub const BUILD_CTX: &str = "__build_ctx__";

/// Receives every match decision the resolver makes, without being able
/// to alter semantics. `level` is the walk's recursion depth
/// at the time of the match.
pub trait DebugObserver {
    fn on_match(
        &self,
        level: usize,
        resource: &str,
        requirement: &RequirementLink,
        effective: &RequirementLink,
        candidates: &[Candidate],
        chosen: &[ProviderLink],
    );
}

/// The default observer: routes match decisions to the `log` facade at
/// `trace` level, the same granularity `moss`'s registry code logs
/// candidate lookups at.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl DebugObserver for LogObserver {
    fn on_match(
        &self,
        level: usize,
        resource: &str,
        requirement: &RequirementLink,
        effective: &RequirementLink,
        candidates: &[Candidate],
        chosen: &[ProviderLink],
    ) {
        log::trace!(
            "[level {level}] {resource}: {requirement} (effective {effective}) -> {} of {} candidate(s)",
            chosen.len(),
            candidates.len()
        );
    }
}

pub struct Resolver<'a> {
    catalog: &'a Catalog,
    feature_names: Vec<String>,
    remap_rules: HashMap<String, String>,
    strategy: Box<dyn MatchStrategy>,
    debug: Option<Box<dyn DebugObserver>>,
    provider_index: Vec<ProviderLink>,
    edge_map: EdgeMap,
    dep_order: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog, feature_names: Vec<String>) -> Self {
        let provider_index = index::build_provider_index(catalog);
        Resolver {
            catalog,
            feature_names,
            remap_rules: HashMap::new(),
            strategy: Box::new(DefaultStrategy),
            debug: None,
            provider_index,
            edge_map: EdgeMap::new(),
            dep_order: Vec::new(),
        }
    }

    pub fn with_remap_rules(mut self, remap_rules: HashMap<String, String>) -> Self {
        self.remap_rules = remap_rules;
        self
    }

    pub fn with_debug(mut self, observer: Box<dyn DebugObserver>) -> Self {
        self.debug = Some(observer);
        self
    }

    /// Overrides the default matcher.
    pub fn with_strategy(mut self, strategy: Box<dyn MatchStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn provider_index(&self) -> &[ProviderLink] {
        &self.provider_index
    }

    pub fn edge_map(&self) -> &EdgeMap {
        &self.edge_map
    }

    pub fn dep_order(&self) -> &[String] {
        &self.dep_order
    }

    /// Runs the walk and topological sort. Restarts from a clean state
    /// on every call: subsequent calls to `resolve()` restart from a
    /// clean state; a failed run still leaves
    /// `edge_map()` holding whatever was built before the failure, for
    /// diagnostics.
    pub fn resolve(&mut self) -> Result<Vec<String>, ResolveError> {
        self.edge_map = EdgeMap::new();
        self.dep_order.clear();

        let seed_requirements = self
            .feature_names
            .iter()
            .map(|name| {
                parse_requirement(name)
                    .map(|rule| RequirementLink::from_rule(rule, BUILD_CTX))
                    .map_err(ResolveError::from)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.walk(BUILD_CTX, &seed_requirements, 0)?;

        let dep_order = topo::order(&self.edge_map)?;
        self.dep_order = dep_order.clone();
        Ok(dep_order)
    }

    fn walk(&mut self, current: &str, requirements: &[RequirementLink], level: usize) -> Result<(), ResolveError> {
        if !self.edge_map.ensure(current) {
            return Ok(());
        }
        debug!("[level {level}] entering {current}");

        for requirement in requirements {
            let ctx = MatchContext {
                provider_index: &self.provider_index,
                remap_rules: &self.remap_rules,
                default_mode: Cardinality::One,
                remap_requirement: true,
            };

            let (match_name, providers) = self
                .strategy
                .match_requirement(requirement, level, &ctx)
                .map_err(|failure| to_resolve_error(current, requirement, failure))?;

            if let Some(observer) = &self.debug {
                let effective = requirement.effective(&self.remap_rules, true);
                let candidates: Vec<Candidate> = providers.iter().map(Candidate::from).collect();
                observer.on_match(level, current, requirement, &effective, &candidates, &providers);
            }

            for provider in providers {
                let owner = provider.owner.clone();
                self.edge_map.push(
                    current,
                    crate::link::EdgeLink {
                        requirement: requirement.clone(),
                        provider: provider.clone(),
                        match_name: match_name.clone(),
                    },
                );

                if !self.edge_map.contains(&owner) {
                    let owner_requirements = self.catalog.get_resource(&owner)?.requires.clone();
                    self.walk(&owner, &owner_requirements, level + 1)?;
                }
            }
        }

        debug!("[level {level}] leaving {current}");
        Ok(())
    }
}

fn to_resolve_error(resource: &str, requirement: &RequirementLink, failure: MatchFailure) -> ResolveError {
    match failure {
        MatchFailure::Unsatisfied {
            effective,
            cardinality,
            candidates,
        } => ResolveError::UnsatisfiedRequirement {
            resource: resource.to_string(),
            requirement: requirement.clone(),
            effective,
            cardinality,
            candidates,
        },
        MatchFailure::Ambiguous { effective, candidates } => ResolveError::AmbiguousRequirement {
            resource: resource.to_string(),
            requirement: requirement.clone(),
            effective,
            candidates,
        },
    }
}
