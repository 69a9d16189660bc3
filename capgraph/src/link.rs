// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! The typed provider/requirement links and the default matching
//! primitive, grounded on the `Provider`/`Dependency`
//! split used by `stone`'s metadata payload (`kind` + `name`) and the
//! `ProviderFilter` shape in `moss::registry::transaction`.

use std::collections::HashMap;
use std::fmt;

use log::trace;

use crate::rule::{Cardinality, ProviderRule, RequirementRule};

/// The default instance name used when a rule has none.
pub const DEFAULT_INSTANCE: &str = "default";

/// A capability a resource provides, bound to its owning resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderLink {
    pub kind: String,
    pub instance: Option<String>,
    pub owner: String,
}

impl ProviderLink {
    pub fn from_rule(rule: ProviderRule, owner: impl Into<String>) -> Self {
        ProviderLink {
            kind: rule.kind,
            instance: rule.instance,
            owner: owner.into(),
        }
    }
}

impl fmt::Display for ProviderLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(instance) => write!(f, "{}.{}", self.kind, instance),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// A capability a resource requires, bound to its owning resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementLink {
    pub kind: String,
    pub instance: Option<String>,
    pub modifier: Cardinality,
    pub owner: String,
}

impl RequirementLink {
    pub fn from_rule(rule: RequirementRule, owner: impl Into<String>) -> Self {
        RequirementLink {
            kind: rule.kind,
            instance: rule.instance,
            modifier: rule.modifier,
            owner: owner.into(),
        }
    }

    /// Applies `remap_rules`: when `remap_requirement` is set and
    /// `remap_rules` has an entry for this requirement's kind, the
    /// effective instance becomes the override, unconditionally
    /// overriding any explicit instance already on the requirement
    /// (documented, not silently ignored — see `DESIGN.md`).
    pub fn effective(&self, remap_rules: &HashMap<String, String>, remap_requirement: bool) -> RequirementLink {
        if remap_requirement {
            if let Some(target) = remap_rules.get(&self.kind) {
                return RequirementLink {
                    kind: self.kind.clone(),
                    instance: Some(target.clone()),
                    modifier: self.modifier,
                    owner: self.owner.clone(),
                };
            }
        }
        self.clone()
    }
}

impl fmt::Display for RequirementLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(instance) => write!(f, "{}.{}{}", self.kind, instance, self.modifier),
            None => write!(f, "{}{}", self.kind, self.modifier),
        }
    }
}

/// A candidate provider surfaced in error diagnostics: just enough to
/// let a user add a remap rule or rename a provider, without forcing
/// error variants to own a full `ProviderLink` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub instance: String,
    pub owner: String,
}

impl From<&ProviderLink> for Candidate {
    fn from(p: &ProviderLink) -> Self {
        Candidate {
            instance: p.instance.clone().unwrap_or_else(|| DEFAULT_INSTANCE.to_string()),
            owner: p.owner.clone(),
        }
    }
}

/// A resolved edge: which requirement was satisfied by which provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLink {
    pub requirement: RequirementLink,
    pub provider: ProviderLink,
    pub match_name: String,
}

/// Why a match attempt failed, before the resolver attaches the owning
/// resource name to turn it into a [`crate::error::ResolveError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchFailure {
    Unsatisfied {
        effective: RequirementLink,
        cardinality: Cardinality,
        candidates: Vec<Candidate>,
    },
    Ambiguous {
        effective: RequirementLink,
        candidates: Vec<Candidate>,
    },
}

/// Everything the default matcher (and any override) needs besides the
/// requirement itself and the recursion depth — the capability set of
/// `(requirement, level, context) -> (match_name, providers)`.
pub struct MatchContext<'a> {
    pub provider_index: &'a [ProviderLink],
    pub remap_rules: &'a HashMap<String, String>,
    pub default_mode: Cardinality,
    pub remap_requirement: bool,
}

/// The documented strategy extension point: an
/// implementer may swap this out for environment filtering, feature
/// toggles, priority, or alternative-implementation selection, while
/// still composing with [`default_match`].
pub trait MatchStrategy {
    fn match_requirement(
        &self,
        requirement: &RequirementLink,
        level: usize,
        ctx: &MatchContext<'_>,
    ) -> Result<(String, Vec<ProviderLink>), MatchFailure>;
}

/// The default strategy: kind filter, instance filter with fallback,
/// cardinality enforcement, in catalog/provider-index order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrategy;

impl MatchStrategy for DefaultStrategy {
    fn match_requirement(
        &self,
        requirement: &RequirementLink,
        _level: usize,
        ctx: &MatchContext<'_>,
    ) -> Result<(String, Vec<ProviderLink>), MatchFailure> {
        default_match(requirement, ctx)
    }
}

/// The default matching primitive, public so strategy overrides can
/// fall back to it.
pub fn default_match(
    requirement: &RequirementLink,
    ctx: &MatchContext<'_>,
) -> Result<(String, Vec<ProviderLink>), MatchFailure> {
    let effective = requirement.effective(ctx.remap_rules, ctx.remap_requirement);

    let by_kind: Vec<&ProviderLink> = ctx
        .provider_index
        .iter()
        .filter(|p| p.kind == effective.kind)
        .collect();

    let refined: Vec<&ProviderLink> = match &effective.instance {
        Some(instance) => {
            let exact: Vec<&ProviderLink> = by_kind
                .iter()
                .filter(|p| p.instance.as_deref() == Some(instance.as_str()))
                .copied()
                .collect();
            if exact.is_empty() {
                by_kind
            } else {
                exact
            }
        }
        None => by_kind,
    };

    let match_name = effective
        .instance
        .clone()
        .unwrap_or_else(|| DEFAULT_INSTANCE.to_string());

    let modifier = requirement.modifier;
    let count = refined.len();

    trace!("match {requirement} (effective {effective}): {count} candidate(s)");

    if count < modifier.min() {
        return Err(MatchFailure::Unsatisfied {
            effective,
            cardinality: modifier,
            candidates: refined.iter().map(|p| Candidate::from(*p)).collect(),
        });
    }
    if let Some(max) = modifier.max() {
        if count > max {
            return Err(MatchFailure::Ambiguous {
                effective,
                candidates: refined.iter().map(|p| Candidate::from(*p)).collect(),
            });
        }
    }

    Ok((match_name, refined.into_iter().cloned().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{parse_provider, parse_requirement};

    fn provider(s: &str, owner: &str) -> ProviderLink {
        ProviderLink::from_rule(parse_provider(s).unwrap(), owner)
    }

    fn requirement(s: &str, owner: &str) -> RequirementLink {
        RequirementLink::from_rule(parse_requirement(s).unwrap(), owner)
    }

    #[test]
    fn one_cardinality_succeeds_with_single_provider() {
        let index = vec![provider("database.main", "db")];
        let req = requirement("database.main", "app");
        let ctx = MatchContext {
            provider_index: &index,
            remap_rules: &HashMap::new(),
            default_mode: Cardinality::One,
            remap_requirement: true,
        };
        let (name, providers) = default_match(&req, &ctx).unwrap();
        assert_eq!(name, "main");
        assert_eq!(providers.len(), 1);
    }

    #[test]
    fn one_cardinality_ambiguous_with_two_providers() {
        let index = vec![provider("database.main", "pg"), provider("database.main", "mysql")];
        let req = requirement("database", "app");
        let ctx = MatchContext {
            provider_index: &index,
            remap_rules: &HashMap::new(),
            default_mode: Cardinality::One,
            remap_requirement: true,
        };
        assert!(matches!(default_match(&req, &ctx), Err(MatchFailure::Ambiguous { .. })));
    }

    #[test]
    fn star_cardinality_succeeds_with_any_count() {
        let index = vec![provider("database.main", "pg"), provider("database.main", "mysql")];
        let req = requirement("database*", "app");
        let ctx = MatchContext {
            provider_index: &index,
            remap_rules: &HashMap::new(),
            default_mode: Cardinality::One,
            remap_requirement: true,
        };
        let (_, providers) = default_match(&req, &ctx).unwrap();
        assert_eq!(providers.len(), 2);
    }

    #[test]
    fn optional_absent_succeeds_with_zero() {
        let index: Vec<ProviderLink> = vec![];
        let req = requirement("cache.redis?", "app");
        let ctx = MatchContext {
            provider_index: &index,
            remap_rules: &HashMap::new(),
            default_mode: Cardinality::One,
            remap_requirement: true,
        };
        let (_, providers) = default_match(&req, &ctx).unwrap();
        assert!(providers.is_empty());
    }

    #[test]
    fn required_absent_fails_unsatisfied() {
        let index: Vec<ProviderLink> = vec![];
        let req = requirement("proxy", "app");
        let ctx = MatchContext {
            provider_index: &index,
            remap_rules: &HashMap::new(),
            default_mode: Cardinality::One,
            remap_requirement: true,
        };
        assert!(matches!(default_match(&req, &ctx), Err(MatchFailure::Unsatisfied { .. })));
    }

    #[test]
    fn instance_filter_falls_back_to_kind_set() {
        let index = vec![provider("database.main", "db")];
        let req = requirement("database.replica", "app");
        let ctx = MatchContext {
            provider_index: &index,
            remap_rules: &HashMap::new(),
            default_mode: Cardinality::One,
            remap_requirement: false,
        };
        let (name, providers) = default_match(&req, &ctx).unwrap();
        assert_eq!(name, "replica");
        assert_eq!(providers.len(), 1);
    }

    #[test]
    fn remap_overrides_explicit_instance() {
        let index = vec![provider("database.primary", "pg"), provider("database.secondary", "mysql")];
        let req = requirement("database.secondary", "app");
        let mut remap = HashMap::new();
        remap.insert("database".to_string(), "primary".to_string());
        let ctx = MatchContext {
            provider_index: &index,
            remap_rules: &remap,
            default_mode: Cardinality::One,
            remap_requirement: true,
        };
        let (name, providers) = default_match(&req, &ctx).unwrap();
        assert_eq!(name, "primary");
        assert_eq!(providers[0].owner, "pg");
    }
}
