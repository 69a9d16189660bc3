// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! A named resource carrying provider/requirement links plus an opaque
//! attribute bag, and the structured configuration shape
//! `Catalog::add_resource` ingests, modeled after
//! `stone_recipe::Recipe`'s flatten-plus-catch-all deserialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CatalogError;
use crate::link::{ProviderLink, RequirementLink};
use crate::rule::RuleInput;

/// The wire/config shape accepted by [`crate::catalog::Catalog::add_resource`].
/// `provides`/`requires` entries may be bare rule strings or structured
/// `{kind, instance?, mod?}` maps; any key besides the named
/// ones is stored verbatim in the attribute bag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub provides: Vec<RuleInput>,
    #[serde(default)]
    pub requires: Vec<RuleInput>,
    #[serde(default)]
    pub vars: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A named entity carrying typed capability links and an opaque
/// attribute bag. Every link's `owner` equals this resource's `name`
/// (an invariant every constructor maintains).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub scope: Option<String>,
    pub provides: Vec<ProviderLink>,
    pub requires: Vec<RequirementLink>,
    pub attrs: Map<String, Value>,
}

impl Resource {
    /// Parses `config`'s rule strings/structures into bound links.
    /// Fails the whole resource on the first malformed rule.
    pub fn from_config(name: impl Into<String>, scope: Option<String>, config: ResourceConfig) -> Result<Self, CatalogError> {
        let name = name.into();
        let scope = scope.or(config.scope);

        let provides = config
            .provides
            .iter()
            .map(|rule| rule.to_provider_rule().map(|r| ProviderLink::from_rule(r, name.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let requires = config
            .requires
            .iter()
            .map(|rule| rule.to_requirement_rule().map(|r| RequirementLink::from_rule(r, name.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let mut attrs = config.extra;
        if let Some(desc) = config.desc {
            attrs.insert("desc".to_string(), Value::String(desc));
        }
        if !config.vars.is_empty() {
            attrs.insert("vars".to_string(), Value::Object(config.vars));
        }

        Ok(Resource {
            name,
            scope,
            provides,
            requires,
            attrs,
        })
    }
}
