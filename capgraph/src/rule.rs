// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Parsing of the `kind[.instance][mod]` rule grammar into structured
//! templates, and the cardinality modifier table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// `!`, `?`, `+`, `*` — how many providers may satisfy a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Cardinality {
    #[strum(serialize = "!")]
    One,
    #[strum(serialize = "?")]
    ZeroOrOne,
    #[strum(serialize = "+")]
    OneOrMany,
    #[strum(serialize = "*")]
    ZeroOrMany,
}

impl Cardinality {
    pub fn min(self) -> usize {
        match self {
            Cardinality::One | Cardinality::OneOrMany => 1,
            Cardinality::ZeroOrOne | Cardinality::ZeroOrMany => 0,
        }
    }

    pub fn max(self) -> Option<usize> {
        match self {
            Cardinality::One | Cardinality::ZeroOrOne => Some(1),
            Cardinality::OneOrMany | Cardinality::ZeroOrMany => None,
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            '!' => Some(Cardinality::One),
            '?' => Some(Cardinality::ZeroOrOne),
            '+' => Some(Cardinality::OneOrMany),
            '*' => Some(Cardinality::ZeroOrMany),
            _ => None,
        }
    }

    /// Accepts both the symbol and the long-name synonym.
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "one" => Some(Cardinality::One),
            "zero_or_one" => Some(Cardinality::ZeroOrOne),
            "one_or_many" => Some(Cardinality::OneOrMany),
            "zero_or_many" => Some(Cardinality::ZeroOrMany),
            _ => None,
        }
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Cardinality::One
    }
}

/// An identifier is non-empty and drawn from `[A-Za-z0-9_-]`.
fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn split_kind_instance(rest: &str) -> Result<(String, Option<String>), CatalogError> {
    let mut parts = rest.splitn(2, '.');
    let kind = parts.next().unwrap_or_default();
    let remainder = parts.next();

    if !is_ident(kind) {
        return Err(CatalogError::MalformedRule(format!(
            "empty or invalid kind in rule `{rest}`"
        )));
    }

    let instance = match remainder {
        None => None,
        Some(instance) => {
            if instance.contains('.') {
                return Err(CatalogError::MalformedRule(format!(
                    "at most one `.` allowed in rule `{rest}`"
                )));
            }
            if !is_ident(instance) {
                return Err(CatalogError::MalformedRule(format!(
                    "empty or invalid instance in rule `{rest}`"
                )));
            }
            Some(instance.to_string())
        }
    };

    Ok((kind.to_string(), instance))
}

/// The parsed shape of a provider rule: providers carry no cardinality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRule {
    pub kind: String,
    pub instance: Option<String>,
}

/// The parsed shape of a requirement rule, with its cardinality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementRule {
    pub kind: String,
    pub instance: Option<String>,
    pub modifier: Cardinality,
}

/// Parse a provider rule string. Providers never carry a modifier; one
/// present in the string is stripped and ignored rather than treated as
/// malformed (see the open question decisions in `DESIGN.md`).
pub fn parse_provider(input: &str) -> Result<ProviderRule, CatalogError> {
    let trimmed = strip_modifier(input).0;
    let (kind, instance) = split_kind_instance(trimmed)?;
    Ok(ProviderRule { kind, instance })
}

/// Parse a requirement rule string. A trailing `! ? + *` is consumed as
/// the modifier; absence defaults to `!` (one).
pub fn parse_requirement(input: &str) -> Result<RequirementRule, CatalogError> {
    let (rest, modifier) = strip_modifier(input);
    let (kind, instance) = split_kind_instance(rest)?;
    Ok(RequirementRule {
        kind,
        instance,
        modifier: modifier.unwrap_or_default(),
    })
}

fn strip_modifier(input: &str) -> (&str, Option<Cardinality>) {
    match input.chars().last().and_then(Cardinality::from_symbol) {
        Some(modifier) => (&input[..input.len() - 1], Some(modifier)),
        None => (input, None),
    }
}

/// Structured form accepted alongside bare rule strings: either a plain
/// rule string or `{kind, instance?, mod?}`. Both are routed
/// through the same textual parser so malformed input is detected in one
/// place, mirroring `stone_recipe`'s `KeyValue<T>` flatten approach of
/// normalizing heterogeneous YAML shapes at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleInput {
    Text(String),
    Structured {
        kind: String,
        #[serde(default)]
        instance: Option<String>,
        #[serde(default, rename = "mod")]
        modifier: Option<String>,
    },
}

impl RuleInput {
    pub fn to_provider_rule(&self) -> Result<ProviderRule, CatalogError> {
        match self {
            RuleInput::Text(s) => parse_provider(s),
            RuleInput::Structured { kind, instance, .. } => {
                if !is_ident(kind) {
                    return Err(CatalogError::MalformedRule(format!(
                        "empty or invalid kind `{kind}`"
                    )));
                }
                if let Some(instance) = instance {
                    if !is_ident(instance) {
                        return Err(CatalogError::MalformedRule(format!(
                            "empty or invalid instance `{instance}`"
                        )));
                    }
                }
                Ok(ProviderRule {
                    kind: kind.clone(),
                    instance: instance.clone(),
                })
            }
        }
    }

    pub fn to_requirement_rule(&self) -> Result<RequirementRule, CatalogError> {
        match self {
            RuleInput::Text(s) => parse_requirement(s),
            RuleInput::Structured {
                kind,
                instance,
                modifier,
            } => {
                if !is_ident(kind) {
                    return Err(CatalogError::MalformedRule(format!(
                        "empty or invalid kind `{kind}`"
                    )));
                }
                if let Some(instance) = instance {
                    if !is_ident(instance) {
                        return Err(CatalogError::MalformedRule(format!(
                            "empty or invalid instance `{instance}`"
                        )));
                    }
                }
                let modifier = match modifier {
                    None => Cardinality::default(),
                    Some(raw) => parse_modifier(raw)?,
                };
                Ok(RequirementRule {
                    kind: kind.clone(),
                    instance: instance.clone(),
                    modifier,
                })
            }
        }
    }
}

fn parse_modifier(raw: &str) -> Result<Cardinality, CatalogError> {
    if let Some(c) = raw.chars().next().filter(|_| raw.chars().count() == 1) {
        if let Some(modifier) = Cardinality::from_symbol(c) {
            return Ok(modifier);
        }
    }
    Cardinality::from_name(raw)
        .ok_or_else(|| CatalogError::MalformedRule(format!("unknown cardinality `{raw}`")))
}

impl fmt::Display for ProviderRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(instance) => write!(f, "{}.{}", self.kind, instance),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl fmt::Display for RequirementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance {
            Some(instance) => write!(f, "{}.{}{}", self.kind, instance, self.modifier),
            None => write!(f, "{}{}", self.kind, self.modifier),
        }
    }
}
