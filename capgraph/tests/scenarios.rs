// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! End-to-end resolution scenarios, run as black-box tests against the
//! public `Catalog`/`Resolver` API.

use std::collections::HashMap;

use capgraph::{Catalog, ResolveError, Resolver, ResourceConfig, BUILD_CTX};

fn config(provides: &[&str], requires: &[&str]) -> ResourceConfig {
    serde_json::from_value(serde_json::json!({
        "provides": provides,
        "requires": requires,
    }))
    .unwrap()
}

fn add(catalog: &mut Catalog, name: &str, provides: &[&str], requires: &[&str]) {
    catalog
        .add_resource(name, None, config(provides, requires), false)
        .unwrap();
}

#[test]
fn scenario_1_linear_chain() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "database", &["database.main"], &[]);
    add(&mut catalog, "application", &["app.web"], &["database.main"]);
    add(&mut catalog, "proxy", &[], &["app.web"]);

    let mut resolver = Resolver::new(&catalog, vec!["app.web".to_string()]);
    let order = resolver.resolve().unwrap();
    assert_eq!(order, vec!["database", "application", BUILD_CTX]);
}

#[test]
fn scenario_1_unprovided_feature_is_unsatisfied() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "database", &["database.main"], &[]);
    add(&mut catalog, "application", &["app.web"], &["database.main"]);
    add(&mut catalog, "proxy", &[], &["app.web"]);

    let mut resolver = Resolver::new(&catalog, vec!["proxy".to_string()]);
    let err = resolver.resolve().unwrap_err();
    assert!(matches!(err, ResolveError::UnsatisfiedRequirement { .. }));
}

#[test]
fn scenario_2_optional_absent() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "db", &["database.main"], &[]);
    add(&mut catalog, "app", &["app.web"], &["database.main", "cache.redis?"]);

    let mut resolver = Resolver::new(&catalog, vec!["app.web".to_string()]);
    let order = resolver.resolve().unwrap();
    assert_eq!(order, vec!["db", "app", BUILD_CTX]);
    assert_eq!(resolver.edge_map().get("app").unwrap().len(), 1);
    assert_eq!(resolver.edge_map().get("app").unwrap()[0].provider.owner, "db");
}

#[test]
fn scenario_3_ambiguous_without_remap() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "pg", &["database.main"], &[]);
    add(&mut catalog, "mysql", &["database.main"], &[]);
    add(&mut catalog, "app", &["app.web"], &["database"]);

    let mut resolver = Resolver::new(&catalog, vec!["app.web".to_string()]);
    let err = resolver.resolve().unwrap_err();
    match err {
        ResolveError::AmbiguousRequirement { candidates, .. } => {
            assert_eq!(candidates.len(), 2);
            assert!(candidates.iter().all(|c| c.instance == "main"));
        }
        other => panic!("expected AmbiguousRequirement, got {other:?}"),
    }
}

#[test]
fn scenario_4_remap_disambiguates() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "pg", &["database.primary"], &[]);
    add(&mut catalog, "mysql", &["database.secondary"], &[]);
    add(&mut catalog, "app", &["app.web"], &["database"]);

    let mut remap = HashMap::new();
    remap.insert("database".to_string(), "primary".to_string());

    let mut resolver = Resolver::new(&catalog, vec!["app.web".to_string()]).with_remap_rules(remap);
    let order = resolver.resolve().unwrap();
    assert_eq!(order, vec!["pg", "app", BUILD_CTX]);
    assert!(!order.contains(&"mysql".to_string()));
}

#[test]
fn scenario_5_plus_cardinality() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "w1", &["worker.a"], &[]);
    add(&mut catalog, "w2", &["worker.b"], &[]);
    add(&mut catalog, "sched", &["sched.main"], &["worker+"]);

    let mut resolver = Resolver::new(&catalog, vec!["sched.main".to_string()]);
    let order = resolver.resolve().unwrap();

    let sched_index = order.iter().position(|n| n == "sched").unwrap();
    let w1_index = order.iter().position(|n| n == "w1").unwrap();
    let w2_index = order.iter().position(|n| n == "w2").unwrap();
    assert!(w1_index < sched_index);
    assert!(w2_index < sched_index);
    assert_eq!(order.last().unwrap(), BUILD_CTX);

    assert_eq!(resolver.edge_map().get("sched").unwrap().len(), 2);
}

#[test]
fn scenario_6_cycle() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "a", &["cap.a"], &["cap.b"]);
    add(&mut catalog, "b", &["cap.b"], &["cap.a"]);

    let mut resolver = Resolver::new(&catalog, vec!["cap.a".to_string()]);
    let err = resolver.resolve().unwrap_err();
    match err {
        ResolveError::CycleDetected { path } => {
            assert!(path.contains(&"a".to_string()));
            assert!(path.contains(&"b".to_string()));
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn zero_features_yields_only_synthetic_root() {
    let catalog = Catalog::new();
    let mut resolver = Resolver::new(&catalog, vec![]);
    let order = resolver.resolve().unwrap();
    assert_eq!(order, vec![BUILD_CTX]);
    assert_eq!(resolver.edge_map().len(), 1);
    assert!(resolver.edge_map().get(BUILD_CTX).unwrap().is_empty());
}

#[test]
fn unreachable_resources_are_absent_from_dep_order() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "used", &["app.web"], &[]);
    add(&mut catalog, "unused", &["app.admin"], &[]);

    let mut resolver = Resolver::new(&catalog, vec!["app.web".to_string()]);
    let order = resolver.resolve().unwrap();
    assert!(order.contains(&"used".to_string()));
    assert!(!order.contains(&"unused".to_string()));
}

#[test]
fn self_provided_and_required_capability_is_a_cycle() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "a", &["x.y"], &["x.y"]);

    let mut resolver = Resolver::new(&catalog, vec!["x.y".to_string()]);
    let err = resolver.resolve().unwrap_err();
    assert!(matches!(err, ResolveError::CycleDetected { .. }));
}

#[test]
fn determinism_across_runs() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "w1", &["worker.a"], &[]);
    add(&mut catalog, "w2", &["worker.b"], &[]);
    add(&mut catalog, "sched", &["sched.main"], &["worker+"]);

    let mut first = Resolver::new(&catalog, vec!["sched.main".to_string()]);
    let order_a = first.resolve().unwrap();

    let mut second = Resolver::new(&catalog, vec!["sched.main".to_string()]);
    let order_b = second.resolve().unwrap();

    assert_eq!(order_a, order_b);
}

#[test]
fn force_replace_is_idempotent() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "db", &["database.main"], &[]);
    catalog.add_resource("db", None, config(&["database.main"], &[]), true).unwrap();

    let names: Vec<_> = catalog.iter().map(|r| r.name.clone()).collect();
    assert_eq!(names, vec!["db".to_string()]);
}
