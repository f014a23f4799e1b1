//! Solver scenario tests.
//!
//! These validate the backtracking resolver: version preference, transitive
//! constraints, variant selection, conflict markers, and the shape of the
//! failures it reports.

use super::*;
use crate::index::{IndexBuilder, PackageIndex};
use crate::package::{Package, PackageRequest, Variant};
use envx_version::Version;

fn ver(s: &str) -> Version {
    s.parse().unwrap()
}

fn req(s: &str) -> PackageRequest {
    s.parse().unwrap()
}

/// Helper to create a package with a given name and version
fn pkg(name: &str, version: &str) -> Package {
    Package::new(name, ver(version))
}

/// Helper to create a package with requirements
fn pkg_with_requires(name: &str, version: &str, requires: Vec<&str>) -> Package {
    let mut p = pkg(name, version);
    p.requires = requires.into_iter().map(req).collect();
    p
}

/// Helper to create a package with variants
fn pkg_with_variants(name: &str, version: &str, variants: Vec<Vec<&str>>) -> Package {
    let mut p = pkg(name, version);
    p.variants = variants
        .into_iter()
        .map(|requires| Variant::new(requires.into_iter().map(req).collect()))
        .collect();
    p
}

fn index(packages: Vec<Package>) -> PackageIndex {
    let mut builder = IndexBuilder::new();
    for package in packages {
        builder.add_package(package).unwrap();
    }
    builder.build()
}

/// Check that the resolved packages match expected `family-version[variant]`
/// descriptors, ignoring order.
fn check_resolved(graph: &ResolutionGraph, expected: Vec<&str>) {
    let mut actual: Vec<String> = graph
        .packages()
        .map(|n| match n.variant {
            Some(variant) => format!("{}[{}]", n.qualified_name(), variant),
            None => n.qualified_name(),
        })
        .collect();
    let mut expected: Vec<String> = expected.into_iter().map(String::from).collect();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}

fn resolve(index: &PackageIndex, requests: Vec<&str>) -> Result<ResolutionGraph, ResolveError> {
    let requests: Vec<PackageRequest> = requests.into_iter().map(req).collect();
    Solver::new(index).resolve(&requests)
}

// ============================================================================
// Basic resolution
// ============================================================================

#[test]
fn test_resolve_single_package() {
    let index = index(vec![pkg("a", "1.0.0")]);
    let graph = resolve(&index, vec!["a"]).unwrap();
    check_resolved(&graph, vec!["a-1.0.0"]);
}

#[test]
fn test_resolve_empty_request_list() {
    let index = index(vec![pkg("a", "1.0.0")]);
    let graph = resolve(&index, vec![]).unwrap();
    assert!(graph.is_empty());
}

#[test]
fn test_resolve_prefers_latest_version() {
    let index = index(vec![pkg("a", "1.0.0"), pkg("a", "2.0.0"), pkg("a", "1.5.0")]);
    let graph = resolve(&index, vec!["a"]).unwrap();
    check_resolved(&graph, vec!["a-2.0.0"]);
}

#[test]
fn test_resolve_respects_requested_range() {
    let index = index(vec![pkg("a", "1.0.0"), pkg("a", "2.0.0")]);
    let graph = resolve(&index, vec!["a-<2.0"]).unwrap();
    check_resolved(&graph, vec!["a-1.0.0"]);
}

#[test]
fn test_resolve_numeric_width_in_versions() {
    let index = index(vec![pkg("a", "9"), pkg("a", "10")]);
    let graph = resolve(&index, vec!["a"]).unwrap();
    check_resolved(&graph, vec!["a-10"]);
}

#[test]
fn test_resolve_transitive_requirement() {
    let index = index(vec![
        pkg_with_requires("a", "1.0.0", vec!["b-<1.1"]),
        pkg("b", "1.0.0"),
        pkg("b", "1.1.0"),
    ]);
    let graph = resolve(&index, vec!["a"]).unwrap();
    check_resolved(&graph, vec!["a-1.0.0", "b-1.0.0"]);
}

#[test]
fn test_resolve_diamond_selects_one_version() {
    let index = index(vec![
        pkg_with_requires("a", "1.0", vec!["c-1+"]),
        pkg_with_requires("b", "1.0", vec!["c-<3"]),
        pkg("c", "1.0"),
        pkg("c", "2.0"),
        pkg("c", "3.0"),
    ]);
    let graph = resolve(&index, vec!["a", "b"]).unwrap();
    check_resolved(&graph, vec!["a-1.0", "b-1.0", "c-2.0"]);
}

#[test]
fn test_prefer_lowest_policy() {
    let index = index(vec![pkg("a", "1.0.0"), pkg("a", "2.0.0")]);
    let requests = vec![req("a")];
    let graph = Solver::new(&index)
        .with_policy(Policy::new().prefer_lowest(true))
        .resolve(&requests)
        .unwrap();
    check_resolved(&graph, vec!["a-1.0.0"]);
}

// ============================================================================
// Backtracking
// ============================================================================

#[test]
fn test_backtracks_to_compatible_version() {
    // a-2.0 needs c-2+, but b needs c-<2, so a-2.0 must be abandoned.
    let index = index(vec![
        pkg_with_requires("a", "1.0", vec!["c-<2"]),
        pkg_with_requires("a", "2.0", vec!["c-2+"]),
        pkg_with_requires("b", "1.0", vec!["c-<2"]),
        pkg("c", "1.0"),
        pkg("c", "2.0"),
    ]);
    let graph = resolve(&index, vec!["a", "b"]).unwrap();
    check_resolved(&graph, vec!["a-1.0", "b-1.0", "c-1.0"]);
}

#[test]
fn test_backtracks_across_multiple_levels() {
    // Both a and b have versions whose requirements clash with d; only the
    // older pair agrees.
    let index = index(vec![
        pkg_with_requires("a", "1.0", vec!["d-<2"]),
        pkg_with_requires("a", "2.0", vec!["d-2+"]),
        pkg_with_requires("b", "1.0", vec!["d-<2"]),
        pkg_with_requires("b", "2.0", vec!["d-2+"]),
        pkg_with_requires("top", "1.0", vec!["a", "b", "d-<2"]),
        pkg("d", "1.0"),
        pkg("d", "2.0"),
    ]);
    let graph = resolve(&index, vec!["top"]).unwrap();
    check_resolved(&graph, vec!["top-1.0", "a-1.0", "b-1.0", "d-1.0"]);
}

// ============================================================================
// Variants
// ============================================================================

#[test]
fn test_variant_simplest_first() {
    let index = index(vec![
        pkg_with_variants("app", "1.0", vec![vec!["python-3.9", "maya-2023+"], vec!["python-3.9"]]),
        pkg("python", "3.9"),
        pkg("maya", "2023.1"),
    ]);
    let graph = resolve(&index, vec!["app"]).unwrap();
    // The one-requirement variant (index 1) wins; maya is never pulled in.
    check_resolved(&graph, vec!["app-1.0[1]", "python-3.9"]);
}

#[test]
fn test_variant_backtracking_on_conflict() {
    // The simplest variant demands python 3.11, which clashes with the
    // request; the solver falls back to the two-requirement variant.
    let index = index(vec![
        pkg_with_variants(
            "app",
            "1.0",
            vec![vec!["python-3.9", "qt-5+"], vec!["python-3.11"]],
        ),
        pkg("python", "3.9"),
        pkg("python", "3.11"),
        pkg("qt", "5.15"),
    ]);
    let graph = resolve(&index, vec!["app", "python-3.9"]).unwrap();
    check_resolved(&graph, vec!["app-1.0[0]", "python-3.9", "qt-5.15"]);
}

#[test]
fn test_variant_declaration_order_breaks_ties() {
    let index = index(vec![
        pkg_with_variants("app", "1.0", vec![vec!["python-3.7"], vec!["python-3.9"]]),
        pkg("python", "3.7"),
        pkg("python", "3.9"),
    ]);
    let graph = resolve(&index, vec!["app"]).unwrap();
    check_resolved(&graph, vec!["app-1.0[0]", "python-3.7"]);
}

// ============================================================================
// Weak and conflict requests
// ============================================================================

#[test]
fn test_weak_request_does_not_demand() {
    let index = index(vec![pkg("a", "1.0"), pkg("b", "1.0")]);
    let graph = resolve(&index, vec!["a", "~b-<2"]).unwrap();
    check_resolved(&graph, vec!["a-1.0"]);
}

#[test]
fn test_weak_request_constrains_when_demanded() {
    let index = index(vec![
        pkg_with_requires("a", "1.0", vec!["b"]),
        pkg("b", "1.0"),
        pkg("b", "2.0"),
    ]);
    let graph = resolve(&index, vec!["a", "~b-<2"]).unwrap();
    check_resolved(&graph, vec!["a-1.0", "b-1.0"]);
}

#[test]
fn test_conflict_request_excludes_range() {
    let index = index(vec![
        pkg_with_requires("a", "1.0", vec!["b"]),
        pkg("b", "1.0"),
        pkg("b", "2.0"),
    ]);
    let graph = resolve(&index, vec!["a", "!b-2+"]).unwrap();
    check_resolved(&graph, vec!["a-1.0", "b-1.0"]);
}

#[test]
fn test_conflict_request_fails_when_unavoidable() {
    let index = index(vec![pkg_with_requires("a", "1.0", vec!["b-2+"]), pkg("b", "2.0")]);
    let err = resolve(&index, vec!["a", "!b-2+"]).unwrap_err();
    let ResolveError::Unresolved(conflict) = err else {
        panic!("expected Unresolved, got {:?}", err);
    };
    assert_eq!(conflict.family, "b");
    let text = conflict.to_string();
    // The trail names both the excluding request and the package that
    // demanded the forbidden range.
    assert!(text.contains("the request excludes b-2+"), "{}", text);
    assert!(text.contains("a-1.0 requires b-2+"), "{}", text);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_version_conflict_names_family() {
    let index = index(vec![pkg("a", "1.0.0")]);
    let err = resolve(&index, vec!["a", "a-<1.0"]).unwrap_err();
    let ResolveError::Unresolved(conflict) = err else {
        panic!("expected Unresolved, got {:?}", err);
    };
    assert_eq!(conflict.family, "a");
    assert_eq!(conflict.causes.len(), 2);
    assert!(conflict.to_string().contains("the request requires a-<1.0"));
}

#[test]
fn test_transitive_conflict_names_requesters() {
    let index = index(vec![
        pkg_with_requires("maya", "2023.1", vec!["python-3.7+<3.8"]),
        pkg("python", "3.9"),
    ]);
    let err = resolve(&index, vec!["maya", "python-3.9"]).unwrap_err();
    let ResolveError::Unresolved(conflict) = err else {
        panic!("expected Unresolved, got {:?}", err);
    };
    assert_eq!(conflict.family, "python");
    let text = conflict.to_string();
    assert!(text.contains("the request requires python-3.9"), "{}", text);
    assert!(
        text.contains("maya-2023.1 requires python-3.7+<3.8"),
        "{}",
        text
    );
}

#[test]
fn test_missing_family_is_distinct_error() {
    let index = index(vec![pkg("a", "1.0.0")]);
    let err = resolve(&index, vec!["ghost"]).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::MissingPackage { ref family, .. } if family == "ghost"
    ));
}

#[test]
fn test_missing_transitive_family_names_requester() {
    let index = index(vec![pkg_with_requires("a", "1.0", vec!["ghost"])]);
    let err = resolve(&index, vec!["a"]).unwrap_err();
    let ResolveError::MissingPackage { family, requester } = err else {
        panic!("expected MissingPackage, got {:?}", err);
    };
    assert_eq!(family, "ghost");
    assert_eq!(requester.to_string(), "a-1.0");
}

#[test]
fn test_cycle_is_rejected() {
    let index = index(vec![
        pkg_with_requires("a", "1.0", vec!["b"]),
        pkg_with_requires("b", "1.0", vec!["a"]),
    ]);
    let err = resolve(&index, vec!["a"]).unwrap_err();
    let ResolveError::Cycle { path } = err else {
        panic!("expected Cycle, got {:?}", err);
    };
    assert!(path.len() >= 3);
    assert_eq!(path.first(), path.last());
}

// ============================================================================
// Graph shape and determinism
// ============================================================================

#[test]
fn test_graph_records_requirement_edges() {
    let index = index(vec![
        pkg_with_requires("a", "1.0", vec!["b-<2"]),
        pkg("b", "1.0"),
    ]);
    let graph = resolve(&index, vec!["a"]).unwrap();

    let to_b: Vec<_> = graph.requested_by("b").collect();
    assert_eq!(to_b.len(), 1);
    assert_eq!(to_b[0].requester.to_string(), "a-1.0");
    assert_eq!(to_b[0].request.descriptor(), "b-<2");

    let from_a: Vec<_> = graph.requirements_of("a").collect();
    assert_eq!(from_a.len(), 1);
    assert!(graph.requirements_of("b").next().is_none());
}

#[test]
fn test_resolve_is_deterministic() {
    let packages = || {
        vec![
            pkg_with_requires("a", "1.0", vec!["c-1+"]),
            pkg_with_requires("b", "1.0", vec!["c-<3", "d"]),
            pkg("c", "1.0"),
            pkg("c", "2.0"),
            pkg("d", "1.0"),
            pkg("d", "2.0"),
        ]
    };
    let first = resolve(&index(packages()), vec!["a", "b"]).unwrap();
    let second = resolve(&index(packages()), vec!["a", "b"]).unwrap();

    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b);
}
