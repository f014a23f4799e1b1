//! The immutable resolved context and its persisted form.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::solver::{RequirementEdge, ResolutionGraph, ResolvedPackage};

use super::builder::{application_order, build_environ};
use super::diff::ContextDiff;
use super::ContextError;

/// The final product of a resolve: the chosen packages in application order,
/// the requirement edges that produced them, and the derived environment
/// variables.
///
/// Immutable after construction. Persisting and reloading a context is
/// lossless for package identities, their ordering, and the variable mapping,
/// so saved contexts can be listed and diffed without the index that produced
/// them. Re-resolving against a changed index produces a new, independent
/// context; a saved one is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentContext {
    packages: Vec<ResolvedPackage>,
    edges: Vec<RequirementEdge>,
    environ: IndexMap<String, String>,
    created_at: DateTime<Utc>,
    solve_time: Duration,
}

impl EnvironmentContext {
    /// Execute every package's environment operations in dependency order
    /// (dependencies first, ties by family name ascending) against an
    /// accumulating mapping.
    ///
    /// Fails with [`ContextError::CommandFailed`] if any operation fails to
    /// evaluate; no partial environment is returned.
    pub fn build(graph: &ResolutionGraph) -> Result<Self, ContextError> {
        let order = application_order(graph)?;
        let environ = build_environ(&order)?;
        debug!(
            packages = order.len(),
            variables = environ.len(),
            "context built"
        );
        Ok(EnvironmentContext {
            packages: order.iter().map(|n| n.to_resolved_package()).collect(),
            edges: graph.edges().to_vec(),
            environ,
            created_at: Utc::now(),
            solve_time: graph.solve_time(),
        })
    }

    /// The resolved packages, in the order their operations were applied.
    pub fn packages(&self) -> &[ResolvedPackage] {
        &self.packages
    }

    /// The final variable mapping, in insertion order.
    pub fn variables(&self) -> &IndexMap<String, String> {
        &self.environ
    }

    pub fn get_env(&self, name: &str) -> Option<&str> {
        self.environ.get(name).map(String::as_str)
    }

    /// Every requirement edge recorded during the resolve.
    pub fn edges(&self) -> &[RequirementEdge] {
        &self.edges
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }

    /// Compare against a newer context: what `other` added, removed, or
    /// changed relative to `self`.
    pub fn diff(&self, other: &EnvironmentContext) -> ContextDiff {
        ContextDiff::between(self, other)
    }

    /// Serialize to a writer as JSON.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), ContextError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserialize from a reader.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, ContextError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Persist to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ContextError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Load a previously saved context. Needs no index: the file carries the
    /// package identities and variables itself.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContextError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::package::{EnvOp, Package, PackageRequest};
    use crate::solver::Solver;
    use envx_version::Version;

    fn ver(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn sample_context() -> EnvironmentContext {
        let mut a = Package::new("a", ver("1.0"));
        a.commands = vec![EnvOp::set("X", "1")];
        let mut b = Package::new("b", ver("2.0"));
        b.requires = vec!["a".parse().unwrap()];
        b.commands = vec![EnvOp::prepend("X", "2"), EnvOp::set("Y", "only-b")];

        let mut builder = IndexBuilder::new();
        builder.add_package(a).unwrap();
        builder.add_package(b).unwrap();
        let index = builder.build();

        let requests: Vec<PackageRequest> = vec!["b".parse().unwrap()];
        let graph = Solver::new(&index).resolve(&requests).unwrap();
        EnvironmentContext::build(&graph).unwrap()
    }

    #[test]
    fn test_build_exposes_read_only_views() {
        let context = sample_context();
        let names: Vec<_> = context.packages().iter().map(|p| p.qualified_name()).collect();
        assert_eq!(names, vec!["a-1.0", "b-2.0"]);
        assert_eq!(context.get_env("Y"), Some("only-b"));
        assert!(context.get_env("Z").is_none());
        assert!(!context.edges().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let context = sample_context();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.json");
        context.save(&path).unwrap();
        let loaded = EnvironmentContext::load(&path).unwrap();

        assert_eq!(loaded.packages(), context.packages());
        assert_eq!(loaded.variables(), context.variables());
        assert_eq!(loaded.edges(), context.edges());
        assert_eq!(loaded.created_at(), context.created_at());
        assert_eq!(loaded.solve_time(), context.solve_time());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = EnvironmentContext::load(&path).unwrap_err();
        assert!(matches!(err, ContextError::Format(_)));
    }
}
