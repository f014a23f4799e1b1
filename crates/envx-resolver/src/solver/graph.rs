//! The resolved package set and its requirement edges.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use envx_version::Version;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::package::{Package, PackageRequest};

use super::problem::Requester;

/// One selected `(package, variant)` in a resolution. Holds the full catalog
/// package so the context builder can reach its commands and install root.
#[derive(Debug, Clone)]
pub struct ResolvedNode {
    pub package: Arc<Package>,
    pub variant: Option<usize>,
}

impl ResolvedNode {
    pub fn family(&self) -> &str {
        &self.package.name
    }

    pub fn qualified_name(&self) -> String {
        self.package.qualified_name()
    }

    /// The requirements this selection actually imposes (package plus chosen
    /// variant).
    pub fn effective_requires(&self) -> impl Iterator<Item = &PackageRequest> {
        self.package.effective_requires(self.variant)
    }

    /// The index-independent identity of this selection.
    pub fn to_resolved_package(&self) -> ResolvedPackage {
        ResolvedPackage {
            family: self.package.name.clone(),
            version: self.package.version.clone(),
            variant: self.variant,
            root: self.package.root.clone(),
        }
    }
}

/// The persistable identity of a resolved package: enough to list and diff a
/// saved context without access to package sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub family: String,
    pub version: Version,
    pub variant: Option<usize>,
    pub root: Option<PathBuf>,
}

impl ResolvedPackage {
    pub fn qualified_name(&self) -> String {
        format!("{}-{}", self.family, self.version)
    }
}

impl fmt::Display for ResolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.family, self.version)?;
        if let Some(variant) = self.variant {
            write!(f, "[{}]", variant)?;
        }
        Ok(())
    }
}

/// One recorded requirement: `requester` imposed `request` on
/// `request.family`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementEdge {
    pub requester: Requester,
    pub request: PackageRequest,
}

/// The output of a successful resolve: the chosen packages (in decision
/// order) plus every requirement edge, for conflict explanation and for
/// dependency-ordering during environment construction. Acyclic by
/// construction.
#[derive(Debug, Clone)]
pub struct ResolutionGraph {
    nodes: Vec<ResolvedNode>,
    by_family: HashMap<String, usize>,
    edges: Vec<RequirementEdge>,
    solve_time: Duration,
}

impl ResolutionGraph {
    pub(crate) fn new(
        nodes: Vec<ResolvedNode>,
        edges: Vec<RequirementEdge>,
        solve_time: Duration,
    ) -> Self {
        let by_family = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.family().to_string(), i))
            .collect();
        ResolutionGraph {
            nodes,
            by_family,
            edges,
            solve_time,
        }
    }

    /// The selected packages, in decision order.
    pub fn packages(&self) -> impl Iterator<Item = &ResolvedNode> {
        self.nodes.iter()
    }

    pub fn get(&self, family: &str) -> Option<&ResolvedNode> {
        self.by_family.get(family).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, family: &str) -> bool {
        self.by_family.contains_key(family)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every requirement recorded during the search, in imposition order.
    pub fn edges(&self) -> &[RequirementEdge] {
        &self.edges
    }

    /// The edges targeting `family`: who asked for it, and what they asked
    /// for.
    pub fn requested_by<'s>(
        &'s self,
        family: &'s str,
    ) -> impl Iterator<Item = &'s RequirementEdge> + 's {
        self.edges.iter().filter(move |e| e.request.family == family)
    }

    /// The edges imposed by the selected package of `family`.
    pub fn requirements_of<'s>(
        &'s self,
        family: &'s str,
    ) -> impl Iterator<Item = &'s RequirementEdge> + 's {
        self.edges
            .iter()
            .filter(move |e| e.requester.family() == Some(family))
    }

    /// Index-independent identities of the selected packages, in decision
    /// order.
    pub fn resolved_packages(&self) -> Vec<ResolvedPackage> {
        self.nodes.iter().map(|n| n.to_resolved_package()).collect()
    }

    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }
}

/// Serializes the deterministic part of the graph (packages and edges, not
/// timing), so two resolves of the same request compare byte-identical.
impl Serialize for ResolutionGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ResolutionGraph", 2)?;
        s.serialize_field("packages", &self.resolved_packages())?;
        s.serialize_field("edges", &self.edges)?;
        s.end()
    }
}
