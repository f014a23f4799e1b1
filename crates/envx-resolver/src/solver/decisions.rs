//! Search state and decision frames.

use envx_version::{Version, VersionRange};
use indexmap::IndexMap;

use crate::package::{PackageRequest, RequestMode};

use super::graph::{RequirementEdge, ResolvedNode};
use super::policy::Candidate;
use super::problem::{Conflict, ConflictCause, Requester};

/// Accumulated constraint on one family: the intersection of every range
/// imposed so far, the ranges excluded by conflict requests, and the causes
/// behind both (kept for conflict explanation).
#[derive(Debug, Clone)]
pub(crate) struct FamilyConstraint {
    pub range: VersionRange,
    pub excluded: Vec<VersionRange>,
    pub causes: Vec<ConflictCause>,
    /// Whether anything strongly requires this family; weak requests
    /// constrain without demanding.
    pub demanded: bool,
}

impl Default for FamilyConstraint {
    fn default() -> Self {
        FamilyConstraint {
            range: VersionRange::any(),
            excluded: Vec::new(),
            causes: Vec::new(),
            demanded: false,
        }
    }
}

impl FamilyConstraint {
    /// True when `version` sits inside the accumulated range and outside
    /// every excluded range.
    pub fn permits(&self, version: &Version) -> bool {
        self.range.contains(version) && !self.excluded.iter().any(|r| r.contains(version))
    }

    /// True when the range has been narrowed at all; the solver decides such
    /// families first to fail fast.
    pub fn is_narrowed(&self) -> bool {
        !self.range.is_any() || !self.excluded.is_empty()
    }
}

/// The mutable search state: per-family constraints, selections so far, and
/// the requirement edges recorded along the way. Cloned into a frame before
/// each decision so chronological backtracking restores it wholesale.
#[derive(Debug, Clone, Default)]
pub(crate) struct SolverState {
    constraints: IndexMap<String, FamilyConstraint>,
    selected: IndexMap<String, ResolvedNode>,
    edges: Vec<RequirementEdge>,
}

impl SolverState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one requirement into the state. Fails with the family's conflict
    /// trail when its range empties out or an existing selection is
    /// invalidated.
    pub fn impose(
        &mut self,
        requester: Requester,
        request: &PackageRequest,
    ) -> Result<(), Conflict> {
        self.edges.push(RequirementEdge {
            requester: requester.clone(),
            request: request.clone(),
        });

        let constraint = self.constraints.entry(request.family.clone()).or_default();
        constraint.causes.push(ConflictCause {
            requester,
            request: request.clone(),
        });
        match request.mode {
            RequestMode::Conflict => constraint.excluded.push(request.range.clone()),
            RequestMode::Strong => {
                constraint.range = constraint.range.intersect(&request.range);
                constraint.demanded = true;
            }
            RequestMode::Weak => {
                constraint.range = constraint.range.intersect(&request.range);
            }
        }

        let constraint = &self.constraints[&request.family];
        let violated = constraint.range.is_empty()
            || self
                .selected
                .get(&request.family)
                .is_some_and(|node| !constraint.permits(&node.package.version));
        if violated {
            return Err(self.conflict_for(&request.family));
        }
        Ok(())
    }

    /// Record a selection and fold its effective requirements into the state.
    pub fn select(&mut self, node: ResolvedNode) -> Result<(), Conflict> {
        let requester = Requester::package(node.package.name.clone(), node.package.version.clone());
        let requires: Vec<PackageRequest> = node.effective_requires().cloned().collect();
        self.selected.insert(node.family().to_string(), node);
        for request in &requires {
            self.impose(requester.clone(), request)?;
        }
        Ok(())
    }

    /// The next family to decide: demanded and unselected, preferring
    /// families whose range has already been narrowed, then first-demanded
    /// order. Returns `None` when the assignment is complete.
    pub fn next_undecided(&self) -> Option<String> {
        let mut fallback = None;
        for (family, constraint) in &self.constraints {
            if !constraint.demanded || self.selected.contains_key(family) {
                continue;
            }
            if constraint.is_narrowed() {
                return Some(family.clone());
            }
            if fallback.is_none() {
                fallback = Some(family.clone());
            }
        }
        fallback
    }

    /// The accumulated constraint for `family` (default when untouched).
    pub fn constraint_for(&self, family: &str) -> FamilyConstraint {
        self.constraints.get(family).cloned().unwrap_or_default()
    }

    /// The conflict trail for `family` as currently accumulated.
    pub fn conflict_for(&self, family: &str) -> Conflict {
        Conflict {
            family: family.to_string(),
            causes: self
                .constraints
                .get(family)
                .map(|c| c.causes.clone())
                .unwrap_or_default(),
        }
    }

    /// The first strong requester of `family`, for `MissingPackage` errors.
    pub fn requester_of(&self, family: &str) -> Requester {
        self.constraints
            .get(family)
            .and_then(|c| {
                c.causes
                    .iter()
                    .find(|cause| cause.request.mode == RequestMode::Strong)
            })
            .map(|cause| cause.requester.clone())
            .unwrap_or(Requester::Request)
    }

    /// Consume the state into the selections (decision order) and edges.
    pub fn into_parts(self) -> (Vec<ResolvedNode>, Vec<RequirementEdge>) {
        (self.selected.into_values().collect(), self.edges)
    }
}

/// One decision point: the family being decided, its candidate list, and the
/// state to restore when trying the next candidate.
#[derive(Debug)]
pub(crate) struct Frame {
    pub family: String,
    pub candidates: Vec<Candidate>,
    pub next: usize,
    pub saved: SolverState,
}
