//! The depth-first backtracking search.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace};

use crate::index::PackageIndex;
use crate::package::{PackageRequest, RequestMode};

use super::decisions::{Frame, SolverState};
use super::graph::{ResolutionGraph, ResolvedNode};
use super::policy::Policy;
use super::problem::{Conflict, Requester, ResolveError};

/// Resolves package requests against one immutable index snapshot.
///
/// A single resolve is synchronous and single-threaded; independent resolves
/// may run in parallel against the same index.
pub struct Solver<'a> {
    index: &'a PackageIndex,
    policy: Policy,
}

impl<'a> Solver<'a> {
    pub fn new(index: &'a PackageIndex) -> Self {
        Solver {
            index,
            policy: Policy::default(),
        }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Find a consistent assignment of one `(version, variant)` per demanded
    /// family, or fail with an explainable error.
    ///
    /// Deterministic: the same index snapshot and request sequence always
    /// produce the same graph.
    pub fn resolve(&self, requests: &[PackageRequest]) -> Result<ResolutionGraph, ResolveError> {
        let started = Instant::now();

        let mut state = SolverState::new();
        for request in requests {
            state
                .impose(Requester::Request, request)
                .map_err(ResolveError::Unresolved)?;
        }

        let mut stack: Vec<Frame> = Vec::new();
        let mut first_conflict: Option<Conflict> = None;

        while let Some(family) = state.next_undecided() {
            let family_entry =
                self.index
                    .get_family(&family)
                    .ok_or_else(|| ResolveError::MissingPackage {
                        family: family.clone(),
                        requester: state.requester_of(&family),
                    })?;
            let constraint = state.constraint_for(&family);
            let candidates = self.policy.candidates(family_entry, &constraint);
            trace!(family = %family, candidates = candidates.len(), "decision point");

            stack.push(Frame {
                family,
                candidates,
                next: 0,
                saved: state.clone(),
            });
            if !Self::advance(&mut stack, &mut state, &mut first_conflict) {
                let conflict = first_conflict.take().unwrap_or_else(|| {
                    state.conflict_for(
                        requests.first().map(|r| r.family.as_str()).unwrap_or_default(),
                    )
                });
                return Err(ResolveError::Unresolved(conflict));
            }
        }

        let (nodes, edges) = state.into_parts();
        check_acyclic(&nodes)?;
        debug!(
            packages = nodes.len(),
            elapsed = ?started.elapsed(),
            "resolve complete"
        );
        Ok(ResolutionGraph::new(nodes, edges, started.elapsed()))
    }

    /// Drive the top of the stack to a valid selection, backtracking
    /// chronologically as needed. Returns false when the stack is exhausted.
    fn advance(
        stack: &mut Vec<Frame>,
        state: &mut SolverState,
        first_conflict: &mut Option<Conflict>,
    ) -> bool {
        loop {
            let Some(frame) = stack.last_mut() else {
                return false;
            };

            if frame.next >= frame.candidates.len() {
                if frame.candidates.is_empty() {
                    let conflict = frame.saved.conflict_for(&frame.family);
                    first_conflict.get_or_insert(conflict);
                }
                debug!(family = %frame.family, "candidates exhausted, backtracking");
                stack.pop();
                match stack.last_mut() {
                    Some(parent) => parent.next += 1,
                    None => return false,
                }
                continue;
            }

            *state = frame.saved.clone();
            let candidate = frame.candidates[frame.next].clone();
            let description = candidate.describe();
            let node = ResolvedNode {
                package: candidate.package,
                variant: candidate.variant,
            };
            match state.select(node) {
                Ok(()) => {
                    debug!(candidate = %description, "selected");
                    return true;
                }
                Err(conflict) => {
                    trace!(candidate = %description, family = %conflict.family, "rejected");
                    first_conflict.get_or_insert(conflict);
                    frame.next += 1;
                }
            }
        }
    }
}

/// Verify no selected package transitively requires its own family.
fn check_acyclic(nodes: &[ResolvedNode]) -> Result<(), ResolveError> {
    let index_of: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.family(), i))
        .collect();
    let deps: Vec<Vec<usize>> = nodes
        .iter()
        .map(|n| {
            n.effective_requires()
                .filter(|r| r.mode != RequestMode::Conflict)
                .filter_map(|r| index_of.get(r.family.as_str()).copied())
                .collect()
        })
        .collect();

    let mut marks = vec![Mark::Unvisited; nodes.len()];
    let mut trail = Vec::new();
    for start in 0..nodes.len() {
        visit(start, nodes, &deps, &mut marks, &mut trail)?;
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

fn visit(
    node: usize,
    nodes: &[ResolvedNode],
    deps: &[Vec<usize>],
    marks: &mut [Mark],
    trail: &mut Vec<usize>,
) -> Result<(), ResolveError> {
    match marks[node] {
        Mark::Done => return Ok(()),
        Mark::InProgress => {
            let start = trail.iter().position(|&t| t == node).unwrap_or(0);
            let mut path: Vec<String> = trail[start..]
                .iter()
                .map(|&t| nodes[t].family().to_string())
                .collect();
            path.push(nodes[node].family().to_string());
            return Err(ResolveError::Cycle { path });
        }
        Mark::Unvisited => {}
    }

    marks[node] = Mark::InProgress;
    trail.push(node);
    for &dep in &deps[node] {
        visit(dep, nodes, deps, marks, trail)?;
    }
    trail.pop();
    marks[node] = Mark::Done;
    Ok(())
}
