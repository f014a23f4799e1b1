//! Backtracking dependency resolver.
//!
//! The solver assigns exactly one `(version, variant)` to every demanded
//! package family, transitively satisfying each selected package's own
//! requirements, or fails with an explainable conflict.
//!
//! # Architecture
//!
//! - [`Policy`]: candidate ordering (which version and variant to try first)
//! - [`Solver`]: depth-first search with chronological backtracking
//! - [`ResolutionGraph`]: the chosen packages plus every requirement edge,
//!   recording which requester imposed which constraint
//! - [`Conflict`]: the decision trail behind an unsatisfiable family
//!
//! # Algorithm Overview
//!
//! 1. Fold the caller's requests into per-family range constraints
//! 2. Pick the next demanded, undecided family (narrowed ranges first)
//! 3. Enumerate its candidates best-first and tentatively select one,
//!    folding the candidate's requirements into the constraint state
//! 4. On an empty range or an exhausted candidate list, restore the previous
//!    state and try the next candidate; exhausting the first decision point
//!    fails the resolve
//! 5. On success, verify the selected set is acyclic and emit the graph
//!
//! Every ordering rule is deterministic: a fixed index snapshot and a fixed
//! request sequence always produce the same graph.

mod decisions;
mod graph;
mod policy;
mod problem;
mod solver;

#[cfg(test)]
mod tests;

pub use graph::{RequirementEdge, ResolutionGraph, ResolvedNode, ResolvedPackage};
pub use policy::{Candidate, Policy};
pub use problem::{Conflict, ConflictCause, Requester, ResolveError};
pub use solver::Solver;
