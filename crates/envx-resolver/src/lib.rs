//! Package version resolver and environment-context builder.
//!
//! Given an immutable catalog of versioned, variant-bearing packages and a
//! list of package requests, this crate deterministically selects one
//! `(version, variant)` per required family and materializes the shell
//! environment the selection implies.
//!
//! # Architecture
//!
//! - [`index::PackageIndex`]: read-only catalog of package families, built
//!   once from an already-parsed descriptor stream and queried repeatedly.
//! - [`solver::Solver`]: depth-first search with chronological backtracking
//!   over `(version, variant)` candidates; produces a
//!   [`solver::ResolutionGraph`] or an explainable conflict.
//! - [`context::EnvironmentContext`]: interprets each resolved package's
//!   environment operations in dependency order, and persists the result so
//!   it can be reloaded and diffed without the index.
//!
//! # Example
//!
//! ```ignore
//! use envx_resolver::index::IndexBuilder;
//! use envx_resolver::solver::Solver;
//! use envx_resolver::context::EnvironmentContext;
//!
//! let mut builder = IndexBuilder::new();
//! // ... add packages to the builder
//! let index = builder.build();
//!
//! let requests = vec!["myapp".parse()?, "python-3.9+".parse()?];
//! let graph = Solver::new(&index).resolve(&requests)?;
//! let context = EnvironmentContext::build(&graph)?;
//!
//! for (name, value) in context.variables() {
//!     println!("{}={}", name, value);
//! }
//! ```

pub mod context;
pub mod index;
pub mod package;
pub mod solver;

pub use envx_version::{Version, VersionRange};
