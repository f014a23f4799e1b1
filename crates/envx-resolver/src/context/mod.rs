//! Resolved environment contexts.
//!
//! Once the solver has chosen a package set, this module interprets each
//! package's environment operations in dependency order, producing an
//! immutable [`EnvironmentContext`] that can be persisted, reloaded without
//! the index, and diffed against another context.

mod builder;
mod context;
mod diff;

pub use context::EnvironmentContext;
pub use diff::{ContextDiff, PackageChange, VariableChange};

use thiserror::Error;

use crate::package::EnvOp;

#[derive(Error, Debug)]
pub enum ContextError {
    /// An environment operation failed to evaluate. The whole build is
    /// abandoned; partial environments are never returned.
    #[error("command execution failed in {package}: {op}: {reason}")]
    CommandFailed {
        package: String,
        op: EnvOp,
        reason: String,
    },

    /// The graph could not be ordered (the solver rejects cycles, so this
    /// indicates a hand-built graph).
    #[error("dependency cycle while ordering environment: {}", .families.join(" -> "))]
    Cycle { families: Vec<String> },

    #[error("failed to read or write context: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed context file: {0}")]
    Format(#[from] serde_json::Error),
}
