//! Conflict trails and resolver errors.

use std::fmt;

use envx_version::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::package::{PackageRequest, RequestMode};

/// Who imposed a requirement: the caller's request list or a package that was
/// selected during the search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Requester {
    /// The top-level request list.
    Request,
    /// A selected package version.
    Package { family: String, version: Version },
}

impl Requester {
    pub fn package(family: impl Into<String>, version: Version) -> Self {
        Requester::Package {
            family: family.into(),
            version,
        }
    }

    /// The requesting family, when the requester is a package.
    pub fn family(&self) -> Option<&str> {
        match self {
            Requester::Request => None,
            Requester::Package { family, .. } => Some(family),
        }
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requester::Request => f.write_str("the request"),
            Requester::Package { family, version } => write!(f, "{}-{}", family, version),
        }
    }
}

/// One requirement in a conflict trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictCause {
    pub requester: Requester,
    pub request: PackageRequest,
}

impl fmt::Display for ConflictCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.request.mode {
            RequestMode::Strong => "requires",
            RequestMode::Weak => "wants",
            RequestMode::Conflict => "excludes",
        };
        write!(f, "{} {} {}", self.requester, verb, self.request.descriptor())
    }
}

/// A family the search could not satisfy, together with every requirement
/// that narrowed it: the material a caller needs to render a conflict
/// explanation, not just a boolean failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub family: String,
    pub causes: Vec<ConflictCause>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no version of \"{}\" satisfies:", self.family)?;
        if self.causes.is_empty() {
            write!(f, " (no versions available)")?;
        }
        for cause in &self.causes {
            write!(f, "\n  {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for Conflict {}

/// Why a resolve call failed.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The family does not exist in the index at all, as opposed to existing
    /// at unsuitable versions.
    #[error("package family \"{family}\" not found in the index (required by {requester})")]
    MissingPackage { family: String, requester: Requester },

    /// The search exhausted every assignment; the conflict carries the
    /// decision trail of the first unsatisfiable family.
    #[error("{0}")]
    Unresolved(Conflict),

    /// A package transitively requires its own family.
    #[error("dependency cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
}
