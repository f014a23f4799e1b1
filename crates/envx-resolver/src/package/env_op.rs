//! Environment mutation as data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One declarative environment operation owned by a package.
///
/// Values may contain the substitution token `{root}`, which expands to the
/// owning package's install root when the operation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum EnvOp {
    /// Overwrite the variable.
    Set { name: String, value: String },
    /// Insert before the existing content, joined with the platform
    /// path-list separator. Behaves as `Set` when the variable is unset.
    Prepend { name: String, value: String },
    /// Insert after the existing content.
    Append { name: String, value: String },
}

impl EnvOp {
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        EnvOp::Set {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn prepend(name: impl Into<String>, value: impl Into<String>) -> Self {
        EnvOp::Prepend {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn append(name: impl Into<String>, value: impl Into<String>) -> Self {
        EnvOp::Append {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The variable the operation targets.
    pub fn name(&self) -> &str {
        match self {
            EnvOp::Set { name, .. } | EnvOp::Prepend { name, .. } | EnvOp::Append { name, .. } => {
                name
            }
        }
    }

    /// The unexpanded value.
    pub fn value(&self) -> &str {
        match self {
            EnvOp::Set { value, .. }
            | EnvOp::Prepend { value, .. }
            | EnvOp::Append { value, .. } => value,
        }
    }
}

impl fmt::Display for EnvOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvOp::Set { name, value } => write!(f, "set {}={}", name, value),
            EnvOp::Prepend { name, value } => write!(f, "prepend {}={}", name, value),
            EnvOp::Append { name, value } => write!(f, "append {}={}", name, value),
        }
    }
}
