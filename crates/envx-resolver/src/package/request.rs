//! The package request grammar.
//!
//! A request literal is a family name with an optional version range and an
//! optional mode prefix:
//!
//! - `python`: any version of `python`
//! - `python-3.9`: exactly version 3.9
//! - `python-3.7+<4`: any version in `[3.7, 4)`
//! - `~python-3.9+`: weak, does not pull `python` in but constrains it if
//!   something else does
//! - `!python-2+`: conflict, `python` must not resolve inside `2+`
//!
//! Family names are `[A-Za-z][A-Za-z0-9_]*`, so the first `-` always splits
//! family from range.

use std::fmt;
use std::str::FromStr;

use envx_version::{RangeParseError, VersionRange};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestParseError {
    #[error("empty package request")]
    Empty,
    #[error("invalid family name in request \"{0}\"")]
    InvalidFamily(String),
    #[error("missing range after \"-\" in request \"{0}\"")]
    MissingRange(String),
    #[error("invalid range in request \"{literal}\": {source}")]
    InvalidRange {
        literal: String,
        #[source]
        source: RangeParseError,
    },
}

/// How a request constrains its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMode {
    /// The family must resolve, inside the range.
    Strong,
    /// The family is not demanded, but must sit inside the range if anything
    /// else pulls it in.
    Weak,
    /// The family must not resolve inside the range.
    Conflict,
}

/// A single constraint on one package family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    pub family: String,
    pub range: VersionRange,
    pub mode: RequestMode,
}

impl PackageRequest {
    /// A strong request for `family` inside `range`.
    pub fn new(family: impl Into<String>, range: VersionRange) -> Self {
        PackageRequest {
            family: family.into(),
            range,
            mode: RequestMode::Strong,
        }
    }

    pub fn weak(family: impl Into<String>, range: VersionRange) -> Self {
        PackageRequest {
            family: family.into(),
            range,
            mode: RequestMode::Weak,
        }
    }

    pub fn conflict(family: impl Into<String>, range: VersionRange) -> Self {
        PackageRequest {
            family: family.into(),
            range,
            mode: RequestMode::Conflict,
        }
    }

    /// The `family-range` part without the mode prefix, as used in
    /// conflict explanations.
    pub fn descriptor(&self) -> String {
        if self.range.is_any() {
            self.family.clone()
        } else {
            format!("{}-{}", self.family, self.range)
        }
    }
}

fn valid_family(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for PackageRequest {
    type Err = RequestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mode, rest) = if let Some(rest) = s.strip_prefix('~') {
            (RequestMode::Weak, rest)
        } else if let Some(rest) = s.strip_prefix('!') {
            (RequestMode::Conflict, rest)
        } else {
            (RequestMode::Strong, s)
        };
        if rest.is_empty() {
            return Err(RequestParseError::Empty);
        }

        let (family, range) = match rest.split_once('-') {
            None => (rest, VersionRange::any()),
            Some((_, "")) => return Err(RequestParseError::MissingRange(s.to_string())),
            Some((family, range)) => {
                let range =
                    range
                        .parse()
                        .map_err(|source| RequestParseError::InvalidRange {
                            literal: s.to_string(),
                            source,
                        })?;
                (family, range)
            }
        };
        if !valid_family(family) {
            return Err(RequestParseError::InvalidFamily(s.to_string()));
        }

        Ok(PackageRequest {
            family: family.to_string(),
            range,
            mode,
        })
    }
}

impl fmt::Display for PackageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            RequestMode::Strong => {}
            RequestMode::Weak => f.write_str("~")?,
            RequestMode::Conflict => f.write_str("!")?,
        }
        f.write_str(&self.descriptor())
    }
}

impl Serialize for PackageRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PackageRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
