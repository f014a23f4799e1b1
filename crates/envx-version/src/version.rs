//! Version parsing and total ordering.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

lazy_static! {
    static ref VERSION_RE: Regex = Regex::new(r"^[A-Za-z0-9_.]+$").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("invalid character in version \"{0}\"")]
    InvalidCharacter(String),
    #[error("empty token in version \"{0}\"")]
    EmptyToken(String),
    #[error("numeric token \"{token}\" in version \"{literal}\" is out of range")]
    NumericOverflow { literal: String, token: String },
}

/// One comparison unit of a version.
///
/// A token is a maximal run of ASCII digits (compared numerically, so
/// `"9" < "10"` and `"01" == "1"`) or a maximal run of letters/underscores
/// (compared lexically). When kinds differ, numeric orders before
/// alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Numeric(u64),
    Alphanumeric(String),
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Token::Numeric(a), Token::Numeric(b)) => a.cmp(b),
            (Token::Alphanumeric(a), Token::Alphanumeric(b)) => a.cmp(b),
            (Token::Numeric(_), Token::Alphanumeric(_)) => Ordering::Less,
            (Token::Alphanumeric(_), Token::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Numeric(n) => write!(f, "{}", n),
            Token::Alphanumeric(s) => f.write_str(s),
        }
    }
}

/// An immutable package version.
///
/// Parsed once via [`FromStr`]; comparison is lexicographic per token.
/// Versions with equal token sequences compare equal even when their literals
/// differ ("1.0" == "01.0"); the parsed literal is kept for display.
#[derive(Debug, Clone)]
pub struct Version {
    repr: String,
    tokens: Vec<Token>,
}

impl Version {
    /// The parsed token sequence, in order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The literal this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.repr
    }
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }
        if !VERSION_RE.is_match(s) {
            return Err(VersionParseError::InvalidCharacter(s.to_string()));
        }

        let mut tokens = Vec::new();
        for component in s.split('.') {
            if component.is_empty() {
                return Err(VersionParseError::EmptyToken(s.to_string()));
            }
            // Split the component into alternating digit and letter runs.
            let mut rest = component;
            while !rest.is_empty() {
                let numeric = rest.starts_with(|c: char| c.is_ascii_digit());
                let split = rest
                    .find(|c: char| c.is_ascii_digit() != numeric)
                    .unwrap_or(rest.len());
                let (run, tail) = rest.split_at(split);
                if numeric {
                    let value = run.parse::<u64>().map_err(|_| {
                        VersionParseError::NumericOverflow {
                            literal: s.to_string(),
                            token: run.to_string(),
                        }
                    })?;
                    tokens.push(Token::Numeric(value));
                } else {
                    tokens.push(Token::Alphanumeric(run.to_string()));
                }
                rest = tail;
            }
        }

        Ok(Version {
            repr: s.to_string(),
            tokens,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tokens.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tokens.cmp(&other.tokens)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.repr)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
