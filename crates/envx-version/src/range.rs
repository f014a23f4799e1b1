//! Version ranges as normalized sets of intervals.
//!
//! Grammar, as a union of `|`-separated atoms:
//!
//! - `1.2.3`: exactly that version (`==1.2.3` is an accepted alias)
//! - `1.2+`: that version or any later one
//! - `1.0+<2.0`: lower bound inclusive, upper bound exclusive
//! - `<2.0` / `<=2.0`: upper bound only
//! - the empty string: any version
//!
//! Ranges are normalized on construction: intervals are sorted ascending,
//! disjoint, and non-empty. Intersection and union preserve normalization, so
//! structural equality is semantic equality.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::version::{Version, VersionParseError};

lazy_static! {
    static ref BOUNDED_RE: Regex =
        Regex::new(r"^(?P<lower>[A-Za-z0-9_.]+)\+<(?P<eq>=?)(?P<upper>[A-Za-z0-9_.]+)$").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("malformed version range \"{0}\"")]
    Malformed(String),
    #[error("invalid version in range \"{literal}\": {source}")]
    InvalidVersion {
        literal: String,
        #[source]
        source: VersionParseError,
    },
    #[error("inverted range \"{0}\": lower bound exceeds upper bound")]
    Inverted(String),
}

/// One endpoint of an interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    version: Version,
    inclusive: bool,
}

impl Bound {
    pub fn new(version: Version, inclusive: bool) -> Self {
        Bound { version, inclusive }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }
}

/// A contiguous span of versions. `None` bounds are unbounded ends.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Interval {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl Interval {
    fn any() -> Self {
        Interval {
            lower: None,
            upper: None,
        }
    }

    fn exact(version: Version) -> Self {
        Interval {
            lower: Some(Bound::new(version.clone(), true)),
            upper: Some(Bound::new(version, true)),
        }
    }

    fn contains(&self, version: &Version) -> bool {
        if let Some(lower) = &self.lower {
            let above = match version.cmp(&lower.version) {
                Ordering::Greater => true,
                Ordering::Equal => lower.inclusive,
                Ordering::Less => false,
            };
            if !above {
                return false;
            }
        }
        if let Some(upper) = &self.upper {
            let below = match version.cmp(&upper.version) {
                Ordering::Less => true,
                Ordering::Equal => upper.inclusive,
                Ordering::Greater => false,
            };
            if !below {
                return false;
            }
        }
        true
    }

    /// An interval is empty when its bounds cross, or meet without both
    /// being inclusive.
    fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => match lower.version.cmp(&upper.version) {
                Ordering::Less => false,
                Ordering::Equal => !(lower.inclusive && upper.inclusive),
                Ordering::Greater => true,
            },
            _ => false,
        }
    }

    fn intersect(&self, other: &Interval) -> Option<Interval> {
        let candidate = Interval {
            lower: max_lower(&self.lower, &other.lower).clone(),
            upper: min_upper(&self.upper, &other.upper).clone(),
        };
        if candidate.is_empty() {
            None
        } else {
            Some(candidate)
        }
    }

    /// True when `self` and `other` overlap or touch, so their union is a
    /// single interval.
    fn joins(&self, other: &Interval) -> bool {
        let (upper, lower) = match (&self.upper, &other.lower) {
            (None, _) | (_, None) => return true,
            (Some(upper), Some(lower)) => (upper, lower),
        };
        match lower.version.cmp(&upper.version) {
            Ordering::Less => true,
            Ordering::Equal => lower.inclusive || upper.inclusive,
            Ordering::Greater => false,
        }
    }
}

/// Order two lower bounds; `None` is unbounded below. On equal versions an
/// inclusive bound admits more, so it orders first.
fn cmp_lower(a: &Option<Bound>, b: &Option<Bound>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a
            .version
            .cmp(&b.version)
            .then_with(|| b.inclusive.cmp(&a.inclusive)),
    }
}

/// Order two upper bounds; `None` is unbounded above. On equal versions an
/// exclusive bound admits less, so it orders first.
fn cmp_upper(a: &Option<Bound>, b: &Option<Bound>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a
            .version
            .cmp(&b.version)
            .then_with(|| a.inclusive.cmp(&b.inclusive)),
    }
}

fn max_lower<'a>(a: &'a Option<Bound>, b: &'a Option<Bound>) -> &'a Option<Bound> {
    if cmp_lower(a, b) == Ordering::Less {
        b
    } else {
        a
    }
}

fn min_upper<'a>(a: &'a Option<Bound>, b: &'a Option<Bound>) -> &'a Option<Bound> {
    if cmp_upper(a, b) == Ordering::Greater {
        b
    } else {
        a
    }
}

fn max_upper<'a>(a: &'a Option<Bound>, b: &'a Option<Bound>) -> &'a Option<Bound> {
    if cmp_upper(a, b) == Ordering::Less {
        b
    } else {
        a
    }
}

/// A set of acceptable versions.
///
/// Supports intersection, union, and membership tests; see the module
/// documentation for the textual grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    intervals: Vec<Interval>,
}

impl VersionRange {
    /// The range containing every version.
    pub fn any() -> Self {
        VersionRange {
            intervals: vec![Interval::any()],
        }
    }

    /// The range containing no versions.
    pub fn empty() -> Self {
        VersionRange {
            intervals: Vec::new(),
        }
    }

    /// The range containing exactly `version`.
    pub fn exact(version: Version) -> Self {
        VersionRange {
            intervals: vec![Interval::exact(version)],
        }
    }

    /// The range containing `version` and everything above it.
    pub fn at_least(version: Version) -> Self {
        VersionRange {
            intervals: vec![Interval {
                lower: Some(Bound::new(version, true)),
                upper: None,
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_any(&self) -> bool {
        self.intervals.len() == 1
            && self.intervals[0].lower.is_none()
            && self.intervals[0].upper.is_none()
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.intervals.iter().any(|i| i.contains(version))
    }

    /// The versions present in both ranges. May be empty.
    pub fn intersect(&self, other: &VersionRange) -> VersionRange {
        let mut intervals = Vec::new();
        for a in &self.intervals {
            for b in &other.intervals {
                if let Some(i) = a.intersect(b) {
                    intervals.push(i);
                }
            }
        }
        Self::normalized(intervals)
    }

    /// The versions present in either range.
    pub fn union(&self, other: &VersionRange) -> VersionRange {
        let mut intervals = self.intervals.clone();
        intervals.extend(other.intervals.iter().cloned());
        Self::normalized(intervals)
    }

    /// Sort intervals ascending and merge any that overlap or touch.
    fn normalized(mut intervals: Vec<Interval>) -> VersionRange {
        intervals.retain(|i| !i.is_empty());
        intervals.sort_by(|a, b| {
            cmp_lower(&a.lower, &b.lower).then_with(|| cmp_upper(&a.upper, &b.upper))
        });

        let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
        for interval in intervals {
            match merged.last_mut() {
                Some(last) if last.joins(&interval) => {
                    let upper = max_upper(&last.upper, &interval.upper).clone();
                    last.upper = upper;
                }
                _ => merged.push(interval),
            }
        }
        VersionRange { intervals: merged }
    }

    fn parse_atom(atom: &str, literal: &str) -> Result<Interval, RangeParseError> {
        let version = |s: &str| -> Result<Version, RangeParseError> {
            s.parse().map_err(|source| RangeParseError::InvalidVersion {
                literal: literal.to_string(),
                source,
            })
        };

        if let Some(caps) = BOUNDED_RE.captures(atom) {
            let lower = version(&caps["lower"])?;
            let upper = version(&caps["upper"])?;
            let upper_inclusive = !caps["eq"].is_empty();
            let interval = Interval {
                lower: Some(Bound::new(lower, true)),
                upper: Some(Bound::new(upper, upper_inclusive)),
            };
            if interval.is_empty() {
                return Err(RangeParseError::Inverted(literal.to_string()));
            }
            return Ok(interval);
        }

        if let Some(rest) = atom.strip_suffix('+') {
            return Ok(Interval {
                lower: Some(Bound::new(version(rest)?, true)),
                upper: None,
            });
        }
        if let Some(rest) = atom.strip_prefix("<=") {
            return Ok(Interval {
                lower: None,
                upper: Some(Bound::new(version(rest)?, true)),
            });
        }
        if let Some(rest) = atom.strip_prefix('<') {
            return Ok(Interval {
                lower: None,
                upper: Some(Bound::new(version(rest)?, false)),
            });
        }
        let exact = atom.strip_prefix("==").unwrap_or(atom);
        if exact.is_empty() {
            return Err(RangeParseError::Malformed(literal.to_string()));
        }
        Ok(Interval::exact(version(exact)?))
    }
}

impl FromStr for VersionRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(VersionRange::any());
        }
        let mut intervals = Vec::new();
        for atom in s.split('|') {
            if atom.is_empty() {
                return Err(RangeParseError::Malformed(s.to_string()));
            }
            intervals.push(Self::parse_atom(atom, s)?);
        }
        Ok(Self::normalized(intervals))
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return Ok(());
        }
        if self.intervals.is_empty() {
            // Conventional unsatisfiable form; nothing orders below "0".
            return f.write_str("<0");
        }
        for (n, interval) in self.intervals.iter().enumerate() {
            if n > 0 {
                f.write_str("|")?;
            }
            match (&interval.lower, &interval.upper) {
                (Some(lower), Some(upper)) if lower.version == upper.version => {
                    write!(f, "{}", lower.version)?;
                }
                (Some(lower), Some(upper)) => {
                    let eq = if upper.inclusive { "=" } else { "" };
                    write!(f, "{}+<{}{}", lower.version, eq, upper.version)?;
                }
                (Some(lower), None) => write!(f, "{}+", lower.version)?,
                (None, Some(upper)) => {
                    let eq = if upper.inclusive { "=" } else { "" };
                    write!(f, "<{}{}", eq, upper.version)?;
                }
                (None, None) => unreachable!("any-interval inside a multi-interval range"),
            }
        }
        Ok(())
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
