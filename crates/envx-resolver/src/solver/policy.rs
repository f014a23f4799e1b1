//! Candidate ordering policy.

use std::sync::Arc;

use crate::index::PackageFamily;
use crate::package::Package;

use super::decisions::FamilyConstraint;

/// One `(version, variant)` the solver may try for a family.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub package: Arc<Package>,
    pub variant: Option<usize>,
}

impl Candidate {
    /// `family-version` with the variant index appended when present.
    pub fn describe(&self) -> String {
        match self.variant {
            Some(variant) => format!("{}[{}]", self.package.qualified_name(), variant),
            None => self.package.qualified_name(),
        }
    }
}

/// Decides which candidate to try first when several could satisfy a
/// requirement. The defaults are the production ordering; `prefer_lowest`
/// flips version preference, which is mostly useful in tests.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub prefer_lowest: bool,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set preference for lowest versions.
    pub fn prefer_lowest(mut self, prefer: bool) -> Self {
        self.prefer_lowest = prefer;
        self
    }

    /// Enumerate the candidates for `family` permitted by `constraint`, best
    /// first: versions descending (ascending under `prefer_lowest`), and
    /// within a version, variants by fewest requirements then declaration
    /// order. Later entries are reached on backtrack.
    pub(crate) fn candidates(
        &self,
        family: &PackageFamily,
        constraint: &FamilyConstraint,
    ) -> Vec<Candidate> {
        let mut versions: Vec<&Arc<Package>> = family
            .iter_versions()
            .filter(|p| constraint.permits(&p.version))
            .collect();
        if !self.prefer_lowest {
            versions.reverse();
        }

        let mut candidates = Vec::new();
        for package in versions {
            if package.variants.is_empty() {
                candidates.push(Candidate {
                    package: Arc::clone(package),
                    variant: None,
                });
            } else {
                let mut order: Vec<usize> = (0..package.variants.len()).collect();
                order.sort_by_key(|&i| (package.variants[i].requires.len(), i));
                for variant in order {
                    candidates.push(Candidate {
                        package: Arc::clone(package),
                        variant: Some(variant),
                    });
                }
            }
        }
        candidates
    }
}
