//! Immutable catalog of package families.
//!
//! The index is populated once from an already-parsed descriptor stream (the
//! storage layer owns files and descriptor syntax) and is read-only
//! afterwards, so a resolve call always sees a consistent snapshot and
//! repeated queries for the same family return identical results.
//! Re-scanning storage produces a new index value; nothing mutates a built
//! one.

use std::collections::BTreeMap;
use std::sync::Arc;

use envx_version::{Version, VersionRange};
use thiserror::Error;

use crate::package::Package;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("duplicate package {family}-{version} in index")]
    DuplicatePackage { family: String, version: Version },
}

/// All versions published under one package name, ascending.
#[derive(Debug, Clone)]
pub struct PackageFamily {
    name: String,
    versions: Vec<Arc<Package>>,
}

impl PackageFamily {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Versions in ascending order. Restartable: each call yields a fresh
    /// iterator over the same snapshot.
    pub fn iter_versions(&self) -> impl Iterator<Item = &Arc<Package>> {
        self.versions.iter()
    }

    /// The greatest version inside `range`, if any.
    pub fn latest_in(&self, range: &VersionRange) -> Option<&Arc<Package>> {
        self.versions
            .iter()
            .rev()
            .find(|p| range.contains(&p.version))
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Accumulates packages from the storage layer, then freezes them into a
/// [`PackageIndex`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    families: BTreeMap<String, Vec<Arc<Package>>>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one parsed package descriptor. `(family, version)` pairs must be
    /// unique.
    pub fn add_package(&mut self, package: Package) -> Result<&mut Self, IndexError> {
        let versions = self.families.entry(package.name.clone()).or_default();
        if versions.iter().any(|p| p.version == package.version) {
            return Err(IndexError::DuplicatePackage {
                family: package.name,
                version: package.version,
            });
        }
        versions.push(Arc::new(package));
        Ok(self)
    }

    /// Freeze the accumulated packages into an immutable index.
    pub fn build(self) -> PackageIndex {
        let families = self
            .families
            .into_iter()
            .map(|(name, mut versions)| {
                versions.sort_by(|a, b| a.version.cmp(&b.version));
                (name.clone(), PackageFamily { name, versions })
            })
            .collect();
        PackageIndex { families }
    }
}

/// The read-only package catalog the solver queries.
///
/// Immutable after [`IndexBuilder::build`], hence `Send + Sync`; independent
/// resolve calls may share one snapshot freely.
#[derive(Debug)]
pub struct PackageIndex {
    families: BTreeMap<String, PackageFamily>,
}

impl PackageIndex {
    /// Families in name order. Restartable and finite.
    pub fn iter_families(&self) -> impl Iterator<Item = &PackageFamily> {
        self.families.values()
    }

    pub fn get_family(&self, name: &str) -> Option<&PackageFamily> {
        self.families.get(name)
    }

    /// One specific package, by family and version.
    pub fn get_package(&self, family: &str, version: &Version) -> Option<Arc<Package>> {
        self.families
            .get(family)?
            .iter_versions()
            .find(|p| p.version == *version)
            .cloned()
    }

    /// The greatest version of `family` inside `range`, if any.
    pub fn get_latest(&self, family: &str, range: &VersionRange) -> Option<Arc<Package>> {
        self.families
            .get(family)?
            .latest_in(range)
            .cloned()
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
