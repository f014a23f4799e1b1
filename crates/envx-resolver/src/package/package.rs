//! Catalog packages and their variants.

use std::fmt;
use std::path::PathBuf;

use envx_version::Version;

use super::{EnvOp, PackageRequest};

/// One alternative dependency configuration of a package version.
///
/// A package with no variants behaves as having a single implicit empty
/// variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variant {
    pub requires: Vec<PackageRequest>,
}

impl Variant {
    pub fn new(requires: Vec<PackageRequest>) -> Self {
        Variant { requires }
    }
}

/// One version of a package family, as stored in the index.
///
/// Fields mirror what the storage layer parses out of a package descriptor:
/// requirements, variants, environment commands, install root, and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub version: Version,
    pub variants: Vec<Variant>,
    pub requires: Vec<PackageRequest>,
    pub commands: Vec<EnvOp>,
    pub root: Option<PathBuf>,
    pub description: Option<String>,
    pub authors: Vec<String>,
}

impl Package {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Package {
            name: name.into(),
            version,
            variants: Vec::new(),
            requires: Vec::new(),
            commands: Vec::new(),
            root: None,
            description: None,
            authors: Vec::new(),
        }
    }

    /// `family-version`, the conventional display form.
    pub fn qualified_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// The requirements of one configuration: the package's own requirements
    /// followed by the chosen variant's, in declaration order.
    pub fn effective_requires(
        &self,
        variant: Option<usize>,
    ) -> impl Iterator<Item = &PackageRequest> {
        let variant_requires = variant
            .and_then(|i| self.variants.get(i))
            .map(|v| v.requires.as_slice())
            .unwrap_or(&[]);
        self.requires.iter().chain(variant_requires.iter())
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ver(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn req(s: &str) -> PackageRequest {
        s.parse().unwrap()
    }

    #[test]
    fn test_qualified_name() {
        let p = Package::new("myapp", ver("1.0.0"));
        assert_eq!(p.qualified_name(), "myapp-1.0.0");
        assert_eq!(p.to_string(), "myapp-1.0.0");
    }

    #[test]
    fn test_effective_requires_without_variant() {
        let mut p = Package::new("myapp", ver("1.0.0"));
        p.requires = vec![req("base")];
        let reqs: Vec<_> = p.effective_requires(None).collect();
        assert_eq!(reqs, vec![&req("base")]);
    }

    #[test]
    fn test_effective_requires_appends_variant() {
        let mut p = Package::new("myapp", ver("1.0.0"));
        p.requires = vec![req("base")];
        p.variants = vec![
            Variant::new(vec![req("python-3.7")]),
            Variant::new(vec![req("python-3.9")]),
        ];
        let reqs: Vec<_> = p.effective_requires(Some(1)).collect();
        assert_eq!(reqs, vec![&req("base"), &req("python-3.9")]);
    }
}
