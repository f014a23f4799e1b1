//! Pure comparison of two resolved contexts.

use std::fmt;

use serde::Serialize;

use crate::solver::ResolvedPackage;

use super::EnvironmentContext;

/// A package family present in both contexts at different versions,
/// variants, or roots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageChange {
    pub family: String,
    pub from: ResolvedPackage,
    pub to: ResolvedPackage,
}

/// A variable present in both contexts with different values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableChange {
    pub name: String,
    pub from: String,
    pub to: String,
}

/// What the second context adds, removes, or changes relative to the first.
///
/// Computed purely from two [`EnvironmentContext`] values, so saved contexts
/// can be compared long after the indexes that produced them are gone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContextDiff {
    pub added_packages: Vec<ResolvedPackage>,
    pub removed_packages: Vec<ResolvedPackage>,
    pub changed_packages: Vec<PackageChange>,
    pub added_variables: Vec<(String, String)>,
    pub removed_variables: Vec<(String, String)>,
    pub changed_variables: Vec<VariableChange>,
}

impl ContextDiff {
    pub(crate) fn between(from: &EnvironmentContext, to: &EnvironmentContext) -> Self {
        let mut diff = ContextDiff::default();

        for before in from.packages() {
            match to.packages().iter().find(|p| p.family == before.family) {
                None => diff.removed_packages.push(before.clone()),
                Some(after) if after != before => diff.changed_packages.push(PackageChange {
                    family: before.family.clone(),
                    from: before.clone(),
                    to: after.clone(),
                }),
                Some(_) => {}
            }
        }
        for after in to.packages() {
            if !from.packages().iter().any(|p| p.family == after.family) {
                diff.added_packages.push(after.clone());
            }
        }

        for (name, before) in from.variables() {
            match to.variables().get(name) {
                None => diff
                    .removed_variables
                    .push((name.clone(), before.clone())),
                Some(after) if after != before => diff.changed_variables.push(VariableChange {
                    name: name.clone(),
                    from: before.clone(),
                    to: after.clone(),
                }),
                Some(_) => {}
            }
        }
        for (name, after) in to.variables() {
            if !from.variables().contains_key(name) {
                diff.added_variables.push((name.clone(), after.clone()));
            }
        }

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added_packages.is_empty()
            && self.removed_packages.is_empty()
            && self.changed_packages.is_empty()
            && self.added_variables.is_empty()
            && self.removed_variables.is_empty()
            && self.changed_variables.is_empty()
    }
}

impl fmt::Display for ContextDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("contexts are identical");
        }
        for p in &self.added_packages {
            writeln!(f, "+ {}", p)?;
        }
        for p in &self.removed_packages {
            writeln!(f, "- {}", p)?;
        }
        for c in &self.changed_packages {
            writeln!(f, "~ {}: {} -> {}", c.family, c.from, c.to)?;
        }
        for (name, value) in &self.added_variables {
            writeln!(f, "+ {}={}", name, value)?;
        }
        for (name, value) in &self.removed_variables {
            writeln!(f, "- {}={}", name, value)?;
        }
        for c in &self.changed_variables {
            writeln!(f, "~ {}: {} -> {}", c.name, c.from, c.to)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::package::{EnvOp, Package, PackageRequest};
    use crate::solver::Solver;
    use envx_version::Version;

    fn ver(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn context_of(packages: Vec<Package>, requests: Vec<&str>) -> EnvironmentContext {
        let mut builder = IndexBuilder::new();
        for package in packages {
            builder.add_package(package).unwrap();
        }
        let index = builder.build();
        let requests: Vec<PackageRequest> =
            requests.into_iter().map(|s| s.parse().unwrap()).collect();
        let graph = Solver::new(&index).resolve(&requests).unwrap();
        EnvironmentContext::build(&graph).unwrap()
    }

    #[test]
    fn test_identical_contexts_diff_empty() {
        let make = || {
            let mut a = Package::new("a", ver("1.0"));
            a.commands = vec![EnvOp::set("X", "1")];
            context_of(vec![a], vec!["a"])
        };
        let diff = make().diff(&make());
        assert!(diff.is_empty());
        assert_eq!(diff.to_string(), "contexts are identical");
    }

    #[test]
    fn test_diff_reports_package_and_variable_changes() {
        let mut a1 = Package::new("a", ver("1.0"));
        a1.commands = vec![EnvOp::set("X", "1"), EnvOp::set("OLD", "yes")];
        let old = context_of(vec![a1], vec!["a"]);

        let mut a2 = Package::new("a", ver("2.0"));
        a2.commands = vec![EnvOp::set("X", "2"), EnvOp::set("NEW", "yes")];
        let mut b = Package::new("b", ver("1.0"));
        b.commands = vec![];
        let new = context_of(vec![a2, b], vec!["a", "b"]);

        let diff = old.diff(&new);
        assert_eq!(diff.added_packages.len(), 1);
        assert_eq!(diff.added_packages[0].family, "b");
        assert!(diff.removed_packages.is_empty());
        assert_eq!(diff.changed_packages.len(), 1);
        assert_eq!(diff.changed_packages[0].from.version, ver("1.0"));
        assert_eq!(diff.changed_packages[0].to.version, ver("2.0"));

        assert_eq!(diff.added_variables, vec![("NEW".to_string(), "yes".to_string())]);
        assert_eq!(
            diff.removed_variables,
            vec![("OLD".to_string(), "yes".to_string())]
        );
        assert_eq!(diff.changed_variables.len(), 1);
        assert_eq!(diff.changed_variables[0].name, "X");
    }
}
