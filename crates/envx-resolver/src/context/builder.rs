//! Environment construction: dependency ordering and operation application.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use tracing::trace;

use crate::package::{EnvOp, RequestMode};
use crate::solver::{Requester, ResolutionGraph, ResolvedNode};

use super::ContextError;

/// The platform path-list separator used by `Prepend`/`Append`.
#[cfg(windows)]
pub(crate) const PATH_LIST_SEP: &str = ";";
#[cfg(not(windows))]
pub(crate) const PATH_LIST_SEP: &str = ":";

/// Order the graph's packages dependencies-first, ties broken by family name
/// ascending, so a dependent may observe variables its dependencies set.
pub(crate) fn application_order<'a>(
    graph: &'a ResolutionGraph,
) -> Result<Vec<&'a ResolvedNode>, ContextError> {
    // Family -> set of resolved families it depends on. Conflict edges are
    // negative constraints, not dependencies; edges from the request list
    // carry no ordering.
    let mut deps: BTreeMap<&str, BTreeSet<&str>> = graph
        .packages()
        .map(|n| (n.family(), BTreeSet::new()))
        .collect();
    for edge in graph.edges() {
        let Requester::Package { family: from, .. } = &edge.requester else {
            continue;
        };
        let from = from.as_str();
        if edge.request.mode == RequestMode::Conflict {
            continue;
        }
        let to = edge.request.family.as_str();
        if from != to && graph.contains(to) {
            if let Some(set) = deps.get_mut(from) {
                set.insert(to);
            }
        }
    }

    let mut order = Vec::with_capacity(deps.len());
    while !deps.is_empty() {
        // BTreeMap iteration is name-ascending, so the first ready family is
        // the tie-break winner.
        let ready = deps
            .iter()
            .find(|(_, d)| d.is_empty())
            .map(|(family, _)| *family);
        let Some(family) = ready else {
            return Err(ContextError::Cycle {
                families: deps.keys().map(|f| f.to_string()).collect(),
            });
        };
        deps.remove(family);
        for remaining in deps.values_mut() {
            remaining.remove(family);
        }
        order.push(family);
    }

    Ok(order
        .into_iter()
        .filter_map(|family| graph.get(family))
        .collect())
}

/// Apply every package's operations in order, building the final variable
/// mapping. Any evaluation failure aborts the build naming the package.
pub(crate) fn build_environ(
    order: &[&ResolvedNode],
) -> Result<IndexMap<String, String>, ContextError> {
    let mut environ: IndexMap<String, String> = IndexMap::new();
    for node in order {
        for op in &node.package.commands {
            let value =
                expand(op.value(), node).map_err(|reason| ContextError::CommandFailed {
                    package: node.qualified_name(),
                    op: op.clone(),
                    reason,
                })?;
            trace!(package = %node.qualified_name(), op = %op, "applying");
            match op {
                EnvOp::Set { name, .. } => {
                    environ.insert(name.clone(), value);
                }
                EnvOp::Prepend { name, .. } => match environ.get(name) {
                    Some(current) => {
                        let joined = format!("{}{}{}", value, PATH_LIST_SEP, current);
                        environ.insert(name.clone(), joined);
                    }
                    None => {
                        environ.insert(name.clone(), value);
                    }
                },
                EnvOp::Append { name, .. } => match environ.get(name) {
                    Some(current) => {
                        let joined = format!("{}{}{}", current, PATH_LIST_SEP, value);
                        environ.insert(name.clone(), joined);
                    }
                    None => {
                        environ.insert(name.clone(), value);
                    }
                },
            }
        }
    }
    Ok(environ)
}

/// Expand `{token}` substitutions in an operation value. Only `{root}` is
/// defined; anything else is an evaluation error.
fn expand(value: &str, node: &ResolvedNode) -> Result<String, String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err("unmatched '{' in value".to_string());
        };
        let token = &after[..close];
        match token {
            "root" => match &node.package.root {
                Some(root) => out.push_str(&root.display().to_string()),
                None => return Err("package has no install root".to_string()),
            },
            other => return Err(format!("unknown substitution token {{{}}}", other)),
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
