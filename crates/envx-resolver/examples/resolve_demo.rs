use envx_resolver::context::EnvironmentContext;
use envx_resolver::index::{IndexBuilder, PackageIndex};
use envx_resolver::package::{EnvOp, Package, PackageRequest, Variant};
use envx_resolver::solver::{ResolveError, Solver};
use envx_resolver::Version;

fn ver(s: &str) -> Version {
    s.parse().unwrap()
}

fn req(s: &str) -> PackageRequest {
    s.parse().unwrap()
}

fn sample_index() -> PackageIndex {
    let mut builder = IndexBuilder::new();

    for v in ["3.7", "3.9", "3.11"] {
        let mut python = Package::new("python", ver(v));
        python.root = Some(format!("/packages/python/{}", v).into());
        python.commands = vec![
            EnvOp::set("PYTHON_ROOT", "{root}"),
            EnvOp::prepend("PATH", "{root}/bin"),
        ];
        builder.add_package(python).unwrap();
    }

    let mut maya = Package::new("maya", ver("2023.1"));
    maya.description = Some("DCC application".to_string());
    maya.requires = vec![req("python-3.7+<3.10")];
    maya.root = Some("/packages/maya/2023.1".into());
    maya.commands = vec![EnvOp::prepend("PATH", "{root}/bin")];
    builder.add_package(maya).unwrap();

    let mut myapp = Package::new("myapp", ver("1.0.0"));
    myapp.description = Some("A sample package".to_string());
    myapp.authors = vec!["Example Author".to_string()];
    myapp.variants = vec![
        Variant::new(vec![req("python-3.9")]),
        Variant::new(vec![req("python-3.11")]),
    ];
    myapp.root = Some("/packages/myapp/1.0.0".into());
    myapp.commands = vec![
        EnvOp::set("MYAPP_ROOT", "{root}"),
        EnvOp::append("PYTHONPATH", "{root}/lib"),
    ];
    builder.add_package(myapp).unwrap();

    builder.build()
}

fn main() {
    println!("=== envx Resolver Demo ===\n");

    let index = sample_index();

    // Example 1: browsing the index
    println!("1. Package families:");
    for family in index.iter_families() {
        let versions: Vec<String> = family
            .iter_versions()
            .map(|p| p.version.to_string())
            .collect();
        println!("   {} ({})", family.name(), versions.join(", "));
    }
    println!();

    // Example 2: resolving an environment
    println!("2. Resolving [myapp, maya]:");
    let requests = vec![req("myapp"), req("maya")];
    let graph = Solver::new(&index).resolve(&requests).unwrap();
    for node in graph.packages() {
        println!("   {}", node.qualified_name());
        for edge in graph.requirements_of(node.family()) {
            println!("     requires {}", edge.request.descriptor());
        }
    }
    println!();

    // Example 3: the derived environment
    println!("3. Environment variables:");
    let context = EnvironmentContext::build(&graph).unwrap();
    for (name, value) in context.variables() {
        println!("   {}={}", name, value);
    }
    println!();

    // Example 4: an unsolvable request, with its explanation
    println!("4. Conflicting request [maya, python-3.11]:");
    match Solver::new(&index).resolve(&[req("maya"), req("python-3.11")]) {
        Ok(_) => unreachable!(),
        Err(ResolveError::Unresolved(conflict)) => {
            println!("   {}", conflict.to_string().replace('\n', "\n   "));
        }
        Err(other) => println!("   {}", other),
    }
}
