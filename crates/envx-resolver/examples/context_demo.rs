use envx_resolver::context::EnvironmentContext;
use envx_resolver::index::{IndexBuilder, PackageIndex};
use envx_resolver::package::{EnvOp, Package, PackageRequest};
use envx_resolver::solver::Solver;
use envx_resolver::Version;

fn ver(s: &str) -> Version {
    s.parse().unwrap()
}

fn req(s: &str) -> PackageRequest {
    s.parse().unwrap()
}

fn sample_index() -> PackageIndex {
    let mut builder = IndexBuilder::new();
    for v in ["3.7", "3.9"] {
        let mut python = Package::new("python", ver(v));
        python.root = Some(format!("/packages/python/{}", v).into());
        python.commands = vec![
            EnvOp::set("PYTHON_ROOT", "{root}"),
            EnvOp::prepend("PATH", "{root}/bin"),
        ];
        builder.add_package(python).unwrap();
    }
    builder.build()
}

fn resolve_context(index: &PackageIndex, request: &str) -> EnvironmentContext {
    let graph = Solver::new(index).resolve(&[req(request)]).unwrap();
    EnvironmentContext::build(&graph).unwrap()
}

fn main() {
    println!("=== envx Context Demo ===\n");

    let index = sample_index();
    let dir = std::env::temp_dir();

    // Example 1: resolve and persist two environments
    println!("1. Saving two contexts:");
    let old = resolve_context(&index, "python-3.7");
    let new = resolve_context(&index, "python-3.9");

    let old_path = dir.join("env-python37.json");
    let new_path = dir.join("env-python39.json");
    old.save(&old_path).unwrap();
    new.save(&new_path).unwrap();
    println!("   wrote {}", old_path.display());
    println!("   wrote {}", new_path.display());
    println!();

    // Example 2: reload without the index and inspect
    println!("2. Loading {} back:", old_path.display());
    let loaded = EnvironmentContext::load(&old_path).unwrap();
    for package in loaded.packages() {
        println!("   resolved {}", package);
    }
    for (name, value) in loaded.variables() {
        println!("   {}={}", name, value);
    }
    println!();

    // Example 3: diff the two saved environments
    println!("3. Diff:");
    let diff = loaded.diff(&EnvironmentContext::load(&new_path).unwrap());
    for line in diff.to_string().lines() {
        println!("   {}", line);
    }
}
