//! ruta CLI — driving adapter for the ruta router.
//!
//! Subcommands:
//! - `check <routes> [--strict]` — load a route file and report problems
//! - `dispatch <routes> <verb> <path> [--ambient] [--trace]` — resolve one request
//! - `info <routes>` — print parameter types, allowed verbs and compiled rules
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::process;
use std::sync::Arc;

use ruta::{ConfigLoad, Dispatcher, RouteLookup, RouteTable, RoutesConfig, Verb};
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "dispatch" => cmd_dispatch(&args[2..]),
        "info" => cmd_info(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<(), String> {
    let (path, flags) = split_flags(args);
    let [routes_path] = path.as_slice() else {
        return Err("check requires a route file path".into());
    };
    let strict = parse_flags(&flags, &["--strict"])?.contains(&"--strict");

    let loaded = load_table(routes_path)?;
    for warning in &loaded.warnings {
        println!("warning: {warning}");
    }
    if strict && !loaded.warnings.is_empty() {
        return Err(format!("{} warning(s) in strict mode", loaded.warnings.len()));
    }

    println!("Routes valid: {} rule(s)", loaded.table.len());
    Ok(())
}

fn cmd_dispatch(args: &[String]) -> Result<(), String> {
    let (positional, flags) = split_flags(args);
    let [routes_path, verb, path] = positional.as_slice() else {
        return Err("dispatch requires <routes> <verb> <path>".into());
    };
    let flags = parse_flags(&flags, &["--ambient", "--trace"])?;

    let loaded = load_table(routes_path)?;
    let dispatcher = Dispatcher::new(Arc::new(loaded.table)).with_options(loaded.options);
    let path = if flags.contains(&"--ambient") {
        dispatcher.options().normalize(path)
    } else {
        path.as_str()
    };

    if flags.contains(&"--trace") {
        println!("{}", dispatcher.dispatch_with_trace(path, verb));
        return Ok(());
    }

    println!("{}", describe(&dispatcher.dispatch(path, verb)));
    Ok(())
}

fn cmd_info(args: &[String]) -> Result<(), String> {
    let [routes_path] = args else {
        return Err("info requires a route file path".into());
    };
    let loaded = load_table(routes_path)?;
    let table = &loaded.table;

    println!("Parameter types:");
    for (tag, fragment) in table.param_types().iter() {
        println!("  {tag}: {fragment}");
    }

    println!("\nAllowed verbs: {}", table.allowed_verbs().names().join(", "));

    for verb in table.verbs() {
        println!("\n{verb}:");
        for rule in table.rules(verb) {
            println!(
                "  {} => {}  [{}]",
                rule.pattern(),
                rule.response(),
                rule.compiled().regex().as_str()
            );
        }
    }

    Ok(())
}

fn describe(lookup: &RouteLookup<'_>) -> String {
    match lookup {
        RouteLookup::Match(found) => {
            let params = serde_json::to_string(&found.params).unwrap_or_default();
            format!("{} {} -> {} {params}", found.verb(), found.pattern(), found.response)
        }
        RouteLookup::NotFound => "(no match)".to_owned(),
        RouteLookup::NoRulesForVerb { verb } => format!("(no rules for verb {verb})"),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Route file loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_table(path: &str) -> Result<ConfigLoad, String> {
    let config = load_config(path)?;
    RouteTable::from_config(config).map_err(|e| format!("routes invalid: {e}"))
}

fn load_config(path: &str) -> Result<RoutesConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config = if is_json {
        RoutesConfig::from_json(&content)
    } else {
        // Default to YAML (handles .yaml and .yml)
        RoutesConfig::from_yaml(&content)
    };
    config.map_err(|e| e.to_string())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

/// Separate `--flags` from positional arguments, keeping order.
fn split_flags(args: &[String]) -> (Vec<String>, Vec<String>) {
    args.iter().cloned().partition(|arg| !arg.starts_with("--"))
}

/// Check every flag against `known`, returning the matched names.
fn parse_flags<'k>(flags: &[String], known: &[&'k str]) -> Result<Vec<&'k str>, String> {
    flags
        .iter()
        .map(|flag| {
            known
                .iter()
                .copied()
                .find(|k| k == flag)
                .ok_or_else(|| format!("unexpected argument \"{flag}\""))
        })
        .collect()
}

fn print_usage() {
    eprintln!(
        "Usage: ruta <command> [options]

Commands:
  check <routes> [--strict]                        Load routes, report warnings
  dispatch <routes> <verb> <path> [--ambient] [--trace]
                                                   Resolve one request
  info <routes>                                    Print types, verbs and rules
  help                                             Show this help

Verbs: {}",
        Verb::ALL.map(Verb::as_str).join(", ")
    );
}
