/// Command-line argument helpers
///
/// Arguments are captured once at startup and scanned by simple flag
/// matching. No subcommands; everything is configured via configs.json,
/// flags only control diagnostics.
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::env;
use std::sync::Mutex;

pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

fn has_flag(flag: &str) -> bool {
    if let Ok(args) = CMD_ARGS.lock() {
        args.iter().any(|a| a == flag)
    } else {
        false
    }
}

/// Collect the modules named by `--debug-<module>` flags
pub fn debug_tags() -> HashSet<String> {
    let mut tags = HashSet::new();
    if let Ok(args) = CMD_ARGS.lock() {
        for arg in args.iter() {
            if let Some(tag) = arg.strip_prefix("--debug-") {
                if !tag.is_empty() {
                    tags.insert(tag.to_string());
                }
            }
        }
    }
    tags
}

/// Bare `--debug` enables debug output for every module
pub fn is_debug_all_enabled() -> bool {
    has_flag("--debug")
}

pub fn is_verbose_enabled() -> bool {
    has_flag("--verbose")
}

pub fn is_quiet_enabled() -> bool {
    has_flag("--quiet")
}

pub fn is_help_requested() -> bool {
    has_flag("--help") || has_flag("-h")
}

/// Path to the runtime config file, overridable with `--config <path>`
pub fn config_path() -> String {
    if let Ok(args) = CMD_ARGS.lock() {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--config" {
                if let Some(path) = iter.next() {
                    return path.clone();
                }
            }
        }
    }
    "configs.json".to_string()
}

pub fn print_help() {
    println!("swapbot - webhook-driven Solana swap execution service");
    println!();
    println!("USAGE:");
    println!("    swapbot [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --config <path>     Config file path (default: configs.json)");
    println!("    --debug             Enable debug output for all modules");
    println!("    --debug-<module>    Enable debug output for one module");
    println!("                        (system, config, wallet, rpc, swap, quote,");
    println!("                         transaction, bundle, webserver)");
    println!("    --verbose           Enable verbose trace output");
    println!("    --quiet             Only show warnings and errors");
    println!("    --help, -h          Show this help");
}
