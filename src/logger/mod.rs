//! Structured logging for swapbot
//!
//! Tag + level logging with per-module debug control:
//! - `logger::info(LogTag::Swap, "...")` for standard output
//! - `--debug-<module>` enables Debug level for that tag only
//! - `--verbose` enables everything, `--quiet` drops below Warning
//! - Dual output: colored console + plain-text file under `logs/`
//!
//! Call `logger::init()` once at startup before any logging occurs.

mod format;
mod levels;
mod tags;

pub use levels::LogLevel;
pub use tags::LogTag;

use crate::arguments;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct LoggerConfig {
    min_level: LogLevel,
    debug_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Initialize the logger from command-line arguments
///
/// Scans for `--debug-<module>`, `--debug`, `--verbose` and `--quiet`
/// flags, then opens the log file.
pub fn init() {
    let mut config = LoggerConfig::default();

    if arguments::is_verbose_enabled() {
        config.min_level = LogLevel::Verbose;
    } else if arguments::is_quiet_enabled() {
        config.min_level = LogLevel::Warning;
    }

    let mut debug_tags = arguments::debug_tags();
    if arguments::is_debug_all_enabled() {
        for tag in LogTag::all() {
            debug_tags.insert(tag.to_debug_key().to_string());
        }
    }
    if !debug_tags.is_empty() && config.min_level < LogLevel::Debug {
        config.min_level = LogLevel::Debug;
    }
    config.debug_tags = debug_tags;

    if let Ok(mut guard) = LOGGER_CONFIG.write() {
        *guard = config;
    }

    format::init_file_logging();
}

fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    let config = match LOGGER_CONFIG.read() {
        Ok(guard) => guard.clone(),
        Err(_) => return level <= LogLevel::Info,
    };

    // Errors always log
    if level == LogLevel::Error {
        return true;
    }

    if level > config.min_level {
        return false;
    }

    // Debug output requires the tag's debug flag (verbose mode implies all)
    if level == LogLevel::Debug && config.min_level != LogLevel::Verbose {
        return config.debug_tags.contains(tag.to_debug_key());
    }

    true
}

fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }
    format::format_and_log(tag, level, message);
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level
pub fn info(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level (only with --debug-<module>)
pub fn debug(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (only with --verbose)
pub fn verbose(tag: LogTag, message: &str) {
    log_internal(tag, LogLevel::Verbose, message);
}

/// Flush pending file writes; call during shutdown
pub fn flush() {
    format::flush_file_logging();
}
