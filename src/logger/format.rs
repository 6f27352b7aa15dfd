/// Console and file output for the logger
///
/// Console lines are colored by level; the file mirror under `logs/` gets
/// the plain text so it stays grep-friendly.
use super::levels::LogLevel;
use super::tags::LogTag;
use colored::Colorize;
use once_cell::sync::Lazy;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "logs/swapbot.log";

static LOG_SINK: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

/// Open the log file, creating the logs directory if needed
///
/// Failure to open the file is non-fatal; console output still works.
pub fn init_file_logging() {
    if let Err(e) = std::fs::create_dir_all(LOG_DIR) {
        eprintln!("logger: cannot create {}: {}", LOG_DIR, e);
        return;
    }

    match OpenOptions::new().create(true).append(true).open(LOG_FILE) {
        Ok(file) => {
            if let Ok(mut sink) = LOG_SINK.lock() {
                *sink = Some(file);
            }
        }
        Err(e) => eprintln!("logger: cannot open {}: {}", LOG_FILE, e),
    }
}

/// Flush pending file writes (called during shutdown)
pub fn flush_file_logging() {
    if let Ok(mut sink) = LOG_SINK.lock() {
        if let Some(file) = sink.as_mut() {
            let _ = file.flush();
        }
    }
}

fn colorize_level(level: LogLevel, text: &str) -> String {
    match level {
        LogLevel::Error => text.red().bold().to_string(),
        LogLevel::Warning => text.yellow().to_string(),
        LogLevel::Info => text.green().to_string(),
        LogLevel::Debug => text.cyan().to_string(),
        LogLevel::Verbose => text.dimmed().to_string(),
    }
}

/// Format a message and write it to console and file
pub fn format_and_log(tag: LogTag, level: LogLevel, message: &str) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

    let console_line = format!(
        "{} {} [{}] {}",
        timestamp.to_string().dimmed(),
        colorize_level(level, &format!("{:7}", level.as_str())),
        tag.as_str().blue(),
        message
    );
    println!("{}", console_line);

    if let Ok(mut sink) = LOG_SINK.lock() {
        if let Some(file) = sink.as_mut() {
            let _ = writeln!(
                file,
                "{} {:7} [{}] {}",
                timestamp,
                level.as_str(),
                tag.as_str(),
                message
            );
        }
    }
}
