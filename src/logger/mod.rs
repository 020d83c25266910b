//! Logger module
//!
//! Provides logging utilities for the front door including:
//! - Level-filtered info/warning/error/debug output
//! - Access logging with multiple formats
//! - Startup and entry-document events
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use crate::webapp::InstallOutcome;
use std::net::SocketAddr;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn emit(level: Level, message: &str) {
    if writer::is_initialized() {
        let w = writer::get();
        if w.enabled(level) {
            w.write(level, message);
        }
    } else if level <= Level::Info {
        if level <= Level::Warn {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }
}

fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, static_dir: &Path, mounted: bool) {
    log_info("======================================");
    log_info("Mini-App front door started");
    log_info(&format!("Listening on: http://{addr}"));
    log_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        log_info(&format!("Worker threads: {workers}"));
    }
    if mounted {
        log_info(&format!(
            "Static bundle: {} mounted at {}/",
            static_dir.display(),
            config.webapp.mount_path
        ));
    } else {
        log_info("Static bundle: not mounted");
    }
    if let Some(ref path) = config.logging.access_log_file {
        log_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        log_info(&format!("Error log: {path}"));
    }
    log_info("======================================\n");
}

pub fn log_static_dir_missing(static_dir: &Path) {
    log_warning(&format!(
        "WebApp static directory does not exist: {}",
        static_dir.display()
    ));
}

pub fn log_title_install(static_dir: &Path, outcome: InstallOutcome) {
    match outcome {
        InstallOutcome::Patched { backup_created } => {
            log_info(&format!(
                "[Title] Patched {}/index.html (backup {})",
                static_dir.display(),
                if backup_created { "created" } else { "kept" }
            ));
        }
        InstallOutcome::Unchanged => log_debug("[Title] index.html already carries the title"),
        InstallOutcome::DocumentMissing => {
            log_debug("[Title] No index.html to patch, skipping");
        }
        InstallOutcome::NoOverride => log_debug("[Title] No title override configured"),
    }
}

pub fn log_entry_fallback(path: &Path, err: &impl std::fmt::Display) {
    log_error(&format!(
        "Serving {} unpatched after failure: {err}",
        path.display()
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_shutdown(active: usize) {
    log_info(&format!(
        "[Shutdown] Listener closed, {active} connection(s) still draining"
    ));
}

pub fn log_error(message: &str) {
    emit(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    emit(Level::Warn, &format!("[WARN] {message}"));
}

pub fn log_info(message: &str) {
    emit(Level::Info, message);
}

pub fn log_debug(message: &str) {
    emit(Level::Debug, &format!("[DEBUG] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
