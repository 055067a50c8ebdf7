//! Unified logging for the host and its renderers.
//!
//! Everything goes through the `log` facade. `env_logger` formats records
//! and pipes them into a sink that writes to stderr in debug builds and to
//! a daily log file once the app log directory is known. Files rotate at
//! 5MB and only the newest five are kept.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tauri::{command, AppHandle, Manager};

/// Maximum log file size before rotation (5MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum number of log files to keep
const MAX_LOG_FILES: usize = 5;

const LOG_FILE_PREFIX: &str = "recorder_";

#[derive(Default)]
struct LogSink {
    dir: Option<PathBuf>,
    file: Option<File>,
}

lazy_static::lazy_static! {
    static ref LOG_SINK: Mutex<LogSink> = Mutex::new(LogSink::default());
}

/// Install the global logger. Filter comes from `RUST_LOG`, default `info`.
pub fn init() {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(TeeWriter)))
        .try_init();

    if let Err(e) = result {
        eprintln!("Logger already initialized: {}", e);
    }
}

/// Start writing to the app log directory.
pub fn attach_log_dir(app: &AppHandle) -> Result<PathBuf, String> {
    let log_dir = app
        .path()
        .app_log_dir()
        .map_err(|e| format!("Failed to get log directory: {}", e))?;

    fs::create_dir_all(&log_dir).map_err(|e| format!("Failed to create log directory: {}", e))?;

    let file = open_log_file(&current_log_path(&log_dir))
        .map_err(|e| format!("Failed to open log file: {}", e))?;

    {
        let mut sink = LOG_SINK.lock();
        sink.dir = Some(log_dir.clone());
        sink.file = Some(file);
    }

    cleanup_old_logs(&log_dir, MAX_LOG_FILES);
    log::info!("[LOG] Log directory: {:?}", log_dir);
    Ok(log_dir)
}

/// Writer handed to `env_logger`.
struct TeeWriter;

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        #[cfg(debug_assertions)]
        {
            let _ = io::stderr().write_all(buf);
        }

        let mut sink = LOG_SINK.lock();
        if let Some(file) = sink.file.as_mut() {
            let _ = file.write_all(buf);
        }
        rotate_if_needed(&mut sink);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = LOG_SINK.lock().file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Path for the current log file (one per day)
fn current_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("{}{}.log", LOG_FILE_PREFIX, Local::now().format("%Y-%m-%d")))
}

/// Rotate when today's file is too big or the day changed.
fn rotate_if_needed(sink: &mut LogSink) {
    let Some(log_dir) = sink.dir.clone() else {
        return;
    };
    let current_path = current_log_path(&log_dir);

    match fs::metadata(&current_path) {
        Ok(metadata) if metadata.len() > MAX_LOG_SIZE => {
            let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");
            let rotated_path = log_dir.join(format!("{}{}.log", LOG_FILE_PREFIX, timestamp));
            let _ = fs::rename(&current_path, &rotated_path);
        },
        Ok(_) => return,
        // New day: today's file does not exist yet
        Err(_) => {},
    }

    if let Ok(file) = open_log_file(&current_path) {
        sink.file = Some(file);
    }
    cleanup_old_logs(&log_dir, MAX_LOG_FILES);
}

/// Keep only the `keep` most recently modified `.log` files.
fn cleanup_old_logs(log_dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "log"))
        .collect();

    // Newest first
    log_files.sort_by(|a, b| {
        let a_time = a.metadata().and_then(|m| m.modified()).ok();
        let b_time = b.metadata().and_then(|m| m.modified()).ok();
        b_time.cmp(&a_time)
    });

    for file in log_files.into_iter().skip(keep) {
        let _ = fs::remove_file(file.path());
    }
}

/// Map a renderer level name to a log level. Unknown names log at info.
pub fn parse_level(level: &str) -> log::Level {
    match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "warn" | "warning" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    }
}

// ============================================================================
// Tauri Commands
// ============================================================================

/// Write a log message from a renderer
#[command]
pub fn write_log(level: String, source: String, message: String) {
    log::log!(target: source.as_str(), parse_level(&level), "{}", message);
}

/// Get the log directory path
#[command]
pub fn get_log_dir(app: AppHandle) -> Result<String, String> {
    let log_dir = app
        .path()
        .app_log_dir()
        .map_err(|e| format!("Failed to get log directory: {}", e))?;

    Ok(log_dir.to_string_lossy().to_string())
}
