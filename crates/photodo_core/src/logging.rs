//! Metadata-only logging for Photodo core.
//!
//! # Responsibility
//! - Own the rule for what a log line may carry: event names, counts,
//!   durations and stable error codes.
//! - Start the rolling file backend once per process.
//! - Record panics by location only.
//!
//! # Invariants
//! - Task titles, dates, photo locators and raw payload text never reach a
//!   log line. Errors are logged through [`LogCode`], never through `Display`,
//!   because decode and storage errors can quote the offending input.
//! - Init is idempotent for the same level and directory and rejects any
//!   other configuration once active.
//! - Init never panics.

use crate::db::DbError;
use crate::repo::task_repo::RepoError;
use crate::service::task_store::StoreError;
use crate::storage::StorageError;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use serde_json::error::Category;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "photodo";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Stable, content-free code used as the `error_code=` field of an event.
pub trait LogCode {
    fn log_code(&self) -> &'static str;
}

impl LogCode for serde_json::Error {
    fn log_code(&self) -> &'static str {
        match self.classify() {
            Category::Io => "json_io",
            Category::Syntax => "json_syntax",
            Category::Data => "json_shape",
            Category::Eof => "json_truncated",
        }
    }
}

impl LogCode for DbError {
    fn log_code(&self) -> &'static str {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => match err.code {
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    "db_busy"
                }
                rusqlite::ErrorCode::CannotOpen | rusqlite::ErrorCode::PermissionDenied => {
                    "db_cannot_open"
                }
                rusqlite::ErrorCode::DiskFull => "db_disk_full",
                rusqlite::ErrorCode::DatabaseCorrupt | rusqlite::ErrorCode::NotADatabase => {
                    "db_corrupt"
                }
                _ => "db_sqlite",
            },
            Self::Sqlite(_) => "db_sqlite",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
        }
    }
}

impl LogCode for StorageError {
    fn log_code(&self) -> &'static str {
        match self {
            Self::Db(err) => err.log_code(),
            Self::Unavailable(_) => "storage_unavailable",
        }
    }
}

impl LogCode for RepoError {
    fn log_code(&self) -> &'static str {
        match self {
            Self::Storage(err) => err.log_code(),
            Self::Encode(_) => "task_list_encode",
            Self::InvalidData(_) => "task_list_invalid",
        }
    }
}

impl LogCode for StoreError {
    fn log_code(&self) -> &'static str {
        match self {
            Self::Repo(err) => err.log_code(),
            Self::Validation(_) => "task_invalid",
            Self::TaskNotFound(_) => "task_not_found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogConfig {
    level: &'static str,
    dir: PathBuf,
}

impl LogConfig {
    fn parse(level: &str, log_dir: &str) -> Result<Self, String> {
        let lowered = level.trim().to_ascii_lowercase();
        let wanted = if lowered == "warning" {
            "warn"
        } else {
            lowered.as_str()
        };
        let level = LEVELS
            .into_iter()
            .find(|known| *known == wanted)
            .ok_or_else(|| {
                format!(
                    "unsupported log level `{wanted}`; expected {}",
                    LEVELS.join("|")
                )
            })?;

        let dir = log_dir.trim();
        if dir.is_empty() {
            return Err("log_dir cannot be empty".to_string());
        }
        let dir = Path::new(dir);
        if !dir.is_absolute() {
            return Err(format!(
                "log_dir must be an absolute path, got `{}`",
                dir.display()
            ));
        }
        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }
}

struct ActiveLogger {
    config: LogConfig,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn start(config: LogConfig) -> Result<Self, String> {
        std::fs::create_dir_all(&config.dir).map_err(|err| {
            format!(
                "failed to create log directory `{}`: {err}",
                config.dir.display()
            )
        })?;

        let handle = Logger::try_with_str(config.level)
            .map_err(|err| format!("invalid log level `{}`: {err}", config.level))?
            .log_to_file(
                FileSpec::default()
                    .directory(config.dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(ROTATE_AT_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        Ok(Self {
            config,
            _handle: handle,
        })
    }

    fn check(&self, wanted: &LogConfig) -> Result<(), String> {
        if self.config == *wanted {
            return Ok(());
        }
        Err(format!(
            "logging already active as `{}` in `{}`; refusing to switch to `{}` in `{}`",
            self.config.level,
            self.config.dir.display(),
            wanted.level,
            wanted.dir.display()
        ))
    }
}

/// Starts rolling file logs under `log_dir` at `level`.
///
/// A blank `level` selects [`default_log_level`]. Repeating the call with the
/// same arguments is a no-op.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error`.
/// - `log_dir` is empty, relative, or cannot be created.
/// - Logging is already active with a different level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = if level.trim().is_empty() {
        default_log_level()
    } else {
        level
    };
    let wanted = LogConfig::parse(level, log_dir)?;

    let active = ACTIVE.get_or_try_init(|| {
        let active = ActiveLogger::start(wanted.clone())?;
        install_panic_hook();
        info!(
            "event=logging_init module=core status=ok level={} platform={} version={}",
            active.config.level,
            std::env::consts::OS,
            env!("CARGO_PKG_VERSION")
        );
        Ok::<_, String>(active)
    })?;
    active.check(&wanted)
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // Payloads of `expect`/`assert` messages can carry task text; log size only.
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic_captured module=core status=error location={location} payload_chars={}",
            panic_payload_chars(info)
        );
        previous(info);
    }));
}

fn panic_payload_chars(info: &std::panic::PanicHookInfo<'_>) -> usize {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|message| message.chars().count())
        .or_else(|| {
            payload
                .downcast_ref::<String>()
                .map(|message| message.chars().count())
        })
        .unwrap_or(0)
}
