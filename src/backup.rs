//! Periodic copies of the SQLite database.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use tokio::task::JoinHandle;

use crate::{Error, config::scheduler_period, timezone::local_now};

const BACKUP_PREFIX: &str = "cheques_";
const BACKUP_EXTENSION: &str = ".db";
const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year][month][day]_[hour][minute][second]");

/// Write a consistent copy of the database to `backup_dir/cheques_{YYYYmmdd_HHMMSS}.db`.
///
/// Returns the path of the new file.
///
/// # Errors
/// Returns [Error::BackupError] if the directory cannot be created, a backup with the same
/// timestamp already exists or SQLite cannot write the copy.
pub fn create_backup(
    connection: &Connection,
    backup_dir: &Path,
    now: OffsetDateTime,
) -> Result<PathBuf, Error> {
    fs::create_dir_all(backup_dir).map_err(|error| Error::BackupError(error.to_string()))?;

    let timestamp = now
        .format(TIMESTAMP_FORMAT)
        .map_err(|error| Error::BackupError(error.to_string()))?;
    let path = backup_dir.join(format!("{BACKUP_PREFIX}{timestamp}{BACKUP_EXTENSION}"));
    let path_text = path
        .to_str()
        .ok_or_else(|| Error::BackupError(format!("invalid path {}", path.display())))?;

    connection
        .execute("VACUUM INTO ?1", [path_text])
        .map_err(|error| Error::BackupError(error.to_string()))?;

    Ok(path)
}

/// Delete all but the `keep` newest backups in `backup_dir`.
///
/// Files that do not look like backups are left alone. Returns the number of deleted files.
pub fn prune_backups(backup_dir: &Path, keep: usize) -> Result<usize, Error> {
    let entries = match fs::read_dir(backup_dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(error) => return Err(Error::BackupError(error.to_string())),
    };

    let mut backups = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_backup_file(path))
        .collect::<Vec<_>>();
    // The timestamp format sorts lexicographically, newest last.
    backups.sort_unstable();

    let excess = backups.len().saturating_sub(keep);
    for path in &backups[..excess] {
        fs::remove_file(path).map_err(|error| Error::BackupError(error.to_string()))?;
        tracing::debug!("deleted old backup {}", path.display());
    }

    Ok(excess)
}

fn is_backup_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix(BACKUP_PREFIX))
        .and_then(|name| name.strip_suffix(BACKUP_EXTENSION))
        .is_some_and(|timestamp| {
            timestamp.len() == 15
                && timestamp
                    .chars()
                    .enumerate()
                    .all(|(i, c)| if i == 8 { c == '_' } else { c.is_ascii_digit() })
        })
}

/// Back up the database every `interval_hours` hours, keeping the `retention` newest copies.
///
/// The first backup is taken one interval after start-up. Errors are logged and the loop
/// keeps going.
pub fn spawn_backup_scheduler(
    db_connection: Arc<Mutex<Connection>>,
    backup_dir: PathBuf,
    local_timezone: String,
    interval_hours: u64,
    retention: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = scheduler_period(interval_hours);
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let now = local_now(&local_timezone).unwrap_or_else(OffsetDateTime::now_utc);
            let result = match db_connection.lock() {
                Ok(connection) => create_backup(&connection, &backup_dir, now),
                Err(error) => {
                    tracing::error!("could not acquire database lock: {error}");
                    continue;
                }
            };

            match result {
                Ok(path) => tracing::info!("wrote database backup {}", path.display()),
                Err(error) => {
                    tracing::error!("database backup failed: {error}");
                    continue;
                }
            }

            match prune_backups(&backup_dir, retention) {
                Ok(0) => {}
                Ok(count) => tracing::info!("pruned {count} old backup(s)"),
                Err(error) => tracing::error!("could not prune backups: {error}"),
            }
        }
    })
}
