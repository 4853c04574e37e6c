//! Server configuration read from command line flags and environment variables.

use std::{path::PathBuf, time::Duration};

use clap::{ArgAction, Parser};

use crate::timezone::get_local_offset;

/// The longest period accepted for the notification and backup schedulers, one leap year.
pub const MAX_INTERVAL_HOURS: u64 = 366 * 24;

/// The web server for tracking cheques.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH", default_value = "data/cheques.db")]
    pub db_path: PathBuf,

    /// Directory holding the yearly Excel workbooks.
    #[arg(long, env = "EXCEL_FOLDER", default_value = "data/excel")]
    pub workbook_dir: PathBuf,

    /// Directory holding uploaded cheque scans.
    #[arg(long, env = "UPLOAD_FOLDER", default_value = "data/uploads")]
    pub upload_dir: PathBuf,

    /// Directory holding database backups.
    #[arg(long, env = "BACKUP_FOLDER", default_value = "data/backups")]
    pub backup_dir: PathBuf,

    /// The port to serve the application from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The secret used to sign and encrypt cookies.
    #[arg(long, env = "SECRET", hide_env_values = true)]
    pub secret: String,

    /// Canonical timezone name used for "today" and cookie expiry.
    #[arg(long, env = "TIMEZONE", default_value = "Africa/Casablanca")]
    pub timezone: String,

    /// Whether the notification scheduler runs.
    #[arg(long, env = "NOTIFICATIONS_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub notifications_enabled: bool,

    /// Hours between two notification checks.
    #[arg(long, env = "NOTIFICATION_INTERVAL_HOURS", default_value_t = 24)]
    pub notification_interval_hours: u64,

    /// Cheques due within this many days produce a due-soon notification.
    #[arg(long, env = "DUE_SOON_DAYS", default_value_t = 3)]
    pub due_soon_days: u32,

    /// Hours between two database backups. Zero disables backups.
    #[arg(long, env = "BACKUP_INTERVAL_HOURS", default_value_t = 0)]
    pub backup_interval_hours: u64,

    /// Number of backups kept after pruning.
    #[arg(long, env = "BACKUP_RETENTION", default_value_t = 7)]
    pub backup_retention: usize,
}

/// A setting that cannot be used to start the server.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// The timezone is not a known canonical timezone name.
    #[error("unknown timezone \"{0}\"")]
    UnknownTimezone(String),

    /// The notification scheduler is enabled with an interval of zero hours.
    #[error("NOTIFICATION_INTERVAL_HOURS must be at least 1 when notifications are enabled")]
    ZeroNotificationInterval,

    /// A scheduler interval longer than [MAX_INTERVAL_HOURS].
    #[error("{0} must be at most 8784 hours")]
    IntervalTooLong(&'static str),

    /// Backups are enabled but none would be kept.
    #[error("BACKUP_RETENTION must be at least 1 when backups are enabled")]
    ZeroBackupRetention,
}

impl Config {
    /// Check the settings that clap cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if get_local_offset(&self.timezone).is_none() {
            return Err(ConfigError::UnknownTimezone(self.timezone.clone()));
        }

        if self.notifications_enabled && self.notification_interval_hours == 0 {
            return Err(ConfigError::ZeroNotificationInterval);
        }

        if self.notifications_enabled && self.notification_interval_hours > MAX_INTERVAL_HOURS {
            return Err(ConfigError::IntervalTooLong("NOTIFICATION_INTERVAL_HOURS"));
        }

        if self.backup_interval_hours > MAX_INTERVAL_HOURS {
            return Err(ConfigError::IntervalTooLong("BACKUP_INTERVAL_HOURS"));
        }

        if self.backups_enabled() && self.backup_retention == 0 {
            return Err(ConfigError::ZeroBackupRetention);
        }

        Ok(())
    }

    /// Whether the backup scheduler runs.
    pub fn backups_enabled(&self) -> bool {
        self.backup_interval_hours > 0
    }
}

/// The tick period of a scheduler running every `hours` hours.
///
/// `hours` is clamped to `1..=MAX_INTERVAL_HOURS`.
pub fn scheduler_period(hours: u64) -> Duration {
    Duration::from_secs(hours.clamp(1, MAX_INTERVAL_HOURS) * 60 * 60)
}
