//! Implements a struct that holds the state of the web server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Config, Error, auth::DEFAULT_COOKIE_DURATION, db::initialize, workbook::WorkbookStore,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Africa/Casablanca".
    pub local_timezone: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Where the yearly Excel workbooks live.
    pub workbook_store: WorkbookStore,

    /// Where uploaded cheque scans are stored.
    pub upload_dir: PathBuf,

    /// Cheques due within this many days are shown as due soon.
    pub due_soon_days: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, config: &Config) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(&config.secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: config.timezone.clone(),
            db_connection: Arc::new(Mutex::new(db_connection)),
            workbook_store: WorkbookStore::new(config.workbook_dir.clone()),
            upload_dir: config.upload_dir.clone(),
            due_soon_days: config.due_soon_days,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
