//! Upload and download of cheque scans.

use std::{
    path::{Path as FilePath, PathBuf},
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Multipart, Path, State, multipart::Field},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    cheque::{ChequeId, get_cheque, set_cheque_scan},
    endpoints::{self, format_endpoint},
};

/// The largest scan accepted, in bytes.
pub const MAX_SCAN_SIZE: usize = 16 * 1024 * 1024;

const SCAN_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "pdf"];

/// The state needed for cheque scans.
#[derive(Debug, Clone)]
pub struct ChequeScanState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub upload_dir: PathBuf,
}

impl FromRef<AppState> for ChequeScanState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            upload_dir: state.upload_dir.clone(),
        }
    }
}

struct UploadedScan {
    extension: String,
    bytes: Vec<u8>,
}

fn scan_extension(file_name: &str) -> Result<String, Error> {
    FilePath::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_lowercase)
        .filter(|extension| SCAN_EXTENSIONS.contains(&extension.as_str()))
        .ok_or(Error::UnsupportedScanType)
}

fn content_type_for(file_name: &str) -> &'static str {
    match scan_extension(file_name).as_deref() {
        Ok("jpg" | "jpeg") => "image/jpeg",
        Ok("png") => "image/png",
        Ok("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

async fn read_scan_field(field: Field<'_>) -> Result<UploadedScan, Error> {
    let file_name = field
        .file_name()
        .filter(|file_name| !file_name.is_empty())
        .ok_or(Error::ScanMissing)?
        .to_owned();
    let extension = scan_extension(&file_name)?;

    let bytes = field.bytes().await.map_err(|error| {
        if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::ScanTooLarge
        } else {
            tracing::error!("Could not read data from multipart form field: {error}");
            Error::MultipartError(error.body_text())
        }
    })?;

    if bytes.is_empty() {
        return Err(Error::ScanMissing);
    }

    if bytes.len() > MAX_SCAN_SIZE {
        return Err(Error::ScanTooLarge);
    }

    tracing::debug!("Received scan '{file_name}' that is {} bytes", bytes.len());

    Ok(UploadedScan {
        extension,
        bytes: bytes.to_vec(),
    })
}

async fn read_scan(multipart: &mut Multipart) -> Result<UploadedScan, Error> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|error| Error::MultipartError(error.body_text()))?
            .ok_or(Error::ScanMissing)?;

        if field.name() == Some("scan") {
            return read_scan_field(field).await;
        }
    }
}

/// Store an uploaded scan and attach it to the cheque, replacing any earlier scan.
pub async fn upload_cheque_scan_endpoint(
    Path(cheque_id): Path<ChequeId>,
    State(state): State<ChequeScanState>,
    mut multipart: Multipart,
) -> Response {
    let scan = match read_scan(&mut multipart).await {
        Ok(scan) => scan,
        Err(error) => return error.into_alert_response(),
    };

    let file_name = format!(
        "cheque_{cheque_id}_{}.{}",
        OffsetDateTime::now_utc().unix_timestamp_nanos(),
        scan.extension
    );
    let path = state.upload_dir.join(&file_name);

    if let Err(error) = tokio::fs::create_dir_all(&state.upload_dir).await {
        tracing::error!("could not create {}: {error}", state.upload_dir.display());
        return Error::FileError(error.to_string()).into_alert_response();
    }
    if let Err(error) = tokio::fs::write(&path, &scan.bytes).await {
        tracing::error!("could not write {}: {error}", path.display());
        return Error::FileError(error.to_string()).into_alert_response();
    }

    let result = match state.db_connection.lock() {
        Ok(connection) => get_cheque(cheque_id, &connection).and_then(|cheque| {
            set_cheque_scan(cheque_id, Some(&file_name), &connection).map(|_| cheque.scan_file)
        }),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let previous_scan = match result {
        Ok(previous_scan) => previous_scan,
        Err(error) => {
            let _ = tokio::fs::remove_file(&path).await;
            return match error {
                Error::NotFound => Error::UpdateMissingCheque.into_alert_response(),
                error => error.into_alert_response(),
            };
        }
    };

    if let Some(previous_scan) = previous_scan {
        let previous_path = state.upload_dir.join(previous_scan);
        if let Err(error) = tokio::fs::remove_file(&previous_path).await {
            tracing::warn!("could not remove old scan {}: {error}", previous_path.display());
        }
    }

    tracing::info!("stored scan {file_name} for cheque {cheque_id}");

    (
        HxRedirect(format_endpoint(endpoints::CHEQUE_VIEW, cheque_id)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// Serve the scan of a cheque.
pub async fn get_cheque_scan(
    Path(cheque_id): Path<ChequeId>,
    State(state): State<ChequeScanState>,
) -> Result<Response, Error> {
    let scan_file = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_cheque(cheque_id, &connection)?
            .scan_file
            .ok_or(Error::NotFound)?
    };

    let path = state.upload_dir.join(&scan_file);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("scan {} of cheque {cheque_id} is missing", path.display());
            return Err(Error::NotFound);
        }
        Err(error) => {
            tracing::error!("could not read {}: {error}", path.display());
            return Err(Error::FileError(error.to_string()));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&scan_file).to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{scan_file}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
