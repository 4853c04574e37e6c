//! Excel export of the filtered cheque listing.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use rust_xlsxwriter::Workbook;
use rusqlite::Connection;
use time::{OffsetDateTime, macros::format_description};

use crate::{
    AppState, Error,
    cheque::{ChequeFilter, ChequeListing, ChequeQuery, query_cheques},
    timezone::local_now,
    workbook::{layout::WorkbookRow, store::write_sheet},
};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// The state needed for exporting cheques.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Download the cheques matching the listing filters as a single-sheet workbook.
pub async fn export_cheques_endpoint(
    State(state): State<ExportState>,
    Query(query): Query<ChequeQuery>,
) -> Result<Response, Error> {
    let cheques = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        query_cheques(&ChequeFilter::from(&query), &connection)?
    };

    let now = local_now(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let file_name = export_file_name(now);
    let bytes = export_workbook(&cheques)?;

    tracing::info!("exported {} cheques to {file_name}", cheques.len());

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Render `cheques` to an in-memory workbook with a single "Export Chèques" sheet.
pub fn export_workbook(cheques: &[ChequeListing]) -> Result<Vec<u8>, Error> {
    let rows = cheques.iter().map(WorkbookRow::from_listing).collect::<Vec<_>>();
    let write_error = |error: rust_xlsxwriter::XlsxError| Error::WorkbookWrite(error.to_string());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Export Chèques").map_err(write_error)?;
    write_sheet(worksheet, &rows).map_err(write_error)?;

    workbook.save_to_buffer().map_err(write_error)
}

fn export_file_name(now: OffsetDateTime) -> String {
    let timestamp = now
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| now.unix_timestamp().to_string());

    format!("export_cheques_{timestamp}.xlsx")
}
