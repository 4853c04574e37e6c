//! The endpoint that moves a cheque to its next status.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::Response,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    branch::BranchId,
    cheque::{ChequeId, ChequeStatus, update_cheque_status},
    endpoints::{self, format_endpoint},
    workbook::{WorkbookStore, redirect_after_sync, sync_cheque},
};

/// The state needed for changing the status of a cheque.
#[derive(Debug, Clone)]
pub struct ChequeStatusState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub workbook_store: WorkbookStore,
}

impl FromRef<AppState> for ChequeStatusState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            workbook_store: state.workbook_store.clone(),
        }
    }
}

/// A status change requested from the cheque page.
///
/// `from` is the status the page was rendered with, so a change made in the meantime is
/// detected instead of overwritten.
#[derive(Debug, Clone, Deserialize)]
pub struct ChequeStatusForm {
    pub from: ChequeStatus,
    pub to: ChequeStatus,
    /// Blank, or the branch the cheque was deposited at.
    #[serde(default)]
    pub deposit_branch_id: Option<String>,
}

/// Move a cheque from `from` to `to`.
pub async fn update_cheque_status_endpoint(
    Path(cheque_id): Path<ChequeId>,
    State(state): State<ChequeStatusState>,
    Form(form): Form<ChequeStatusForm>,
) -> Response {
    let deposit_branch_id = match parse_deposit_branch(form.deposit_branch_id.as_deref()) {
        Ok(branch_id) => branch_id,
        Err(error) => {
            tracing::warn!("refused status change for cheque {cheque_id}: {error}");
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_cheque_status(cheque_id, form.from, form.to, deposit_branch_id, &connection) {
        Ok(()) => {
            tracing::info!(
                "cheque {cheque_id} moved from {} to {}",
                form.from,
                form.to
            );
            let sync_result = sync_cheque(cheque_id, &state.workbook_store, &connection);

            redirect_after_sync(
                &format_endpoint(endpoints::CHEQUE_VIEW, cheque_id),
                sync_result,
            )
        }
        Err(
            error @ (Error::InvalidStatusTransition { .. }
            | Error::StatusChanged
            | Error::UpdateMissingCheque
            | Error::InvalidBranch),
        ) => {
            tracing::warn!("refused status change for cheque {cheque_id}: {error}");
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while changing the status of cheque {cheque_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A blank value means no branch. Anything else must be a branch id.
fn parse_deposit_branch(value: Option<&str>) -> Result<Option<BranchId>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(branch_id) => branch_id
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidBranch),
    }
}
