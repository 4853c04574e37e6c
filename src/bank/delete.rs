//! Bank deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    bank::{BankId, db::delete_bank},
};

/// The state needed for deleting a bank.
#[derive(Debug, Clone)]
pub struct DeleteBankEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBankEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle bank deletion. Returns success alert or error.
pub async fn delete_bank_endpoint(
    Path(bank_id): Path<BankId>,
    State(state): State<DeleteBankEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_bank(bank_id, &connection) {
        Ok(_) => {
            tracing::info!("deleted bank {bank_id}");
            Alert::SuccessSimple {
                message: "Banque supprimée".to_owned(),
            }
            .into_response()
        }
        Err(error @ (Error::DeleteMissingBank | Error::BankHasCheques)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting bank {bank_id}: {error}");
            error.into_alert_response()
        }
    }
}
