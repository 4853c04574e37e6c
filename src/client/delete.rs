//! Client deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    client::{ClientId, db::delete_client},
};

/// The state needed for deleting a client.
#[derive(Debug, Clone)]
pub struct DeleteClientEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteClientEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle client deletion. Clients that still have cheques are kept.
pub async fn delete_client_endpoint(
    Path(client_id): Path<ClientId>,
    State(state): State<DeleteClientEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_client(client_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Client supprimé".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::DeleteMissingClient | Error::ClientHasCheques)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting client {client_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
