//! Branch deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    branch::{BranchId, db::delete_branch},
};

/// The state needed for deleting a branch.
#[derive(Debug, Clone)]
pub struct DeleteBranchEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBranchEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle branch deletion. Returns success alert or error.
pub async fn delete_branch_endpoint(
    Path(branch_id): Path<BranchId>,
    State(state): State<DeleteBranchEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_branch(branch_id, &connection) {
        Ok(_) => Alert::SuccessSimple {
            message: "Agence supprimée".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::DeleteMissingBranch | Error::BranchHasCheques)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting branch {branch_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
