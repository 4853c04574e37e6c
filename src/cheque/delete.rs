//! Cheque deletion endpoint.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Path, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    cheque::{ChequeId, delete_cheque, get_cheque},
    endpoints,
    workbook::{WorkbookStore, redirect_after_sync, remove_cheque_from_workbooks},
};

/// The state needed for deleting a cheque.
#[derive(Debug, Clone)]
pub struct DeleteChequeState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub workbook_store: WorkbookStore,
    pub upload_dir: PathBuf,
}

impl FromRef<AppState> for DeleteChequeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            workbook_store: state.workbook_store.clone(),
            upload_dir: state.upload_dir.clone(),
        }
    }
}

/// Delete a cheque, its workbook row and its scan, then go back to the cheque list.
///
/// A workbook that cannot be updated does not block the deletion; the stale row is removed by
/// the next full resynchronization.
pub async fn delete_cheque_endpoint(
    Path(cheque_id): Path<ChequeId>,
    State(state): State<DeleteChequeState>,
) -> Response {
    let (scan_file, sync_result) = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        let cheque = match get_cheque(cheque_id, &connection) {
            Ok(cheque) => cheque,
            Err(Error::NotFound) => return Error::DeleteMissingCheque.into_alert_response(),
            Err(error) => {
                tracing::error!("could not load cheque {cheque_id} for deletion: {error}");
                return error.into_alert_response();
            }
        };

        let sync_result =
            remove_cheque_from_workbooks(cheque_id, &state.workbook_store, &connection);

        if let Err(error) = delete_cheque(cheque_id, &connection) {
            tracing::error!("could not delete cheque {cheque_id}: {error}");
            return error.into_alert_response();
        }

        tracing::info!("deleted cheque {} ({cheque_id})", cheque.number);

        (cheque.scan_file, sync_result)
    };

    if let Some(scan_file) = scan_file {
        let path = state.upload_dir.join(&scan_file);
        if let Err(error) = tokio::fs::remove_file(&path).await {
            tracing::warn!("could not remove scan {}: {error}", path.display());
        }
    }

    redirect_after_sync(endpoints::CHEQUES_VIEW, sync_result)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        cheque::{get_cheque, set_cheque_scan},
        db::initialize,
        endpoints,
        test_utils::{
            assert_hx_redirect, create_test_bank_and_branch, create_test_cheque,
            create_test_client,
        },
        workbook::{WorkbookStore, sync_cheque},
    };

    use super::{DeleteChequeState, delete_cheque_endpoint};

    fn get_state(dir: &tempfile::TempDir) -> DeleteChequeState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Karim", &connection);
        create_test_cheque("1001", client.id, branch.id, &connection);

        DeleteChequeState {
            db_connection: Arc::new(Mutex::new(connection)),
            workbook_store: WorkbookStore::new(dir.path().join("classeurs")),
            upload_dir: dir.path().join("scans"),
        }
    }

    #[tokio::test]
    async fn delete_removes_cheque_row_and_scan() {
        let dir = tempfile::tempdir().unwrap();
        let state = get_state(&dir);
        std::fs::create_dir_all(&state.upload_dir).unwrap();
        let scan_path = state.upload_dir.join("cheque_1.png");
        std::fs::write(&scan_path, b"png").unwrap();
        {
            let connection = state.db_connection.lock().unwrap();
            set_cheque_scan(1, Some("cheque_1.png"), &connection).unwrap();
            sync_cheque(1, &state.workbook_store, &connection).unwrap();
        }

        let response = delete_cheque_endpoint(Path(1), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CHEQUES_VIEW);
        assert_eq!(
            get_cheque(1, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
        assert_eq!(state.workbook_store.load(2025).unwrap().total_rows(), 0);
        assert!(!scan_path.exists());
    }

    #[tokio::test]
    async fn delete_missing_cheque_returns_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let response = delete_cheque_endpoint(Path(99), State(get_state(&dir))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
