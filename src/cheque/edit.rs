//! Cheque editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    cheque::{
        ChequeBuilder, ChequeId,
        domain::ChequeFormData,
        form::{FormChoices, FormTarget, cheque_form_view, is_field_error},
        get_cheque_listing, update_cheque,
    },
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    workbook::{WorkbookStore, redirect_after_sync, sync_cheque},
};

/// The state needed for the edit cheque page and endpoint.
#[derive(Debug, Clone)]
pub struct EditChequeState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub workbook_store: WorkbookStore,
}

impl FromRef<AppState> for EditChequeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            workbook_store: state.workbook_store.clone(),
        }
    }
}

/// Render the cheque editing page.
pub async fn get_edit_cheque_page(
    Path(cheque_id): Path<ChequeId>,
    State(state): State<EditChequeState>,
) -> Result<Response, Error> {
    let (listing, choices) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_cheque_listing(cheque_id, &connection)?,
            FormChoices::load(&connection)?,
        )
    };

    let update_endpoint = format_endpoint(endpoints::CHEQUE, cheque_id);
    let values = ChequeFormData::from(&listing);
    let title = format!("Modifier le chèque n°{}", listing.cheque.number);

    let nav_bar = NavBar::new(endpoints::CHEQUES_VIEW).into_html();
    let form = cheque_form_view(
        FormTarget::Update {
            endpoint: &update_endpoint,
        },
        &choices,
        &values,
        None,
    );
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { (title) }
            p class="mb-4 text-sm text-gray-500 dark:text-gray-400"
            {
                "Le statut se change depuis la page du chèque."
            }
            (form)
        }
    };

    Ok(base(&title, &[], &content).into_response())
}

/// Handle cheque update form submission. The status is not changed.
pub async fn update_cheque_endpoint(
    Path(cheque_id): Path<ChequeId>,
    State(state): State<EditChequeState>,
    Form(form_data): Form<ChequeFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = ChequeBuilder::try_from(&form_data)
        .and_then(|builder| update_cheque(cheque_id, builder, &connection));

    match result {
        Ok(()) => {
            let sync_result = sync_cheque(cheque_id, &state.workbook_store, &connection);

            redirect_after_sync(
                &format_endpoint(endpoints::CHEQUE_VIEW, cheque_id),
                sync_result,
            )
        }
        Err(error) if is_field_error(&error) => {
            let choices = match FormChoices::load(&connection) {
                Ok(choices) => choices,
                Err(error) => return error.into_alert_response(),
            };
            let update_endpoint = format_endpoint(endpoints::CHEQUE, cheque_id);

            cheque_form_view(
                FormTarget::Update {
                    endpoint: &update_endpoint,
                },
                &choices,
                &form_data,
                Some(&error),
            )
            .into_response()
        }
        Err(
            error @ (Error::UpdateMissingCheque | Error::InvalidClient | Error::InvalidBranch),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating cheque {cheque_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::{Month, macros::date};

    use crate::{
        cheque::{ChequeStatus, domain::ChequeFormData, get_cheque, update_cheque_status},
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, create_test_bank_and_branch, create_test_cheque,
            create_test_client, must_get_form, parse_html_document,
        },
        workbook::{WorkbookStore, sync_cheque},
    };

    use super::{EditChequeState, get_edit_cheque_page, update_cheque_endpoint};

    fn get_state(dir: &tempfile::TempDir) -> EditChequeState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Karim", &connection);
        create_test_cheque("1001", client.id, branch.id, &connection);

        EditChequeState {
            db_connection: Arc::new(Mutex::new(connection)),
            workbook_store: WorkbookStore::new(dir.path().to_path_buf()),
        }
    }

    fn form() -> ChequeFormData {
        ChequeFormData {
            number: "1001".to_owned(),
            amount: 1800.0,
            currency: Default::default(),
            issue_date: date!(2025 - 01 - 10),
            due_date: date!(2025 - 04 - 10),
            client_id: 1,
            bank_id: Some("1".to_owned()),
            branch_id: 1,
            depositor_name: None,
            invoice_number: None,
            invoice_date: Some("2025-01-05".to_owned()),
            notes: Some("Relancer le client".to_owned()),
        }
    }

    #[tokio::test]
    async fn edit_page_shows_current_values() {
        let dir = tempfile::tempdir().unwrap();

        let response = get_edit_cheque_page(Path(1), State(get_state(&dir)))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, &format_endpoint(endpoints::CHEQUE, 1), "hx-put");
        assert_form_input_with_value(&form, "number", "text", "1001");
        assert_form_input_with_value(&form, "due_date", "date", "2025-02-10");
    }

    #[tokio::test]
    async fn update_moves_workbook_row_and_keeps_status() {
        let dir = tempfile::tempdir().unwrap();
        let state = get_state(&dir);
        {
            let connection = state.db_connection.lock().unwrap();
            update_cheque_status(1, ChequeStatus::Pending, ChequeStatus::Deposited, None, &connection)
                .unwrap();
            sync_cheque(1, &state.workbook_store, &connection).unwrap();
        }

        let response = update_cheque_endpoint(Path(1), State(state.clone()), Form(form())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/cheques/1");
        let cheque = get_cheque(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(cheque.amount, 1800.0);
        assert_eq!(cheque.status, ChequeStatus::Deposited);
        assert_eq!(cheque.invoice_date, Some(date!(2025 - 01 - 05)));
        let workbook = state.workbook_store.load(2025).unwrap();
        assert_eq!(workbook.row_count(Month::February), 0);
        assert_eq!(workbook.find(1), Some((Month::April, 0)));
    }

    #[tokio::test]
    async fn update_missing_cheque_returns_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let response = update_cheque_endpoint(Path(99), State(get_state(&dir)), Form(form())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
