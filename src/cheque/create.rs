//! Cheque creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    cheque::{
        ChequeBuilder, create_cheque,
        domain::ChequeFormData,
        form::{FormChoices, FormTarget, cheque_form_view, is_field_error},
    },
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_today,
    workbook::{WorkbookStore, redirect_after_sync, sync_cheque},
};

/// The state needed for creating a cheque.
#[derive(Debug, Clone)]
pub struct CreateChequeState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub workbook_store: WorkbookStore,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateChequeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            workbook_store: state.workbook_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the cheque creation page. Both dates default to today.
pub async fn get_new_cheque_page(State(state): State<CreateChequeState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let choices = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        FormChoices::load(&connection)?
    };

    let values = ChequeFormData {
        number: String::new(),
        amount: 0.0,
        currency: Default::default(),
        issue_date: today,
        due_date: today,
        client_id: 0,
        bank_id: None,
        branch_id: 0,
        depositor_name: None,
        invoice_number: None,
        invoice_date: None,
        notes: None,
    };

    let nav_bar = NavBar::new(endpoints::CHEQUES_VIEW).into_html();
    let form = cheque_form_view(FormTarget::Create, &choices, &values, None);
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Nouveau chèque" }
            (form)
        }
    };

    Ok(base("Nouveau chèque", &[], &content).into_response())
}

/// Handle cheque creation form submission.
///
/// New cheques always start out pending. On success the cheque is written to its workbook and
/// the user is sent to the cheque's page.
pub async fn create_cheque_endpoint(
    State(state): State<CreateChequeState>,
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
        .and_then(|builder| create_cheque(builder, &connection));

    match result {
        Ok(cheque) => {
            tracing::info!("created cheque {} ({})", cheque.number, cheque.id);
            let sync_result = sync_cheque(cheque.id, &state.workbook_store, &connection);

            redirect_after_sync(
                &format_endpoint(endpoints::CHEQUE_VIEW, cheque.id),
                sync_result,
            )
        }
        Err(error) if is_field_error(&error) => match FormChoices::load(&connection) {
            Ok(choices) => {
                cheque_form_view(FormTarget::Create, &choices, &form_data, Some(&error))
                    .into_response()
            }
            Err(error) => error.into_alert_response(),
        },
        Err(error @ (Error::InvalidClient | Error::InvalidBranch)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a cheque: {error}");
            error.into_alert_response()
        }
    }
}
