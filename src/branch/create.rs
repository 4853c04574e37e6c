//! Branch creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    bank::{BankId, get_all_banks, get_bank},
    branch::{
        BranchBuilder, create_branch,
        domain::BranchFormData,
        form::{FormTarget, branch_form_view},
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for creating a branch.
#[derive(Debug, Clone)]
pub struct CreateBranchState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBranchState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the page for adding a branch to the bank `bank_id`.
pub async fn get_new_branch_page(
    Path(bank_id): Path<BankId>,
    State(state): State<CreateBranchState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let bank = get_bank(bank_id, &connection)?;
    let banks = get_all_banks(&connection)?;
    let values = BranchFormData {
        bank_id,
        name: String::new(),
        address: None,
        postal_code: None,
        phone: None,
        email: None,
    };

    let nav_bar = NavBar::new(endpoints::BANKS_VIEW).into_html();
    let form = branch_form_view(FormTarget::Create, &banks, &values, "");
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white"
            {
                "Nouvelle agence " (bank.name)
            }
            (form)
        }
    };

    Ok(base("Nouvelle agence", &[], &content).into_response())
}

/// Handle branch creation form submission.
pub async fn create_branch_endpoint(
    State(state): State<CreateBranchState>,
    Form(form_data): Form<BranchFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_branch(BranchBuilder::from(&form_data), &connection) {
        Ok(branch) => {
            tracing::info!("created branch {} ({})", branch.name, branch.id);
            (
                HxRedirect(endpoints::BANKS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::EmptyBranchName) => {
            let banks = match get_all_banks(&connection) {
                Ok(banks) => banks,
                Err(error) => return error.into_alert_response(),
            };

            branch_form_view(FormTarget::Create, &banks, &form_data, &error.to_string())
                .into_response()
        }
        Err(error @ Error::InvalidBank) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a branch: {error}");
            error.into_alert_response()
        }
    }
}
