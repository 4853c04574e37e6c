//! Branch editing page and endpoint.

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
    bank::get_all_banks,
    branch::{
        BranchBuilder, BranchId,
        domain::BranchFormData,
        form::{FormTarget, branch_form_view},
        get_branch, update_branch,
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for the edit branch page and endpoint.
#[derive(Debug, Clone)]
pub struct EditBranchState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBranchState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the branch editing page.
pub async fn get_edit_branch_page(
    Path(branch_id): Path<BranchId>,
    State(state): State<EditBranchState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let branch = get_branch(branch_id, &connection)?;
    let banks = get_all_banks(&connection)?;
    let update_endpoint = endpoints::format_endpoint(endpoints::BRANCH, branch_id);
    let values = BranchFormData {
        bank_id: branch.bank_id,
        name: branch.name.to_string(),
        address: branch.address,
        postal_code: branch.postal_code,
        phone: branch.phone,
        email: branch.email,
    };

    let nav_bar = NavBar::new(endpoints::BANKS_VIEW).into_html();
    let form = branch_form_view(
        FormTarget::Update {
            endpoint: &update_endpoint,
        },
        &banks,
        &values,
        "",
    );
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Modifier l'agence" }
            (form)
        }
    };

    Ok(base("Modifier l'agence", &[], &content).into_response())
}

/// Handle branch update form submission.
pub async fn update_branch_endpoint(
    Path(branch_id): Path<BranchId>,
    State(state): State<EditBranchState>,
    Form(form_data): Form<BranchFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_branch(branch_id, BranchBuilder::from(&form_data), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BANKS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::EmptyBranchName) => {
            let banks = match get_all_banks(&connection) {
                Ok(banks) => banks,
                Err(error) => return error.into_alert_response(),
            };
            let update_endpoint = endpoints::format_endpoint(endpoints::BRANCH, branch_id);

            branch_form_view(
                FormTarget::Update {
                    endpoint: &update_endpoint,
                },
                &banks,
                &form_data,
                &error.to_string(),
            )
            .into_response()
        }
        Err(error @ (Error::UpdateMissingBranch | Error::InvalidBank)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating branch {branch_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
