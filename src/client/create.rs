//! Client creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    client::{
        ClientBuilder, create_client,
        domain::ClientFormData,
        form::{FormTarget, client_form_view},
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for creating a client.
#[derive(Debug, Clone)]
pub struct CreateClientState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateClientState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the client creation page.
pub async fn get_new_client_page() -> Response {
    let nav_bar = NavBar::new(endpoints::CLIENTS_VIEW).into_html();
    let form = client_form_view(FormTarget::Create, &ClientFormData::default(), "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Nouveau client" }
            (form)
        }
    };

    base("Nouveau client", &[], &content).into_response()
}

/// Handle client creation form submission.
pub async fn create_client_endpoint(
    State(state): State<CreateClientState>,
    Form(form_data): Form<ClientFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_client(ClientBuilder::from(&form_data), &connection) {
        Ok(client) => {
            tracing::info!("created client {} ({})", client.name, client.id);
            (
                HxRedirect(endpoints::CLIENTS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::EmptyClientName) => {
            client_form_view(FormTarget::Create, &form_data, &error.to_string()).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a client: {error}");
            error.into_alert_response()
        }
    }
}
