//! Client editing page and endpoint.

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
    client::{
        ClientBuilder, ClientId,
        domain::ClientFormData,
        form::{FormTarget, client_form_view},
        get_client, update_client,
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for the edit client page and endpoint.
#[derive(Debug, Clone)]
pub struct EditClientState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditClientState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the client editing page.
pub async fn get_edit_client_page(
    Path(client_id): Path<ClientId>,
    State(state): State<EditClientState>,
) -> Result<Response, Error> {
    let client = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_client(client_id, &connection)?
    };

    let update_endpoint = endpoints::format_endpoint(endpoints::CLIENT, client_id);
    let nav_bar = NavBar::new(endpoints::CLIENTS_VIEW).into_html();
    let form = client_form_view(
        FormTarget::Update {
            endpoint: &update_endpoint,
        },
        &ClientFormData::from(client),
        "",
    );
    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Modifier le client" }
            (form)
        }
    };

    Ok(base("Modifier le client", &[], &content).into_response())
}

/// Handle client update form submission.
pub async fn update_client_endpoint(
    Path(client_id): Path<ClientId>,
    State(state): State<EditClientState>,
    Form(form_data): Form<ClientFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_client(client_id, ClientBuilder::from(&form_data), &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CLIENTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::EmptyClientName) => {
            let update_endpoint = endpoints::format_endpoint(endpoints::CLIENT, client_id);

            client_form_view(
                FormTarget::Update {
                    endpoint: &update_endpoint,
                },
                &form_data,
                &error.to_string(),
            )
            .into_response()
        }
        Err(error @ Error::UpdateMissingClient) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating client {client_id}: {error}"
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
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        client::{
            ClientKind, create::CreateClientState, create::create_client_endpoint,
            domain::ClientFormData, get_client,
        },
        db::initialize,
        endpoints,
        test_utils::{
            assert_hx_endpoint, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    use super::{EditClientState, get_edit_client_page, update_client_endpoint};

    fn get_connection() -> Arc<Mutex<Connection>> {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        Arc::new(Mutex::new(connection))
    }

    #[tokio::test]
    async fn company_edit_form_shows_rc_and_ice() {
        let db_connection = get_connection();
        let form = ClientFormData {
            kind: ClientKind::Company,
            name: "Marrakech Textiles".to_owned(),
            id_number: Some("RC 98765".to_owned()),
            tax_number: Some("002345678000012".to_owned()),
            ..Default::default()
        };
        create_client_endpoint(
            State(CreateClientState {
                db_connection: db_connection.clone(),
            }),
            Form(form),
        )
        .await;

        let response = get_edit_client_page(Path(1), State(EditClientState { db_connection }))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::CLIENT, 1),
            "hx-put",
        );
        let labels = form
            .select(&Selector::parse("#identity-fields label").unwrap())
            .map(|label| label.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["RC", "ICE"]);
        let selected_kind = form
            .select(&Selector::parse("select[name='kind'] option[selected]").unwrap())
            .next()
            .and_then(|option| option.value().attr("value"));
        assert_eq!(selected_kind, Some("entreprise"));
        let id_number = form
            .select(&Selector::parse("input[name='id_number']").unwrap())
            .next()
            .and_then(|input| input.value().attr("value"));
        assert_eq!(id_number, Some("RC 98765"));
    }

    #[tokio::test]
    async fn edit_page_for_missing_client_returns_not_found() {
        let response = get_edit_client_page(
            Path(7),
            State(EditClientState {
                db_connection: get_connection(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_client_succeeds() {
        let db_connection = get_connection();
        create_client_endpoint(
            State(CreateClientState {
                db_connection: db_connection.clone(),
            }),
            Form(ClientFormData {
                name: "Rachid".to_owned(),
                ..Default::default()
            }),
        )
        .await;
        let form = ClientFormData {
            name: "Rachid Alaoui".to_owned(),
            phone: Some("0661000000".to_owned()),
            ..Default::default()
        };

        let response = update_client_endpoint(
            Path(1),
            State(EditClientState {
                db_connection: db_connection.clone(),
            }),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CLIENTS_VIEW);
        let client = get_client(1, &db_connection.lock().unwrap()).unwrap();
        assert_eq!(client.name.as_ref(), "Rachid Alaoui");
        assert_eq!(client.phone.as_deref(), Some("0661000000"));
    }
}
