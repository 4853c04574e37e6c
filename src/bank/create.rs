//! Bank creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    bank::{
        BankName, create_bank,
        domain::{BankFormData, normalize_bank_code},
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE, base, text_input},
    navigation::NavBar,
};

/// The state needed for creating a bank.
#[derive(Debug, Clone)]
pub struct CreateBankEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBankEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the bank creation page.
pub async fn get_new_bank_page() -> Response {
    let nav_bar = NavBar::new(endpoints::BANKS_VIEW).into_html();
    let form = bank_form_view(endpoints::POST_BANK, "hx-post", "", "", "", "Créer la banque");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Nouvelle banque" }
            (form)
        }
    };

    base("Nouvelle banque", &[], &content).into_response()
}

/// Handle bank creation form submission.
pub async fn create_bank_endpoint(
    State(state): State<CreateBankEndpointState>,
    Form(form_data): Form<BankFormData>,
) -> Response {
    let code = normalize_bank_code(form_data.code.as_deref());
    let name = match BankName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return bank_form_view(
                endpoints::POST_BANK,
                "hx-post",
                &form_data.name,
                code.as_deref().unwrap_or_default(),
                &error.to_string(),
                "Créer la banque",
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_bank(name, code, &connection) {
        Ok(bank) => {
            tracing::info!("created bank {} ({})", bank.name, bank.id);
            (
                HxRedirect(endpoints::BANKS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::DuplicateBankName(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a bank: {error}");
            error.into_alert_response()
        }
    }
}

/// The form shared by the create and edit pages.
///
/// `method` is the htmx attribute used to submit the form, e.g. "hx-post".
pub(super) fn bank_form_view(
    endpoint: &str,
    method: &str,
    name: &str,
    code: &str,
    error_message: &str,
    submit_label: &str,
) -> Markup {
    let (hx_post, hx_put) = if method == "hx-put" {
        (None, Some(endpoint))
    } else {
        (Some(endpoint), None)
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (text_input("name", "Nom de la banque", "text", name, true))

            div
            {
                label
                    for="code"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Code (facultatif)"
                }

                input
                    id="code"
                    type="text"
                    name="code"
                    value=(code)
                    maxlength="10"
                    placeholder="AWB"
                    class="block w-full p-2.5 rounded text-sm uppercase text-gray-900 dark:text-white
                        bg-gray-50 dark:bg-gray-700 border border-gray-300 dark:border-gray-600";
            }

            @if !error_message.is_empty() {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}


#[cfg(test)]
mod create_bank_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        bank::{create_bank_endpoint, domain::BankFormData, get_all_banks},
        db::initialize,
        endpoints,
        test_utils::{
            assert_alert_message, assert_form_error_message, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_fragment,
        },
    };

    use super::CreateBankEndpointState;

    fn get_state() -> CreateBankEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        CreateBankEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form(name: &str, code: Option<&str>) -> BankFormData {
        BankFormData {
            name: name.to_owned(),
            code: code.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn can_create_bank() {
        let state = get_state();

        let response = create_bank_endpoint(State(state.clone()), Form(form("CIH Bank", Some("cih"))))
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BANKS_VIEW);
        let banks = get_all_banks(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].name.as_ref(), "CIH Bank");
        assert_eq!(banks[0].code.as_deref(), Some("CIH"));
    }

    #[tokio::test]
    async fn create_bank_fails_on_empty_name() {
        let state = get_state();

        let response = create_bank_endpoint(State(state), Form(form("  ", None))).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Le nom de la banque est obligatoire");
    }

    #[tokio::test]
    async fn create_bank_fails_on_duplicate_name() {
        let state = get_state();
        create_bank_endpoint(State(state.clone()), Form(form("CIH Bank", None))).await;

        let response = create_bank_endpoint(State(state), Form(form("CIH Bank", None))).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = parse_html_fragment(response).await;
        assert_alert_message(&html, "Banque existante");
    }
}
