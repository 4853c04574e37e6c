//! Bank editing page and endpoint.

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
    bank::{
        BankId, BankName,
        create::bank_form_view,
        domain::{BankFormData, normalize_bank_code},
        get_bank, update_bank,
    },
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

/// The state needed for the edit bank page and endpoint.
#[derive(Debug, Clone)]
pub struct EditBankState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBankState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the bank editing page.
pub async fn get_edit_bank_page(
    Path(bank_id): Path<BankId>,
    State(state): State<EditBankState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let bank = get_bank(bank_id, &connection)?;
    let update_endpoint = endpoints::format_endpoint(endpoints::BANK, bank_id);

    let nav_bar = NavBar::new(endpoints::BANKS_VIEW).into_html();
    let form = bank_form_view(
        &update_endpoint,
        "hx-put",
        bank.name.as_ref(),
        bank.code.as_deref().unwrap_or_default(),
        "",
        "Enregistrer",
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Modifier la banque" }
            (form)
        }
    };

    Ok(base("Modifier la banque", &[], &content).into_response())
}

/// Handle bank update form submission.
pub async fn update_bank_endpoint(
    Path(bank_id): Path<BankId>,
    State(state): State<EditBankState>,
    Form(form_data): Form<BankFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::BANK, bank_id);
    let code = normalize_bank_code(form_data.code.as_deref());

    let name = match BankName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => {
            return bank_form_view(
                &update_endpoint,
                "hx-put",
                &form_data.name,
                code.as_deref().unwrap_or_default(),
                &error.to_string(),
                "Enregistrer",
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

    match update_bank(bank_id, name, code, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BANKS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::UpdateMissingBank | Error::DuplicateBankName(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating bank {bank_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_bank_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        bank::{BankName, create_bank, domain::BankFormData, get_bank},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input_with_value,
            assert_form_submit_button_with_text, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{EditBankState, get_edit_bank_page, update_bank_endpoint};

    fn get_state() -> EditBankState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        EditBankState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn get_edit_bank_page_succeeds() {
        let state = get_state();
        let bank = create_bank(
            BankName::new_unchecked("BMCE"),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_edit_bank_page(Path(bank.id), State(state))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::BANK, bank.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "BMCE");
        assert_form_submit_button_with_text(&form, "Enregistrer");
    }

    #[tokio::test]
    async fn get_edit_bank_page_with_invalid_id_returns_not_found() {
        let state = get_state();

        let response = get_edit_bank_page(Path(999), State(state))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_bank_endpoint_succeeds() {
        let state = get_state();
        let bank = create_bank(
            BankName::new_unchecked("BMCE"),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = BankFormData {
            name: "Bank of Africa".to_owned(),
            code: Some("boa".to_owned()),
        };

        let response = update_bank_endpoint(Path(bank.id), State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BANKS_VIEW);
        let bank = get_bank(bank.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(bank.name.as_ref(), "Bank of Africa");
        assert_eq!(bank.code.as_deref(), Some("BOA"));
    }

    #[tokio::test]
    async fn update_bank_endpoint_with_invalid_id_returns_not_found() {
        let state = get_state();
        let form = BankFormData {
            name: "Bank of Africa".to_owned(),
            code: None,
        };

        let response = update_bank_endpoint(Path(999), State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_bank_endpoint_with_empty_name_returns_form() {
        let state = get_state();
        let form = BankFormData {
            name: String::new(),
            code: None,
        };

        let response = update_bank_endpoint(Path(1), State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Le nom de la banque est obligatoire");
    }
}
