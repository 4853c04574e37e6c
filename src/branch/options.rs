//! The htmx endpoint that refreshes a branch `<select>` when the bank changes.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    bank::BankId,
    branch::get_branch_choices,
    form::{SelectOption, select_options},
};

/// The state needed for the branch options endpoint.
#[derive(Debug, Clone)]
pub struct BranchOptionsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BranchOptionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The bank selected in the form. Empty when no bank is selected.
#[derive(Debug, Deserialize)]
pub struct BranchOptionsQuery {
    #[serde(default)]
    pub bank_id: Option<String>,
}

/// Return the `<option>` elements for the branches of the selected bank, or
/// every branch when no bank is selected.
pub async fn get_branch_options(
    State(state): State<BranchOptionsState>,
    Query(query): Query<BranchOptionsQuery>,
) -> Response {
    let bank_id = query
        .bank_id
        .as_deref()
        .and_then(|bank_id| bank_id.trim().parse::<BankId>().ok());

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let choices = match get_branch_choices(&connection) {
        Ok(choices) => choices,
        Err(error) => {
            tracing::error!("could not get branch options: {error}");
            return error.into_alert_response();
        }
    };

    let options = choices
        .into_iter()
        .filter(|choice| bank_id.is_none_or(|bank_id| choice.bank_id == bank_id))
        .map(|choice| SelectOption {
            value: choice.id.to_string(),
            label: choice.label,
        })
        .collect::<Vec<_>>();

    select_options("Choisir une agence", &options, None).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        bank::{BankName, create_bank},
        branch::{BranchBuilder, create_branch},
        db::initialize,
        test_utils::parse_html_fragment,
    };

    use super::{BranchOptionsQuery, BranchOptionsState, get_branch_options};

    fn get_state() -> BranchOptionsState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let cih = create_bank(BankName::new_unchecked("CIH"), None, &connection).unwrap();
        let awb = create_bank(BankName::new_unchecked("AWB"), None, &connection).unwrap();
        create_branch(BranchBuilder::new(cih.id, "Agdal"), &connection).unwrap();
        create_branch(BranchBuilder::new(awb.id, "Anfa"), &connection).unwrap();
        create_branch(BranchBuilder::new(awb.id, "Maârif"), &connection).unwrap();

        BranchOptionsState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn option_labels(bank_id: Option<&str>) -> Vec<String> {
        let response = get_branch_options(
            State(get_state()),
            Query(BranchOptionsQuery {
                bank_id: bank_id.map(str::to_owned),
            }),
        )
        .await;
        let html = parse_html_fragment(response).await;

        html.select(&Selector::parse("option").unwrap())
            .map(|option| option.text().collect::<String>())
            .collect()
    }

    #[tokio::test]
    async fn filters_by_bank() {
        let labels = option_labels(Some("2")).await;

        assert_eq!(labels, ["Choisir une agence", "AWB - Anfa", "AWB - Maârif"]);
    }

    #[tokio::test]
    async fn blank_bank_lists_every_branch() {
        let labels = option_labels(Some("")).await;

        assert_eq!(labels.len(), 4);
    }
}
