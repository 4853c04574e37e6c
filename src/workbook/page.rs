//! The workbooks page, full resynchronization and workbook downloads.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_SECONDARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
    workbook::{WorkbookStore, sync_all_workbooks},
};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// The state needed for the workbook page and endpoints.
#[derive(Debug, Clone)]
pub struct WorkbookState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub workbook_store: WorkbookStore,
}

impl FromRef<AppState> for WorkbookState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            workbook_store: state.workbook_store.clone(),
        }
    }
}

/// Render the list of yearly workbooks.
pub async fn get_workbooks_page(State(state): State<WorkbookState>) -> Result<Response, Error> {
    let years = state
        .workbook_store
        .list_years()
        .inspect_err(|error| tracing::error!("could not list workbooks: {error}"))?;

    Ok(workbooks_view(&years).into_response())
}

fn workbooks_view(years: &[i32]) -> Markup {
    let nav_bar = NavBar::new(endpoints::WORKBOOKS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Classeurs Excel" }

                    button
                        type="button"
                        hx-post=(endpoints::SYNC_WORKBOOKS)
                        hx-target-error="#alert-container"
                        hx-swap="none"
                        hx-indicator="#sync-indicator"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        span id="sync-indicator" class="htmx-indicator" { (loading_spinner()) }
                        "Tout resynchroniser"
                    }
                }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Un classeur par année d'échéance, avec une feuille par mois."
                }

                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Année" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Fichier" }
                        }
                    }

                    tbody
                    {
                        @for year in years {
                            tr class=(TABLE_ROW_STYLE) data-workbook-row="true"
                            {
                                td class=(TABLE_CELL_STYLE) { (year) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    a
                                        href=(format_endpoint(endpoints::WORKBOOK_FILE, i64::from(*year)))
                                        class=(LINK_STYLE)
                                    {
                                        "cheques_" (year) ".xlsx"
                                    }
                                }
                            }
                        }

                        @if years.is_empty() {
                            tr
                            {
                                td
                                    colspan="2"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "Aucun classeur pour le moment."
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Classeurs Excel", &[], &content)
}

/// Rewrite every workbook from the database.
pub async fn sync_workbooks_endpoint(State(state): State<WorkbookState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match sync_all_workbooks(&state.workbook_store, &connection) {
        Ok(summary) => Alert::Success {
            message: "Synchronisation terminée".to_owned(),
            details: format!(
                "{} chèque(s) écrit(s) dans {} classeur(s).",
                summary.cheques, summary.workbooks
            ),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("full workbook synchronization failed: {error}");
            error.into_alert_response()
        }
    }
}

/// Download the workbook for `year`.
pub async fn download_workbook_endpoint(
    Path(year): Path<i32>,
    State(state): State<WorkbookState>,
) -> Result<Response, Error> {
    let path = state.workbook_store.path_for_year(year);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound);
        }
        Err(error) => {
            tracing::error!("could not read {}: {error}", path.display());
            return Err(Error::FileError(error.to_string()));
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"cheques_{year}.xlsx\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        db::initialize,
        test_utils::{
            assert_alert_message, assert_valid_html, create_test_bank_and_branch,
            create_test_cheque, create_test_client, parse_html_document, parse_html_fragment,
        },
        workbook::WorkbookStore,
    };

    use super::{
        WorkbookState, download_workbook_endpoint, get_workbooks_page, sync_workbooks_endpoint,
    };

    fn get_state(dir: &tempfile::TempDir) -> WorkbookState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        WorkbookState {
            db_connection: Arc::new(Mutex::new(connection)),
            workbook_store: WorkbookStore::new(dir.path().to_path_buf()),
        }
    }

    #[tokio::test]
    async fn sync_then_list_and_download() {
        let dir = tempfile::tempdir().unwrap();
        let state = get_state(&dir);
        {
            let connection = state.db_connection.lock().unwrap();
            let (_, branch) = create_test_bank_and_branch(&connection);
            let client = create_test_client("Karim", &connection);
            create_test_cheque("1001", client.id, branch.id, &connection);
        }

        let response = sync_workbooks_endpoint(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_alert_message(&parse_html_fragment(response).await, "Synchronisation terminée");

        let response = get_workbooks_page(State(state.clone())).await.unwrap();
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let rows = html
            .select(&Selector::parse("tr[data-workbook-row]").unwrap())
            .count();
        assert_eq!(rows, 1);

        let response = download_workbook_endpoint(Path(2025), State(state))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn download_missing_year_returns_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let response = download_workbook_endpoint(Path(1999), State(get_state(&dir)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
