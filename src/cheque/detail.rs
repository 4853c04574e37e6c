//! The page showing one cheque, its status actions and its scan.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    branch::{BranchChoice, get_branch_choices},
    cheque::{ChequeId, ChequeListing, ChequeStatus, get_cheque_listing},
    endpoints::{self, format_endpoint},
    form::{SelectOption, select_options},
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_amount, format_date,
    },
    navigation::NavBar,
    workbook::sync_failure_banner,
};

/// The state needed for the cheque page.
#[derive(Debug, Clone)]
pub struct ChequePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ChequePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChequePageQuery {
    #[serde(default)]
    pub sync: Option<String>,
}

/// Render the page for a single cheque.
pub async fn get_cheque_page(
    Path(cheque_id): Path<ChequeId>,
    State(state): State<ChequePageState>,
    Query(query): Query<ChequePageQuery>,
) -> Result<Response, Error> {
    let (listing, branches) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_cheque_listing(cheque_id, &connection)?,
            get_branch_choices(&connection)?,
        )
    };
    let sync_failed = query.sync.as_deref() == Some("echec");

    Ok(cheque_view(&listing, &branches, sync_failed).into_response())
}

fn cheque_view(listing: &ChequeListing, branches: &[BranchChoice], sync_failed: bool) -> Markup {
    let cheque = &listing.cheque;
    let nav_bar = NavBar::new(endpoints::CHEQUES_VIEW).into_html();
    let edit_url = format_endpoint(endpoints::EDIT_CHEQUE_VIEW, cheque.id);
    let delete_url = format_endpoint(endpoints::CHEQUE, cheque.id);
    let title = format!("Chèque n°{}", cheque.number);

    let details = [
        ("Client", listing.client_name.clone()),
        ("Banque/Agence", listing.issuing_label()),
        ("Montant", format_amount(cheque.amount, cheque.currency.as_str())),
        ("Date d'émission", format_date(cheque.issue_date)),
        ("Date d'échéance", format_date(cheque.due_date)),
        (
            "Banque de dépôt",
            listing.deposit_label().unwrap_or_default(),
        ),
        (
            "Nom du déposant",
            cheque.depositor_name.clone().unwrap_or_default(),
        ),
        (
            "N° Facture",
            cheque.invoice_number.clone().unwrap_or_default(),
        ),
        (
            "Date de facture",
            cheque.invoice_date.map(format_date).unwrap_or_default(),
        ),
        ("Notes", cheque.notes.clone().unwrap_or_default()),
    ];

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-3xl space-y-6"
            {
                @if sync_failed {
                    (sync_failure_banner())
                }

                header class="flex justify-between flex-wrap items-center gap-4"
                {
                    div class="flex items-center gap-3"
                    {
                        h1 class="text-xl font-bold" { (title) }
                        span
                            class={ (BADGE_STYLE) " " (cheque.status.badge_style()) }
                            data-status=(cheque.status.as_str())
                        {
                            (cheque.status.label())
                        }
                    }

                    div class="flex items-center gap-4 text-sm"
                    {
                        a href=(endpoints::CHEQUES_VIEW) class=(LINK_STYLE) { "Retour à la liste" }
                        a href=(edit_url) class=(LINK_STYLE) { "Modifier" }
                        button
                            type="button"
                            hx-delete=(delete_url)
                            hx-confirm=(format!("Supprimer le chèque n°{} ?", cheque.number))
                            hx-target-error="#alert-container"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Supprimer"
                        }
                    }
                }

                dl class="grid grid-cols-1 gap-x-6 gap-y-3 sm:grid-cols-2"
                {
                    @for (label, value) in &details {
                        div
                        {
                            dt class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                            dd class="font-medium" { (value) }
                        }
                    }
                }

                (status_actions(cheque.id, cheque.status, branches))

                (scan_section(cheque.id, cheque.scan_file.as_deref()))
            }
        }
    );

    base(&title, &[], &content)
}

fn status_actions(cheque_id: ChequeId, status: ChequeStatus, branches: &[BranchChoice]) -> Markup {
    let status_url = format_endpoint(endpoints::CHEQUE_STATUS, cheque_id);
    let branch_options = branches
        .iter()
        .map(|branch| SelectOption {
            value: branch.id.to_string(),
            label: branch.label.clone(),
        })
        .collect::<Vec<_>>();

    html! {
        section class="space-y-3" data-status-actions="true"
        {
            h2 class="text-lg font-semibold" { "Statut" }

            @if status.is_terminal() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Ce chèque est " (status.label().to_lowercase()) ", son statut ne peut plus changer."
                }
            }

            div class="flex flex-wrap gap-4"
            {
                @for next in status.successors() {
                    form
                        hx-put=(status_url)
                        hx-target-error="#alert-container"
                        class="flex flex-wrap items-center gap-2"
                    {
                        input type="hidden" name="from" value=(status.as_str());
                        input type="hidden" name="to" value=(next.as_str());

                        @if *next == ChequeStatus::Deposited {
                            select
                                name="deposit_branch_id"
                                aria-label="Agence de dépôt"
                                class={ "max-w-xs " (FORM_TEXT_INPUT_STYLE) }
                            {
                                (select_options("Agence de dépôt", &branch_options, None))
                            }
                        }

                        button type="submit" class=(BUTTON_SECONDARY_STYLE) { (next.action_label()) }
                    }
                }
            }
        }
    }
}

fn scan_section(cheque_id: ChequeId, scan_file: Option<&str>) -> Markup {
    let upload_url = format_endpoint(endpoints::CHEQUE_SCAN, cheque_id);
    let download_url = format_endpoint(endpoints::CHEQUE_SCAN_FILE, cheque_id);

    html! {
        section class="space-y-3"
        {
            h2 class="text-lg font-semibold" { "Scan du chèque" }

            @if scan_file.is_some() {
                a href=(download_url) target="_blank" class=(LINK_STYLE) data-scan-link="true"
                {
                    "Voir le scan"
                }
            } @else {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Aucun scan." }
            }

            form
                hx-post=(upload_url)
                hx-encoding="multipart/form-data"
                hx-target-error="#alert-container"
                class="flex flex-wrap items-center gap-2"
            {
                input
                    type="file"
                    name="scan"
                    accept=".jpg,.jpeg,.png,.pdf"
                    required
                    class="text-sm";

                button type="submit" class=(BUTTON_SECONDARY_STYLE)
                {
                    @if scan_file.is_some() { "Remplacer le scan" } @else { "Envoyer le scan" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        cheque::{ChequeStatus, update_cheque_status},
        db::initialize,
        test_utils::{
            assert_valid_html, create_test_bank_and_branch, create_test_cheque,
            create_test_client, parse_html_document,
        },
    };

    use super::{ChequePageQuery, ChequePageState, get_cheque_page};

    fn get_state() -> ChequePageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Karim", &connection);
        create_test_cheque("1001", client.id, branch.id, &connection);

        ChequePageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn next_statuses(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("[data-status-actions] input[name=to]").unwrap())
            .filter_map(|input| input.value().attr("value").map(str::to_owned))
            .collect()
    }

    #[tokio::test]
    async fn pending_cheque_offers_deposit_and_cancel() {
        let response = get_cheque_page(
            Path(1),
            State(get_state()),
            Query(ChequePageQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(next_statuses(&html), ["depose", "annule"]);
        let deposit_selects = html
            .select(&Selector::parse("select[name=deposit_branch_id]").unwrap())
            .count();
        assert_eq!(deposit_selects, 1);
    }

    #[tokio::test]
    async fn terminal_cheque_offers_no_action() {
        let state = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            update_cheque_status(1, ChequeStatus::Pending, ChequeStatus::Cancelled, None, &connection)
                .unwrap();
        }

        let response = get_cheque_page(Path(1), State(state), Query(ChequePageQuery::default()))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert!(next_statuses(&html).is_empty());
    }

    #[tokio::test]
    async fn missing_cheque_returns_not_found() {
        let response = get_cheque_page(
            Path(99),
            State(get_state()),
            Query(ChequePageQuery::default()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
