//! Cheques listing page with filters.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    bank::{Bank, get_all_banks},
    branch::{BranchChoice, get_branch_choices},
    cheque::{ChequeFilter, ChequeListing, ChequeStatus, parse_optional_date, query_cheques},
    client::{Client, get_all_clients},
    endpoints::{self, format_endpoint},
    form::{SelectOption, select_options},
    html::{
        BADGE_STYLE, BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_amount, format_date,
    },
    navigation::NavBar,
    timezone::local_today,
    workbook::sync_failure_banner,
};

/// The state needed for the cheques listing page.
#[derive(Debug, Clone)]
pub struct ChequesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ChequesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The filter form's query parameters, shared by the listing and the Excel export.
///
/// Values that cannot be parsed are ignored rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChequeQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, rename = "statut", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, rename = "banque", skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(default, rename = "agence", skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Earliest due date, YYYY-MM-DD.
    #[serde(default, rename = "du", skip_serializing_if = "Option::is_none")]
    pub due_from: Option<String>,
    /// Latest due date, YYYY-MM-DD.
    #[serde(default, rename = "au", skip_serializing_if = "Option::is_none")]
    pub due_to: Option<String>,
    /// Set to "echec" by the redirect after a failed workbook sync.
    #[serde(default, skip_serializing)]
    pub sync: Option<String>,
}

impl ChequeQuery {
    /// Whether the page was reached through a failed-sync redirect.
    pub fn sync_failed(&self) -> bool {
        self.sync.as_deref() == Some("echec")
    }

    /// The query string for the export link, without the sync flag.
    fn export_query_string(&self) -> String {
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}

fn parse_id(text: Option<&str>) -> Option<i64> {
    text.and_then(|text| text.trim().parse().ok())
}

impl From<&ChequeQuery> for ChequeFilter {
    fn from(query: &ChequeQuery) -> Self {
        Self {
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|search| !search.is_empty())
                .map(str::to_owned),
            status: query
                .status
                .as_deref()
                .and_then(|status| status.parse::<ChequeStatus>().ok()),
            bank_id: parse_id(query.bank.as_deref()),
            branch_id: parse_id(query.branch.as_deref()),
            client_id: parse_id(query.client.as_deref()),
            due_from: parse_optional_date(query.due_from.as_deref()).ok().flatten(),
            due_to: parse_optional_date(query.due_to.as_deref()).ok().flatten(),
        }
    }
}

struct FilterChoices {
    banks: Vec<Bank>,
    branches: Vec<BranchChoice>,
    clients: Vec<Client>,
}

/// Render the cheques listing page.
pub async fn get_cheques_page(
    State(state): State<ChequesPageState>,
    Query(query): Query<ChequeQuery>,
) -> Result<Response, Error> {
    let filter = ChequeFilter::from(&query);
    let today = local_today(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let (cheques, choices) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let cheques = query_cheques(&filter, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve cheques: {error}"))?;
        let choices = FilterChoices {
            banks: get_all_banks(&connection)?,
            branches: get_branch_choices(&connection)?,
            clients: get_all_clients(&connection)?,
        };

        (cheques, choices)
    };

    Ok(cheques_view(&cheques, &filter, &query, &choices, today).into_response())
}

fn cheques_view(
    cheques: &[ChequeListing],
    filter: &ChequeFilter,
    query: &ChequeQuery,
    choices: &FilterChoices,
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CHEQUES_VIEW).into_html();
    let export_query = query.export_query_string();
    let export_url = if export_query.is_empty() {
        endpoints::CHEQUES_EXPORT.to_owned()
    } else {
        format!("{}?{export_query}", endpoints::CHEQUES_EXPORT)
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-6xl space-y-4"
            {
                @if query.sync_failed() {
                    (sync_failure_banner())
                }

                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Chèques" }

                    div class="flex gap-4"
                    {
                        a href=(export_url) class=(LINK_STYLE) { "Exporter vers Excel" }
                        a href=(endpoints::NEW_CHEQUE_VIEW) class=(LINK_STYLE) { "Nouveau chèque" }
                    }
                }

                (filter_form(filter, choices))

                div class="overflow-x-auto rounded shadow-md"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Numéro" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Client" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Banque/Agence" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Montant" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Échéance" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Statut" }
                            }
                        }

                        tbody
                        {
                            @for listing in cheques {
                                (cheque_row(listing, today))
                            }

                            @if cheques.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        @if filter.is_active() {
                                            "Aucun chèque ne correspond aux filtres."
                                        } @else {
                                            "Aucun chèque enregistré."
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Chèques", &[], &content)
}

fn filter_form(filter: &ChequeFilter, choices: &FilterChoices) -> Markup {
    let status_options = ChequeStatus::ALL
        .iter()
        .map(|status| SelectOption {
            value: status.as_str().to_owned(),
            label: status.label().to_owned(),
        })
        .collect::<Vec<_>>();
    let bank_options = choices
        .banks
        .iter()
        .map(|bank| SelectOption {
            value: bank.id.to_string(),
            label: bank.name.to_string(),
        })
        .collect::<Vec<_>>();
    let branch_options = choices
        .branches
        .iter()
        .filter(|branch| filter.bank_id.is_none_or(|bank_id| branch.bank_id == bank_id))
        .map(|branch| SelectOption {
            value: branch.id.to_string(),
            label: branch.label.clone(),
        })
        .collect::<Vec<_>>();
    let client_options = choices
        .clients
        .iter()
        .map(|client| SelectOption {
            value: client.id.to_string(),
            label: client.name.to_string(),
        })
        .collect::<Vec<_>>();

    let selected_status = filter.status.map(|status| status.as_str());
    let selected_bank = filter.bank_id.map(|id| id.to_string());
    let selected_branch = filter.branch_id.map(|id| id.to_string());
    let selected_client = filter.client_id.map(|id| id.to_string());
    let input_style = format!("max-w-xs {FORM_TEXT_INPUT_STYLE}");

    html! {
        form
            method="get"
            action=(endpoints::CHEQUES_VIEW)
            class="flex flex-wrap gap-2 items-end"
            data-cheque-filters="true"
        {
            input
                type="search"
                name="search"
                placeholder="Numéro, client ou banque"
                value=[filter.search.as_deref()]
                class=(input_style);

            select name="statut" class=(input_style)
            {
                (select_options("Tous les statuts", &status_options, selected_status))
            }

            select
                name="banque"
                class=(input_style)
                hx-get=(endpoints::BRANCH_OPTIONS)
                hx-trigger="change"
                hx-target="#filter-branch"
                hx-vals="js:{bank_id: event.target.value}"
            {
                (select_options("Toutes les banques", &bank_options, selected_bank.as_deref()))
            }

            select id="filter-branch" name="agence" class=(input_style)
            {
                (select_options("Toutes les agences", &branch_options, selected_branch.as_deref()))
            }

            select name="client" class=(input_style)
            {
                (select_options("Tous les clients", &client_options, selected_client.as_deref()))
            }

            label class="text-sm"
            {
                "Échéance du "
                input type="date" name="du" value=[filter.due_from.map(|date| date.to_string())] class=(input_style);
            }

            label class="text-sm"
            {
                " au "
                input type="date" name="au" value=[filter.due_to.map(|date| date.to_string())] class=(input_style);
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filtrer" }

            @if filter.is_active() {
                a href=(endpoints::CHEQUES_VIEW) class=(LINK_STYLE) { "Réinitialiser" }
            }
        }
    }
}

fn cheque_row(listing: &ChequeListing, today: Date) -> Markup {
    let cheque = &listing.cheque;
    let detail_url = format_endpoint(endpoints::CHEQUE_VIEW, cheque.id);
    let is_overdue = cheque.status.is_open() && cheque.due_date < today;

    html!(
        tr class=(TABLE_ROW_STYLE) data-cheque-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                a href=(detail_url) class=(LINK_STYLE) { (cheque.number) }
            }
            td class=(TABLE_CELL_STYLE) { (listing.client_name) }
            td class=(TABLE_CELL_STYLE) { (listing.issuing_label()) }
            td class="px-6 py-4 text-right whitespace-nowrap"
            {
                (format_amount(cheque.amount, cheque.currency.as_str()))
            }
            td class=(TABLE_CELL_STYLE)
            {
                (format_date(cheque.due_date))

                @if is_overdue {
                    span class="ml-2 text-xs text-red-600 dark:text-red-400" { "En retard" }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                span class={ (BADGE_STYLE) " " (cheque.status.badge_style()) }
                {
                    (cheque.status.label())
                }
            }
        }
    )
}
