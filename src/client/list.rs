//! Clients listing page with search and kind filter.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    client::{Client, ClientFilter, ClientKind, search_clients},
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links,
    },
    navigation::NavBar,
};

/// The state needed for the clients listing page.
#[derive(Debug, Clone)]
pub struct ClientsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ClientsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The search form's query parameters. Blank values mean "any".
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
}

impl From<&ClientsQuery> for ClientFilter {
    fn from(query: &ClientsQuery) -> Self {
        Self {
            search: query.search.clone(),
            kind: query
                .kind
                .as_deref()
                .and_then(|kind| kind.parse::<ClientKind>().ok()),
        }
    }
}

/// Render the clients listing page.
pub async fn get_clients_page(
    State(state): State<ClientsPageState>,
    Query(query): Query<ClientsQuery>,
) -> Result<Response, Error> {
    let filter = ClientFilter::from(&query);

    let clients = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        search_clients(&filter, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve clients: {error}"))?
    };

    Ok(clients_view(&clients, &filter).into_response())
}

fn clients_view(clients: &[Client], filter: &ClientFilter) -> Markup {
    let nav_bar = NavBar::new(endpoints::CLIENTS_VIEW).into_html();
    let is_filtered = filter.search.as_deref().is_some_and(|search| !search.trim().is_empty())
        || filter.kind.is_some();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Clients" }

                    a href=(endpoints::NEW_CLIENT_VIEW) class=(LINK_STYLE) { "Nouveau client" }
                }

                form method="get" action=(endpoints::CLIENTS_VIEW) class="flex flex-wrap gap-2"
                {
                    input
                        type="search"
                        name="search"
                        placeholder="Nom, CIN, RC, IF, ICE ou e-mail"
                        value=[filter.search.as_deref()]
                        class={ "max-w-xs " (FORM_TEXT_INPUT_STYLE) };

                    select name="kind" class={ "max-w-xs " (FORM_TEXT_INPUT_STYLE) }
                    {
                        option value="" { "Tous les types" }

                        @for kind in ClientKind::ALL {
                            @if filter.kind == Some(kind) {
                                option value=(kind.as_str()) selected { (kind.label()) }
                            } @else {
                                option value=(kind.as_str()) { (kind.label()) }
                            }
                        }
                    }

                    button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Rechercher" }
                }

                div class="overflow-x-auto rounded shadow-md"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Nom" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "CIN / RC" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "IF / ICE" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Contact" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for client in clients {
                                (client_row(client))
                            }

                            @if clients.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        @if is_filtered {
                                            "Aucun client ne correspond à la recherche."
                                        } @else {
                                            "Aucun client enregistré."
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

    base("Clients", &[], &content)
}

fn client_row(client: &Client) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_CLIENT_VIEW, client.id);
    let delete_url = format_endpoint(endpoints::CLIENT, client.id);
    let confirm_message = format!("Supprimer le client « {} » ?", client.name);
    let contact = [client.phone.as_deref(), client.email.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" · ");

    html!(
        tr class=(TABLE_ROW_STYLE) data-client-row="true"
        {
            td class=(TABLE_CELL_STYLE) { (client.name) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(BADGE_STYLE) { (client.kind.label()) }
            }
            td class=(TABLE_CELL_STYLE) { (client.id_number.as_deref().unwrap_or_default()) }
            td class=(TABLE_CELL_STYLE) { (client.tax_number.as_deref().unwrap_or_default()) }
            td class=(TABLE_CELL_STYLE) { (contact) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(&edit_url, &delete_url, &confirm_message, "closest tr"))
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        client::{ClientBuilder, ClientKind, create_client},
        db::initialize,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::{ClientsPageState, ClientsQuery, get_clients_page};

    fn get_state() -> ClientsPageState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_client(ClientBuilder::new(ClientKind::Person, "Fatima Zahra"), &connection)
            .unwrap();
        create_client(ClientBuilder::new(ClientKind::Company, "Zahra Import"), &connection)
            .unwrap();
        create_client(ClientBuilder::new(ClientKind::Person, "Mehdi"), &connection).unwrap();

        ClientsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn row_count(query: ClientsQuery) -> usize {
        let response = get_clients_page(State(get_state()), Query(query))
            .await
            .unwrap();
        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        html.select(&Selector::parse("[data-client-row]").unwrap())
            .count()
    }

    #[tokio::test]
    async fn lists_all_clients() {
        assert_eq!(row_count(ClientsQuery::default()).await, 3);
    }

    #[tokio::test]
    async fn filters_by_search_and_kind() {
        let by_search = row_count(ClientsQuery {
            search: Some("zahra".to_owned()),
            kind: Some(String::new()),
        })
        .await;
        let by_both = row_count(ClientsQuery {
            search: Some("zahra".to_owned()),
            kind: Some("entreprise".to_owned()),
        })
        .await;

        assert_eq!(by_search, 2);
        assert_eq!(by_both, 1);
    }
}
