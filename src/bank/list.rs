//! Banks listing page, with the branches of each bank.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    bank::{Bank, BankId, get_all_banks},
    branch::{Branch, get_all_branches},
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
};

/// The state needed for the banks listing page.
#[derive(Debug, Clone)]
pub struct BanksPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BanksPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the banks listing page.
pub async fn get_banks_page(State(state): State<BanksPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let banks = get_all_banks(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve banks: {error}"))?;
    let branches = get_all_branches(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve branches: {error}"))?;

    let mut branches_by_bank: HashMap<BankId, Vec<Branch>> = HashMap::new();
    for branch in branches {
        branches_by_bank.entry(branch.bank_id).or_default().push(branch);
    }

    Ok(banks_view(&banks, &branches_by_bank).into_response())
}

fn banks_view(banks: &[Bank], branches_by_bank: &HashMap<BankId, Vec<Branch>>) -> Markup {
    let nav_bar = NavBar::new(endpoints::BANKS_VIEW).into_html();
    let no_branches = Vec::new();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Banques" }

                    a href=(endpoints::NEW_BANK_VIEW) class=(LINK_STYLE)
                    {
                        "Nouvelle banque"
                    }
                }

                @for bank in banks {
                    (bank_card(bank, branches_by_bank.get(&bank.id).unwrap_or(&no_branches)))
                }

                @if banks.is_empty() {
                    p class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                    {
                        "Aucune banque enregistrée. "
                        a href=(endpoints::NEW_BANK_VIEW) class=(LINK_STYLE)
                        {
                            "Ajouter la première banque"
                        }
                    }
                }
            }
        }
    );

    base("Banques", &[], &content)
}

fn bank_card(bank: &Bank, branches: &[Branch]) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_BANK_VIEW, bank.id);
    let delete_url = format_endpoint(endpoints::BANK, bank.id);
    let new_branch_url = format_endpoint(endpoints::NEW_BRANCH_VIEW, bank.id);
    let confirm_message = format!(
        "Supprimer la banque « {} » et ses {} agence(s) ?",
        bank.name,
        branches.len()
    );

    html!(
        article
            class="rounded border border-gray-200 bg-white shadow-sm dark:border-gray-700 dark:bg-gray-800"
            data-bank-card="true"
        {
            header class="flex flex-wrap items-center justify-between gap-3 px-4 py-3"
            {
                div class="flex items-center gap-3"
                {
                    h2 class="text-lg font-semibold" { (bank.name) }

                    @if let Some(code) = &bank.code {
                        span class=(BADGE_STYLE) { (code) }
                    }
                }

                div class="flex items-center gap-4 text-sm"
                {
                    a href=(new_branch_url) class=(LINK_STYLE) { "Ajouter une agence" }

                    (edit_delete_action_links(
                        &edit_url,
                        &delete_url,
                        &confirm_message,
                        "closest [data-bank-card='true']",
                    ))
                }
            }

            div class="overflow-x-auto"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Agence" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Adresse" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Téléphone" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for branch in branches {
                            (branch_row(branch))
                        }

                        @if branches.is_empty() {
                            tr
                            {
                                td
                                    colspan="4"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "Aucune agence."
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

fn branch_row(branch: &Branch) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_BRANCH_VIEW, branch.id);
    let delete_url = format_endpoint(endpoints::BRANCH, branch.id);
    let confirm_message = format!("Supprimer l'agence « {} » ?", branch.name);
    let address = [branch.address.as_deref(), branch.postal_code.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    html!(
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (branch.name) }
            td class=(TABLE_CELL_STYLE) { (address) }
            td class=(TABLE_CELL_STYLE) { (branch.phone.as_deref().unwrap_or_default()) }
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

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        bank::{BankName, create_bank},
        branch::{BranchBuilder, create_branch},
        db::initialize,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::{BanksPageState, get_banks_page};

    #[tokio::test]
    async fn lists_banks_with_their_branches() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let cih = create_bank(BankName::new_unchecked("CIH"), None, &connection).unwrap();
        let bmce = create_bank(BankName::new_unchecked("BMCE"), None, &connection).unwrap();
        create_branch(BranchBuilder::new(cih.id, "Agdal"), &connection).unwrap();
        create_branch(BranchBuilder::new(cih.id, "Maârif"), &connection).unwrap();
        create_branch(BranchBuilder::new(bmce.id, "Gueliz"), &connection).unwrap();
        let state = BanksPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_banks_page(State(state)).await.unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let cards = html
            .select(&Selector::parse("[data-bank-card]").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(cards.len(), 2);
        let row_selector = Selector::parse("tbody tr").unwrap();
        // Banks are sorted by name, so BMCE comes first.
        assert_eq!(cards[0].select(&row_selector).count(), 1);
        assert_eq!(cards[1].select(&row_selector).count(), 2);
    }

    #[tokio::test]
    async fn shows_empty_state() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let state = BanksPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_banks_page(State(state)).await.unwrap();

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Aucune banque enregistrée."));
    }
}
