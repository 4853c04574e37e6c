//! Table views for the dashboard.

use maud::{Markup, html};

use crate::{
    cheque::{ChequeListing, Currency},
    dashboard::stats::{RejectedClient, StatusTotal},
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_amount, format_date,
    },
};

/// Amounts in several currencies, one per line.
pub(super) fn amounts_view(amounts: &[(Currency, f64)]) -> Markup {
    html! {
        @if amounts.is_empty() {
            "0.00"
        }
        @for (currency, amount) in amounts {
            span class="block" { (format_amount(*amount, currency.as_str())) }
        }
    }
}

pub(super) fn status_totals_table(totals: &[StatusTotal]) -> Markup {
    html! {
        div
        {
            h3 class="text-xl font-semibold mb-4" { "Répartition par statut" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Statut" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Nombre" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Montant" }
                        }
                    }
                    tbody
                    {
                        @for total in totals {
                            tr class=(TABLE_ROW_STYLE) data-status-total=(total.status.as_str())
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    a
                                        href={ (endpoints::CHEQUES_VIEW) "?statut=" (total.status.as_str()) }
                                        class={ (BADGE_STYLE) " " (total.status.badge_style()) }
                                    {
                                        (total.status.label())
                                    }
                                }
                                td class=(TABLE_CELL_STYLE) { (total.count) }
                                td class=(TABLE_CELL_STYLE) { (amounts_view(&total.amounts)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub(super) fn top_rejected_clients_table(clients: &[RejectedClient]) -> Markup {
    html! {
        div
        {
            h3 class="text-xl font-semibold mb-4" { "Clients avec le plus de rejets" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Client" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Chèques rejetés" }
                        }
                    }
                    tbody
                    {
                        @for client in clients {
                            tr class=(TABLE_ROW_STYLE) data-rejected-client="true"
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    a
                                        href={ (endpoints::CHEQUES_VIEW) "?client=" (client.client_id) "&statut=rejete" }
                                        class=(LINK_STYLE)
                                    {
                                        (client.name)
                                    }
                                }
                                td class=(TABLE_CELL_STYLE) { (client.rejected_count) }
                            }
                        }

                        @if clients.is_empty() {
                            tr
                            {
                                td colspan="2" class="px-6 py-4 text-center"
                                {
                                    "Aucun chèque rejeté."
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub(super) fn recent_cheques_table(cheques: &[ChequeListing]) -> Markup {
    html! {
        div class="xl:col-span-2"
        {
            h3 class="text-xl font-semibold mb-4" { "Derniers chèques enregistrés" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "N°" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Client" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Banque" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Montant" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Échéance" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Statut" }
                        }
                    }
                    tbody
                    {
                        @for listing in cheques {
                            @let cheque = &listing.cheque;
                            tr class=(TABLE_ROW_STYLE) data-recent-cheque="true"
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    a
                                        href=(format_endpoint(endpoints::CHEQUE_VIEW, cheque.id))
                                        class=(LINK_STYLE)
                                    {
                                        (cheque.number)
                                    }
                                }
                                td class=(TABLE_CELL_STYLE) { (listing.client_name) }
                                td class=(TABLE_CELL_STYLE) { (listing.issuing_label()) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (format_amount(cheque.amount, cheque.currency.as_str()))
                                }
                                td class=(TABLE_CELL_STYLE) { (format_date(cheque.due_date)) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    span class={ (BADGE_STYLE) " " (cheque.status.badge_style()) }
                                    {
                                        (cheque.status.label())
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
