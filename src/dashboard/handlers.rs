//! The dashboard page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    cheque::{ChequeListing, Currency, get_recent_cheques},
    dashboard::{
        charts::{DashboardChart, chart_container, chart_script, monthly_status_chart},
        stats::{
            RejectedClient, StatusTotal, count_due_soon, count_overdue, get_collected_this_month,
            get_monthly_status_amounts, get_status_totals, get_top_rejected_clients,
        },
        tables::{amounts_view, recent_cheques_table, status_totals_table, top_rejected_clients_table},
    },
    endpoints,
    html::{HeadElement, LINK_STYLE, base},
    navigation::NavBar,
    notification::count_unread_notifications,
    timezone::local_today,
};

const RECENT_CHEQUE_COUNT: u32 = 10;
const TOP_REJECTED_CLIENT_COUNT: u32 = 5;
const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Africa/Casablanca".
    pub local_timezone: String,
    pub due_soon_days: u32,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            due_soon_days: state.due_soon_days,
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    status_totals: Vec<StatusTotal>,
    collected_this_month: Vec<(Currency, f64)>,
    overdue_count: u64,
    due_soon_count: u64,
    unread_notifications: u64,
    top_rejected_clients: Vec<RejectedClient>,
    recent_cheques: Vec<ChequeListing>,
    chart: DashboardChart,
}

/// Display an overview of the cheque portfolio.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let data = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let status_totals = get_status_totals(&connection)
            .inspect_err(|error| tracing::error!("could not get status totals: {error}"))?;

        if status_totals.iter().all(|total| total.count == 0) {
            return Ok(dashboard_no_data_view().into_response());
        }

        let monthly_amounts = get_monthly_status_amounts(today.year(), &connection)?;

        DashboardData {
            status_totals,
            collected_this_month: get_collected_this_month(today, &connection)?,
            overdue_count: count_overdue(today, &connection)?,
            due_soon_count: count_due_soon(today, state.due_soon_days, &connection)?,
            unread_notifications: count_unread_notifications(&connection)?,
            top_rejected_clients: get_top_rejected_clients(TOP_REJECTED_CLIENT_COUNT, &connection)?,
            recent_cheques: get_recent_cheques(RECENT_CHEQUE_COUNT, &connection)?,
            chart: DashboardChart {
                id: "monthly-status-chart",
                options: monthly_status_chart(today.year(), &monthly_amounts).to_string(),
            },
        }
    };

    Ok(dashboard_view(&data, state.due_soon_days).into_response())
}

fn dashboard_no_data_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold" { "Aucun chèque pour le moment" }

            p
            {
                "Les indicateurs apparaîtront ici dès que vous aurez commencé à "
                a href=(endpoints::NEW_CHEQUE_VIEW) class=(LINK_STYLE) { "enregistrer un chèque" }
                "."
            }
        }
    );

    base("Tableau de bord", &[], &content)
}

fn stat_card(title: &str, value: Markup, href: Option<String>) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700
                rounded-lg p-4 shadow-md"
            data-stat-card=(title)
        {
            p class="text-sm text-gray-600 dark:text-gray-400" { (title) }
            div class="mt-2 text-2xl font-bold" { (value) }
            @if let Some(href) = href {
                a href=(href) class={ "text-sm " (LINK_STYLE) } { "Voir" }
            }
        }
    }
}

fn dashboard_view(data: &DashboardData, due_soon_days: u32) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            section class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-8"
            {
                (stat_card(
                    "Encaissé ce mois-ci",
                    amounts_view(&data.collected_this_month),
                    None,
                ))
                (stat_card(
                    "Chèques en retard",
                    html! { (data.overdue_count) },
                    None,
                ))
                (stat_card(
                    &format!("Échéance sous {due_soon_days} jour(s)"),
                    html! { (data.due_soon_count) },
                    None,
                ))
                (stat_card(
                    "Notifications non lues",
                    html! { (data.unread_notifications) },
                    Some(endpoints::NOTIFICATIONS_VIEW.to_owned()),
                ))
            }

            section class="w-full mb-8" { (chart_container(&data.chart)) }

            section class="w-full grid grid-cols-1 xl:grid-cols-2 gap-4 mb-8"
            {
                (status_totals_table(&data.status_totals))
                (top_rejected_clients_table(&data.top_rejected_clients))
                (recent_cheques_table(&data.recent_cheques))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_URL.to_owned()),
        chart_script(&data.chart),
    ];

    base("Tableau de bord", &scripts, &content)
}
