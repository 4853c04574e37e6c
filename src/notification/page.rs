//! The notifications page and its read and check endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints::{self, format_endpoint},
    html::{BUTTON_SECONDARY_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_date},
    navigation::NavBar,
    notification::{
        Notification, NotificationId,
        checks::run_notification_checks,
        db::{get_notifications, mark_all_notifications_read, mark_notification_read},
    },
    timezone::local_today,
};

/// The state needed for the notifications page and endpoints.
#[derive(Debug, Clone)]
pub struct NotificationState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
    pub due_soon_days: u32,
}

impl FromRef<AppState> for NotificationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            due_soon_days: state.due_soon_days,
        }
    }
}

/// Render the notifications, unread first.
pub async fn get_notifications_page(
    State(state): State<NotificationState>,
) -> Result<Response, Error> {
    let notifications = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_notifications(&connection)?
    };

    Ok(notifications_view(&notifications).into_response())
}

fn notifications_view(notifications: &[Notification]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NOTIFICATIONS_VIEW).into_html();
    let unread_count = notifications
        .iter()
        .filter(|notification| !notification.is_read)
        .count();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold"
                    {
                        "Notifications"
                        @if unread_count > 0 {
                            " (" (unread_count) " non lue(s))"
                        }
                    }

                    div class="flex gap-2"
                    {
                        button
                            type="button"
                            hx-post=(endpoints::RUN_NOTIFICATION_CHECKS)
                            hx-target-error="#alert-container"
                            class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Vérifier maintenant"
                        }

                        @if unread_count > 0 {
                            button
                                type="button"
                                hx-put=(endpoints::NOTIFICATIONS_READ)
                                hx-target-error="#alert-container"
                                class=(BUTTON_SECONDARY_STYLE)
                            {
                                "Tout marquer comme lu"
                            }
                        }
                    }
                }

                ul class="space-y-3"
                {
                    @for notification in notifications {
                        (notification_card(notification))
                    }
                }

                @if notifications.is_empty() {
                    p class="text-center text-gray-500 dark:text-gray-400"
                    {
                        "Aucune notification."
                    }
                }
            }
        }
    };

    base("Notifications", &[], &content)
}

fn notification_card(notification: &Notification) -> Markup {
    let card_style = if notification.is_read {
        "opacity-60"
    } else {
        "bg-white dark:bg-gray-800 shadow"
    };

    html! {
        li
            class={ "p-4 rounded border-l-4 " (notification.kind.accent_style()) " " (card_style) }
            data-notification-id=(notification.id)
            data-read=(notification.is_read)
        {
            div class="flex justify-between gap-4"
            {
                div
                {
                    p class="font-semibold" { (notification.title) }
                    p class="text-sm" { (notification.message) }
                    p class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        (format_date(notification.created_on))
                        " · "
                        a
                            href=(format_endpoint(endpoints::CHEQUE_VIEW, notification.cheque_id))
                            class=(LINK_STYLE)
                        {
                            "Voir le chèque"
                        }
                    }
                }

                @if !notification.is_read {
                    button
                        type="button"
                        hx-put=(format_endpoint(endpoints::NOTIFICATION_READ, notification.id))
                        hx-target-error="#alert-container"
                        class=(LINK_STYLE)
                    {
                        "Marquer comme lue"
                    }
                }
            }
        }
    }
}

/// Mark one notification as read and reload the page.
pub async fn mark_notification_read_endpoint(
    Path(notification_id): Path<NotificationId>,
    State(state): State<NotificationState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match mark_notification_read(notification_id, &connection) {
        Ok(()) => reload_notifications(),
        Err(error @ Error::UpdateMissingNotification) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("could not mark notification {notification_id} as read: {error}");
            error.into_alert_response()
        }
    }
}

/// Mark every notification as read and reload the page.
pub async fn mark_all_notifications_read_endpoint(
    State(state): State<NotificationState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match mark_all_notifications_read(&connection) {
        Ok(count) => {
            tracing::debug!("marked {count} notification(s) as read");
            reload_notifications()
        }
        Err(error) => {
            tracing::error!("could not mark notifications as read: {error}");
            error.into_alert_response()
        }
    }
}

/// Run the notification checks immediately instead of waiting for the scheduler.
pub async fn run_notification_checks_endpoint(
    State(state): State<NotificationState>,
) -> Response {
    let Some(today) = local_today(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match run_notification_checks(today, state.due_soon_days, &connection) {
        Ok(summary) => {
            tracing::info!("manual notification checks created {} notification(s)", summary.total());
            Alert::Success {
                message: "Vérification terminée".to_owned(),
                details: format!(
                    "{} échéance(s) proche(s), {} retard(s), {} rejet(s). \
                    Actualisez la page pour les afficher.",
                    summary.due_soon, summary.overdue, summary.rejected
                ),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("manual notification checks failed: {error}");
            error.into_alert_response()
        }
    }
}

fn reload_notifications() -> Response {
    (
        HxRedirect(endpoints::NOTIFICATIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints,
        notification::{
            NotificationKind,
            db::{count_unread_notifications, insert_notification},
        },
        test_utils::{
            assert_alert_message, assert_hx_redirect, assert_valid_html,
            create_test_bank_and_branch, create_test_cheque, create_test_client,
            parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        NotificationState, get_notifications_page, mark_all_notifications_read_endpoint,
        mark_notification_read_endpoint, run_notification_checks_endpoint,
    };

    fn get_state() -> NotificationState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        NotificationState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Africa/Casablanca".to_owned(),
            due_soon_days: 3,
        }
    }

    fn add_notifications(state: &NotificationState) {
        let connection = state.db_connection.lock().unwrap();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Rachid", &connection);
        let cheque = create_test_cheque("5001", client.id, branch.id, &connection);
        for kind in [NotificationKind::DueSoon, NotificationKind::Overdue] {
            insert_notification(kind, cheque.id, "msg", date!(2025 - 02 - 08), &connection)
                .unwrap();
        }
    }

    #[tokio::test]
    async fn page_lists_notifications_with_read_buttons() {
        let state = get_state();
        add_notifications(&state);

        let response = get_notifications_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let cards = html
            .select(&Selector::parse("li[data-notification-id]").unwrap())
            .count();
        assert_eq!(cards, 2);
        let read_buttons = html
            .select(&Selector::parse("li button[hx-put]").unwrap())
            .count();
        assert_eq!(read_buttons, 2);
    }

    #[tokio::test]
    async fn mark_one_as_read() {
        let state = get_state();
        add_notifications(&state);

        let response = mark_notification_read_endpoint(Path(1), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::NOTIFICATIONS_VIEW);
        assert_eq!(
            count_unread_notifications(&state.db_connection.lock().unwrap()),
            Ok(1)
        );
    }

    #[tokio::test]
    async fn mark_missing_notification_returns_not_found() {
        let response = mark_notification_read_endpoint(Path(99), State(get_state())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn mark_all_as_read() {
        let state = get_state();
        add_notifications(&state);

        let response = mark_all_notifications_read_endpoint(State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            count_unread_notifications(&state.db_connection.lock().unwrap()),
            Ok(0)
        );
    }

    #[tokio::test]
    async fn manual_check_reports_summary() {
        let response = run_notification_checks_endpoint(State(get_state())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_alert_message(&html, "Vérification terminée");
    }
}
