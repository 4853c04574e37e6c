//! The periodic scan that turns due dates and rejections into notifications.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::{Date, Duration};
use tokio::task::JoinHandle;

use crate::{
    Error,
    cheque::{ChequeFilter, ChequeListing, ChequeStatus, query_cheques},
    config::scheduler_period,
    html::format_date,
    notification::{NotificationKind, db::insert_notification},
    timezone::local_today,
};

/// The number of notifications created by one run of [run_notification_checks].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// New due-soon notifications.
    pub due_soon: usize,
    /// New overdue notifications.
    pub overdue: usize,
    /// New notifications for rejected cheques.
    pub rejected: usize,
}

impl CheckSummary {
    /// The number of notifications created across all kinds.
    pub fn total(&self) -> usize {
        self.due_soon + self.overdue + self.rejected
    }
}

/// Create the notifications for `today`.
///
/// Open cheques due between `today` and `today + due_soon_days` are due soon, open cheques
/// due before `today` are overdue, and every rejected cheque needs follow-up. Running this
/// several times on the same day does not create duplicates.
pub fn run_notification_checks(
    today: Date,
    due_soon_days: u32,
    connection: &Connection,
) -> Result<CheckSummary, Error> {
    let mut summary = CheckSummary::default();

    let due_soon_filter = ChequeFilter {
        due_from: Some(today),
        due_to: Some(today.saturating_add(Duration::days(i64::from(due_soon_days)))),
        ..Default::default()
    };
    for listing in open_cheques(&due_soon_filter, connection)? {
        let message = format!(
            "Le chèque n°{} de {} arrive à échéance le {}",
            listing.cheque.number,
            listing.client_name,
            format_date(listing.cheque.due_date)
        );
        if insert_notification(
            NotificationKind::DueSoon,
            listing.cheque.id,
            &message,
            today,
            connection,
        )? {
            summary.due_soon += 1;
        }
    }

    let overdue_filter = ChequeFilter {
        due_to: today.previous_day(),
        ..Default::default()
    };
    for listing in open_cheques(&overdue_filter, connection)? {
        let days_late = (today - listing.cheque.due_date).whole_days();
        let message = format!(
            "Le chèque n°{} de {} est en retard de {} jour(s)",
            listing.cheque.number, listing.client_name, days_late
        );
        if insert_notification(
            NotificationKind::Overdue,
            listing.cheque.id,
            &message,
            today,
            connection,
        )? {
            summary.overdue += 1;
        }
    }

    let rejected_filter = ChequeFilter {
        status: Some(ChequeStatus::Rejected),
        ..Default::default()
    };
    for listing in query_cheques(&rejected_filter, connection)? {
        let message = format!(
            "Le chèque n°{} de {} est rejeté et nécessite un traitement",
            listing.cheque.number, listing.client_name
        );
        if insert_notification(
            NotificationKind::Rejected,
            listing.cheque.id,
            &message,
            today,
            connection,
        )? {
            summary.rejected += 1;
        }
    }

    Ok(summary)
}

fn open_cheques(
    filter: &ChequeFilter,
    connection: &Connection,
) -> Result<Vec<ChequeListing>, Error> {
    let cheques = query_cheques(filter, connection)?;

    Ok(cheques
        .into_iter()
        .filter(|listing| listing.cheque.status.is_open())
        .collect())
}

/// Run [run_notification_checks] now and then every `interval_hours` hours.
///
/// Errors are logged and the loop keeps going.
pub fn spawn_notification_scheduler(
    db_connection: Arc<Mutex<Connection>>,
    local_timezone: String,
    due_soon_days: u32,
    interval_hours: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(scheduler_period(interval_hours));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let Some(today) = local_today(&local_timezone) else {
                tracing::error!("invalid timezone {local_timezone}, skipping notification checks");
                continue;
            };

            let result = match db_connection.lock() {
                Ok(connection) => run_notification_checks(today, due_soon_days, &connection),
                Err(error) => {
                    tracing::error!("could not acquire database lock: {error}");
                    continue;
                }
            };

            match result {
                Ok(summary) => tracing::info!(
                    "notification checks for {today}: {} due soon, {} overdue, {} rejected",
                    summary.due_soon,
                    summary.overdue,
                    summary.rejected
                ),
                Err(error) => tracing::error!("notification checks failed: {error}"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        cheque::{ChequeStatus, update_cheque_status},
        db::initialize,
        notification::{NotificationKind, count_unread_notifications, db::get_notifications},
        test_utils::{create_test_bank_and_branch, create_test_cheque, create_test_client},
    };

    use super::{CheckSummary, run_notification_checks, spawn_notification_scheduler};

    fn get_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn repeated_checks_on_same_day_notify_once() {
        let connection = get_connection();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Salma", &connection);
        create_test_cheque("3001", client.id, branch.id, &connection);
        let today = date!(2025 - 02 - 08);

        let first = run_notification_checks(today, 3, &connection).unwrap();
        let second = run_notification_checks(today, 3, &connection).unwrap();

        assert_eq!(
            first,
            CheckSummary {
                due_soon: 1,
                overdue: 0,
                rejected: 0
            }
        );
        assert_eq!(second, CheckSummary::default());
        let notifications = get_notifications(&connection).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::DueSoon);
        assert_eq!(notifications[0].title, "Chèque à échéance proche");
        assert_eq!(
            notifications[0].message,
            "Le chèque n°3001 de Salma arrive à échéance le 10/02/2025"
        );
    }

    #[test]
    fn due_soon_window_is_inclusive() {
        let connection = get_connection();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Salma", &connection);
        create_test_cheque("3001", client.id, branch.id, &connection);

        let too_early = run_notification_checks(date!(2025 - 02 - 06), 3, &connection).unwrap();
        let on_edge = run_notification_checks(date!(2025 - 02 - 07), 3, &connection).unwrap();
        let on_due_date = run_notification_checks(date!(2025 - 02 - 10), 3, &connection).unwrap();

        assert_eq!(too_early.total(), 0);
        assert_eq!(on_edge.due_soon, 1);
        assert_eq!(on_due_date.due_soon, 1);
        assert_eq!(on_due_date.overdue, 0);
    }

    #[test]
    fn past_due_open_cheque_is_overdue() {
        let connection = get_connection();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Omar", &connection);
        create_test_cheque("3002", client.id, branch.id, &connection);

        let summary = run_notification_checks(date!(2025 - 02 - 15), 3, &connection).unwrap();

        assert_eq!(summary.overdue, 1);
        assert_eq!(summary.due_soon, 0);
        assert_eq!(
            get_notifications(&connection).unwrap()[0].message,
            "Le chèque n°3002 de Omar est en retard de 5 jour(s)"
        );
    }

    #[test]
    fn closed_cheques_are_not_overdue_and_rejected_ones_need_follow_up() {
        let connection = get_connection();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Hind", &connection);
        let honored = create_test_cheque("4001", client.id, branch.id, &connection);
        let rejected = create_test_cheque("4002", client.id, branch.id, &connection);
        for (cheque, outcome) in [
            (&honored, ChequeStatus::Honored),
            (&rejected, ChequeStatus::Rejected),
        ] {
            update_cheque_status(
                cheque.id,
                ChequeStatus::Pending,
                ChequeStatus::Deposited,
                None,
                &connection,
            )
            .unwrap();
            update_cheque_status(
                cheque.id,
                ChequeStatus::Deposited,
                outcome,
                None,
                &connection,
            )
            .unwrap();
        }

        let summary = run_notification_checks(date!(2025 - 03 - 01), 3, &connection).unwrap();

        assert_eq!(
            summary,
            CheckSummary {
                due_soon: 0,
                overdue: 0,
                rejected: 1
            }
        );
        let notifications = get_notifications(&connection).unwrap();
        assert_eq!(notifications[0].cheque_id, rejected.id);
        assert_eq!(
            notifications[0].message,
            "Le chèque n°4002 de Hind est rejeté et nécessite un traitement"
        );
    }

    #[tokio::test]
    async fn scheduler_with_huge_interval_still_runs_first_check() {
        let connection = get_connection();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Omar", &connection);
        create_test_cheque("3002", client.id, branch.id, &connection);
        let db_connection = Arc::new(Mutex::new(connection));

        let handle = spawn_notification_scheduler(
            db_connection.clone(),
            "Africa/Casablanca".to_owned(),
            3,
            u64::MAX,
        );

        let mut unread = 0;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            unread = count_unread_notifications(&db_connection.lock().unwrap()).unwrap();
            if unread > 0 {
                break;
            }
        }

        assert!(!handle.is_finished(), "the scheduler task stopped");
        handle.abort();
        assert_eq!(unread, 1);
    }
}
