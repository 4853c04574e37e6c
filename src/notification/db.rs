//! Database operations for notifications.

use rusqlite::{Connection, Row, types::Type};
use time::Date;

use crate::{
    Error,
    cheque::ChequeId,
    notification::{Notification, NotificationId, NotificationKind},
};

/// Initialize the notification table.
///
/// A cheque gets at most one notification of each kind per day.
pub fn create_notification_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS notification (
            id INTEGER PRIMARY KEY,
            kind TEXT NOT NULL CHECK (kind IN ('due_soon', 'overdue', 'rejected')),
            cheque_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_on TEXT NOT NULL,
            UNIQUE(cheque_id, kind, created_on),
            FOREIGN KEY(cheque_id) REFERENCES cheque(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_notification_is_read ON notification(is_read);",
    )?;

    Ok(())
}

/// Insert a notification unless the cheque already has one of this kind on `created_on`.
///
/// Returns whether a row was inserted.
pub fn insert_notification(
    kind: NotificationKind,
    cheque_id: ChequeId,
    message: &str,
    created_on: Date,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "INSERT OR IGNORE INTO notification (kind, cheque_id, title, message, created_on)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (kind.as_str(), cheque_id, kind.title(), message, created_on),
    )?;

    Ok(rows_affected > 0)
}

/// Retrieve all notifications, unread first and then newest first.
pub fn get_notifications(connection: &Connection) -> Result<Vec<Notification>, Error> {
    connection
        .prepare(
            "SELECT id, kind, cheque_id, title, message, is_read, created_on
            FROM notification
            ORDER BY is_read ASC, created_on DESC, id DESC",
        )?
        .query_map([], map_notification_row)?
        .map(|maybe_notification| maybe_notification.map_err(|error| error.into()))
        .collect()
}

/// The number of unread notifications.
pub fn count_unread_notifications(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(*) FROM notification WHERE is_read = 0",
            [],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Mark a single notification as read.
///
/// # Errors
/// Returns [Error::UpdateMissingNotification] if the notification does not exist.
pub fn mark_notification_read(
    notification_id: NotificationId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE notification SET is_read = 1 WHERE id = ?1",
        [notification_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingNotification);
    }

    Ok(())
}

/// Mark every notification as read and return how many were unread.
pub fn mark_all_notifications_read(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("UPDATE notification SET is_read = 1 WHERE is_read = 0", [])
        .map_err(|error| error.into())
}

fn map_notification_row(row: &Row) -> Result<Notification, rusqlite::Error> {
    let raw_kind: String = row.get(1)?;
    let kind = raw_kind
        .parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(error)))?;

    Ok(Notification {
        id: row.get(0)?,
        kind,
        cheque_id: row.get(2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        is_read: row.get(5)?,
        created_on: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        cheque::delete_cheque,
        db::initialize,
        notification::NotificationKind,
        test_utils::{create_test_bank_and_branch, create_test_cheque, create_test_client},
    };

    use super::{
        count_unread_notifications, get_notifications, insert_notification,
        mark_all_notifications_read, mark_notification_read,
    };

    fn get_connection_with_cheque() -> (Connection, i64) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (_, branch) = create_test_bank_and_branch(&connection);
        let client = create_test_client("Youssef", &connection);
        let cheque = create_test_cheque("7001", client.id, branch.id, &connection);

        (connection, cheque.id)
    }

    #[test]
    fn insert_ignores_same_cheque_kind_and_day() {
        let (connection, cheque_id) = get_connection_with_cheque();
        let today = date!(2025 - 02 - 08);

        let first = insert_notification(
            NotificationKind::DueSoon,
            cheque_id,
            "premier",
            today,
            &connection,
        )
        .unwrap();
        let second = insert_notification(
            NotificationKind::DueSoon,
            cheque_id,
            "second",
            today,
            &connection,
        )
        .unwrap();
        let next_day = insert_notification(
            NotificationKind::DueSoon,
            cheque_id,
            "lendemain",
            today.next_day().unwrap(),
            &connection,
        )
        .unwrap();

        assert!(first);
        assert!(!second);
        assert!(next_day);
        assert_eq!(get_notifications(&connection).unwrap().len(), 2);
    }

    #[test]
    fn unread_notifications_are_listed_first() {
        let (connection, cheque_id) = get_connection_with_cheque();
        insert_notification(
            NotificationKind::Overdue,
            cheque_id,
            "ancienne",
            date!(2025 - 02 - 11),
            &connection,
        )
        .unwrap();
        insert_notification(
            NotificationKind::Overdue,
            cheque_id,
            "récente",
            date!(2025 - 02 - 12),
            &connection,
        )
        .unwrap();
        let newest = get_notifications(&connection).unwrap()[0].id;
        mark_notification_read(newest, &connection).unwrap();

        let notifications = get_notifications(&connection).unwrap();

        assert_eq!(notifications[0].message, "ancienne");
        assert!(!notifications[0].is_read);
        assert!(notifications[1].is_read);
        assert_eq!(notifications[1].title, "Chèque en retard");
        assert_eq!(count_unread_notifications(&connection), Ok(1));
    }

    #[test]
    fn mark_missing_notification_fails() {
        let (connection, _) = get_connection_with_cheque();

        assert_eq!(
            mark_notification_read(42, &connection),
            Err(Error::UpdateMissingNotification)
        );
    }

    #[test]
    fn mark_all_read_returns_count() {
        let (connection, cheque_id) = get_connection_with_cheque();
        for kind in [NotificationKind::DueSoon, NotificationKind::Rejected] {
            insert_notification(kind, cheque_id, "msg", date!(2025 - 02 - 08), &connection)
                .unwrap();
        }

        assert_eq!(mark_all_notifications_read(&connection), Ok(2));
        assert_eq!(mark_all_notifications_read(&connection), Ok(0));
        assert_eq!(count_unread_notifications(&connection), Ok(0));
    }

    #[test]
    fn deleting_cheque_removes_its_notifications() {
        let (connection, cheque_id) = get_connection_with_cheque();
        insert_notification(
            NotificationKind::DueSoon,
            cheque_id,
            "msg",
            date!(2025 - 02 - 08),
            &connection,
        )
        .unwrap();

        delete_cheque(cheque_id, &connection).unwrap();

        assert!(get_notifications(&connection).unwrap().is_empty());
    }
}
