//! Due-date and rejection notifications, the scheduler that raises them and their page.

mod checks;
mod db;
mod domain;
mod page;

pub use checks::{CheckSummary, run_notification_checks, spawn_notification_scheduler};
pub use db::{count_unread_notifications, create_notification_table};
pub use domain::{Notification, NotificationId, NotificationKind};
pub use page::{
    get_notifications_page, mark_all_notifications_read_endpoint,
    mark_notification_read_endpoint, run_notification_checks_endpoint,
};
