//! Notification types.

use std::{fmt::Display, str::FromStr};

use time::Date;

use crate::{Error, cheque::ChequeId};

/// Database identifier for a notification.
pub type NotificationId = i64;

/// Why a notification was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// An open cheque is due within the due-soon window.
    DueSoon,
    /// An open cheque is past its due date.
    Overdue,
    /// A rejected cheque waits for follow-up.
    Rejected,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::DueSoon => "due_soon",
            NotificationKind::Overdue => "overdue",
            NotificationKind::Rejected => "rejected",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::DueSoon => "Chèque à échéance proche",
            NotificationKind::Overdue => "Chèque en retard",
            NotificationKind::Rejected => "Chèque rejeté sans traitement",
        }
    }

    /// Tailwind classes for the left border of the notification card.
    pub fn accent_style(&self) -> &'static str {
        match self {
            NotificationKind::DueSoon => "border-yellow-400",
            NotificationKind::Overdue => "border-orange-500",
            NotificationKind::Rejected => "border-red-600",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "due_soon" => Ok(NotificationKind::DueSoon),
            "overdue" => Ok(NotificationKind::Overdue),
            "rejected" => Ok(NotificationKind::Rejected),
            other => Err(Error::InvalidNotificationKind(other.to_owned())),
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An alert about a cheque shown on the notifications page.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub cheque_id: ChequeId,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    /// The day the check that raised it ran.
    pub created_on: Date,
}
