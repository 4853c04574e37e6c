//! The cheque lifecycle.
//!
//! ```text
//! en_attente ──► depose ──► encaisse
//!     │             └─────► rejete
//!     └────────► annule
//! ```

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Where a cheque is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChequeStatus {
    /// Received from the client, not yet taken to the bank.
    #[serde(rename = "en_attente")]
    Pending,
    /// Handed to a bank for collection.
    #[serde(rename = "depose")]
    Deposited,
    /// Paid by the issuing bank.
    #[serde(rename = "encaisse")]
    Honored,
    /// Returned unpaid by the issuing bank.
    #[serde(rename = "rejete")]
    Rejected,
    /// Withdrawn before it was deposited.
    #[serde(rename = "annule")]
    Cancelled,
}

impl ChequeStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [ChequeStatus; 5] = [
        ChequeStatus::Pending,
        ChequeStatus::Deposited,
        ChequeStatus::Honored,
        ChequeStatus::Rejected,
        ChequeStatus::Cancelled,
    ];

    /// The identifier stored in the database and used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChequeStatus::Pending => "en_attente",
            ChequeStatus::Deposited => "depose",
            ChequeStatus::Honored => "encaisse",
            ChequeStatus::Rejected => "rejete",
            ChequeStatus::Cancelled => "annule",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChequeStatus::Pending => "En attente",
            ChequeStatus::Deposited => "Déposé",
            ChequeStatus::Honored => "Encaissé",
            ChequeStatus::Rejected => "Rejeté",
            ChequeStatus::Cancelled => "Annulé",
        }
    }

    /// The label of the button that moves a cheque into this status.
    pub fn action_label(&self) -> &'static str {
        match self {
            ChequeStatus::Pending => "Remettre en attente",
            ChequeStatus::Deposited => "Marquer comme déposé",
            ChequeStatus::Honored => "Marquer comme encaissé",
            ChequeStatus::Rejected => "Marquer comme rejeté",
            ChequeStatus::Cancelled => "Annuler le chèque",
        }
    }

    /// The statuses a cheque may move to from this one.
    pub fn successors(&self) -> &'static [ChequeStatus] {
        match self {
            ChequeStatus::Pending => &[ChequeStatus::Deposited, ChequeStatus::Cancelled],
            ChequeStatus::Deposited => &[ChequeStatus::Honored, ChequeStatus::Rejected],
            ChequeStatus::Honored | ChequeStatus::Rejected | ChequeStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: ChequeStatus) -> bool {
        self.successors().contains(&next)
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    /// Whether the cheque still waits for its money.
    pub fn is_open(&self) -> bool {
        matches!(self, ChequeStatus::Pending | ChequeStatus::Deposited)
    }

    /// Move from this status to `next`.
    ///
    /// # Errors
    /// Returns [Error::InvalidStatusTransition] if `next` is not a successor of this status.
    pub fn transition(self, next: ChequeStatus) -> Result<ChequeStatus, Error> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::InvalidStatusTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Tailwind classes for the status badge.
    pub fn badge_style(&self) -> &'static str {
        match self {
            ChequeStatus::Pending => {
                "bg-yellow-100 text-yellow-800 dark:bg-yellow-900 dark:text-yellow-300"
            }
            ChequeStatus::Deposited => {
                "bg-blue-100 text-blue-800 dark:bg-blue-900 dark:text-blue-300"
            }
            ChequeStatus::Honored => {
                "bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300"
            }
            ChequeStatus::Rejected => "bg-red-100 text-red-800 dark:bg-red-900 dark:text-red-300",
            ChequeStatus::Cancelled => {
                "bg-gray-100 text-gray-800 dark:bg-gray-700 dark:text-gray-300"
            }
        }
    }

    /// The series colour used by the dashboard chart.
    pub fn chart_colour(&self) -> &'static str {
        match self {
            ChequeStatus::Pending => "#FACC15",
            ChequeStatus::Deposited => "#3B82F6",
            ChequeStatus::Honored => "#22C55E",
            ChequeStatus::Rejected => "#EF4444",
            ChequeStatus::Cancelled => "#9CA3AF",
        }
    }
}

impl FromStr for ChequeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChequeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidChequeStatus(s.to_owned()))
    }
}

impl Display for ChequeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
