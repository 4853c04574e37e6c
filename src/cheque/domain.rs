//! Core cheque domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, macros::format_description};

use crate::{
    Error,
    bank::BankId,
    branch::BranchId,
    cheque::ChequeStatus,
    client::ClientId,
    form::optional_text,
};

/// The smallest amount a cheque may be written for.
pub const MINIMUM_AMOUNT: f64 = 0.01;

/// Database identifier for a cheque.
pub type ChequeId = i64;

/// The currency a cheque is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Moroccan dirham.
    #[default]
    #[serde(rename = "MAD")]
    Mad,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Mad, Currency::Eur, Currency::Usd];

    /// The ISO 4217 code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Mad => "MAD",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidCurrency(s.to_owned()))
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cheque as stored in the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Cheque {
    pub id: ChequeId,
    pub number: String,
    pub amount: f64,
    pub currency: Currency,
    pub issue_date: Date,
    pub due_date: Date,
    pub status: ChequeStatus,
    pub client_id: ClientId,
    /// The branch the cheque is drawn on.
    pub branch_id: BranchId,
    /// The branch the cheque was handed to for collection.
    pub deposit_branch_id: Option<BranchId>,
    pub depositor_name: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<Date>,
    pub notes: Option<String>,
    /// The file name of the uploaded scan, relative to the upload directory.
    pub scan_file: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A cheque with the names of the records it references, for display and export.
#[derive(Debug, Clone, PartialEq)]
pub struct ChequeListing {
    pub cheque: Cheque,
    pub client_name: String,
    pub bank_id: BankId,
    pub bank_name: String,
    pub branch_name: String,
    pub deposit_bank_name: Option<String>,
    pub deposit_branch_name: Option<String>,
}

impl ChequeListing {
    /// "Bank/Branch" of the issuing branch.
    pub fn issuing_label(&self) -> String {
        format!("{}/{}", self.bank_name, self.branch_name)
    }

    /// "Bank/Branch" of the deposit branch, if the cheque was deposited.
    pub fn deposit_label(&self) -> Option<String> {
        match (&self.deposit_bank_name, &self.deposit_branch_name) {
            (Some(bank), Some(branch)) => Some(format!("{bank}/{branch}")),
            _ => None,
        }
    }
}

/// The fields needed to create or update a cheque.
///
/// Call [ChequeBuilder::validate] before writing it to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ChequeBuilder {
    pub number: String,
    pub amount: f64,
    pub currency: Currency,
    pub issue_date: Date,
    pub due_date: Date,
    pub client_id: ClientId,
    pub branch_id: BranchId,
    pub depositor_name: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<Date>,
    pub notes: Option<String>,
}

impl ChequeBuilder {
    /// A cheque in dirhams with only the required fields set.
    pub fn new(
        number: &str,
        amount: f64,
        issue_date: Date,
        due_date: Date,
        client_id: ClientId,
        branch_id: BranchId,
    ) -> Self {
        Self {
            number: number.to_owned(),
            amount,
            currency: Currency::default(),
            issue_date,
            due_date,
            client_id,
            branch_id,
            depositor_name: None,
            invoice_number: None,
            invoice_date: None,
            notes: None,
        }
    }

    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Check the invariants that do not need the database and trim the number.
    ///
    /// # Errors
    /// Returns [Error::EmptyChequeNumber], [Error::InvalidAmount] or
    /// [Error::DueDateBeforeIssueDate].
    pub fn validate(mut self) -> Result<Self, Error> {
        self.number = self.number.trim().to_owned();

        if self.number.is_empty() {
            return Err(Error::EmptyChequeNumber);
        }

        if !self.amount.is_finite() || self.amount < MINIMUM_AMOUNT {
            return Err(Error::InvalidAmount);
        }

        if self.due_date < self.issue_date {
            return Err(Error::DueDateBeforeIssueDate);
        }

        Ok(self)
    }
}

/// Form data for cheque creation and editing.
///
/// `bank_id` only drives the branch selector and is not stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChequeFormData {
    pub number: String,
    pub amount: f64,
    #[serde(default)]
    pub currency: Currency,
    pub issue_date: Date,
    pub due_date: Date,
    pub client_id: ClientId,
    #[serde(default)]
    pub bank_id: Option<String>,
    pub branch_id: BranchId,
    #[serde(default)]
    pub depositor_name: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Blank or YYYY-MM-DD.
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<&ChequeFormData> for ChequeBuilder {
    type Error = Error;

    fn try_from(form: &ChequeFormData) -> Result<Self, Self::Error> {
        Ok(Self {
            number: form.number.clone(),
            amount: form.amount,
            currency: form.currency,
            issue_date: form.issue_date,
            due_date: form.due_date,
            client_id: form.client_id,
            branch_id: form.branch_id,
            depositor_name: optional_text(form.depositor_name.as_deref()),
            invoice_number: optional_text(form.invoice_number.as_deref()),
            invoice_date: parse_optional_date(form.invoice_date.as_deref())?,
            notes: optional_text(form.notes.as_deref()),
        })
    }
}

impl From<&ChequeListing> for ChequeFormData {
    fn from(listing: &ChequeListing) -> Self {
        let cheque = &listing.cheque;

        Self {
            number: cheque.number.clone(),
            amount: cheque.amount,
            currency: cheque.currency,
            issue_date: cheque.issue_date,
            due_date: cheque.due_date,
            client_id: cheque.client_id,
            bank_id: Some(listing.bank_id.to_string()),
            branch_id: cheque.branch_id,
            depositor_name: cheque.depositor_name.clone(),
            invoice_number: cheque.invoice_number.clone(),
            invoice_date: cheque.invoice_date.map(|date| date.to_string()),
            notes: cheque.notes.clone(),
        }
    }
}

/// Parse a `YYYY-MM-DD` date from a form field. Blank text means no date.
///
/// # Errors
/// Returns [Error::InvalidDate] if the text is not a valid date.
pub fn parse_optional_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    let Some(text) = text.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::{ChequeBuilder, Currency, parse_optional_date};

    fn builder() -> ChequeBuilder {
        ChequeBuilder::new(
            " 0012345 ",
            2500.0,
            date!(2025 - 06 - 01),
            date!(2025 - 07 - 01),
            1,
            1,
        )
    }

    #[test]
    fn validate_trims_number() {
        let builder = builder().validate().unwrap();

        assert_eq!(builder.number, "0012345");
    }

    #[test]
    fn validate_rejects_blank_number() {
        let mut builder = builder();
        builder.number = "  ".to_owned();

        assert_eq!(builder.validate(), Err(Error::EmptyChequeNumber));
    }

    #[test]
    fn validate_rejects_amount_below_minimum() {
        for amount in [0.0, 0.001, -10.0, f64::NAN] {
            let mut builder = builder();
            builder.amount = amount;

            assert_eq!(builder.validate(), Err(Error::InvalidAmount), "{amount}");
        }
    }

    #[test]
    fn validate_accepts_minimum_amount() {
        let mut builder = builder();
        builder.amount = 0.01;

        assert!(builder.validate().is_ok());
    }

    #[test]
    fn validate_rejects_due_date_before_issue_date() {
        let mut builder = builder();
        builder.due_date = date!(2025 - 05 - 31);

        assert_eq!(builder.validate(), Err(Error::DueDateBeforeIssueDate));
    }

    #[test]
    fn due_date_may_equal_issue_date() {
        let mut builder = builder();
        builder.due_date = builder.issue_date;

        assert!(builder.validate().is_ok());
    }

    #[test]
    fn parses_currency_codes() {
        assert_eq!("eur".parse::<Currency>(), Ok(Currency::Eur));
        assert_eq!(
            "GBP".parse::<Currency>(),
            Err(Error::InvalidCurrency("GBP".to_owned()))
        );
    }

    #[test]
    fn parses_optional_dates() {
        assert_eq!(parse_optional_date(None), Ok(None));
        assert_eq!(parse_optional_date(Some(" ")), Ok(None));
        assert_eq!(
            parse_optional_date(Some("2025-02-28")),
            Ok(Some(date!(2025 - 02 - 28)))
        );
        assert_eq!(
            parse_optional_date(Some("28/02/2025")),
            Err(Error::InvalidDate("28/02/2025".to_owned()))
        );
    }
}
