//! Core branch domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, bank::BankId, form::optional_text};

/// A validated, non-empty branch name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct BranchName(String);

impl BranchName {
    /// Create a branch name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyBranchName] if `name` is blank.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyBranchName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a branch name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for BranchName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BranchName::new(s)
    }
}

impl Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a branch.
pub type BranchId = i64;

/// A physical location of a bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub bank_id: BankId,
    pub name: BranchName,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// A branch labelled with its bank, for `<select>` inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchChoice {
    pub id: BranchId,
    pub bank_id: BankId,
    /// "Bank - Branch"
    pub label: String,
}

/// The fields needed to create or update a branch.
///
/// The name is validated when the branch is written to the database.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchBuilder {
    pub bank_id: BankId,
    pub name: String,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl BranchBuilder {
    /// A branch with only the required fields set.
    pub fn new(bank_id: BankId, name: &str) -> Self {
        Self {
            bank_id,
            name: name.to_owned(),
            address: None,
            postal_code: None,
            phone: None,
            email: None,
        }
    }

    /// Set the street address.
    pub fn address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }

    /// Set the phone number.
    pub fn phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }
}

/// Form data for branch creation and editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchFormData {
    pub bank_id: BankId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<&BranchFormData> for BranchBuilder {
    fn from(form: &BranchFormData) -> Self {
        Self {
            bank_id: form.bank_id,
            name: form.name.clone(),
            address: optional_text(form.address.as_deref()),
            postal_code: optional_text(form.postal_code.as_deref()),
            phone: optional_text(form.phone.as_deref()),
            email: optional_text(form.email.as_deref()),
        }
    }
}
