//! Core bank domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A validated, non-empty bank name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct BankName(String);

impl BankName {
    /// Create a bank name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyBankName] if `name` is blank.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyBankName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a bank name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for BankName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for BankName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BankName::new(s)
    }
}

impl Display for BankName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a bank.
pub type BankId = i64;

/// A bank, e.g. "Attijariwafa Bank" with the short code "AWB".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Bank {
    pub id: BankId,
    pub name: BankName,
    pub code: Option<String>,
}

/// Form data for bank creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct BankFormData {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Upper-case a bank code, or `None` if it is blank.
pub fn normalize_bank_code(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_uppercase)
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        bank::{BankName, domain::normalize_bank_code},
    };

    #[test]
    fn new_fails_on_blank_name() {
        assert_eq!(BankName::new(""), Err(Error::EmptyBankName));
        assert_eq!(BankName::new(" \n\t"), Err(Error::EmptyBankName));
    }

    #[test]
    fn new_trims_name() {
        assert_eq!(
            BankName::new("  Banque Populaire "),
            Ok(BankName::new_unchecked("Banque Populaire"))
        );
    }

    #[test]
    fn bank_code_is_upper_cased() {
        assert_eq!(normalize_bank_code(Some(" bmce ")), Some("BMCE".to_owned()));
        assert_eq!(normalize_bank_code(Some("  ")), None);
        assert_eq!(normalize_bank_code(None), None);
    }
}
