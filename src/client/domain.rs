//! Core client domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, form::optional_text};

/// A validated, non-empty client name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ClientName(String);

impl ClientName {
    /// Create a client name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyClientName] if `name` is blank.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyClientName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a client name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for ClientName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ClientName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a client is a natural person or a company.
///
/// The kind decides which identity documents are asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClientKind {
    #[default]
    #[serde(rename = "personne")]
    Person,
    #[serde(rename = "entreprise")]
    Company,
}

impl ClientKind {
    pub const ALL: [ClientKind; 2] = [ClientKind::Person, ClientKind::Company];

    /// The identifier stored in the database and sent by forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::Person => "personne",
            ClientKind::Company => "entreprise",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClientKind::Person => "Personne physique",
            ClientKind::Company => "Entreprise",
        }
    }

    /// CIN for a person, RC for a company.
    pub fn id_number_label(&self) -> &'static str {
        match self {
            ClientKind::Person => "CIN",
            ClientKind::Company => "RC",
        }
    }

    /// IF for a person, ICE for a company.
    pub fn tax_number_label(&self) -> &'static str {
        match self {
            ClientKind::Person => "IF",
            ClientKind::Company => "ICE",
        }
    }
}

impl FromStr for ClientKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClientKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidClientKind(s.to_owned()))
    }
}

impl Display for ClientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Database identifier for a client.
pub type ClientId = i64;

/// A person or company that hands over cheques.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub kind: ClientKind,
    pub name: ClientName,
    /// CIN or RC, depending on [Client::kind].
    pub id_number: Option<String>,
    /// IF or ICE, depending on [Client::kind].
    pub tax_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// The fields needed to create or update a client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientBuilder {
    pub kind: ClientKind,
    pub name: String,
    pub id_number: Option<String>,
    pub tax_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl ClientBuilder {
    pub fn new(kind: ClientKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_owned(),
            id_number: None,
            tax_number: None,
            phone: None,
            email: None,
            address: None,
        }
    }

    pub fn id_number(mut self, id_number: Option<String>) -> Self {
        self.id_number = id_number;
        self
    }

    pub fn tax_number(mut self, tax_number: Option<String>) -> Self {
        self.tax_number = tax_number;
        self
    }

    pub fn email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }
}

/// Form data for client creation and editing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientFormData {
    pub kind: ClientKind,
    pub name: String,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl From<&ClientFormData> for ClientBuilder {
    fn from(form: &ClientFormData) -> Self {
        Self {
            kind: form.kind,
            name: form.name.clone(),
            id_number: optional_text(form.id_number.as_deref()),
            tax_number: optional_text(form.tax_number.as_deref()),
            phone: optional_text(form.phone.as_deref()),
            email: optional_text(form.email.as_deref()),
            address: optional_text(form.address.as_deref()),
        }
    }
}

impl From<Client> for ClientFormData {
    fn from(client: Client) -> Self {
        Self {
            kind: client.kind,
            name: client.name.to_string(),
            id_number: client.id_number,
            tax_number: client.tax_number,
            phone: client.phone,
            email: client.email,
            address: client.address,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{ClientKind, ClientName};

    #[test]
    fn kind_round_trips_through_str() {
        for kind in ClientKind::ALL {
            assert_eq!(kind.as_str().parse::<ClientKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(
            "association".parse::<ClientKind>(),
            Err(Error::InvalidClientKind("association".to_owned()))
        );
    }

    #[test]
    fn company_uses_trade_register_labels() {
        assert_eq!(ClientKind::Company.id_number_label(), "RC");
        assert_eq!(ClientKind::Company.tax_number_label(), "ICE");
        assert_eq!(ClientKind::Person.id_number_label(), "CIN");
        assert_eq!(ClientKind::Person.tax_number_label(), "IF");
    }

    #[test]
    fn name_is_trimmed() {
        assert_eq!(ClientName::new("  Karim  ").unwrap().as_ref(), "Karim");
        assert_eq!(ClientName::new(" "), Err(Error::EmptyClientName));
    }
}
