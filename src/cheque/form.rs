//! The cheque form shared by the create and edit pages.

use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    Error,
    bank::{Bank, get_all_banks},
    branch::{BranchChoice, get_branch_choices},
    cheque::{Currency, domain::ChequeFormData},
    client::{Client, get_all_clients},
    endpoints,
    form::{SelectOption, optional_text_input, select_input, select_options},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        text_input,
    },
};

/// How the form is submitted.
pub(super) enum FormTarget<'a> {
    Create,
    Update { endpoint: &'a str },
}

/// The records the form's selects offer.
pub(super) struct FormChoices {
    pub clients: Vec<Client>,
    pub banks: Vec<Bank>,
    pub branches: Vec<BranchChoice>,
}

impl FormChoices {
    pub(super) fn load(connection: &Connection) -> Result<Self, Error> {
        Ok(Self {
            clients: get_all_clients(connection)?,
            banks: get_all_banks(connection)?,
            branches: get_branch_choices(connection)?,
        })
    }
}

/// Whether `error` is shown next to a form field rather than as an alert.
pub(super) fn is_field_error(error: &Error) -> bool {
    matches!(
        error,
        Error::EmptyChequeNumber
            | Error::DuplicateChequeNumber
            | Error::InvalidAmount
            | Error::DueDateBeforeIssueDate
            | Error::InvalidDate(_)
    )
}

fn error_field(error: &Error) -> Option<&'static str> {
    match error {
        Error::EmptyChequeNumber | Error::DuplicateChequeNumber => Some("number"),
        Error::InvalidAmount => Some("amount"),
        Error::DueDateBeforeIssueDate => Some("due_date"),
        Error::InvalidDate(_) => Some("invoice_date"),
        _ => None,
    }
}

pub(super) fn cheque_form_view(
    target: FormTarget<'_>,
    choices: &FormChoices,
    values: &ChequeFormData,
    error: Option<&Error>,
) -> Markup {
    let (hx_post, hx_put, submit_label) = match target {
        FormTarget::Create => (Some(endpoints::POST_CHEQUE), None, "Enregistrer le chèque"),
        FormTarget::Update { endpoint } => (None, Some(endpoint), "Enregistrer"),
    };
    let error_field = error.and_then(error_field);
    let field_error = |field: &str| -> Markup {
        html! {
            @if let Some(error) = error.filter(|_| error_field == Some(field)) {
                p class=(FORM_ERROR_STYLE) { (error.to_string()) }
            }
        }
    };

    let client_options = choices
        .clients
        .iter()
        .map(|client| SelectOption {
            value: client.id.to_string(),
            label: client.name.to_string(),
        })
        .collect::<Vec<_>>();
    let bank_options = choices
        .banks
        .iter()
        .map(|bank| SelectOption {
            value: bank.id.to_string(),
            label: bank.name.to_string(),
        })
        .collect::<Vec<_>>();
    let selected_bank = values
        .bank_id
        .as_deref()
        .and_then(|bank_id| bank_id.trim().parse::<i64>().ok());
    let branch_options = choices
        .branches
        .iter()
        .filter(|branch| selected_bank.is_none_or(|bank_id| branch.bank_id == bank_id))
        .map(|branch| SelectOption {
            value: branch.id.to_string(),
            label: branch.label.clone(),
        })
        .collect::<Vec<_>>();
    let currency_options = Currency::ALL
        .iter()
        .map(|currency| SelectOption {
            value: currency.as_str().to_owned(),
            label: currency.as_str().to_owned(),
        })
        .collect::<Vec<_>>();

    let selected_client = (values.client_id > 0).then(|| values.client_id.to_string());
    let selected_bank = selected_bank.map(|bank_id| bank_id.to_string());
    let selected_branch = (values.branch_id > 0).then(|| values.branch_id.to_string());
    let amount = (values.amount > 0.0).then(|| format!("{:.2}", values.amount));

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            class="w-full max-w-2xl grid grid-cols-1 gap-4 md:grid-cols-2"
        {
            div
            {
                (text_input("number", "Numéro du chèque", "text", &values.number, true))
                (field_error("number"))
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Montant" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    value=[amount]
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error("amount"))
            }

            (select_input(
                "currency",
                "Devise",
                "Choisir une devise",
                &currency_options,
                Some(values.currency.as_str()),
                true,
            ))

            (select_input(
                "client_id",
                "Client",
                "Choisir un client",
                &client_options,
                selected_client.as_deref(),
                true,
            ))

            (text_input("issue_date", "Date d'émission", "date", &values.issue_date.to_string(), true))

            div
            {
                (text_input("due_date", "Date d'échéance", "date", &values.due_date.to_string(), true))
                (field_error("due_date"))
            }

            div
            {
                label for="bank_id" class=(FORM_LABEL_STYLE) { "Banque" }

                select
                    id="bank_id"
                    name="bank_id"
                    hx-get=(endpoints::BRANCH_OPTIONS)
                    hx-trigger="change"
                    hx-target="#branch_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (select_options("Toutes les banques", &bank_options, selected_bank.as_deref()))
                }
            }

            (select_input(
                "branch_id",
                "Agence",
                "Choisir une agence",
                &branch_options,
                selected_branch.as_deref(),
                true,
            ))

            (optional_text_input("depositor_name", "Nom du déposant", "text", values.depositor_name.as_deref()))
            (optional_text_input("invoice_number", "N° Facture", "text", values.invoice_number.as_deref()))

            div
            {
                (optional_text_input("invoice_date", "Date de facture", "date", values.invoice_date.as_deref()))
                (field_error("invoice_date"))
            }

            div class="md:col-span-2"
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }
                textarea id="notes" name="notes" rows="3" class=(FORM_TEXT_INPUT_STYLE)
                {
                    (values.notes.as_deref().unwrap_or_default())
                }
            }

            div class="md:col-span-2"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
            }
        }
    }
}
