//! The branch form shared by the create and edit pages.

use maud::{Markup, html};

use crate::{
    bank::Bank,
    branch::domain::BranchFormData,
    endpoints,
    form::{SelectOption, optional_text_input, select_input},
    html::{BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, text_input},
};

/// How the form is submitted.
pub(super) enum FormTarget<'a> {
    Create,
    Update { endpoint: &'a str },
}

pub(super) fn branch_form_view(
    target: FormTarget<'_>,
    banks: &[Bank],
    values: &BranchFormData,
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put, submit_label) = match target {
        FormTarget::Create => (Some(endpoints::POST_BRANCH), None, "Créer l'agence"),
        FormTarget::Update { endpoint } => (None, Some(endpoint), "Enregistrer"),
    };
    let bank_options = banks
        .iter()
        .map(|bank| SelectOption {
            value: bank.id.to_string(),
            label: bank.name.to_string(),
        })
        .collect::<Vec<_>>();
    let selected_bank = values.bank_id.to_string();

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (select_input(
                "bank_id",
                "Banque",
                "Choisir une banque",
                &bank_options,
                Some(&selected_bank),
                true,
            ))

            (text_input("name", "Nom de l'agence", "text", &values.name, true))

            @if !error_message.is_empty() {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            (optional_text_input("address", "Adresse", "text", values.address.as_deref()))
            (optional_text_input("postal_code", "Code postal", "text", values.postal_code.as_deref()))
            (optional_text_input("phone", "Téléphone", "tel", values.phone.as_deref()))
            (optional_text_input("email", "E-mail", "email", values.email.as_deref()))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}
