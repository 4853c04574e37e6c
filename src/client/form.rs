//! The client form shared by the create and edit pages.

use axum::{
    extract::Query,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    client::{ClientKind, domain::ClientFormData},
    endpoints,
    form::optional_text_input,
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

pub(super) fn client_form_view(
    target: FormTarget<'_>,
    values: &ClientFormData,
    error_message: &str,
) -> Markup {
    let (hx_post, hx_put, submit_label) = match target {
        FormTarget::Create => (Some(endpoints::POST_CLIENT), None, "Créer le client"),
        FormTarget::Update { endpoint } => (None, Some(endpoint), "Enregistrer"),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Type de client" }

                select
                    id="kind"
                    name="kind"
                    required
                    hx-get=(endpoints::CLIENT_IDENTITY_FIELDS)
                    hx-trigger="change"
                    hx-target="#identity-fields"
                    hx-swap="outerHTML"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for kind in ClientKind::ALL {
                        @if kind == values.kind {
                            option value=(kind.as_str()) selected { (kind.label()) }
                        } @else {
                            option value=(kind.as_str()) { (kind.label()) }
                        }
                    }
                }
            }

            (text_input("name", "Nom", "text", &values.name, true))

            @if !error_message.is_empty() {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            (identity_fields(
                values.kind,
                values.id_number.as_deref(),
                values.tax_number.as_deref(),
            ))

            (optional_text_input("phone", "Téléphone", "tel", values.phone.as_deref()))
            (optional_text_input("email", "E-mail", "email", values.email.as_deref()))
            (optional_text_input("address", "Adresse", "text", values.address.as_deref()))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
        }
    }
}

/// The identity and tax number inputs, labelled for `kind`.
fn identity_fields(kind: ClientKind, id_number: Option<&str>, tax_number: Option<&str>) -> Markup {
    html! {
        div id="identity-fields" class="space-y-4 md:space-y-6"
        {
            (optional_text_input("id_number", kind.id_number_label(), "text", id_number))
            (optional_text_input("tax_number", kind.tax_number_label(), "text", tax_number))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IdentityFieldsQuery {
    pub kind: ClientKind,
}

/// Swap in the identity inputs for the client kind selected in the form.
pub async fn get_identity_fields(Query(query): Query<IdentityFieldsQuery>) -> Response {
    identity_fields(query.kind, None, None).into_response()
}
