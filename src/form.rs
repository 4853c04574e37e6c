//! Helpers shared by the form handlers.

use maud::{Markup, html};

use crate::html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE};

/// Trim an optional form value, treating blank text as missing.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// A labelled text input that may be left empty.
pub fn optional_text_input(name: &str, label: &str, input_type: &str, value: Option<&str>) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                id=(name)
                type=(input_type)
                name=(name)
                value=[value]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// One `<option>` of a `<select>`.
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// A labelled `<select>` with a leading empty option named `placeholder`.
pub fn select_input(
    name: &str,
    label: &str,
    placeholder: &str,
    options: &[SelectOption],
    selected: Option<&str>,
    required: bool,
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            select id=(name) name=(name) required[required] class=(FORM_TEXT_INPUT_STYLE)
            {
                (select_options(placeholder, options, selected))
            }
        }
    }
}

/// The `<option>` elements of a select, without the enclosing element.
pub fn select_options(placeholder: &str, options: &[SelectOption], selected: Option<&str>) -> Markup {
    html! {
        option value="" { (placeholder) }

        @for option in options {
            @if Some(option.value.as_str()) == selected {
                option value=(option.value) selected { (option.label) }
            } @else {
                option value=(option.value) { (option.label) }
            }
        }
    }
}
