//! Tells the user when a cheque change was saved but its workbook could not be updated.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{Error, endpoints, html::LINK_STYLE};

/// The query parameter added to a redirect when the workbook sync failed.
const SYNC_FAILED_PARAM: &str = "sync=echec";

/// Redirect to `endpoint` after a cheque change.
///
/// The database change has already been committed, so a failed sync only adds a flag to the
/// redirect that makes the next page show [sync_failure_banner].
pub fn redirect_after_sync(endpoint: &str, sync_result: Result<(), Error>) -> Response {
    let location = match sync_result {
        Ok(()) => endpoint.to_owned(),
        Err(error) => {
            tracing::warn!("the cheque was saved but its workbook was not updated: {error}");
            let separator = if endpoint.contains('?') { '&' } else { '?' };
            format!("{endpoint}{separator}{SYNC_FAILED_PARAM}")
        }
    };

    (HxRedirect(location), StatusCode::SEE_OTHER).into_response()
}

/// A warning shown at the top of a page reached through a failed-sync redirect.
pub fn sync_failure_banner() -> Markup {
    html! {
        div
            role="alert"
            data-sync-warning="true"
            class="p-4 text-sm text-yellow-800 rounded bg-yellow-50 dark:bg-gray-800 dark:text-yellow-300"
        {
            p class="font-medium" { "Le chèque a été enregistré mais le classeur Excel n'a pas pu être mis à jour." }
            p
            {
                "Fermez le fichier s'il est ouvert dans Excel, puis lancez une "
                a href=(endpoints::WORKBOOKS_VIEW) class=(LINK_STYLE) { "resynchronisation complète" }
                "."
            }
        }
    }
}
