//! The URIs of the pages and API endpoints.
//!
//! For endpoints that take a parameter, e.g., '/cheques/{cheque_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/tableau-de-bord";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/connexion";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/erreur";

/// The page listing banks and their branches.
pub const BANKS_VIEW: &str = "/banques";
/// The page for creating a bank.
pub const NEW_BANK_VIEW: &str = "/banques/nouvelle";
/// The page for editing a bank.
pub const EDIT_BANK_VIEW: &str = "/banques/{bank_id}/modifier";
/// The page for creating a branch of a bank.
pub const NEW_BRANCH_VIEW: &str = "/banques/{bank_id}/agences/nouvelle";
/// The page for editing a branch.
pub const EDIT_BRANCH_VIEW: &str = "/agences/{branch_id}/modifier";

/// The page listing clients.
pub const CLIENTS_VIEW: &str = "/clients";
/// The page for creating a client.
pub const NEW_CLIENT_VIEW: &str = "/clients/nouveau";
/// The page for editing a client.
pub const EDIT_CLIENT_VIEW: &str = "/clients/{client_id}/modifier";

/// The page listing cheques.
pub const CHEQUES_VIEW: &str = "/cheques";
/// The page for creating a cheque.
pub const NEW_CHEQUE_VIEW: &str = "/cheques/nouveau";
/// The detail page of a cheque.
pub const CHEQUE_VIEW: &str = "/cheques/{cheque_id}";
/// The page for editing a cheque.
pub const EDIT_CHEQUE_VIEW: &str = "/cheques/{cheque_id}/modifier";
/// The download route for the scan of a cheque.
pub const CHEQUE_SCAN_FILE: &str = "/cheques/{cheque_id}/scan";

/// The page listing the yearly Excel workbooks.
pub const WORKBOOKS_VIEW: &str = "/classeurs";
/// The download route for the workbook of a year.
pub const WORKBOOK_FILE: &str = "/classeurs/{year}";
/// The filtered Excel export of the cheque list.
pub const CHEQUES_EXPORT: &str = "/exports/cheques";

/// The page listing notifications.
pub const NOTIFICATIONS_VIEW: &str = "/notifications";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/connexion";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/deconnexion";

/// The route to create a bank.
pub const POST_BANK: &str = "/api/banques";
/// The route to update or delete a bank.
pub const BANK: &str = "/api/banques/{bank_id}";
/// The route to create a branch.
pub const POST_BRANCH: &str = "/api/agences";
/// The route to update or delete a branch.
pub const BRANCH: &str = "/api/agences/{branch_id}";
/// The htmx route returning the `<option>` list of branches of a bank.
pub const BRANCH_OPTIONS: &str = "/api/agences/options";

/// The route to create a client.
pub const POST_CLIENT: &str = "/api/clients";
/// The route to update or delete a client.
pub const CLIENT: &str = "/api/clients/{client_id}";
/// The htmx route returning the identity inputs for a client kind.
pub const CLIENT_IDENTITY_FIELDS: &str = "/api/clients/champs-identite";

/// The route to create a cheque.
pub const POST_CHEQUE: &str = "/api/cheques";
/// The route to update or delete a cheque.
pub const CHEQUE: &str = "/api/cheques/{cheque_id}";
/// The route to change the status of a cheque.
pub const CHEQUE_STATUS: &str = "/api/cheques/{cheque_id}/statut";
/// The route to upload the scan of a cheque.
pub const CHEQUE_SCAN: &str = "/api/cheques/{cheque_id}/scan";

/// The route to rewrite every yearly workbook from the database.
pub const SYNC_WORKBOOKS: &str = "/api/classeurs/synchroniser";

/// The route to mark a notification as read.
pub const NOTIFICATION_READ: &str = "/api/notifications/{notification_id}/lue";
/// The route to mark all notifications as read.
pub const NOTIFICATIONS_READ: &str = "/api/notifications/lues";
/// The route to run the notification checks now.
pub const RUN_NOTIFICATION_CHECKS: &str = "/api/notifications/verifier";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/cheques/{cheque_id}', '{cheque_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        let endpoints = [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::LOG_IN_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::BANKS_VIEW,
            endpoints::NEW_BANK_VIEW,
            endpoints::EDIT_BANK_VIEW,
            endpoints::NEW_BRANCH_VIEW,
            endpoints::EDIT_BRANCH_VIEW,
            endpoints::CLIENTS_VIEW,
            endpoints::NEW_CLIENT_VIEW,
            endpoints::EDIT_CLIENT_VIEW,
            endpoints::CHEQUES_VIEW,
            endpoints::NEW_CHEQUE_VIEW,
            endpoints::CHEQUE_VIEW,
            endpoints::EDIT_CHEQUE_VIEW,
            endpoints::CHEQUE_SCAN_FILE,
            endpoints::WORKBOOKS_VIEW,
            endpoints::WORKBOOK_FILE,
            endpoints::CHEQUES_EXPORT,
            endpoints::NOTIFICATIONS_VIEW,
            endpoints::LOG_IN_API,
            endpoints::LOG_OUT,
            endpoints::POST_BANK,
            endpoints::BANK,
            endpoints::POST_BRANCH,
            endpoints::BRANCH,
            endpoints::BRANCH_OPTIONS,
            endpoints::POST_CLIENT,
            endpoints::CLIENT,
            endpoints::CLIENT_IDENTITY_FIELDS,
            endpoints::POST_CHEQUE,
            endpoints::CHEQUE,
            endpoints::CHEQUE_STATUS,
            endpoints::CHEQUE_SCAN,
            endpoints::SYNC_WORKBOOKS,
            endpoints::NOTIFICATION_READ,
            endpoints::NOTIFICATIONS_READ,
            endpoints::RUN_NOTIFICATION_CHECKS,
        ];

        for endpoint in endpoints {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint(endpoints::CHEQUE_VIEW, 1);

        assert_eq!(formatted_path, "/cheques/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint(endpoints::CHEQUES_VIEW, 1);

        assert_eq!(formatted_path, "/cheques");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::NEW_BRANCH_VIEW, 7);

        assert_eq!(formatted_path, "/banques/7/agences/nouvelle");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
