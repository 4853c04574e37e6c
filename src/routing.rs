//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in, require_admin,
        require_editor,
    },
    bank::{
        create_bank_endpoint, delete_bank_endpoint, get_banks_page, get_edit_bank_page,
        get_new_bank_page, update_bank_endpoint,
    },
    branch::{
        create_branch_endpoint, delete_branch_endpoint, get_branch_options, get_edit_branch_page,
        get_new_branch_page, update_branch_endpoint,
    },
    cheque::{
        MAX_SCAN_SIZE, create_cheque_endpoint, delete_cheque_endpoint, get_cheque_page,
        get_cheque_scan, get_cheques_page, get_edit_cheque_page, get_new_cheque_page,
        update_cheque_endpoint, update_cheque_status_endpoint, upload_cheque_scan_endpoint,
    },
    client::{
        create_client_endpoint, delete_client_endpoint, get_clients_page, get_edit_client_page,
        get_identity_fields, get_new_client_page, update_client_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    notification::{
        get_notifications_page, mark_all_notifications_read_endpoint,
        mark_notification_read_endpoint, run_notification_checks_endpoint,
    },
    workbook::{
        download_workbook_endpoint, export_cheques_endpoint, get_workbooks_page,
        sync_workbooks_endpoint,
    },
};

/// Extra room for the multipart boundaries and other fields around a scan.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Return a router with all the app's routes.
///
/// Every logged in user can read. Creating and editing needs an editor role, deleting and
/// running the notification checks by hand needs an administrator.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let read_pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::BANKS_VIEW, get(get_banks_page))
        .route(endpoints::CLIENTS_VIEW, get(get_clients_page))
        .route(endpoints::CHEQUES_VIEW, get(get_cheques_page))
        .route(endpoints::CHEQUE_VIEW, get(get_cheque_page))
        .route(endpoints::CHEQUE_SCAN_FILE, get(get_cheque_scan))
        .route(endpoints::WORKBOOKS_VIEW, get(get_workbooks_page))
        .route(endpoints::WORKBOOK_FILE, get(download_workbook_endpoint))
        .route(endpoints::CHEQUES_EXPORT, get(export_cheques_endpoint))
        .route(endpoints::NOTIFICATIONS_VIEW, get(get_notifications_page));

    let editor_pages = Router::new()
        .route(endpoints::NEW_BANK_VIEW, get(get_new_bank_page))
        .route(endpoints::EDIT_BANK_VIEW, get(get_edit_bank_page))
        .route(endpoints::NEW_BRANCH_VIEW, get(get_new_branch_page))
        .route(endpoints::EDIT_BRANCH_VIEW, get(get_edit_branch_page))
        .route(endpoints::NEW_CLIENT_VIEW, get(get_new_client_page))
        .route(endpoints::EDIT_CLIENT_VIEW, get(get_edit_client_page))
        .route(endpoints::NEW_CHEQUE_VIEW, get(get_new_cheque_page))
        .route(endpoints::EDIT_CHEQUE_VIEW, get(get_edit_cheque_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_editor));

    // The role layers need the user ID, so the auth guard is added last to run first.
    let protected_pages = read_pages
        .merge(editor_pages)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let read_api = Router::new()
        .route(endpoints::BRANCH_OPTIONS, get(get_branch_options))
        .route(endpoints::CLIENT_IDENTITY_FIELDS, get(get_identity_fields))
        .route(
            endpoints::NOTIFICATION_READ,
            put(mark_notification_read_endpoint),
        )
        .route(
            endpoints::NOTIFICATIONS_READ,
            put(mark_all_notifications_read_endpoint),
        );

    let editor_api = Router::new()
        .route(endpoints::POST_BANK, post(create_bank_endpoint))
        .route(endpoints::BANK, put(update_bank_endpoint))
        .route(endpoints::POST_BRANCH, post(create_branch_endpoint))
        .route(endpoints::BRANCH, put(update_branch_endpoint))
        .route(endpoints::POST_CLIENT, post(create_client_endpoint))
        .route(endpoints::CLIENT, put(update_client_endpoint))
        .route(endpoints::POST_CHEQUE, post(create_cheque_endpoint))
        .route(endpoints::CHEQUE, put(update_cheque_endpoint))
        .route(
            endpoints::CHEQUE_STATUS,
            put(update_cheque_status_endpoint),
        )
        .route(
            endpoints::CHEQUE_SCAN,
            post(upload_cheque_scan_endpoint)
                .layer(DefaultBodyLimit::max(MAX_SCAN_SIZE + MULTIPART_OVERHEAD)),
        )
        .route(endpoints::SYNC_WORKBOOKS, post(sync_workbooks_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_editor));

    let admin_api = Router::new()
        .route(endpoints::BANK, delete(delete_bank_endpoint))
        .route(endpoints::BRANCH, delete(delete_branch_endpoint))
        .route(endpoints::CLIENT, delete(delete_client_endpoint))
        .route(endpoints::CHEQUE, delete(delete_cheque_endpoint))
        .route(
            endpoints::RUN_NOTIFICATION_CHECKS,
            post(run_notification_checks_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // These routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_api = read_api
        .merge(editor_api)
        .merge(admin_api)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

    protected_pages
        .merge(protected_api)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
