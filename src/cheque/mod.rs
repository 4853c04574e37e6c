//! Cheques: the records being tracked, their lifecycle and their scans.

mod create;
mod db;
mod delete;
mod detail;
mod domain;
mod edit;
mod form;
mod list;
mod scan;
mod status;
mod transition;

pub use create::{create_cheque_endpoint, get_new_cheque_page};
pub use db::{
    ChequeFilter, create_cheque, create_cheque_table, delete_cheque, get_cheque,
    get_cheque_listing, get_recent_cheques, query_cheques, set_cheque_scan, update_cheque,
    update_cheque_status,
};
pub use delete::delete_cheque_endpoint;
pub use detail::get_cheque_page;
pub use domain::{
    Cheque, ChequeBuilder, ChequeId, ChequeListing, Currency, parse_optional_date,
};
pub use edit::{get_edit_cheque_page, update_cheque_endpoint};
pub use list::{ChequeQuery, get_cheques_page};
pub use scan::{MAX_SCAN_SIZE, get_cheque_scan, upload_cheque_scan_endpoint};
pub use status::ChequeStatus;
pub use transition::update_cheque_status_endpoint;
