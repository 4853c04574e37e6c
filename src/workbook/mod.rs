//! Yearly Excel workbooks mirroring the cheque table, and the Excel export.

mod export;
mod feedback;
mod layout;
mod page;
mod store;
mod sync;

pub use export::export_cheques_endpoint;
pub use feedback::{redirect_after_sync, sync_failure_banner};
pub use page::{download_workbook_endpoint, get_workbooks_page, sync_workbooks_endpoint};
pub use store::WorkbookStore;
pub use sync::{
    create_workbook_entry_table, remove_cheque_from_workbooks, sync_all_workbooks, sync_cheque,
};
