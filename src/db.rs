//! Creates the database schema.

use rusqlite::Connection;

use crate::{
    Error,
    auth::create_user_table,
    bank::create_bank_table,
    branch::create_branch_table,
    cheque::create_cheque_table,
    client::create_client_table,
    notification::create_notification_table,
    workbook::create_workbook_entry_table,
};

/// Create the all of the database tables for the application.
///
/// Foreign keys are switched on for `connection`, so deleting a bank also deletes its branches.
///
/// # Errors
/// This function may return an [Error::SqlError] if any of the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_bank_table(&transaction)?;
    create_branch_table(&transaction)?;
    create_client_table(&transaction)?;
    create_cheque_table(&transaction)?;
    create_notification_table(&transaction)?;
    create_workbook_entry_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
