//! Database operations for cheques.

use rusqlite::{Connection, OptionalExtension, Row, types::Type};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    bank::BankId,
    branch::BranchId,
    cheque::{Cheque, ChequeBuilder, ChequeId, ChequeListing, ChequeStatus},
    client::ClientId,
};

const CHEQUE_COLUMNS: &str = "cheque.id, cheque.number, cheque.amount, cheque.currency, \
    cheque.issue_date, cheque.due_date, cheque.status, cheque.client_id, cheque.branch_id, \
    cheque.deposit_branch_id, cheque.depositor_name, cheque.invoice_number, \
    cheque.invoice_date, cheque.notes, cheque.scan_file, cheque.created_at, cheque.updated_at";

const LISTING_FROM: &str = "FROM cheque
    INNER JOIN client ON client.id = cheque.client_id
    INNER JOIN branch ON branch.id = cheque.branch_id
    INNER JOIN bank ON bank.id = branch.bank_id
    LEFT JOIN branch AS deposit_branch ON deposit_branch.id = cheque.deposit_branch_id
    LEFT JOIN bank AS deposit_bank ON deposit_bank.id = deposit_branch.bank_id";

const LISTING_EXTRA_COLUMNS: &str =
    "client.name, bank.id, bank.name, branch.name, deposit_bank.name, deposit_branch.name";

/// Narrows the cheque listing and the Excel export.
///
/// Every field is optional and the set fields are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChequeFilter {
    /// Matched against the cheque number, the client name and the bank name.
    pub search: Option<String>,
    pub status: Option<ChequeStatus>,
    pub bank_id: Option<BankId>,
    pub branch_id: Option<BranchId>,
    pub client_id: Option<ClientId>,
    /// Inclusive lower bound on the due date.
    pub due_from: Option<Date>,
    /// Inclusive upper bound on the due date.
    pub due_to: Option<Date>,
}

impl ChequeFilter {
    /// Whether any field is set.
    pub fn is_active(&self) -> bool {
        self != &ChequeFilter::default()
    }
}

/// Create a cheque in the pending status and return it with its generated ID.
///
/// # Errors
/// Returns a validation error from [ChequeBuilder::validate], [Error::InvalidClient] or
/// [Error::InvalidBranch] if a referenced record is missing, or
/// [Error::DuplicateChequeNumber] if the branch already has a cheque with this number.
pub fn create_cheque(builder: ChequeBuilder, connection: &Connection) -> Result<Cheque, Error> {
    let builder = builder.validate()?;
    ensure_references_exist(builder.client_id, builder.branch_id, connection)?;
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO cheque (number, amount, currency, issue_date, due_date, status,
                client_id, branch_id, depositor_name, invoice_number, invoice_date, notes,
                created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            RETURNING {CHEQUE_COLUMNS}"
        ))?
        .query_row(
            (
                &builder.number,
                builder.amount,
                builder.currency.as_str(),
                builder.issue_date,
                builder.due_date,
                ChequeStatus::Pending.as_str(),
                builder.client_id,
                builder.branch_id,
                &builder.depositor_name,
                &builder.invoice_number,
                builder.invoice_date,
                &builder.notes,
                now,
            ),
            map_cheque_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a single cheque by ID.
pub fn get_cheque(cheque_id: ChequeId, connection: &Connection) -> Result<Cheque, Error> {
    connection
        .prepare(&format!(
            "SELECT {CHEQUE_COLUMNS} FROM cheque WHERE cheque.id = :id"
        ))?
        .query_row(&[(":id", &cheque_id)], map_cheque_row)
        .map_err(|error| error.into())
}

/// Retrieve a single cheque with its client, bank and branch names.
pub fn get_cheque_listing(
    cheque_id: ChequeId,
    connection: &Connection,
) -> Result<ChequeListing, Error> {
    connection
        .prepare(&format!(
            "SELECT {CHEQUE_COLUMNS}, {LISTING_EXTRA_COLUMNS} {LISTING_FROM}
            WHERE cheque.id = :id"
        ))?
        .query_row(&[(":id", &cheque_id)], map_listing_row)
        .map_err(|error| error.into())
}

/// Retrieve the cheques matching `filter`, latest due date first.
pub fn query_cheques(
    filter: &ChequeFilter,
    connection: &Connection,
) -> Result<Vec<ChequeListing>, Error> {
    let pattern = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(|search| format!("%{search}%"));

    connection
        .prepare(&format!(
            "SELECT {CHEQUE_COLUMNS}, {LISTING_EXTRA_COLUMNS} {LISTING_FROM}
            WHERE (?1 IS NULL
                OR cheque.number LIKE ?1
                OR client.name LIKE ?1
                OR bank.name LIKE ?1)
            AND (?2 IS NULL OR cheque.status = ?2)
            AND (?3 IS NULL OR bank.id = ?3)
            AND (?4 IS NULL OR cheque.branch_id = ?4)
            AND (?5 IS NULL OR cheque.client_id = ?5)
            AND (?6 IS NULL OR cheque.due_date >= ?6)
            AND (?7 IS NULL OR cheque.due_date <= ?7)
            ORDER BY cheque.due_date DESC, cheque.id DESC"
        ))?
        .query_map(
            (
                pattern,
                filter.status.map(|status| status.as_str()),
                filter.bank_id,
                filter.branch_id,
                filter.client_id,
                filter.due_from,
                filter.due_to,
            ),
            map_listing_row,
        )?
        .map(|maybe_cheque| maybe_cheque.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the `limit` most recently recorded cheques.
pub fn get_recent_cheques(
    limit: u32,
    connection: &Connection,
) -> Result<Vec<ChequeListing>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CHEQUE_COLUMNS}, {LISTING_EXTRA_COLUMNS} {LISTING_FROM}
            ORDER BY cheque.created_at DESC, cheque.id DESC
            LIMIT ?1"
        ))?
        .query_map([limit], map_listing_row)?
        .map(|maybe_cheque| maybe_cheque.map_err(|error| error.into()))
        .collect()
}

/// Update the editable fields of a cheque. The status is left unchanged.
///
/// # Errors
/// Returns the same validation errors as [create_cheque], or [Error::UpdateMissingCheque] if
/// the cheque does not exist.
pub fn update_cheque(
    cheque_id: ChequeId,
    builder: ChequeBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let builder = builder.validate()?;
    ensure_references_exist(builder.client_id, builder.branch_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE cheque
        SET number = ?1, amount = ?2, currency = ?3, issue_date = ?4, due_date = ?5,
            client_id = ?6, branch_id = ?7, depositor_name = ?8, invoice_number = ?9,
            invoice_date = ?10, notes = ?11, updated_at = ?12
        WHERE id = ?13",
        (
            &builder.number,
            builder.amount,
            builder.currency.as_str(),
            builder.issue_date,
            builder.due_date,
            builder.client_id,
            builder.branch_id,
            &builder.depositor_name,
            &builder.invoice_number,
            builder.invoice_date,
            &builder.notes,
            OffsetDateTime::now_utc(),
            cheque_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCheque);
    }

    Ok(())
}

/// Move a cheque from `current` to `next`.
///
/// The row is only updated while its stored status is still `current`, so two concurrent
/// transitions cannot both succeed. `deposit_branch_id` is recorded when moving to
/// [ChequeStatus::Deposited] and ignored otherwise.
///
/// # Errors
/// - [Error::InvalidStatusTransition] if `next` is not a successor of `current`,
/// - [Error::InvalidBranch] if the deposit branch does not exist,
/// - [Error::UpdateMissingCheque] if the cheque does not exist,
/// - [Error::StatusChanged] if the stored status is no longer `current`.
pub fn update_cheque_status(
    cheque_id: ChequeId,
    current: ChequeStatus,
    next: ChequeStatus,
    deposit_branch_id: Option<BranchId>,
    connection: &Connection,
) -> Result<(), Error> {
    let next = current.transition(next)?;
    let deposit_branch_id = deposit_branch_id.filter(|_| next == ChequeStatus::Deposited);

    if let Some(branch_id) = deposit_branch_id
        && !row_exists("branch", branch_id, connection)?
    {
        return Err(Error::InvalidBranch);
    }

    let rows_affected = connection.execute(
        "UPDATE cheque
        SET status = ?1,
            deposit_branch_id = COALESCE(?2, deposit_branch_id),
            updated_at = ?3
        WHERE id = ?4 AND status = ?5",
        (
            next.as_str(),
            deposit_branch_id,
            OffsetDateTime::now_utc(),
            cheque_id,
            current.as_str(),
        ),
    )?;

    if rows_affected == 0 {
        return if row_exists("cheque", cheque_id, connection)? {
            Err(Error::StatusChanged)
        } else {
            Err(Error::UpdateMissingCheque)
        };
    }

    Ok(())
}

/// Record the file name of the uploaded scan, replacing any earlier one.
pub fn set_cheque_scan(
    cheque_id: ChequeId,
    scan_file: Option<&str>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE cheque SET scan_file = ?1, updated_at = ?2 WHERE id = ?3",
        (scan_file, OffsetDateTime::now_utc(), cheque_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCheque);
    }

    Ok(())
}

/// Delete a cheque by ID.
pub fn delete_cheque(cheque_id: ChequeId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM cheque WHERE id = ?1", [cheque_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCheque);
    }

    Ok(())
}

/// Initialize the cheque table and indexes.
pub fn create_cheque_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS cheque (
            id INTEGER PRIMARY KEY,
            number TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            currency TEXT NOT NULL DEFAULT 'MAD',
            issue_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'en_attente'
                CHECK (status IN ('en_attente', 'depose', 'encaisse', 'rejete', 'annule')),
            client_id INTEGER NOT NULL,
            branch_id INTEGER NOT NULL,
            deposit_branch_id INTEGER,
            depositor_name TEXT,
            invoice_number TEXT,
            invoice_date TEXT,
            notes TEXT,
            scan_file TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(client_id) REFERENCES client(id),
            FOREIGN KEY(branch_id) REFERENCES branch(id),
            FOREIGN KEY(deposit_branch_id) REFERENCES branch(id)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_cheque_branch_number ON cheque(branch_id, number);
        CREATE INDEX IF NOT EXISTS idx_cheque_due_date ON cheque(due_date);
        CREATE INDEX IF NOT EXISTS idx_cheque_status ON cheque(status);
        CREATE INDEX IF NOT EXISTS idx_cheque_client_id ON cheque(client_id);",
    )?;

    Ok(())
}

fn ensure_references_exist(
    client_id: ClientId,
    branch_id: BranchId,
    connection: &Connection,
) -> Result<(), Error> {
    if !row_exists("client", client_id, connection)? {
        return Err(Error::InvalidClient);
    }

    if !row_exists("branch", branch_id, connection)? {
        return Err(Error::InvalidBranch);
    }

    Ok(())
}

fn row_exists(table: &str, id: i64, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1"),
            [id],
            |_| Ok(()),
        )
        .optional()
        .map(|row| row.is_some())
        .map_err(|error| error.into())
}

fn map_cheque_row(row: &Row) -> Result<Cheque, rusqlite::Error> {
    let raw_currency: String = row.get(3)?;
    let currency = raw_currency
        .parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;
    let raw_status: String = row.get(6)?;
    let status = raw_status
        .parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(error)))?;

    Ok(Cheque {
        id: row.get(0)?,
        number: row.get(1)?,
        amount: row.get(2)?,
        currency,
        issue_date: row.get(4)?,
        due_date: row.get(5)?,
        status,
        client_id: row.get(7)?,
        branch_id: row.get(8)?,
        deposit_branch_id: row.get(9)?,
        depositor_name: row.get(10)?,
        invoice_number: row.get(11)?,
        invoice_date: row.get(12)?,
        notes: row.get(13)?,
        scan_file: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

fn map_listing_row(row: &Row) -> Result<ChequeListing, rusqlite::Error> {
    Ok(ChequeListing {
        cheque: map_cheque_row(row)?,
        client_name: row.get(17)?,
        bank_id: row.get(18)?,
        bank_name: row.get(19)?,
        branch_name: row.get(20)?,
        deposit_bank_name: row.get(21)?,
        deposit_branch_name: row.get(22)?,
    })
}
