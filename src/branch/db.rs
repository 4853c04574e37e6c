//! Database operations for branches.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    bank::BankId,
    branch::{Branch, BranchBuilder, BranchChoice, BranchId, BranchName},
};

fn map_foreign_key_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidBank,
        error => error.into(),
    }
}

/// Create a branch and return it with its generated ID.
///
/// # Errors
/// Returns [Error::EmptyBranchName] if the name is blank or [Error::InvalidBank] if the bank
/// does not exist.
pub fn create_branch(builder: BranchBuilder, connection: &Connection) -> Result<Branch, Error> {
    let name = BranchName::new(&builder.name)?;

    connection
        .prepare(
            "INSERT INTO branch (bank_id, name, address, postal_code, phone, email)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, bank_id, name, address, postal_code, phone, email",
        )?
        .query_row(
            (
                builder.bank_id,
                name.as_ref(),
                builder.address,
                builder.postal_code,
                builder.phone,
                builder.email,
            ),
            map_row,
        )
        .map_err(map_foreign_key_error)
}

/// Retrieve a single branch by ID.
pub fn get_branch(branch_id: BranchId, connection: &Connection) -> Result<Branch, Error> {
    connection
        .prepare(
            "SELECT id, bank_id, name, address, postal_code, phone, email
            FROM branch WHERE id = :id;",
        )?
        .query_row(&[(":id", &branch_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all branches ordered alphabetically by name.
pub fn get_all_branches(connection: &Connection) -> Result<Vec<Branch>, Error> {
    connection
        .prepare(
            "SELECT id, bank_id, name, address, postal_code, phone, email
            FROM branch ORDER BY name COLLATE NOCASE ASC;",
        )?
        .query_map([], map_row)?
        .map(|maybe_branch| maybe_branch.map_err(|error| error.into()))
        .collect()
}

/// Every branch labelled "Bank - Branch", ordered by bank then branch name.
pub fn get_branch_choices(connection: &Connection) -> Result<Vec<BranchChoice>, Error> {
    connection
        .prepare(
            "SELECT branch.id, branch.bank_id, bank.name || ' - ' || branch.name
            FROM branch INNER JOIN bank ON bank.id = branch.bank_id
            ORDER BY bank.name COLLATE NOCASE ASC, branch.name COLLATE NOCASE ASC;",
        )?
        .query_map([], |row| {
            Ok(BranchChoice {
                id: row.get(0)?,
                bank_id: row.get(1)?,
                label: row.get(2)?,
            })
        })?
        .map(|maybe_choice| maybe_choice.map_err(|error| error.into()))
        .collect()
}

/// Update a branch. Returns an error if the branch doesn't exist.
pub fn update_branch(
    branch_id: BranchId,
    builder: BranchBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let name = BranchName::new(&builder.name)?;

    let rows_affected = connection
        .execute(
            "UPDATE branch
            SET bank_id = ?1, name = ?2, address = ?3, postal_code = ?4, phone = ?5, email = ?6
            WHERE id = ?7",
            (
                builder.bank_id,
                name.as_ref(),
                builder.address,
                builder.postal_code,
                builder.phone,
                builder.email,
                branch_id,
            ),
        )
        .map_err(map_foreign_key_error)?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBranch);
    }

    Ok(())
}

/// Delete a branch by ID.
///
/// # Errors
/// Returns [Error::BranchHasCheques] if a cheque was issued by or deposited at the branch.
pub fn delete_branch(branch_id: BranchId, connection: &Connection) -> Result<(), Error> {
    let cheque_count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM cheque WHERE branch_id = ?1 OR deposit_branch_id = ?1",
        [branch_id],
        |row| row.get(0),
    )?;

    if cheque_count > 0 {
        return Err(Error::BranchHasCheques);
    }

    let rows_affected = connection.execute("DELETE FROM branch WHERE id = ?1", [branch_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBranch);
    }

    Ok(())
}

/// Initialize the branch table and indexes.
pub fn create_branch_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS branch (
            id INTEGER PRIMARY KEY,
            bank_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            address TEXT,
            postal_code TEXT,
            phone TEXT,
            email TEXT,
            FOREIGN KEY(bank_id) REFERENCES bank(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_branch_bank_id ON branch(bank_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Branch, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Branch {
        id: row.get(0)?,
        bank_id: row.get(1)?,
        name: BranchName::new_unchecked(&raw_name),
        address: row.get(3)?,
        postal_code: row.get(4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
    })
}
