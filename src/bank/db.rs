//! Database operations for banks.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    bank::{Bank, BankId, BankName},
};

/// Create a bank and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateBankName] if another bank already has `name`.
pub fn create_bank(
    name: BankName,
    code: Option<String>,
    connection: &Connection,
) -> Result<Bank, Error> {
    connection
        .execute(
            "INSERT INTO bank (name, code) VALUES (?1, ?2);",
            (name.as_ref(), &code),
        )
        .map_err(|error| match Error::from(error) {
            Error::DuplicateBankName(_) => Error::DuplicateBankName(name.to_string()),
            error => error,
        })?;

    let id = connection.last_insert_rowid();

    Ok(Bank { id, name, code })
}

/// Retrieve a single bank by ID.
pub fn get_bank(bank_id: BankId, connection: &Connection) -> Result<Bank, Error> {
    connection
        .prepare("SELECT id, name, code FROM bank WHERE id = :id;")?
        .query_row(&[(":id", &bank_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all banks ordered alphabetically by name.
pub fn get_all_banks(connection: &Connection) -> Result<Vec<Bank>, Error> {
    connection
        .prepare("SELECT id, name, code FROM bank ORDER BY name COLLATE NOCASE ASC;")?
        .query_map([], map_row)?
        .map(|maybe_bank| maybe_bank.map_err(|error| error.into()))
        .collect()
}

/// Update a bank's name and code. Returns an error if the bank doesn't exist.
pub fn update_bank(
    bank_id: BankId,
    name: BankName,
    code: Option<String>,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE bank SET name = ?1, code = ?2 WHERE id = ?3",
            (name.as_ref(), &code, bank_id),
        )
        .map_err(|error| match Error::from(error) {
            Error::DuplicateBankName(_) => Error::DuplicateBankName(name.to_string()),
            error => error,
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBank);
    }

    Ok(())
}

/// Delete a bank and its branches.
///
/// # Errors
/// Returns [Error::BankHasCheques] if a cheque was issued by or deposited at one of the bank's
/// branches, or [Error::DeleteMissingBank] if the bank doesn't exist.
pub fn delete_bank(bank_id: BankId, connection: &Connection) -> Result<(), Error> {
    let cheque_count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM cheque
        INNER JOIN branch ON branch.id = cheque.branch_id OR branch.id = cheque.deposit_branch_id
        WHERE branch.bank_id = ?1",
        [bank_id],
        |row| row.get(0),
    )?;

    if cheque_count > 0 {
        return Err(Error::BankHasCheques);
    }

    let rows_affected = connection.execute("DELETE FROM bank WHERE id = ?1", [bank_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBank);
    }

    Ok(())
}

/// Initialize the bank table.
pub fn create_bank_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS bank (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            code TEXT
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Bank, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let code = row.get(2)?;

    Ok(Bank {
        id,
        name: BankName::new_unchecked(&raw_name),
        code,
    })
}

#[cfg(test)]
mod bank_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        bank::{BankName, create_bank, get_all_banks, get_bank, update_bank},
        branch::{BranchBuilder, create_branch},
        db::initialize,
        test_utils::{create_test_cheque, create_test_client},
    };

    use super::delete_bank;

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    #[test]
    fn create_bank_succeeds() {
        let connection = get_test_db_connection();
        let name = BankName::new_unchecked("Attijariwafa Bank");

        let bank = create_bank(name.clone(), Some("AWB".to_owned()), &connection)
            .expect("Could not create bank");

        assert!(bank.id > 0);
        assert_eq!(bank.name, name);
        assert_eq!(get_bank(bank.id, &connection), Ok(bank));
    }

    #[test]
    fn create_bank_fails_on_duplicate_name() {
        let connection = get_test_db_connection();
        create_bank(BankName::new_unchecked("CIH"), None, &connection).unwrap();

        let result = create_bank(BankName::new_unchecked("CIH"), None, &connection);

        assert_eq!(result, Err(Error::DuplicateBankName("CIH".to_owned())));
    }

    #[test]
    fn get_bank_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        assert_eq!(get_bank(42, &connection), Err(Error::NotFound));
    }

    #[test]
    fn get_all_banks_orders_by_name() {
        let connection = get_test_db_connection();
        create_bank(BankName::new_unchecked("Société Générale"), None, &connection).unwrap();
        create_bank(BankName::new_unchecked("BMCE"), None, &connection).unwrap();
        create_bank(BankName::new_unchecked("banque populaire"), None, &connection).unwrap();

        let names = get_all_banks(&connection)
            .unwrap()
            .into_iter()
            .map(|bank| bank.name.to_string())
            .collect::<Vec<_>>();

        assert_eq!(names, ["banque populaire", "BMCE", "Société Générale"]);
    }

    #[test]
    fn update_bank_succeeds() {
        let connection = get_test_db_connection();
        let bank = create_bank(BankName::new_unchecked("BMCE"), None, &connection).unwrap();

        update_bank(
            bank.id,
            BankName::new_unchecked("Bank of Africa"),
            Some("BOA".to_owned()),
            &connection,
        )
        .expect("Could not update bank");

        let updated = get_bank(bank.id, &connection).unwrap();
        assert_eq!(updated.name.as_ref(), "Bank of Africa");
        assert_eq!(updated.code.as_deref(), Some("BOA"));
    }

    #[test]
    fn update_bank_with_invalid_id_returns_error() {
        let connection = get_test_db_connection();

        let result = update_bank(999, BankName::new_unchecked("X"), None, &connection);

        assert_eq!(result, Err(Error::UpdateMissingBank));
    }

    #[test]
    fn delete_bank_deletes_its_branches() {
        let connection = get_test_db_connection();
        let bank = create_bank(BankName::new_unchecked("CIH"), None, &connection).unwrap();
        create_branch(BranchBuilder::new(bank.id, "Agence Agdal"), &connection).unwrap();

        delete_bank(bank.id, &connection).expect("Could not delete bank");

        let branch_count: i64 = connection
            .query_row("SELECT COUNT(*) FROM branch", [], |row| row.get(0))
            .unwrap();
        assert_eq!(branch_count, 0);
        assert_eq!(get_bank(bank.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_bank_with_cheques_fails() {
        let connection = get_test_db_connection();
        let bank = create_bank(BankName::new_unchecked("CIH"), None, &connection).unwrap();
        let branch =
            create_branch(BranchBuilder::new(bank.id, "Agence Agdal"), &connection).unwrap();
        let client = create_test_client("Karim", &connection);
        create_test_cheque("0001", client.id, branch.id, &connection);

        let result = delete_bank(bank.id, &connection);

        assert_eq!(result, Err(Error::BankHasCheques));
        assert!(get_bank(bank.id, &connection).is_ok());
    }

    #[test]
    fn delete_bank_with_invalid_id_returns_error() {
        let connection = get_test_db_connection();

        assert_eq!(delete_bank(999, &connection), Err(Error::DeleteMissingBank));
    }
}
