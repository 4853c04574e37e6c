use rusqlite::Connection;
use time::macros::date;

use crate::{
    bank::{Bank, BankName, create_bank},
    branch::{Branch, BranchBuilder, BranchId, create_branch},
    cheque::{Cheque, ChequeBuilder, create_cheque},
    client::{Client, ClientBuilder, ClientId, ClientKind, create_client},
};

pub(crate) fn create_test_bank_and_branch(connection: &Connection) -> (Bank, Branch) {
    let bank = create_bank(
        BankName::new_unchecked("Attijariwafa Bank"),
        Some("AWB".to_owned()),
        connection,
    )
    .expect("Could not create test bank");
    let branch = create_branch(BranchBuilder::new(bank.id, "Casablanca Anfa"), connection)
        .expect("Could not create test branch");

    (bank, branch)
}

pub(crate) fn create_test_client(name: &str, connection: &Connection) -> Client {
    create_client(ClientBuilder::new(ClientKind::Person, name), connection)
        .expect("Could not create test client")
}

/// A pending cheque of 1,500.00 MAD issued on 2025-01-10 and due on 2025-02-10.
pub(crate) fn create_test_cheque(
    number: &str,
    client_id: ClientId,
    branch_id: BranchId,
    connection: &Connection,
) -> Cheque {
    create_cheque(
        ChequeBuilder::new(
            number,
            1500.0,
            date!(2025 - 01 - 10),
            date!(2025 - 02 - 10),
            client_id,
            branch_id,
        ),
        connection,
    )
    .expect("Could not create test cheque")
}
