//! Database operations for clients.

use rusqlite::{Connection, Row, types::Type};

use crate::{
    Error,
    client::{Client, ClientBuilder, ClientId, ClientKind, ClientName},
};

/// Narrows the client listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFilter {
    /// Matched against the name, the identity and tax numbers and the email.
    pub search: Option<String>,
    pub kind: Option<ClientKind>,
}

/// Create a client and return it with its generated ID.
///
/// # Errors
/// Returns [Error::EmptyClientName] if the name is blank.
pub fn create_client(builder: ClientBuilder, connection: &Connection) -> Result<Client, Error> {
    let name = ClientName::new(&builder.name)?;

    connection
        .prepare(
            "INSERT INTO client (kind, name, id_number, tax_number, phone, email, address)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id, kind, name, id_number, tax_number, phone, email, address",
        )?
        .query_row(
            (
                builder.kind.as_str(),
                name.as_ref(),
                builder.id_number,
                builder.tax_number,
                builder.phone,
                builder.email,
                builder.address,
            ),
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a single client by ID.
pub fn get_client(client_id: ClientId, connection: &Connection) -> Result<Client, Error> {
    connection
        .prepare(
            "SELECT id, kind, name, id_number, tax_number, phone, email, address
            FROM client WHERE id = :id;",
        )?
        .query_row(&[(":id", &client_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all clients ordered alphabetically by name.
pub fn get_all_clients(connection: &Connection) -> Result<Vec<Client>, Error> {
    search_clients(&ClientFilter::default(), connection)
}

/// Retrieve the clients matching `filter`, ordered by name.
pub fn search_clients(filter: &ClientFilter, connection: &Connection) -> Result<Vec<Client>, Error> {
    let pattern = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(|search| format!("%{search}%"));

    connection
        .prepare(
            "SELECT id, kind, name, id_number, tax_number, phone, email, address
            FROM client
            WHERE (?1 IS NULL
                OR name LIKE ?1
                OR id_number LIKE ?1
                OR tax_number LIKE ?1
                OR email LIKE ?1)
            AND (?2 IS NULL OR kind = ?2)
            ORDER BY name COLLATE NOCASE ASC;",
        )?
        .query_map(
            (pattern, filter.kind.map(|kind| kind.as_str())),
            map_row,
        )?
        .map(|maybe_client| maybe_client.map_err(|error| error.into()))
        .collect()
}

/// Update a client. Returns an error if the client doesn't exist.
pub fn update_client(
    client_id: ClientId,
    builder: ClientBuilder,
    connection: &Connection,
) -> Result<(), Error> {
    let name = ClientName::new(&builder.name)?;

    let rows_affected = connection.execute(
        "UPDATE client
        SET kind = ?1, name = ?2, id_number = ?3, tax_number = ?4, phone = ?5, email = ?6,
            address = ?7
        WHERE id = ?8",
        (
            builder.kind.as_str(),
            name.as_ref(),
            builder.id_number,
            builder.tax_number,
            builder.phone,
            builder.email,
            builder.address,
            client_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingClient);
    }

    Ok(())
}

/// Delete a client by ID.
///
/// # Errors
/// Returns [Error::ClientHasCheques] if any cheque belongs to the client.
pub fn delete_client(client_id: ClientId, connection: &Connection) -> Result<(), Error> {
    let cheque_count: i64 = connection.query_row(
        "SELECT COUNT(*) FROM cheque WHERE client_id = ?1",
        [client_id],
        |row| row.get(0),
    )?;

    if cheque_count > 0 {
        return Err(Error::ClientHasCheques);
    }

    let rows_affected = connection.execute("DELETE FROM client WHERE id = ?1", [client_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingClient);
    }

    Ok(())
}

/// Initialize the client table.
pub fn create_client_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS client (
            id INTEGER PRIMARY KEY,
            kind TEXT NOT NULL CHECK (kind IN ('personne', 'entreprise')),
            name TEXT NOT NULL,
            id_number TEXT,
            tax_number TEXT,
            phone TEXT,
            email TEXT,
            address TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_client_name ON client(name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Client, rusqlite::Error> {
    let raw_kind: String = row.get(1)?;
    let kind = raw_kind
        .parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(error)))?;
    let raw_name: String = row.get(2)?;

    Ok(Client {
        id: row.get(0)?,
        kind,
        name: ClientName::new_unchecked(&raw_name),
        id_number: row.get(3)?,
        tax_number: row.get(4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        address: row.get(7)?,
    })
}
