//! Keeps the yearly workbooks in step with the cheque table.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rusqlite::{Connection, OptionalExtension};

use crate::{
    Error,
    cheque::{ChequeFilter, ChequeId, ChequeListing, get_cheque_listing, query_cheques},
    workbook::WorkbookStore,
};

/// What a full resynchronization wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// The number of workbooks saved.
    pub workbooks: usize,
    /// The number of cheque rows written.
    pub cheques: usize,
}

/// Create the table recording which yearly workbook holds each cheque.
pub fn create_workbook_entry_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS workbook_entry (
            cheque_id INTEGER PRIMARY KEY,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL
        );",
    )
}

fn get_entry_year(cheque_id: ChequeId, connection: &Connection) -> Result<Option<i32>, Error> {
    connection
        .query_row(
            "SELECT year FROM workbook_entry WHERE cheque_id = ?1",
            [cheque_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
}

fn record_entry(listing: &ChequeListing, connection: &Connection) -> Result<(), Error> {
    let due_date = listing.cheque.due_date;
    connection.execute(
        "INSERT OR REPLACE INTO workbook_entry (cheque_id, year, month) VALUES (?1, ?2, ?3)",
        (
            listing.cheque.id,
            due_date.year(),
            u8::from(due_date.month()),
        ),
    )?;

    Ok(())
}

/// Write the current state of `cheque_id` to the workbook of its due year.
///
/// If the due year changed since the last sync, the row is removed from the old workbook.
///
/// # Errors
/// Returns [Error::NotFound] if the cheque does not exist, or a workbook error if a file
/// cannot be read or written.
pub fn sync_cheque(
    cheque_id: ChequeId,
    store: &WorkbookStore,
    connection: &Connection,
) -> Result<(), Error> {
    let listing = get_cheque_listing(cheque_id, connection)?;
    let year = listing.cheque.due_date.year();

    if let Some(previous_year) = get_entry_year(cheque_id, connection)?
        && previous_year != year
    {
        let mut previous = store.load(previous_year)?;
        if previous.remove(cheque_id) {
            store.save(&previous)?;
        }
    }

    let mut workbook = store.load(year)?;
    workbook.upsert(&listing);
    store.save(&workbook)?;
    record_entry(&listing, connection)?;

    tracing::debug!("synced cheque {cheque_id} to the {year} workbook");
    Ok(())
}

/// Remove the row of `cheque_id` from its workbook and forget the entry.
///
/// Call this before deleting the cheque. Does nothing if the cheque was never synced.
pub fn remove_cheque_from_workbooks(
    cheque_id: ChequeId,
    store: &WorkbookStore,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(year) = get_entry_year(cheque_id, connection)? else {
        return Ok(());
    };

    let mut workbook = store.load(year)?;
    if workbook.remove(cheque_id) {
        store.save(&workbook)?;
    }

    connection.execute(
        "DELETE FROM workbook_entry WHERE cheque_id = ?1",
        [cheque_id],
    )?;

    Ok(())
}

/// Rebuild every workbook from the cheque table.
///
/// Each cheque ends up exactly once, in the sheet of its due month. Rows of deleted cheques
/// are dropped and rows without a cheque reference are kept. Running this twice in a row
/// produces the same files.
///
/// # Errors
/// Returns a workbook error if a file cannot be read or written, or an SQL error.
pub fn sync_all_workbooks(
    store: &WorkbookStore,
    connection: &Connection,
) -> Result<SyncSummary, Error> {
    let mut cheques = query_cheques(&ChequeFilter::default(), connection)?;
    // Oldest first, so cheques added since the last sync are appended in date order.
    cheques.reverse();

    let mut by_year: BTreeMap<i32, Vec<&ChequeListing>> = BTreeMap::new();
    for listing in &cheques {
        by_year
            .entry(listing.cheque.due_date.year())
            .or_default()
            .push(listing);
    }

    let years = by_year
        .keys()
        .copied()
        .chain(store.list_years()?)
        .collect::<BTreeSet<_>>();

    for &year in &years {
        let listings = by_year.get(&year).map(Vec::as_slice).unwrap_or_default();
        let ids = listings
            .iter()
            .map(|listing| listing.cheque.id)
            .collect::<HashSet<_>>();

        let mut workbook = store.load(year)?;
        workbook.retain_cheques(&ids);
        for listing in listings {
            workbook.upsert(listing);
        }
        store.save(&workbook)?;
    }

    let transaction = connection.unchecked_transaction()?;
    transaction.execute("DELETE FROM workbook_entry", [])?;
    for listing in &cheques {
        record_entry(listing, &transaction)?;
    }
    transaction.commit()?;

    let summary = SyncSummary {
        workbooks: years.len(),
        cheques: cheques.len(),
    };
    tracing::info!(
        "synchronized {} cheques into {} workbooks",
        summary.cheques,
        summary.workbooks
    );

    Ok(summary)
}
