//! SQL aggregates shown on the dashboard.

use rusqlite::{Connection, types::Type};
use time::{Date, Duration, Month};

use crate::{
    Error,
    cheque::{ChequeStatus, Currency},
    client::ClientId,
};

/// The number of cheques in a status and their total per currency.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct StatusTotal {
    pub status: ChequeStatus,
    pub count: u64,
    pub amounts: Vec<(Currency, f64)>,
}

/// A client ranked by the number of their rejected cheques.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RejectedClient {
    pub client_id: ClientId,
    pub name: String,
    pub rejected_count: u64,
}

/// One row per status in lifecycle order, including statuses without cheques.
pub(super) fn get_status_totals(connection: &Connection) -> Result<Vec<StatusTotal>, Error> {
    let mut totals = ChequeStatus::ALL
        .into_iter()
        .map(|status| StatusTotal {
            status,
            count: 0,
            amounts: Vec::new(),
        })
        .collect::<Vec<_>>();

    let rows = connection
        .prepare(
            "SELECT status, currency, COUNT(*), SUM(amount)
            FROM cheque
            GROUP BY status, currency
            ORDER BY currency",
        )?
        .query_map([], |row| {
            let status = parse_column::<ChequeStatus>(row.get(0)?, 0)?;
            let currency = parse_column::<Currency>(row.get(1)?, 1)?;
            Ok((status, currency, row.get::<_, u64>(2)?, row.get::<_, f64>(3)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (status, currency, count, amount) in rows {
        if let Some(total) = totals.iter_mut().find(|total| total.status == status) {
            total.count += count;
            total.amounts.push((currency, amount));
        }
    }

    Ok(totals)
}

/// The total of cheques honored during the month containing `today`, per currency.
///
/// A cheque's last update is the time it was honored, since honored is a final status.
pub(super) fn get_collected_this_month(
    today: Date,
    connection: &Connection,
) -> Result<Vec<(Currency, f64)>, Error> {
    let (month_start, month_end) = month_bounds(today);

    connection
        .prepare(
            "SELECT currency, SUM(amount)
            FROM cheque
            WHERE status = ?1 AND substr(updated_at, 1, 10) BETWEEN ?2 AND ?3
            GROUP BY currency
            ORDER BY currency",
        )?
        .query_map(
            (ChequeStatus::Honored.as_str(), month_start, month_end),
            |row| Ok((parse_column::<Currency>(row.get(0)?, 0)?, row.get(1)?)),
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// The number of open cheques whose due date is before `today`.
pub(super) fn count_overdue(today: Date, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(*) FROM cheque WHERE status IN (?1, ?2) AND due_date < ?3",
            (
                ChequeStatus::Pending.as_str(),
                ChequeStatus::Deposited.as_str(),
                today,
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The number of open cheques due between `today` and `today + due_soon_days`.
pub(super) fn count_due_soon(
    today: Date,
    due_soon_days: u32,
    connection: &Connection,
) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(*) FROM cheque
            WHERE status IN (?1, ?2) AND due_date BETWEEN ?3 AND ?4",
            (
                ChequeStatus::Pending.as_str(),
                ChequeStatus::Deposited.as_str(),
                today,
                today.saturating_add(Duration::days(i64::from(due_soon_days))),
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The `limit` clients with the most rejected cheques.
pub(super) fn get_top_rejected_clients(
    limit: u32,
    connection: &Connection,
) -> Result<Vec<RejectedClient>, Error> {
    connection
        .prepare(
            "SELECT client.id, client.name, COUNT(*) AS rejected_count
            FROM cheque
            INNER JOIN client ON client.id = cheque.client_id
            WHERE cheque.status = ?1
            GROUP BY client.id
            ORDER BY rejected_count DESC, client.name ASC
            LIMIT ?2",
        )?
        .query_map((ChequeStatus::Rejected.as_str(), limit), |row| {
            Ok(RejectedClient {
                client_id: row.get(0)?,
                name: row.get(1)?,
                rejected_count: row.get(2)?,
            })
        })?
        .map(|maybe_client| maybe_client.map_err(|error| error.into()))
        .collect()
}

/// The total amount per due month for each status in lifecycle order, for `year`.
pub(super) fn get_monthly_status_amounts(
    year: i32,
    connection: &Connection,
) -> Result<Vec<(ChequeStatus, [f64; 12])>, Error> {
    let year_start = Date::from_calendar_date(year, Month::January, 1)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;
    let year_end = Date::from_calendar_date(year, Month::December, 31)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;

    let rows = connection
        .prepare(
            "SELECT CAST(strftime('%m', due_date) AS INTEGER), status, SUM(amount)
            FROM cheque
            WHERE due_date BETWEEN ?1 AND ?2
            GROUP BY 1, 2",
        )?
        .query_map((year_start, year_end), |row| {
            Ok((
                row.get::<_, usize>(0)?,
                parse_column::<ChequeStatus>(row.get(1)?, 1)?,
                row.get::<_, f64>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut amounts = ChequeStatus::ALL
        .into_iter()
        .map(|status| (status, [0.0; 12]))
        .collect::<Vec<_>>();
    for (month, status, amount) in rows {
        if let Some((_, months)) = amounts.iter_mut().find(|(s, _)| *s == status)
            && (1..=12).contains(&month)
        {
            months[month - 1] += amount;
        }
    }

    Ok(amounts)
}

fn month_bounds(date: Date) -> (Date, Date) {
    let start = date.replace_day(1).unwrap_or(date);
    let end = date
        .replace_day(date.month().length(date.year()))
        .unwrap_or(date);

    (start, end)
}

fn parse_column<T>(text: String, index: usize) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr<Err = Error>,
{
    text.parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}
