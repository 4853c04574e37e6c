//! The in-memory layout of a yearly workbook: one sheet per month, one row per cheque.

use std::collections::HashSet;

use time::Month;

use crate::{
    cheque::{ChequeId, ChequeListing},
    html::format_date,
};

/// Sheet names, January first.
pub const MONTH_SHEET_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

/// The header row of every sheet. The first column holds the cheque ID.
pub const COLUMN_HEADERS: [&str; 14] = [
    "Réf.",
    "Date d'émission",
    "Numéro du chèque",
    "Banque/Agence",
    "Client",
    "Nom du déposant",
    "Montant",
    "Devise",
    "Date d'échéance",
    "Banque de dépôt",
    "Statut",
    "N° Facture",
    "Date de facture",
    "Notes",
];

/// The index of the amount column, written with a number format.
pub const AMOUNT_COLUMN: usize = 6;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn optional_text(text: Option<String>) -> Self {
        text.map_or(Cell::Empty, Cell::Text)
    }
}

/// A row of a month sheet.
///
/// Rows typed in by hand have no cheque reference and are kept as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookRow {
    pub cheque_id: Option<ChequeId>,
    pub cells: Vec<Cell>,
}

impl WorkbookRow {
    /// The row written for `listing`.
    pub fn from_listing(listing: &ChequeListing) -> Self {
        let cheque = &listing.cheque;

        let cells = vec![
            Cell::Number(cheque.id as f64),
            Cell::Text(format_date(cheque.issue_date)),
            Cell::Text(cheque.number.clone()),
            Cell::Text(listing.issuing_label()),
            Cell::Text(listing.client_name.clone()),
            Cell::optional_text(cheque.depositor_name.clone()),
            Cell::Number(cheque.amount),
            Cell::Text(cheque.currency.to_string()),
            Cell::Text(format_date(cheque.due_date)),
            Cell::optional_text(listing.deposit_label()),
            Cell::Text(cheque.status.label().to_owned()),
            Cell::optional_text(cheque.invoice_number.clone()),
            Cell::optional_text(cheque.invoice_date.map(format_date)),
            Cell::optional_text(cheque.notes.clone()),
        ];

        Self {
            cheque_id: Some(cheque.id),
            cells,
        }
    }
}

/// The twelve month sheets of one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyWorkbook {
    pub year: i32,
    sheets: [Vec<WorkbookRow>; 12],
}

impl YearlyWorkbook {
    /// A workbook with twelve empty sheets.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            sheets: Default::default(),
        }
    }

    /// Build a workbook from rows read from disk, indexed by month.
    pub fn from_sheets(year: i32, sheets: [Vec<WorkbookRow>; 12]) -> Self {
        Self { year, sheets }
    }

    /// The rows of the sheet for `month`.
    pub fn rows(&self, month: Month) -> &[WorkbookRow] {
        &self.sheets[sheet_index(month)]
    }

    /// Every sheet name with its rows, January first.
    pub fn sheets(&self) -> impl Iterator<Item = (&'static str, &[WorkbookRow])> {
        MONTH_SHEET_NAMES
            .into_iter()
            .zip(self.sheets.iter().map(Vec::as_slice))
    }

    /// Write the row for `listing` to the sheet of its due month.
    ///
    /// An existing row in that sheet is replaced in place. A row in another sheet is removed,
    /// so the cheque appears exactly once.
    pub fn upsert(&mut self, listing: &ChequeListing) {
        let row = WorkbookRow::from_listing(listing);
        let target = sheet_index(listing.cheque.due_date.month());
        let cheque_id = listing.cheque.id;

        for (index, sheet) in self.sheets.iter_mut().enumerate() {
            if index != target {
                sheet.retain(|existing| existing.cheque_id != Some(cheque_id));
            }
        }

        let sheet = &mut self.sheets[target];
        match sheet
            .iter()
            .position(|existing| existing.cheque_id == Some(cheque_id))
        {
            Some(position) => {
                sheet[position] = row;
                // Drop any duplicates left by hand edits.
                let mut seen = false;
                sheet.retain(|existing| {
                    if existing.cheque_id != Some(cheque_id) {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => sheet.push(row),
        }
    }

    /// Remove every row of `cheque_id`. Returns whether a row was removed.
    pub fn remove(&mut self, cheque_id: ChequeId) -> bool {
        let before = self.total_rows();

        for sheet in &mut self.sheets {
            sheet.retain(|row| row.cheque_id != Some(cheque_id));
        }

        self.total_rows() != before
    }

    /// Remove the rows of cheques not in `cheque_ids`. Rows without a reference are kept.
    pub fn retain_cheques(&mut self, cheque_ids: &HashSet<ChequeId>) {
        for sheet in &mut self.sheets {
            sheet.retain(|row| row.cheque_id.is_none_or(|id| cheque_ids.contains(&id)));
        }
    }

    /// The month and row index of the first row for `cheque_id`.
    pub fn find(&self, cheque_id: ChequeId) -> Option<(Month, usize)> {
        self.sheets.iter().enumerate().find_map(|(index, sheet)| {
            sheet
                .iter()
                .position(|row| row.cheque_id == Some(cheque_id))
                .map(|position| (month_from_index(index), position))
        })
    }

    /// The number of rows in the sheet for `month`.
    pub fn row_count(&self, month: Month) -> usize {
        self.sheets[sheet_index(month)].len()
    }

    /// The number of rows across every sheet.
    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(Vec::len).sum()
    }
}

fn sheet_index(month: Month) -> usize {
    usize::from(u8::from(month)) - 1
}

fn month_from_index(index: usize) -> Month {
    Month::January.nth_next(index as u8)
}
