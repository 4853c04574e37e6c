//! Reading and writing the yearly workbooks on disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::{
    Error,
    workbook::layout::{
        AMOUNT_COLUMN, COLUMN_HEADERS, Cell, MONTH_SHEET_NAMES, WorkbookRow, YearlyWorkbook,
    },
};

const COLUMN_WIDTHS: [f64; 14] = [
    8.0, 14.0, 18.0, 28.0, 28.0, 22.0, 14.0, 8.0, 14.0, 28.0, 12.0, 14.0, 14.0, 40.0,
];

/// The directory holding one workbook per year, named `cheques_{year}.xlsx`.
#[derive(Debug, Clone)]
pub struct WorkbookStore {
    dir: PathBuf,
}

impl WorkbookStore {
    /// A store rooted at `dir`. The directory is created on the first save.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The path of the workbook for `year`.
    pub fn path_for_year(&self, year: i32) -> PathBuf {
        self.dir.join(format!("cheques_{year}.xlsx"))
    }

    /// Read the workbook for `year`, or an empty one if the file does not exist.
    ///
    /// # Errors
    /// Returns [Error::WorkbookRead] if the file exists but cannot be parsed.
    pub fn load(&self, year: i32) -> Result<YearlyWorkbook, Error> {
        let path = self.path_for_year(year);

        if !path.exists() {
            return Ok(YearlyWorkbook::new(year));
        }

        let mut workbook: Xlsx<_> = open_workbook(&path)
            .map_err(|error| Error::WorkbookRead(format!("{}: {error}", path.display())))?;
        let sheet_names = workbook.sheet_names();
        let mut sheets: [Vec<WorkbookRow>; 12] = Default::default();

        for (index, name) in MONTH_SHEET_NAMES.iter().enumerate() {
            if !sheet_names.iter().any(|sheet_name| sheet_name == name) {
                tracing::warn!("workbook {} has no sheet \"{name}\"", path.display());
                continue;
            }

            let range = workbook
                .worksheet_range(name)
                .map_err(|error| Error::WorkbookRead(format!("{name}: {error}")))?;

            sheets[index] = range
                .rows()
                .skip(1)
                .map(read_row)
                .filter(|row| row.cheque_id.is_some() || row.cells.iter().any(|cell| cell != &Cell::Empty))
                .collect();
        }

        Ok(YearlyWorkbook::from_sheets(year, sheets))
    }

    /// Write `workbook` to disk.
    ///
    /// The file is written next to its final path and then renamed over it, so a failed write
    /// leaves the previous version intact.
    ///
    /// # Errors
    /// Returns [Error::WorkbookWrite] if the directory or file cannot be written, e.g. because
    /// the workbook is open in a spreadsheet program that locks it.
    pub fn save(&self, workbook: &YearlyWorkbook) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)
            .map_err(|error| Error::WorkbookWrite(format!("{}: {error}", self.dir.display())))?;

        let path = self.path_for_year(workbook.year);
        let temp_path = path.with_extension("xlsx.tmp");

        let mut output = Workbook::new();
        for (name, rows) in workbook.sheets() {
            let worksheet = output.add_worksheet();
            worksheet.set_name(name).map_err(write_error)?;
            write_sheet(worksheet, rows).map_err(write_error)?;
        }

        output.save(&temp_path).map_err(write_error)?;
        fs::rename(&temp_path, &path).map_err(|error| {
            let _ = fs::remove_file(&temp_path);
            Error::WorkbookWrite(format!("{}: {error}", path.display()))
        })?;

        tracing::debug!("saved workbook {}", path.display());
        Ok(())
    }

    /// The years that have a workbook on disk, latest first.
    pub fn list_years(&self) -> Result<Vec<i32>, Error> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(Error::FileError(error.to_string())),
        };

        let mut years = entries
            .filter_map(Result::ok)
            .filter_map(|entry| year_from_file_name(&entry.path()))
            .collect::<Vec<_>>();
        years.sort_unstable_by(|a, b| b.cmp(a));

        Ok(years)
    }
}

fn year_from_file_name(path: &Path) -> Option<i32> {
    path.file_name()?
        .to_str()?
        .strip_prefix("cheques_")?
        .strip_suffix(".xlsx")?
        .parse()
        .ok()
}

fn read_row(cells: &[Data]) -> WorkbookRow {
    let cells = cells.iter().map(read_cell).collect::<Vec<_>>();
    let cheque_id = match cells.first() {
        Some(Cell::Number(number)) if number.fract() == 0.0 && *number > 0.0 => {
            Some(*number as i64)
        }
        Some(Cell::Text(text)) => text.trim().parse().ok(),
        _ => None,
    };

    WorkbookRow { cheque_id, cells }
}

fn read_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(number) => Cell::Number(*number as f64),
        Data::Float(number) => Cell::Number(*number),
        Data::String(text) => Cell::Text(text.clone()),
        other => Cell::Text(other.to_string()),
    }
}

/// Write the header and `rows` to `worksheet`, in the same layout as the yearly workbooks.
pub(super) fn write_sheet(worksheet: &mut Worksheet, rows: &[WorkbookRow]) -> Result<(), XlsxError> {
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x4472C4))
        .set_border(FormatBorder::Thin);
    let amount_format = Format::new().set_num_format("#,##0.00");

    for (column, (header, width)) in COLUMN_HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let column = column as u16;
        worksheet.write_string_with_format(0, column, *header, &header_format)?;
        worksheet.set_column_width(column, width)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (index, row) in rows.iter().enumerate() {
        let row_number = index as u32 + 1;

        for (column, cell) in row.cells.iter().enumerate() {
            let column_number = column as u16;

            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    worksheet.write_string(row_number, column_number, text)?;
                }
                Cell::Number(number) if column == AMOUNT_COLUMN => {
                    worksheet.write_number_with_format(
                        row_number,
                        column_number,
                        *number,
                        &amount_format,
                    )?;
                }
                Cell::Number(number) => {
                    worksheet.write_number(row_number, column_number, *number)?;
                }
            }
        }
    }

    Ok(())
}

fn write_error(error: XlsxError) -> Error {
    Error::WorkbookWrite(error.to_string())
}
