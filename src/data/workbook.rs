use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use anyhow::Result;
use calamine::{open_workbook, Data, DataType, Range, Reader, Xlsx};
use chrono::{Datelike, NaiveDate};
use log::debug;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet, XlsxError};

use super::records::{ENTRY_HEADERS, TRANSACTION_HEADERS};
use super::{
    default_file_name, month_from_path, ImportError, EXPENSES_SHEET, INCOME_SHEET, SUMMARY_SHEET,
    TRANSACTIONS_SHEET,
};
use crate::budget::entry::Entry;
use crate::budget::ledger::Ledger;
use crate::budget::transaction::Transaction;
use crate::budget::Kind;

const DATE_FORMAT: &str = "yyyy-mm-dd";

/// Writes the ledger as a four sheet workbook and returns where it went.
/// Without `path` the file is named after the month in the working directory.
pub fn export(ledger: &Ledger, path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_file_name(ledger.month())),
    };

    let header = Format::new().set_bold();
    let date = Format::new().set_num_format(DATE_FORMAT);
    let mut workbook = Workbook::new();

    write_entries(workbook.add_worksheet(), INCOME_SHEET, ledger.incomes(), &header)?;
    write_entries(workbook.add_worksheet(), EXPENSES_SHEET, ledger.expenses(), &header)?;
    write_transactions(workbook.add_worksheet(), ledger.transactions(), &header, &date)?;
    write_summary(workbook.add_worksheet(), ledger, &header)?;

    workbook.save(&path)?;
    debug!("exported '{}' to {}", ledger.month(), path.display());

    Ok(path)
}

fn write_header(worksheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<(), XlsxError> {
    for (col, title) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, format)?;
    }

    Ok(())
}

fn write_amount(worksheet: &mut Worksheet, row: u32, col: u16, amount: Decimal) -> Result<(), XlsxError> {
    worksheet.write_number(row, col, amount.to_f64().unwrap_or_default())?;

    Ok(())
}

fn write_entries(worksheet: &mut Worksheet, name: &str, entries: &[Entry], header: &Format) -> Result<(), XlsxError> {
    worksheet.set_name(name)?;
    worksheet.set_column_width(0, 24)?;
    write_header(worksheet, &ENTRY_HEADERS, header)?;

    for (row, entry) in (1u32..).zip(entries) {
        worksheet.write_string(row, 0, entry.category())?;
        write_amount(worksheet, row, 1, *entry.amount())?;
    }
    debug!("wrote {} rows to sheet {}", entries.len(), name);

    Ok(())
}

fn write_transactions(
    worksheet: &mut Worksheet,
    transactions: &[Transaction],
    header: &Format,
    date: &Format,
) -> Result<(), XlsxError> {
    worksheet.set_name(TRANSACTIONS_SHEET)?;
    worksheet.set_column_width(0, 12)?;
    worksheet.set_column_width(1, 24)?;
    worksheet.set_column_width(2, 32)?;
    write_header(worksheet, &TRANSACTION_HEADERS, header)?;

    for (row, transaction) in (1u32..).zip(transactions) {
        let day = transaction.date();
        let datetime = ExcelDateTime::from_ymd(day.year() as u16, day.month() as u8, day.day() as u8)?;

        worksheet.write_datetime_with_format(row, 0, &datetime, date)?;
        worksheet.write_string(row, 1, transaction.category())?;
        worksheet.write_string(row, 2, transaction.description())?;
        write_amount(worksheet, row, 3, *transaction.amount())?;
        worksheet.write_string(row, 4, transaction.kind().as_str())?;
    }
    debug!("wrote {} rows to sheet {}", transactions.len(), TRANSACTIONS_SHEET);

    Ok(())
}

fn write_summary(worksheet: &mut Worksheet, ledger: &Ledger, header: &Format) -> Result<(), XlsxError> {
    let totals = ledger.totals();

    worksheet.set_name(SUMMARY_SHEET)?;
    worksheet.set_column_width(0, 24)?;
    write_header(worksheet, &ENTRY_HEADERS, header)?;

    let rows = [
        ("Total Income", totals.income),
        ("Total Expenses", totals.expenses),
        ("Net", totals.net),
    ];
    for (row, (label, amount)) in (1u32..).zip(rows) {
        worksheet.write_string(row, 0, label)?;
        write_amount(worksheet, row, 1, amount)?;
    }

    Ok(())
}

/// Reads a workbook written by [`export`] into a new ledger. The month comes
/// from the file name; the Summary sheet is ignored.
pub fn import(path: impl AsRef<Path>) -> Result<Ledger, ImportError> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let incomes = read_entries(&sheet(&mut workbook, INCOME_SHEET)?, INCOME_SHEET)?;
    let expenses = read_entries(&sheet(&mut workbook, EXPENSES_SHEET)?, EXPENSES_SHEET)?;
    let transactions = read_transactions(&sheet(&mut workbook, TRANSACTIONS_SHEET)?)?;

    debug!(
        "imported {} incomes, {} expenses, {} transactions from {}",
        incomes.len(),
        expenses.len(),
        transactions.len(),
        path.display()
    );

    Ok(Ledger::from_parts(month_from_path(path), incomes, expenses, transactions))
}

fn sheet<R: Read + Seek>(workbook: &mut Xlsx<R>, name: &'static str) -> Result<Range<Data>, ImportError> {
    if !workbook.sheet_names().iter().any(|sheet| sheet == name) {
        return Err(ImportError::MissingSheet(name));
    }

    workbook
        .worksheet_range(name)
        .map_err(|source| ImportError::Sheet { sheet: name, source })
}

/// Data rows of `range` paired with their 1-based spreadsheet row number,
/// after checking the header. Blank rows are skipped.
fn data_rows<'a>(
    range: &'a Range<Data>,
    sheet: &'static str,
    expected: &'static [&'static str],
) -> Result<impl Iterator<Item = (usize, &'a [Data])>, ImportError> {
    let mut rows = range.rows();
    let header = rows.next().ok_or(ImportError::Header { sheet, expected })?;

    let matches = expected
        .iter()
        .enumerate()
        .all(|(col, title)| text(header.get(col)).trim() == *title);
    if !matches {
        return Err(ImportError::Header { sheet, expected });
    }

    Ok((2..).zip(rows).filter(|(_, row)| !row.iter().all(is_blank)))
}

fn read_entries(range: &Range<Data>, sheet: &'static str) -> Result<Vec<Entry>, ImportError> {
    data_rows(range, sheet, &ENTRY_HEADERS)?
        .map(|(row, cells)| -> Result<Entry, ImportError> {
            let amount = amount(cells.get(1)).ok_or(ImportError::InvalidCell {
                sheet,
                row,
                column: "Amount",
            })?;

            Ok(Entry::new(text(cells.first()), amount))
        })
        .collect()
}

fn read_transactions(range: &Range<Data>) -> Result<Vec<Transaction>, ImportError> {
    let sheet = TRANSACTIONS_SHEET;
    let invalid = |row, column| ImportError::InvalidCell { sheet, row, column };

    data_rows(range, sheet, &TRANSACTION_HEADERS)?
        .map(|(row, cells)| -> Result<Transaction, ImportError> {
            let date = date(cells.first()).ok_or(invalid(row, "Date"))?;
            let amount = amount(cells.get(3)).ok_or(invalid(row, "Amount"))?;
            let kind = text(cells.get(4))
                .parse::<Kind>()
                .map_err(|_| invalid(row, "Type"))?;

            Transaction::new(date, text(cells.get(1)), text(cells.get(2)), amount, kind)
                .map_err(|_| invalid(row, "Amount"))
        })
        .collect()
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(value) => value.trim().is_empty(),
        _ => false,
    }
}

fn text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(value)) => value.clone(),
        Some(other) => other.to_string(),
    }
}

fn amount(cell: Option<&Data>) -> Option<Decimal> {
    match cell? {
        Data::Float(value) => Decimal::from_f64(*value),
        Data::Int(value) => Some(Decimal::from(*value)),
        Data::String(value) => value.trim().parse().ok(),
        _ => None,
    }
}

/// Native spreadsheet dates, ISO datetimes and `YYYY-MM-DD` text.
pub(super) fn date(cell: Option<&Data>) -> Option<NaiveDate> {
    let cell = cell?;
    if let Some(date) = cell.as_date() {
        return Some(date);
    }

    let value = match cell {
        Data::String(value) | Data::DateTimeIso(value) => value.trim(),
        _ => return None,
    };

    value
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}
