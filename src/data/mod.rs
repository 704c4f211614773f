use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use thiserror::Error;

use crate::budget::ledger::Ledger;

pub mod records;
pub mod workbook;

#[cfg(test)]
mod workbook_tests;

pub use workbook::{export, import};

use records::{EntryRecord, TransactionRecord, ENTRY_HEADERS, TRANSACTION_HEADERS};

pub const FILE_PREFIX: &str = "budget_";
pub const FILE_EXTENSION: &str = ".xlsx";

pub const INCOME_SHEET: &str = "Income";
pub const EXPENSES_SHEET: &str = "Expenses";
pub const TRANSACTIONS_SHEET: &str = "Transactions";
pub const SUMMARY_SHEET: &str = "Summary";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot open workbook: {0}")]
    Open(#[from] calamine::XlsxError),
    #[error("sheet '{0}' is missing")]
    MissingSheet(&'static str),
    #[error("cannot read sheet '{sheet}': {source}")]
    Sheet {
        sheet: &'static str,
        source: calamine::XlsxError,
    },
    #[error("sheet '{sheet}' does not start with the header {expected:?}")]
    Header {
        sheet: &'static str,
        expected: &'static [&'static str],
    },
    #[error("sheet '{sheet}', row {row}: invalid {column}")]
    InvalidCell {
        sheet: &'static str,
        row: usize,
        column: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Incomes,
    Expenses,
    Transactions,
}

/// `budget_<month with underscores>.xlsx`
pub fn default_file_name(month: &str) -> String {
    format!("{}{}{}", FILE_PREFIX, month.replace(' ', "_"), FILE_EXTENSION)
}

/// Reverses [`default_file_name`] on the file name part of `path`. Names
/// without the prefix or extension are decoded as far as they go.
pub fn month_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_prefix(FILE_PREFIX).unwrap_or(&name);
    let name = name.strip_suffix(FILE_EXTENSION).unwrap_or(name);

    name.replace('_', " ")
}

/// Writes a fresh workbook like [`export`], but refuses to replace an existing
/// file unless `force` is set.
pub fn create(ledger: &Ledger, path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_file_name(ledger.month())),
    };

    if target.exists() && !force {
        bail!("{} already exists", target.display());
    }

    export(ledger, Some(target.as_path()))
}

pub fn write_csv<W: Write>(ledger: &Ledger, section: Section, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    match section {
        Section::Incomes | Section::Expenses => {
            let entries = if section == Section::Incomes {
                ledger.incomes()
            } else {
                ledger.expenses()
            };

            csv_writer.write_record(ENTRY_HEADERS)?;
            for entry in entries {
                csv_writer.serialize(EntryRecord::from(entry))?;
            }
        },
        Section::Transactions => {
            csv_writer.write_record(TRANSACTION_HEADERS)?;
            for transaction in ledger.transactions() {
                csv_writer.serialize(TransactionRecord::from(transaction))?;
            }
        },
    }

    csv_writer.flush()?;

    Ok(())
}
