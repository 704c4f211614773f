use anyhow::{bail, Result};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use tempfile::TempDir;

use super::*;
use crate::budget::Kind;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_ledger() -> Result<Ledger> {
    let mut ledger = Ledger::for_month("October 2026");
    ledger.add_entry(Kind::Income, "Salary", dec!(3000));
    ledger.add_entry(Kind::Income, "Side Hustle", dec!(420.5));
    let housing = ledger.position(Kind::Expense, "Housing").unwrap();
    ledger.update_entry(Kind::Expense, housing, "Housing", dec!(1200))?;

    ledger.record_transaction(date(2026, 10, 9), "Groceries", "weekly shop", dec!(82.35), Kind::Expense)?;
    ledger.record_transaction(date(2026, 10, 1), "Salary", "", dec!(500), Kind::Income)?;
    ledger.record_transaction(date(2026, 10, 4), "Rent", "no such category", dec!(10), Kind::Expense)?;

    Ok(ledger)
}

fn write_entry_sheets(workbook: &mut Workbook) -> Result<()> {
    for name in [INCOME_SHEET, EXPENSES_SHEET] {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;
        worksheet.write_string(0, 0, "Category")?;
        worksheet.write_string(0, 1, "Amount")?;
    }

    Ok(())
}

fn add_transactions_sheet(workbook: &mut Workbook) -> Result<&mut Worksheet> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(TRANSACTIONS_SHEET)?;
    for (col, title) in ["Date", "Category", "Description", "Amount", "Type"].iter().enumerate() {
        worksheet.write_string(0, col as u16, *title)?;
    }

    Ok(worksheet)
}

#[test]
fn test_round_trip_default_name() -> Result<()> {
    let dir = TempDir::new()?;
    let ledger = sample_ledger()?;

    let path = dir.path().join(default_file_name(ledger.month()));
    let written = export(&ledger, Some(path.as_path()))?;
    assert_eq!(written, path);

    let loaded = import(&written)?;

    assert_eq!(loaded.month(), "October 2026");
    assert_eq!(loaded.incomes(), ledger.incomes());
    assert_eq!(loaded.expenses(), ledger.expenses());
    assert_eq!(loaded.transactions(), ledger.transactions());
    assert_eq!(loaded, ledger);

    Ok(())
}

#[test]
fn test_export_writes_four_sheets() -> Result<()> {
    let dir = TempDir::new()?;
    let ledger = sample_ledger()?;
    let path = export(&ledger, Some(dir.path().join("budget_October_2026.xlsx").as_path()))?;

    let mut workbook: Xlsx<_> = open_workbook(&path)?;
    assert_eq!(
        workbook.sheet_names(),
        vec![INCOME_SHEET, EXPENSES_SHEET, TRANSACTIONS_SHEET, SUMMARY_SHEET]
    );

    let transactions = workbook.worksheet_range(TRANSACTIONS_SHEET)?;
    let header: Vec<String> = transactions.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
    assert_eq!(header, vec!["Date", "Category", "Description", "Amount", "Type"]);
    // Log order, not date order.
    assert_eq!(transactions.get((1, 1)), Some(&Data::String("Groceries".to_string())));
    assert_eq!(transactions.get((2, 1)), Some(&Data::String("Salary".to_string())));

    let summary = workbook.worksheet_range(SUMMARY_SHEET)?;
    let rows: Vec<(String, Decimal)> = summary
        .rows()
        .skip(1)
        .map(|row| {
            let amount = Decimal::from_f64(row[1].get_float().unwrap()).unwrap();
            (row[0].to_string(), amount.round_dp(2))
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Total Income".to_string(), dec!(3920.5)),
            ("Total Expenses".to_string(), dec!(1282.35)),
            ("Net".to_string(), dec!(2638.15)),
        ]
    );

    Ok(())
}

#[test]
fn test_import_arbitrary_name() -> Result<()> {
    let dir = TempDir::new()?;
    let ledger = sample_ledger()?;
    let path = export(&ledger, Some(dir.path().join("family_plan.xlsx").as_path()))?;

    let loaded = import(&path)?;
    assert_eq!(loaded.month(), "family plan");
    assert_eq!(loaded.transactions(), ledger.transactions());

    Ok(())
}

#[test]
fn test_import_missing_transactions_sheet() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("budget_Broken.xlsx");

    let mut workbook = Workbook::new();
    write_entry_sheets(&mut workbook)?;
    workbook.save(&path)?;

    let ledger = sample_ledger()?;
    let mut current = ledger.clone();
    match import(&path) {
        Err(ImportError::MissingSheet(sheet)) => assert_eq!(sheet, TRANSACTIONS_SHEET),
        Err(err) => bail!("unexpected error: {}", err),
        Ok(loaded) => current = loaded,
    }

    assert_eq!(current, ledger);

    Ok(())
}

#[test]
fn test_import_summary_not_required() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("budget_Lean.xlsx");

    let mut workbook = Workbook::new();
    write_entry_sheets(&mut workbook)?;
    let worksheet = add_transactions_sheet(&mut workbook)?;
    worksheet.write_string(1, 0, "2026-02-11")?;
    worksheet.write_string(1, 1, "Health")?;
    worksheet.write_number(1, 3, 45.0)?;
    worksheet.write_string(1, 4, "Expense")?;
    workbook.save(&path)?;

    let loaded = import(&path)?;
    assert_eq!(loaded.month(), "Lean");
    assert_eq!(loaded.incomes().is_empty(), true);
    assert_eq!(loaded.transactions().len(), 1);

    let transaction = &loaded.transactions()[0];
    assert_eq!(*transaction.date(), date(2026, 2, 11));
    assert_eq!(transaction.description(), "");
    assert_eq!(*transaction.amount(), dec!(45));
    assert_eq!(*transaction.kind(), Kind::Expense);

    Ok(())
}

#[test]
fn test_import_invalid_amount() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("budget_Bad.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(INCOME_SHEET)?;
    worksheet.write_string(0, 0, "Category")?;
    worksheet.write_string(0, 1, "Amount")?;
    worksheet.write_string(1, 0, "Salary")?;
    worksheet.write_string(1, 1, "lots")?;
    workbook.save(&path)?;

    match import(&path) {
        Err(ImportError::InvalidCell { sheet, row, column }) => {
            assert_eq!((sheet, row, column), (INCOME_SHEET, 2, "Amount"));
        },
        Err(err) => bail!("unexpected error: {}", err),
        Ok(_) => bail!("a non-numeric amount should fail the import"),
    }

    Ok(())
}

#[test]
fn test_import_missing_file() -> Result<()> {
    let dir = TempDir::new()?;
    let result = import(dir.path().join("budget_Nowhere.xlsx"));

    assert_eq!(matches!(result, Err(ImportError::Open(_))), true);

    Ok(())
}

#[test]
fn test_default_path_in_working_directory() -> Result<()> {
    let dir = TempDir::new()?;
    let ledger = sample_ledger()?;
    let previous = std::env::current_dir()?;

    std::env::set_current_dir(dir.path())?;
    let exported = export(&ledger, None);
    let refused = create(&ledger, None, false);
    std::env::set_current_dir(previous)?;

    let exported = exported?;
    assert_eq!(exported, PathBuf::from("budget_October_2026.xlsx"));
    assert_eq!(refused.is_err(), true);

    let loaded = import(dir.path().join(&exported))?;
    assert_eq!(loaded, ledger);

    Ok(())
}

#[test]
fn test_create_keeps_existing_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("budget_October_2026.xlsx");
    let ledger = sample_ledger()?;
    create(&ledger, Some(path.as_path()), false)?;

    let fresh = Ledger::for_month("October 2026");
    if let Err(err) = create(&fresh, Some(path.as_path()), false) {
        assert_eq!(err.to_string().ends_with("already exists"), true);
    } else {
        bail!("an existing workbook should not be replaced");
    }
    assert_eq!(import(&path)?, ledger);

    create(&fresh, Some(path.as_path()), true)?;
    assert_eq!(import(&path)?, fresh);

    Ok(())
}

#[test]
fn test_import_skips_blank_rows() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("budget_Gaps.xlsx");

    let mut workbook = Workbook::new();
    write_entry_sheets(&mut workbook)?;
    let income = workbook.worksheet_from_name(INCOME_SHEET)?;
    income.write_string(1, 0, "Salary")?;
    income.write_number(1, 1, 3000.0)?;
    income.write_string(2, 0, "   ")?;
    income.write_string(3, 0, "Bonus")?;
    income.write_number(3, 1, 250.0)?;

    let transactions = add_transactions_sheet(&mut workbook)?;
    transactions.write_string(1, 0, "2026-02-01")?;
    transactions.write_string(1, 1, "Salary")?;
    transactions.write_number(1, 3, 3000.0)?;
    transactions.write_string(1, 4, "Income")?;
    transactions.write_string(3, 0, "2026-02-03")?;
    transactions.write_string(3, 1, "Groceries")?;
    transactions.write_number(3, 3, 61.2)?;
    transactions.write_string(3, 4, "expense")?;
    workbook.save(&path)?;

    let loaded = import(&path)?;
    let categories: Vec<&str> = loaded.incomes().iter().map(|entry| entry.category().as_str()).collect();
    assert_eq!(categories, vec!["Salary", "Bonus"]);
    assert_eq!(loaded.total(Kind::Income), dec!(3250));
    assert_eq!(loaded.transactions().len(), 2);
    assert_eq!(*loaded.transactions()[1].date(), date(2026, 2, 3));
    assert_eq!(*loaded.transactions()[1].kind(), Kind::Expense);

    Ok(())
}

#[test]
fn test_import_invalid_transaction_cells() -> Result<()> {
    let dir = TempDir::new()?;
    let cases = [
        ("budget_BadDate.xlsx", "11/02/2026", "Expense", "Date"),
        ("budget_BadType.xlsx", "2026-02-11", "Transfer", "Type"),
    ];

    for (name, day, kind, column) in cases {
        let path = dir.path().join(name);
        let mut workbook = Workbook::new();
        write_entry_sheets(&mut workbook)?;
        let worksheet = add_transactions_sheet(&mut workbook)?;
        worksheet.write_string(1, 0, "2026-02-10")?;
        worksheet.write_string(1, 1, "Health")?;
        worksheet.write_number(1, 3, 20.0)?;
        worksheet.write_string(1, 4, "Expense")?;
        worksheet.write_string(2, 0, day)?;
        worksheet.write_string(2, 1, "Health")?;
        worksheet.write_number(2, 3, 45.0)?;
        worksheet.write_string(2, 4, kind)?;
        workbook.save(&path)?;

        match import(&path) {
            Err(ImportError::InvalidCell { sheet, row, column: found }) => {
                assert_eq!((sheet, row, found), (TRANSACTIONS_SHEET, 3, column));
            },
            Err(err) => bail!("unexpected error: {}", err),
            Ok(_) => bail!("an invalid {} should fail the import", column),
        }
    }

    Ok(())
}

#[test]
fn test_import_wrong_header() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("budget_Header.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(INCOME_SHEET)?;
    worksheet.write_string(0, 0, "Name")?;
    worksheet.write_string(0, 1, "Amount")?;
    worksheet.write_string(1, 0, "Salary")?;
    worksheet.write_number(1, 1, 3000.0)?;
    workbook.save(&path)?;

    match import(&path) {
        Err(ImportError::Header { sheet, expected }) => {
            assert_eq!(sheet, INCOME_SHEET);
            assert_eq!(expected, &["Category", "Amount"]);
        },
        Err(err) => bail!("unexpected error: {}", err),
        Ok(_) => bail!("a wrong header should fail the import"),
    }

    Ok(())
}

#[test]
fn test_import_native_and_iso_dates() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("budget_Dates.xlsx");

    let mut workbook = Workbook::new();
    write_entry_sheets(&mut workbook)?;
    let day_first = Format::new().set_num_format("dd/mm/yyyy");
    let worksheet = add_transactions_sheet(&mut workbook)?;
    worksheet.write_datetime_with_format(1, 0, &ExcelDateTime::from_ymd(2026, 2, 11)?, &day_first)?;
    worksheet.write_string(1, 1, "Health")?;
    worksheet.write_number(1, 3, 45.0)?;
    worksheet.write_string(1, 4, "Expense")?;
    worksheet.write_string(2, 0, "2026-02-12T08:30:00")?;
    worksheet.write_string(2, 1, "Salary")?;
    worksheet.write_number(2, 3, 100.0)?;
    worksheet.write_string(2, 4, "Income")?;
    workbook.save(&path)?;

    let loaded = import(&path)?;
    let days: Vec<NaiveDate> = loaded.transactions().iter().map(|t| *t.date()).collect();
    assert_eq!(days, vec![date(2026, 2, 11), date(2026, 2, 12)]);

    Ok(())
}

#[test]
fn test_date_cells() {
    let iso = Data::DateTimeIso("2026-03-05T17:45:00".to_string());
    assert_eq!(workbook::date(Some(&iso)), Some(date(2026, 3, 5)));
    assert_eq!(workbook::date(Some(&Data::String(" 2026-03-06 ".to_string()))), Some(date(2026, 3, 6)));
    assert_eq!(workbook::date(Some(&Data::String("March 5".to_string()))), None);
    assert_eq!(workbook::date(Some(&Data::Bool(true))), None);
    assert_eq!(workbook::date(None), None);
}
