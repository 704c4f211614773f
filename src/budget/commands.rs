use chrono::NaiveDate;
use enum_dispatch::enum_dispatch;
use rust_decimal::Decimal;

use super::ledger::Ledger;
use super::{Kind, LedgerCommand, LedgerError};

/// Every mutation a front end can request against a [`Ledger`].
#[enum_dispatch(LedgerCommand)]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddEntry,
    UpdateEntry,
    DeleteEntry,
    RecordTransaction,
    UpdateTransaction,
    DeleteTransaction,
    RenameMonth,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddEntry {
    kind: Kind,
    category: String,
    amount: Decimal,
}

impl AddEntry {
    pub fn new(kind: Kind, category: impl Into<String>, amount: Decimal) -> AddEntry {
        AddEntry {
            kind,
            category: category.into(),
            amount,
        }
    }
}

impl LedgerCommand for AddEntry {
    fn apply(&self, ledger: &mut Ledger) -> Result<(), LedgerError> {
        ledger.add_entry(self.kind, self.category.clone(), self.amount);

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEntry {
    kind: Kind,
    index: usize,
    category: String,
    amount: Decimal,
}

impl UpdateEntry {
    pub fn new(kind: Kind, index: usize, category: impl Into<String>, amount: Decimal) -> UpdateEntry {
        UpdateEntry {
            kind,
            index,
            category: category.into(),
            amount,
        }
    }
}

impl LedgerCommand for UpdateEntry {
    fn apply(&self, ledger: &mut Ledger) -> Result<(), LedgerError> {
        ledger.update_entry(self.kind, self.index, self.category.clone(), self.amount)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteEntry {
    kind: Kind,
    index: usize,
}

impl DeleteEntry {
    pub fn new(kind: Kind, index: usize) -> DeleteEntry {
        DeleteEntry { kind, index }
    }
}

impl LedgerCommand for DeleteEntry {
    fn apply(&self, ledger: &mut Ledger) -> Result<(), LedgerError> {
        ledger.delete_entry(self.kind, self.index).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordTransaction {
    date: NaiveDate,
    category: String,
    description: String,
    amount: Decimal,
    kind: Kind,
}

impl RecordTransaction {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        kind: Kind,
    ) -> RecordTransaction {
        RecordTransaction {
            date,
            category: category.into(),
            description: description.into(),
            amount,
            kind,
        }
    }
}

impl LedgerCommand for RecordTransaction {
    fn apply(&self, ledger: &mut Ledger) -> Result<(), LedgerError> {
        ledger.record_transaction(
            self.date,
            self.category.clone(),
            self.description.clone(),
            self.amount,
            self.kind,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTransaction {
    index: usize,
    date: NaiveDate,
    category: String,
    description: String,
    amount: Decimal,
    kind: Kind,
}

impl UpdateTransaction {
    pub fn new(
        index: usize,
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        kind: Kind,
    ) -> UpdateTransaction {
        UpdateTransaction {
            index,
            date,
            category: category.into(),
            description: description.into(),
            amount,
            kind,
        }
    }
}

impl LedgerCommand for UpdateTransaction {
    fn apply(&self, ledger: &mut Ledger) -> Result<(), LedgerError> {
        ledger.update_transaction(
            self.index,
            self.date,
            self.category.clone(),
            self.description.clone(),
            self.amount,
            self.kind,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTransaction {
    index: usize,
}

impl DeleteTransaction {
    pub fn new(index: usize) -> DeleteTransaction {
        DeleteTransaction { index }
    }
}

impl LedgerCommand for DeleteTransaction {
    fn apply(&self, ledger: &mut Ledger) -> Result<(), LedgerError> {
        ledger.delete_transaction(self.index).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameMonth {
    month: String,
}

impl RenameMonth {
    pub fn new(month: impl Into<String>) -> RenameMonth {
        RenameMonth { month: month.into() }
    }
}

impl LedgerCommand for RenameMonth {
    fn apply(&self, ledger: &mut Ledger) -> Result<(), LedgerError> {
        ledger.set_month(self.month.clone());

        Ok(())
    }
}
