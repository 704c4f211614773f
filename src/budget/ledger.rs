use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use getset::Getters;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::commands::Command;
use super::entry::{Entry, ExpenseEntry, IncomeEntry};
use super::transaction::Transaction;
use super::{Kind, LedgerCommand, LedgerError};

pub const DEFAULT_EXPENSE_CATEGORIES: [&str; 10] = [
    "Housing",
    "Utilities",
    "Groceries",
    "Transportation",
    "Health",
    "Entertainment",
    "Personal",
    "Debt",
    "Savings",
    "Other",
];

const WARNING_USAGE: Decimal = dec!(0.8);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Healthy,
    Warning,
    Exceeded,
}

impl UsageLevel {
    pub fn from_ratio(ratio: Decimal) -> UsageLevel {
        if ratio < WARNING_USAGE {
            UsageLevel::Healthy
        } else if ratio < Decimal::ONE {
            UsageLevel::Warning
        } else {
            UsageLevel::Exceeded
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownSlice<'a> {
    pub category: &'a str,
    pub amount: Decimal,
    pub share: Decimal,
}

/// One month of budget state: entries plus the transaction log.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Ledger {
    month: String,
    incomes: Vec<IncomeEntry>,
    expenses: Vec<ExpenseEntry>,
    transactions: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger::new()
    }
}

impl Ledger {
    /// Fresh ledger for the current month with the default expense categories.
    pub fn new() -> Ledger {
        Ledger::for_month(Local::now().format("%B %Y").to_string())
    }

    pub fn for_month(month: impl Into<String>) -> Ledger {
        Ledger {
            month: month.into(),
            incomes: Vec::new(),
            expenses: DEFAULT_EXPENSE_CATEGORIES
                .iter()
                .map(|category| Entry::new(*category, Decimal::ZERO))
                .collect(),
            transactions: Vec::new(),
        }
    }

    pub fn from_parts(
        month: impl Into<String>,
        incomes: Vec<IncomeEntry>,
        expenses: Vec<ExpenseEntry>,
        transactions: Vec<Transaction>,
    ) -> Ledger {
        Ledger {
            month: month.into(),
            incomes,
            expenses,
            transactions,
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<(), LedgerError> {
        debug!("executing {:?}", command);
        command.apply(self)
    }

    pub fn set_month(&mut self, month: impl Into<String>) {
        self.month = month.into();
    }

    pub fn entries(&self, kind: Kind) -> &[Entry] {
        match kind {
            Kind::Income => &self.incomes,
            Kind::Expense => &self.expenses,
        }
    }

    fn entries_mut(&mut self, kind: Kind) -> &mut Vec<Entry> {
        match kind {
            Kind::Income => &mut self.incomes,
            Kind::Expense => &mut self.expenses,
        }
    }

    /// Index of the first entry named `category`. Duplicates are never merged,
    /// so later entries with the same name are unreachable through this lookup.
    pub fn position(&self, kind: Kind, category: &str) -> Option<usize> {
        self.entries(kind).iter().position(|entry| entry.category() == category)
    }

    /// The caller is expected to have checked for a non-empty category and a
    /// non-negative amount.
    pub fn add_entry(&mut self, kind: Kind, category: impl Into<String>, amount: Decimal) {
        self.entries_mut(kind).push(Entry::new(category, amount));
    }

    pub fn update_entry(
        &mut self,
        kind: Kind,
        index: usize,
        category: impl Into<String>,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let entries = self.entries_mut(kind);
        let len = entries.len();
        let entry = entries.get_mut(index).ok_or(LedgerError::OutOfRange {
            section: kind.section(),
            index,
            len,
        })?;

        entry.replace(category, amount);

        Ok(())
    }

    pub fn delete_entry(&mut self, kind: Kind, index: usize) -> Result<Entry, LedgerError> {
        let entries = self.entries_mut(kind);
        if index >= entries.len() {
            return Err(LedgerError::OutOfRange {
                section: kind.section(),
                index,
                len: entries.len(),
            });
        }

        Ok(entries.remove(index))
    }

    /// Appends to the log, then credits the first entry of the matching kind
    /// with the same category. An unknown category leaves every entry as is.
    pub fn record_transaction(
        &mut self,
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        kind: Kind,
    ) -> Result<(), LedgerError> {
        let transaction = Transaction::new(date, category, description, amount, kind)?;

        match self.position(kind, transaction.category()) {
            Some(index) => self.entries_mut(kind)[index].credit(*transaction.amount()),
            None => warn!(
                "no {} category named '{}', totals left unchanged",
                kind.section(),
                transaction.category()
            ),
        }

        self.transactions.push(transaction);

        Ok(())
    }

    /// Replaces the transaction at `index`. Entry amounts credited when it was
    /// recorded are not touched.
    pub fn update_transaction(
        &mut self,
        index: usize,
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        kind: Kind,
    ) -> Result<(), LedgerError> {
        let len = self.transactions.len();
        if index >= len {
            return Err(LedgerError::OutOfRange {
                section: "transactions",
                index,
                len,
            });
        }

        self.transactions[index] = Transaction::new(date, category, description, amount, kind)?;

        Ok(())
    }

    /// Removes the transaction at `index`. Entry amounts are not touched.
    pub fn delete_transaction(&mut self, index: usize) -> Result<Transaction, LedgerError> {
        let len = self.transactions.len();
        if index >= len {
            return Err(LedgerError::OutOfRange {
                section: "transactions",
                index,
                len,
            });
        }

        Ok(self.transactions.remove(index))
    }

    pub fn total(&self, kind: Kind) -> Decimal {
        self.entries(kind).iter().map(|entry| *entry.amount()).sum()
    }

    pub fn totals(&self) -> Totals {
        let income = self.total(Kind::Income);
        let expenses = self.total(Kind::Expense);

        Totals {
            income,
            expenses,
            net: income - expenses,
        }
    }

    /// Share of income already spent, capped at 1. `None` without income.
    pub fn usage(&self) -> Option<Decimal> {
        let totals = self.totals();
        if totals.income <= Decimal::ZERO {
            return None;
        }

        Some((totals.expenses / totals.income).min(Decimal::ONE))
    }

    pub fn expense_breakdown(&self) -> Vec<BreakdownSlice<'_>> {
        let total = self.total(Kind::Expense);
        if total <= Decimal::ZERO {
            return Vec::new();
        }

        self.expenses
            .iter()
            .filter(|entry| !entry.amount().is_zero())
            .map(|entry| BreakdownSlice {
                category: entry.category(),
                amount: *entry.amount(),
                share: *entry.amount() / total,
            })
            .collect()
    }

    /// Transactions bucketed by date, newest date first. Within a date the log
    /// order is kept. Each call collects the current log into groups once and
    /// yields them from that snapshot.
    pub fn group_transactions_by_date(&self) -> impl Iterator<Item = (NaiveDate, Vec<&Transaction>)> + '_ {
        let mut groups: BTreeMap<NaiveDate, Vec<&Transaction>> = BTreeMap::new();
        for transaction in &self.transactions {
            groups.entry(*transaction.date()).or_default().push(transaction);
        }

        groups.into_iter().rev()
    }
}
