use enum_dispatch::enum_dispatch;
use serde::Serialize;
use thiserror::Error;

pub mod commands;
pub mod entry;
pub mod ledger;
pub mod transaction;


use commands::{
    AddEntry, Command, DeleteEntry, DeleteTransaction, RecordTransaction, RenameMonth, UpdateEntry, UpdateTransaction,
};
use ledger::Ledger;

#[derive(Debug, PartialEq, Error)]
pub enum LedgerError {
    #[error("{section} index {index} out of range (len {len})")]
    OutOfRange {
        section: &'static str,
        index: usize,
        len: usize,
    },
    #[error("invalid amount")]
    InvalidAmount,
}

/// Direction of money. Selects the entry sequence a transaction feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }

    pub fn section(&self) -> &'static str {
        match self {
            Kind::Income => "incomes",
            Kind::Expense => "expenses",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Kind::Income),
            "expense" => Ok(Kind::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

#[enum_dispatch]
pub trait LedgerCommand {
    fn apply(&self, ledger: &mut Ledger) -> Result<(), LedgerError>;
}
