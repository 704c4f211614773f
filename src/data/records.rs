use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::budget::entry::Entry;
use crate::budget::transaction::Transaction;
use crate::budget::Kind;

pub const ENTRY_HEADERS: [&str; 2] = ["Category", "Amount"];
pub const TRANSACTION_HEADERS: [&str; 5] = ["Date", "Category", "Description", "Amount", "Type"];

#[derive(Debug, Serialize)]
pub struct EntryRecord<'a> {
    #[serde(rename = "Category")]
    pub category: &'a str,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TransactionRecord<'a> {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Category")]
    pub category: &'a str,
    #[serde(rename = "Description")]
    pub description: &'a str,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    #[serde(rename = "Type")]
    pub kind: Kind,
}

impl<'a> From<&'a Entry> for EntryRecord<'a> {
    fn from(entry: &'a Entry) -> Self {
        EntryRecord {
            category: entry.category(),
            amount: *entry.amount(),
        }
    }
}

impl<'a> From<&'a Transaction> for TransactionRecord<'a> {
    fn from(transaction: &'a Transaction) -> Self {
        TransactionRecord {
            date: *transaction.date(),
            category: transaction.category(),
            description: transaction.description(),
            amount: *transaction.amount(),
            kind: *transaction.kind(),
        }
    }
}
