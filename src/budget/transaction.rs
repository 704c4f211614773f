use chrono::NaiveDate;
use getset::Getters;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::entry::PRECISION;
use super::{Kind, LedgerError};

/// A single dated movement of money. The description may be empty.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Transaction {
    date: NaiveDate,
    category: String,
    description: String,
    amount: Decimal,
    kind: Kind,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        kind: Kind,
    ) -> Result<Transaction, LedgerError> {
        if amount <= dec!(0) {
            return Err(LedgerError::InvalidAmount);
        }

        Ok(Transaction {
            date,
            category: category.into(),
            description: description.into(),
            amount: amount.round_dp(PRECISION),
            kind,
        })
    }
}
