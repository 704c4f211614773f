use getset::Getters;
use rust_decimal::Decimal;

pub const PRECISION: u32 = 4;

/// A named income source or expense category with its accumulated amount.
#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct Entry {
    category: String,
    amount: Decimal,
}

pub type IncomeEntry = Entry;
pub type ExpenseEntry = Entry;

impl Entry {
    pub fn new(category: impl Into<String>, amount: Decimal) -> Entry {
        Entry {
            category: category.into(),
            amount: amount.round_dp(PRECISION),
        }
    }

    pub fn credit(&mut self, amount: Decimal) {
        self.amount = (self.amount + amount).round_dp(PRECISION);
    }

    pub fn replace(&mut self, category: impl Into<String>, amount: Decimal) {
        self.category = category.into();
        self.amount = amount.round_dp(PRECISION);
    }
}
