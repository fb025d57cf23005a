//! Transaction ledger: CSV import, keyword categorization, and expense analytics.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod categorize;
pub mod forecast;
pub mod import;

/// Closed set of spending categories assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Shopping,
    Food,
    Income,
    Utilities,
    Entertainment,
    Others,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Shopping => "Shopping",
            Category::Food => "Food",
            Category::Income => "Income",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Others => "Others",
        };
        f.write_str(name)
    }
}

/// A single parsed ledger row. Created once during import, enriched once with
/// a category, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Signed amount with currency symbols and grouping commas stripped.
    /// Negative values are expenses.
    pub amount: f64,
    pub description: String,
    pub category: Category,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

/// Errors raised while importing a transaction file. All are propagated to
/// the caller; there is no partial-row recovery.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("row {row}: unparseable date {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: unparseable amount {value:?}")]
    InvalidAmount { row: usize, value: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Per-category absolute expense totals, sorted by descending spend.
///
/// Only negative-amount rows count; income rows are excluded.
pub fn category_summary(transactions: &[Transaction]) -> Vec<(Category, f64)> {
    use std::collections::BTreeMap;

    let mut totals: BTreeMap<Category, f64> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        *totals.entry(t.category).or_insert(0.0) += t.amount.abs();
    }

    let mut summary: Vec<(Category, f64)> = totals.into_iter().collect();
    summary.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    summary
}
