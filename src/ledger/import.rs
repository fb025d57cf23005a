//! CSV transaction import.
//!
//! Expects a header row with `Date`, `Amount`, and `Description` columns.
//! Amounts may carry currency symbols, grouping commas, or an explicit `+`
//! sign; all are stripped before parsing.
use std::io::Read;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::{Category, LedgerError, Transaction};

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[₹$€£,+\s]").unwrap());

/// Date formats accepted by bank exports seen in the wild.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Parse a tabular byte stream into transactions.
///
/// Fails on a missing required column or any unparseable date/amount cell;
/// rows are never silently dropped. Categories are left as `Others` until a
/// classifier runs.
pub fn load_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, LedgerError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let date_idx = column_index(&headers, "Date").ok_or(LedgerError::MissingColumn("Date"))?;
    let amount_idx =
        column_index(&headers, "Amount").ok_or(LedgerError::MissingColumn("Amount"))?;
    let desc_idx = column_index(&headers, "Description")
        .ok_or(LedgerError::MissingColumn("Description"))?;

    let mut transactions = Vec::new();
    for (row_num, record) in csv_reader.records().enumerate() {
        let record = record?;
        // Header is row 1, first data row is row 2
        let row = row_num + 2;

        let date_cell = record.get(date_idx).unwrap_or_default().trim();
        let date = parse_date(date_cell).ok_or_else(|| LedgerError::InvalidDate {
            row,
            value: date_cell.to_string(),
        })?;

        let amount_cell = record.get(amount_idx).unwrap_or_default().trim();
        let amount = parse_amount(amount_cell).ok_or_else(|| LedgerError::InvalidAmount {
            row,
            value: amount_cell.to_string(),
        })?;

        let description = record.get(desc_idx).unwrap_or_default().trim().to_string();

        transactions.push(Transaction {
            date,
            amount,
            description,
            category: Category::Others,
        });
    }

    Ok(transactions)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
}

/// Strip currency symbols, grouping commas, and explicit `+` signs, then
/// parse. `-` is not stripped, so expenses stay negative regardless of
/// whether the sign precedes or follows the currency symbol.
fn parse_amount(cell: &str) -> Option<f64> {
    let cleaned = CURRENCY_RE.replace_all(cell, "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Date,Amount,Description
2024-01-05,-1500,Amazon order
2024-01-10,\"₹-2,300.50\",Swiggy dinner
2024-02-01,+45000,Salary credit
";

    #[test]
    fn test_load_transactions() {
        let txns = load_transactions(SAMPLE.as_bytes()).unwrap();
        assert_eq!(txns.len(), 3);

        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(txns[0].amount, -1500.0);
        assert_eq!(txns[0].description, "Amazon order");

        // Currency symbol and grouping comma stripped, sign preserved
        assert!((txns[1].amount - (-2300.5)).abs() < 1e-9);

        // Explicit + marker stripped
        assert_eq!(txns[2].amount, 45000.0);
    }

    #[test]
    fn test_sign_survives_currency_prefix() {
        // Both symbol-before-sign and sign-before-symbol orderings occur in
        // real exports; the minus must survive either way.
        let data = "Date,Amount,Description\n\
                    2024-01-05,\"₹-2,300.50\",a\n\
                    2024-01-06,\"-₹2,300.50\",b\n\
                    2024-01-07,$-15.00,c\n";
        let txns = load_transactions(data.as_bytes()).unwrap();
        assert!((txns[0].amount - (-2300.5)).abs() < 1e-9);
        assert!((txns[1].amount - (-2300.5)).abs() < 1e-9);
        assert_eq!(txns[2].amount, -15.0);
        assert!(txns.iter().all(Transaction::is_expense));
    }

    #[test]
    fn test_missing_column_propagates() {
        let data = "Date,Value\n2024-01-05,10\n";
        let err = load_transactions(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LedgerError::MissingColumn("Amount")));
    }

    #[test]
    fn test_bad_date_propagates() {
        let data = "Date,Amount,Description\nnot-a-date,-10,x\n";
        let err = load_transactions(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDate { row: 2, .. }));
    }

    #[test]
    fn test_bad_amount_propagates() {
        let data = "Date,Amount,Description\n2024-01-05,ten,x\n";
        let err = load_transactions(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { row: 2, .. }));
    }

    #[test]
    fn test_alternate_date_formats() {
        let data = "Date,Amount,Description\n05/01/2024,-10,x\n";
        let txns = load_transactions(data.as_bytes()).unwrap();
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }
}
