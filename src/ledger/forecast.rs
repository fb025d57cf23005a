//! Monthly expense trend forecasting.
//!
//! Groups expenses by calendar month, fits an ordinary least squares line
//! against a zero-based month index, and projects the requested number of
//! future months. Needs at least two historical months to fit a trend.
use std::collections::BTreeMap;

use super::{Category, Transaction};

/// One projected month: label plus non-negative expense magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    /// Month label in `YYYY-MM` form.
    pub month: String,
    pub predicted: f64,
}

/// Forecast outcome. Too little history is an expected condition, not an
/// error, so it is a variant rather than a `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum Forecast {
    InsufficientData,
    Projection(Vec<ForecastPoint>),
}

/// Project expense totals `months` months beyond the last observed month.
///
/// Only negative-amount transactions contribute; `category` limits the fit
/// to one category, `None` fits overall spend. Predictions are clamped at
/// zero since a negative expense magnitude is meaningless.
pub fn forecast_expenses(
    transactions: &[Transaction],
    category: Option<Category>,
    months: usize,
) -> Forecast {
    // (year, month) -> absolute expense total, chronologically ordered
    let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        if let Some(cat) = category {
            if t.category != cat {
                continue;
            }
        }
        use chrono::Datelike;
        let key = (t.date.year(), t.date.month());
        *monthly.entry(key).or_insert(0.0) += t.amount.abs();
    }

    if monthly.len() < 2 {
        return Forecast::InsufficientData;
    }

    let totals: Vec<f64> = monthly.values().copied().collect();
    let (slope, intercept) = least_squares(&totals);

    let Some((&(last_year, last_month), _)) = monthly.iter().next_back() else {
        return Forecast::InsufficientData;
    };

    let n = totals.len();
    let mut points = Vec::with_capacity(months);
    let mut year = last_year;
    let mut month = last_month;
    for i in 0..months {
        (year, month) = next_month(year, month);
        let x = (n + i) as f64;
        let predicted = (slope * x + intercept).max(0.0);
        points.push(ForecastPoint {
            month: format!("{year:04}-{month:02}"),
            predicted,
        });
    }

    Forecast::Projection(points)
}

/// Ordinary least squares fit of `y` against indices `0..n`.
/// Returns `(slope, intercept)`.
fn least_squares(y: &[f64]) -> (f64, f64) {
    let n = y.len() as f64;
    let sum_x: f64 = (0..y.len()).map(|i| i as f64).sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = y.iter().enumerate().map(|(i, v)| i as f64 * v).sum();
    let sum_x2: f64 = (0..y.len()).map(|i| (i as f64).powi(2)).sum();

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return (0.0, sum_y / n);
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}
