//! The single pass reduction from transaction records to an [AnalyticsSummary].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{analytics::MonthKey, transaction::TransactionRecord};

const REVENUE: &str = "revenue";
const EXPENSE: &str = "expense";

/// The revenue and expense totals for a single month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    /// Sum of the revenue transactions in the month.
    pub revenue: f64,
    /// Sum of the expense transactions in the month.
    pub expense: f64,
}

/// Aggregate figures for a set of transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    /// Sum of the amounts of transactions categorised as revenue (any casing).
    pub total_revenue: f64,
    /// Sum of the amounts of transactions categorised as expense (any casing).
    pub total_expense: f64,
    /// `total_revenue - total_expense`.
    pub net: f64,
    /// Sum of amounts for each category, keyed by the category exactly as stored.
    pub category_breakdown: BTreeMap<String, f64>,
    /// Revenue and expense totals for each month that has at least one transaction.
    pub monthly_trend: BTreeMap<MonthKey, MonthlyTotals>,
}

/// Summarise `records` into revenue and expense totals, a per category
/// breakdown and a monthly trend.
///
/// Revenue and expense are recognised case-insensitively, so "Revenue" and
/// "revenue" both count towards `total_revenue`. The category breakdown,
/// however, is keyed by the raw category string, so the same two records show
/// up under two separate keys. Existing clients rely on this, so keep it.
///
/// Every record gets an entry for its month in the trend, even when its
/// category is neither revenue nor expense. Such records still count towards
/// the breakdown but not the totals.
///
/// Dates are not validated here; run [crate::validate_records] first.
pub fn summarize(records: &[TransactionRecord]) -> AnalyticsSummary {
    let mut total_revenue = 0.0;
    let mut total_expense = 0.0;
    let mut category_breakdown: BTreeMap<String, f64> = BTreeMap::new();
    let mut monthly_trend: BTreeMap<MonthKey, MonthlyTotals> = BTreeMap::new();

    for record in records {
        let month = monthly_trend
            .entry(MonthKey::from_date_unchecked(&record.date))
            .or_default();

        let category = record.category.to_lowercase();

        if category == REVENUE {
            total_revenue += record.amount;
            month.revenue += record.amount;
        } else if category == EXPENSE {
            total_expense += record.amount;
            month.expense += record.amount;
        }

        *category_breakdown
            .entry(record.category.clone())
            .or_insert(0.0) += record.amount;
    }

    AnalyticsSummary {
        total_revenue,
        total_expense,
        net: total_revenue - total_expense,
        category_breakdown,
        monthly_trend,
    }
}
