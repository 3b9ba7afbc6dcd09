use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{DateRange, Transaction};

mod snapshot;

pub(crate) use snapshot::Snapshot;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Indicators {
    pub(crate) total: Decimal,
    /// Mean over transactions that have an amount.
    pub(crate) mean: Decimal,
    pub(crate) counted: usize,
    pub(crate) top_category: Option<(String, Decimal)>,
}

/// Transactions dated inside `range`. Undated rows never match.
pub(crate) fn filter_by_range(txns: &[Transaction], range: &DateRange) -> Vec<Transaction> {
    txns.iter()
        .filter(|t| t.date.is_some_and(|d| range.contains(d)))
        .cloned()
        .collect()
}

/// Sum of amounts grouped by category. Rows without an amount contribute
/// nothing, not even an empty group.
pub(crate) fn category_totals(txns: &[Transaction]) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for txn in txns {
        if let Some(amount) = txn.amount {
            *totals.entry(txn.category.clone()).or_default() += amount;
        }
    }
    totals
}

pub(crate) fn indicators(txns: &[Transaction]) -> Indicators {
    let amounts: Vec<Decimal> = txns.iter().filter_map(|t| t.amount).collect();
    let total: Decimal = amounts.iter().sum();
    let counted = amounts.len();
    let mean = if counted == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(counted)
    };

    // Ties keep the alphabetically first category.
    let top_category = category_totals(txns)
        .into_iter()
        .fold(None, |best: Option<(String, Decimal)>, (name, amt)| match best {
            Some((_, best_amt)) if best_amt >= amt => best,
            _ => Some((name, amt)),
        });

    Indicators {
        total,
        mean,
        counted,
        top_category,
    }
}

/// Spend per calendar day, oldest first.
pub(crate) fn daily_totals(txns: &[Transaction]) -> Vec<(NaiveDate, Decimal)> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for txn in txns {
        if let (Some(date), Some(amount)) = (txn.date, txn.amount) {
            *days.entry(date).or_default() += amount;
        }
    }
    days.into_iter().collect()
}

/// The range shown when the user has not picked one: the whole ledger span,
/// or the current month for an empty ledger.
pub(crate) fn default_range(span: Option<DateRange>) -> DateRange {
    span.unwrap_or_else(DateRange::current_month)
}
