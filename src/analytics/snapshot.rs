use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::{category_totals, daily_totals, filter_by_range, indicators, Indicators};
use crate::budget::{evaluate, Evaluation, ZeroSpendPolicy};
use crate::db::Database;
use crate::models::{DateRange, Transaction};

/// Everything derived from one date range: the rows, their aggregates and
/// the goal evaluation. Rebuilt from scratch on every refresh.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub(crate) range: DateRange,
    pub(crate) transactions: Vec<Transaction>,
    /// Rows stored without a date. Listed so they can be found and deleted,
    /// never part of the totals.
    pub(crate) undated: Vec<Transaction>,
    pub(crate) totals: BTreeMap<String, Decimal>,
    pub(crate) indicators: Indicators,
    pub(crate) daily: Vec<(NaiveDate, Decimal)>,
    pub(crate) evaluation: Evaluation,
}

impl Snapshot {
    pub(crate) fn build(
        range: DateRange,
        transactions: &[Transaction],
        goals: &BTreeMap<String, Decimal>,
        zero_spend: ZeroSpendPolicy,
    ) -> Self {
        let undated = transactions
            .iter()
            .filter(|t| t.date.is_none())
            .cloned()
            .collect();
        let transactions = filter_by_range(transactions, &range);
        let totals = category_totals(&transactions);
        let evaluation = evaluate(&totals, goals, zero_spend);
        Self {
            range,
            indicators: indicators(&transactions),
            daily: daily_totals(&transactions),
            totals,
            evaluation,
            transactions,
            undated,
        }
    }

    /// Dated rows in the range followed by the undated ones.
    pub(crate) fn listed(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().chain(&self.undated)
    }

    pub(crate) fn listed_len(&self) -> usize {
        self.transactions.len() + self.undated.len()
    }

    pub(crate) fn load(db: &Database, range: DateRange, zero_spend: ZeroSpendPolicy) -> Result<Self> {
        let mut transactions = db.get_transactions(Some(&range))?;
        transactions.extend(db.get_undated_transactions()?);
        let goals = db.load_goals()?;
        Ok(Self::build(range, &transactions, &goals, zero_spend))
    }

    pub(crate) fn empty(range: DateRange) -> Self {
        Self::build(range, &[], &BTreeMap::new(), ZeroSpendPolicy::default())
    }
}
