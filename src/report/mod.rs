mod mail;

use rust_decimal::Decimal;
use std::fmt;

use crate::analytics;
use crate::budget::{Evaluation, Tier};
use crate::models::{DateRange, Transaction};
use crate::ui::util::{format_amount, format_percent, truncate};

pub(crate) use mail::{send_report, SmtpMailer};

const RULE_WIDTH: usize = 64;

pub(crate) fn report_subject(range: &DateRange) -> String {
    format!("Expense report {range}")
}

/// Plain-text expense report over `txns`, followed by the goal check.
pub(crate) fn render_report(
    range: &DateRange,
    txns: &[Transaction],
    evaluation: &Evaluation,
    currency: &str,
) -> String {
    Report {
        range,
        txns,
        evaluation,
        currency,
    }
    .to_string()
}

struct Report<'a> {
    range: &'a DateRange,
    txns: &'a [Transaction],
    evaluation: &'a Evaluation,
    currency: &'a str,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Expense report")?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "Period: {} to {}", self.range.start, self.range.end)?;
        writeln!(f)?;
        self.write_transactions(f)?;
        self.write_totals(f)?;
        self.write_goals(f)
    }
}

impl Report<'_> {
    fn amount(&self, amount: Decimal) -> String {
        format_amount(amount, self.currency)
    }

    fn write_transactions(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.txns.is_empty() {
            return writeln!(f, "No transactions in this period.");
        }
        writeln!(
            f,
            "{:<10}  {:<14}  {:<22}  {:>12}",
            "Date", "Category", "Description", "Amount"
        )?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        for txn in self.txns {
            let amount = txn
                .amount
                .map(|a| self.amount(a))
                .unwrap_or_else(|| "n/a".into());
            writeln!(
                f,
                "{:<10}  {:<14}  {:<22}  {:>12}",
                txn.date_label(),
                truncate(&txn.category, 14),
                truncate(&txn.description, 22),
                amount
            )?;
        }
        Ok(())
    }

    fn write_totals(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ind = analytics::indicators(self.txns);
        writeln!(f)?;
        writeln!(f, "Total spent:      {}", self.amount(ind.total))?;
        writeln!(f, "Transactions:     {}", self.txns.len())?;
        writeln!(f, "Average expense:  {}", self.amount(ind.mean))?;
        if let Some((name, amount)) = &ind.top_category {
            writeln!(f, "Top category:     {name} ({})", self.amount(*amount))?;
        }
        let skipped = self.txns.len() - ind.counted;
        if skipped > 0 {
            writeln!(f, "Without amount:   {skipped} (not counted)")?;
        }

        let totals = analytics::category_totals(self.txns);
        if totals.is_empty() {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(f, "By category")?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        for (category, amount) in &totals {
            writeln!(
                f,
                "  {:<24}  {:>12}",
                truncate(category, 24),
                self.amount(*amount)
            )?;
        }
        Ok(())
    }

    fn write_goals(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let eval = self.evaluation;
        writeln!(f)?;
        writeln!(f, "Goals")?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        if eval.statuses.is_empty() {
            writeln!(f, "  No goals set.")?;
        }
        for status in &eval.statuses {
            writeln!(
                f,
                "  {:<12}  {:<20}  {:>12} of {:>12}  {:>7}",
                tier_marker(status.tier),
                truncate(&status.category, 20),
                self.amount(status.spent),
                self.amount(status.limit),
                format_percent(status.percent)
            )?;
        }

        if !eval.exceeded.is_empty() {
            writeln!(f)?;
            writeln!(f, "WARNING: goal exceeded in {}", eval.exceeded.join(", "))?;
        }
        if !eval.near_limit.is_empty() {
            if eval.exceeded.is_empty() {
                writeln!(f)?;
            }
            writeln!(f, "Attention: near the goal in {}", eval.near_limit.join(", "))?;
        }
        Ok(())
    }
}

fn tier_marker(tier: Tier) -> &'static str {
    match tier {
        Tier::Ok => "[ok]",
        Tier::NearLimit => "[near-limit]",
        Tier::Exceeded => "[EXCEEDED]",
    }
}
