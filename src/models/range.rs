use chrono::{Datelike, Local, Months, NaiveDate};

/// Inclusive calendar date range used to filter transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, swapping the bounds if they were given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(start);
        Self { start, end }
    }

    pub fn current_month() -> Self {
        Self::month_of(Local::now().date_naive())
    }

    /// Parse `YYYY-MM` into the full calendar month.
    pub fn parse_month(s: &str) -> Option<Self> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()?;
        Some(Self::month_of(first))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The full month `delta` months away from the month the range starts in.
    pub fn shift_months(&self, delta: i32) -> Option<Self> {
        let first = self.start.with_day(1)?;
        let moved = if delta >= 0 {
            first.checked_add_months(Months::new(delta.unsigned_abs()))
        } else {
            first.checked_sub_months(Months::new(delta.unsigned_abs()))
        }?;
        Some(Self::month_of(moved))
    }

    pub fn is_single_month(&self) -> bool {
        *self == Self::month_of(self.start)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single_month() {
            write!(f, "{}", self.start.format("%Y-%m"))
        } else {
            write!(
                f,
                "{} .. {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        }
    }
}
