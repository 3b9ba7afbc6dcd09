use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<i64>,
    /// `None` when the source value could not be read as a calendar date.
    pub date: Option<NaiveDate>,
    pub category: String,
    pub description: String,
    /// `None` when the source value was missing, unparseable or negative.
    pub amount: Option<Decimal>,
    pub import_hash: String,
    pub created_at: String,
}

impl Transaction {
    /// A manually entered expense. Manual entries never carry an import hash.
    pub fn new(date: NaiveDate, category: String, description: String, amount: Decimal) -> Self {
        Self {
            id: None,
            date: Some(date),
            category,
            description,
            amount: Some(amount),
            import_hash: String::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Amount counted towards totals. Missing amounts count as nothing.
    pub fn counted_amount(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    pub fn is_complete(&self) -> bool {
        self.date.is_some() && self.amount.is_some()
    }

    pub fn date_label(&self) -> String {
        self.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "—".into())
    }
}
