use rust_decimal::Decimal;

/// A monthly spending limit for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    pub category: String,
    pub monthly_limit: Decimal,
}

impl Goal {
    pub fn new(category: String, monthly_limit: Decimal) -> Self {
        Self {
            category,
            monthly_limit,
        }
    }

    /// Find a goal by category (case-insensitive) in a slice.
    pub fn find_by_category<'a>(goals: &'a [Goal], category: &str) -> Option<&'a Goal> {
        let lower = category.to_lowercase();
        goals.iter().find(|g| g.category.to_lowercase() == lower)
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.2})", self.category, self.monthly_limit)
    }
}
