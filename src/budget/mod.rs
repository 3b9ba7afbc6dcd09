use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percent of a goal at which a category is flagged as near its limit.
pub(crate) const NEAR_LIMIT_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
/// Percent of a goal at which a category is flagged as exceeded.
pub(crate) const EXCEEDED_PERCENT: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tier {
    Ok,
    NearLimit,
    Exceeded,
}

impl Tier {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NearLimit => "near-limit",
            Self::Exceeded => "exceeded",
        }
    }

    pub(crate) fn classify(percent: Decimal) -> Self {
        if percent >= EXCEEDED_PERCENT {
            Self::Exceeded
        } else if percent >= NEAR_LIMIT_PERCENT {
            Self::NearLimit
        } else {
            Self::Ok
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do with a goal whose category has no recorded spend in the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ZeroSpendPolicy {
    /// List it with spent = 0 (tier ok).
    #[default]
    Report,
    /// Leave it out of the evaluation.
    Omit,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GoalStatus {
    pub(crate) category: String,
    pub(crate) spent: Decimal,
    pub(crate) limit: Decimal,
    pub(crate) percent: Decimal,
    pub(crate) tier: Tier,
}

impl GoalStatus {
    /// Amount left before the limit is reached; negative once exceeded.
    pub(crate) fn remaining(&self) -> Decimal {
        self.limit - self.spent
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Evaluation {
    /// One row per evaluated goal, ordered by category name.
    pub(crate) statuses: Vec<GoalStatus>,
    pub(crate) exceeded: Vec<String>,
    pub(crate) near_limit: Vec<String>,
}

impl Evaluation {
    pub(crate) fn has_alerts(&self) -> bool {
        !self.exceeded.is_empty() || !self.near_limit.is_empty()
    }
}

/// `spent / limit * 100`, or zero when the limit is not positive.
pub(crate) fn percent_of(spent: Decimal, limit: Decimal) -> Decimal {
    if limit <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    spent
        .checked_div(limit)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}

/// Compare per-category spend against goals.
///
/// Only categories with a goal are evaluated; spend in categories without a
/// goal is ignored. Goal categories with nothing spent follow `zero_spend`.
pub(crate) fn evaluate(
    category_totals: &BTreeMap<String, Decimal>,
    goals: &BTreeMap<String, Decimal>,
    zero_spend: ZeroSpendPolicy,
) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for (category, &limit) in goals {
        let spent = category_totals
            .get(category)
            .copied()
            .unwrap_or(Decimal::ZERO);

        if spent.is_zero() && zero_spend == ZeroSpendPolicy::Omit {
            continue;
        }

        let percent = percent_of(spent, limit);
        let tier = Tier::classify(percent);
        match tier {
            Tier::Exceeded => evaluation.exceeded.push(category.clone()),
            Tier::NearLimit => evaluation.near_limit.push(category.clone()),
            Tier::Ok => {}
        }

        evaluation.statuses.push(GoalStatus {
            category: category.clone(),
            spent,
            limit,
            percent,
            tier,
        });
    }

    debug!(
        "Evaluated {} goals: {} exceeded, {} near limit",
        evaluation.statuses.len(),
        evaluation.exceeded.len(),
        evaluation.near_limit.len()
    );
    evaluation
}
