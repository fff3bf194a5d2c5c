//! Budget progress: how much of each monthly limit has been spent.
//!
//! Expenses and budgets are folded onto a common category key, either the
//! canonical group from [crate::category::normalize] or the raw category
//! text. Each key with a positive limit becomes one [BudgetProgressRow].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    budget::Budget,
    category::{CategoryGroup, normalize},
    period::Period,
    transaction::{Transaction, TransactionKind},
};

/// The percentage of a limit at which a budget becomes a warning.
pub const WARNING_PERCENT: f64 = 80.0;
/// The percentage of a limit at which a budget is exceeded.
pub const EXCEEDED_PERCENT: f64 = 100.0;

/// How close spending is to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// At or over 100% of the limit.
    Exceeded,
    /// At or over 80% of the limit.
    Warning,
    /// Under 80% of the limit.
    Safe,
    /// The limit is zero, so no percentage can be computed.
    NoLimit,
}

impl Status {
    /// Lower is more urgent. Rows are sorted by this value.
    pub fn severity(&self) -> u8 {
        match self {
            Status::Exceeded => 0,
            Status::Warning => 1,
            Status::Safe => 2,
            Status::NoLimit => 3,
        }
    }
}

/// Classify spending against a limit.
///
/// A limit of zero or less has no meaningful percentage and is
/// [Status::NoLimit].
pub fn classify(spent: f64, limit: f64) -> Status {
    if limit <= 0.0 {
        return Status::NoLimit;
    }

    let percent = spent / limit * 100.0;

    if percent >= EXCEEDED_PERCENT {
        Status::Exceeded
    } else if percent >= WARNING_PERCENT {
        Status::Warning
    } else {
        Status::Safe
    }
}

/// How transactions and budgets are matched up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationMode {
    /// Fold categories into canonical groups, so "Zomato" counts towards a
    /// "Food" budget.
    #[default]
    #[serde(rename = "group")]
    CanonicalGroup,
    /// Match categories by their exact (trimmed) text.
    #[serde(rename = "raw")]
    RawCategory,
}

/// The spending for one category against its limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgressRow {
    /// The group name, or the raw category in [AggregationMode::RawCategory].
    pub category: String,
    /// The sum of the limits of every budget with this key.
    pub limit: f64,
    /// The sum of the expenses with this key.
    pub spent: f64,
    /// `spent` as a percentage of `limit`.
    pub percent: f64,
    /// How close `spent` is to `limit`.
    pub status: Status,
}

/// The key that expenses and budgets are summed under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum CategoryKey {
    Group(CategoryGroup),
    Raw(String),
}

impl CategoryKey {
    fn new(raw_category: &str, mode: AggregationMode) -> Self {
        match mode {
            AggregationMode::CanonicalGroup => CategoryKey::Group(normalize(raw_category)),
            AggregationMode::RawCategory => match raw_category.trim() {
                "" => CategoryKey::Group(CategoryGroup::Other),
                text => CategoryKey::Raw(text.to_owned()),
            },
        }
    }

    /// Like [CategoryKey::new], except that in [AggregationMode::CanonicalGroup]
    /// a budget named after a group counts towards that group.
    fn for_budget(raw_category: &str, mode: AggregationMode) -> Self {
        match (mode, CategoryGroup::from_name(raw_category)) {
            (AggregationMode::CanonicalGroup, Some(group)) => CategoryKey::Group(group),
            _ => CategoryKey::new(raw_category, mode),
        }
    }

    fn label(&self) -> String {
        match self {
            CategoryKey::Group(group) => group.to_string(),
            CategoryKey::Raw(text) => text.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct Totals {
    spent: f64,
    limit: f64,
}

/// Compute budget progress for `period` with categories folded into
/// canonical groups.
///
/// See [aggregate_with_mode].
pub fn aggregate(
    transactions: &[Transaction],
    budgets: &[Budget],
    period: Period,
) -> Vec<BudgetProgressRow> {
    aggregate_with_mode(transactions, budgets, period, AggregationMode::CanonicalGroup)
}

/// Compute budget progress for `period`.
///
/// Transactions dated outside `period` and budgets for other months are
/// ignored, as is income. Expenses and limits are summed per category key.
/// Keys without a positive limit are dropped, so a budget of zero never
/// shows up and spending without a budget is not reported.
///
/// Rows are ordered by status (exceeded, then warning, then safe), then by
/// percent from highest to lowest, then by category.
pub fn aggregate_with_mode(
    transactions: &[Transaction],
    budgets: &[Budget],
    period: Period,
    mode: AggregationMode,
) -> Vec<BudgetProgressRow> {
    let mut totals: BTreeMap<CategoryKey, Totals> = BTreeMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense || !period.contains(transaction.date) {
            continue;
        }

        let key = CategoryKey::new(transaction.category.as_ref(), mode);
        totals.entry(key).or_default().spent += transaction.amount;
    }

    for budget in budgets {
        if budget.month != period.month() || budget.year != period.year() {
            continue;
        }

        let key = CategoryKey::for_budget(budget.category.as_ref(), mode);
        totals.entry(key).or_default().limit += budget.limit;
    }

    let mut rows: Vec<BudgetProgressRow> = totals
        .into_iter()
        .filter(|(_, totals)| totals.limit > 0.0)
        .map(|(key, Totals { spent, limit })| BudgetProgressRow {
            category: key.label(),
            limit,
            spent,
            percent: spent / limit * 100.0,
            status: classify(spent, limit),
        })
        .collect();

    rows.sort_by(|a, b| {
        a.status
            .severity()
            .cmp(&b.status.severity())
            .then_with(|| b.percent.total_cmp(&a.percent))
            .then_with(|| a.category.cmp(&b.category))
    });

    rows
}
