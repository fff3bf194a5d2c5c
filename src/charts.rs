//! Data series for the charts page.
//!
//! The series are computed here so that clients only need to draw them.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error, UserID,
    budget::{AggregationMode, BudgetProgressRow, get_progress_rows},
    category::{CategoryGroup, normalize},
    db::lock_connection,
    extract::QueryParams,
    period::{Period, PeriodQuery},
    transaction::{Transaction, TransactionFilter, TransactionKind, list_transactions},
};

/// The number of months in the income vs. expense series.
pub const INCOME_VS_EXPENSE_MONTHS: u32 = 6;

/// Total expenses for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    /// The group the expenses were folded into.
    pub group: CategoryGroup,
    /// The sum of the group's expenses.
    pub amount: f64,
}

/// Total income and expenses for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    /// A short label such as "Jan 2025".
    pub label: String,
    /// The month number, 1 to 12.
    pub month: u8,
    /// The year.
    pub year: i32,
    /// Total income for the month.
    pub income: f64,
    /// Total expenses for the month.
    pub expense: f64,
}

/// Every series shown on the charts page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    /// The month the charts are for.
    pub period: Period,
    /// Expenses per group for `period`, largest first.
    pub expenses_by_group: Vec<GroupTotal>,
    /// Income and expenses for the six months ending with `period`.
    pub income_vs_expense: Vec<MonthTotals>,
    /// Budget progress for `period`, most urgent first.
    pub budget_progress: Vec<BudgetProgressRow>,
}

/// Sum the expenses dated within `period` per canonical group, largest first.
///
/// Groups with equal totals are kept in group order.
pub fn expenses_by_group(transactions: &[Transaction], period: Period) -> Vec<GroupTotal> {
    let mut totals: BTreeMap<CategoryGroup, f64> = BTreeMap::new();

    for transaction in transactions {
        if transaction.kind == TransactionKind::Expense && period.contains(transaction.date) {
            *totals
                .entry(normalize(transaction.category.as_ref()))
                .or_default() += transaction.amount;
        }
    }

    let mut group_totals: Vec<GroupTotal> = totals
        .into_iter()
        .map(|(group, amount)| GroupTotal { group, amount })
        .collect();
    group_totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    group_totals
}

/// Sum income and expenses for each of the `months` months ending with
/// `last`, oldest first.
///
/// Months with no transactions are included with zero totals.
pub fn income_vs_expense(
    transactions: &[Transaction],
    last: Period,
    months: u32,
) -> Vec<MonthTotals> {
    let mut buckets: Vec<(Period, MonthTotals)> = (0..months)
        .rev()
        .filter_map(|months_before| last.months_before(months_before))
        .map(|period| {
            let totals = MonthTotals {
                label: period.label(),
                month: period.month(),
                year: period.year(),
                income: 0.0,
                expense: 0.0,
            };
            (period, totals)
        })
        .collect();

    for transaction in transactions {
        let Some((_, totals)) = buckets
            .iter_mut()
            .find(|(period, _)| period.contains(transaction.date))
        else {
            continue;
        };

        match transaction.kind {
            TransactionKind::Income => totals.income += transaction.amount,
            TransactionKind::Expense => totals.expense += transaction.amount,
        }
    }

    buckets.into_iter().map(|(_, totals)| totals).collect()
}

/// The state needed for the charts endpoint.
#[derive(Debug, Clone)]
pub struct ChartsState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ChartsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the chart series for `?month=&year=`, defaulting to the current month.
pub async fn get_charts(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> Result<Json<Charts>, Error> {
    let period = query.resolve(&state.local_timezone)?;
    let first = period
        .months_before(INCOME_VS_EXPENSE_MONTHS - 1)
        .unwrap_or(period);
    let connection = lock_connection(&state.db_connection)?;

    let filter = TransactionFilter {
        from: Some(first.first_day()),
        to: Some(period.last_day()),
        kind: None,
    };
    let transactions = list_transactions(user_id, &filter, &connection)?;
    let budget_progress = get_progress_rows(
        user_id,
        period,
        AggregationMode::CanonicalGroup,
        &connection,
    )?;

    Ok(Json(Charts {
        period,
        expenses_by_group: expenses_by_group(&transactions, period),
        income_vs_expense: income_vs_expense(&transactions, period, INCOME_VS_EXPENSE_MONTHS),
        budget_progress,
    }))
}

#[cfg(test)]
mod chart_series_tests {
    use time::{Date, macros::date};

    use crate::{
        UserID,
        category::{CategoryGroup, CategoryName},
        period::Period,
        transaction::{Transaction, TransactionKind},
    };

    use super::{GroupTotal, expenses_by_group, income_vs_expense};

    fn transaction(kind: TransactionKind, category: &str, amount: f64, date: Date) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserID::new(1),
            kind,
            category: CategoryName::new_unchecked(category),
            amount,
            date,
        }
    }

    #[test]
    fn expenses_grouped_and_sorted_by_amount() {
        let transactions = vec![
            transaction(TransactionKind::Expense, "Uber", 30.0, date!(2025 - 01 - 03)),
            transaction(TransactionKind::Expense, "Zomato", 20.0, date!(2025 - 01 - 04)),
            transaction(TransactionKind::Expense, "Swiggy", 25.0, date!(2025 - 01 - 05)),
            transaction(TransactionKind::Expense, "Netflix", 30.0, date!(2025 - 01 - 06)),
            transaction(TransactionKind::Income, "Salary", 900.0, date!(2025 - 01 - 01)),
            transaction(TransactionKind::Expense, "Rent", 900.0, date!(2025 - 02 - 01)),
        ];

        let totals = expenses_by_group(&transactions, Period::new(1, 2025).unwrap());

        assert_eq!(
            totals,
            vec![
                GroupTotal {
                    group: CategoryGroup::Food,
                    amount: 45.0
                },
                GroupTotal {
                    group: CategoryGroup::Travel,
                    amount: 30.0
                },
                GroupTotal {
                    group: CategoryGroup::Entertainment,
                    amount: 30.0
                },
            ]
        );
    }

    #[test]
    fn six_months_oldest_first_across_year_boundary() {
        let transactions = vec![
            transaction(TransactionKind::Income, "Salary", 100.0, date!(2024 - 09 - 15)),
            transaction(TransactionKind::Expense, "Rent", 40.0, date!(2024 - 09 - 01)),
            transaction(TransactionKind::Expense, "Rent", 60.0, date!(2025 - 02 - 28)),
            transaction(TransactionKind::Income, "Salary", 999.0, date!(2024 - 08 - 31)),
        ];

        let series = income_vs_expense(&transactions, Period::new(2, 2025).unwrap(), 6);

        let labels: Vec<&str> = series.iter().map(|month| month.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Sep 2024", "Oct 2024", "Nov 2024", "Dec 2024", "Jan 2025", "Feb 2025"
            ]
        );
        assert_eq!(series[0].income, 100.0);
        assert_eq!(series[0].expense, 40.0);
        assert_eq!(series[5].expense, 60.0);
        assert_eq!(series[3].income, 0.0);
    }
}
