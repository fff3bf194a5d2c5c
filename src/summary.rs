//! The monthly summary: totals, the biggest spending and how budgets are tracking.

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
use time::Date;

use crate::{
    AppState, Error, UserID,
    budget::{AggregationMode, BudgetProgressRow, Status, get_progress_rows},
    category::{CategoryGroup, CategoryName, normalize},
    db::lock_connection,
    extract::QueryParams,
    period::{Period, PeriodQuery},
    transaction::{Transaction, TransactionFilter, TransactionKind, list_transactions},
};

/// The single largest expense in a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiggestExpense {
    /// The category as entered by the user.
    pub category: CategoryName,
    /// The amount spent.
    pub amount: f64,
    /// The day of the expense.
    #[serde(with = "crate::date_format")]
    pub date: Date,
}

/// How many budgets are in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Budgets under 80% of their limit.
    pub safe: usize,
    /// Budgets at 80% of their limit or more.
    pub warning: usize,
    /// Budgets at or over their limit.
    pub exceeded: usize,
}

/// A summary of one month of the user's finances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    /// The month being summarised.
    pub period: Period,
    /// Total income.
    pub income: f64,
    /// Total expenses.
    pub expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// The group with the most spending.
    pub top_category: Option<CategoryGroup>,
    /// The largest single expense.
    pub biggest_expense: Option<BiggestExpense>,
    /// The share of income not spent, as a percentage. Not set without income.
    pub savings_rate: Option<f64>,
    /// The number of budgets in each status.
    pub budget_status: StatusCounts,
}

/// Summarise the transactions dated within `period`.
///
/// `progress` should be the budget progress rows for the same period.
pub fn summarize(
    transactions: &[Transaction],
    progress: &[BudgetProgressRow],
    period: Period,
) -> MonthlySummary {
    let mut income = 0.0;
    let mut expense = 0.0;
    let mut group_totals: BTreeMap<CategoryGroup, f64> = BTreeMap::new();
    let mut biggest_expense: Option<&Transaction> = None;

    for transaction in transactions
        .iter()
        .filter(|transaction| period.contains(transaction.date))
    {
        match transaction.kind {
            TransactionKind::Income => income += transaction.amount,
            TransactionKind::Expense => {
                expense += transaction.amount;
                *group_totals
                    .entry(normalize(transaction.category.as_ref()))
                    .or_default() += transaction.amount;

                if biggest_expense.is_none_or(|biggest| transaction.amount > biggest.amount) {
                    biggest_expense = Some(transaction);
                }
            }
        }
    }

    // Strictly greater, so ties go to the group listed first.
    let mut top_category: Option<(CategoryGroup, f64)> = None;
    for (group, total) in group_totals {
        if top_category.is_none_or(|(_, top_total)| total > top_total) {
            top_category = Some((group, total));
        }
    }

    let savings_rate = (income > 0.0).then(|| (income - expense) / income * 100.0);

    let mut budget_status = StatusCounts::default();
    for row in progress {
        match row.status {
            Status::Safe => budget_status.safe += 1,
            Status::Warning => budget_status.warning += 1,
            Status::Exceeded => budget_status.exceeded += 1,
            Status::NoLimit => {}
        }
    }

    MonthlySummary {
        period,
        income,
        expense,
        balance: income - expense,
        top_category: top_category.map(|(group, _)| group),
        biggest_expense: biggest_expense.map(|transaction| BiggestExpense {
            category: transaction.category.clone(),
            amount: transaction.amount,
            date: transaction.date,
        }),
        savings_rate,
        budget_status,
    }
}

/// The state needed for the summary endpoint.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the summary for `?month=&year=`, defaulting to the current month.
pub async fn get_summary(
    State(state): State<SummaryState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> Result<Json<MonthlySummary>, Error> {
    let period = query.resolve(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let filter = TransactionFilter {
        from: Some(period.first_day()),
        to: Some(period.last_day()),
        kind: None,
    };
    let transactions = list_transactions(user_id, &filter, &connection)?;
    let progress = get_progress_rows(
        user_id,
        period,
        AggregationMode::CanonicalGroup,
        &connection,
    )?;

    Ok(Json(summarize(&transactions, &progress, period)))
}


#[cfg(test)]
mod summary_endpoint_tests {
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{get_test_server, sign_up},
    };

    #[tokio::test]
    async fn summarizes_requested_month() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;
        for body in [
            json!({ "type": "income", "category": "Salary", "amount": 1000, "date": "2025-03-01" }),
            json!({ "type": "expense", "category": "Zomato", "amount": 250, "date": "2025-03-10" }),
        ] {
            server
                .post(endpoints::TRANSACTIONS)
                .add_cookie(cookie.clone())
                .json(&body)
                .await
                .assert_status(axum::http::StatusCode::CREATED);
        }

        let response = server
            .get(endpoints::SUMMARY)
            .add_cookie(cookie)
            .add_query_param("month", 3)
            .add_query_param("year", 2025)
            .await;

        response.assert_status_ok();
        let summary: Value = response.json();
        assert_eq!(summary["period"], json!({ "month": 3, "year": 2025 }));
        assert_eq!(summary["balance"], 750.0);
        assert_eq!(summary["savings_rate"], 75.0);
        assert_eq!(summary["top_category"], "Food");
        assert_eq!(summary["biggest_expense"]["category"], "Zomato");
    }
}
