//! The JSON endpoints for budgets and budget progress.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, UserID,
    budget::{
        AggregationMode, Budget, BudgetData, BudgetId, BudgetProgressRow, NewBudget,
        aggregate_with_mode, delete_budget, list_budgets, upsert_budget,
    },
    db::lock_connection,
    extract::{JsonBody, PathParams, QueryParams},
    period::{Period, PeriodQuery},
    transaction::{TransactionFilter, TransactionKind, list_transactions},
};

/// The state needed by the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's budgets, optionally only for `?month=` and `?year=`.
pub async fn get_budgets(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<PeriodQuery>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_budgets(user_id, query.month, query.year, &connection).map(Json)
}

/// Create a budget, or replace the limit of the user's existing budget for
/// the same category and month.
pub async fn upsert_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<BudgetData>,
) -> Result<impl IntoResponse, Error> {
    let new_budget = NewBudget::try_from(data)?;
    let connection = lock_connection(&state.db_connection)?;

    let budget = upsert_budget(user_id, new_budget, &connection)?;
    tracing::debug!(
        "set {} budget for {}-{:02} to {} for user {user_id}",
        budget.category,
        budget.year,
        budget.month,
        budget.limit
    );

    Ok((StatusCode::CREATED, Json(budget)))
}

/// Delete one of the user's budgets.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    PathParams(budget_id): PathParams<BudgetId>,
) -> Result<impl IntoResponse, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_budget(budget_id, user_id, &connection)?;

    Ok(Json(json!({ "message": "Deleted" })))
}

/// The query string for [get_budget_progress], e.g. `?month=1&year=2025&mode=raw`.
#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    month: Option<u8>,
    year: Option<i32>,
    #[serde(default)]
    mode: AggregationMode,
}

/// Get the progress of each of the user's budgets for a month, most urgent first.
///
/// Defaults to the current month in the server's local timezone.
pub async fn get_budget_progress(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<ProgressQuery>,
) -> Result<Json<Vec<BudgetProgressRow>>, Error> {
    let period = PeriodQuery {
        month: query.month,
        year: query.year,
    }
    .resolve(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let rows = get_progress_rows(user_id, period, query.mode, &connection)?;

    Ok(Json(rows))
}

/// Load the user's expenses and budgets for `period` and aggregate them.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_progress_rows(
    user_id: UserID,
    period: Period,
    mode: AggregationMode,
    connection: &Connection,
) -> Result<Vec<BudgetProgressRow>, Error> {
    let filter = TransactionFilter {
        from: Some(period.first_day()),
        to: Some(period.last_day()),
        kind: Some(TransactionKind::Expense),
    };
    let expenses = list_transactions(user_id, &filter, connection)?;
    let budgets = list_budgets(user_id, Some(period.month()), Some(period.year()), connection)?;

    Ok(aggregate_with_mode(&expenses, &budgets, period, mode))
}

#[cfg(test)]
mod budget_endpoint_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, sign_up},
    };

    async fn post_json(
        server: &TestServer,
        cookie: &Cookie<'static>,
        path: &str,
        body: Value,
    ) -> Value {
        let response = server
            .post(path)
            .add_cookie(cookie.clone())
            .json(&body)
            .await;

        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    #[tokio::test]
    async fn upsert_replaces_existing_limit() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;
        let first = post_json(
            &server,
            &cookie,
            endpoints::BUDGETS,
            json!({ "category": "Food", "limit": 1000, "month": 1, "year": 2025 }),
        )
        .await;

        let second = post_json(
            &server,
            &cookie,
            endpoints::BUDGETS,
            json!({ "category": " Food ", "limit": 1500, "month": 1, "year": 2025 }),
        )
        .await;

        assert_eq!(first["id"], second["id"]);
        assert_eq!(second["limit"], 1500.0);
        let budgets: Vec<Value> = server
            .get(endpoints::BUDGETS)
            .add_cookie(cookie)
            .await
            .json();
        assert_eq!(budgets.len(), 1);
    }

    #[tokio::test]
    async fn upsert_rejects_negative_limit() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;

        let response = server
            .post(endpoints::BUDGETS)
            .add_cookie(cookie)
            .json(&json!({ "category": "Food", "limit": -1, "month": 1, "year": 2025 }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "message": "Limit must be a valid number" }));
    }

    #[tokio::test]
    async fn upsert_requires_month_and_year() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;

        let response = server
            .post(endpoints::BUDGETS)
            .add_cookie(cookie)
            .json(&json!({ "category": "Food", "limit": 10 }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "message": "Month and year are required" }));
    }

    #[tokio::test]
    async fn upsert_rejects_malformed_body_with_json_message() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;

        let response = server
            .post(endpoints::BUDGETS)
            .add_cookie(cookie)
            .json(&json!({ "category": "Food", "limit": 10, "month": 300, "year": 2025 }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("month"), "got {message}");
    }

    #[tokio::test]
    async fn list_filters_by_month() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;
        for month in [1, 2] {
            post_json(
                &server,
                &cookie,
                endpoints::BUDGETS,
                json!({ "category": "Food", "limit": 100, "month": month, "year": 2025 }),
            )
            .await;
        }

        let budgets: Vec<Value> = server
            .get(endpoints::BUDGETS)
            .add_cookie(cookie)
            .add_query_param("month", 2)
            .add_query_param("year", 2025)
            .await
            .json();

        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0]["month"], 2);
    }

    #[tokio::test]
    async fn delete_missing_budget_is_not_found() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;

        let response = server
            .delete(&format_endpoint(endpoints::BUDGET, 7))
            .add_cookie(cookie)
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "message": "Budget not found" }));
    }

    #[tokio::test]
    async fn delete_removes_budget() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;
        let budget = post_json(
            &server,
            &cookie,
            endpoints::BUDGETS,
            json!({ "category": "Food", "limit": 100, "month": 1, "year": 2025 }),
        )
        .await;

        let response = server
            .delete(&format_endpoint(
                endpoints::BUDGET,
                budget["id"].as_i64().unwrap(),
            ))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Deleted" }));
    }

    #[tokio::test]
    async fn progress_folds_categories_into_groups() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;
        for (category, amount, date) in [
            ("Zomato", 700, "2025-01-05"),
            ("Swiggy", 500, "2025-01-18"),
            ("Rent payment", 1200, "2025-01-01"),
            ("Zomato", 999, "2025-02-01"),
        ] {
            post_json(
                &server,
                &cookie,
                endpoints::TRANSACTIONS,
                json!({ "type": "expense", "category": category, "amount": amount, "date": date }),
            )
            .await;
        }
        post_json(
            &server,
            &cookie,
            endpoints::TRANSACTIONS,
            json!({ "type": "income", "category": "Food", "amount": 5000, "date": "2025-01-02" }),
        )
        .await;
        for (category, limit) in [("Food", 1000), ("Rent", 1500), ("Shopping", 0)] {
            post_json(
                &server,
                &cookie,
                endpoints::BUDGETS,
                json!({ "category": category, "limit": limit, "month": 1, "year": 2025 }),
            )
            .await;
        }

        let response = server
            .get(endpoints::BUDGET_PROGRESS)
            .add_cookie(cookie)
            .add_query_param("month", 1)
            .add_query_param("year", 2025)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!([
            { "category": "Food", "limit": 1000.0, "spent": 1200.0, "percent": 120.0, "status": "exceeded" },
            { "category": "Rent", "limit": 1500.0, "spent": 1200.0, "percent": 80.0, "status": "warning" }
        ]));
    }

    #[tokio::test]
    async fn progress_in_raw_mode_matches_exact_text() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;
        post_json(
            &server,
            &cookie,
            endpoints::TRANSACTIONS,
            json!({ "type": "expense", "category": "Zomato", "amount": 50, "date": "2025-01-05" }),
        )
        .await;
        post_json(
            &server,
            &cookie,
            endpoints::BUDGETS,
            json!({ "category": "Food", "limit": 100, "month": 1, "year": 2025 }),
        )
        .await;

        let rows: Vec<Value> = server
            .get(endpoints::BUDGET_PROGRESS)
            .add_cookie(cookie)
            .add_query_param("month", 1)
            .add_query_param("year", 2025)
            .add_query_param("mode", "raw")
            .await
            .json();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["spent"], 0.0);
        assert_eq!(rows[0]["status"], "safe");
    }

    #[tokio::test]
    async fn progress_rejects_invalid_month() {
        let server = get_test_server();
        let cookie = sign_up(&server, "alice@example.com").await;

        server
            .get(endpoints::BUDGET_PROGRESS)
            .add_cookie(cookie)
            .add_query_param("month", 13)
            .add_query_param("year", 2025)
            .await
            .assert_status_bad_request();
    }
}
