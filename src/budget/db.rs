//! Database operations for budgets.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    budget::{Budget, BudgetId, NewBudget},
    category::CategoryName,
};

/// Retrieve the budgets owned by `user_id`, ordered by category.
///
/// `month` and `year` narrow the results when set.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_budgets(
    user_id: UserID,
    month: Option<u8>,
    year: Option<i32>,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, month, year, category, limit_amount FROM budget
             WHERE user_id = ?1
                AND (?2 IS NULL OR month = ?2)
                AND (?3 IS NULL OR year = ?3)
             ORDER BY category ASC, id ASC",
        )?
        .query_map((user_id.as_i64(), month, year), map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Create the budget for the category and month in `budget`, or replace the
/// limit of the existing one.
///
/// The insert and the update happen in a single statement, so concurrent
/// writes for the same category and month never produce two budgets.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn upsert_budget(
    user_id: UserID,
    budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "INSERT INTO budget (user_id, month, year, category, limit_amount)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, month, year, category)
                DO UPDATE SET limit_amount = excluded.limit_amount
             RETURNING id, user_id, month, year, category, limit_amount",
        )?
        .query_row(
            (
                user_id.as_i64(),
                budget.period.month(),
                budget.period.year(),
                budget.category.as_ref(),
                budget.limit,
            ),
            map_row,
        )
        .map_err(|error| error.into())
}

/// Delete the budget with `id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBudget] if `id` does not refer to a budget owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Initialize the budget table.
///
/// The user table must exist before this table is created.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL,
            category TEXT NOT NULL CHECK (length(trim(category)) > 0),
            limit_amount REAL NOT NULL CHECK (limit_amount >= 0),
            UNIQUE(user_id, month, year, category),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let month = row.get(2)?;
    let year = row.get(3)?;
    let raw_category: String = row.get(4)?;
    let limit = row.get(5)?;

    Ok(Budget {
        id,
        user_id,
        month,
        year,
        category: CategoryName::new_unchecked(&raw_category),
        limit,
    })
}
