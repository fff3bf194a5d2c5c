//! Monthly budgets and how spending is tracked against them.

mod core;
mod db;
mod endpoints;
mod progress;

pub use core::{Budget, BudgetData, BudgetId, NewBudget};
pub use db::{create_budget_table, delete_budget, list_budgets, upsert_budget};
pub use endpoints::{
    delete_budget_endpoint, get_budget_progress, get_budgets, get_progress_rows,
    upsert_budget_endpoint,
};
pub use progress::{
    AggregationMode, BudgetProgressRow, Status, aggregate, aggregate_with_mode, classify,
};
