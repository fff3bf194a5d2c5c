//! A personal budgeting backend.
//!
//! This library provides a JSON REST API for recording income and expenses,
//! setting monthly budgets per category and tracking spending against them.
//! Free-text categories such as "Zomato" or "Uber ride" are folded into
//! canonical groups by a shared rule table before budgets are compared.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod category;
mod charts;
mod date_format;
mod db;
mod endpoints;
mod error;
mod extract;
mod logging;
mod not_found;
mod period;
mod routing;
mod summary;
#[cfg(test)]
mod test_utils;
mod timezone;
mod transaction;

pub use app_state::{AppState, create_cookie_key};
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email,
    get_user_by_id, update_password,
};
pub use budget::{
    AggregationMode, Budget, BudgetProgressRow, NewBudget, Status, aggregate, aggregate_with_mode,
    classify, list_budgets, upsert_budget,
};
pub use category::{CategoryGroup, CategoryName, DEFAULT_RULE_TABLE, RuleTable, normalize};
pub use charts::{Charts, expenses_by_group, income_vs_expense};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::Period;
pub use routing::{build_cors_layer, build_router};
pub use summary::{MonthlySummary, summarize};
pub use timezone::get_local_offset;
pub use transaction::{
    NewTransaction, Transaction, TransactionFilter, TransactionKind, create_transaction,
    list_transactions,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
