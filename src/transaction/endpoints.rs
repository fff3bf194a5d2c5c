//! The JSON endpoints for listing, creating, updating and deleting transactions.

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
    date_format::parse_date,
    db::lock_connection,
    extract::{JsonBody, PathParams, QueryParams},
    timezone::local_today,
    transaction::{
        Transaction, TransactionData, TransactionFilter, TransactionId, TransactionKind,
        create_transaction, delete_transaction, list_transactions, update_transaction,
    },
};

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string for [get_transactions], e.g. `?from=2025-01-01&to=2025-01-31&type=expense`.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    from: Option<String>,
    to: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl TransactionQuery {
    fn into_filter(self) -> Result<TransactionFilter, Error> {
        // An unrecognised type does not filter by kind.
        let kind = self
            .kind
            .as_deref()
            .and_then(|kind| kind.parse::<TransactionKind>().ok());

        Ok(TransactionFilter {
            from: self.from.as_deref().map(parse_date).transpose()?,
            to: self.to.as_deref().map(parse_date).transpose()?,
            kind,
        })
    }
}

/// List the user's transactions, newest first.
pub async fn get_transactions(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = query.into_filter()?;
    let connection = lock_connection(&state.db_connection)?;

    list_transactions(user_id, &filter, &connection).map(Json)
}

/// Create a transaction for the user. The date defaults to today in the
/// server's local timezone.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<TransactionData>,
) -> Result<impl IntoResponse, Error> {
    let today = local_today(&state.local_timezone)?;
    let new_transaction = data.into_new_transaction(today)?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(user_id, new_transaction, &connection)?;
    tracing::debug!("created transaction {} for user {user_id}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Update the fields present in the request body of one of the user's transactions.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    PathParams(transaction_id): PathParams<TransactionId>,
    JsonBody(data): JsonBody<TransactionData>,
) -> Result<Json<Transaction>, Error> {
    let update = data.into_update()?;
    let connection = lock_connection(&state.db_connection)?;

    update_transaction(transaction_id, user_id, &update, &connection).map(Json)
}

/// Delete one of the user's transactions.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    PathParams(transaction_id): PathParams<TransactionId>,
) -> Result<impl IntoResponse, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(transaction_id, user_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction deleted" })))
}
