use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    auth::{User, get_user_by_id},
    db::lock_connection,
};

/// The state needed to look up the current user.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the user that owns the current session.
///
/// # Errors
///
/// Returns an [Error::Unauthorized] if the session belongs to a user that no
/// longer exists.
pub async fn get_current_user(
    State(state): State<SessionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<User>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Ok(Json(user)),
        Err(Error::NotFound) => {
            tracing::warn!("session for missing user {user_id}");
            Err(Error::Unauthorized)
        }
        Err(error) => Err(error),
    }
}
