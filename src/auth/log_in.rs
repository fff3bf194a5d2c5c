//! Log-in requests and the state shared by the endpoints that start a session.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::IntoResponse,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{REMEMBER_ME_COOKIE_DURATION, get_user_by_email, set_auth_cookie},
    db::lock_connection,
    extract::JsonBody,
    timezone::get_local_offset,
};

/// The state needed to sign up or log in.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The bcrypt cost for hashing new passwords.
    pub password_hash_cost: u32,
    /// The database connection for looking up and creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent to the log-in endpoint.
///
/// The password is a plain string. It is only compared against the stored hash.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Keep the session alive for a week instead of the default duration.
    #[serde(default)]
    pub remember_me: bool,
}

/// Handler for log-in requests.
///
/// Responds with the user and sets the session cookie if the e-mail and
/// password match a registered user.
///
/// # Errors
///
/// Returns an [Error::InvalidCredentials] if the e-mail is unknown or the
/// password is wrong. Both cases get the same response.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    JsonBody(data): JsonBody<LogInData>,
) -> Result<impl IntoResponse, Error> {
    let email: EmailAddress = data
        .email
        .trim()
        .parse()
        .map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                tracing::debug!("log-in attempt for unknown e-mail address");
                return Err(Error::InvalidCredentials);
            }
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = user.password_hash.verify(&data.password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let cookie_duration = if data.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let jar = set_auth_cookie(jar, user.id, cookie_duration, local_offset)?;
    tracing::info!("user {} logged in", user.id);

    Ok((jar, Json(user)))
}
