//! Creating an account.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;
use email_address::EmailAddress;
use serde::Deserialize;

use crate::{
    Error,
    auth::{LoginState, PasswordHash, ValidatedPassword, create_user, set_auth_cookie},
    db::lock_connection,
    extract::JsonBody,
    timezone::get_local_offset,
};

/// The details sent to the sign-up endpoint.
#[derive(Clone, Deserialize)]
pub struct SignUpData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Handler for sign-up requests.
///
/// Creates the user, starts a session and responds with the new user.
///
/// # Errors
///
/// Returns a:
/// - [Error::EmptyName] if the name is blank,
/// - [Error::InvalidEmail] if the e-mail address cannot be parsed,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::DuplicateEmail] if the e-mail address is already registered.
pub async fn post_sign_up(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    JsonBody(data): JsonBody<SignUpData>,
) -> Result<impl IntoResponse, Error> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let raw_email = data.email.trim();
    let email: EmailAddress = raw_email
        .parse()
        .map_err(|_| Error::InvalidEmail(raw_email.to_owned()))?;

    let password = ValidatedPassword::new(&data.password, &[name, email.as_str()])?;
    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        create_user(name, &email, password_hash, &connection)?
    };

    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;
    let jar = set_auth_cookie(jar, user.id, state.cookie_duration, local_offset)?;
    tracing::info!("created user {}", user.id);

    Ok((StatusCode::CREATED, jar, Json(user)))
}
