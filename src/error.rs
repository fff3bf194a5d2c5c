//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an e-mail and password combination that does not
    /// match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid, unexpired session cookie.
    #[error("not authorized")]
    Unauthorized,

    /// The session cookie could not be created or updated.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not set the session cookie: {0}")]
    CookieError(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The e-mail address could not be parsed.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The e-mail address already belongs to a registered user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// An empty string was used as a user's name.
    #[error("name is required")]
    EmptyName,

    /// The transaction type was something other than income or expense.
    #[error("type must be income or expense")]
    InvalidTransactionKind(String),

    /// An empty string was used as a transaction or budget category.
    #[error("category is required")]
    EmptyCategory,

    /// A transaction amount was not a finite, positive number.
    #[error("amount must be a positive number")]
    InvalidAmount,

    /// A budget limit was not a finite, non-negative number.
    #[error("limit must be a valid number")]
    InvalidLimit,

    /// A date string could not be parsed.
    #[error("invalid date \"{0}\"")]
    InvalidDate(String),

    /// A budget was submitted without a month or year.
    #[error("month and year are required")]
    MissingPeriod,

    /// The month or year does not describe a valid calendar month.
    #[error("invalid month {month} of year {year}")]
    InvalidPeriod {
        /// The requested month, expected to be 1 to 12.
        month: u8,
        /// The requested year.
        year: i32,
    },

    /// The request body, query string or path could not be parsed.
    ///
    /// Holds the reason given by the extractor.
    #[error("{0}")]
    BadRequest(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist or belongs to another user.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist or belongs to another user.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a budget that does not exist or belongs to another user.
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::EmptyName
            | Error::InvalidTransactionKind(_)
            | Error::EmptyCategory
            | Error::InvalidAmount
            | Error::InvalidLimit
            | Error::InvalidDate(_)
            | Error::MissingPeriod
            | Error::InvalidPeriod { .. }
            | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::DeleteMissingBudget => StatusCode::NOT_FOUND,
            Error::CookieError(_)
            | Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    fn client_message(&self) -> String {
        match self {
            Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                "Transaction not found".to_owned()
            }
            Error::DeleteMissingBudget => "Budget not found".to_owned(),
            Error::NotFound => "The requested resource could not be found".to_owned(),
            Error::InvalidTimezoneError(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
            error if error.status_code() == StatusCode::INTERNAL_SERVER_ERROR => {
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => capitalise_first_char(&error.to_string()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal errors are not intended to be shown to the client.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(json!({ "message": self.client_message() }))).into_response()
    }
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
