//! Helpers shared by the HTTP tests.

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{AppState, auth::COOKIE_TOKEN, build_router, endpoints};

/// A password that passes the strength check.
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple-42";

/// Get a test server for the full app backed by an in-memory database.
///
/// Passwords are hashed with the lowest bcrypt cost to keep tests fast.
pub fn get_test_server() -> TestServer {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    let mut state = AppState::new(connection, "stneaoetse", "Etc/UTC")
        .expect("Could not create app state");
    state.password_hash_cost = 4;

    TestServer::new(build_router(state))
}

/// Sign up a user with `email` and [TEST_PASSWORD] and return their session cookie.
pub async fn sign_up(server: &TestServer, email: &str) -> Cookie<'static> {
    let response = server
        .post(endpoints::SIGN_UP)
        .json(&json!({ "name": "Test User", "email": email, "password": TEST_PASSWORD }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    response.cookie(COOKIE_TOKEN)
}
