//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    auth::{auth_guard, get_current_user, post_log_in, post_log_out, post_sign_up},
    budget::{delete_budget_endpoint, get_budget_progress, get_budgets, upsert_budget_endpoint},
    category::{get_categories, get_category_suggestions},
    charts::get_charts,
    endpoints,
    not_found::get_404_not_found,
    summary::get_summary,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions,
        update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_health))
        .route(endpoints::SIGN_UP, post(post_sign_up))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(endpoints::CATEGORIES, get(get_categories))
        .route(
            endpoints::CATEGORY_SUGGESTIONS,
            get(get_category_suggestions),
        );

    let protected_routes = Router::new()
        .route(endpoints::ME, get(get_current_user))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets).post(upsert_budget_endpoint),
        )
        .route(endpoints::BUDGET, delete(delete_budget_endpoint))
        .route(endpoints::BUDGET_PROGRESS, get(get_budget_progress))
        .route(endpoints::SUMMARY, get(get_summary))
        .route(endpoints::CHARTS, get(get_charts))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Build the CORS layer that lets the listed browser origins call the API with cookies.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(header_value) => Some(header_value),
            Err(error) => {
                tracing::warn!("Ignoring invalid CORS origin {origin}: {error}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// A plain text message for checking that the server is up.
async fn get_health() -> &'static str {
    "Budget tracker API is running"
}
