//! Request extractors whose rejections are reported as JSON [Error]s.
//!
//! axum's own extractors reject malformed input with a plain text body. These
//! wrappers run the same extractors and convert the rejection into
//! [Error::BadRequest].

use axum::extract::{
    FromRequest, FromRequestParts,
    rejection::{JsonRejection, PathRejection, QueryRejection},
};

use crate::Error;

/// A JSON request body, see [axum::Json].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// A query string, see [axum::extract::Query].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// Path parameters, see [axum::extract::Path].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParams<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("rejected request body: {rejection}");
        Error::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("rejected query string: {rejection}");
        Error::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("rejected path: {rejection}");
        Error::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod extract_tests {
    use axum::{Json, Router, routing::post};
    use axum_test::TestServer;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::{JsonBody, PathParams, QueryParams};

    #[derive(Debug, Serialize, Deserialize)]
    struct Month {
        month: u8,
    }

    async fn echo_body(JsonBody(month): JsonBody<Month>) -> Json<Month> {
        Json(month)
    }

    async fn echo_query(QueryParams(month): QueryParams<Month>) -> Json<Month> {
        Json(month)
    }

    async fn echo_path(PathParams(id): PathParams<i64>) -> Json<i64> {
        Json(id)
    }

    fn get_server() -> TestServer {
        let app = Router::new()
            .route("/body", post(echo_body))
            .route("/query", post(echo_query))
            .route("/path/{id}", post(echo_path));

        TestServer::new(app)
    }

    #[tokio::test]
    async fn valid_body_is_extracted() {
        let response = get_server().post("/body").json(&json!({ "month": 3 })).await;

        response.assert_status_ok();
        response.assert_json(&json!({ "month": 3 }));
    }

    #[tokio::test]
    async fn out_of_range_body_field_is_json_bad_request() {
        let response = get_server()
            .post("/body")
            .json(&json!({ "month": 300 }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(
            body["message"].as_str().unwrap().contains("month"),
            "got {body}"
        );
    }

    #[tokio::test]
    async fn invalid_json_is_json_bad_request() {
        let response = get_server()
            .post("/body")
            .text("{ not json")
            .content_type("application/json")
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn bad_query_is_json_bad_request() {
        let response = get_server()
            .post("/query")
            .add_query_param("month", "March")
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn bad_path_is_json_bad_request() {
        let response = get_server().post("/path/abc").await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert!(body["message"].is_string());
    }
}
