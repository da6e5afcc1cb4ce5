//! The `/query` endpoint.

use crate::middleware::log_request;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use execution::{Database, ExecutionError};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub sql: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("SQL is required")]
    MissingSql,
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl ApiError {
    /// Every failure is the client's statement being rejected.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn body(&self) -> Value {
        json!({ "success": false, "error": self.to_string() })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

pub fn router(database: Database) -> Router {
    Router::new()
        .route("/query", post(query))
        .layer(middleware::from_fn(log_request))
        .with_state(database)
}

/// Runs the statement in the body's `sql` field. A missing or unparsable
/// body is treated like a missing statement.
pub async fn query(
    State(database): State<Database>,
    request: Option<Json<QueryRequest>>,
) -> Result<Json<Value>, ApiError> {
    let sql = request
        .and_then(|Json(request)| request.sql)
        .filter(|sql| !sql.trim().is_empty())
        .ok_or(ApiError::MissingSql)?;
    debug!(%sql, "Query request");

    let output = database.query(&sql).await?;
    Ok(Json(json!({ "success": true, "result": output.to_json() })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use pretty_assertions_sorted::assert_eq;
    use std::sync::Arc;
    use storage::MemoryStore;
    use tower::ServiceExt;

    async fn database() -> Database {
        let database = Database::new(Arc::new(MemoryStore::new()));
        database.connect("http_test").await.unwrap();
        database
    }

    fn request(sql: Option<&str>) -> Option<Json<QueryRequest>> {
        Some(Json(QueryRequest {
            sql: sql.map(str::to_string),
        }))
    }

    async fn run(database: &Database, sql: &str) -> Value {
        let Json(body) = query(State(database.clone()), request(Some(sql)))
            .await
            .unwrap();
        body
    }

    #[tokio::test]
    async fn test_missing_sql() {
        let database = database().await;

        for body in [None, request(None), request(Some("   "))] {
            let error = query(State(database.clone()), body).await.unwrap_err();
            assert_eq!(error.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                error.body(),
                json!({ "success": false, "error": "SQL is required" })
            );
        }
    }

    #[tokio::test]
    async fn test_status_and_rows() {
        let database = database().await;

        assert_eq!(
            run(&database, "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR(20))").await,
            json!({ "success": true, "result": "Table 'users' created successfully" })
        );
        run(&database, "INSERT INTO users (name) VALUES ('John')").await;

        assert_eq!(
            run(&database, "SELECT * FROM users").await,
            json!({ "success": true, "result": [{ "id": 1, "name": "John" }] })
        );
    }

    #[tokio::test]
    async fn test_execution_error() {
        let database = database().await;

        let error = query(State(database), request(Some("SELECT * FROM missing")))
            .await
            .unwrap_err();
        assert_eq!(
            error.body(),
            json!({ "success": false, "error": "Table 'missing' does not exist" })
        );
    }

    #[tokio::test]
    async fn test_router() {
        let app = router(database().await);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/query")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"sql": "CREATE TABLE t (id INT PRIMARY KEY)"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/query")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
