use axum::{http::Request, middleware::Next, response::Response};
use common::util::time::format_duration;
use std::time::Instant;
use tracing::{info, warn};

/// Logs every request with its method, path, status, and how long it took.
pub async fn log_request<B>(request: Request<B>, next: Next<B>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed = format_duration(start.elapsed());
    if status.is_success() {
        info!(%method, %path, status = status.as_u16(), %elapsed, "Request handled");
    } else {
        warn!(%method, %path, status = status.as_u16(), %elapsed, "Request failed");
    }
    response
}
