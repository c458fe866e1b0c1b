use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::error;

/// 记录所有 5xx 响应；响应体已是通用信息，细节由 `AppError` 记录
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    if response.status().is_server_error() {
        error!(
            "Server error occurred - {} {} -> {}",
            method,
            path,
            response.status()
        );
    }
    response
}
