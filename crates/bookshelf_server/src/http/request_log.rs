use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::time::Instant;
use uuid::Uuid;

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each response with a fresh request id and logs one line per request.
pub(crate) async fn log_request(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    info!(
        "event=http_request module=http status=done method={method} path={path} http_status={} duration_ms={} request_id={request_id}",
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
