use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Propagates the caller's request id, or mints one, on both request and response.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok());

    let Some(request_id) = request_id else {
        return next.run(req).await;
    };

    req.headers_mut()
        .insert(REQUEST_ID_HEADER, request_id.clone());

    let mut response = next.run(req).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    response
}
