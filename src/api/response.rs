use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        json_response(StatusCode::OK, &self, None)
    }
}

/// Serializes `body` as JSON and adds an `X-Total-Count` header.
pub fn with_total_count<T: Serialize>(body: T, count: i64) -> Response {
    json_response(StatusCode::OK, &body, Some(count))
}

fn json_response<T: Serialize>(status: StatusCode, body: &T, total: Option<i64>) -> Response {
    let json = match serde_json::to_string(body) {
        Ok(json) => json,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let mut response = (status, json).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(count) = total {
        headers.insert("X-Total-Count", HeaderValue::from(count));
    }

    response
}
