use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Response, StatusCode,
    header::{self, HeaderValue},
};
use log::error;
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;

pub type ApiResponse = Response<Full<Bytes>>;

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

pub fn json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> ApiResponse {
    match serde_json::to_vec(body) {
        Ok(bytes) => build(status, "application/json", Bytes::from(bytes)),
        Err(err) => {
            error!("failed to encode response body: {err}");
            build(
                StatusCode::INTERNAL_SERVER_ERROR,
                "application/json",
                Bytes::from_static(br#"{"error":"internal error"}"#),
            )
        }
    }
}

pub fn error(err: &ApiError) -> ApiResponse {
    json(err.status(), &json!({ "error": err.public_message() }))
}

pub fn text(status: StatusCode, content_type: &str, body: Vec<u8>) -> ApiResponse {
    build(status, content_type, Bytes::from(body))
}

pub fn preflight() -> ApiResponse {
    build(StatusCode::NO_CONTENT, "text/plain", Bytes::new())
}

fn build(status: StatusCode, content_type: &str, body: Bytes) -> ApiResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}
