//! HTTP helpers for the webhook Lambda.

use lambda_http::{Body, Response};

/// Create a plain text response.
pub fn text_response(status: u16, text: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "text/plain; charset=utf-8")
        .body(Body::from(text.into()))?)
}
