//! Axum newtypes for the gate's HTTP traits.
//!
//! `GateRequest` and `GateResponseBuilder` live in `otpgate_core`; the
//! wrappers below let us implement them for axum types without tripping
//! the orphan rule.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{Response, StatusCode};
use axum_extra::extract::cookie::CookieJar;
use otpgate_core::{GateRequest, GateResponseBuilder};

/// Newtype wrapper around axum's request.
#[repr(transparent)]
pub struct AxumRequest(pub Request);

impl From<Request> for AxumRequest {
    fn from(req: Request) -> Self {
        AxumRequest(req)
    }
}

impl From<AxumRequest> for Request {
    fn from(wrapper: AxumRequest) -> Self {
        wrapper.0
    }
}

impl GateRequest for AxumRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.0.headers().get(name)?.to_str().ok()
    }

    fn cookie(&self, name: &str) -> Option<String> {
        CookieJar::from_headers(self.0.headers())
            .get(name)
            .map(|cookie| cookie.value().to_string())
    }

    fn method(&self) -> &str {
        self.0.method().as_str()
    }

    fn path(&self) -> &str {
        self.0.uri().path()
    }

    fn query(&self) -> Option<&str> {
        self.0.uri().query()
    }
}

/// Response builder producing `axum` responses.
pub struct AxumResponseBuilder {
    builder: axum::http::response::Builder,
    body: Option<String>,
}

impl AxumResponseBuilder {
    pub fn new() -> Self {
        Self {
            builder: Response::builder(),
            body: None,
        }
    }
}

impl Default for AxumResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GateResponseBuilder for AxumResponseBuilder {
    type Response = Response<Body>;

    fn status(mut self, code: u16) -> Self {
        self.builder = self.builder.status(code);
        self
    }

    fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    fn json_body(mut self, body: serde_json::Value) -> Self {
        self.builder = self.builder.header("content-type", "application/json");
        self.body = Some(body.to_string());
        self
    }

    fn text_body(mut self, body: String) -> Self {
        self.builder = self
            .builder
            .header("content-type", "text/plain; charset=utf-8");
        self.body = Some(body);
        self
    }

    fn build(self) -> Self::Response {
        let body = self.body.unwrap_or_default();
        self.builder.body(Body::from(body)).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Invalid gate response");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
    }
}

/// Fresh [`AxumResponseBuilder`] for rendering gate outcomes.
pub fn response_builder() -> AxumResponseBuilder {
    AxumResponseBuilder::new()
}
