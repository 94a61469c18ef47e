//! Zero-cost HTTP abstraction traits for the OTP gate.
//!
//! The gate never touches a framework type directly. Framework crates wrap
//! their own request and response builder types in newtypes and implement
//! these traits on them.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  otpgate_core: Defines HTTP traits       │
//! └──────────────┬───────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────────────┐
//! │  otpgate_axum: Newtype wrappers          │
//! │  struct AxumRequest(axum::Request)       │
//! │  impl GateRequest for AxumRequest { }    │
//! └──────────────┬───────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────────────────┐
//! │  Response rendering in otpgate_adapters  │
//! │  is generic over GateResponseBuilder     │
//! └──────────────────────────────────────────┘
//! ```

/// Read access to an incoming HTTP request.
pub trait GateRequest {
    /// Get a header value by name.
    ///
    /// Header lookup should be case-insensitive (per HTTP spec).
    /// Returns `None` if the header doesn't exist or isn't valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Get a cookie value by name.
    fn cookie(&self, name: &str) -> Option<String>;

    /// Get the HTTP method (GET, POST, etc.)
    fn method(&self) -> &str;

    /// Get the request path
    fn path(&self) -> &str;

    /// Raw query string, without the leading `?`.
    fn query(&self) -> Option<&str>;

    /// Whether the client asked for a JSON answer rather than a page.
    fn expects_json(&self) -> bool {
        let ajax = self
            .header("x-requested-with")
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));
        let accepts_json = self
            .header("accept")
            .is_some_and(|v| v.contains("application/json") || v.contains("+json"));
        ajax || accepts_json
    }

    /// Whether the request only reads (GET/HEAD), i.e. it cannot be an OTP
    /// submission.
    fn is_read_only(&self) -> bool {
        self.method().eq_ignore_ascii_case("GET") || self.method().eq_ignore_ascii_case("HEAD")
    }
}

/// Builder for gate responses, implemented by framework newtypes.
pub trait GateResponseBuilder: Sized {
    /// The final response type produced by this builder
    type Response;

    /// Set the HTTP status code
    fn status(self, code: u16) -> Self;

    /// Add an HTTP header
    fn header(self, name: &str, value: &str) -> Self;

    /// Set a JSON body with Content-Type header
    fn json_body(self, body: serde_json::Value) -> Self;

    /// Set a plain text body with Content-Type header
    fn text_body(self, body: String) -> Self;

    /// Build the final response
    fn build(self) -> Self::Response;
}

/// Helper methods for the responses the gate sends.
///
/// Automatically implemented for all types that implement
/// `GateResponseBuilder`.
pub trait GateResponseHelpers: GateResponseBuilder {
    /// Message response as JSON, `{"message": ...}`.
    fn json_message(self, code: u16, message: &str) -> Self::Response {
        self.status(code)
            .json_body(serde_json::json!({ "message": message }))
            .build()
    }

    /// Message response as plain text.
    fn text_message(self, code: u16, message: &str) -> Self::Response {
        self.status(code).text_body(message.to_string()).build()
    }
}

// Blanket implementation for all GateResponseBuilder types
impl<T: GateResponseBuilder> GateResponseHelpers for T {}
