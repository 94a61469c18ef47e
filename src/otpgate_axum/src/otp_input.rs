//! Pulling the submitted code out of a request.

use otpgate_core::{GateRequest, OtpInput};

/// Read the OTP field from the request body or query string.
///
/// `body` is the buffered request body, empty when it was not read. The
/// body wins over the query string. A read-only request without a usable
/// value is a plain visit ([`OtpInput::Absent`]); any other request that
/// lacks the field counts as an empty submission.
pub fn extract_otp<R: GateRequest>(request: &R, body: &[u8], field: &str) -> OtpInput {
    let value = from_body(request, body, field).or_else(|| from_query(request.query(), field));
    let read_only = request.is_read_only();

    match value {
        Some(value) if !(read_only && value.trim().is_empty()) => {
            OtpInput::from_submission(Some(&value))
        }
        _ if read_only => OtpInput::Absent,
        _ => OtpInput::Empty,
    }
}

fn from_query(query: Option<&str>, field: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query?).ok()?;
    find_pair(pairs, field)
}

fn from_body<R: GateRequest>(request: &R, body: &[u8], field: &str) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let content_type = request.header("content-type").unwrap_or_default();

    if is_json(content_type) {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        match value.get(field)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Null => Some(String::new()),
            _ => None,
        }
    } else if is_form(content_type) {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).ok()?;
        find_pair(pairs, field)
    } else {
        None
    }
}

/// Whether a body of this content type can carry the code.
pub fn may_carry_otp(content_type: &str) -> bool {
    is_json(content_type) || is_form(content_type)
}

fn is_json(content_type: &str) -> bool {
    content_type.starts_with("application/json") || content_type.contains("+json")
}

fn is_form(content_type: &str) -> bool {
    content_type.starts_with("application/x-www-form-urlencoded")
}

fn find_pair(pairs: Vec<(String, String)>, field: &str) -> Option<String> {
    pairs
        .into_iter()
        .find(|(key, _)| key == field)
        .map(|(_, value)| value)
}
