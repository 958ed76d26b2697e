//! Response envelope decoding.
//!
//! One function, [`decode`], classifies every backend response. Callers never
//! inspect status codes or headers themselves.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::code::ResponseCode;
use crate::error::ApiFailure;
use crate::navigator::{Navigator, Route};

/// Message for a 2xx response whose body is not JSON.
pub const UNPROCESSABLE_MESSAGE: &str = "response could not be processed";

/// Fallback for a non-`S00` header without `rtmsg`.
pub const GENERIC_FAILURE_MESSAGE: &str = "an error occurred while processing the request";

/// Envelope header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtcd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtmsg: Option<String>,
}

/// Wire shape returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T = Value> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<EnvelopeHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn success(body: T) -> Self {
        Self::with_code(ResponseCode::Success, Some(body))
    }

    pub fn with_code(code: ResponseCode, body: Option<T>) -> Self {
        Self {
            header: Some(EnvelopeHeader {
                rtmsg: code.default_message().map(str::to_string),
                rtcd: Some(code.as_str().to_string()),
            }),
            body,
        }
    }

    pub fn failure(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            header: Some(EnvelopeHeader {
                rtcd: Some(code.as_str().to_string()),
                rtmsg: Some(message.into()),
            }),
            body: None,
        }
    }
}

/// Transport-independent view of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Reason phrase, e.g. `Internal Server Error`.
    pub status_text: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outcome of decoding a response.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Decoded<T> {
    /// Header indicated success; the unwrapped payload.
    Ok(T),
    /// Business, status or parse failure with the best available message.
    Err(ApiFailure),
    /// HTTP 401. Navigation to the login route has already happened.
    Unauthenticated,
}

impl<T> Decoded<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        match self {
            Self::Ok(value) => Decoded::Ok(f(value)),
            Self::Err(failure) => Decoded::Err(failure),
            Self::Unauthenticated => Decoded::Unauthenticated,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Decoded<U>) -> Decoded<U> {
        match self {
            Self::Ok(value) => f(value),
            Self::Err(failure) => Decoded::Err(failure),
            Self::Unauthenticated => Decoded::Unauthenticated,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Err(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            _ => None,
        }
    }
}

impl Decoded<Value> {
    /// Deserialize the payload into `T`; a shape mismatch is a parse failure.
    pub fn parse_payload<T: DeserializeOwned>(self) -> Decoded<T> {
        match self {
            Self::Ok(value) => match serde_json::from_value(value) {
                Ok(parsed) => Decoded::Ok(parsed),
                Err(err) => {
                    tracing::debug!(error = %err, "payload did not match expected shape");
                    Decoded::Err(ApiFailure::parse(UNPROCESSABLE_MESSAGE))
                }
            },
            Self::Err(failure) => Decoded::Err(failure),
            Self::Unauthenticated => Decoded::Unauthenticated,
        }
    }
}

/// Classify a raw response.
///
/// HTTP 401 triggers `navigator.navigate(Route::Login)` exactly once,
/// whatever the body contains.
pub fn decode(raw: &RawResponse, navigator: &dyn Navigator) -> Decoded<Value> {
    if raw.status == 401 {
        tracing::info!("401 from backend, redirecting to login");
        navigator.navigate(Route::Login);
        return Decoded::Unauthenticated;
    }

    if !raw.is_success() {
        let message = error_body_message(&raw.body)
            .unwrap_or_else(|| format!("HTTP {}: {}", raw.status, raw.status_text));
        tracing::warn!(status = raw.status, %message, "non-success HTTP status");
        return Decoded::Err(ApiFailure::transport(Some(raw.status), message));
    }

    let value: Value = match serde_json::from_slice(&raw.body) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(status = raw.status, error = %err, "response body is not JSON");
            return Decoded::Err(ApiFailure::parse(UNPROCESSABLE_MESSAGE).with_status(raw.status));
        }
    };

    if let Some(rtcd) = value.get("header").and_then(|h| h.get("rtcd"))
        && !rtcd.is_null()
    {
        let code = match rtcd {
            Value::String(s) => ResponseCode::parse(s),
            other => ResponseCode::parse(&other.to_string()),
        };
        if !code.is_success() {
            let message = value
                .get("header")
                .and_then(|h| h.get("rtmsg"))
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .map(str::to_string)
                .or_else(|| code.default_message().map(str::to_string))
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
            tracing::warn!(rtcd = %code, %message, "backend reported failure");
            return Decoded::Err(ApiFailure::protocol(code, message).with_status(raw.status));
        }
    }

    match value.get("body") {
        Some(body) if !body.is_null() => Decoded::Ok(body.clone()),
        _ => Decoded::Ok(value),
    }
}

/// `header.rtmsg`, then top-level `message`, from an error body.
fn error_body_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let from_header = value
        .get("header")
        .and_then(|h| h.get("rtmsg"))
        .and_then(Value::as_str);
    let from_top = value.get("message").and_then(Value::as_str);
    from_header
        .or(from_top)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
