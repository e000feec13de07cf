//! The backend's `{code, message, result}` response wrapper.
//!
//! Most endpoints wrap their payload; a few return the bare resource. The
//! HTTP status decides success, so decoding only has to pick the payload.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, FALLBACK_MESSAGE};

/// A wrapped response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<T>,
}

/// Pick the payload out of a decoded body.
///
/// An object with a `result` key yields `result`; anything else is the
/// payload itself.
#[must_use]
pub fn payload(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("result") => {
            map.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Decode a success body into `T`. An empty body decodes as `null`.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the payload does not match `T`.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text)?
    };
    Ok(serde_json::from_value(payload(body))?)
}

/// Turn a failed response into an [`ApiError::Api`], preferring the server's
/// own message.
#[must_use]
pub fn error_from_body(status: u16, text: &str) -> ApiError {
    let envelope = serde_json::from_str::<Envelope<Value>>(text).ok();
    let code = envelope.as_ref().and_then(|e| e.code);
    let message = envelope
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
    ApiError::Api {
        status,
        code,
        message,
    }
}
