//! Wire types shared by the request and response sides of an invocation.
//!
//! The host runtime reads exactly one [`Output`] object from the adapter's
//! standard output once the handler has completed. Header mappings keep their
//! insertion order so the serialised object matches what the handler set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::Display;

/// Header mapping carried by requests and responses.
///
/// Values are JSON values: hosts may forward a header as a string or as an
/// array of strings, and `content-length` is emitted as a number.
pub type HeaderMap = Map<String, Value>;

/// Transport style tag attached to both sides of an invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    /// HTTP-like request/response semantics.
    #[default]
    Http,
}

/// Kind of a JSON value, used for explicit checks at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    /// `null`.
    Null,
    /// `true` or `false`.
    Bool,
    /// Any JSON number.
    Number,
    /// A JSON string.
    String,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

impl ValueKind {
    /// Classifies a JSON value.
    ///
    /// # Example
    ///
    /// ```
    /// use invoke_stdio::ValueKind;
    ///
    /// assert_eq!(ValueKind::of(&serde_json::json!({"a": 1})), ValueKind::Object);
    /// assert_eq!(ValueKind::of(&serde_json::json!("text")), ValueKind::String);
    /// ```
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

/// The single object written to standard output at the end of an invocation.
///
/// `headers` is omitted entirely when the handler never set any, mirroring an
/// unset field rather than an empty mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    headers: Option<HeaderMap>,
    body: String,
}

impl Output {
    /// Creates an output object.
    #[must_use]
    pub const fn new(code: u16, headers: Option<HeaderMap>, body: String) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Returns the header mapping, if the handler set one.
    #[must_use]
    pub const fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    /// Returns the body text.
    #[must_use]
    pub const fn body(&self) -> &str {
        self.body.as_str()
    }
}
