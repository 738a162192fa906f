//! Response Builder with single-write, finish-once semantics.
//!
//! Handlers mutate a [`Response`] through [`Response::set`],
//! [`Response::send`] and [`Response::write`]. The two terminal calls replace
//! the body and headers and mark the response finished; from then on every
//! mutator fails with [`ResponseError::Finished`] and the state is frozen.

use serde::Serialize;
use serde_json::Value;

use crate::error::ResponseError;
use crate::protocol::{HeaderMap, Output, Protocol, ValueKind};

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "plain/text";

/// Argument of [`Response::set`]: either one header or a whole mapping.
///
/// Both forms replace the existing headers; nothing is merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderSet {
    /// A single header, stored with its name and value lower-cased.
    One {
        /// Header name.
        name: String,
        /// Header value.
        value: String,
    },
    /// A complete mapping, stored as given.
    All(HeaderMap),
}

impl HeaderSet {
    fn into_map(self) -> HeaderMap {
        match self {
            Self::One { name, value } => {
                let mut map = HeaderMap::new();
                map.insert(name.to_lowercase(), Value::String(value.to_lowercase()));
                map
            }
            Self::All(map) => map,
        }
    }
}

impl<N, V> From<(N, V)> for HeaderSet
where
    N: Into<String>,
    V: Into<String>,
{
    fn from((name, value): (N, V)) -> Self {
        Self::One {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl From<HeaderMap> for HeaderSet {
    fn from(map: HeaderMap) -> Self {
        Self::All(map)
    }
}

impl TryFrom<Value> for HeaderSet {
    type Error = ResponseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::All(map)),
            other => Err(ResponseError::NotHeaderMap {
                kind: ValueKind::of(&other),
            }),
        }
    }
}

/// The mutable response offered to a handler.
///
/// # Example
///
/// ```
/// use invoke_stdio::{Response, ResponseError};
///
/// let mut response = Response::new();
/// response.send(&serde_json::json!({"pong": true}))?;
/// assert!(response.is_finished());
/// assert!(matches!(response.write("late"), Err(ResponseError::Finished)));
/// assert_eq!(response.body(), r#"{"pong":true}"#);
/// # Ok::<(), ResponseError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    protocol: Protocol,
    headers: Option<HeaderMap>,
    body: String,
    code: u16,
    finished: bool,
}

impl Response {
    /// Creates an unfinished response with status 200, no headers and an
    /// empty body.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            protocol: Protocol::Http,
            headers: None,
            body: String::new(),
            code: 200,
            finished: false,
        }
    }

    /// Creates a finished plain-text response with the given status.
    #[must_use]
    pub fn failure(code: u16, message: &str) -> Self {
        let mut response = Self::new();
        response.code = code;
        response.finish(message.to_owned(), TEXT_CONTENT_TYPE);
        response
    }

    /// Returns the transport tag.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the current headers, if any were set.
    #[must_use]
    pub const fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    /// Returns the current body.
    #[must_use]
    pub const fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Returns the status code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Returns `true` once `send` or `write` has succeeded.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Sets the status code. The value is not range-checked.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Finished`] if the response is finished.
    pub const fn set_code(&mut self, code: u16) -> Result<(), ResponseError> {
        if self.finished {
            return Err(ResponseError::Finished);
        }
        self.code = code;
        Ok(())
    }

    /// Replaces the headers wholesale.
    ///
    /// # Example
    ///
    /// ```
    /// use invoke_stdio::Response;
    ///
    /// let mut response = Response::new();
    /// response.set(("X-Mode", "FAST"))?;
    /// let headers = response.headers().expect("headers were set");
    /// assert_eq!(headers.get("x-mode"), Some(&serde_json::json!("fast")));
    /// # Ok::<(), invoke_stdio::ResponseError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Finished`] if the response is finished.
    pub fn set(&mut self, headers: impl Into<HeaderSet>) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.headers = Some(headers.into().into_map());
        Ok(())
    }

    /// Serialises `value` as the JSON body and finishes the response.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Finished`] if the response is finished, or
    /// [`ResponseError::Serialize`] if `value` cannot be serialised; in the
    /// latter case the response is left untouched.
    pub fn send<T>(&mut self, value: &T) -> Result<(), ResponseError>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_open()?;
        let body =
            serde_json::to_string(value).map_err(|source| ResponseError::Serialize { source })?;
        self.finish(body, JSON_CONTENT_TYPE);
        Ok(())
    }

    /// Stores `text` verbatim as the body and finishes the response.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Finished`] if the response is finished.
    pub fn write(&mut self, text: impl Into<String>) -> Result<(), ResponseError> {
        self.ensure_open()?;
        self.finish(text.into(), TEXT_CONTENT_TYPE);
        Ok(())
    }

    /// Like [`Response::write`], for values whose kind is only known at run
    /// time. Non-string values are rejected before any state changes.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Finished`] if the response is finished, or
    /// [`ResponseError::NotText`] if `value` is not a JSON string.
    pub fn write_value(&mut self, value: &Value) -> Result<(), ResponseError> {
        self.ensure_open()?;
        match value {
            Value::String(text) => self.write(text.as_str()),
            other => Err(ResponseError::NotText {
                kind: ValueKind::of(other),
            }),
        }
    }

    /// Snapshots the current state as the output object.
    #[must_use]
    pub fn to_output(&self) -> Output {
        Output::new(self.code, self.headers.clone(), self.body.clone())
    }

    const fn ensure_open(&self) -> Result<(), ResponseError> {
        if self.finished {
            Err(ResponseError::Finished)
        } else {
            Ok(())
        }
    }

    fn finish(&mut self, body: String, content_type: &str) {
        let mut headers = HeaderMap::new();
        headers.insert(
            String::from("content-type"),
            Value::String(content_type.to_owned()),
        );
        headers.insert(String::from("content-length"), Value::from(body.len()));
        self.headers = Some(headers);
        self.body = body;
        self.finished = true;
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
