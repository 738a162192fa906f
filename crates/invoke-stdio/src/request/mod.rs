//! Request Builder: normalises invocation inputs into a [`Request`].
//!
//! The request is built once at process start and is read-only afterwards.
//! Malformed `query` or `headers` JSON is reported as a [`RequestError`]; the
//! caller decides how that surfaces in the output object.

mod body;

use serde_json::Value;
use tokio::io::AsyncRead;

pub use self::body::{Body, BodyStream};
use crate::cli::InvocationArgs;
use crate::error::RequestError;
use crate::protocol::{HeaderMap, Protocol, ValueKind};

/// A normalised request handed to the selected handler.
///
/// # Example
///
/// ```
/// use invoke_stdio::{InvocationArgs, Request};
///
/// let args = InvocationArgs::new("ping", r#"{"page":"2"}"#, "get", "{}");
/// let request = Request::from_invocation(&args, tokio::io::empty())?;
/// assert_eq!(request.method(), "GET");
/// assert_eq!(request.path(), "/ping");
/// # Ok::<(), invoke_stdio::RequestError>(())
/// ```
#[derive(Debug)]
pub struct Request {
    protocol: Protocol,
    name: String,
    path: String,
    query: Value,
    method: String,
    headers: HeaderMap,
    body: Body,
}

impl Request {
    /// Builds a request from the positional inputs and the body stream.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::EmptyName`] for an empty handler name,
    /// [`RequestError::Query`] or [`RequestError::Headers`] for malformed
    /// JSON, and [`RequestError::HeadersNotObject`] when the headers are not
    /// a JSON object.
    pub fn from_invocation<R>(args: &InvocationArgs, input: R) -> Result<Self, RequestError>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        if args.name.is_empty() {
            return Err(RequestError::EmptyName);
        }

        let query = serde_json::from_str(&args.query)
            .map_err(|source| RequestError::Query { source })?;
        let headers = match serde_json::from_str(&args.headers)
            .map_err(|source| RequestError::Headers { source })?
        {
            Value::Object(map) => map,
            other => {
                return Err(RequestError::HeadersNotObject {
                    kind: ValueKind::of(&other),
                });
            }
        };

        Ok(Self {
            protocol: Protocol::Http,
            path: format!("/{}", args.name),
            name: args.name.clone(),
            query,
            method: args.method.to_uppercase(),
            headers,
            body: Body::new(input),
        })
    }

    /// Returns the transport tag.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the handler name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns `/` followed by the handler name.
    #[must_use]
    pub const fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Returns the decoded query value.
    #[must_use]
    pub const fn query(&self) -> &Value {
        &self.query
    }

    /// Returns the uppercased method.
    #[must_use]
    pub const fn method(&self) -> &str {
        self.method.as_str()
    }

    /// Returns the decoded header object.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Looks up a header by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Looks up a header as text.
    ///
    /// Hosts may forward each header as a list of values; in that case the
    /// first value is returned.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        match self.header(name)? {
            Value::String(text) => Some(text.as_str()),
            Value::Array(values) => values.first().and_then(Value::as_str),
            _ => None,
        }
    }

    /// Returns the lazy body accessor.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }
}
