//! Errors raised while building, dispatching and answering an invocation.
//!
//! All errors use `thiserror`-derived enums with structured context so the
//! dispatcher can decide how each one surfaces in the output object. Handler
//! code returns [`BoxError`], so any of these propagate with `?`.

use thiserror::Error;

use crate::protocol::ValueKind;

/// A boxed error returned by handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors arising while turning invocation inputs into a request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The positional invocation arguments could not be parsed.
    #[error("invalid invocation arguments: {message}")]
    Arguments {
        /// Rendered argument parser diagnostic.
        message: String,
    },

    /// The handler name was empty.
    #[error("handler name must not be empty")]
    EmptyName,

    /// The query parameter was not valid JSON.
    #[error("query parameter is not valid JSON: {source}")]
    Query {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The headers parameter was not valid JSON.
    #[error("headers parameter is not valid JSON: {source}")]
    Headers {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The headers parameter was valid JSON but not an object.
    #[error("headers parameter must be a JSON object, got {kind}")]
    HeadersNotObject {
        /// Kind of the value that was supplied.
        kind: ValueKind,
    },
}

/// Errors raised by the request body accessors.
#[derive(Debug, Error)]
pub enum BodyError {
    /// Reading the input stream failed.
    #[error("failed to read request body: {source}")]
    Read {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The input was not valid UTF-8.
    #[error("request body is not valid UTF-8: {source}")]
    Utf8 {
        /// Underlying decoding error.
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The body text was not valid JSON.
    #[error("request body is not valid JSON: {source}")]
    Json {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The raw stream was taken or lost before the text could be read.
    #[error("request body stream has already been consumed")]
    Consumed,
}

/// Errors raised by response mutators.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The response was already finished by `send` or `write`.
    #[error("response already finished")]
    Finished,

    /// The value passed to `send` could not be serialised.
    #[error("failed to serialise response body: {source}")]
    Serialize {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// `write` was given a non-textual value.
    #[error("text should be a string, got {kind}; use send for other values")]
    NotText {
        /// Kind of the value that was supplied.
        kind: ValueKind,
    },

    /// `set` was given a value that is not a header mapping.
    #[error("headers should be an object, got {kind}")]
    NotHeaderMap {
        /// Kind of the value that was supplied.
        kind: ValueKind,
    },
}

/// Errors raised while registering handlers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A handler was registered without a name.
    #[error("handler name must not be empty")]
    EmptyName,

    /// A handler with the same name is already registered.
    #[error("handler '{name}' is already registered")]
    Duplicate {
        /// The contested name.
        name: String,
    },
}

/// Errors raised while dispatching to a handler.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The handler returned an error.
    #[error("handler '{name}' failed: {source}")]
    Handler {
        /// Handler name.
        name: String,
        /// Error returned by the handler.
        #[source]
        source: BoxError,
    },

    /// The handler panicked.
    #[error("handler '{name}' panicked: {message}")]
    Panicked {
        /// Handler name.
        name: String,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// The dispatcher could not update the response itself.
    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// Errors raised at the process boundary.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The async runtime could not be created.
    #[error("failed to start invocation runtime: {source}")]
    Runtime {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The output object could not be serialised.
    #[error("failed to serialise invocation output: {source}")]
    Serialize {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Writing the output object failed.
    #[error("failed to write invocation output: {source}")]
    Write {
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
