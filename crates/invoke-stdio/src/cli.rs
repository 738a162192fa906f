//! Positional invocation arguments.
//!
//! The host starts the adapter as `<binary> NAME QUERY METHOD HEADERS`, with
//! the request body on standard input. None of the positions accept flags, so
//! values that happen to begin with a hyphen are taken literally.

use std::ffi::OsString;

use clap::Parser;

use crate::error::RequestError;

/// The four positional inputs of one invocation.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "invoke",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct InvocationArgs {
    /// Name of the handler to invoke.
    #[arg(value_name = "NAME", allow_hyphen_values = true)]
    pub name: String,
    /// JSON-encoded query parameters.
    #[arg(value_name = "QUERY", allow_hyphen_values = true)]
    pub query: String,
    /// HTTP method, in any letter case.
    #[arg(value_name = "METHOD", allow_hyphen_values = true)]
    pub method: String,
    /// JSON-encoded header object.
    #[arg(value_name = "HEADERS", allow_hyphen_values = true)]
    pub headers: String,
}

impl InvocationArgs {
    /// Creates the arguments directly, bypassing argv parsing.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        query: impl Into<String>,
        method: impl Into<String>,
        headers: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            method: method.into(),
            headers: headers.into(),
        }
    }

    /// Parses process arguments, the first of which is the binary name.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Arguments`] when a position is missing or
    /// unexpected extra arguments are present.
    pub fn from_args<I, T>(args: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|error| RequestError::Arguments {
            message: error.render().to_string().trim().to_owned(),
        })
    }
}
