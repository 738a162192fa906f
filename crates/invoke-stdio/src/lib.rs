//! Runs one named handler per process, speaking HTTP-style requests over
//! process arguments and standard streams.
//!
//! The host starts the binary as `<binary> NAME QUERY METHOD HEADERS` with the
//! request body on standard input. The crate builds a [`Request`], hands it to
//! the handler registered under `NAME` together with a fresh [`Response`], and
//! writes exactly one JSON object `{code, headers, body}` to standard output.
//!
//! ```no_run
//! use std::io;
//!
//! use invoke_stdio::HandlerRegistry;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = HandlerRegistry::new();
//! registry.register_sync("ping", |_request, response| {
//!     response.send(&serde_json::json!({"pong": true}))?;
//!     Ok(())
//! })?;
//! invoke_stdio::run(&registry, std::env::args_os(), &mut io::stdout().lock())?;
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
mod tests;

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod request;
pub mod response;
pub mod telemetry;

use std::ffi::OsString;
use std::io::Write;

use tokio::io::AsyncRead;
use tracing::warn;

pub use crate::cli::InvocationArgs;
pub use crate::config::{Config, ConfigError, LogFormat};
pub use crate::dispatch::{FAILURE_MESSAGE, NOT_FOUND_MESSAGE, dispatch, respond};
pub use crate::error::{
    BodyError, BoxError, DispatchError, InvokeError, RegistryError, RequestError, ResponseError,
};
pub use crate::protocol::{HeaderMap, Output, Protocol, ValueKind};
pub use crate::registry::{Handler, HandlerFuture, HandlerRegistry, HandlerResult, SyncHandler};
pub use crate::request::{Body, BodyStream, Request};
pub use crate::response::{HeaderSet, Response};

const INVOKE_TARGET: &str = "invoke_stdio";

/// Builds the request from `args` and `input` and dispatches it.
///
/// Invalid invocations never reach a handler; they produce a 400 output whose
/// plain-text body describes the problem.
pub async fn invoke<I, T, R>(registry: &HandlerRegistry, args: I, input: R) -> Output
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    R: AsyncRead + Send + Unpin + 'static,
{
    let request = InvocationArgs::from_args(args)
        .and_then(|parsed| Request::from_invocation(&parsed, input));
    match request {
        Ok(built) => respond(registry, &built).await,
        Err(error) => {
            warn!(target: INVOKE_TARGET, error = %error, "rejecting invalid invocation");
            Response::failure(400, &error.to_string()).to_output()
        }
    }
}

/// Runs one invocation to completion on a current-thread runtime and writes
/// the output object to `stdout`.
///
/// # Errors
///
/// Returns [`InvokeError`] if the runtime cannot start or the output cannot
/// be serialised or written. Handler failures are not errors here; they are
/// already reflected in the output object.
pub fn run_with_input<I, T, R>(
    registry: &HandlerRegistry,
    args: I,
    input: R,
    stdout: &mut impl Write,
) -> Result<(), InvokeError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    R: AsyncRead + Send + Unpin + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|source| InvokeError::Runtime { source })?;
    let output = runtime.block_on(invoke(registry, args, input));

    let payload =
        serde_json::to_string(&output).map_err(|source| InvokeError::Serialize { source })?;
    stdout
        .write_all(payload.as_bytes())
        .map_err(|source| InvokeError::Write { source })?;
    stdout.flush().map_err(|source| InvokeError::Write { source })
}

/// Runs one invocation with the process's standard input as the body.
///
/// # Errors
///
/// See [`run_with_input`].
pub fn run<I, T>(
    registry: &HandlerRegistry,
    args: I,
    stdout: &mut impl Write,
) -> Result<(), InvokeError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    run_with_input(registry, args, tokio::io::stdin(), stdout)
}
