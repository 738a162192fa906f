//! Dispatcher: selects one handler by exact name, awaits it and produces the
//! output object.
//!
//! [`dispatch`] implements the bare algorithm and reports handler failures as
//! [`DispatchError`]. [`respond`] wraps it in the guard that always yields a
//! well-formed [`Output`], whatever the handler did.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::{debug, error, info};

use crate::error::DispatchError;
use crate::protocol::Output;
use crate::registry::HandlerRegistry;
use crate::request::Request;
use crate::response::Response;

const DISPATCH_TARGET: &str = "invoke_stdio::dispatch";

/// Body written when no handler matches the request name.
pub const NOT_FOUND_MESSAGE: &str = "Function not found";

/// Body written when a handler fails before finishing its response.
pub const FAILURE_MESSAGE: &str = "Function failed";

/// Invokes the handler registered under `request.name()`.
///
/// With no match the response becomes a 404 carrying [`NOT_FOUND_MESSAGE`].
/// Otherwise the handler's future is awaited to completion; a panic while
/// creating or polling it is caught and reported rather than unwinding
/// through the caller.
///
/// # Errors
///
/// Returns [`DispatchError::Handler`] when the handler returns an error and
/// [`DispatchError::Panicked`] when it panics. In both cases `response`
/// keeps whatever state the handler left behind.
pub async fn dispatch(
    registry: &HandlerRegistry,
    request: &Request,
    response: &mut Response,
) -> Result<(), DispatchError> {
    let Some(handler) = registry.get(request.name()) else {
        debug!(
            target: DISPATCH_TARGET,
            handler = request.name(),
            registered = registry.len(),
            "no handler matches request name"
        );
        response.set_code(404)?;
        response.write(NOT_FOUND_MESSAGE)?;
        return Ok(());
    };

    info!(
        target: DISPATCH_TARGET,
        handler = request.name(),
        method = request.method(),
        "invoking handler"
    );
    // `call` may run handler code before returning its future.
    let outcome = match panic::catch_unwind(AssertUnwindSafe(move || {
        let response = response;
        handler.call(request, response)
    })) {
        Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
        Err(payload) => Err(payload),
    };
    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(DispatchError::Handler {
            name: request.name().to_owned(),
            source,
        }),
        Err(payload) => Err(DispatchError::Panicked {
            name: request.name().to_owned(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

/// Dispatches `request` and returns the output object for it.
///
/// A failed handler that already finished its response keeps that response;
/// otherwise the output is a 500 carrying [`FAILURE_MESSAGE`].
pub async fn respond(registry: &HandlerRegistry, request: &Request) -> Output {
    let mut response = Response::new();
    if let Err(failure) = dispatch(registry, request, &mut response).await {
        error!(
            target: DISPATCH_TARGET,
            handler = request.name(),
            finished = response.is_finished(),
            error = %failure,
            "handler failed"
        );
        if !response.is_finished() {
            response = Response::failure(500, FAILURE_MESSAGE);
        }
    }

    debug!(
        target: DISPATCH_TARGET,
        code = response.code(),
        finished = response.is_finished(),
        "response ready"
    );
    response.to_output()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-string panic payload"))
}
