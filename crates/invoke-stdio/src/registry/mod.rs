//! Handler table supplied by the embedding binary.
//!
//! The [`HandlerRegistry`] maps exact, case-sensitive names to handlers and is
//! passed explicitly into the dispatcher. The first registration under a name
//! wins; later attempts are rejected and leave the first handler in place.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::{BoxError, RegistryError};
use crate::request::Request;
use crate::response::Response;

/// Outcome of a handler call.
pub type HandlerResult = Result<(), BoxError>;

/// The future a handler returns; the dispatcher awaits it before writing
/// output.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;

/// A named unit of business logic.
///
/// Closures of the shape `|request, response| Box::pin(async move { .. })`
/// implement this trait directly; plain synchronous functions can be wrapped
/// in [`SyncHandler`].
pub trait Handler: Send + Sync {
    /// Handles one request by mutating `response`.
    fn call<'a>(&'a self, request: &'a Request, response: &'a mut Response) -> HandlerFuture<'a>;
}

impl<F> Handler for F
where
    F: for<'a> Fn(&'a Request, &'a mut Response) -> HandlerFuture<'a> + Send + Sync,
{
    fn call<'a>(&'a self, request: &'a Request, response: &'a mut Response) -> HandlerFuture<'a> {
        (self)(request, response)
    }
}

/// Adapts a synchronous function into a [`Handler`].
///
/// The function runs when the returned future is first polled, not when
/// [`Handler::call`] returns.
pub struct SyncHandler<F> {
    function: F,
}

impl<F> SyncHandler<F>
where
    F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync,
{
    /// Wraps `function`.
    pub const fn new(function: F) -> Self {
        Self { function }
    }
}

impl<F> Handler for SyncHandler<F>
where
    F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync,
{
    fn call<'a>(&'a self, request: &'a Request, response: &'a mut Response) -> HandlerFuture<'a> {
        Box::pin(async move { (self.function)(request, response) })
    }
}

/// Registry of handlers available to one invocation.
///
/// # Example
///
/// ```
/// use invoke_stdio::{HandlerRegistry, RegistryError};
///
/// let mut registry = HandlerRegistry::new();
/// registry.register_sync("ping", |_request, response| {
///     response.send(&serde_json::json!({"pong": true}))?;
///     Ok(())
/// })?;
/// assert!(registry.get("ping").is_some());
/// assert!(registry.get("Ping").is_none());
/// # Ok::<(), RegistryError>(())
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] for an empty name and
    /// [`RegistryError::Duplicate`] when the name is already taken.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H) -> Result<(), RegistryError>
    where
        H: Handler + 'static,
    {
        let key = name.into();
        if key.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::Duplicate { name: key });
        }
        self.handlers.insert(key, Box::new(handler));
        Ok(())
    }

    /// Registers an asynchronous closure under `name`.
    ///
    /// # Errors
    ///
    /// Same as [`HandlerRegistry::register`].
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        function: F,
    ) -> Result<(), RegistryError>
    where
        F: for<'a> Fn(&'a Request, &'a mut Response) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        self.register(name, function)
    }

    /// Registers a synchronous function under `name`.
    ///
    /// # Errors
    ///
    /// Same as [`HandlerRegistry::register`].
    pub fn register_sync<F>(
        &mut self,
        name: impl Into<String>,
        function: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(name, SyncHandler::new(function))
    }

    /// Looks up a handler by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Handler> {
        self.handlers.get(name).map(Box::as_ref)
    }

    /// Returns the registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
