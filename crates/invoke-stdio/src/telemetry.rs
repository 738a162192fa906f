//! Diagnostic logging for the invocation process.
//!
//! Standard output carries exactly one output object, so every event goes to
//! standard error. The subscriber is built over any [`MakeWriter`] and the
//! process-wide installation in [`initialise`] always passes `io::stderr`.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};

use crate::config::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Boxed subscriber produced by [`subscriber`].
pub type BoxSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Proof that logging has been initialised for this process.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring logging.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression could not be parsed.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// The rejected expression.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Builds a subscriber for `config` that writes through `writer`.
///
/// ANSI colouring is only enabled when `ansi` is set; events carry their
/// target and an RFC 3339 UTC timestamp.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the filter expression is invalid.
pub fn subscriber<W>(
    config: &Config,
    writer: W,
    ansi: bool,
) -> Result<BoxSubscriber, TelemetryError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
            filter: config.log_filter().to_owned(),
            message: error.to_string(),
        })?;

    let base = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(base.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(base.compact().finish()),
    })
}

/// Installs the stderr subscriber the first time it is called.
///
/// Later calls, whatever their configuration, return a handle without
/// touching global state.
///
/// # Examples
///
/// ```rust
/// use invoke_stdio::{Config, LogFormat, telemetry};
///
/// # fn main() -> Result<(), telemetry::TelemetryError> {
/// telemetry::initialise(&Config::new("invoke_stdio=debug", LogFormat::Json))?;
/// // Already installed: the second configuration is ignored.
/// telemetry::initialise(&Config::default())?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter and
/// [`TelemetryError::Subscriber`] when a subscriber was installed globally by
/// someone else.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED.get_or_try_init(|| {
        let installed = subscriber(config, io::stderr, io::stderr().is_terminal())?;
        tracing::subscriber::set_global_default(installed)?;
        Ok::<(), TelemetryError>(())
    })?;
    Ok(TelemetryHandle)
}
