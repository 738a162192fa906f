//! Lazy access to the request body on standard input.
//!
//! Nothing is read until a handler asks for it. The text accessor drains the
//! stream to end of input and caches the result, so every later call returns
//! the same text without touching the stream again.

use std::fmt;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{Mutex, OnceCell};

use crate::error::BodyError;

/// A type-erased byte stream supplying the request body.
pub type BodyStream = Box<dyn AsyncRead + Send + Unpin>;

/// The request body: the raw input stream plus derived text and JSON views.
pub struct Body {
    raw: Mutex<Option<BodyStream>>,
    text: OnceCell<String>,
}

impl Body {
    /// Wraps an input stream without reading from it.
    pub fn new<R>(input: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            raw: Mutex::new(Some(Box::new(input))),
            text: OnceCell::new(),
        }
    }

    /// A body with no content.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(tokio::io::empty())
    }

    /// Takes ownership of the raw input stream.
    ///
    /// Returns `None` once the stream has been taken or the text has been
    /// read. After the stream is taken, [`Body::text`] fails with
    /// [`BodyError::Consumed`].
    pub async fn take_raw(&self) -> Option<BodyStream> {
        if self.text.initialized() {
            return None;
        }
        self.raw.lock().await.take()
    }

    /// Reads the whole input as UTF-8 text.
    ///
    /// The first call reads until the stream reports end of input; later
    /// calls return the cached text.
    ///
    /// # Errors
    ///
    /// Returns [`BodyError::Read`] or [`BodyError::Utf8`] when the input cannot
    /// be read, and [`BodyError::Consumed`] when the stream was taken or lost
    /// to an earlier failed read.
    pub async fn text(&self) -> Result<&str, BodyError> {
        self.text
            .get_or_try_init(|| self.read_to_end())
            .await
            .map(String::as_str)
    }

    /// Reads the whole input and parses it as JSON.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Body::text`], or [`BodyError::Json`] when the
    /// text does not parse into `T`.
    pub async fn json<T>(&self) -> Result<T, BodyError>
    where
        T: DeserializeOwned,
    {
        let text = self.text().await?;
        serde_json::from_str(text).map_err(|source| BodyError::Json { source })
    }

    async fn read_to_end(&self) -> Result<String, BodyError> {
        let mut stream = self.raw.lock().await.take().ok_or(BodyError::Consumed)?;
        let mut buffer = Vec::new();
        stream
            .read_to_end(&mut buffer)
            .await
            .map_err(|source| BodyError::Read { source })?;
        String::from_utf8(buffer).map_err(|source| BodyError::Utf8 { source })
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("text", &self.text.get())
            .finish_non_exhaustive()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}
