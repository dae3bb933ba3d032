// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

use crate::TransportError;

/// A boxed error of unknown type, as produced by request bodies and transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The ways a call can end without a response.
///
/// Retryable conditions (transport failures, `5xx` and, when enabled, `429` statuses) never
/// surface here while attempts remain. Only the final outcome of the winning lane does.
///
/// # Thread safety
///
/// This type is thread-safe.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested operation is not one of `Do`, `Get`, `Head`, `Post` and `PostForm`, or it
    /// was paired with a target it does not accept. No attempt was made.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The URL, method or headers could not form a request. No attempt was made.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),

    /// Form values could not be encoded. No attempt was made.
    #[error("failed to encode form values: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// The request body could not be read into memory. No attempt was made.
    #[error("failed to read the request body: {0}")]
    BodyRead(#[source] BoxError),

    /// The last allowed attempt of the winning lane failed in the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The call's cancellation token fired before the winning lane finished.
    #[error("operation canceled")]
    Canceled,

    /// Every lane stopped without reporting a result.
    ///
    /// This happens when the transport panics or the runtime shuts down mid-call.
    #[error("every lane stopped without reporting a result")]
    Abandoned,
}

impl Error {
    /// Returns `true` if the call ended because its cancellation token fired.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Returns `true` if the call failed before any attempt was made.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOperation(_) | Self::InvalidRequest(_) | Self::Form(_) | Self::BodyRead(_)
        )
    }
}

/// A specialized `Result` for calls made through a [`Client`](crate::Client).
pub type Result<T> = std::result::Result<T, Error>;
