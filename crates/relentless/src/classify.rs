// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use http::StatusCode;

/// How a response status is treated by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// Any status below `400`, and `429` when retrying it is disabled. Delivered as-is.
    Success,
    /// A `4xx` status other than `429`. Never retried; delivered as-is.
    ClientError,
    /// `429 Too Many Requests` with retrying it enabled. Retryable.
    TooManyRequests,
    /// A `5xx` status. Retryable.
    ServerError,
}

impl StatusClass {
    /// Classifies `status`.
    ///
    /// ```
    /// # use http::StatusCode;
    /// # use relentless::StatusClass;
    /// assert_eq!(StatusClass::of(StatusCode::BAD_GATEWAY, false), StatusClass::ServerError);
    /// assert_eq!(StatusClass::of(StatusCode::TOO_MANY_REQUESTS, false), StatusClass::Success);
    /// assert_eq!(StatusClass::of(StatusCode::TOO_MANY_REQUESTS, true), StatusClass::TooManyRequests);
    /// ```
    #[must_use]
    pub fn of(status: StatusCode, retry_on_429: bool) -> Self {
        if status.is_server_error() || status.as_u16() >= 600 {
            Self::ServerError
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            if retry_on_429 { Self::TooManyRequests } else { Self::Success }
        } else if status.is_client_error() {
            Self::ClientError
        } else {
            Self::Success
        }
    }

    /// Returns `true` if another attempt should be made.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::ServerError | Self::TooManyRequests)
    }
}
