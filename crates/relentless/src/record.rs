// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display};
use std::time::{SystemTime, UNIX_EPOCH};

use http::{Method, StatusCode};

use crate::{Operation, TransportError};

/// Why an attempt failed.
#[derive(Debug, Clone)]
pub enum AttemptFailure {
    /// The transport produced no response.
    Transport(TransportError),
    /// The response carried a `5xx` status.
    ServerError(StatusCode),
    /// The response carried `429 Too Many Requests` and retrying it is enabled.
    TooManyRequests,
}

impl AttemptFailure {
    /// A short, stable name for the failure kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::ServerError(_) => "server_error",
            Self::TooManyRequests => "too_many_requests",
        }
    }
}

impl Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => Display::fmt(e, f),
            Self::ServerError(status) => write!(f, "server error: {status}"),
            Self::TooManyRequests => write!(f, "too many requests: {}", StatusCode::TOO_MANY_REQUESTS),
        }
    }
}

/// One failed attempt.
///
/// Records of a single lane are produced in attempt order. Records of different lanes may
/// interleave in any order.
///
/// The `Display` form is one log line:
///
/// ```text
/// 1491271979 Get [GET] http://localhost:9000/foo request-0 retry-2 error: connection refused
/// ```
///
/// where `request-` is followed by the lane and `retry-` by [`retry_number`](Self::retry_number),
/// which is the attempt number plus one. The line above is therefore the failure of attempt 1.
/// Use [`attempt`](Self::attempt) for the real 1-based attempt.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AttemptRecord {
    /// When the attempt failed, according to the client's clock.
    pub time: SystemTime,
    /// The kind of call.
    pub operation: Operation,
    /// The request method.
    pub verb: Method,
    /// The request URL.
    pub url: String,
    /// The lane that made the attempt, starting at 0.
    pub lane: u32,
    /// The attempt number within the lane, starting at 1.
    pub attempt: u32,
    /// Why the attempt failed.
    pub failure: AttemptFailure,
}

impl AttemptRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(
        time: SystemTime,
        operation: Operation,
        verb: Method,
        url: impl Into<String>,
        lane: u32,
        attempt: u32,
        failure: AttemptFailure,
    ) -> Self {
        Self {
            time,
            operation,
            verb,
            url: url.into(),
            lane,
            attempt,
            failure,
        }
    }

    /// The counter printed after `retry-` in the log line: the attempt number plus one.
    #[must_use]
    pub fn retry_number(&self) -> u32 {
        self.attempt.saturating_add(1)
    }

    /// Seconds since the Unix epoch; times before it are reported as 0.
    #[must_use]
    pub fn unix_seconds(&self) -> u64 {
        self.time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
    }
}

impl Display for AttemptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} [{}] {} request-{} retry-{} error: {}",
            self.unix_seconds(),
            self.operation,
            self.verb,
            self.url,
            self.lane,
            self.retry_number(),
            self.failure
        )
    }
}
