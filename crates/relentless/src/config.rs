// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::Backoff;

const DEFAULT_CONCURRENCY: u32 = 1;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// The retry policy of a [`Client`](crate::Client).
///
/// The default is the documented preset: one lane, three attempts, a constant one second
/// backoff, `429` delivered as-is and no retained log.
///
/// A configuration is a plain value. It is copied into the client when the client is built and
/// never changes afterwards, so one client can serve any number of concurrent calls.
///
/// # Examples
///
/// ```
/// # use std::time::Duration;
/// # use relentless::{Backoff, ClientConfig};
/// let config = ClientConfig {
///     concurrency: 3,
///     max_attempts: 5,
///     backoff: Backoff::linear_jitter().unit(Duration::from_millis(250)),
///     ..ClientConfig::default()
/// };
///
/// assert_eq!(config.effective_max_attempts(), 5);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct ClientConfig {
    /// The number of lanes raced for `GET` requests. Values below 1 are treated as 1; any
    /// other method always uses a single lane.
    pub concurrency: u32,
    /// The number of attempts each lane makes. 0 is treated as 1.
    pub max_attempts: u32,
    /// The wait between a failed attempt and the next.
    pub backoff: Backoff,
    /// Whether `429 Too Many Requests` is retried. When disabled it is delivered as-is.
    pub retry_on_429: bool,
    /// Whether failed attempts are retained in memory.
    ///
    /// Retention takes precedence over log hooks.
    pub keep_log: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
            retry_on_429: false,
            keep_log: false,
        }
    }
}

impl ClientConfig {
    /// The number of attempts each lane actually makes.
    #[must_use]
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// The number of lanes a call with the given raceability actually uses.
    #[must_use]
    pub fn effective_concurrency(&self, idempotent_read: bool) -> u32 {
        if idempotent_read { self.concurrency.max(1) } else { 1 }
    }
}
