// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::{Arc, OnceLock};

use http::Extensions;
use parking_lot::Mutex;
use tick::Clock;

use crate::attempt_log::{ContextLogHook, LogHook};
use crate::client::Inner;
use crate::in_flight::InFlight;
use crate::telemetry::Telemetry;
use crate::{AttemptLog, AttemptRecord, Backoff, Client, ClientConfig, Transport};

/// A flag indicating that the required property has not been set.
#[non_exhaustive]
#[derive(Debug)]
pub struct NotSet;

/// Builder for [`Client`].
///
/// Created by [`Client::builder`]. Every setting has a default except the transport, which is
/// required: [`build`](Self::build) becomes available once [`transport`](Self::transport)
/// has been called.
///
/// ```
/// # use std::time::Duration;
/// # use bytes::Bytes;
/// # use http::Response;
/// # use http_body_util::Full;
/// # use layered::Execute;
/// # use relentless::{Backoff, Client, ReplayBody, TransportError};
/// let client = Client::builder()
///     .concurrency(2)
///     .max_attempts(4)
///     .backoff(Backoff::linear().unit(Duration::from_millis(50)))
///     .retry_on_429(true)
///     .log_hook(|record| eprint!("{record}"))
///     .transport(Execute::new(|_: http::Request<ReplayBody>| async {
///         Ok::<_, TransportError>(Response::new(Full::new(Bytes::new())))
///     }))
///     .build();
///
/// assert_eq!(client.config().max_attempts, 4);
/// ```
#[derive(Debug)]
pub struct ClientBuilder<T = NotSet> {
    config: ClientConfig,
    log_hook: Option<LogHook>,
    context_log_hook: Option<ContextLogHook>,
    clock: Option<Clock>,
    telemetry: Telemetry,
    transport: T,
}

impl ClientBuilder<NotSet> {
    pub(crate) fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            log_hook: None,
            context_log_hook: None,
            clock: None,
            telemetry: Telemetry::default(),
            transport: NotSet,
        }
    }
}

impl<T> ClientBuilder<T> {
    /// Replaces every policy setting at once.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the number of lanes raced for `GET` requests.
    ///
    /// **Default**: 1
    #[must_use]
    pub fn concurrency(mut self, concurrency: u32) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Sets the number of attempts each lane makes. 0 is treated as 1.
    ///
    /// **Default**: 3
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Sets the wait between a failed attempt and the next.
    ///
    /// **Default**: [`Backoff::constant`] with a one second unit
    #[must_use]
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.config.backoff = backoff;
        self
    }

    /// Sets whether `429 Too Many Requests` is retried.
    ///
    /// **Default**: `false`, the response is delivered as-is
    #[must_use]
    pub fn retry_on_429(mut self, enabled: bool) -> Self {
        self.config.retry_on_429 = enabled;
        self
    }

    /// Sets whether failed attempts are retained in memory.
    ///
    /// When enabled, hooks are not called.
    ///
    /// **Default**: `false`
    #[must_use]
    pub fn keep_log(mut self, enabled: bool) -> Self {
        self.config.keep_log = enabled;
        self
    }

    /// Sets a hook called with every failed attempt, unless the log is retained or a
    /// [`context_log_hook`](Self::context_log_hook) is set.
    ///
    /// The hook runs on the lane that failed, before the lane waits; a slow hook slows retries.
    #[must_use]
    pub fn log_hook(mut self, hook: impl Fn(&AttemptRecord) + Send + Sync + 'static) -> Self {
        self.log_hook = Some(LogHook::new(hook));
        self
    }

    /// Sets a hook called with the extensions of the originating request and every failed
    /// attempt, unless the log is retained.
    ///
    /// Takes precedence over [`log_hook`](Self::log_hook).
    #[must_use]
    pub fn context_log_hook(mut self, hook: impl Fn(&Extensions, &AttemptRecord) + Send + Sync + 'static) -> Self {
        self.context_log_hook = Some(ContextLogHook::new(hook));
        self
    }

    /// Sets the clock used for backoff waits and attempt timestamps.
    ///
    /// **Default**: a Tokio-driven clock, created on the first call
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Emits `tracing` events for failed attempts, delivered results and drained responses.
    #[must_use]
    #[cfg(any(feature = "logs", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "logs")))]
    pub fn enable_logs(mut self) -> Self {
        self.telemetry = self.telemetry.with_logs();
        self
    }

    /// Reports failed attempts through the given OpenTelemetry meter provider.
    #[must_use]
    #[cfg(any(feature = "metrics", test))]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    pub fn enable_metrics(mut self, provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        self.telemetry = self.telemetry.with_metrics(provider);
        self
    }

    /// Sets the transport every attempt goes through.
    #[must_use]
    pub fn transport<U: Transport>(self, transport: U) -> ClientBuilder<U> {
        ClientBuilder {
            config: self.config,
            log_hook: self.log_hook,
            context_log_hook: self.context_log_hook,
            clock: self.clock,
            telemetry: self.telemetry,
            transport,
        }
    }
}

impl<T: Transport> ClientBuilder<T> {
    /// Builds the client.
    #[must_use]
    pub fn build(self) -> Client<T> {
        let log = AttemptLog::new(self.config.keep_log, self.context_log_hook, self.log_hook);
        let clock = self.clock.map_or_else(OnceLock::new, OnceLock::from);

        Client::from_inner(Arc::new(Inner {
            transport: self.transport,
            config: self.config,
            log,
            telemetry: self.telemetry,
            clock,
            in_flight: InFlight::default(),
            last_delivery: Mutex::new(None),
        }))
    }
}
