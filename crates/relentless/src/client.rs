// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Debug};
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use http::{Method, Request, Response};
use http_body::Body;
use http_body_util::Full;
use parking_lot::Mutex;
use serde::Serialize;
use tick::Clock;

use crate::in_flight::InFlight;
use crate::race::race;
use crate::request::{FORM_CONTENT_TYPE, Template};
use crate::telemetry::Telemetry;
use crate::{
    AttemptLog, AttemptRecord, BodySnapshot, BoxError, ClientBuilder, ClientConfig, NotSet, Operation, RequestSpec, Result, Target,
    Transport,
};

/// Which lane produced a delivered result, and at which attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Delivery {
    /// The lane, starting at 0.
    pub lane: u32,
    /// The attempt within the lane, starting at 1. A call canceled before its first attempt
    /// reports 0.
    pub attempt: u32,
}

/// State shared by a client, its clones and every lane they start.
pub(crate) struct Inner<T> {
    pub(crate) transport: T,
    pub(crate) config: ClientConfig,
    pub(crate) log: AttemptLog,
    pub(crate) telemetry: Telemetry,
    pub(crate) clock: OnceLock<Clock>,
    pub(crate) in_flight: InFlight,
    pub(crate) last_delivery: Mutex<Option<Delivery>>,
}

impl<T> Inner<T> {
    /// The configured clock, or a Tokio clock created on first use inside the runtime.
    pub(crate) fn clock(&self) -> &Clock {
        self.clock.get_or_init(Clock::new_tokio)
    }
}

/// Sends requests through a [`Transport`] with retries, backoff and speculative lanes.
///
/// A client is cheap to clone; clones share the configuration, the attempt log and the
/// in-flight accounting. It can serve any number of concurrent calls.
///
/// Every call returns either the response of the first lane to finish or an [`Error`](crate::Error):
///
/// | Final attempt of the winning lane | Result |
/// |---|---|
/// | status below `500`, `429` unless retried | `Ok(response)` |
/// | `5xx`, or `429` when retried, with attempts exhausted | `Ok(response)` |
/// | transport failure with attempts exhausted | `Err(Error::Transport)` |
/// | cancellation token fired | `Err(Error::Canceled)` |
///
/// # Examples
///
/// ```
/// # use bytes::Bytes;
/// # use http::{Response, StatusCode};
/// # use http_body_util::Full;
/// # use layered::Execute;
/// # use relentless::{Client, ReplayBody, TransportError};
/// # async fn example() -> relentless::Result<()> {
/// let client = Client::builder()
///     .keep_log(true)
///     .transport(Execute::new(|_: http::Request<ReplayBody>| async {
///         let mut response = Response::new(Full::new(Bytes::new()));
///         *response.status_mut() = StatusCode::NOT_FOUND;
///         Ok::<_, TransportError>(response)
///     }))
///     .build();
///
/// let response = client.get("http://localhost/missing").await?;
///
/// // client errors are never retried
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// assert_eq!(client.log_count(), 0);
/// # Ok(())
/// # }
/// ```
pub struct Client<T> {
    inner: Arc<Inner<T>>,
}

impl Client<NotSet> {
    /// Starts building a client.
    #[must_use]
    pub fn builder() -> ClientBuilder<NotSet> {
        ClientBuilder::new()
    }
}

impl<T> Client<T> {
    pub(crate) fn from_inner(inner: Arc<Inner<T>>) -> Self {
        Self { inner }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &Arc<Inner<T>> {
        &self.inner
    }

    /// Returns the retry policy of this client.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Renders every retained record, one line each.
    ///
    /// Empty unless the client was built with [`keep_log`](ClientBuilder::keep_log).
    #[must_use]
    pub fn log_string(&self) -> String {
        self.inner.log.render()
    }

    /// Renders one record as a log line, exactly as it appears in [`log_string`](Self::log_string).
    #[must_use]
    pub fn format_record(&self, record: &AttemptRecord) -> String {
        record.to_string()
    }

    /// Returns the number of retained records.
    #[must_use]
    pub fn log_count(&self) -> usize {
        self.inner.log.len()
    }

    /// Returns a copy of the retained records.
    #[must_use]
    pub fn records(&self) -> Vec<AttemptRecord> {
        self.inner.log.records()
    }

    /// Returns which lane and attempt produced the most recently delivered result.
    #[must_use]
    pub fn last_delivery(&self) -> Option<Delivery> {
        *self.inner.last_delivery.lock()
    }

    /// Returns the number of lanes and drain listeners currently running for this client.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.count()
    }

    /// Waits until every lane and drain listener of every call made through this client has
    /// finished, including those of calls that already returned.
    pub async fn wait(&self) {
        self.inner.in_flight.idle().await;
    }
}

impl<T: Transport> Client<T> {
    /// Sends a prebuilt request.
    ///
    /// The body is read into memory once. Only `GET` requests are raced across lanes. A
    /// [`CancellationToken`](crate::CancellationToken) in the request extensions cancels the call.
    ///
    /// # Errors
    ///
    /// See [`Error`](crate::Error).
    pub async fn send<B>(&self, request: Request<B>) -> Result<Response<T::Body>>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        self.execute(RequestSpec::new(Operation::Send, Target::Request(request))).await
    }

    /// Issues a `GET` request, raced across the configured number of lanes.
    ///
    /// # Errors
    ///
    /// See [`Error`](crate::Error).
    pub async fn get(&self, url: &str) -> Result<Response<T::Body>> {
        self.run(Template::from_url(Operation::Get, Method::GET, url, None, BodySnapshot::default())?)
            .await
    }

    /// Issues a `HEAD` request.
    ///
    /// # Errors
    ///
    /// See [`Error`](crate::Error).
    pub async fn head(&self, url: &str) -> Result<Response<T::Body>> {
        self.run(Template::from_url(Operation::Head, Method::HEAD, url, None, BodySnapshot::default())?)
            .await
    }

    /// Issues a `POST` request with the given content type.
    ///
    /// # Errors
    ///
    /// See [`Error`](crate::Error).
    pub async fn post<B>(&self, url: &str, content_type: &str, body: B) -> Result<Response<T::Body>>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        self.execute(RequestSpec::new(Operation::Post, Target::Upload {
            url: url.to_string(),
            content_type: content_type.to_string(),
            body,
        }))
        .await
    }

    /// Issues a `POST` request with an in-memory body.
    ///
    /// # Errors
    ///
    /// See [`Error`](crate::Error).
    pub async fn post_bytes(&self, url: &str, content_type: &str, body: impl Into<Bytes>) -> Result<Response<T::Body>> {
        self.post(url, content_type, Full::new(body.into())).await
    }

    /// Issues a `POST` request with URL-encoded form values.
    ///
    /// `form` is anything `serde_urlencoded` can encode, such as a struct or a slice of pairs.
    ///
    /// # Errors
    ///
    /// See [`Error`](crate::Error).
    pub async fn post_form<F>(&self, url: &str, form: &F) -> Result<Response<T::Body>>
    where
        F: Serialize + ?Sized,
    {
        let encoded = serde_urlencoded::to_string(form)?;
        let template = Template::from_url(
            Operation::PostForm,
            Method::POST,
            url,
            Some(FORM_CONTENT_TYPE),
            BodySnapshot::new(encoded),
        )?;

        self.run(template).await
    }

    /// Runs an operation against its target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`](crate::Error::UnsupportedOperation) if the target
    /// does not fit the operation; otherwise see [`Error`](crate::Error).
    pub async fn execute<B>(&self, spec: RequestSpec<B>) -> Result<Response<T::Body>>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let template = spec.prepare().await?;
        self.run(template).await
    }

    async fn run(&self, template: Template) -> Result<Response<T::Body>> {
        race(&self.inner, template).await
    }
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("in_flight", &self.inner.in_flight.count())
            .finish_non_exhaustive()
    }
}
