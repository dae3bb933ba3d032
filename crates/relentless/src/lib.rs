// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Retries, backoff and speculative lanes in front of a request/response transport.
//!
//! `relentless` wraps any transport that turns an [`http::Request`] into an
//! [`http::Response`] and adds bounded retries with configurable backoff, optional
//! speculative concurrency for idempotent reads, cancellation-aware waiting and a log
//! of every failed attempt. The transport itself (TLS, pooling, DNS) is not owned by
//! this crate; it is consumed through the [`Transport`] trait, which every
//! [`layered::Service`] with the right shape implements.
//!
//! # Quick Start
//!
//! ```rust
//! # use std::time::Duration;
//! # use bytes::Bytes;
//! # use http::{Response, StatusCode};
//! # use http_body_util::Full;
//! # use layered::Execute;
//! # use relentless::{Backoff, Client, ReplayBody, TransportError};
//! # async fn example() -> relentless::Result<()> {
//! let transport = Execute::new(|_request: http::Request<ReplayBody>| async move {
//!     Ok::<_, TransportError>(Response::new(Full::new(Bytes::from_static(b"OK"))))
//! });
//!
//! let client = Client::builder()
//!     .concurrency(3)
//!     .max_attempts(5)
//!     .backoff(Backoff::exponential_jitter().unit(Duration::from_millis(100)))
//!     .keep_log(true)
//!     .transport(transport)
//!     .build();
//!
//! let response = client.get("http://localhost/health").await?;
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(client.log_count(), 0);
//! # Ok(())
//! # }
//! ```
//!
//! # How a Call Runs
//!
//! 1. The request body is read into memory exactly once ([`BodySnapshot`]); every
//!    attempt receives a fresh [`ReplayBody`] over the captured bytes.
//! 2. One or more lanes are started. Only `GET` requests use more than one lane;
//!    any other method is forced to a single lane because racing mutating requests
//!    is unsafe.
//! 3. Each lane runs its own retry loop: a transport error, a `5xx` status or (when
//!    enabled) a `429` status is logged, the lane waits according to the [`Backoff`]
//!    and tries again until its attempts are exhausted.
//! 4. The first lane to finish wins. Every response that arrives later is drained and
//!    closed in the background so that connections can be reused.
//!
//! # Cancellation
//!
//! A [`CancellationToken`] stored in the request extensions cancels the call: the lane
//! stops waiting on backoff immediately and the call returns [`Error::Canceled`]. An
//! attempt that is already in flight is not interrupted by this crate; honoring
//! cancellation inside the transport is up to the transport.
//!
//! # Attempt Log
//!
//! Failed attempts are described by [`AttemptRecord`]. With [`ClientBuilder::keep_log`]
//! they are retained in memory and can be inspected with [`Client::records`],
//! [`Client::log_count`] and [`Client::log_string`]. Otherwise they are forwarded to a
//! context-aware hook, then a plain hook, whichever is configured first.
//!
//! # Features
//!
//! - `logs`: Emits `tracing` events for failed attempts, delivered results and drained responses.
//! - `metrics`: Reports failed attempts through an OpenTelemetry counter.
//! - `serde`: Deserialization of [`ClientConfig`].
//! - `hyper`: A default [`HyperTransport`] and the self-constructing [`get`], [`head`],
//!   [`post`], [`post_form`] and [`send`] functions.

#[doc(inline)]
pub use tokio_util::sync::CancellationToken;

mod fn_wrapper;
pub(crate) use fn_wrapper::define_fn_wrapper;

mod rnd;

mod backoff;
pub use backoff::Backoff;

mod snapshot;
pub use snapshot::{BodySnapshot, ReplayBody};

mod request;
pub use request::{Operation, RequestSpec, Target};

mod classify;
pub use classify::StatusClass;

mod record;
pub use record::{AttemptFailure, AttemptRecord};

mod attempt_log;
pub(crate) use attempt_log::AttemptLog;

mod transport;
pub use transport::{Transport, TransportError};

mod error;
pub use error::{BoxError, Error, Result};

mod config;
pub use config::ClientConfig;

mod builder;
pub use builder::{ClientBuilder, NotSet};

mod in_flight;

mod telemetry;

mod worker;

mod race;

mod client;
pub use client::{Client, Delivery};

#[cfg(feature = "hyper")]
mod hyper_transport;
#[cfg(feature = "hyper")]
pub use hyper_transport::{HyperTransport, get, head, post, post_form, send};

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
pub(crate) mod testing;
