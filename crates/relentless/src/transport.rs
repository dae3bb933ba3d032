// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};
use http_body::Body;
use layered::Service;

use crate::{BoxError, ReplayBody};

/// The capability that performs a single attempt.
///
/// A transport turns a request into a response or fails without one. It is invoked once per
/// attempt, possibly from several lanes at the same time, always with a distinct request.
///
/// This trait is implemented for every [`layered::Service`] with the matching input and output,
/// so closures wrapped in [`layered::Execute`] are transports:
///
/// ```
/// # use bytes::Bytes;
/// # use http::Response;
/// # use http_body_util::Full;
/// # use layered::Execute;
/// # use relentless::{ReplayBody, Transport, TransportError};
/// fn assert_transport(_: &impl Transport) {}
///
/// let transport = Execute::new(|_request: http::Request<ReplayBody>| async move {
///     Ok::<_, TransportError>(Response::new(Full::new(Bytes::new())))
/// });
///
/// assert_transport(&transport);
/// ```
///
/// Cancellation of an attempt that is already running is up to the transport. The call's
/// [`CancellationToken`](crate::CancellationToken), if any, is available in the request
/// extensions.
pub trait Transport: Send + Sync + 'static {
    /// The body type of the responses this transport produces.
    type Body: Body<Data = Bytes> + Send + 'static;

    /// Performs one attempt.
    fn perform(&self, request: Request<ReplayBody>) -> impl Future<Output = Result<Response<Self::Body>, TransportError>> + Send;
}

impl<S, B> Transport for S
where
    S: Service<Request<ReplayBody>, Out = Result<Response<B>, TransportError>> + 'static,
    B: Body<Data = Bytes> + Send + 'static,
{
    type Body = B;

    fn perform(&self, request: Request<ReplayBody>) -> impl Future<Output = Result<Response<B>, TransportError>> + Send {
        self.execute(request)
    }
}

/// A transport failure: the attempt produced no response.
///
/// The error is reference counted so the same failure can be recorded in the attempt log and
/// returned to the caller.
#[derive(Clone)]
pub struct TransportError(Arc<dyn std::error::Error + Send + Sync>);

impl TransportError {
    /// Wraps an error raised by a transport.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Self(Arc::from(error.into()))
    }

    /// Returns the wrapped error.
    #[must_use]
    pub fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.0
    }
}

impl Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}
