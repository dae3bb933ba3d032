// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;
use std::time::Duration;

use http::Response;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::client::Inner;
use crate::request::Template;
use crate::{AttemptFailure, AttemptRecord, StatusClass, Transport, TransportError};

/// How a lane ended.
#[derive(Debug)]
pub(crate) enum Outcome<B> {
    /// A response to deliver: a success, a client error, or the last retryable status.
    Response(Response<B>),
    /// The last allowed attempt failed in the transport.
    Failed(TransportError),
    /// The call was canceled. The response of the attempt that failed just before, if any,
    /// still has to be drained.
    Canceled(Option<Response<B>>),
}

impl<B> From<Result<Response<B>, TransportError>> for Outcome<B> {
    fn from(result: Result<Response<B>, TransportError>) -> Self {
        match result {
            Ok(response) => Self::Response(response),
            Err(error) => Self::Failed(error),
        }
    }
}

/// The single report a lane sends when it terminates.
#[derive(Debug)]
pub(crate) struct LaneResult<B> {
    pub(crate) lane: u32,
    pub(crate) attempt: u32,
    pub(crate) outcome: Outcome<B>,
}

/// One retry sequence of a call.
pub(crate) struct Lane<T: Transport> {
    pub(crate) index: u32,
    pub(crate) inner: Arc<Inner<T>>,
    pub(crate) template: Arc<Template>,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) finished: CancellationToken,
    pub(crate) results: UnboundedSender<LaneResult<T::Body>>,
}

impl<T: Transport> Lane<T> {
    /// Runs attempts until one is deliverable, attempts run out, the call is canceled or another
    /// lane wins. Reports at most once; a lane that stops because another lane won reports nothing.
    pub(crate) async fn run(self) {
        let inner = &*self.inner;
        let max_attempts = inner.config.effective_max_attempts();

        for attempt in 1..=max_attempts {
            if self.finished.is_cancelled() {
                return;
            }

            if self.is_canceled() {
                self.report(attempt.saturating_sub(1), Outcome::Canceled(None));
                return;
            }

            let result = inner.transport.perform(self.template.build()).await;

            let Some(failure) = failure_of(&result, inner.config.retry_on_429) else {
                self.report(attempt, result.into());
                return;
            };

            let is_last = attempt == max_attempts;
            let retry_delay = if is_last {
                Duration::ZERO
            } else {
                inner.config.backoff.delay(attempt)
            };

            let record = AttemptRecord::new(
                inner.clock().system_time(),
                self.template.operation(),
                self.template.method().clone(),
                self.template.url(),
                self.index,
                attempt,
                failure,
            );
            inner.telemetry.attempt_failed(&record, is_last, retry_delay);
            inner.log.record(self.template.extensions(), record);

            if is_last {
                self.report(attempt, result.into());
                return;
            }

            if self.is_canceled() {
                self.report(attempt, Outcome::Canceled(result.ok()));
                return;
            }

            // releases the connection of the failed response before waiting
            drop(result);

            tokio::select! {
                biased;
                () = canceled(self.cancel.as_ref()) => {
                    self.report(attempt, Outcome::Canceled(None));
                    return;
                }
                () = self.finished.cancelled() => return,
                () = inner.clock().delay(retry_delay) => {}
            }
        }
    }

    fn is_canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Sends the lane's only report. `attempt` is the number of attempts made, so a lane
    /// canceled before its first attempt reports 0.
    fn report(&self, attempt: u32, outcome: Outcome<T::Body>) {
        // the listener outlives every lane, so the channel is open
        let _ = self.results.send(LaneResult {
            lane: self.index,
            attempt,
            outcome,
        });
    }
}

/// Returns why the attempt failed, or `None` when its result is deliverable.
fn failure_of<B>(result: &Result<Response<B>, TransportError>, retry_on_429: bool) -> Option<AttemptFailure> {
    match result {
        Err(error) => Some(AttemptFailure::Transport(error.clone())),
        Ok(response) => match StatusClass::of(response.status(), retry_on_429) {
            StatusClass::ServerError => Some(AttemptFailure::ServerError(response.status())),
            StatusClass::TooManyRequests => Some(AttemptFailure::TooManyRequests),
            StatusClass::Success | StatusClass::ClientError => None,
        },
    }
}

async fn canceled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}
