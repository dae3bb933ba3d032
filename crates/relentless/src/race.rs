// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use http::Response;
use http_body_util::BodyExt;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::client::{Delivery, Inner};
use crate::in_flight::InFlightGuard;
use crate::request::Template;
use crate::telemetry::Telemetry;
use crate::worker::{Lane, LaneResult, Outcome};
use crate::{Error, Operation, Result, Transport};

/// Starts the lanes of one call and returns the first result any of them reports.
///
/// Every other result is drained by a listener task that lives until the last lane is gone.
pub(crate) async fn race<T: Transport>(inner: &Arc<Inner<T>>, template: Template) -> Result<Response<T::Body>> {
    let template = Arc::new(template);
    let lanes = inner.config.effective_concurrency(template.is_idempotent_read());
    let cancel = template.cancellation();
    let finished = CancellationToken::new();

    let (results_tx, results_rx) = mpsc::unbounded_channel();
    let (winner_tx, winner_rx) = oneshot::channel();

    for index in 0..lanes {
        let lane = Lane {
            index,
            inner: Arc::clone(inner),
            template: Arc::clone(&template),
            cancel: cancel.clone(),
            finished: finished.clone(),
            results: results_tx.clone(),
        };
        let guard = inner.in_flight.enter();

        tokio::spawn(async move {
            let _guard = guard;
            lane.run().await;
        });
    }

    // the listener must see the channel close once the last lane finishes
    drop(results_tx);

    tokio::spawn(listen(
        results_rx,
        winner_tx,
        finished,
        inner.telemetry.clone(),
        template.operation(),
        inner.in_flight.enter(),
    ));

    let Ok(winner) = winner_rx.await else {
        return Err(Error::Abandoned);
    };

    *inner.last_delivery.lock() = Some(Delivery {
        lane: winner.lane,
        attempt: winner.attempt,
    });

    match winner.outcome {
        Outcome::Response(response) => Ok(response),
        Outcome::Failed(error) => Err(Error::Transport(error)),
        Outcome::Canceled(_) => Err(Error::Canceled),
    }
}

/// Hands the first result to the caller and drains every later one.
async fn listen<B>(
    mut results: mpsc::UnboundedReceiver<LaneResult<B>>,
    winner: oneshot::Sender<LaneResult<B>>,
    finished: CancellationToken,
    telemetry: Telemetry,
    operation: Operation,
    _guard: InFlightGuard,
) where
    B: http_body::Body + Send,
    B::Data: Send,
{
    let mut winner = Some(winner);

    while let Some(mut result) = results.recv().await {
        let Some(sender) = winner.take() else {
            drain(result, &telemetry, operation).await;
            continue;
        };

        finished.cancel();

        // the caller only ever sees the cancellation, never the response that came with it
        if let Outcome::Canceled(response) = &mut result.outcome
            && let Some(response) = response.take()
        {
            drain_response(response).await;
        }

        telemetry.delivered(operation, result.lane, result.attempt);

        if let Err(unclaimed) = sender.send(result) {
            // the caller stopped waiting
            drain(unclaimed, &telemetry, operation).await;
        }
    }
}

async fn drain<B: http_body::Body>(result: LaneResult<B>, telemetry: &Telemetry, operation: Operation) {
    let response = match result.outcome {
        Outcome::Response(response) | Outcome::Canceled(Some(response)) => response,
        Outcome::Failed(_) | Outcome::Canceled(None) => return,
    };

    drain_response(response).await;
    telemetry.drained(operation, result.lane);
}

async fn drain_response<B: http_body::Body>(response: Response<B>) {
    // read errors only mean the connection will not be reused
    let _ = response.into_body().collect().await;
}
