// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "This is a test module")]
#![allow(clippy::panic, reason = "This is a test module")]

//! Integration tests for the client using only the public API.

use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, UNIX_EPOCH};

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body::{Body, Frame};
use http_body_util::{BodyExt, Full};
use layered::Execute;
use relentless::{
    AttemptFailure, AttemptRecord, Backoff, CancellationToken, Client, Error, Operation, ReplayBody, RequestSpec, Target, TransportError,
};
use rstest::rstest;
use tick::{Clock, ClockControl};
use tokio::sync::Barrier;

fn instant_clock() -> Clock {
    ClockControl::default().auto_advance_timers(true).to_clock()
}

fn response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Answers with `status`; every attempt waits until `lanes` attempts are in flight, so all lanes
/// move through their attempts in lockstep.
fn lockstep_transport(
    status: StatusCode,
    lanes: u32,
) -> (
    impl layered::Service<Request<ReplayBody>, Out = Result<Response<Full<Bytes>>, TransportError>>,
    Arc<AtomicU32>,
) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let barrier = Arc::new(Barrier::new(lanes as usize));

    let transport = Execute::new(move |_: Request<ReplayBody>| {
        counter.fetch_add(1, Ordering::SeqCst);
        let barrier = Arc::clone(&barrier);
        async move {
            barrier.wait().await;
            Ok::<_, TransportError>(response(status))
        }
    });

    (transport, calls)
}

/// Answers with the statuses in order, repeating the last one.
fn scripted_transport(
    statuses: &[StatusCode],
) -> (
    impl layered::Service<Request<ReplayBody>, Out = Result<Response<Full<Bytes>>, TransportError>>,
    Arc<AtomicU32>,
) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let statuses = statuses.to_vec();

    let transport = Execute::new(move |_: Request<ReplayBody>| {
        let call = counter.fetch_add(1, Ordering::SeqCst) as usize;
        let status = statuses[call.min(statuses.len() - 1)];
        async move { Ok::<_, TransportError>(response(status)) }
    });

    (transport, calls)
}

#[rstest]
#[case::single_attempt(1, 1)]
#[case::single_lane(1, 3)]
#[case::three_lanes(3, 4)]
#[case::two_lanes(2, 5)]
#[tokio::test]
async fn always_failing_endpoint_logs_every_attempt(#[case] concurrency: u32, #[case] max_attempts: u32) {
    let (transport, calls) = lockstep_transport(StatusCode::INTERNAL_SERVER_ERROR, concurrency);
    let client = Client::builder()
        .concurrency(concurrency)
        .max_attempts(max_attempts)
        .backoff(Backoff::constant().unit(Duration::from_millis(10)))
        .keep_log(true)
        .clock(instant_clock())
        .transport(transport)
        .build();

    let response = client.get("http://localhost/always-failing").await.unwrap();
    client.wait().await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(client.log_count(), (concurrency * max_attempts) as usize);
    assert_eq!(calls.load(Ordering::SeqCst), concurrency * max_attempts);

    for lane in 0..concurrency {
        let attempts: Vec<u32> = client.records().iter().filter(|r| r.lane == lane).map(|r| r.attempt).collect();
        assert_eq!(attempts, (1..=max_attempts).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn zero_attempts_means_one_per_lane() {
    let (transport, calls) = lockstep_transport(StatusCode::BAD_GATEWAY, 2);
    let client = Client::builder()
        .concurrency(2)
        .max_attempts(0)
        .keep_log(true)
        .transport(transport)
        .build();

    let response = client.get("http://localhost/").await.unwrap();
    client.wait().await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(client.log_count(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn first_attempt_success_logs_nothing() {
    let (transport, _) = scripted_transport(&[StatusCode::OK]);
    let client = Client::builder().concurrency(3).keep_log(true).transport(transport).build();

    let response = client.get("http://localhost/").await.unwrap();
    client.wait().await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(client.log_count(), 0);
    assert_eq!(client.log_string(), "");
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test]
async fn too_many_requests_is_delivered_as_is_by_default() {
    let (transport, calls) = scripted_transport(&[StatusCode::TOO_MANY_REQUESTS]);
    let client = Client::builder().max_attempts(3).keep_log(true).transport(transport).build();

    let response = client.get("http://localhost/").await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(client.log_count(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn too_many_requests_is_retried_when_enabled() {
    let (transport, calls) = scripted_transport(&[StatusCode::TOO_MANY_REQUESTS]);
    let client = Client::builder()
        .max_attempts(3)
        .retry_on_429(true)
        .keep_log(true)
        .clock(instant_clock())
        .transport(transport)
        .build();

    let response = client.get("http://localhost/").await.unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(client.log_count(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(client.records().iter().all(|r| matches!(r.failure, AttemptFailure::TooManyRequests)));
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let (transport, calls) = scripted_transport(&[StatusCode::NOT_FOUND]);
    let client = Client::builder().max_attempts(5).keep_log(true).transport(transport).build();

    let response = client.get("http://localhost/missing").await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(client.log_count(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn recovers_after_server_errors() {
    let (transport, calls) = scripted_transport(&[StatusCode::SERVICE_UNAVAILABLE, StatusCode::INTERNAL_SERVER_ERROR, StatusCode::OK]);
    let client = Client::builder()
        .max_attempts(5)
        .keep_log(true)
        .clock(instant_clock())
        .transport(transport)
        .build();

    let response = client.get("http://localhost/").await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(client.log_count(), 2);

    let delivery = client.last_delivery().unwrap();
    assert_eq!(delivery.lane, 0);
    assert_eq!(delivery.attempt, 3);
}

#[tokio::test]
async fn exponential_backoff_spaces_attempts() {
    let (transport, _) = scripted_transport(&[StatusCode::SERVICE_UNAVAILABLE]);
    let client = Client::builder()
        .max_attempts(4)
        .backoff(Backoff::exponential().unit(Duration::from_secs(1)))
        .keep_log(true)
        .clock(instant_clock())
        .transport(transport)
        .build();

    client.get("http://localhost/").await.unwrap();

    let times: Vec<_> = client.records().iter().map(|r| r.time).collect();
    let deltas: Vec<u64> = times
        .windows(2)
        .map(|pair| pair[1].duration_since(pair[0]).unwrap().as_secs())
        .collect();

    assert_eq!(deltas, vec![2, 4, 8]);
    assert_eq!(times[3].duration_since(times[0]).unwrap(), Duration::from_secs(14));
}

#[tokio::test]
async fn transport_error_is_returned_after_exhaustion() {
    let client = Client::builder()
        .keep_log(true)
        .clock(instant_clock())
        .transport(Execute::new(|_: Request<ReplayBody>| async {
            Err::<Response<Full<Bytes>>, _>(TransportError::new("connection refused"))
        }))
        .build();

    let error = client.get("http://localhost/").await.unwrap_err();

    assert!(matches!(error, Error::Transport(ref e) if e.to_string() == "connection refused"));
    assert_eq!(client.log_count(), 3);
    assert!(client.log_string().contains("error: connection refused"));
}

#[tokio::test(flavor = "multi_thread")]
async fn cancellation_interrupts_a_long_backoff() {
    let (transport, calls) = scripted_transport(&[StatusCode::INTERNAL_SERVER_ERROR]);
    let client = Client::builder()
        .max_attempts(5)
        .backoff(Backoff::constant().unit(Duration::from_secs(3600)))
        .keep_log(true)
        .clock(Clock::new_frozen())
        .transport(transport)
        .build();

    let cancel = CancellationToken::new();
    let mut request = Request::get("http://localhost/slow").body(Full::new(Bytes::new())).unwrap();
    request.extensions_mut().insert(cancel.clone());

    let canceler = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), client.send(request)).await.unwrap();
    canceler.await.unwrap();
    client.wait().await;

    assert!(matches!(result, Err(Error::Canceled)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.log_count(), 1);
}

#[tokio::test]
async fn canceled_call_makes_no_attempt() {
    let (transport, calls) = scripted_transport(&[StatusCode::OK]);
    let client = Client::builder()
        .concurrency(3)
        .max_attempts(5)
        .keep_log(true)
        .transport(transport)
        .build();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut request = Request::get("http://localhost/").body(Full::new(Bytes::new())).unwrap();
    request.extensions_mut().insert(cancel);

    let error = client.send(request).await.unwrap_err();
    client.wait().await;

    assert!(error.is_canceled());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(client.log_count(), 0);
    assert_eq!(client.last_delivery().map(|d| d.attempt), Some(0));
}

#[tokio::test]
async fn cancellation_during_an_attempt_stops_retries() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let client = Client::builder()
        .max_attempts(5)
        .keep_log(true)
        .clock(instant_clock())
        .transport(Execute::new(move |_: Request<ReplayBody>| {
            counter.fetch_add(1, Ordering::SeqCst);
            trigger.cancel();
            async { Ok::<_, TransportError>(response(StatusCode::SERVICE_UNAVAILABLE)) }
        }))
        .build();

    let mut request = Request::get("http://localhost/").body(Full::new(Bytes::new())).unwrap();
    request.extensions_mut().insert(cancel);

    let error = client.send(request).await.unwrap_err();
    client.wait().await;

    assert!(error.is_canceled());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.log_count(), 1);
}

#[tokio::test]
async fn log_hook_receives_every_failure() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let (transport, _) = scripted_transport(&[StatusCode::INTERNAL_SERVER_ERROR]);
    let client = Client::builder()
        .max_attempts(5)
        .clock(instant_clock())
        .log_hook(move |record| sink.lock().unwrap().push(record.attempt))
        .transport(transport)
        .build();

    client.get("http://localhost/").await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(client.log_count(), 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequestId(u32);

#[tokio::test]
async fn context_log_hook_sees_request_extensions() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let plain_calls = Arc::new(AtomicU32::new(0));
    let sink = Arc::clone(&seen);
    let plain = Arc::clone(&plain_calls);
    let (transport, _) = scripted_transport(&[StatusCode::INTERNAL_SERVER_ERROR]);
    let client = Client::builder()
        .max_attempts(5)
        .clock(instant_clock())
        .log_hook(move |_| {
            plain.fetch_add(1, Ordering::SeqCst);
        })
        .context_log_hook(move |extensions, record| {
            sink.lock().unwrap().push((extensions.get::<RequestId>().copied(), record.attempt));
        })
        .transport(transport)
        .build();

    let mut request = Request::get("http://localhost/").body(Full::new(Bytes::new())).unwrap();
    request.extensions_mut().insert(RequestId(42));
    client.send(request).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 5);
    assert!(seen.iter().all(|(id, _)| *id == Some(RequestId(42))));
    assert_eq!(plain_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn retained_log_takes_precedence_over_hooks() {
    let hook_calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&hook_calls);
    let (transport, _) = scripted_transport(&[StatusCode::INTERNAL_SERVER_ERROR]);
    let client = Client::builder()
        .max_attempts(2)
        .keep_log(true)
        .clock(instant_clock())
        .log_hook(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .transport(transport)
        .build();

    client.get("http://localhost/").await.unwrap();

    assert_eq!(client.log_count(), 2);
    assert_eq!(hook_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn log_string_renders_one_line_per_attempt() {
    let (transport, _) = scripted_transport(&[StatusCode::INTERNAL_SERVER_ERROR]);
    let clock = ClockControl::new_at(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        .auto_advance_timers(true)
        .to_clock();
    let client = Client::builder()
        .max_attempts(2)
        .keep_log(true)
        .clock(clock)
        .transport(transport)
        .build();

    client.get("http://localhost/x").await.unwrap();

    assert_eq!(
        client.log_string(),
        "1700000000 Get [GET] http://localhost/x request-0 retry-2 error: server error: 500 Internal Server Error\n\
         1700000001 Get [GET] http://localhost/x request-0 retry-3 error: server error: 500 Internal Server Error\n"
    );

    let first = &client.records()[0];
    assert_eq!(client.format_record(first), first.to_string());
}

#[tokio::test]
async fn non_get_requests_use_a_single_lane() {
    let (transport, calls) = scripted_transport(&[StatusCode::INTERNAL_SERVER_ERROR]);
    let client = Client::builder()
        .concurrency(4)
        .max_attempts(2)
        .keep_log(true)
        .clock(instant_clock())
        .transport(transport)
        .build();

    client.post("http://localhost/", "text/plain", Full::new(Bytes::from_static(b"x"))).await.unwrap();
    client.head("http://localhost/").await.unwrap();
    client.wait().await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(client.records().iter().all(|r| r.lane == 0));
    assert_eq!(
        client.records().iter().map(|r| r.operation).collect::<Vec<_>>(),
        vec![Operation::Post, Operation::Post, Operation::Head, Operation::Head]
    );
}

#[tokio::test]
async fn post_replays_the_body_on_every_attempt() {
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&bodies);
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let client = Client::builder()
        .max_attempts(3)
        .clock(instant_clock())
        .transport(Execute::new(move |request: Request<ReplayBody>| {
            let sink = Arc::clone(&sink);
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                let content_type = request.headers()[http::header::CONTENT_TYPE].clone();
                let body = request.into_body().collect().await.unwrap().to_bytes();
                sink.lock().unwrap().push((content_type, body));
                let status = if call < 2 { StatusCode::BAD_GATEWAY } else { StatusCode::CREATED };
                Ok::<_, TransportError>(response(status))
            }
        }))
        .build();

    let response = client
        .post("http://localhost/upload", "application/json", Full::new(Bytes::from_static(b"{\"a\":1}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let bodies = bodies.lock().unwrap();
    assert_eq!(bodies.len(), 3);
    assert!(bodies.iter().all(|(ct, body)| ct == "application/json" && body.as_ref() == b"{\"a\":1}"));
}

#[tokio::test]
async fn post_form_encodes_values() {
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&bodies);
    let client = Client::builder()
        .transport(Execute::new(move |request: Request<ReplayBody>| {
            let sink = Arc::clone(&sink);
            async move {
                let body = request.into_body().collect().await.unwrap().to_bytes();
                sink.lock().unwrap().push(body);
                Ok::<_, TransportError>(response(StatusCode::OK))
            }
        }))
        .build();

    client.post_form("http://localhost/form", &[("name", "a b"), ("n", "1")]).await.unwrap();

    assert_eq!(bodies.lock().unwrap()[0].as_ref(), b"name=a+b&n=1");
}

#[tokio::test]
async fn mismatched_operation_is_rejected_before_any_attempt() {
    let (transport, calls) = scripted_transport(&[StatusCode::OK]);
    let client = Client::builder().transport(transport).build();

    let request = Request::get("http://localhost/").body(Full::new(Bytes::new())).unwrap();
    let error = client
        .execute(RequestSpec::new(Operation::Get, Target::Request(request)))
        .await
        .unwrap_err();

    assert!(matches!(error, Error::UnsupportedOperation(_)));
    assert!("Patch".parse::<Operation>().is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn execute_runs_url_operations() {
    let (transport, calls) = scripted_transport(&[StatusCode::OK]);
    let client = Client::builder().transport(transport).build();

    let response = client
        .execute(RequestSpec::<Full<Bytes>>::new(Operation::Head, Target::Url("http://localhost/".to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_url_is_rejected() {
    let (transport, calls) = scripted_transport(&[StatusCode::OK]);
    let client = Client::builder().transport(transport).build();

    let error = client.get("not a url").await.unwrap_err();

    assert!(matches!(error, Error::InvalidRequest(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// A request body that fails on the first read.
struct BrokenBody;

impl Body for BrokenBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Bytes>, std::io::Error>>> {
        Poll::Ready(Some(Err(std::io::Error::other("disk on fire"))))
    }
}

#[tokio::test]
async fn body_read_failure_fails_before_any_attempt() {
    let (transport, calls) = scripted_transport(&[StatusCode::OK]);
    let client = Client::builder().transport(transport).build();

    let error = client.post("http://localhost/", "text/plain", BrokenBody).await.unwrap_err();

    assert!(matches!(error, Error::BodyRead(_)));
    assert!(error.to_string().contains("disk on fire"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// A response body that counts how many instances were read to the end.
struct CountedBody {
    drained: Arc<AtomicU32>,
    sent: bool,
}

impl Body for CountedBody {
    type Data = Bytes;
    type Error = TransportError;

    fn poll_frame(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Bytes>, TransportError>>> {
        if self.sent {
            self.drained.fetch_add(1, Ordering::SeqCst);
            Poll::Ready(None)
        } else {
            self.sent = true;
            Poll::Ready(Some(Ok(Frame::data(Bytes::from_static(b"body")))))
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn losing_responses_are_drained_and_nothing_leaks() {
    let created = Arc::new(AtomicU32::new(0));
    let drained = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&created);
    let drain_counter = Arc::clone(&drained);

    let client = Client::builder()
        .concurrency(3)
        .max_attempts(3)
        .clock(instant_clock())
        .transport(Execute::new(move |_: Request<ReplayBody>| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            let drained = Arc::clone(&drain_counter);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                let mut response = Response::new(CountedBody { drained, sent: false });
                // the first three attempts fail; every lane then succeeds on its retry
                if call < 3 {
                    *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
                }
                Ok::<_, TransportError>(response)
            }
        }))
        .build();

    let baseline = client.in_flight();
    let response = client.get("http://localhost/slow").await.unwrap();
    client.wait().await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(client.in_flight(), baseline);

    let successes = created.load(Ordering::SeqCst).saturating_sub(3);
    assert!(successes >= 1);
    assert_eq!(drained.load(Ordering::SeqCst), successes - 1);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.as_ref(), b"body");
    assert_eq!(drained.load(Ordering::SeqCst), successes);
}

#[tokio::test(flavor = "multi_thread")]
async fn lane_waiting_in_backoff_stops_when_another_lane_wins() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let client = Client::builder()
        .concurrency(2)
        .max_attempts(5)
        .backoff(Backoff::constant().unit(Duration::from_secs(3600)))
        .keep_log(true)
        .clock(Clock::new_frozen())
        .transport(Execute::new(move |_: Request<ReplayBody>| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    return Ok::<_, TransportError>(response(StatusCode::INTERNAL_SERVER_ERROR));
                }

                // the failed lane is parked in its backoff by the time this one succeeds
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(response(StatusCode::OK))
            }
        }))
        .build();

    let response = tokio::time::timeout(Duration::from_secs(5), client.get("http://localhost/"))
        .await
        .unwrap()
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), client.wait()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(client.in_flight(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(client.log_count(), 1);
    assert_eq!(client.last_delivery().map(|d| d.attempt), Some(1));
}

#[tokio::test]
async fn panicking_transport_abandons_the_call() {
    let client = Client::builder()
        .transport(Execute::new(|_: Request<ReplayBody>| async {
            if true {
                panic!("transport bug");
            }
            Ok::<_, TransportError>(response(StatusCode::OK))
        }))
        .build();

    let error = client.get("http://localhost/").await.unwrap_err();
    client.wait().await;

    assert!(matches!(error, Error::Abandoned));
    assert_eq!(client.in_flight(), 0);
}

#[test]
fn records_are_plain_values() {
    let record = AttemptRecord::new(
        UNIX_EPOCH,
        Operation::PostForm,
        http::Method::POST,
        "http://localhost/f",
        1,
        2,
        AttemptFailure::ServerError(StatusCode::BAD_GATEWAY),
    );

    assert_eq!(
        record.to_string(),
        "0 PostForm [POST] http://localhost/f request-1 retry-3 error: server error: 502 Bad Gateway\n"
    );
}
