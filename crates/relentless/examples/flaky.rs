// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Speculative `GET` requests against a flaky in-process transport, printing the attempt log.

use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use layered::Execute;
use relentless::{Backoff, Client, ReplayBody, TransportError};

#[tokio::main]
async fn main() -> relentless::Result<()> {
    let client = Client::builder()
        .concurrency(3)
        .max_attempts(4)
        .backoff(Backoff::exponential_jitter().unit(Duration::from_millis(20)))
        .keep_log(true)
        .transport(Execute::new(flaky_endpoint))
        .build();

    let response = client.get("http://localhost/flaky").await?;
    println!("delivered {} from {:?}", response.status(), client.last_delivery());

    // let the losing lanes finish and drain their responses
    client.wait().await;
    print!("{}", client.log_string());

    Ok(())
}

// 60% chance of a server error, 10% chance of a connection failure
async fn flaky_endpoint(_request: Request<ReplayBody>) -> Result<Response<Full<Bytes>>, TransportError> {
    tokio::time::sleep(Duration::from_millis(fastrand::u64(5..50))).await;

    match fastrand::u8(0..10) {
        0 => Err(TransportError::new("connection reset")),
        1..=6 => {
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
            Ok(response)
        }
        _ => Ok(Response::new(Full::new(Bytes::from_static(b"hello")))),
    }
}
