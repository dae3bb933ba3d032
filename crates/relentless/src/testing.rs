// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::Write;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use layered::{Execute, Service};
use tracing_subscriber::fmt::MakeWriter;

use crate::{ReplayBody, TransportError};

/// Captures formatted `tracing` output for assertions.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).to_string()
    }

    pub fn assert_contains(&self, expected: &str) {
        let output = self.output();
        assert!(
            output.contains(expected),
            "log output does not contain '{expected}', got:\n{output}"
        );
    }

    /// Use with `set_default()` for thread-local capture.
    pub fn subscriber(&self) -> impl tracing::Subscriber {
        use tracing_subscriber::layer::SubscriberExt;
        tracing_subscriber::registry().with(tracing_subscriber::fmt::layer().with_writer(self.clone()).with_ansi(false))
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogCaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

pub(crate) struct LogCaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogCaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A transport answering every request with `status`, counting the calls it receives.
pub(crate) fn status_transport(
    status: StatusCode,
) -> (
    impl Service<Request<ReplayBody>, Out = Result<Response<Full<Bytes>>, TransportError>> + Clone,
    Arc<AtomicU32>,
) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let transport = Execute::new(move |_request: Request<ReplayBody>| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
            let mut response = Response::new(Full::new(Bytes::from_static(b"body")));
            *response.status_mut() = status;
            Ok::<_, TransportError>(response)
        }
    });

    (transport, calls)
}

/// A transport that never produces a response.
pub(crate) fn failing_transport(
    message: &'static str,
) -> impl Service<Request<ReplayBody>, Out = Result<Response<Full<Bytes>>, TransportError>> + Clone {
    Execute::new(move |_request: Request<ReplayBody>| async move {
        Err::<Response<Full<Bytes>>, _>(TransportError::new(message))
    })
}
