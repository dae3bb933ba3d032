// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::{AttemptRecord, Operation};

#[cfg(any(feature = "metrics", test))]
const METER_NAME: &str = "relentless";
#[cfg(any(feature = "metrics", test))]
const VERSION: &str = "v0.1.0";
#[cfg(any(feature = "metrics", test))]
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";

#[cfg(any(feature = "metrics", test))]
pub(crate) const OPERATION: &str = "http.operation";
#[cfg(any(feature = "metrics", test))]
pub(crate) const METHOD: &str = "http.request.method";
#[cfg(any(feature = "metrics", test))]
pub(crate) const LANE: &str = "relentless.lane";
#[cfg(any(feature = "metrics", test))]
pub(crate) const FAILURE: &str = "relentless.failure";

/// Side channels that observe the retry loop without affecting it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Telemetry {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    failures: Option<opentelemetry::metrics::Counter<u64>>,
}

impl Telemetry {
    #[cfg(any(feature = "logs", test))]
    pub(crate) fn with_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    #[cfg(any(feature = "metrics", test))]
    pub(crate) fn with_metrics(self, provider: &dyn opentelemetry::metrics::MeterProvider) -> Self {
        let meter = provider.meter_with_scope(
            opentelemetry::InstrumentationScope::builder(METER_NAME)
                .with_version(VERSION)
                .with_schema_url(SCHEMA_URL)
                .build(),
        );

        let failures = meter
            .u64_counter("relentless.attempt.failure")
            .with_description("Emitted for every failed attempt.")
            .with_unit("u64")
            .build();

        Self {
            failures: Some(failures),
            ..self
        }
    }

    #[cfg_attr(
        not(any(feature = "metrics", feature = "logs", test)),
        expect(unused_variables, reason = "unused when logs nor metrics are used")
    )]
    #[cfg_attr(
        all(feature = "metrics", not(any(feature = "logs", test))),
        expect(unused_variables, reason = "only logs report the delay")
    )]
    pub(crate) fn attempt_failed(&self, record: &AttemptRecord, is_last: bool, retry_delay: Duration) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "relentless.attempt",
                tracing::Level::WARN,
                http.operation = %record.operation,
                http.request.method = %record.verb,
                url.full = %record.url,
                relentless.lane = record.lane,
                relentless.attempt = record.attempt,
                relentless.attempt.is_last = is_last,
                relentless.retry.delay = retry_delay.as_secs_f32(),
                error = %record.failure,
            );
        }

        #[cfg(any(feature = "metrics", test))]
        if let Some(failures) = &self.failures {
            failures.add(
                1,
                &[
                    opentelemetry::KeyValue::new(OPERATION, record.operation.as_str()),
                    opentelemetry::KeyValue::new(METHOD, record.verb.to_string()),
                    opentelemetry::KeyValue::new(LANE, i64::from(record.lane)),
                    opentelemetry::KeyValue::new(FAILURE, record.failure.kind()),
                ],
            );
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, reason = "unused when logs are disabled")
    )]
    pub(crate) fn delivered(&self, operation: Operation, lane: u32, attempt: u32) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "relentless.delivered",
                tracing::Level::DEBUG,
                http.operation = %operation,
                relentless.lane = lane,
                relentless.attempt = attempt,
            );
        }
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, reason = "unused when logs are disabled")
    )]
    pub(crate) fn drained(&self, operation: Operation, lane: u32) {
        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            tracing::event!(
                name: "relentless.drained",
                tracing::Level::TRACE,
                http.operation = %operation,
                relentless.lane = lane,
            );
        }
    }
}
