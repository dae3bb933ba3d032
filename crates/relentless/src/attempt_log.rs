// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Write;

use http::Extensions;
use parking_lot::Mutex;

use crate::{AttemptRecord, define_fn_wrapper};

define_fn_wrapper!(LogHook(Fn(record: &AttemptRecord)));
define_fn_wrapper!(ContextLogHook(Fn(extensions: &Extensions, record: &AttemptRecord)));

/// Where failed attempts go.
///
/// Each record is delivered to exactly one sink, chosen in this order: the retained list when
/// retention is on, the context hook, the plain hook. Without any of them the record is dropped.
/// Hooks run synchronously on the lane that failed.
#[derive(Debug, Default)]
pub(crate) struct AttemptLog {
    keep: bool,
    records: Mutex<Vec<AttemptRecord>>,
    context_hook: Option<ContextLogHook>,
    hook: Option<LogHook>,
}

impl AttemptLog {
    pub(crate) fn new(keep: bool, context_hook: Option<ContextLogHook>, hook: Option<LogHook>) -> Self {
        Self {
            keep,
            records: Mutex::new(Vec::new()),
            context_hook,
            hook,
        }
    }

    pub(crate) fn record(&self, extensions: &Extensions, record: AttemptRecord) {
        if self.keep {
            self.records.lock().push(record);
        } else if let Some(hook) = &self.context_hook {
            hook.call(extensions, &record);
        } else if let Some(hook) = &self.hook {
            hook.call(&record);
        }
    }

    pub(crate) fn records(&self) -> Vec<AttemptRecord> {
        self.records.lock().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub(crate) fn render(&self) -> String {
        self.records.lock().iter().fold(String::new(), |mut out, record| {
            // writing to a String cannot fail
            let _ = write!(out, "{record}");
            out
        })
    }
}
