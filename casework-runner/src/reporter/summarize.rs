// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A sink wrapper that collects statistics for a case.

use super::{CaseEvent, CaseEventKind, MessageSink};
use std::time::Duration;

/// Statistics for the tests run as part of one case.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CaseStats {
    /// The number of tests that finished, whatever their verdict.
    pub tests_run: usize,

    /// The number of tests that failed.
    pub tests_failed: usize,

    /// The number of tests that were skipped.
    pub tests_skipped: usize,

    /// The sum of the execution times of all finished tests.
    pub execution_time: Duration,
}

impl CaseStats {
    /// Returns true if no test failed.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.tests_failed == 0
    }

    fn on_event(&mut self, kind: &CaseEventKind<'_>) {
        match kind {
            CaseEventKind::TestFinished { execution_time, .. } => {
                self.tests_run += 1;
                self.execution_time += *execution_time;
            }
            CaseEventKind::TestFailed { .. } => {
                self.tests_failed += 1;
            }
            CaseEventKind::TestSkipped { .. } => {
                self.tests_skipped += 1;
            }
            _ => {}
        }
    }
}

/// Wraps a [`MessageSink`], forwarding every event unchanged while collecting
/// [`CaseStats`].
#[derive(Debug)]
pub struct Summarize<'s, S: ?Sized> {
    sink: &'s mut S,
    stats: CaseStats,
}

impl<'s, S: MessageSink + ?Sized> Summarize<'s, S> {
    /// Creates a new summarizer around `sink`.
    pub fn new(sink: &'s mut S) -> Self {
        Self {
            sink,
            stats: CaseStats::default(),
        }
    }

    /// Returns the statistics collected so far.
    pub fn stats(&self) -> CaseStats {
        self.stats
    }
}

impl<S: MessageSink + ?Sized> MessageSink for Summarize<'_, S> {
    fn handle_event(&mut self, event: CaseEvent<'_>) {
        self.stats.on_event(&event.kind);
        self.sink.handle_event(event);
    }
}
