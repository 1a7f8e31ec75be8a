// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{errors::SharedError, test_case::TestCase};
use chrono::{DateTime, FixedOffset, Local};
use std::time::Duration;

/// A lifecycle event.
///
/// Events are produced by a [`CaseRunner`](crate::runner::CaseRunner) and
/// consumed by a [`MessageSink`](super::MessageSink).
#[derive(Clone, Debug)]
pub struct CaseEvent<'a> {
    /// The time at which the event was generated, including the offset from UTC.
    pub timestamp: DateTime<FixedOffset>,

    /// The test case this event is about.
    pub case: &'a TestCase,

    /// The kind of event this is.
    pub kind: CaseEventKind<'a>,
}

impl<'a> CaseEvent<'a> {
    pub(crate) fn new(case: &'a TestCase, kind: CaseEventKind<'a>) -> Self {
        Self {
            timestamp: Local::now().fixed_offset(),
            case,
            kind,
        }
    }
}

/// The kind of lifecycle event this is.
///
/// Every `*Starting` event is eventually followed by its matching `*Finished`
/// event, even if the stage in between failed.
#[derive(Clone, Debug)]
pub enum CaseEventKind<'a> {
    /// The case is about to run.
    CaseStarting,

    /// The case finished running.
    CaseFinished {
        /// The total execution time of all tests in the case.
        execution_time: Duration,

        /// The number of tests that finished.
        tests_run: usize,

        /// The number of tests that failed.
        tests_failed: usize,

        /// The number of tests that were skipped.
        tests_skipped: usize,
    },

    /// A test is about to run.
    TestStarting {
        /// The display name of the test.
        display_name: &'a str,
    },

    /// A test finished, whatever its verdict.
    TestFinished {
        /// The display name of the test.
        display_name: &'a str,

        /// How long the test took. Zero for skipped tests.
        execution_time: Duration,
    },

    /// A test was skipped.
    TestSkipped {
        /// The display name of the test.
        display_name: &'a str,

        /// Why the test was skipped.
        reason: &'a str,
    },

    /// A test passed.
    TestPassed {
        /// The display name of the test.
        display_name: &'a str,

        /// How long the test took.
        execution_time: Duration,
    },

    /// A test failed.
    TestFailed {
        /// The display name of the test.
        display_name: &'a str,

        /// How long the test took.
        execution_time: Duration,

        /// The failure. If more than one stage failed, this is an
        /// [`ErrorList`](crate::errors::ErrorList).
        error: SharedError,
    },

    /// An instance of the test's type is about to be constructed.
    ClassConstructionStarting {
        /// The display name of the test.
        display_name: &'a str,
    },

    /// Construction of the test's type finished.
    ClassConstructionFinished {
        /// The display name of the test.
        display_name: &'a str,
    },

    /// A hook's `before` is about to run.
    BeforeHookStarting {
        /// The display name of the test.
        display_name: &'a str,

        /// The name of the hook.
        hook_name: &'a str,
    },

    /// A hook's `before` finished.
    BeforeHookFinished {
        /// The display name of the test.
        display_name: &'a str,

        /// The name of the hook.
        hook_name: &'a str,
    },

    /// A hook's `after` is about to run.
    AfterHookStarting {
        /// The display name of the test.
        display_name: &'a str,

        /// The name of the hook.
        hook_name: &'a str,
    },

    /// A hook's `after` finished.
    AfterHookFinished {
        /// The display name of the test.
        display_name: &'a str,

        /// The name of the hook.
        hook_name: &'a str,
    },

    /// The test method is about to be invoked.
    MethodInvoking {
        /// The display name of the test.
        display_name: &'a str,
    },

    /// The test method returned.
    MethodInvoked {
        /// The display name of the test.
        display_name: &'a str,
    },

    /// The test instance is about to be disposed.
    ClassDisposeStarting {
        /// The display name of the test.
        display_name: &'a str,
    },

    /// Disposal of the test instance finished.
    ClassDisposeFinished {
        /// The display name of the test.
        display_name: &'a str,
    },
}

impl CaseEventKind<'_> {
    /// Returns a short, stable name for this kind of event.
    pub fn name(&self) -> &'static str {
        match self {
            CaseEventKind::CaseStarting => "case-starting",
            CaseEventKind::CaseFinished { .. } => "case-finished",
            CaseEventKind::TestStarting { .. } => "test-starting",
            CaseEventKind::TestFinished { .. } => "test-finished",
            CaseEventKind::TestSkipped { .. } => "test-skipped",
            CaseEventKind::TestPassed { .. } => "test-passed",
            CaseEventKind::TestFailed { .. } => "test-failed",
            CaseEventKind::ClassConstructionStarting { .. } => "class-construction-starting",
            CaseEventKind::ClassConstructionFinished { .. } => "class-construction-finished",
            CaseEventKind::BeforeHookStarting { .. } => "before-hook-starting",
            CaseEventKind::BeforeHookFinished { .. } => "before-hook-finished",
            CaseEventKind::AfterHookStarting { .. } => "after-hook-starting",
            CaseEventKind::AfterHookFinished { .. } => "after-hook-finished",
            CaseEventKind::MethodInvoking { .. } => "method-invoking",
            CaseEventKind::MethodInvoked { .. } => "method-invoked",
            CaseEventKind::ClassDisposeStarting { .. } => "class-dispose-starting",
            CaseEventKind::ClassDisposeFinished { .. } => "class-dispose-finished",
        }
    }

    /// Returns the hook name for hook events.
    pub fn hook_name(&self) -> Option<&str> {
        match self {
            CaseEventKind::BeforeHookStarting { hook_name, .. }
            | CaseEventKind::BeforeHookFinished { hook_name, .. }
            | CaseEventKind::AfterHookStarting { hook_name, .. }
            | CaseEventKind::AfterHookFinished { hook_name, .. } => Some(hook_name),
            _ => None,
        }
    }
}
