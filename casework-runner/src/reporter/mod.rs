// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting lifecycle events.
//!
//! The runner reports every state transition of a case as a [`CaseEvent`] to a
//! [`MessageSink`]. [`Summarize`] wraps a sink to compute per-case statistics.

mod events;
mod summarize;

pub use events::*;
pub use summarize::*;

use crate::errors::DisplayErrorChain;
use tracing::{debug, info};

/// Receives lifecycle events.
///
/// A sink is called synchronously from the thread running the case, in the
/// order events occur.
pub trait MessageSink {
    /// Handles a single event.
    fn handle_event(&mut self, event: CaseEvent<'_>);
}

impl<F> MessageSink for F
where
    F: FnMut(CaseEvent<'_>),
{
    fn handle_event(&mut self, event: CaseEvent<'_>) {
        self(event)
    }
}

/// A sink that writes every event to the `tracing` log.
///
/// Verdicts and case completion are logged at `info` level, everything else
/// at `debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn handle_event(&mut self, event: CaseEvent<'_>) {
        let case = event.case.display_name();
        match &event.kind {
            CaseEventKind::TestPassed { execution_time, .. } => {
                info!(case, ?execution_time, "PASS");
            }
            CaseEventKind::TestFailed {
                execution_time,
                error,
                ..
            } => {
                info!(
                    case,
                    ?execution_time,
                    "FAIL: {}",
                    DisplayErrorChain::new(error.as_ref())
                );
            }
            CaseEventKind::TestSkipped { reason, .. } => {
                info!(case, reason, "SKIP");
            }
            CaseEventKind::CaseFinished {
                execution_time,
                tests_run,
                tests_failed,
                tests_skipped,
            } => {
                info!(
                    case,
                    ?execution_time,
                    tests_run,
                    tests_failed,
                    tests_skipped,
                    "case finished"
                );
            }
            kind => {
                debug!(case, hook = kind.hook_name(), "{}", kind.name());
            }
        }
    }
}
