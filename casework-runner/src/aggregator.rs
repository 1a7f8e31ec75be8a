// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collecting failures from independently attempted pieces of work.
//!
//! The lifecycle of a test case is a sequence of stages, most of which must be
//! attempted even if an earlier stage failed. An [`ErrorAggregator`] runs each
//! stage, records any failure (including a panic), and lets the caller carry on.
//! Once every stage has been attempted, [`ErrorAggregator::into_result`] turns
//! the recorded failures into a single outcome.

use crate::errors::{
    BoxError, DisplayErrorChain, ErrorList, PanicError, SharedError, unwrap_invocation,
};
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};
use tracing::debug;

/// Records failures from independently attempted work.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    errors: Vec<SharedError>,
}

impl ErrorAggregator {
    /// The description attached to a composite failure.
    pub const DESCRIPTION: &'static str = "while running test";

    /// Creates a new, empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f`, recording its failure instead of returning it.
    ///
    /// A panic inside `f` is caught and recorded as a [`PanicError`]. Returns
    /// true if `f` completed successfully.
    pub fn run<F>(&mut self, f: F) -> bool
    where
        F: FnOnce() -> Result<(), BoxError>,
    {
        match catch_panic(f) {
            Ok(()) => true,
            Err(error) => {
                self.add(error);
                false
            }
        }
    }

    /// Records a failure.
    ///
    /// Any [`InvocationError`](crate::errors::InvocationError) layers are
    /// stripped first.
    pub fn add(&mut self, error: BoxError) {
        let error: SharedError = Arc::from(unwrap_invocation(error));
        debug!(
            index = self.errors.len(),
            "recorded failure: {}",
            DisplayErrorChain::new(error.as_ref())
        );
        self.errors.push(error);
    }

    /// Returns the number of recorded failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true if no failures have been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the recorded failures, in the order they were recorded.
    pub fn errors(&self) -> &[SharedError] {
        &self.errors
    }

    /// Converts the recorded failures into a result.
    ///
    /// * No failures: `Ok(())`.
    /// * One failure: that failure, unmodified.
    /// * More than one: an [`ErrorList`] holding all of them in order.
    pub fn into_result(mut self) -> Result<(), SharedError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => match ErrorList::new(Self::DESCRIPTION, self.errors) {
                Some(list) => Err(Arc::new(list)),
                None => Ok(()),
            },
        }
    }
}

/// Runs `f`, converting a panic into a [`PanicError`].
pub(crate) fn catch_panic<T, F>(f: F) -> Result<T, BoxError>
where
    F: FnOnce() -> Result<T, BoxError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Box::new(PanicError::from_payload(payload))),
    }
}
