// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running work off the calling thread.
//!
//! A test's lifecycle can block for arbitrarily long, so it is never run on a
//! shared pool. [`BackgroundWorker`] gives each unit of work its own thread.
//! Short, fire-and-forget tasks go through [`spawn_pooled`] instead.

use crate::errors::{BoxError, SharedError, WorkerError, panic_payload_to_string};
use std::{
    sync::{Arc, OnceLock},
    thread::{self, JoinHandle},
};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

/// Work running on a dedicated thread.
///
/// The work starts as soon as the worker is spawned and runs to completion;
/// there is no way to cancel it.
#[derive(Debug)]
pub struct BackgroundWorker<T> {
    name: String,
    handle: JoinHandle<Result<T, BoxError>>,
}

impl<T: Send + 'static> BackgroundWorker<T> {
    /// Starts running `f` on a new thread called `name`.
    pub fn spawn<F>(name: impl Into<String>, f: F) -> Result<Self, WorkerError>
    where
        F: FnOnce() -> Result<T, BoxError> + Send + 'static,
    {
        let name = sanitize_thread_name(name.into());
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(f)
            .map_err(|error| WorkerError::Spawn {
                name: name.clone(),
                error,
            })?;
        debug!(thread = %name, "started background worker");
        Ok(Self { name, handle })
    }

    /// The name of the worker's thread.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the work has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the work finishes, returning its result.
    ///
    /// If the work failed or panicked, the failure is returned here.
    pub fn join(self) -> Result<T, WorkerError> {
        match self.handle.join() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(WorkerError::Failed(SharedError::from(error))),
            Err(payload) => Err(WorkerError::Panicked {
                message: panic_payload_to_string(payload),
            }),
        }
    }
}

// Thread names can't contain NUL bytes.
fn sanitize_thread_name(name: String) -> String {
    if name.contains('\0') {
        name.replace('\0', "\u{fffd}")
    } else {
        name
    }
}

fn shared_runtime() -> Option<&'static Runtime> {
    static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            Builder::new_multi_thread()
                .thread_name("casework-pool")
                .build()
                .inspect_err(|error| warn!("failed to build shared runtime: {error}"))
                .ok()
        })
        .as_ref()
}

/// Schedules `f` on a shared pool and returns immediately.
///
/// Nothing waits for the result, so failures are logged and then dropped.
/// This is meant for short background tasks; long-running work should use a
/// [`BackgroundWorker`].
pub fn spawn_pooled<F>(f: F)
where
    F: FnOnce() -> Result<(), BoxError> + Send + 'static,
{
    let run = move || {
        if let Err(error) = f() {
            let error: SharedError = Arc::from(error);
            warn!("pooled task failed: {error}");
        }
    };

    match shared_runtime() {
        Some(runtime) => {
            // The handle is dropped: the task keeps running detached.
            let _ = runtime.spawn_blocking(run);
        }
        None => {
            // Without a pool, fall back to a detached thread so the work
            // still happens.
            if let Err(error) = thread::Builder::new()
                .name("casework-pooled".to_owned())
                .spawn(run)
            {
                warn!("failed to spawn pooled task: {error}");
            }
        }
    }
}
