// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    aggregator::{ErrorAggregator, catch_panic},
    config::RunnerConfig,
    errors::{ResolveError, SharedError, WorkerError},
    metadata::{SharedMethod, SharedType, TestObject, resolve_hooks},
    reporter::{CaseEvent, CaseEventKind, CaseStats, MessageSink, Summarize},
    resolve::TypeResolver,
    test_case::{CaseBinding, TestCase},
    time::stopwatch,
    worker::BackgroundWorker,
};
use casework_metadata::ArgValue;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, instrument};

/// Test runner options.
#[derive(Default)]
pub struct CaseRunnerBuilder {
    resolver: Option<Arc<dyn TypeResolver>>,
    config: Option<RunnerConfig>,
}

impl CaseRunnerBuilder {
    /// Sets the resolver used for cases that aren't bound to live metadata.
    pub fn set_resolver(&mut self, resolver: Arc<dyn TypeResolver>) -> &mut Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the configuration for this runner.
    ///
    /// If not set, [`RunnerConfig::default`] is used.
    pub fn set_config(&mut self, config: RunnerConfig) -> &mut Self {
        self.config = Some(config);
        self
    }

    /// Creates a new case runner.
    pub fn build(self) -> CaseRunner {
        CaseRunner {
            resolver: self.resolver,
            config: Arc::new(self.config.unwrap_or_default()),
        }
    }
}

impl fmt::Debug for CaseRunnerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseRunnerBuilder")
            .field("has_resolver", &self.resolver.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Runs the lifecycle of test cases.
///
/// Created through [`CaseRunnerBuilder`]. A runner holds no per-case state,
/// so it can be cloned and shared across threads freely.
#[derive(Clone)]
pub struct CaseRunner {
    resolver: Option<Arc<dyn TypeResolver>>,
    config: Arc<RunnerConfig>,
}

impl CaseRunner {
    /// Returns the configuration for this runner.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Creates a case bound to live metadata, formatting its display name
    /// with this runner's options.
    pub fn create_case(
        &self,
        type_info: SharedType,
        method: SharedMethod,
        arguments: Vec<ArgValue>,
    ) -> TestCase {
        TestCase::new(type_info, method, arguments, &self.config.display_name)
    }

    /// Runs a single case, reporting every lifecycle event to `sink`.
    ///
    /// A failing test is not an error: it is reported through `sink` and
    /// returned as [`TestVerdict::Failed`]. An error is only returned if an
    /// unbound case can't be resolved, in which case no events are emitted.
    #[instrument(level = "debug", skip_all, fields(case = %case.display_name()))]
    pub fn run<S>(&self, case: &TestCase, sink: &mut S) -> Result<CaseOutcome, ResolveError>
    where
        S: MessageSink + ?Sized,
    {
        let binding = case.binding(self.resolver.as_deref())?;

        let mut summarize = Summarize::new(sink);
        summarize.handle_event(CaseEvent::new(case, CaseEventKind::CaseStarting));

        let verdict = run_test(case, &binding, &mut summarize);

        let stats = summarize.stats();
        summarize.handle_event(CaseEvent::new(
            case,
            CaseEventKind::CaseFinished {
                execution_time: stats.execution_time,
                tests_run: stats.tests_run,
                tests_failed: stats.tests_failed,
                tests_skipped: stats.tests_skipped,
            },
        ));
        debug!(verdict = verdict.name(), "case finished");

        Ok(CaseOutcome { verdict, stats })
    }

    /// Runs a case on a dedicated thread.
    ///
    /// The thread is named after the case, prefixed with
    /// `worker.thread-name-prefix`. Joining the returned worker gives back the
    /// outcome along with the sink.
    pub fn run_in_background<S>(
        &self,
        case: Arc<TestCase>,
        mut sink: S,
    ) -> Result<BackgroundWorker<(CaseOutcome, S)>, WorkerError>
    where
        S: MessageSink + Send + 'static,
    {
        let name = format!(
            "{}{}",
            self.config.worker.thread_name_prefix,
            case.display_name()
        );
        let runner = self.clone();
        BackgroundWorker::spawn(name, move || {
            let outcome = runner.run(&case, &mut sink)?;
            Ok((outcome, sink))
        })
    }
}

impl fmt::Debug for CaseRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseRunner")
            .field("has_resolver", &self.resolver.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// The result of running a case.
#[derive(Clone, Debug)]
pub struct CaseOutcome {
    /// The verdict of the test.
    pub verdict: TestVerdict,

    /// Statistics collected while the case ran.
    pub stats: CaseStats,
}

/// The terminal classification of a test run.
#[derive(Clone, Debug)]
pub enum TestVerdict {
    /// The test was not run.
    Skipped {
        /// Why the test was skipped.
        reason: String,
    },

    /// Every stage of the test succeeded.
    Passed,

    /// At least one stage of the test failed.
    Failed {
        /// The failure. If more than one stage failed, this is an
        /// [`ErrorList`](crate::errors::ErrorList).
        error: SharedError,
    },
}

impl TestVerdict {
    /// Returns a short, stable name for this verdict.
    pub fn name(&self) -> &'static str {
        match self {
            TestVerdict::Skipped { .. } => "skipped",
            TestVerdict::Passed => "passed",
            TestVerdict::Failed { .. } => "failed",
        }
    }

    /// Returns true if the test didn't fail.
    pub fn is_success(&self) -> bool {
        !matches!(self, TestVerdict::Failed { .. })
    }

    /// Returns the failure, if the test failed.
    pub fn error(&self) -> Option<&SharedError> {
        match self {
            TestVerdict::Failed { error } => Some(error),
            _ => None,
        }
    }
}

fn run_test<S>(case: &TestCase, binding: &CaseBinding, sink: &mut S) -> TestVerdict
where
    S: MessageSink + ?Sized,
{
    let display_name = case.display_name();
    sink.handle_event(CaseEvent::new(
        case,
        CaseEventKind::TestStarting { display_name },
    ));

    let (verdict, execution_time) = match case.skip_reason() {
        Some(reason) => {
            debug!(reason, "skipping test");
            sink.handle_event(CaseEvent::new(
                case,
                CaseEventKind::TestSkipped {
                    display_name,
                    reason,
                },
            ));
            let verdict = TestVerdict::Skipped {
                reason: reason.to_owned(),
            };
            (verdict, Duration::ZERO)
        }
        None => {
            let start = stopwatch();
            let mut aggregator = ErrorAggregator::new();
            run_stages(case, binding, sink, &mut aggregator);
            let snapshot = start.snapshot();
            debug!(
                start_time = %snapshot.start_time,
                end_time = %snapshot.end_time(),
                failures = aggregator.len(),
                "test stages finished",
            );

            let execution_time = snapshot.duration;
            let verdict = match aggregator.into_result() {
                Ok(()) => {
                    sink.handle_event(CaseEvent::new(
                        case,
                        CaseEventKind::TestPassed {
                            display_name,
                            execution_time,
                        },
                    ));
                    TestVerdict::Passed
                }
                Err(error) => {
                    sink.handle_event(CaseEvent::new(
                        case,
                        CaseEventKind::TestFailed {
                            display_name,
                            execution_time,
                            error: error.clone(),
                        },
                    ));
                    TestVerdict::Failed { error }
                }
            };
            (verdict, execution_time)
        }
    };

    sink.handle_event(CaseEvent::new(
        case,
        CaseEventKind::TestFinished {
            display_name,
            execution_time,
        },
    ));
    verdict
}

/// Runs construction, hooks, the method and disposal, recording every failure
/// in `aggregator`.
///
/// A construction failure ends the run: with no instance there is nothing for
/// the remaining stages to operate on. Once an instance exists, a failing
/// stage never prevents its siblings from running, with one exception: the
/// first failing `before` stops the remaining `before`s and the method.
fn run_stages<S>(
    case: &TestCase,
    binding: &CaseBinding,
    sink: &mut S,
    aggregator: &mut ErrorAggregator,
) where
    S: MessageSink + ?Sized,
{
    let display_name = case.display_name();
    let method = binding.method.as_ref();

    let mut instance = None;
    if !method.is_static() {
        let _guard = StageGuard::enter(
            sink,
            case,
            CaseEventKind::ClassConstructionStarting { display_name },
            CaseEventKind::ClassConstructionFinished { display_name },
        );
        match catch_panic(|| binding.type_info.create_instance()) {
            Ok(object) => instance = Some(object),
            Err(error) => {
                debug!("construction failed, skipping remaining stages");
                aggregator.add(error);
                return;
            }
        }
    }

    let hooks = resolve_hooks(binding.type_info.as_ref(), method);
    let mut ran = Vec::with_capacity(hooks.len());
    let before_succeeded = aggregator.run(|| {
        for hook in &hooks {
            let hook_name = hook.name();
            let _guard = StageGuard::enter(
                sink,
                case,
                CaseEventKind::BeforeHookStarting {
                    display_name,
                    hook_name,
                },
                CaseEventKind::BeforeHookFinished {
                    display_name,
                    hook_name,
                },
            );
            hook.before(method)?;
            ran.push(hook);
        }
        Ok(())
    });

    if before_succeeded {
        let _guard = StageGuard::enter(
            sink,
            case,
            CaseEventKind::MethodInvoking { display_name },
            CaseEventKind::MethodInvoked { display_name },
        );
        aggregator.run(|| method.invoke(instance_mut(&mut instance), case.arguments()));
    } else {
        debug!(hooks_ran = ran.len(), "before hook failed, not invoking method");
    }

    for hook in ran.into_iter().rev() {
        let hook_name = hook.name();
        let _guard = StageGuard::enter(
            sink,
            case,
            CaseEventKind::AfterHookStarting {
                display_name,
                hook_name,
            },
            CaseEventKind::AfterHookFinished {
                display_name,
                hook_name,
            },
        );
        aggregator.run(|| hook.after(method));
    }

    if let Some(dispose) = instance.as_mut().and_then(|object| object.as_dispose()) {
        let _guard = StageGuard::enter(
            sink,
            case,
            CaseEventKind::ClassDisposeStarting { display_name },
            CaseEventKind::ClassDisposeFinished { display_name },
        );
        aggregator.run(|| dispose.dispose());
    }
}

fn instance_mut(instance: &mut Option<Box<dyn TestObject>>) -> Option<&mut dyn TestObject> {
    match instance {
        Some(object) => Some(&mut **object),
        None => None,
    }
}

/// Emits a stage's starting event on creation and its finished event on drop,
/// including while unwinding from a panic.
struct StageGuard<'g, 'a, S: MessageSink + ?Sized> {
    sink: &'g mut S,
    case: &'a TestCase,
    finished: Option<CaseEventKind<'a>>,
}

impl<'g, 'a, S: MessageSink + ?Sized> StageGuard<'g, 'a, S> {
    fn enter(
        sink: &'g mut S,
        case: &'a TestCase,
        starting: CaseEventKind<'a>,
        finished: CaseEventKind<'a>,
    ) -> Self {
        sink.handle_event(CaseEvent::new(case, starting));
        Self {
            sink,
            case,
            finished: Some(finished),
        }
    }
}

impl<S: MessageSink + ?Sized> Drop for StageGuard<'_, '_, S> {
    fn drop(&mut self) {
        if let Some(kind) = self.finished.take() {
            self.sink.handle_event(CaseEvent::new(self.case, kind));
        }
    }
}
