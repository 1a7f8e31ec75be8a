// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use camino_tempfile::tempdir;
use casework_metadata::{ArgValue, SourceInfo, TestCaseSummary};
use casework_runner::{
    config::RunnerConfig,
    errors::{PanicError, ResolveError},
    reporter::{CaseStats, Summarize, TracingSink},
    runner::{CaseRunner, CaseRunnerBuilder, TestVerdict},
    test_case::TestCase,
};
use color_eyre::eyre::{Result, bail, ensure};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::{sync::Arc, time::Duration};
use test_case::test_case;

fn add_case(runner: &CaseRunner, suite: &CalcSuite, a: i64, b: i64, expected: i64) -> TestCase {
    runner.create_case(
        suite.type_info.clone(),
        suite.method("Add"),
        vec![ArgValue::Int(a), ArgValue::Int(b), ArgValue::Int(expected)],
    )
}

#[test]
fn passing_case_runs_every_stage() -> Result<()> {
    init_tracing();

    let suite = CalcSuite::new();
    let runner = CaseRunnerBuilder::default().build();
    let case = add_case(&runner, &suite, 2, 3, 5);
    assert_eq!(case.display_name(), "Calc.Add(a: 2, b: 3, expected: 5)");

    let mut events = EventLog::default();
    let outcome = runner.run(&case, &mut events)?;

    ensure!(
        matches!(outcome.verdict, TestVerdict::Passed),
        "unexpected verdict: {:?}",
        outcome.verdict
    );
    assert_eq!(
        suite.journal.entries(),
        vec![
            "construct",
            "database before Add",
            "clock before Add",
            "invoke Add",
            "clock after Add",
            "database after Add",
            "dispose (memory = 5)",
        ]
    );
    assert_eq!(
        events.names,
        vec![
            "case-starting",
            "test-starting",
            "class-construction-starting",
            "class-construction-finished",
            "before-hook-starting",
            "before-hook-finished",
            "before-hook-starting",
            "before-hook-finished",
            "method-invoking",
            "method-invoked",
            "after-hook-starting",
            "after-hook-finished",
            "after-hook-starting",
            "after-hook-finished",
            "class-dispose-starting",
            "class-dispose-finished",
            "test-passed",
            "test-finished",
            "case-finished",
        ]
    );
    Ok(())
}

#[test]
fn failing_assertion_still_disposes() -> Result<()> {
    let suite = CalcSuite::new();
    let runner = CaseRunnerBuilder::default().build();
    let case = add_case(&runner, &suite, 2, 2, 5);

    let outcome = runner.run(&case, &mut EventLog::default())?;

    let Some(error) = outcome.verdict.error() else {
        bail!("expected failure, got {:?}", outcome.verdict);
    };
    let failure = error
        .downcast_ref::<AssertionFailed>()
        .expect("invocation wrapper is stripped");
    assert_eq!((failure.expected, failure.actual), (5, 4));
    assert_eq!(error.to_string(), "expected 5, got 4");
    assert_eq!(
        suite.journal.entries().last().map(String::as_str),
        Some("dispose (memory = 4)")
    );
    assert_eq!(outcome.stats.tests_failed, 1);
    Ok(())
}

#[test]
fn panicking_test_is_a_failure() -> Result<()> {
    let suite = CalcSuite::new();
    let runner = CaseRunnerBuilder::default().build();
    let case = runner.create_case(
        suite.type_info.clone(),
        suite.method("Divide"),
        vec![ArgValue::Int(1), ArgValue::Int(0)],
    );

    let outcome = runner.run(&case, &mut EventLog::default())?;

    let panic = outcome
        .verdict
        .error()
        .and_then(|error| error.downcast_ref::<PanicError>())
        .expect("panic is reported as the failure");
    assert_eq!(panic.message(), "attempt to divide 1 by zero");
    assert_eq!(
        suite.journal.entries(),
        vec![
            "construct",
            "database before Divide",
            "invoke Divide",
            "database after Divide",
            "dispose (memory = 0)",
        ]
    );
    Ok(())
}

#[test_case("Pi", &[], &[]; "skipped static test runs nothing")]
#[test_case(
    "Clear",
    &["database before Clear", "invoke Clear", "database after Clear"],
    &[]
    ; "static test is not constructed"
)]
fn static_tests(method: &str, journal: &[&str], arguments: &[i64]) -> Result<()> {
    let suite = CalcSuite::new();
    let runner = CaseRunnerBuilder::default().build();
    let case = runner.create_case(
        suite.type_info.clone(),
        suite.method(method),
        arguments.iter().copied().map(ArgValue::Int).collect(),
    );

    let outcome = runner.run(&case, &mut EventLog::default())?;

    ensure!(outcome.verdict.is_success(), "{:?}", outcome.verdict);
    assert_eq!(suite.journal.entries(), journal);
    Ok(())
}

#[test]
fn skipped_case_reports_zero_time() -> Result<()> {
    let suite = CalcSuite::new();
    let runner = CaseRunnerBuilder::default().build();
    let case = runner.create_case(suite.type_info.clone(), suite.method("Pi"), vec![]);
    assert_eq!(case.display_name(), "pi is exactly three");

    let mut events = EventLog::default();
    let outcome = runner.run(&case, &mut events)?;

    assert_eq!(
        outcome.stats,
        CaseStats {
            tests_run: 1,
            tests_failed: 0,
            tests_skipped: 1,
            execution_time: Duration::ZERO,
        }
    );
    match &outcome.verdict {
        TestVerdict::Skipped { reason } => assert_eq!(reason, "irrational"),
        other => bail!("expected skip, got {other:?}"),
    }
    assert_eq!(
        events.names,
        vec![
            "case-starting",
            "test-starting",
            "test-skipped",
            "test-finished",
            "case-finished",
        ]
    );
    Ok(())
}

#[test]
fn case_crosses_a_process_boundary() -> Result<()> {
    let suite = CalcSuite::new();
    let runner = CaseRunnerBuilder::default().build();
    let case = add_case(&runner, &suite, 20, 22, 42);
    case.set_source_info(SourceInfo::new("calc_tests.rs", Some(17)))?;

    // Serialize on one side, deserialize and resolve on the other.
    let json = case.to_summary().to_json()?;
    let received = TestCase::from_summary(TestCaseSummary::from_json(&json)?);
    assert_eq!(received.display_name(), case.display_name());
    assert_eq!(
        received.traits().get_all("category").collect::<Vec<_>>(),
        vec!["arithmetic", "fast"]
    );
    assert_eq!(
        received.source_info(),
        Some(&SourceInfo::new("calc_tests.rs", Some(17)))
    );

    let error = runner
        .run(&received, &mut EventLog::default())
        .expect_err("no resolver configured");
    assert!(matches!(error, ResolveError::NoResolver { .. }));

    let mut builder = CaseRunnerBuilder::default();
    builder.set_resolver(Arc::new(suite.registry()));
    let remote_runner = builder.build();
    let outcome = remote_runner.run(&received, &mut EventLog::default())?;
    ensure!(
        matches!(outcome.verdict, TestVerdict::Passed),
        "unexpected verdict: {:?}",
        outcome.verdict
    );
    assert_eq!(
        suite.journal.entries().last().map(String::as_str),
        Some("dispose (memory = 42)")
    );
    Ok(())
}

#[test]
fn cases_run_concurrently_in_background() -> Result<()> {
    let suite = CalcSuite::new();
    let runner = CaseRunnerBuilder::default().build();
    let inputs = [(1, 1, 2), (2, 2, 5), (3, 4, 7), (10, -3, 7)];

    let workers = inputs
        .into_iter()
        .map(|(a, b, expected)| {
            let case = Arc::new(add_case(&runner, &suite, a, b, expected));
            runner.run_in_background(case, EventLog::default())
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut verdicts = Vec::new();
    for worker in workers {
        let (outcome, events) = worker.join()?;
        assert_eq!(events.names.first(), Some(&"case-starting"));
        assert_eq!(events.names.last(), Some(&"case-finished"));
        verdicts.push(outcome.verdict.name());
    }
    assert_eq!(verdicts, vec!["passed", "failed", "passed", "passed"]);
    Ok(())
}

#[test]
fn configured_display_names() -> Result<()> {
    let temp_dir = tempdir()?;
    let config_dir = temp_dir.path().join(".config");
    std::fs::create_dir_all(&config_dir)?;
    std::fs::write(
        config_dir.join("casework.toml"),
        indoc! {r#"
            [display-name]
            max-string-chars = 5
            decimal-separator = ","

            [worker]
            thread-name-prefix = "calc/"
        "#},
    )?;
    let config = RunnerConfig::from_sources(temp_dir.path(), None)?;

    let mut builder = CaseRunnerBuilder::default();
    builder.set_config(config);
    let runner = builder.build();
    assert_eq!(runner.config().worker.thread_name_prefix, "calc/");

    let suite = CalcSuite::new();
    let case = runner.create_case(
        suite.type_info.clone(),
        suite.method("Divide"),
        vec![ArgValue::from("numerator"), ArgValue::Float(0.5)],
    );
    assert_eq!(case.display_name(), r#"Calc.Divide(a: "numer..., b: 0,5)"#);

    let worker = runner.run_in_background(Arc::new(case), EventLog::default())?;
    assert_eq!(worker.name(), r#"calc/Calc.Divide(a: "numer..., b: 0,5)"#);
    let (outcome, _) = worker.join()?;
    ensure!(
        !outcome.verdict.is_success(),
        "non-integer arguments are rejected"
    );
    Ok(())
}

#[test]
fn tracing_sink_can_be_summarized() -> Result<()> {
    init_tracing();

    let suite = CalcSuite::new();
    let runner = CaseRunnerBuilder::default().build();
    let case = add_case(&runner, &suite, 1, 2, 3);

    let mut sink = TracingSink;
    let mut summarize = Summarize::new(&mut sink);
    let outcome = runner.run(&case, &mut summarize)?;

    assert_eq!(summarize.stats(), outcome.stats);
    assert_eq!(summarize.stats().tests_run, 1);
    Ok(())
}
