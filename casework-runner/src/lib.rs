// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Lifecycle engine for running a single described test case.
//!
//! A [`TestCase`](test_case::TestCase) is run by a
//! [`CaseRunner`](runner::CaseRunner): the runner constructs the test's
//! declaring type, brackets the test method with its setup and teardown
//! hooks, disposes of the instance, and reports every step to a
//! [`MessageSink`](reporter::MessageSink). Failures in any stage are collected
//! rather than propagated, so a test never crashes its runner.
//!
//! casework doesn't know how tests are declared. Types, methods and hooks are
//! described through the traits in [`metadata`].

pub mod aggregator;
pub mod config;
pub mod display_name;
pub mod errors;
pub mod metadata;
pub mod reporter;
pub mod resolve;
pub mod runner;
pub mod test_case;
mod time;
pub mod worker;
