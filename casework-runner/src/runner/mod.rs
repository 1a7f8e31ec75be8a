// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The lifecycle orchestrator.
//!
//! The main structure in this module is [`CaseRunner`].

mod imp;

pub use imp::*;
