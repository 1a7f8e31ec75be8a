// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Serializable descriptors for test cases run by the casework lifecycle engine.
//!
//! The types in this crate are the shapes that cross process boundaries: a
//! [`TestCaseSummary`] carries a case's identity, display name, skip reason,
//! bound arguments, traits and provenance, and can be written to and read back
//! from JSON without loss.
//!
//! The execution engine itself lives in `casework-runner`.

mod arg_value;
mod test_case;

pub use arg_value::*;
pub use test_case::*;
