// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::ArgValue;
use serde::{Deserialize, Serialize};

/// Where a test case was declared.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceInfo {
    /// The file the test was declared in.
    pub file_name: String,

    /// The line within `file_name`, if known.
    #[serde(default)]
    pub line: Option<u32>,
}

impl SourceInfo {
    /// Creates a new `SourceInfo`.
    pub fn new(file_name: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            file_name: file_name.into(),
            line,
        }
    }
}

/// A single trait attached to a test case.
///
/// Trait names are not unique: a test may declare the same name more than
/// once, and every declaration is kept in order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TraitPair {
    /// The name of the trait.
    pub name: String,

    /// The value of the trait.
    pub value: String,
}

impl TraitPair {
    /// Creates a new trait pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A serializable description of a test case.
///
/// This is everything that must survive being sent to another process: once
/// deserialized, a runner resolves `type_name` and `method_name` back to live
/// metadata before running the case. The display name is carried as-is and is
/// never recomputed on the other side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TestCaseSummary {
    /// The name of the type declaring the test method.
    pub type_name: String,

    /// The name of the test method.
    pub method_name: String,

    /// The display name, as computed when the case was constructed.
    pub display_name: String,

    /// If set, the case is always skipped with this reason.
    #[serde(default)]
    pub skip_reason: Option<String>,

    /// Values bound to the method's parameters.
    #[serde(default)]
    pub arguments: Vec<ArgValue>,

    /// Traits attached to the case, in declaration order.
    #[serde(default)]
    pub traits: Vec<TraitPair>,

    /// Where the case was declared, if known.
    #[serde(default)]
    pub source: Option<SourceInfo>,
}

impl TestCaseSummary {
    /// Parses a summary from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes this summary as compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes this summary as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
