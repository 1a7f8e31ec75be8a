// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display names for test cases.
//!
//! A case without bound arguments is displayed by its base name. A case with
//! arguments gets one `name: value` entry per parameter or argument, whichever
//! list is longer:
//!
//! ```
//! use casework_metadata::ArgValue;
//! use casework_runner::display_name::{DisplayNameOptions, format_display_name};
//!
//! let name = format_display_name(
//!     "Calc.Add",
//!     &["a", "b"],
//!     &[ArgValue::Int(2), ArgValue::Int(3)],
//!     &DisplayNameOptions::default(),
//! );
//! assert_eq!(name, "Calc.Add(a: 2, b: 3)");
//! ```

use casework_metadata::ArgValue;
use itertools::{EitherOrBoth, Itertools};
use serde::Deserialize;
use swrite::{SWrite, swrite};

/// Placeholder for a parameter name or argument value that is missing.
pub const MISSING: &str = "???";

/// Options controlling how argument values are rendered.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DisplayNameOptions {
    /// Strings longer than this many characters are truncated.
    #[serde(default = "default_max_string_chars")]
    pub max_string_chars: usize,

    /// The character used in place of `.` in floating-point values.
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,
}

impl DisplayNameOptions {
    /// The default truncation limit for string arguments.
    pub const DEFAULT_MAX_STRING_CHARS: usize = 50;
}

impl Default for DisplayNameOptions {
    fn default() -> Self {
        Self {
            max_string_chars: default_max_string_chars(),
            decimal_separator: default_decimal_separator(),
        }
    }
}

fn default_max_string_chars() -> usize {
    DisplayNameOptions::DEFAULT_MAX_STRING_CHARS
}

fn default_decimal_separator() -> char {
    '.'
}

/// Computes the display name for a test invocation.
///
/// This is a pure function of its inputs.
pub fn format_display_name<S: AsRef<str>>(
    base_name: &str,
    parameter_names: &[S],
    arguments: &[ArgValue],
    options: &DisplayNameOptions,
) -> String {
    if arguments.is_empty() {
        return base_name.to_owned();
    }

    let entries = arguments
        .iter()
        .zip_longest(parameter_names)
        .map(|pair| match pair {
            EitherOrBoth::Both(value, name) => {
                format!("{}: {}", name.as_ref(), format_arg_value(value, options))
            }
            EitherOrBoth::Left(value) => {
                format!("{MISSING}: {}", format_arg_value(value, options))
            }
            EitherOrBoth::Right(name) => format!("{}: {MISSING}", name.as_ref()),
        })
        .join(", ");

    format!("{base_name}({entries})")
}

/// Renders a single argument value for use in a display name.
pub fn format_arg_value(value: &ArgValue, options: &DisplayNameOptions) -> String {
    match value {
        ArgValue::Null => "null".to_owned(),
        ArgValue::Char(c) => format!("'{c}'"),
        ArgValue::Str(s) => format_str(s, options.max_string_chars),
        ArgValue::Float(f) => {
            let out = f.to_string();
            if options.decimal_separator == '.' {
                out
            } else {
                out.replace('.', &options.decimal_separator.to_string())
            }
        }
        ArgValue::Bool(_) | ArgValue::Int(_) | ArgValue::UInt(_) | ArgValue::Other(_) => {
            value.to_string()
        }
    }
}

fn format_str(s: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    match s.char_indices().nth(max_chars) {
        Some((cutoff, _)) => {
            // The ellipsis takes the place of the closing quote.
            out.push_str(&s[..cutoff]);
            out.push_str("...");
        }
        None => swrite!(out, "{s}\""),
    }
    out
}

/// Returns the conventional base name for a test: `<type>.<method>`.
pub fn default_base_name(type_name: &str, method_name: &str) -> String {
    let mut out = String::with_capacity(type_name.len() + method_name.len() + 1);
    swrite!(out, "{type_name}.{method_name}");
    out
}
