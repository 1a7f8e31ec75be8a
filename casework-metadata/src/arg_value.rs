// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value bound to one of a test method's parameters.
///
/// Argument values are kept as a closed set of kinds so that they can be
/// rendered into display names deterministically and serialized across process
/// boundaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum ArgValue {
    /// The absence of a value.
    Null,

    /// A boolean.
    Bool(bool),

    /// A single character.
    Char(char),

    /// A string.
    Str(String),

    /// A signed integer.
    Int(i64),

    /// An unsigned integer.
    #[serde(rename = "uint")]
    UInt(u64),

    /// A floating-point number.
    ///
    /// Non-finite values serialize as the strings `"NaN"`, `"inf"` and
    /// `"-inf"`.
    #[serde(with = "float_repr")]
    Float(f64),

    /// A value that has no primitive representation.
    ///
    /// The string is the value's representation as produced by whoever bound
    /// the argument, and is rendered verbatim.
    Other(String),
}

impl ArgValue {
    /// Returns a short, stable name for the kind of this value.
    pub fn kind_str(&self) -> &'static str {
        match self {
            ArgValue::Null => "null",
            ArgValue::Bool(_) => "bool",
            ArgValue::Char(_) => "char",
            ArgValue::Str(_) => "str",
            ArgValue::Int(_) => "int",
            ArgValue::UInt(_) => "uint",
            ArgValue::Float(_) => "float",
            ArgValue::Other(_) => "other",
        }
    }

    /// Returns true if this value is [`ArgValue::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => write!(f, "null"),
            ArgValue::Bool(v) => write!(f, "{v}"),
            ArgValue::Char(v) => write!(f, "{v}"),
            ArgValue::Str(v) => write!(f, "{v}"),
            ArgValue::Int(v) => write!(f, "{v}"),
            ArgValue::UInt(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Other(v) => write!(f, "{v}"),
        }
    }
}

mod float_repr {
    use serde::{
        Deserializer, Serializer,
        de::{self, Visitor},
    };
    use std::fmt;

    pub(super) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }

    struct FloatVisitor;

    impl Visitor<'_> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str(r#"a number, "NaN", "inf" or "-inf""#)
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
            match value {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}

macro_rules! impl_from {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for ArgValue {
                fn from(value: $ty) -> Self {
                    ArgValue::$variant(value.into())
                }
            }
        )*
    };
}

impl_from!(Bool: bool);
impl_from!(Char: char);
impl_from!(Str: String, &str);
impl_from!(Int: i8, i16, i32, i64);
impl_from!(UInt: u8, u16, u32, u64);
impl_from!(Float: f32, f64);

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => ArgValue::Null,
        }
    }
}

#[cfg(feature = "proptest1")]
mod proptest_impls {
    use super::*;
    use proptest::prelude::*;

    impl Arbitrary for ArgValue {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            prop_oneof![
                Just(ArgValue::Null),
                any::<bool>().prop_map(ArgValue::Bool),
                any::<char>().prop_map(ArgValue::Char),
                ".{0,80}".prop_map(ArgValue::Str),
                any::<i64>().prop_map(ArgValue::Int),
                any::<u64>().prop_map(ArgValue::UInt),
                any::<f64>().prop_map(ArgValue::Float),
                "[a-zA-Z0-9 {}:,]{0,20}".prop_map(ArgValue::Other),
            ]
            .boxed()
        }
    }
}
