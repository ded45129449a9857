use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// A trait marking a type that can be used as the internal representation of
/// scalar values in this crate
///
/// The main objective of this abstraction is to allow replacing the default
/// representation with something that better fits a particular transport,
/// e.g. one with 64-bit integers. The executor, the coercion rules and the
/// wire-format conversions are all expressed against this trait.
pub trait ScalarValue:
    fmt::Debug
    + fmt::Display
    + PartialEq
    + Clone
    + Serialize
    + de::DeserializeOwned
    + From<String>
    + From<bool>
    + From<i32>
    + From<f64>
    + Send
    + Sync
    + 'static
{
    /// Represents this [`ScalarValue`] as an integer value, if it is one.
    ///
    /// Implementations should convert all supported integer types with 32 bit
    /// or less to an integer, if requested.
    fn as_int(&self) -> Option<i32>;

    /// Represents this [`ScalarValue`] as a float value.
    ///
    /// Implementations should convert all supported integer and floating
    /// point types with 64 bit or less to a float, if requested.
    fn as_float(&self) -> Option<f64>;

    /// Represents this [`ScalarValue`] as a [`str`] value, if it is one.
    fn as_str(&self) -> Option<&str>;

    /// Represents this [`ScalarValue`] as a [`String`] value, if it is one.
    fn as_string(&self) -> Option<String>;

    /// Converts this [`ScalarValue`] into a [`String`] value.
    ///
    /// Same as [`ScalarValue::as_string()`], but takes ownership, so allows
    /// to omit redundant cloning.
    fn into_string(self) -> Option<String>;

    /// Represents this [`ScalarValue`] as a boolean value, if it is one.
    fn as_boolean(&self) -> Option<bool>;
}

/// The default [`ScalarValue`] representation
///
/// These variants closely follow the built-in scalar types of the GraphQL
/// specification: a 32-bit signed `Int`, an IEEE 754 double precision
/// `Float`, a UTF-8 `String` and a `Boolean`. `ID` values are carried as
/// strings.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultScalarValue {
    /// A signed 32-bit integer
    Int(i32),
    /// A signed double-precision floating point value
    Float(f64),
    /// A UTF-8 character sequence
    String(String),
    /// A `true` or `false` value
    Boolean(bool),
}

impl From<i32> for DefaultScalarValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for DefaultScalarValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for DefaultScalarValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl<'a> From<&'a str> for DefaultScalarValue {
    fn from(s: &'a str) -> Self {
        Self::String(s.into())
    }
}

impl From<bool> for DefaultScalarValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl fmt::Display for DefaultScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => v.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::String(v) => v.fmt(f),
            Self::Boolean(v) => v.fmt(f),
        }
    }
}

impl ScalarValue for DefaultScalarValue {
    fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(f64::from(*i)),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn as_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn into_string(self) -> Option<String> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for DefaultScalarValue {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = DefaultScalarValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a valid input value")
            }

            fn visit_bool<E: de::Error>(self, b: bool) -> Result<Self::Value, E> {
                Ok(DefaultScalarValue::Boolean(b))
            }

            fn visit_i64<E: de::Error>(self, n: i64) -> Result<Self::Value, E> {
                if n >= i64::from(i32::MIN) && n <= i64::from(i32::MAX) {
                    Ok(DefaultScalarValue::Int(n as i32))
                } else {
                    // Browsers serialize all numbers without a fractional
                    // part as integers, so a large integral number must be
                    // accepted as a float rather than rejected.
                    Ok(DefaultScalarValue::Float(n as f64))
                }
            }

            fn visit_u64<E: de::Error>(self, n: u64) -> Result<Self::Value, E> {
                if n <= i32::MAX as u64 {
                    Ok(DefaultScalarValue::Int(n as i32))
                } else {
                    Ok(DefaultScalarValue::Float(n as f64))
                }
            }

            fn visit_f64<E: de::Error>(self, f: f64) -> Result<Self::Value, E> {
                Ok(DefaultScalarValue::Float(f))
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
                self.visit_string(s.into())
            }

            fn visit_string<E: de::Error>(self, s: String) -> Result<Self::Value, E> {
                Ok(DefaultScalarValue::String(s))
            }
        }

        de.deserialize_any(Visitor)
    }
}
