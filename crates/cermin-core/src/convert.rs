//! Value conversion traits
//!
//! Registered accessors receive and return [`Value`]s; these traits do the
//! boundary conversion to and from plain Rust types so setter bodies stay
//! one-liners.

use crate::error::AccessError;
use crate::value::Value;

/// Convert from a [`Value`] to a Rust type.
///
/// Implement this trait to allow your type to be produced from a dynamic
/// value inside a registered setter.
pub trait FromValue: Sized {
    /// Convert from a value, returning an error if the kind doesn't match.
    fn from_value(value: &Value) -> Result<Self, AccessError>;
}

/// Convert from a Rust type into a [`Value`].
///
/// Blanket-implemented for every type with a `From` conversion into
/// `Value`, so getters can end with `.into_value()`.
pub trait IntoValue {
    /// Convert into a value.
    fn into_value(self) -> Value;
}

impl<T> IntoValue for T
where
    Value: From<T>,
{
    fn into_value(self) -> Value {
        Value::from(self)
    }
}

fn mismatch(expected: &str, value: &Value) -> AccessError {
    AccessError::TypeMismatch {
        expected: expected.to_string(),
        got: value.kind().as_str().to_string(),
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        value.as_int().ok_or_else(|| mismatch("int", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        value.as_float().ok_or_else(|| mismatch("float", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", value))
    }
}
