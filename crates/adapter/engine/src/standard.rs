//! Common conversion functions.
//!
//! None of these are registered implicitly; pass them to
//! [`TranslatorRegistry::register`](crate::TranslatorRegistry::register).

use adapter_types::{Value, ValueType};

use crate::error::{TranslationError, TranslationResult};

/// Return the value unchanged.
pub fn identity() -> impl Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static {
    Ok
}

/// Ignore the value and return `value`.
pub fn constant(value: Value) -> impl Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static {
    move |_| Ok(value.clone())
}

/// Parse text as a 32-bit integer.
pub fn parse_int() -> impl Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static {
    |value| match &value {
        Value::Text(s) => s
            .trim()
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|e| TranslationError::new(format!("cannot parse {:?} as int: {}", s, e))),
        other => Err(TranslationError::unexpected(&ValueType::Text, other)),
    }
}

/// Parse text as a 64-bit integer.
pub fn parse_long() -> impl Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static {
    |value| match &value {
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Long)
            .map_err(|e| TranslationError::new(format!("cannot parse {:?} as long: {}", s, e))),
        other => Err(TranslationError::unexpected(&ValueType::Text, other)),
    }
}

/// Widen an int to a long.
pub fn int_to_long() -> impl Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static {
    |value| match value {
        Value::Int(i) => Ok(Value::Long(i64::from(i))),
        other => Err(TranslationError::unexpected(&ValueType::Int, &other)),
    }
}

/// Narrow a long to an int, failing when out of range.
pub fn long_to_int() -> impl Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static {
    |value| match value {
        Value::Long(l) => i32::try_from(l)
            .map(Value::Int)
            .map_err(|_| TranslationError::new(format!("{} does not fit in an int", l))),
        other => Err(TranslationError::unexpected(&ValueType::Long, &other)),
    }
}

/// Render any scalar as text. Text passes through unquoted.
pub fn to_text() -> impl Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static {
    |value| match value {
        Value::Text(s) => Ok(Value::Text(s)),
        Value::Bool(b) => Ok(Value::Text(b.to_string())),
        Value::Int(i) => Ok(Value::Text(i.to_string())),
        Value::Long(l) => Ok(Value::Text(l.to_string())),
        Value::Double(d) => Ok(Value::Text(d.to_string())),
        Value::Null => Ok(Value::Null),
        other => Err(TranslationError::new(format!(
            "cannot render {} as text",
            other.value_type()
        ))),
    }
}

/// `true` when the text equals `expected`, ignoring case.
pub fn equals_ignore_case(
    expected: impl Into<String>,
) -> impl Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static {
    let expected = expected.into().to_lowercase();
    move |value| match &value {
        Value::Text(s) => Ok(Value::Bool(s.to_lowercase() == expected)),
        Value::Null => Ok(Value::Bool(false)),
        other => Err(TranslationError::unexpected(&ValueType::Text, other)),
    }
}

/// Interpret a value as a boolean: `Unit` (a completed void call) is true,
/// `Null` is false, numbers are true when non-zero, text is true unless empty
/// or `"false"`.
pub fn truthy() -> impl Fn(Value) -> TranslationResult<Value> + Send + Sync + 'static {
    |value| {
        let b = match &value {
            Value::Unit => true,
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Long(l) => *l != 0,
            Value::Double(d) => *d != 0.0,
            Value::Text(s) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
            Value::List(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
            Value::Record { .. } => true,
        };
        Ok(Value::Bool(b))
    }
}
