use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::type_name;
use std::num::ParseIntError;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("cannot divide {dividend} by zero")]
pub struct DivideByZero {
    pub dividend: i32,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("cannot call `{operation}` on an absent value")]
pub struct AbsentValue {
    pub operation: &'static str,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("index {index} out of bounds for length {len}")]
pub struct IndexOutOfBounds {
    pub index: usize,
    pub len: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("cannot convert {from} to {to}: {source}")]
pub struct ConversionError {
    pub from: &'static str,
    pub to: &'static str,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("for input string \"{input}\": {source}")]
pub struct MalformedNumber {
    pub input: String,
    #[source]
    pub source: ParseIntError,
}

/// Integer division. Overflow (`i32::MIN / -1`) wraps as the CPU would.
pub fn divide(dividend: i32, divisor: i32) -> Result<i32, DivideByZero> {
    if divisor == 0 {
        return Err(DivideByZero { dividend });
    }
    Ok(dividend.wrapping_div(divisor))
}

pub fn text_len(text: Option<&str>) -> Result<usize, AbsentValue> {
    text.map(str::len).ok_or(AbsentValue { operation: "len" })
}

pub fn element_at<T: Copy>(items: &[T], index: usize) -> Result<T, IndexOutOfBounds> {
    items.get(index).copied().ok_or(IndexOutOfBounds {
        index,
        len: items.len(),
    })
}

pub fn coerce<T: DeserializeOwned>(value: Value) -> Result<T, ConversionError> {
    let from = value_type(&value);
    serde_json::from_value(value).map_err(|source| ConversionError {
        from,
        to: short_type_name::<T>(),
        source,
    })
}

pub fn parse_int(input: &str) -> Result<i32, MalformedNumber> {
    input.parse::<i32>().map_err(|source| MalformedNumber {
        input: input.to_string(),
        source,
    })
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    match full.find('<') {
        Some(generic) => full[..generic].rsplit("::").next().unwrap_or(full),
        None => full.rsplit("::").next().unwrap_or(full),
    }
}
