//! Payload value extraction.
//!
//! Turns a token and a raw request body into an [`UpsertCommand`]: the token
//! selects a descriptor, the body is parsed as a JSON object, and each payload
//! key is pulled out in declared order and coerced into a [`Literal`].
//!
//! Extraction is best effort. A payload key that is absent, or whose value is
//! not a number or string, yields [`Literal::Empty`] rather than an error.

use crate::error::{IngestError, IngestResult, PayloadError};
use crate::mapping::MappingResolver;
use crate::statement::UpsertCommand;
use serde_json::{Map, Value};
use std::fmt;

/// A payload value coerced for storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer-valued JSON number
    Integer(i64),
    /// Any other JSON number
    Float(f64),
    /// JSON string
    Text(String),
    /// Missing key, or a value of any other JSON type
    Empty,
}

impl Literal {
    /// Coerce an optional payload value.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(number)) => number
                .as_i64()
                .map(Literal::Integer)
                .or_else(|| number.as_f64().map(Literal::Float))
                .unwrap_or(Literal::Empty),
            Some(Value::String(text)) => Literal::Text(text.clone()),
            Some(Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_)) | None => {
                Literal::Empty
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Literal::Empty)
    }
}

/// Diagnostic text form: `42`, `3.500000`, `"abc"`, or nothing for empty.
///
/// Strings are quoted but not escaped. This rendering is for logs only; the
/// store binds the underlying values as parameters.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::Float(value) => write!(f, "{value:.6}"),
            Literal::Text(value) => write!(f, "\"{value}\""),
            Literal::Empty => Ok(()),
        }
    }
}

/// Resolve `token`, parse `body`, and build the upsert it describes.
///
/// # Errors
///
/// * [`IngestError::UnknownToken`] if the token is not registered
/// * [`IngestError::InvalidMapping`] if the registered descriptor is unusable
/// * [`IngestError::MalformedPayload`] if the body is not a JSON object
pub fn extract<R>(resolver: &R, token: &str, body: &[u8]) -> IngestResult<UpsertCommand>
where
    R: MappingResolver + ?Sized,
{
    let descriptor = resolver.resolve(token).ok_or(IngestError::UnknownToken)?;
    descriptor
        .validate()
        .map_err(|source| IngestError::InvalidMapping {
            table: descriptor.table().to_string(),
            source,
        })?;

    let payload = parse_payload(body)?;

    let literals = descriptor
        .payload_keys()
        .iter()
        .map(|key| Literal::from_json(payload.get(key)))
        .collect();

    Ok(UpsertCommand::from_validated(
        descriptor.table(),
        descriptor.columns(),
        literals,
    ))
}

/// Parse a request body that must be a JSON object.
pub fn parse_payload(body: &[u8]) -> Result<Map<String, Value>, PayloadError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(object) => Ok(object),
        other => Err(PayloadError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
