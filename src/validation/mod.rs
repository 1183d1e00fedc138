//! Validation gate for untyped request input.
//!
//! Turns raw JSON into a [`Record`] or [`RecordPatch`]. Every independently
//! violated constraint is reported, so one rejected request tells the client
//! everything that needs fixing. Fields the record does not know are ignored.

use crate::core::{Record, RecordPatch, ValidationError, ValidationIssue};
use serde_json::{Map, Value};

pub const FIELD_ID: &str = "id";
pub const FIELD_NAME: &str = "name";
pub const FIELD_COLOR: &str = "color";
pub const FIELD_YEAR: &str = "year";
/// Pseudo-field for problems with the payload as a whole.
pub const FIELD_BODY: &str = "body";

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Requires all four fields with their exact types.
pub fn validate_create(input: &Value) -> ValidationResult<Record> {
    let mut reader = FieldReader::new(input)?;

    let id = reader.required(FIELD_ID, read_integer);
    let name = reader.required(FIELD_NAME, read_string);
    let color = reader.required(FIELD_COLOR, read_string);
    let year = reader.required(FIELD_YEAR, read_string);

    let record = id
        .zip(name)
        .zip(color)
        .zip(year)
        .map(|(((id, name), color), year)| Record::new(id, name, color, year));
    reader.finish(record)
}

/// Every field is optional; the patch always targets the path `id`.
///
/// A body `id` is tolerated only when it repeats the path id.
pub fn validate_update(id: i64, input: &Value) -> ValidationResult<RecordPatch> {
    let mut reader = FieldReader::new(input)?;

    if let Some(body_id) = reader.optional(FIELD_ID, read_integer)
        && body_id != id
    {
        reader.reject(
            FIELD_ID,
            format!("is immutable (path id is {id}, body has {body_id})"),
        );
    }

    let patch = RecordPatch {
        id,
        name: reader.optional(FIELD_NAME, read_string),
        color: reader.optional(FIELD_COLOR, read_string),
        year: reader.optional(FIELD_YEAR, read_string),
    };

    reader.finish(Some(patch))
}

/// Parses a path id segment.
pub fn parse_id(raw: &str) -> ValidationResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        ValidationError::single(FIELD_ID, format!("must be an integer, found '{raw}'"))
    })
}

/// Parses a request body as JSON.
pub fn parse_body(bytes: &[u8]) -> ValidationResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::single(FIELD_BODY, "is required"));
    }
    serde_json::from_slice(bytes)
        .map_err(|err| ValidationError::single(FIELD_BODY, format!("must be valid JSON: {err}")))
}

struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    issues: Vec<ValidationIssue>,
}

impl<'a> FieldReader<'a> {
    fn new(input: &'a Value) -> ValidationResult<Self> {
        let object = input.as_object().ok_or_else(|| {
            ValidationError::single(
                FIELD_BODY,
                format!("must be a JSON object, found {}", kind_of(input)),
            )
        })?;
        Ok(Self {
            object,
            issues: Vec::new(),
        })
    }

    fn required<T>(&mut self, field: &str, read: fn(&Value) -> Result<T, String>) -> Option<T> {
        match self.object.get(field) {
            Some(value) => self.read(field, value, read),
            None => {
                self.reject(field, "is required");
                None
            }
        }
    }

    fn optional<T>(&mut self, field: &str, read: fn(&Value) -> Result<T, String>) -> Option<T> {
        let value = self.object.get(field)?;
        self.read(field, value, read)
    }

    fn read<T>(
        &mut self,
        field: &str,
        value: &Value,
        read: fn(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match read(value) {
            Ok(parsed) => Some(parsed),
            Err(reason) => {
                self.reject(field, reason);
                None
            }
        }
    }

    fn reject(&mut self, field: &str, reason: impl Into<String>) {
        self.issues.push(ValidationIssue::new(field, reason));
    }

    /// Yields `value` when nothing was rejected. Every field read as `None`
    /// left an issue behind, so a missing value always comes with issues.
    fn finish<T>(self, value: Option<T>) -> ValidationResult<T> {
        match value {
            Some(value) if self.issues.is_empty() => Ok(value),
            _ => Err(ValidationError::new(self.issues)),
        }
    }
}

fn read_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(int)
            } else if number.as_f64() == Some(0.0) {
                // `-0` parses as a float; JSON has a single zero
                Ok(0)
            } else if number.is_u64() {
                Err("is out of range for a 64-bit signed integer".to_string())
            } else {
                Err(format!("must be an integer, found {number}"))
            }
        }
        other => Err(format!("must be an integer, found {}", kind_of(other))),
    }
}

fn read_string(value: &Value) -> Result<String, String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Err(format!("must be a string, found {}", kind_of(other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
