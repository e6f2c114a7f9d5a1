//! DTOs for the link creation endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

/// Largest accepted request body, in bytes.
pub const MAX_BODY_BYTES: usize = 10_000;

const LONG_URL_FIELD: &str = "long_url";

/// Request to shorten one URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[validate(custom(function = "not_blank"))]
    pub long_url: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Result of checking the raw body against the expected shape.
#[derive(Debug)]
pub enum BodyShape {
    /// Exactly one field, `long_url`, holding a string.
    Valid(ShortenRequest),
    /// Not a JSON object, or `long_url` is missing or not a string.
    Malformed,
    /// `long_url` is present but other fields are too.
    UnexpectedFields(Vec<String>),
}

/// Checks that `body` is a JSON object whose only field is a string `long_url`.
///
/// Blank values pass this check; they are caught by [`Validate`].
pub fn check_body_shape(body: &[u8]) -> BodyShape {
    if body.is_empty() || body.len() > MAX_BODY_BYTES {
        return BodyShape::Malformed;
    }

    let Ok(Value::Object(mut fields)) = serde_json::from_slice::<Value>(body) else {
        return BodyShape::Malformed;
    };

    let Some(Value::String(long_url)) = fields.remove(LONG_URL_FIELD) else {
        return BodyShape::Malformed;
    };

    if !fields.is_empty() {
        return BodyShape::UnexpectedFields(fields.keys().cloned().collect());
    }

    BodyShape::Valid(ShortenRequest { long_url })
}

/// Created or reused short link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub id: String,
    pub short_url: String,
    pub long_url: String,
}
