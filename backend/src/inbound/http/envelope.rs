//! JSON envelopes returned by the catalogue controllers.
//!
//! Every data-access failure is answered with an [`ErrorEnvelope`]:
//!
//! ```text
//! { "success": false, "message": "<string>", "error": "<string>" }
//! ```
//!
//! The shape is a client contract. Deserialization rejects unknown fields and
//! `success: true`, so parsing a body into [`ErrorEnvelope`] doubles as a
//! shape check.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Failure body emitted on any data-access error.
///
/// # Examples
/// ```
/// use storefront::inbound::http::ErrorEnvelope;
/// use serde_json::json;
///
/// let envelope = ErrorEnvelope::new("Error fetching product", "Database error");
/// assert_eq!(
///     envelope.to_value(),
///     json!({ "success": false, "message": "Error fetching product", "error": "Database error" })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorEnvelopeDto", into = "ErrorEnvelopeDto")]
pub struct ErrorEnvelope {
    message: String,
    error: String,
}

/// Validation failures raised when decoding an [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorEnvelopeValidationError {
    /// The body claimed success.
    #[error("error envelope must carry `success: false`")]
    SuccessFlagSet,
}

impl ErrorEnvelope {
    /// Build an envelope from a caller-facing message and the underlying error.
    #[must_use]
    pub fn new(message: impl Into<String>, error: impl ToString) -> Self {
        Self {
            message: message.into(),
            error: error.to_string(),
        }
    }

    /// Caller-facing description of the failed operation.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Rendered underlying error.
    #[must_use]
    pub fn error(&self) -> &str {
        self.error.as_str()
    }

    /// Render the envelope as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "success": false,
            "message": self.message,
            "error": self.error,
        })
    }
}

impl From<ErrorEnvelope> for Value {
    fn from(envelope: ErrorEnvelope) -> Self {
        envelope.to_value()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorEnvelopeDto {
    success: bool,
    message: String,
    error: String,
}

impl From<ErrorEnvelope> for ErrorEnvelopeDto {
    fn from(value: ErrorEnvelope) -> Self {
        Self {
            success: false,
            message: value.message,
            error: value.error,
        }
    }
}

impl TryFrom<ErrorEnvelopeDto> for ErrorEnvelope {
    type Error = ErrorEnvelopeValidationError;

    fn try_from(value: ErrorEnvelopeDto) -> Result<Self, Self::Error> {
        let ErrorEnvelopeDto {
            success,
            message,
            error,
        } = value;
        if success {
            return Err(ErrorEnvelopeValidationError::SuccessFlagSet);
        }
        Ok(Self { message, error })
    }
}

/// Success body wrapping the returned data.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

impl<T: Serialize> SuccessEnvelope<T> {
    /// Wrap a single item.
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            count: None,
        }
    }

    /// Serialize into a JSON value.
    ///
    /// # Errors
    /// Fails when `T` cannot be represented as JSON.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl<T: Serialize> SuccessEnvelope<Vec<T>> {
    /// Wrap a list, reporting its length as `count`.
    #[must_use]
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            success: true,
            data,
            count: Some(count),
        }
    }
}
