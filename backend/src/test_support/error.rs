//! Harness usage errors and contract violations.

use serde_json::Value;

use crate::domain::ports::UnknownQueryMethod;

/// Misuse of the harness by test code. Always fatal to the test.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// The named method is not one of the whitelisted chain points.
    #[error(transparent)]
    UnknownMethod(#[from] UnknownQueryMethod),
}

/// A controller failed the data-access failure contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractViolation {
    /// The harness could not be set up.
    #[error(transparent)]
    Harness(#[from] HarnessError),
    /// The controller did not set the expected status exactly once.
    #[error("expected a single status({expected}) call, observed {observed:?}")]
    Status {
        /// Status the contract requires.
        expected: u16,
        /// Every status call, in order.
        observed: Vec<u16>,
    },
    /// The controller did not send exactly one body.
    #[error("expected exactly one send call, observed {observed}")]
    SendCount {
        /// Number of send calls.
        observed: usize,
    },
    /// The sent body does not have the error envelope shape.
    #[error("sent body {body} is not an error envelope: {reason}")]
    Envelope {
        /// The offending body.
        body: Value,
        /// Why decoding failed.
        reason: String,
    },
    /// The envelope does not carry the injected failure.
    #[error("envelope error `{observed}` does not match the injected failure `{expected}`")]
    ErrorMismatch {
        /// Rendered injected failure.
        expected: String,
        /// The envelope's `error` field.
        observed: String,
    },
    /// The body was sent before the status was set.
    #[error("status must be set before the body is sent")]
    StatusAfterSend,
    /// The controller logged the failure the wrong number of times.
    #[error("expected {expected} error log event(s), observed {observed}")]
    LogCount {
        /// Error events the contract requires.
        expected: usize,
        /// Error events captured.
        observed: usize,
    },
}
