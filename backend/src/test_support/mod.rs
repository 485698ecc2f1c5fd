//! Test harness for controllers that depend on a [`DocumentModel`].
//!
//! - [`MockModel`] is a programmable model: every chain point defaults to
//!   chaining, and any one of them can be made to resolve or reject.
//! - [`mock_request_response`] builds a request and a recording
//!   [`MockResponse`].
//! - [`LogCapture`] records `tracing` events for the duration of a future.
//! - [`ErrorContract`] combines the three to check how a controller reacts to
//!   a data-access failure at a given chain point.
//!
//! Compiled for unit tests and, through the `test-support` feature, for
//! integration tests and downstream crates.
//!
//! [`DocumentModel`]: crate::domain::ports::DocumentModel

mod error;
mod error_contract;
mod exchange;
mod log_capture;
mod mock_model;

pub use error::{ContractViolation, HarnessError};
pub use error_contract::{
    ContractReport, DATABASE_ERROR_MESSAGE, ErrorContract, INTERNAL_SERVER_ERROR,
    verify_database_error,
};
pub use exchange::{MockResponse, ResponseCall, mock_request_response};
pub use log_capture::{CapturedEvent, LogCapture};
pub use mock_model::{MockModel, MockQuery, QueryCall, StubBehaviour};
