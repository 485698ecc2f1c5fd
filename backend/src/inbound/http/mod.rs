//! HTTP inbound adapter exposing the catalogue REST endpoints.

pub mod catalogue;
pub mod envelope;
pub mod exchange;
pub mod routes;
pub mod state;

pub use envelope::{ErrorEnvelope, ErrorEnvelopeValidationError, SuccessEnvelope};
pub use exchange::{ActixResponse, HandlerRequest, HandlerResponse, Params};
pub use routes::configure;
pub use state::HttpState;
