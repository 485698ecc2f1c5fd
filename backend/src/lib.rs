//! Storefront catalogue backend.
//!
//! Controllers in [`inbound::http::catalogue`] read products and categories
//! through the [`domain::ports::DocumentModel`] port, a chainable query
//! builder in the style of document-store ODMs. [`outbound::memory`] serves
//! the port from a seed file, and `test_support` (behind the `test-support`
//! feature) provides the programmable model and failure-contract harness
//! used to check how controllers behave when a query fails.

pub mod domain;
pub mod inbound;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
