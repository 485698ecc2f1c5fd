//! Domain primitives and ports.
//!
//! Purpose: define the catalogue documents served by the storefront and the
//! data-access port controllers consume. The domain stays free of Actix and
//! of any concrete store.
//!
//! Public surface:
//! - `Product`, `Category`: catalogue documents.
//! - `ports`: the chainable document query contract and its error type.

pub mod catalogue;
pub mod ports;

pub use self::catalogue::{Category, Product};
