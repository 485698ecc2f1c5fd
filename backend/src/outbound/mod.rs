//! Outbound adapters implementing the domain ports.
//!
//! [`memory`] serves catalogue documents loaded from a seed file.

pub mod memory;
