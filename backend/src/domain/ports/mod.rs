//! Domain ports and supporting types for the hexagonal boundary.

mod data_access;
mod document_model;

pub use data_access::DataAccessError;
pub use document_model::{
    Document, DocumentModel, DocumentQuery, Filter, QueryMethod, QueryOutput, UnknownQueryMethod,
};
