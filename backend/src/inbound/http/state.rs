//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the document model port and remain testable without I/O.

use crate::domain::ports::DocumentModel;
use crate::domain::{Category, Product};

/// Document models backing the catalogue routes.
pub struct HttpState<P, C> {
    /// Product collection.
    pub products: P,
    /// Category collection.
    pub categories: C,
}

impl<P, C> HttpState<P, C>
where
    P: DocumentModel<Document = Product>,
    C: DocumentModel<Document = Category>,
{
    /// Bundle the catalogue models.
    #[must_use]
    pub const fn new(products: P, categories: C) -> Self {
        Self {
            products,
            categories,
        }
    }
}
