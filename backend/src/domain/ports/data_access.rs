//! Failure type shared by every document model adapter.
//!
//! Controllers never interpret these variants beyond rendering them into the
//! error envelope, so the `Display` output is what clients eventually see in
//! the `error` field.

/// Errors raised while executing a document query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataAccessError {
    /// The query failed while executing or while converting documents.
    #[error("data store query failed: {message}")]
    Query {
        /// Adapter-supplied detail.
        message: String,
    },
    /// Opaque store failure reported verbatim.
    #[error("{message}")]
    Database {
        /// Message reported by the store.
        message: String,
    },
}

impl DataAccessError {
    /// Build a [`DataAccessError::Query`].
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Build a [`DataAccessError::Database`].
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::ports::DataAccessError;
    ///
    /// let err = DataAccessError::database("Database error");
    /// assert_eq!(err.to_string(), "Database error");
    /// ```
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
