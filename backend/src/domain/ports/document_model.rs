//! Driven port describing chainable document queries.
//!
//! Controllers reach the data store through a [`DocumentModel`]: an entry
//! point (`find`, `find_one`, `find_by_id`) returns a [`DocumentQuery`] that can
//! be refined with `populate`, `select`, `skip`, `limit` and `sort` before it
//! is awaited.
//!
//! ```text
//! model.find(filter).populate("category").sort("-createdAt").limit(12).await
//! ```
//!
//! The set of chain points is closed and enumerated by [`QueryMethod`]. A new
//! chain operation is added here, in the enum and in both traits, never by
//! reaching around the port.

use std::fmt;
use std::future::IntoFuture;
use std::str::FromStr;

use serde_json::Value;

use super::DataAccessError;

/// Query filter expressed as a JSON document.
///
/// `Null` and the empty object both match every document. Object entries are
/// compared for equality against the serialized document fields.
pub type Filter = Value;

/// A stored document addressable by identifier.
pub trait Document {
    /// Stable identifier used by [`DocumentModel::find_by_id`].
    fn id(&self) -> &str;
}

/// The closed set of chain points a document model exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryMethod {
    /// Retrieve every document matching a filter.
    Find,
    /// Retrieve the first document matching a filter.
    FindOne,
    /// Retrieve a document by identifier.
    FindById,
    /// Expand a relation on the retrieved documents.
    Populate,
    /// Project a subset of fields.
    Select,
    /// Skip a number of leading documents.
    Skip,
    /// Cap the number of documents returned.
    Limit,
    /// Order the documents.
    Sort,
}

impl QueryMethod {
    /// Every chain point, entry points first.
    pub const ALL: [Self; 8] = [
        Self::Find,
        Self::FindOne,
        Self::FindById,
        Self::Populate,
        Self::Select,
        Self::Skip,
        Self::Limit,
        Self::Sort,
    ];

    /// Method name as it appears on the traits.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::FindOne => "find_one",
            Self::FindById => "find_by_id",
            Self::Populate => "populate",
            Self::Select => "select",
            Self::Skip => "skip",
            Self::Limit => "limit",
            Self::Sort => "sort",
        }
    }
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for QueryMethod {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Raised when a name outside [`QueryMethod::ALL`] is used as a chain point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{name}` is not a chainable query method")]
pub struct UnknownQueryMethod {
    /// The rejected method name.
    pub name: String,
}

impl FromStr for QueryMethod {
    type Err = UnknownQueryMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| UnknownQueryMethod { name: s.to_owned() })
    }
}

/// Result shape of a query: every matched document, or the first one.
pub trait QueryOutput<D>: Sized {
    /// Build the result from the matched documents, in order.
    fn from_documents(documents: Vec<D>) -> Self;

    /// The documents this result holds, in order.
    fn into_documents(self) -> Vec<D>;
}

impl<D> QueryOutput<D> for Vec<D> {
    fn from_documents(documents: Vec<D>) -> Self {
        documents
    }

    fn into_documents(self) -> Vec<D> {
        self
    }
}

impl<D> QueryOutput<D> for Option<D> {
    fn from_documents(documents: Vec<D>) -> Self {
        documents.into_iter().next()
    }

    fn into_documents(self) -> Vec<D> {
        self.into_iter().collect()
    }
}

/// A query in progress. Refinements consume and return the query; awaiting it
/// runs the query.
pub trait DocumentQuery<T>: IntoFuture<Output = Result<T, DataAccessError>> + Send + Sized {
    /// Expand the relation stored under `path`.
    #[must_use]
    fn populate(self, path: &str) -> Self;

    /// Restrict the returned fields (space separated).
    #[must_use]
    fn select(self, fields: &str) -> Self;

    /// Skip `offset` leading documents.
    #[must_use]
    fn skip(self, offset: u64) -> Self;

    /// Return at most `count` documents.
    #[must_use]
    fn limit(self, count: u64) -> Self;

    /// Order by space separated keys; a leading `-` sorts descending.
    #[must_use]
    fn sort(self, order: &str) -> Self;
}

/// Entry point to a document collection.
pub trait DocumentModel: Send + Sync {
    /// Document type stored in the collection.
    type Document: Send + Sync + 'static;

    /// Query yielding every matching document.
    type Many<'a>: DocumentQuery<Vec<Self::Document>> + 'a
    where
        Self: 'a;

    /// Query yielding at most one document.
    type One<'a>: DocumentQuery<Option<Self::Document>> + 'a
    where
        Self: 'a;

    /// Start a query over every document matching `filter`.
    fn find(&self, filter: Filter) -> Self::Many<'_>;

    /// Start a query for the first document matching `filter`.
    fn find_one(&self, filter: Filter) -> Self::One<'_>;

    /// Start a query for the document identified by `id`.
    fn find_by_id(&self, id: &str) -> Self::One<'_>;
}
