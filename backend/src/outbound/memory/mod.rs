//! In-memory document model.
//!
//! Serves read-only collections loaded at startup. Filters and sort keys are
//! evaluated against the serialized (camelCase) form of each document, which
//! keeps the adapter generic over the document type.
//!
//! Documents are stored denormalized, so `populate` and `select` are accepted
//! and ignored.

mod seed;

use std::cmp::Ordering;
use std::future::IntoFuture;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::{Ready, ready};
use serde::Serialize;
use serde_json::Value;

use crate::domain::ports::{
    DataAccessError, Document, DocumentModel, DocumentQuery, Filter, QueryOutput,
};

pub use seed::{CatalogueSeed, SeedError};

/// Read-only collection of documents.
#[derive(Debug)]
pub struct InMemoryModel<D> {
    documents: Arc<[D]>,
}

impl<D> Clone for InMemoryModel<D> {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
        }
    }
}

impl<D> Default for InMemoryModel<D> {
    fn default() -> Self {
        Self {
            documents: Arc::from(Vec::new()),
        }
    }
}

impl<D> InMemoryModel<D> {
    /// Wrap the given documents; insertion order is the natural order.
    #[must_use]
    pub fn new(documents: Vec<D>) -> Self {
        Self {
            documents: Arc::from(documents),
        }
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Selection {
    Filter(Filter),
    Id(String),
}

#[derive(Debug, Clone)]
struct SortKey {
    field: String,
    descending: bool,
}

fn parse_sort(order: &str) -> Vec<SortKey> {
    order
        .split_whitespace()
        .map(|key| match key.strip_prefix('-') {
            Some(field) => SortKey {
                field: field.to_owned(),
                descending: true,
            },
            None => SortKey {
                field: key.strip_prefix('+').unwrap_or(key).to_owned(),
                descending: false,
            },
        })
        .collect()
}

/// Query over an [`InMemoryModel`].
#[derive(Debug)]
pub struct InMemoryQuery<'a, D, T> {
    documents: &'a [D],
    selection: Selection,
    sort: Vec<SortKey>,
    offset: u64,
    limit: Option<u64>,
    output: PhantomData<fn() -> T>,
}

impl<'a, D, T> InMemoryQuery<'a, D, T> {
    const fn new(documents: &'a [D], selection: Selection) -> Self {
        Self {
            documents,
            selection,
            sort: Vec::new(),
            offset: 0,
            limit: None,
            output: PhantomData,
        }
    }
}

impl<D, T> InMemoryQuery<'_, D, T>
where
    D: Document + Serialize + Clone,
    T: QueryOutput<D>,
{
    fn run(self) -> Result<T, DataAccessError> {
        let mut matched = Vec::new();
        for document in self.documents {
            let fields = serde_json::to_value(document)
                .map_err(|err| DataAccessError::query(err.to_string()))?;
            let keep = match &self.selection {
                Selection::Id(id) => document.id() == id,
                Selection::Filter(filter) => matches_filter(&fields, filter),
            };
            if keep {
                matched.push((fields, document));
            }
        }

        if !self.sort.is_empty() {
            matched.sort_by(|(left, _), (right, _)| compare_by_keys(left, right, &self.sort));
        }

        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = self
            .limit
            .map_or(usize::MAX, |count| usize::try_from(count).unwrap_or(usize::MAX));
        let page = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, document)| document.clone())
            .collect();
        Ok(T::from_documents(page))
    }
}

fn matches_filter(fields: &Value, filter: &Filter) -> bool {
    match filter {
        Value::Null => true,
        Value::Object(conditions) => conditions
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected)),
        _ => false,
    }
}

fn compare_by_keys(left: &Value, right: &Value, keys: &[SortKey]) -> Ordering {
    keys.iter()
        .map(|key| {
            let ordering = compare_values(
                left.get(&key.field).unwrap_or(&Value::Null),
                right.get(&key.field).unwrap_or(&Value::Null),
            );
            if key.descending {
                ordering.reverse()
            } else {
                ordering
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_u64(), r.as_u64()) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
            _ => l
                .as_f64()
                .partial_cmp(&r.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(l), Value::String(r)) => l.cmp(r),
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

impl<D, T> DocumentQuery<T> for InMemoryQuery<'_, D, T>
where
    D: Document + Serialize + Clone + Sync,
    T: QueryOutput<D>,
{
    fn populate(self, _path: &str) -> Self {
        self
    }

    fn select(self, _fields: &str) -> Self {
        self
    }

    fn skip(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    fn sort(mut self, order: &str) -> Self {
        self.sort = parse_sort(order);
        self
    }
}

impl<D, T> IntoFuture for InMemoryQuery<'_, D, T>
where
    D: Document + Serialize + Clone,
    T: QueryOutput<D>,
{
    type Output = Result<T, DataAccessError>;
    type IntoFuture = Ready<Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self.run())
    }
}

impl<D> DocumentModel for InMemoryModel<D>
where
    D: Document + Serialize + Clone + Send + Sync + 'static,
{
    type Document = D;
    type Many<'a> = InMemoryQuery<'a, D, Vec<D>>;
    type One<'a> = InMemoryQuery<'a, D, Option<D>>;

    fn find(&self, filter: Filter) -> Self::Many<'_> {
        InMemoryQuery::new(&self.documents, Selection::Filter(filter))
    }

    fn find_one(&self, filter: Filter) -> Self::One<'_> {
        InMemoryQuery::new(&self.documents, Selection::Filter(filter))
    }

    fn find_by_id(&self, id: &str) -> Self::One<'_> {
        InMemoryQuery::new(&self.documents, Selection::Id(id.to_owned()))
    }
}
