//! Programmable [`DocumentModel`] double.
//!
//! Every whitelisted chain point starts out inert: calling it keeps the chain
//! going. A test then picks one link and makes it terminal, either resolving
//! with a value or rejecting with an error, so the same model can simulate a
//! query that fails (or succeeds) at any step.
//!
//! ```
//! use storefront::domain::Product;
//! use storefront::domain::ports::{DataAccessError, DocumentModel, DocumentQuery};
//! use storefront::test_support::MockModel;
//! use serde_json::json;
//!
//! # futures_util::FutureExt::now_or_never(async {
//! let model = MockModel::<Product>::new();
//! model.set_rejected("sort", DataAccessError::database("Database error"))?;
//!
//! let result = model.find(json!({})).populate("category").sort("-createdAt").await;
//! assert_eq!(result, Err(DataAccessError::database("Database error")));
//! # Ok::<(), storefront::test_support::HarnessError>(())
//! # }).expect("ready future")?;
//! # Ok::<(), storefront::test_support::HarnessError>(())
//! ```

use std::any::type_name;
use std::collections::BTreeMap;
use std::fmt;
use std::future::IntoFuture;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{Ready, ready};
use serde_json::{Value, json};

use super::HarnessError;
use crate::domain::ports::{
    DataAccessError, DocumentModel, DocumentQuery, Filter, QueryMethod, QueryOutput,
};

/// One recorded invocation of a chain point.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCall {
    /// The method invoked.
    pub method: QueryMethod,
    /// Its argument rendered as JSON (filter, id, path, count or order).
    pub argument: Value,
}

/// Observable behaviour programmed for a chain point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubBehaviour {
    /// Keeps the chain going.
    Chain,
    /// Ends the chain with programmed documents.
    Resolved,
    /// Ends the chain with the error.
    Rejected(DataAccessError),
}

#[derive(Clone)]
enum Terminal<D> {
    Resolved(Vec<D>),
    Rejected(DataAccessError),
}

#[derive(Clone)]
enum Stub<D> {
    Chain,
    Terminal(Terminal<D>),
}

impl<D> Stub<D> {
    fn behaviour(&self) -> StubBehaviour {
        match self {
            Self::Chain => StubBehaviour::Chain,
            Self::Terminal(Terminal::Resolved(_)) => StubBehaviour::Resolved,
            Self::Terminal(Terminal::Rejected(error)) => StubBehaviour::Rejected(error.clone()),
        }
    }
}

struct Shared<D> {
    stubs: Mutex<BTreeMap<QueryMethod, Stub<D>>>,
    calls: Mutex<Vec<QueryCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Test double for a document collection of `D`.
///
/// Clones share stubs and recorded calls, so a test can keep one handle for
/// programming while another is injected into the code under test.
pub struct MockModel<D> {
    shared: Arc<Shared<D>>,
}

impl<D> Clone for MockModel<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D> Default for MockModel<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> fmt::Debug for MockModel<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stubs: BTreeMap<_, _> = lock(&self.shared.stubs)
            .iter()
            .map(|(method, stub)| (method.as_str(), stub.behaviour()))
            .collect();
        f.debug_struct("MockModel")
            .field("document", &type_name::<D>())
            .field("stubs", &stubs)
            .finish_non_exhaustive()
    }
}

impl<D> MockModel<D> {
    /// Create a model with every whitelisted chain point installed as inert.
    #[must_use]
    pub fn new() -> Self {
        let model = Self {
            shared: Arc::new(Shared {
                stubs: Mutex::default(),
                calls: Mutex::default(),
            }),
        };
        model.install();
        model
    }

    /// Reinstall every chain point as inert, discarding programmed outcomes.
    ///
    /// Installing again never adds methods: the table always holds exactly
    /// [`QueryMethod::ALL`].
    pub fn install(&self) {
        let mut stubs = lock(&self.shared.stubs);
        stubs.clear();
        stubs.extend(QueryMethod::ALL.map(|method| (method, Stub::Chain)));
    }

    /// Number of installed chain points.
    #[must_use]
    pub fn method_count(&self) -> usize {
        lock(&self.shared.stubs).len()
    }

    /// Make `method` end the chain with `value`.
    ///
    /// `value` is a `Vec<D>` or an `Option<D>`; a chain rooted at
    /// `find_one`/`find_by_id` yields the first programmed document. Values of
    /// any other document type are rejected at compile time:
    ///
    /// ```compile_fail
    /// use storefront::domain::Product;
    /// use storefront::test_support::MockModel;
    ///
    /// let model = MockModel::<Product>::new();
    /// model.set_resolved("populate", vec![1_u32])?;
    /// # Ok::<(), storefront::test_support::HarnessError>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`HarnessError::UnknownMethod`] when `method` is not
    /// whitelisted; the model is left untouched.
    pub fn set_resolved(
        &self,
        method: impl AsRef<str>,
        value: impl QueryOutput<D>,
    ) -> Result<(), HarnessError> {
        self.program(
            method.as_ref(),
            Stub::Terminal(Terminal::Resolved(value.into_documents())),
        )
    }

    /// Make `method` end the chain with `error`.
    ///
    /// # Errors
    /// Returns [`HarnessError::UnknownMethod`] when `method` is not
    /// whitelisted; the model is left untouched.
    pub fn set_rejected(
        &self,
        method: impl AsRef<str>,
        error: DataAccessError,
    ) -> Result<(), HarnessError> {
        self.program(method.as_ref(), Stub::Terminal(Terminal::Rejected(error)))
    }

    /// Inspect the behaviour currently programmed for `method`.
    ///
    /// # Errors
    /// Returns [`HarnessError::UnknownMethod`] when `method` is not
    /// whitelisted.
    pub fn behaviour(&self, name: impl AsRef<str>) -> Result<StubBehaviour, HarnessError> {
        let method: QueryMethod = name.as_ref().parse()?;
        Ok(lock(&self.shared.stubs)
            .get(&method)
            .map_or(StubBehaviour::Chain, Stub::behaviour))
    }

    /// Every chain point invoked so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<QueryCall> {
        lock(&self.shared.calls).clone()
    }

    fn program(&self, name: &str, stub: Stub<D>) -> Result<(), HarnessError> {
        let method: QueryMethod = name.parse()?;
        lock(&self.shared.stubs).insert(method, stub);
        Ok(())
    }
}

impl<D: Clone> MockModel<D> {
    fn invoke(&self, method: QueryMethod, argument: Value) -> Stub<D> {
        lock(&self.shared.calls).push(QueryCall { method, argument });
        lock(&self.shared.stubs)
            .get(&method)
            .cloned()
            .unwrap_or(Stub::Chain)
    }
}

/// Query produced by a [`MockModel`].
///
/// The first terminal link reached decides the outcome; later links are still
/// recorded but cannot change it. A chain without a terminal link resolves to
/// the empty result (`Vec::new()` or `None`).
pub struct MockQuery<'m, D, T> {
    model: &'m MockModel<D>,
    outcome: Option<Terminal<D>>,
    output: PhantomData<fn() -> T>,
}

impl<'m, D: Clone, T> MockQuery<'m, D, T> {
    fn start(model: &'m MockModel<D>, method: QueryMethod, argument: Value) -> Self {
        let query = Self {
            model,
            outcome: None,
            output: PhantomData,
        };
        query.refine(method, argument)
    }

    fn refine(mut self, method: QueryMethod, argument: Value) -> Self {
        let stub = self.model.invoke(method, argument);
        if self.outcome.is_none()
            && let Stub::Terminal(terminal) = stub
        {
            self.outcome = Some(terminal);
        }
        self
    }
}

impl<D, T> IntoFuture for MockQuery<'_, D, T>
where
    T: QueryOutput<D>,
{
    type Output = Result<T, DataAccessError>;
    type IntoFuture = Ready<Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let result = match self.outcome {
            None => Ok(T::from_documents(Vec::new())),
            Some(Terminal::Resolved(documents)) => Ok(T::from_documents(documents)),
            Some(Terminal::Rejected(error)) => Err(error),
        };
        ready(result)
    }
}

impl<D, T> DocumentQuery<T> for MockQuery<'_, D, T>
where
    D: Clone + Send + Sync,
    T: QueryOutput<D>,
{
    fn populate(self, path: &str) -> Self {
        self.refine(QueryMethod::Populate, json!(path))
    }

    fn select(self, fields: &str) -> Self {
        self.refine(QueryMethod::Select, json!(fields))
    }

    fn skip(self, offset: u64) -> Self {
        self.refine(QueryMethod::Skip, json!(offset))
    }

    fn limit(self, count: u64) -> Self {
        self.refine(QueryMethod::Limit, json!(count))
    }

    fn sort(self, order: &str) -> Self {
        self.refine(QueryMethod::Sort, json!(order))
    }
}

impl<D> DocumentModel for MockModel<D>
where
    D: Clone + Send + Sync + 'static,
{
    type Document = D;
    type Many<'a> = MockQuery<'a, D, Vec<D>>;
    type One<'a> = MockQuery<'a, D, Option<D>>;

    fn find(&self, filter: Filter) -> Self::Many<'_> {
        MockQuery::start(self, QueryMethod::Find, filter)
    }

    fn find_one(&self, filter: Filter) -> Self::One<'_> {
        MockQuery::start(self, QueryMethod::FindOne, filter)
    }

    fn find_by_id(&self, id: &str) -> Self::One<'_> {
        MockQuery::start(self, QueryMethod::FindById, json!(id))
    }
}
