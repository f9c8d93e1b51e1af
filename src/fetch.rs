//! Record lookup capability used by fields that reference stored models.
//!
//! A field configured with [`Leaf::fetch()`](crate::spec::Leaf::fetch) hands
//! its validated key (or keys) to a [`ModelFetch`] implementation and replaces
//! the key with whatever records come back. Lookups signal "not found" by
//! returning fewer records (or `None`), never by erroring; existence is
//! enforced by the field validator when `must_exist` is set.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Failure reported by a [`ModelFetch`] backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum FetchError {
    #[error("no fetcher named `{0}`")]
    UnknownFetcher(String),
    #[error("{0}")]
    Backend(String),
}

/// Which lookup a field performs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchMethod {
    /// Look up a single key.
    One,
    /// Look up a sequence of keys.
    Many,
    /// A custom lookup registered under a name.
    Named(String),
}

impl fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMethod::One => f.write_str("one"),
            FetchMethod::Many => f.write_str("many"),
            FetchMethod::Named(name) => f.write_str(name),
        }
    }
}

/// Key argument for a named lookup.
#[derive(Debug, Clone, Copy)]
pub enum FetchKey<'a> {
    One(&'a Value),
    Many(&'a [Value]),
}

/// Records returned by a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    One(Option<Value>),
    Many(Vec<Value>),
}

impl Fetched {
    /// Number of records found.
    pub fn count(&self) -> usize {
        match self {
            Fetched::One(record) => usize::from(record.is_some()),
            Fetched::Many(records) => records.len(),
        }
    }

    /// The value placed in the parsed output. A missing single record is `null`.
    pub fn into_value(self) -> Value {
        match self {
            Fetched::One(record) => record.unwrap_or(Value::Null),
            Fetched::Many(records) => Value::Array(records),
        }
    }
}

/// External record store consulted by fetch-enabled fields.
///
/// Implementations must be shareable across threads: a spec holding a
/// fetcher can be used by many validation calls at once.
pub trait ModelFetch: Send + Sync {
    /// Look up one record. `Ok(None)` means "not found".
    fn fetch_one(&self, key: &Value) -> Result<Option<Value>, FetchError>;

    /// Look up several records. Missing keys are simply absent from the result.
    fn fetch_many(&self, keys: &[Value]) -> Result<Vec<Value>, FetchError>;

    /// Run a custom lookup registered under `name`.
    fn fetch_named(&self, name: &str, key: FetchKey<'_>) -> Result<Fetched, FetchError> {
        let _ = key;
        Err(FetchError::UnknownFetcher(name.to_string()))
    }
}

impl<T: ModelFetch + ?Sized> ModelFetch for Arc<T> {
    fn fetch_one(&self, key: &Value) -> Result<Option<Value>, FetchError> {
        (**self).fetch_one(key)
    }

    fn fetch_many(&self, keys: &[Value]) -> Result<Vec<Value>, FetchError> {
        (**self).fetch_many(keys)
    }

    fn fetch_named(&self, name: &str, key: FetchKey<'_>) -> Result<Fetched, FetchError> {
        (**self).fetch_named(name, key)
    }
}

type NamedFetcher =
    Arc<dyn Fn(&MemoryModel, FetchKey<'_>) -> Result<Fetched, FetchError> + Send + Sync>;

/// In-memory record store keyed by an id field.
///
/// # Example
/// ```
/// use scrub::fetch::{MemoryModel, ModelFetch};
/// use serde_json::json;
///
/// let users = MemoryModel::new("id")
///     .with_record(json!({"id": "u1", "name": "Ada"}));
/// assert_eq!(users.fetch_one(&json!("u1")).unwrap().unwrap()["name"], "Ada");
/// assert!(users.fetch_one(&json!("u2")).unwrap().is_none());
/// ```
#[derive(Clone)]
pub struct MemoryModel {
    id_field: String,
    records: Vec<Value>,
    fetchers: HashMap<String, NamedFetcher>,
}

impl MemoryModel {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            records: vec![],
            fetchers: HashMap::new(),
        }
    }

    /// Add a record.
    pub fn with_record(mut self, record: Value) -> Self {
        self.insert(record);
        self
    }

    pub fn insert(&mut self, record: Value) {
        self.records.push(record);
    }

    /// Register a custom lookup reachable through [`FetchMethod::Named`].
    pub fn with_fetcher<F>(mut self, name: impl Into<String>, fetcher: F) -> Self
    where
        F: Fn(&MemoryModel, FetchKey<'_>) -> Result<Fetched, FetchError> + Send + Sync + 'static,
    {
        self.fetchers.insert(name.into(), Arc::new(fetcher));
        self
    }

    /// Find the record whose id equals `key`.
    pub fn find(&self, key: &Value) -> Option<&Value> {
        self.records
            .iter()
            .find(|r| r.get(&self.id_field) == Some(key))
    }

    /// All stored records, in insertion order.
    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Debug for MemoryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.fetchers.keys().collect();
        names.sort();
        f.debug_struct("MemoryModel")
            .field("id_field", &self.id_field)
            .field("records", &self.records.len())
            .field("fetchers", &names)
            .finish()
    }
}

impl ModelFetch for MemoryModel {
    fn fetch_one(&self, key: &Value) -> Result<Option<Value>, FetchError> {
        Ok(self.find(key).cloned())
    }

    fn fetch_many(&self, keys: &[Value]) -> Result<Vec<Value>, FetchError> {
        Ok(keys.iter().filter_map(|k| self.find(k).cloned()).collect())
    }

    fn fetch_named(&self, name: &str, key: FetchKey<'_>) -> Result<Fetched, FetchError> {
        match self.fetchers.get(name) {
            Some(fetcher) => fetcher(self, key),
            None => Err(FetchError::UnknownFetcher(name.to_string())),
        }
    }
}
