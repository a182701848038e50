//! Local key-value store port and the JSON collection adapter on top of it.
//!
//! # Responsibility
//! - Define the `KeyValueStore` port that backends implement.
//! - Encode/decode named collections as JSON blobs under a single key.
//!
//! # Invariants
//! - `read` of a never-written collection yields an empty sequence.
//! - `write` replaces the whole collection; there are no partial writes.
//! - Malformed stored text is surfaced, never replaced with a default.

use crate::db::DbError;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Well-known keys of the persisted layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreKey {
    /// Array of user records.
    Users,
    /// Array of task records.
    Tasks,
    /// Object mapping email to plaintext password.
    Passwords,
    /// Single user record of the persisted session.
    CurrentUser,
}

impl StoreKey {
    /// Stable key string used by every backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Tasks => "tasks",
            Self::Passwords => "passwords",
            Self::CurrentUser => "currentUser",
        }
    }
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by store backends and the JSON adapter.
#[derive(Debug)]
pub enum StoreError {
    /// Durable backend failure.
    Db(DbError),
    /// Failure reported by a backend other than SQLite.
    Backend(String),
    /// Stored text under `key` could not be decoded.
    MalformedStoredData {
        key: String,
        source: serde_json::Error,
    },
    /// A value could not be encoded for `key`.
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "store backend failure: {message}"),
            Self::MalformedStoredData { key, source } => {
                write!(f, "malformed stored data under `{key}`: {source}")
            }
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Backend(_) => None,
            Self::MalformedStoredData { source, .. } => Some(source),
            Self::Encode { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw string key-value storage, the host persistence port.
///
/// Implementations are synchronous and must make each single-key call
/// atomic from the caller's point of view.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove_item(&self, key: &str) -> StoreResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key)
    }
}

/// Backend picked at runtime from configuration.
pub enum StoreBackend {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl StoreBackend {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl KeyValueStore for StoreBackend {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        match self {
            Self::Memory(store) => store.get_item(key),
            Self::Sqlite(store) => store.get_item(key),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        match self {
            Self::Memory(store) => store.set_item(key, value),
            Self::Sqlite(store) => store.set_item(key, value),
        }
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        match self {
            Self::Memory(store) => store.remove_item(key),
            Self::Sqlite(store) => store.remove_item(key),
        }
    }
}

/// JSON collection adapter over a `KeyValueStore` backend.
pub struct LocalStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> LocalStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Returns the raw backend, mostly useful for diagnostics and tests.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Reads a collection, returning an empty vector when it was never written.
    pub fn read<T: DeserializeOwned>(&self, key: StoreKey) -> StoreResult<Vec<T>> {
        Ok(self.read_value(key)?.unwrap_or_default())
    }

    /// Replaces a collection with `records`.
    pub fn write<T: Serialize>(&self, key: StoreKey, records: &[T]) -> StoreResult<()> {
        self.write_value(key, records)
    }

    /// Reads one JSON value stored under `key`.
    pub fn read_value<T: DeserializeOwned>(&self, key: StoreKey) -> StoreResult<Option<T>> {
        let Some(text) = self.backend.get_item(key.as_str())? else {
            return Ok(None);
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::MalformedStoredData {
                key: key.as_str().to_string(),
                source,
            })
    }

    /// Encodes `value` and stores it under `key`, replacing any previous value.
    pub fn write_value<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) -> StoreResult<()> {
        let text = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.as_str().to_string(),
            source,
        })?;
        self.backend.set_item(key.as_str(), &text)?;
        debug!(
            "event=store_write module=store status=ok key={} bytes={}",
            key,
            text.len()
        );
        Ok(())
    }

    /// Removes `key`; removing an absent key is not an error.
    pub fn remove(&self, key: StoreKey) -> StoreResult<()> {
        self.backend.remove_item(key.as_str())?;
        debug!("event=store_remove module=store status=ok key={key}");
        Ok(())
    }
}
