//! Plaintext credential map keyed by email.
//!
//! Passwords are stored and compared as given, in plaintext. Not suitable
//! for a real deployment.

use crate::store::{KeyValueStore, LocalStore, StoreKey, StoreResult};
use std::collections::BTreeMap;

/// Access to the `passwords` map.
pub struct CredentialRepository<'s, S: KeyValueStore> {
    store: &'s LocalStore<S>,
}

impl<'s, S: KeyValueStore> CredentialRepository<'s, S> {
    pub fn new(store: &'s LocalStore<S>) -> Self {
        Self { store }
    }

    fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        Ok(self
            .store
            .read_value(StoreKey::Passwords)?
            .unwrap_or_default())
    }

    /// Returns the stored password for `email`, if any.
    pub fn password_for(&self, email: &str) -> StoreResult<Option<String>> {
        Ok(self.load()?.remove(email))
    }

    /// Stores `password` for `email`, replacing any previous entry.
    pub fn set_password(&self, email: &str, password: &str) -> StoreResult<()> {
        let mut passwords = self.load()?;
        passwords.insert(email.to_string(), password.to_string());
        self.store.write_value(StoreKey::Passwords, &passwords)
    }

    /// Exact comparison of `password` against the stored entry.
    ///
    /// Returns `false` when no entry exists for `email`.
    pub fn verify(&self, email: &str, password: &str) -> StoreResult<bool> {
        Ok(self
            .password_for(email)?
            .is_some_and(|stored| stored == password))
    }
}
