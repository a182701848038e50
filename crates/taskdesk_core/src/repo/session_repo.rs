//! Persisted current-session record.

use crate::model::user::User;
use crate::store::{KeyValueStore, LocalStore, StoreKey, StoreResult};

/// Access to the `currentUser` key.
pub struct SessionRepository<'s, S: KeyValueStore> {
    store: &'s LocalStore<S>,
}

impl<'s, S: KeyValueStore> SessionRepository<'s, S> {
    pub fn new(store: &'s LocalStore<S>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> StoreResult<Option<User>> {
        self.store.read_value(StoreKey::CurrentUser)
    }

    pub fn save(&self, user: &User) -> StoreResult<()> {
        self.store.write_value(StoreKey::CurrentUser, user)
    }

    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove(StoreKey::CurrentUser)
    }
}
