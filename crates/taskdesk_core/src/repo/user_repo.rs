//! User collection repository.
//!
//! # Invariants
//! - `add_user` is idempotent on `id` and does not check email uniqueness;
//!   that check belongs to registration.
//! - Email lookup is an exact, case-sensitive match on the first record.

use crate::model::user::{User, UserId};
use crate::store::{KeyValueStore, LocalStore, StoreKey, StoreResult};
use log::debug;

/// Repository interface for user records.
pub trait UserRepository {
    fn list_users(&self) -> StoreResult<Vec<User>>;
    fn add_user(&self, user: &User) -> StoreResult<()>;
    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

/// `UserRepository` over the `users` collection.
pub struct LocalUserRepository<'s, S: KeyValueStore> {
    store: &'s LocalStore<S>,
}

impl<'s, S: KeyValueStore> LocalUserRepository<'s, S> {
    pub fn new(store: &'s LocalStore<S>) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> LocalUserRepository<'_, S> {
    /// Drops the record with `user_id`. Only used to undo a registration
    /// whose later writes failed; accounts are otherwise never removed.
    pub(crate) fn remove_user(&self, user_id: UserId) -> StoreResult<()> {
        let mut users = self.list_users()?;
        users.retain(|user| user.id != user_id);
        self.store.write(StoreKey::Users, &users)?;
        debug!("event=user_remove module=repo status=ok user_id={user_id}");
        Ok(())
    }
}

impl<S: KeyValueStore> UserRepository for LocalUserRepository<'_, S> {
    fn list_users(&self) -> StoreResult<Vec<User>> {
        self.store.read(StoreKey::Users)
    }

    fn add_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.list_users()?;
        if users.iter().any(|existing| existing.id == user.id) {
            debug!(
                "event=user_add module=repo status=skipped reason=duplicate_id user_id={}",
                user.id
            );
            return Ok(());
        }

        users.push(user.clone());
        self.store.write(StoreKey::Users, &users)?;
        debug!("event=user_add module=repo status=ok user_id={}", user.id);
        Ok(())
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .list_users()?
            .into_iter()
            .find(|user| user.email == email))
    }
}
