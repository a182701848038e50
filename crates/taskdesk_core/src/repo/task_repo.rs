//! Task collection repository.
//!
//! # Responsibility
//! - Provide list/get/upsert/delete over the `tasks` collection.
//!
//! # Invariants
//! - Listing preserves storage insertion order.
//! - Replacing an existing task always stamps `updated_at` with the current
//!   time, whatever the caller supplied.
//! - Inserting a new task keeps the caller's timestamps unchanged.
//! - Deleting an absent id is a no-op.

use crate::model::now_epoch_ms;
use crate::model::task::{Task, TaskId};
use crate::model::user::UserId;
use crate::store::{KeyValueStore, LocalStore, StoreKey, StoreResult};
use log::debug;

/// Repository interface for task records.
pub trait TaskRepository {
    fn list_all_tasks(&self) -> StoreResult<Vec<Task>>;
    fn list_tasks_for_user(&self, user_id: UserId) -> StoreResult<Vec<Task>>;
    fn get_task(&self, task_id: TaskId) -> StoreResult<Option<Task>>;
    fn upsert_task(&self, task: &Task) -> StoreResult<()>;
    fn delete_task(&self, task_id: TaskId) -> StoreResult<()>;
}

/// `TaskRepository` over the `tasks` collection.
pub struct LocalTaskRepository<'s, S: KeyValueStore> {
    store: &'s LocalStore<S>,
}

impl<'s, S: KeyValueStore> LocalTaskRepository<'s, S> {
    pub fn new(store: &'s LocalStore<S>) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> TaskRepository for LocalTaskRepository<'_, S> {
    fn list_all_tasks(&self) -> StoreResult<Vec<Task>> {
        self.store.read(StoreKey::Tasks)
    }

    fn list_tasks_for_user(&self, user_id: UserId) -> StoreResult<Vec<Task>> {
        let mut tasks = self.list_all_tasks()?;
        tasks.retain(|task| task.user_id == user_id);
        Ok(tasks)
    }

    fn get_task(&self, task_id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self
            .list_all_tasks()?
            .into_iter()
            .find(|task| task.id == task_id))
    }

    fn upsert_task(&self, task: &Task) -> StoreResult<()> {
        let mut tasks = self.list_all_tasks()?;
        let mode = match tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => {
                *existing = Task {
                    updated_at: now_epoch_ms(),
                    ..task.clone()
                };
                "update"
            }
            None => {
                tasks.push(task.clone());
                "insert"
            }
        };

        self.store.write(StoreKey::Tasks, &tasks)?;
        debug!(
            "event=task_upsert module=repo status=ok mode={mode} task_id={} user_id={}",
            task.id, task.user_id
        );
        Ok(())
    }

    fn delete_task(&self, task_id: TaskId) -> StoreResult<()> {
        let mut tasks = self.list_all_tasks()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != task_id);
        let removed = before - tasks.len();

        self.store.write(StoreKey::Tasks, &tasks)?;
        debug!("event=task_delete module=repo status=ok task_id={task_id} removed={removed}");
        Ok(())
    }
}
