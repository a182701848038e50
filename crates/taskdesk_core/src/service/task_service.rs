//! Task use-case service.
//!
//! # Responsibility
//! - Provide owner-scoped create/update/get/delete entry points.
//! - Filter and sort task lists for display.
//! - Summarize a user's tasks for the dashboard.
//!
//! # Invariants
//! - A user never reads, edits or deletes another user's task through this
//!   service.
//! - Lists are sorted by `updated_at DESC`; ties keep storage order.
//! - Edits preserve `id`, `user_id` and `created_at`.

use crate::model::task::{Task, TaskDraft, TaskId, TaskPriority, TaskStatus};
use crate::model::user::User;
use crate::repo::task_repo::TaskRepository;
use crate::store::StoreError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Number of tasks shown in the dashboard's recent list.
pub const DASHBOARD_RECENT_LIMIT: usize = 5;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Task does not exist or belongs to another user.
    TaskNotFound(TaskId),
    Store(StoreError),
    /// Write succeeded but read-back did not find the task.
    InconsistentState(&'static str),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::TaskNotFound(task_id) => write!(f, "task not found: {task_id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for TaskServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// List filter. All set fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of title or description. Empty matches all.
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) if !needle.is_empty() => {
                task.title.to_lowercase().contains(&needle)
                    || task.description.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Counts and recent tasks for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub high_priority: usize,
    /// Most recently updated tasks, newest first.
    pub recent: Vec<Task>,
}

/// Task service facade over repository implementations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a task owned by `owner`.
    pub fn create_task(&self, owner: &User, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let draft = normalize_draft(draft)?;
        let task = Task::new(owner.id, draft);
        self.repo.upsert_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} user_id={}",
            task.id, owner.id
        );
        Ok(task)
    }

    /// Replaces the editable fields of one of `owner`'s tasks.
    ///
    /// Returns the stored task, with `updated_at` refreshed by the repository.
    pub fn update_task(
        &self,
        owner: &User,
        task_id: TaskId,
        draft: TaskDraft,
    ) -> Result<Task, TaskServiceError> {
        let draft = normalize_draft(draft)?;
        let mut task = self
            .get_task(owner, task_id)?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;

        task.apply_draft(draft);
        self.repo.upsert_task(&task)?;
        info!(
            "event=task_update module=service status=ok task_id={} user_id={}",
            task_id, owner.id
        );

        self.repo
            .get_task(task_id)?
            .ok_or(TaskServiceError::InconsistentState(
                "updated task not found in read-back",
            ))
    }

    /// Gets one task if it exists and belongs to `owner`.
    pub fn get_task(&self, owner: &User, task_id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self
            .repo
            .get_task(task_id)?
            .filter(|task| task.is_owned_by(owner.id)))
    }

    /// Deletes one of `owner`'s tasks. Absent or foreign ids are a no-op.
    pub fn delete_task(&self, owner: &User, task_id: TaskId) -> Result<(), TaskServiceError> {
        if self.get_task(owner, task_id)?.is_none() {
            return Ok(());
        }
        self.repo.delete_task(task_id)?;
        info!(
            "event=task_delete module=service status=ok task_id={} user_id={}",
            task_id, owner.id
        );
        Ok(())
    }

    /// Lists `owner`'s tasks matching `filter`, newest update first.
    pub fn list_tasks(
        &self,
        owner: &User,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let mut tasks = self.repo.list_tasks_for_user(owner.id)?;
        tasks.retain(|task| filter.matches(task));
        sort_recent_first(&mut tasks);
        Ok(tasks)
    }

    /// Builds the dashboard summary for `owner`.
    pub fn dashboard(&self, owner: &User) -> Result<DashboardSummary, TaskServiceError> {
        let mut tasks = self.repo.list_tasks_for_user(owner.id)?;
        let mut summary = DashboardSummary {
            total: tasks.len(),
            ..DashboardSummary::default()
        };

        for task in &tasks {
            match task.status {
                TaskStatus::Pending => summary.pending += 1,
                TaskStatus::InProgress => summary.in_progress += 1,
                TaskStatus::Completed => summary.completed += 1,
            }
            if task.priority == TaskPriority::High {
                summary.high_priority += 1;
            }
        }

        sort_recent_first(&mut tasks);
        tasks.truncate(DASHBOARD_RECENT_LIMIT);
        summary.recent = tasks;
        Ok(summary)
    }
}

fn normalize_draft(mut draft: TaskDraft) -> Result<TaskDraft, TaskServiceError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(TaskServiceError::EmptyTitle);
    }
    draft.title = title.to_string();
    Ok(draft)
}

fn sort_recent_first(tasks: &mut [Task]) {
    tasks.sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
}
