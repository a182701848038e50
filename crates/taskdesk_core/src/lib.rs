//! Core domain logic for TaskDesk, a single-user task tracker.
//! This crate owns storage, session and task invariants; UI layers only
//! call the public operations re-exported here.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use auth::session::{AuthError, AuthSession};
pub use auth::state::{reduce, AuthAction, AuthState};
pub use config::{ConfigError, CoreConfig, SessionConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::now_epoch_ms;
pub use model::task::{Task, TaskDraft, TaskId, TaskPriority, TaskStatus};
pub use model::user::{User, UserId};
pub use repo::credential_repo::CredentialRepository;
pub use repo::session_repo::SessionRepository;
pub use repo::task_repo::{LocalTaskRepository, TaskRepository};
pub use repo::user_repo::{LocalUserRepository, UserRepository};
pub use service::task_service::{
    DashboardSummary, TaskFilter, TaskService, TaskServiceError, DASHBOARD_RECENT_LIMIT,
};
pub use store::{
    KeyValueStore, LocalStore, MemoryStore, SqliteStore, StoreBackend, StoreError, StoreKey,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
