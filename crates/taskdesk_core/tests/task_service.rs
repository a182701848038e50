use taskdesk_core::{
    DashboardSummary, LocalStore, LocalTaskRepository, MemoryStore, StoreKey, Task, TaskDraft,
    TaskFilter, TaskPriority, TaskRepository, TaskService, TaskServiceError, TaskStatus, User,
    DASHBOARD_RECENT_LIMIT,
};
use uuid::Uuid;

fn service(store: &LocalStore<MemoryStore>) -> TaskService<LocalTaskRepository<'_, MemoryStore>> {
    TaskService::new(LocalTaskRepository::new(store))
}

/// Seeds tasks with explicit `updated_at` values so ordering is deterministic.
fn seed(
    store: &LocalStore<MemoryStore>,
    owner: &User,
    rows: &[(&str, TaskStatus, TaskPriority, i64)],
) -> Vec<Task> {
    let repo = LocalTaskRepository::new(store);
    rows.iter()
        .map(|(title, status, priority, updated_at)| {
            let mut task = Task::new(
                owner.id,
                TaskDraft::new(*title).status(*status).priority(*priority),
            );
            task.created_at = *updated_at;
            task.updated_at = *updated_at;
            repo.upsert_task(&task).unwrap();
            task
        })
        .collect()
}

#[test]
fn create_task_applies_defaults_and_trims_title() {
    let store = LocalStore::new(MemoryStore::new());
    let owner = User::new("Ada", "ada@x.com");

    let task = service(&store)
        .create_task(&owner, TaskDraft::new("  Write report  "))
        .unwrap();
    assert_eq!(task.title, "Write report");
    assert_eq!(task.description, "");
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.priority, TaskPriority::Medium);
    assert_eq!(task.user_id, owner.id);
    assert_eq!(task.created_at, task.updated_at);

    let stored: Vec<Task> = store.read(StoreKey::Tasks).unwrap();
    assert_eq!(stored, vec![task]);
}

#[test]
fn create_task_rejects_blank_title() {
    let store = LocalStore::new(MemoryStore::new());
    let owner = User::new("Ada", "ada@x.com");

    let err = service(&store)
        .create_task(&owner, TaskDraft::new("   "))
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::EmptyTitle));
    assert!(store.backend().is_empty());
}

#[test]
fn update_task_preserves_identity_and_created_at() {
    let store = LocalStore::new(MemoryStore::new());
    let owner = User::new("Ada", "ada@x.com");
    let service = service(&store);

    let created = service
        .create_task(
            &owner,
            TaskDraft::new("T1")
                .status(TaskStatus::Pending)
                .priority(TaskPriority::Low),
        )
        .unwrap();

    let updated = service
        .update_task(
            &owner,
            created.id,
            TaskDraft::new("T1")
                .description("done now")
                .status(TaskStatus::Completed)
                .priority(TaskPriority::Low),
        )
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.user_id, owner.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.description, "done now");

    let listed = service.list_tasks(&owner, &TaskFilter::default()).unwrap();
    assert_eq!(listed, vec![updated]);
}

#[test]
fn other_users_tasks_are_invisible() {
    let store = LocalStore::new(MemoryStore::new());
    let ada = User::new("Ada", "ada@x.com");
    let grace = User::new("Grace", "grace@x.com");
    let service = service(&store);

    let task = service.create_task(&ada, TaskDraft::new("private")).unwrap();

    assert!(service.get_task(&grace, task.id).unwrap().is_none());
    let err = service
        .update_task(&grace, task.id, TaskDraft::new("hijack"))
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == task.id));

    service.delete_task(&grace, task.id).unwrap();
    assert_eq!(service.get_task(&ada, task.id).unwrap(), Some(task));
    assert!(service
        .list_tasks(&grace, &TaskFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn update_missing_task_is_not_found() {
    let store = LocalStore::new(MemoryStore::new());
    let owner = User::new("Ada", "ada@x.com");
    let missing = Uuid::new_v4();

    let err = service(&store)
        .update_task(&owner, missing, TaskDraft::new("ghost"))
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(id) if id == missing));
}

#[test]
fn delete_task_removes_owned_task_and_ignores_missing() {
    let store = LocalStore::new(MemoryStore::new());
    let owner = User::new("Ada", "ada@x.com");
    let service = service(&store);

    let task = service.create_task(&owner, TaskDraft::new("temp")).unwrap();
    service.delete_task(&owner, task.id).unwrap();
    service.delete_task(&owner, task.id).unwrap();

    assert!(service.get_task(&owner, task.id).unwrap().is_none());
}

#[test]
fn list_tasks_sorts_by_updated_at_descending() {
    let store = LocalStore::new(MemoryStore::new());
    let owner = User::new("Ada", "ada@x.com");
    seed(
        &store,
        &owner,
        &[
            ("old", TaskStatus::Pending, TaskPriority::Low, 100),
            ("newest", TaskStatus::Pending, TaskPriority::Low, 300),
            ("middle", TaskStatus::Pending, TaskPriority::Low, 200),
            ("middle-tie", TaskStatus::Pending, TaskPriority::Low, 200),
        ],
    );

    let titles: Vec<_> = service(&store)
        .list_tasks(&owner, &TaskFilter::default())
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, vec!["newest", "middle", "middle-tie", "old"]);
}

#[test]
fn list_tasks_applies_search_status_and_priority_filters() {
    let store = LocalStore::new(MemoryStore::new());
    let owner = User::new("Ada", "ada@x.com");
    let tasks = seed(
        &store,
        &owner,
        &[
            ("Buy milk", TaskStatus::Pending, TaskPriority::Low, 100),
            ("Write REPORT", TaskStatus::InProgress, TaskPriority::High, 200),
            ("File taxes", TaskStatus::Completed, TaskPriority::High, 300),
        ],
    );
    let mut with_description = tasks[0].clone();
    with_description.description = "for the quarterly report".to_string();
    LocalTaskRepository::new(&store)
        .upsert_task(&with_description)
        .unwrap();

    let service = service(&store);
    let titles = |filter: TaskFilter| -> Vec<String> {
        service
            .list_tasks(&owner, &filter)
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect()
    };

    let mut search = titles(TaskFilter {
        search: Some("report".to_string()),
        ..TaskFilter::default()
    });
    search.sort();
    assert_eq!(search, vec!["Buy milk", "Write REPORT"]);

    assert_eq!(
        titles(TaskFilter {
            status: Some(TaskStatus::Completed),
            ..TaskFilter::default()
        }),
        vec!["File taxes"]
    );

    assert_eq!(
        titles(TaskFilter {
            search: Some("Re".to_string()),
            priority: Some(TaskPriority::High),
            ..TaskFilter::default()
        }),
        vec!["Write REPORT"]
    );

    assert_eq!(
        titles(TaskFilter {
            search: Some(String::new()),
            ..TaskFilter::default()
        })
        .len(),
        3
    );

    assert!(titles(TaskFilter {
        status: Some(TaskStatus::Pending),
        priority: Some(TaskPriority::High),
        ..TaskFilter::default()
    })
    .is_empty());
}

#[test]
fn dashboard_counts_and_recent_tasks() {
    let store = LocalStore::new(MemoryStore::new());
    let owner = User::new("Ada", "ada@x.com");
    let other = User::new("Grace", "grace@x.com");
    seed(
        &store,
        &owner,
        &[
            ("t1", TaskStatus::Pending, TaskPriority::High, 1),
            ("t2", TaskStatus::Pending, TaskPriority::Low, 2),
            ("t3", TaskStatus::InProgress, TaskPriority::High, 3),
            ("t4", TaskStatus::Completed, TaskPriority::Medium, 4),
            ("t5", TaskStatus::Completed, TaskPriority::Low, 5),
            ("t6", TaskStatus::Completed, TaskPriority::High, 6),
        ],
    );
    seed(
        &store,
        &other,
        &[("foreign", TaskStatus::Pending, TaskPriority::High, 99)],
    );

    let summary = service(&store).dashboard(&owner).unwrap();
    assert_eq!(summary.total, 6);
    assert_eq!(summary.pending, 2);
    assert_eq!(summary.in_progress, 1);
    assert_eq!(summary.completed, 3);
    assert_eq!(summary.high_priority, 3);
    assert_eq!(summary.recent.len(), DASHBOARD_RECENT_LIMIT);

    let recent: Vec<_> = summary.recent.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(recent, vec!["t6", "t5", "t4", "t3", "t2"]);
}

#[test]
fn dashboard_for_user_without_tasks_is_empty() {
    let store = LocalStore::new(MemoryStore::new());
    let owner = User::new("Ada", "ada@x.com");

    let summary = service(&store).dashboard(&owner).unwrap();
    assert_eq!(summary, DashboardSummary::default());
}
