//! Shared builders for task unit tests.

use std::sync::Arc;

use crate::config::LifecycleConfig;
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskId},
    services::{AddTaskRequest, TaskLifecycleService},
};
use crate::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{User, UserId},
    ports::UserRepository,
};
use mockable::DefaultClock;

pub(super) type TestService =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

pub(super) struct Harness {
    pub service: TestService,
    pub users: Arc<InMemoryUserRepository>,
    pub owner: UserId,
}

impl Harness {
    pub async fn register(&self, id: &str) -> UserId {
        register(&self.users, id).await
    }

    pub async fn add(&self, name: &str) -> Task {
        self.add_for(&self.owner, name).await
    }

    pub async fn add_for(&self, owner: &UserId, name: &str) -> Task {
        self.service
            .add_task(AddTaskRequest::new(owner.clone(), name))
            .await
            .expect("task added")
    }
}

pub(super) async fn harness_with(config: LifecycleConfig) -> Harness {
    let users = Arc::new(InMemoryUserRepository::new());
    let service = TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::clone(&users),
        Arc::new(DefaultClock),
    )
    .with_config(config);
    let owner = register(&users, "alice").await;
    Harness {
        service,
        users,
        owner,
    }
}

pub(super) async fn register(users: &InMemoryUserRepository, id: &str) -> UserId {
    let registered = user_id(id);
    let user =
        User::new(registered.clone(), format!("{id}@example.com"), id).expect("valid user");
    users.store(&user).await.expect("user stored");
    registered
}

pub(super) async fn harness() -> Harness {
    harness_with(LifecycleConfig::default()).await
}

pub(super) fn task_id(value: &str) -> TaskId {
    TaskId::new(value).expect("valid task id")
}

pub(super) fn user_id(value: &str) -> UserId {
    UserId::new(value).expect("valid user id")
}

pub(super) fn task_owned_by(id: &str, owner: &UserId) -> Task {
    Task::new(task_id(id), owner.clone(), id, "", &DefaultClock).expect("valid task")
}
