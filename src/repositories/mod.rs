pub mod quiz_attempt_repository;
pub mod quiz_repository;
pub mod quiz_user_repository;

use std::sync::Arc;

pub use quiz_attempt_repository::{QuizAttemptRepository, RestQuizAttemptRepository};
pub use quiz_repository::{QuizRepository, RestQuizRepository};
pub use quiz_user_repository::{QuizUserRepository, RestQuizUserRepository};

use crate::{
    rest::{RestClient, RestEnv},
    session::TenantSession,
};

/// Table access for one tenant. Built per request from the resolved session.
#[derive(Clone)]
pub struct TenantRepositories {
    pub quizzes: Arc<dyn QuizRepository>,
    pub users: Arc<dyn QuizUserRepository>,
    pub attempts: Arc<dyn QuizAttemptRepository>,
}

impl TenantRepositories {
    pub fn rest(client: &RestClient, env: &RestEnv) -> Self {
        Self {
            quizzes: Arc::new(RestQuizRepository::new(client.clone(), env.clone())),
            users: Arc::new(RestQuizUserRepository::new(client.clone(), env.clone())),
            attempts: Arc::new(RestQuizAttemptRepository::new(client.clone(), env.clone())),
        }
    }
}

/// Builds table access for a resolved tenant.
pub trait RepositoryProvider: Send + Sync {
    fn for_tenant(&self, session: &TenantSession) -> TenantRepositories;
}

/// Backend rows over the tenant's own REST endpoint.
#[derive(Clone, Default)]
pub struct RestRepositoryProvider {
    client: RestClient,
}

impl RestRepositoryProvider {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

impl RepositoryProvider for RestRepositoryProvider {
    fn for_tenant(&self, session: &TenantSession) -> TenantRepositories {
        TenantRepositories::rest(&self.client, &session.rest)
    }
}
