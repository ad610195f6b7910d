use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::{domain::QuizStatus, dto::response::DashboardStats},
    repositories::TenantRepositories,
};

pub struct DashboardService {
    repositories: Arc<TenantRepositories>,
}

impl DashboardService {
    pub fn new(repositories: Arc<TenantRepositories>) -> Self {
        Self { repositories }
    }

    /// Counts come from exact-count queries; a failed count reads as zero.
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let repos = &self.repositories;
        let (total_quizzes, active_quizzes, total_participants, total_attempts, completed_attempts) = futures::try_join!(
            repos.quizzes.count_quizzes(None),
            repos.quizzes.count_quizzes(Some(QuizStatus::Active)),
            repos.users.count_users(),
            repos.attempts.count_attempts(false),
            repos.attempts.count_attempts(true),
        )?;

        Ok(DashboardStats {
            total_quizzes,
            active_quizzes,
            total_participants,
            total_attempts,
            completed_attempts,
        })
    }
}
