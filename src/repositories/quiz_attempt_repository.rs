use async_trait::async_trait;

use super::quiz_repository::first_row;
use crate::{
    errors::AppResult,
    models::domain::{
        quiz_attempt::{ANSWERS_TABLE, ATTEMPTS_TABLE},
        AttemptCompletion, NewAnswer, NewAttempt, QuizAnswer, QuizAttempt,
    },
    rest::{Query, RestClient, RestEnv},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn insert_attempt(&self, attempt: NewAttempt) -> AppResult<QuizAttempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;
    async fn complete_attempt(&self, id: &str, completion: AttemptCompletion) -> AppResult<Option<QuizAttempt>>;
    async fn list_for_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>>;
    async fn list_for_user(&self, quiz_user_id: &str) -> AppResult<Vec<QuizAttempt>>;
    async fn count_attempts(&self, completed_only: bool) -> AppResult<u64>;

    async fn insert_answers(&self, answers: Vec<NewAnswer>) -> AppResult<Vec<QuizAnswer>>;
    async fn list_answers(&self, attempt_ids: &[String]) -> AppResult<Vec<QuizAnswer>>;
    async fn remove_answers(&self, attempt_id: &str) -> AppResult<()>;
}

pub struct RestQuizAttemptRepository {
    client: RestClient,
    env: RestEnv,
}

impl RestQuizAttemptRepository {
    pub fn new(client: RestClient, env: RestEnv) -> Self {
        Self { client, env }
    }

    async fn list(&self, query: Query) -> AppResult<Vec<QuizAttempt>> {
        self.client
            .select(&self.env, ATTEMPTS_TABLE, &query)
            .await
            .into_rows()
    }
}

#[async_trait]
impl QuizAttemptRepository for RestQuizAttemptRepository {
    async fn insert_attempt(&self, attempt: NewAttempt) -> AppResult<QuizAttempt> {
        let rows = self
            .client
            .insert(&self.env, ATTEMPTS_TABLE, &[attempt])
            .await
            .into_rows()?;
        first_row(rows, ATTEMPTS_TABLE)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let rows = self
            .list(Query::new().select("*").eq("id", id).limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn complete_attempt(&self, id: &str, completion: AttemptCompletion) -> AppResult<Option<QuizAttempt>> {
        let filter = Query::new().eq("id", id);
        let rows: Vec<QuizAttempt> = self
            .client
            .update(&self.env, ATTEMPTS_TABLE, &filter, &completion)
            .await
            .into_rows()?;
        Ok(rows.into_iter().next())
    }

    async fn list_for_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>> {
        self.list(Query::new().select("*").eq("quiz_id", quiz_id))
            .await
    }

    async fn list_for_user(&self, quiz_user_id: &str) -> AppResult<Vec<QuizAttempt>> {
        self.list(
            Query::new()
                .select("*")
                .eq("quiz_user_id", quiz_user_id)
                .order("completed_at", true),
        )
        .await
    }

    async fn count_attempts(&self, completed_only: bool) -> AppResult<u64> {
        let filter = if completed_only {
            Query::new().not_null("completed_at")
        } else {
            Query::new()
        };
        Ok(self
            .client
            .count(&self.env, ATTEMPTS_TABLE, &filter)
            .await
            .unwrap_or(0))
    }

    async fn insert_answers(&self, answers: Vec<NewAnswer>) -> AppResult<Vec<QuizAnswer>> {
        if answers.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .insert(&self.env, ANSWERS_TABLE, &answers)
            .await
            .into_rows()
    }

    async fn list_answers(&self, attempt_ids: &[String]) -> AppResult<Vec<QuizAnswer>> {
        if attempt_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .select("*")
            .in_list("attempt_id", attempt_ids);
        self.client
            .select(&self.env, ANSWERS_TABLE, &query)
            .await
            .into_rows()
    }

    async fn remove_answers(&self, attempt_id: &str) -> AppResult<()> {
        let filter = Query::new().eq("attempt_id", attempt_id);
        self.client
            .remove(&self.env, ANSWERS_TABLE, &filter)
            .await
            .into_result()?;
        Ok(())
    }
}
