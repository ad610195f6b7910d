use async_trait::async_trait;

use super::quiz_repository::first_row;
use crate::{
    errors::AppResult,
    models::domain::{quiz_user::QUIZ_USERS_TABLE, NewQuizUser, QuizUser},
    rest::{Query, RestClient, RestEnv},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizUserRepository: Send + Sync {
    async fn list_users(&self) -> AppResult<Vec<QuizUser>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizUser>>;
    /// Plaintext equality match on both fields.
    async fn find_by_credentials(&self, user_id: &str, password: &str) -> AppResult<Option<QuizUser>>;
    async fn insert_user(&self, user: NewQuizUser) -> AppResult<QuizUser>;
    async fn count_users(&self) -> AppResult<u64>;
}

pub struct RestQuizUserRepository {
    client: RestClient,
    env: RestEnv,
}

impl RestQuizUserRepository {
    pub fn new(client: RestClient, env: RestEnv) -> Self {
        Self { client, env }
    }

    async fn find_one(&self, query: Query) -> AppResult<Option<QuizUser>> {
        let rows: Vec<QuizUser> = self
            .client
            .select(&self.env, QUIZ_USERS_TABLE, &query.limit(1))
            .await
            .into_rows()?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl QuizUserRepository for RestQuizUserRepository {
    async fn list_users(&self) -> AppResult<Vec<QuizUser>> {
        let query = Query::new().select("*").order("created_at", true);
        self.client
            .select(&self.env, QUIZ_USERS_TABLE, &query)
            .await
            .into_rows()
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizUser>> {
        self.find_one(Query::new().select("*").eq("id", id)).await
    }

    async fn find_by_credentials(&self, user_id: &str, password: &str) -> AppResult<Option<QuizUser>> {
        self.find_one(
            Query::new()
                .select("*")
                .eq("user_id", user_id)
                .eq("password", password),
        )
        .await
    }

    async fn insert_user(&self, user: NewQuizUser) -> AppResult<QuizUser> {
        let rows = self
            .client
            .insert(&self.env, QUIZ_USERS_TABLE, &[user])
            .await
            .into_rows()?;
        first_row(rows, QUIZ_USERS_TABLE)
    }

    async fn count_users(&self) -> AppResult<u64> {
        Ok(self
            .client
            .count(&self.env, QUIZ_USERS_TABLE, &Query::new())
            .await
            .unwrap_or(0))
    }
}
