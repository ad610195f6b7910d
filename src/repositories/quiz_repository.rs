use async_trait::async_trait;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        quiz::{OPTIONS_TABLE, QUESTIONS_TABLE, QUIZZES_TABLE},
        NewOption, NewQuestion, NewQuiz, Question, Quiz, QuizOption, QuizPatch, QuizStatus,
    },
    rest::{Query, RestClient, RestEnv},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn list_quizzes(&self) -> AppResult<Vec<Quiz>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
    async fn insert_quiz(&self, quiz: NewQuiz) -> AppResult<Quiz>;
    async fn update_quiz(&self, id: &str, patch: QuizPatch) -> AppResult<Option<Quiz>>;
    async fn delete_quiz(&self, id: &str) -> AppResult<()>;
    async fn count_quizzes(&self, status: Option<QuizStatus>) -> AppResult<u64>;

    /// Questions of a quiz in creation order.
    async fn list_questions(&self, quiz_id: &str) -> AppResult<Vec<Question>>;
    async fn insert_question(&self, question: NewQuestion) -> AppResult<Question>;
    async fn list_options(&self, question_ids: &[String]) -> AppResult<Vec<QuizOption>>;
    async fn insert_options(&self, options: Vec<NewOption>) -> AppResult<Vec<QuizOption>>;
}

pub struct RestQuizRepository {
    client: RestClient,
    env: RestEnv,
}

impl RestQuizRepository {
    pub fn new(client: RestClient, env: RestEnv) -> Self {
        Self { client, env }
    }
}

/// First row of a `return=representation` response.
pub(crate) fn first_row<T>(rows: Vec<T>, table: &str) -> AppResult<T> {
    rows.into_iter().next().ok_or_else(|| {
        AppError::InternalError(format!("Backend returned no row for insert into {}", table))
    })
}

#[async_trait]
impl QuizRepository for RestQuizRepository {
    async fn list_quizzes(&self) -> AppResult<Vec<Quiz>> {
        let query = Query::new().select("*").order("created_at", true);
        self.client
            .select(&self.env, QUIZZES_TABLE, &query)
            .await
            .into_rows()
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let query = Query::new().select("*").eq("id", id).limit(1);
        let rows: Vec<Quiz> = self
            .client
            .select(&self.env, QUIZZES_TABLE, &query)
            .await
            .into_rows()?;
        Ok(rows.into_iter().next())
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> AppResult<Quiz> {
        let rows = self
            .client
            .insert(&self.env, QUIZZES_TABLE, &[quiz])
            .await
            .into_rows()?;
        first_row(rows, QUIZZES_TABLE)
    }

    async fn update_quiz(&self, id: &str, patch: QuizPatch) -> AppResult<Option<Quiz>> {
        let filter = Query::new().eq("id", id);
        let rows: Vec<Quiz> = self
            .client
            .update(&self.env, QUIZZES_TABLE, &filter, &patch)
            .await
            .into_rows()?;
        Ok(rows.into_iter().next())
    }

    async fn delete_quiz(&self, id: &str) -> AppResult<()> {
        let filter = Query::new().eq("id", id);
        self.client
            .remove(&self.env, QUIZZES_TABLE, &filter)
            .await
            .into_result()?;
        Ok(())
    }

    async fn count_quizzes(&self, status: Option<QuizStatus>) -> AppResult<u64> {
        let filter = match status {
            Some(status) => Query::new().eq("status", status.as_str()),
            None => Query::new(),
        };
        Ok(self
            .client
            .count(&self.env, QUIZZES_TABLE, &filter)
            .await
            .unwrap_or(0))
    }

    async fn list_questions(&self, quiz_id: &str) -> AppResult<Vec<Question>> {
        let query = Query::new()
            .select("*")
            .eq("quiz_id", quiz_id)
            .order("created_at", false);
        self.client
            .select(&self.env, QUESTIONS_TABLE, &query)
            .await
            .into_rows()
    }

    async fn insert_question(&self, question: NewQuestion) -> AppResult<Question> {
        let rows = self
            .client
            .insert(&self.env, QUESTIONS_TABLE, &[question])
            .await
            .into_rows()?;
        first_row(rows, QUESTIONS_TABLE)
    }

    async fn list_options(&self, question_ids: &[String]) -> AppResult<Vec<QuizOption>> {
        if question_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .select("*")
            .in_list("question_id", question_ids);
        self.client
            .select(&self.env, OPTIONS_TABLE, &query)
            .await
            .into_rows()
    }

    async fn insert_options(&self, options: Vec<NewOption>) -> AppResult<Vec<QuizOption>> {
        if options.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .insert(&self.env, OPTIONS_TABLE, &options)
            .await
            .into_rows()
    }
}
