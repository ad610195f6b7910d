use std::{collections::HashMap, sync::Arc};

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{NewQuizUser, QuizAttempt, QuizUser},
        dto::{
            request::{CreateParticipantRequest, ParticipantLogin},
            response::{AttemptSummary, ParticipantDetails},
        },
    },
    repositories::{QuizAttemptRepository, QuizRepository, QuizUserRepository},
};

pub struct QuizUserService {
    repository: Arc<dyn QuizUserRepository>,
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    tenant_key: String,
}

impl QuizUserService {
    pub fn new(
        repository: Arc<dyn QuizUserRepository>,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        tenant_key: &str,
    ) -> Self {
        Self {
            repository,
            quizzes,
            attempts,
            tenant_key: tenant_key.to_string(),
        }
    }

    pub async fn create_participant(&self, request: CreateParticipantRequest) -> AppResult<QuizUser> {
        request.validate()?;
        let new_user = NewQuizUser::new(&self.tenant_key, &request.name, &request.password);
        let created = self.repository.insert_user(new_user).await?;
        log::info!("Created participant {} ({})", created.id, created.user_id);
        Ok(created)
    }

    pub async fn list_participants(&self) -> AppResult<Vec<QuizUser>> {
        self.repository.list_users().await
    }

    pub async fn login(&self, credentials: &ParticipantLogin) -> AppResult<QuizUser> {
        credentials.validate()?;
        self.repository
            .find_by_credentials(credentials.user_id.trim(), &credentials.password)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid user ID or password".to_string()))
    }

    pub async fn participant_details(&self, id: &str) -> AppResult<ParticipantDetails> {
        let participant = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Participant with id '{}' not found", id)))?;

        let attempts = self.attempts.list_for_user(&participant.id).await?;
        let titles: HashMap<String, String> = self
            .quizzes
            .list_quizzes()
            .await?
            .into_iter()
            .map(|q| (q.id, q.title))
            .collect();

        let average_score = average_completed_score(&attempts);
        let attempts = attempts
            .into_iter()
            .map(|a| AttemptSummary {
                quiz_title: titles.get(&a.quiz_id).cloned(),
                attempt_id: a.id,
                quiz_id: a.quiz_id,
                score: a.score,
                completed_at: a.completed_at,
            })
            .collect();

        Ok(ParticipantDetails {
            participant,
            attempts,
            average_score,
        })
    }
}

/// Mean score of completed attempts, rounded to two decimals.
pub fn average_completed_score(attempts: &[QuizAttempt]) -> Option<f64> {
    let scores: Vec<i32> = attempts
        .iter()
        .filter(|a| a.is_completed())
        .filter_map(|a| a.score)
        .collect();
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().map(|s| *s as f64).sum::<f64>() / scores.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attempt(score: Option<i32>, completed: bool) -> QuizAttempt {
        QuizAttempt {
            id: "a".to_string(),
            tenant_key: None,
            quiz_id: "q".to_string(),
            quiz_user_id: "u".to_string(),
            score,
            completed_at: completed.then(Utc::now),
        }
    }

    #[test]
    fn test_average_ignores_open_attempts() {
        let attempts = vec![
            attempt(Some(2), true),
            attempt(Some(1), true),
            attempt(Some(2), true),
            attempt(None, false),
        ];
        assert_eq!(average_completed_score(&attempts), Some(1.67));
    }

    #[test]
    fn test_average_without_completed_attempts() {
        assert_eq!(average_completed_score(&[attempt(None, false)]), None);
        assert_eq!(average_completed_score(&[]), None);
    }
}
