use std::sync::Arc;

use validator::Validate;

use crate::{
    codec::ShareLink,
    errors::{AppError, AppResult},
    models::{
        domain::{
            NewOption, NewQuestion, NewQuiz, QuestionWithOptions, Quiz, QuizPatch, QuizStatus,
            StoreCoordinates,
        },
        dto::{
            request::{QuizDraft, UpdateQuizRequest},
            response::{QuizStats, ShareLinkResponse},
        },
    },
    repositories::{QuizAttemptRepository, QuizRepository},
    services::html::to_html,
};

pub struct QuizService {
    repository: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    tenant_key: String,
}

impl QuizService {
    pub fn new(
        repository: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        tenant_key: &str,
    ) -> Self {
        Self {
            repository,
            attempts,
            tenant_key: tenant_key.to_string(),
        }
    }

    /// Drops blank options and questions, trims text and turns plain-text
    /// solutions into HTML.
    pub fn normalize_draft(draft: QuizDraft) -> QuizDraft {
        let questions = draft
            .questions
            .into_iter()
            .map(|mut q| {
                q.prompt = q.prompt.trim().to_string();
                q.solution_text = to_html(&q.solution_text);
                q.solution_video_url = q.solution_video_url.trim().to_string();
                q.options.retain(|o| !o.option_text.trim().is_empty());
                q
            })
            .filter(|q| !q.prompt.is_empty() && !q.options.is_empty())
            .collect();

        QuizDraft {
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            questions,
        }
    }

    /// Inserts the quiz, then each question followed by its options. Stops at
    /// the first failed write.
    pub async fn create_quiz(&self, draft: QuizDraft) -> AppResult<Quiz> {
        let draft = Self::normalize_draft(draft);
        draft.validate()?;

        let quiz = self
            .repository
            .insert_quiz(NewQuiz {
                tenant_key: self.tenant_key.clone(),
                title: draft.title,
                description: draft.description,
                status: QuizStatus::Active,
            })
            .await?;

        let question_count = draft.questions.len();
        for question in draft.questions {
            let row = self
                .repository
                .insert_question(NewQuestion {
                    tenant_key: self.tenant_key.clone(),
                    quiz_id: quiz.id.clone(),
                    prompt: question.prompt,
                    solution_text: question.solution_text,
                    solution_video_url: question.solution_video_url,
                })
                .await?;

            let options = question
                .options
                .into_iter()
                .map(|o| NewOption {
                    tenant_key: self.tenant_key.clone(),
                    question_id: row.id.clone(),
                    option_text: o.option_text,
                    is_correct: o.is_correct,
                })
                .collect();
            self.repository.insert_options(options).await?;
        }

        log::info!("Created quiz {} with {} questions", quiz.id, question_count);
        Ok(quiz)
    }

    pub async fn list_quizzes(&self) -> AppResult<Vec<Quiz>> {
        self.repository.list_quizzes().await
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<Quiz> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    pub async fn load_questions(&self, quiz_id: &str) -> AppResult<Vec<QuestionWithOptions>> {
        load_questions(self.repository.as_ref(), quiz_id).await
    }

    /// Only title and description are editable after creation.
    pub async fn update_quiz(&self, id: &str, request: UpdateQuizRequest) -> AppResult<Quiz> {
        request.validate()?;
        let patch = QuizPatch {
            title: request.title.map(|t| t.trim().to_string()),
            description: request.description.map(|d| d.trim().to_string()),
            status: None,
        };
        if patch.is_empty() {
            return Err(AppError::ValidationError("Nothing to update".to_string()));
        }
        self.apply_patch(id, patch).await
    }

    pub async fn stop_quiz(&self, id: &str) -> AppResult<Quiz> {
        let quiz = self
            .apply_patch(
                id,
                QuizPatch {
                    status: Some(QuizStatus::Inactive),
                    ..Default::default()
                },
            )
            .await?;
        log::info!("Stopped quiz {}", id);
        Ok(quiz)
    }

    async fn apply_patch(&self, id: &str, patch: QuizPatch) -> AppResult<Quiz> {
        self.repository
            .update_quiz(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    /// Questions and options go with the quiz through the backend's cascade.
    pub async fn delete_quiz(&self, id: &str) -> AppResult<()> {
        self.repository.delete_quiz(id).await?;
        log::info!("Deleted quiz {}", id);
        Ok(())
    }

    /// Completed attempts and the share of correct answers across all of the
    /// quiz's attempts, as a rounded percentage.
    pub async fn quiz_stats(&self, quiz_id: &str) -> AppResult<QuizStats> {
        let attempts = self.attempts.list_for_quiz(quiz_id).await?;
        let ids: Vec<String> = attempts.iter().map(|a| a.id.clone()).collect();
        let answers = self.attempts.list_answers(&ids).await?;

        let correct = answers.iter().filter(|a| a.is_correct).count();
        let correct_percent = if answers.is_empty() {
            0
        } else {
            ((correct as f64 / answers.len() as f64) * 100.0).round() as u32
        };

        Ok(QuizStats {
            quiz_id: quiz_id.to_string(),
            completed_attempts: attempts.iter().filter(|a| a.is_completed()).count(),
            correct_percent,
        })
    }

    pub fn share_link(coords: &StoreCoordinates, quiz_id: &str, public_base_url: &str) -> ShareLinkResponse {
        let link = ShareLink::new(&coords.store_id, &coords.bucket, quiz_id);
        ShareLinkResponse {
            quiz_id: quiz_id.to_string(),
            path: link.path(),
            url: link.url(public_base_url),
        }
    }
}

/// Questions in creation order, each with its options.
pub async fn load_questions(
    repository: &dyn QuizRepository,
    quiz_id: &str,
) -> AppResult<Vec<QuestionWithOptions>> {
    let questions = repository.list_questions(quiz_id).await?;
    let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
    let options = repository.list_options(&ids).await?;
    Ok(QuestionWithOptions::assemble(questions, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dto::request::{OptionDraft, QuestionDraft};

    fn option(text: &str, correct: bool) -> OptionDraft {
        OptionDraft {
            id: None,
            option_text: text.to_string(),
            is_correct: correct,
        }
    }

    #[test]
    fn test_normalize_drops_blank_content() {
        let draft = QuizDraft {
            title: "  Rust  ".to_string(),
            description: String::new(),
            questions: vec![
                QuestionDraft {
                    prompt: "  Which keyword moves?  ".to_string(),
                    solution_text: "Closures\ncapture".to_string(),
                    solution_video_url: " https://video ".to_string(),
                    options: vec![option("move", true), option("   ", false), option("ref", false)],
                    ..Default::default()
                },
                QuestionDraft {
                    prompt: "   ".to_string(),
                    options: vec![option("a", true)],
                    ..Default::default()
                },
                QuestionDraft {
                    prompt: "No options".to_string(),
                    options: vec![option(" ", true)],
                    ..Default::default()
                },
            ],
        };

        let normalized = QuizService::normalize_draft(draft);
        assert_eq!(normalized.title, "Rust");
        assert_eq!(normalized.questions.len(), 1);

        let question = &normalized.questions[0];
        assert_eq!(question.prompt, "Which keyword moves?");
        assert_eq!(question.solution_text, "<p>Closures<br/>capture</p>");
        assert_eq!(question.solution_video_url, "https://video");
        assert_eq!(question.options.len(), 2);
    }

    #[test]
    fn test_share_link_uses_prefixed_segments() {
        let coords = StoreCoordinates::new("store-1", "fantoms").unwrap();
        let link = QuizService::share_link(&coords, "quiz-9", "https://quiz.example.com/");

        assert!(link.path.starts_with("/q/b-"));
        assert!(link.path.ends_with("/quiz-9"));
        assert_eq!(link.url, format!("https://quiz.example.com{}", link.path));

        let segments: Vec<&str> = link.path.split('/').collect();
        let parsed = ShareLink::from_segments(segments[2], segments[3], segments[4]);
        assert_eq!(parsed, ShareLink::new("store-1", "fantoms", "quiz-9"));
    }
}
