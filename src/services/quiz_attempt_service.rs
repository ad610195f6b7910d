use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use rand::seq::SliceRandom;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{AttemptCompletion, NewAnswer, NewAttempt, QuestionWithOptions, QuizAttempt, QuizStatus, QuizUser},
        dto::{
            request::{ParticipantLogin, SubmitAttemptRequest, SubmittedAnswer},
            response::{AttemptResult, ParticipantSession, PublicQuiz, QuestionReview},
        },
    },
    repositories::{QuizAttemptRepository, QuizRepository, QuizUserRepository},
    services::{html::sanitize_html, quiz_service::load_questions},
};

/// Outcome of grading one submission, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedAttempt {
    pub score: i32,
    pub answers: Vec<GradedAnswer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradedAnswer {
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub is_correct: bool,
}

pub struct QuizAttemptService {
    quizzes: Arc<dyn QuizRepository>,
    users: Arc<dyn QuizUserRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    tenant_key: String,
}

impl QuizAttemptService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        users: Arc<dyn QuizUserRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        tenant_key: &str,
    ) -> Self {
        Self {
            quizzes,
            users,
            attempts,
            tenant_key: tenant_key.to_string(),
        }
    }

    /// Quiz as a participant sees it: options shuffled, correctness withheld.
    pub async fn public_quiz(&self, quiz_id: &str) -> AppResult<PublicQuiz> {
        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;

        let mut questions = load_questions(self.quizzes.as_ref(), quiz_id).await?;
        shuffle_options(&mut questions);
        Ok(PublicQuiz::new(&quiz, &questions))
    }

    pub async fn login(&self, credentials: &ParticipantLogin) -> AppResult<ParticipantSession> {
        let user = self.authenticate(credentials).await?;
        log::info!("Participant {} logged in", user.user_id);
        Ok(ParticipantSession::from(&user))
    }

    /// Credentials are checked again here; a login response is not a token.
    pub async fn start_attempt(&self, quiz_id: &str, credentials: &ParticipantLogin) -> AppResult<QuizAttempt> {
        let user = self.authenticate(credentials).await?;
        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;

        if quiz.status != QuizStatus::Active {
            return Err(AppError::ValidationError(
                "Quiz is no longer accepting attempts".to_string(),
            ));
        }

        let attempt = self
            .attempts
            .insert_attempt(NewAttempt {
                tenant_key: self.tenant_key.clone(),
                quiz_id: quiz.id,
                quiz_user_id: user.id,
            })
            .await?;
        log::info!("Started attempt {} for participant {}", attempt.id, user.user_id);
        Ok(attempt)
    }

    /// Grades the submission, writes the answers and closes the attempt.
    pub async fn submit_attempt(
        &self,
        quiz_id: &str,
        attempt_id: &str,
        request: SubmitAttemptRequest,
    ) -> AppResult<AttemptResult> {
        request.validate()?;
        let user = self.authenticate(&request.participant).await?;

        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id)))?;

        if attempt.quiz_id != quiz_id || attempt.quiz_user_id != user.id {
            return Err(AppError::Unauthorized(
                "Attempt does not belong to this participant".to_string(),
            ));
        }
        if attempt.is_completed() {
            return Err(AppError::ValidationError("Attempt already submitted".to_string()));
        }

        let questions = load_questions(self.quizzes.as_ref(), quiz_id).await?;
        let graded = grade_attempt(&questions, &request.answers);

        let answers = graded
            .answers
            .iter()
            .map(|a| NewAnswer {
                tenant_key: self.tenant_key.clone(),
                attempt_id: attempt.id.clone(),
                question_id: a.question_id.clone(),
                selected_option_id: a.selected_option_id.clone(),
                is_correct: a.is_correct,
            })
            .collect();
        self.attempts.insert_answers(answers).await?;

        let completed_at = Utc::now();
        let completion = AttemptCompletion {
            score: graded.score,
            completed_at,
        };
        let completed = match self.attempts.complete_attempt(&attempt.id, completion).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(AppError::NotFound(format!(
                "Attempt with id '{}' not found",
                attempt.id
            ))),
            Err(err) => Err(err),
        };
        if let Err(err) = completed {
            // The attempt stays open, so its answers go too and a retry starts clean.
            if let Err(cleanup) = self.attempts.remove_answers(&attempt.id).await {
                log::error!("Failed to remove answers of attempt {}: {}", attempt.id, cleanup);
            }
            return Err(err);
        }

        log::info!(
            "Attempt {} scored {}/{}",
            attempt.id,
            graded.score,
            questions.len()
        );

        Ok(AttemptResult {
            attempt_id: attempt.id,
            score: graded.score,
            total: questions.len(),
            completed_at,
            review: review(&questions, &graded),
        })
    }

    async fn authenticate(&self, credentials: &ParticipantLogin) -> AppResult<QuizUser> {
        credentials.validate()?;
        self.users
            .find_by_credentials(credentials.user_id.trim(), &credentials.password)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid user ID or password".to_string()))
    }
}

/// Grade a quiz attempt based on submitted answers. Every question of the
/// quiz gets an answer row; a question left blank is incorrect, and answers
/// for unknown questions are ignored.
pub fn grade_attempt(questions: &[QuestionWithOptions], submitted: &[SubmittedAnswer]) -> GradedAttempt {
    let selections: HashMap<&str, Option<&str>> = submitted
        .iter()
        .map(|a| (a.question_id.as_str(), a.selected_option_id.as_deref()))
        .collect();

    let answers: Vec<GradedAnswer> = questions
        .iter()
        .map(|question| {
            let selected = selections
                .get(question.question.id.as_str())
                .copied()
                .flatten();
            let is_correct = match (selected, question.correct_option()) {
                (Some(selected), Some(correct)) => selected == correct.id,
                _ => false,
            };
            GradedAnswer {
                question_id: question.question.id.clone(),
                selected_option_id: selected.map(str::to_string),
                is_correct,
            }
        })
        .collect();

    GradedAttempt {
        score: answers.iter().filter(|a| a.is_correct).count() as i32,
        answers,
    }
}

fn review(questions: &[QuestionWithOptions], graded: &GradedAttempt) -> Vec<QuestionReview> {
    questions
        .iter()
        .zip(graded.answers.iter())
        .map(|(question, answer)| {
            let correct = question.correct_option();
            QuestionReview {
                question_id: question.question.id.clone(),
                prompt: question.question.prompt.clone(),
                selected_option_id: answer.selected_option_id.clone(),
                correct_option_id: correct.map(|o| o.id.clone()),
                correct_option_text: correct.map(|o| o.option_text.clone()),
                is_correct: answer.is_correct,
                solution_html: sanitize_html(question.question.solution_text.as_deref().unwrap_or_default()),
                solution_video_url: question
                    .question
                    .solution_video_url
                    .clone()
                    .filter(|url| !url.trim().is_empty()),
            }
        })
        .collect()
}

pub fn shuffle_options(questions: &mut [QuestionWithOptions]) {
    let mut rng = rand::thread_rng();
    for question in questions.iter_mut() {
        question.options.shuffle(&mut rng);
    }
}
