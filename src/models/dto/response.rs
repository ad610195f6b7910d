use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    models::domain::{QuestionWithOptions, Quiz, QuizUser, StoreCoordinates},
    session::SessionStatus,
};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Quiz as shown to participants: correctness is withheld.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuiz {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<PublicOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicOption {
    pub id: String,
    pub option_text: String,
}

impl From<&QuestionWithOptions> for PublicQuestion {
    fn from(item: &QuestionWithOptions) -> Self {
        PublicQuestion {
            id: item.question.id.clone(),
            prompt: item.question.prompt.clone(),
            options: item
                .options
                .iter()
                .map(|o| PublicOption {
                    id: o.id.clone(),
                    option_text: o.option_text.clone(),
                })
                .collect(),
        }
    }
}

impl PublicQuiz {
    pub fn new(quiz: &Quiz, questions: &[QuestionWithOptions]) -> Self {
        PublicQuiz {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            questions: questions.iter().map(PublicQuestion::from).collect(),
        }
    }
}

/// Operator view of a quiz, correct answers included.
#[derive(Debug, Clone, Serialize)]
pub struct QuizDetails {
    pub quiz: Quiz,
    pub questions: Vec<QuestionWithOptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantSession {
    pub id: String,
    pub user_id: String,
    pub name: String,
}

impl From<&QuizUser> for ParticipantSession {
    fn from(user: &QuizUser) -> Self {
        ParticipantSession {
            id: user.id.clone(),
            user_id: user.user_id.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionReview {
    pub question_id: String,
    pub prompt: String,
    pub selected_option_id: Option<String>,
    pub correct_option_id: Option<String>,
    pub correct_option_text: Option<String>,
    pub is_correct: bool,
    pub solution_html: String,
    pub solution_video_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptResult {
    pub attempt_id: String,
    pub score: i32,
    pub total: usize,
    pub completed_at: DateTime<Utc>,
    pub review: Vec<QuestionReview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizStats {
    pub quiz_id: String,
    pub completed_attempts: usize,
    pub correct_percent: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_quizzes: u64,
    pub active_quizzes: u64,
    pub total_participants: u64,
    pub total_attempts: u64,
    pub completed_attempts: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummary {
    pub attempt_id: String,
    pub quiz_id: String,
    pub quiz_title: Option<String>,
    pub score: Option<i32>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantDetails {
    pub participant: QuizUser,
    pub attempts: Vec<AttemptSummary>,
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareLinkResponse {
    pub quiz_id: String,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub store_id: String,
    pub bucket: String,
    pub tenant_key: String,
    pub has_openrouter_key: bool,
}

/// Remembered operator session as reported over HTTP. Secrets stay out.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub coordinates: Option<StoreCoordinates>,
    pub state: &'static str,
    pub tenant_key: Option<String>,
    pub error: Option<String>,
}

impl SessionView {
    pub fn new(coordinates: Option<StoreCoordinates>, status: &SessionStatus) -> Self {
        let (state, tenant_key, error) = match status {
            SessionStatus::Idle => ("idle", None, None),
            SessionStatus::Pending => ("pending", None, None),
            SessionStatus::Ready(session) => ("ready", Some(session.tenant_key.clone()), None),
            SessionStatus::Error(message) => ("error", None, Some(message.clone())),
        };
        SessionView {
            coordinates,
            state,
            tenant_key,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{Question, QuizOption, QuizStatus};

    #[test]
    fn test_public_question_hides_correctness() {
        let item = QuestionWithOptions {
            question: Question {
                id: "q1".to_string(),
                tenant_key: None,
                quiz_id: "quiz".to_string(),
                prompt: "Pick one".to_string(),
                solution_text: Some("<p>because</p>".to_string()),
                solution_video_url: None,
                created_at: None,
            },
            options: vec![QuizOption {
                id: "o1".to_string(),
                tenant_key: None,
                question_id: "q1".to_string(),
                option_text: "A".to_string(),
                is_correct: true,
            }],
        };
        let quiz = Quiz {
            id: "quiz".to_string(),
            tenant_key: None,
            title: "T".to_string(),
            description: None,
            status: QuizStatus::Active,
            created_at: None,
        };

        let public = PublicQuiz::new(&quiz, std::slice::from_ref(&item));
        let value = serde_json::to_value(&public).unwrap();
        let rendered = value.to_string();
        assert!(!rendered.contains("is_correct"));
        assert!(!rendered.contains("because"));
        assert_eq!(value["questions"][0]["options"][0]["id"], "o1");
    }
}
