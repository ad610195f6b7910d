use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const QUIZZES_TABLE: &str = "quizzes";
pub const QUESTIONS_TABLE: &str = "questions";
pub const OPTIONS_TABLE: &str = "options";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: QuizStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Active,
    Inactive,
}

impl QuizStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizStatus::Active => "active",
            QuizStatus::Inactive => "inactive",
        }
    }
}

/// Insert payload for the `quizzes` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewQuiz {
    pub tenant_key: String,
    pub title: String,
    pub description: String,
    pub status: QuizStatus,
}

/// PATCH body for `quizzes`; absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QuizPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<QuizStatus>,
}

impl QuizPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    pub quiz_id: String,
    pub prompt: String,
    #[serde(default)]
    pub solution_text: Option<String>,
    #[serde(default)]
    pub solution_video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewQuestion {
    pub tenant_key: String,
    pub quiz_id: String,
    pub prompt: String,
    pub solution_text: String,
    pub solution_video_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    pub question_id: String,
    pub option_text: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewOption {
    pub tenant_key: String,
    pub question_id: String,
    pub option_text: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    pub question: Question,
    pub options: Vec<QuizOption>,
}

impl QuestionWithOptions {
    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    /// Groups options under their questions, keeping question order.
    pub fn assemble(questions: Vec<Question>, options: Vec<QuizOption>) -> Vec<Self> {
        questions
            .into_iter()
            .map(|question| {
                let options = options
                    .iter()
                    .filter(|o| o.question_id == question.id)
                    .cloned()
                    .collect();
                QuestionWithOptions { question, options }
            })
            .collect()
    }
}
