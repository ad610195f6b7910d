use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ATTEMPTS_TABLE: &str = "quiz_attempts";
pub const ANSWERS_TABLE: &str = "quiz_answers";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    pub quiz_id: String,
    pub quiz_user_id: String,
    #[serde(default)]
    pub score: Option<i32>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuizAttempt {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewAttempt {
    pub tenant_key: String,
    pub quiz_id: String,
    pub quiz_user_id: String,
}

/// PATCH body written once when an attempt is submitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttemptCompletion {
    pub score: i32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizAnswer {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    pub attempt_id: String,
    pub question_id: String,
    #[serde(default)]
    pub selected_option_id: Option<String>,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewAnswer {
    pub tenant_key: String,
    pub attempt_id: String,
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub is_correct: bool,
}
