#[cfg(test)]
pub mod fixtures {
    use chrono::Utc;

    use crate::models::domain::{Question, QuestionWithOptions, Quiz, QuizOption, QuizStatus};

    /// Creates a quiz row as the backend returns it
    pub fn test_quiz(id: &str, status: QuizStatus) -> Quiz {
        Quiz {
            id: id.to_string(),
            tenant_key: Some("tenant".to_string()),
            title: format!("Quiz {}", id),
            description: None,
            status,
            created_at: Some(Utc::now()),
        }
    }

    /// Creates a question with the given `(option_id, is_correct)` options
    pub fn question_with_options(id: &str, options: &[(&str, bool)]) -> QuestionWithOptions {
        QuestionWithOptions {
            question: Question {
                id: id.to_string(),
                tenant_key: None,
                quiz_id: "quiz-1".to_string(),
                prompt: format!("Prompt for {}", id),
                solution_text: None,
                solution_video_url: None,
                created_at: None,
            },
            options: options
                .iter()
                .map(|(option_id, correct)| QuizOption {
                    id: option_id.to_string(),
                    tenant_key: None,
                    question_id: id.to_string(),
                    option_text: format!("Option {}", option_id),
                    is_correct: *correct,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::QuizStatus;

    #[test]
    fn test_fixtures_quiz() {
        let quiz = test_quiz("q1", QuizStatus::Inactive);
        assert_eq!(quiz.title, "Quiz q1");
        assert_eq!(quiz.status, QuizStatus::Inactive);
    }

    #[test]
    fn test_fixtures_question_with_options() {
        let question = question_with_options("q1", &[("a", false), ("b", true)]);
        assert_eq!(question.options.len(), 2);
        assert_eq!(question.correct_option().map(|o| o.id.as_str()), Some("b"));
        assert!(question.options.iter().all(|o| o.question_id == "q1"));
    }
}
