use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct QuizDraft {
    #[validate(length(min = 1, max = 200, message = "Quiz title is required"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(custom(function = "validate_single_correct"))]
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuestionDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub prompt: String,
    #[serde(default)]
    pub solution_text: String,
    #[serde(default)]
    pub solution_video_url: String,
    #[serde(default)]
    pub options: Vec<OptionDraft>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OptionDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub option_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

fn validate_single_correct(questions: &[QuestionDraft]) -> Result<(), ValidationError> {
    for (index, question) in questions.iter().enumerate() {
        let correct = question.options.iter().filter(|o| o.is_correct).count();
        if correct != 1 {
            let mut error = ValidationError::new("single_correct_option");
            error.message = Some(
                format!("Question {} must have exactly one correct option", index + 1).into(),
            );
            return Err(error);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(url(message = "Invalid backend URL"))]
    pub supabase_url: String,

    #[validate(length(min = 1, message = "Anon key is required"))]
    pub supabase_anon_key: String,

    #[serde(default)]
    pub openrouter_key: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateParticipantRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

/// Credentials a participant types on the take page.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ParticipantLogin {
    #[validate(length(min = 1))]
    pub user_id: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(nested)]
    #[serde(flatten)]
    pub participant: ParticipantLogin,

    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub selected_option_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,

    #[validate(range(min = 1, max = 50))]
    pub question_count: u32,

    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExplainRequest {
    #[validate(length(min = 1))]
    pub question: String,

    #[serde(default)]
    pub correct_answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: &[bool]) -> QuestionDraft {
        QuestionDraft {
            prompt: "What is 2 + 2?".to_string(),
            options: correct
                .iter()
                .enumerate()
                .map(|(i, c)| OptionDraft {
                    id: None,
                    option_text: format!("{}", i),
                    is_correct: *c,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_draft_requires_title() {
        let draft = QuizDraft {
            title: String::new(),
            ..Default::default()
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_draft_requires_exactly_one_correct_option() {
        let mut draft = QuizDraft {
            title: "Arithmetic".to_string(),
            questions: vec![question(&[false, true, false])],
            ..Default::default()
        };
        assert!(draft.validate().is_ok());

        draft.questions.push(question(&[true, true]));
        assert!(draft.validate().is_err());

        draft.questions[1] = question(&[false, false]);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_generate_request_uses_camel_case() {
        let request: GenerateQuizRequest = serde_json::from_value(serde_json::json!({
            "topic": "Ownership",
            "questionCount": 5
        }))
        .unwrap();
        assert_eq!(request.question_count, 5);
        assert_eq!(request.difficulty, "medium");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_submit_request_flattens_credentials() {
        let request: SubmitAttemptRequest = serde_json::from_value(serde_json::json!({
            "user_id": "ada_1234",
            "password": "pw",
            "answers": [{ "question_id": "q1", "selected_option_id": null }]
        }))
        .unwrap();
        assert_eq!(request.participant.user_id, "ada_1234");
        assert!(request.answers[0].selected_option_id.is_none());
    }
}
