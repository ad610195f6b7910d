use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::prompts::{
        explanation_request_prompt, quiz_request_prompt, EXPLANATION_PROMPT, QUIZ_GENERATOR_PROMPT,
    },
    errors::{AppError, AppResult},
    models::dto::request::{GenerateQuizRequest, QuizDraft},
};

const REFERER: &str = "https://fantoms.app";
const APP_TITLE: &str = "Fantoms";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// A draft with fresh ids on every question and option. Not saved.
    async fn generate(&self, api_key: &SecretString, request: &GenerateQuizRequest) -> AppResult<QuizDraft>;

    /// HTML explanation of why `correct_answer` answers `question`.
    async fn explain(&self, api_key: &SecretString, question: &str, correct_answer: &str) -> AppResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client for OpenRouter.
pub struct OpenRouterGenerator {
    http: reqwest::Client,
    api_base: String,
    models: Vec<String>,
}

impl OpenRouterGenerator {
    pub fn new(api_base: &str, models: Vec<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            models,
        }
    }

    fn headers(api_key: &SecretString) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|_| AppError::ValidationError("AI key contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("HTTP-Referer", HeaderValue::from_static(REFERER));
        headers.insert("X-Title", HeaderValue::from_static(APP_TITLE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Tries each configured model in order and returns the first non-empty
    /// answer.
    async fn complete(&self, api_key: &SecretString, system: &str, prompt: &str) -> AppResult<String> {
        let headers = Self::headers(api_key)?;
        for model in &self.models {
            match self.call_model(&headers, model, system, prompt).await {
                Ok(Some(content)) => return Ok(content),
                Ok(None) => log::warn!("Model {} returned no content", model),
                Err(e) => log::warn!("Model {} failed: {}", model, e),
            }
        }
        Err(AppError::remote(502, "No configured model produced a response"))
    }

    async fn call_model(
        &self,
        headers: &HeaderMap,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> AppResult<Option<String>> {
        let body = ChatRequest {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .headers(headers.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            log::debug!("Model {} answered {}", model, response.status());
            return Ok(None);
        }

        let completion: ChatCompletion = response.json().await?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty()))
    }
}

#[async_trait]
impl QuizGenerator for OpenRouterGenerator {
    async fn generate(&self, api_key: &SecretString, request: &GenerateQuizRequest) -> AppResult<QuizDraft> {
        request.validate()?;
        let prompt = quiz_request_prompt(request.topic.trim(), request.question_count, &request.difficulty);
        let text = self.complete(api_key, QUIZ_GENERATOR_PROMPT, &prompt).await?;

        let mut draft = parse_generated_quiz(&text)?;
        assign_fresh_ids(&mut draft);
        log::info!(
            "Generated quiz '{}' with {} questions",
            draft.title,
            draft.questions.len()
        );
        Ok(draft)
    }

    async fn explain(&self, api_key: &SecretString, question: &str, correct_answer: &str) -> AppResult<String> {
        if question.trim().is_empty() {
            return Err(AppError::ValidationError("Question is required".to_string()));
        }
        let prompt = explanation_request_prompt(question, correct_answer);
        self.complete(api_key, EXPLANATION_PROMPT, &prompt).await
    }
}

/// Slice from the first `{` to the last `}`; models like to wrap JSON in
/// prose or code fences.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_generated_quiz(text: &str) -> AppResult<QuizDraft> {
    let parse_error = |detail: &str| AppError::InternalError(format!("Failed to parse AI-generated quiz: {}", detail));

    let json = extract_json(text).ok_or_else(|| parse_error("no JSON found in response"))?;
    let value: Value = serde_json::from_str(json).map_err(|e| parse_error(&e.to_string()))?;

    let has_title = value
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty());
    let has_questions = value.get("questions").is_some_and(Value::is_array);
    if !has_title || !has_questions {
        return Err(parse_error("invalid quiz structure"));
    }

    serde_json::from_value(value).map_err(|e| parse_error(&e.to_string()))
}

/// Model-supplied ids are never trusted.
pub fn assign_fresh_ids(draft: &mut QuizDraft) {
    for question in draft.questions.iter_mut() {
        question.id = Some(Uuid::new_v4().to_string());
        for option in question.options.iter_mut() {
            option.id = Some(Uuid::new_v4().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const GENERATED: &str = r#"Sure! Here is your quiz:
```json
{
  "title": "Ownership",
  "description": "Borrowing basics",
  "questions": [
    {"id": "1", "prompt": "Who owns a moved value?", "solution_text": "<p>The receiver</p>",
     "options": [{"id": "1", "option_text": "The receiver", "is_correct": true},
                 {"id": "1", "option_text": "The sender", "is_correct": false}]},
    {"prompt": "Can two &mut borrows coexist?",
     "options": [{"option_text": "No", "is_correct": true},
                 {"option_text": "Yes", "is_correct": false}]}
  ]
}
```"#;

    #[test]
    fn test_extract_json_trims_surrounding_prose() {
        assert_eq!(extract_json("x {\"a\": {\"b\": 1}} y"), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json("no braces"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_parse_generated_quiz() {
        let draft = parse_generated_quiz(GENERATED).unwrap();
        assert_eq!(draft.title, "Ownership");
        assert_eq!(draft.questions.len(), 2);
        assert_eq!(draft.questions[1].solution_text, "");
    }

    #[test]
    fn test_parse_requires_title_and_questions() {
        assert!(parse_generated_quiz(r#"{"questions": []}"#).is_err());
        assert!(parse_generated_quiz(r#"{"title": "T"}"#).is_err());
        assert!(parse_generated_quiz(r#"{"title": "T", "questions": "none"}"#).is_err());
        assert!(parse_generated_quiz("I could not do that").is_err());
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let mut draft = parse_generated_quiz(GENERATED).unwrap();
        assign_fresh_ids(&mut draft);

        let mut ids = HashSet::new();
        for question in &draft.questions {
            assert!(ids.insert(question.id.clone().unwrap()));
            for option in &question.options {
                assert!(ids.insert(option.id.clone().unwrap()));
            }
        }
        assert_eq!(ids.len(), 6);
        assert!(!ids.contains("1"));
    }

    #[test]
    fn test_prompts_carry_request_parameters() {
        let prompt = quiz_request_prompt("lifetimes", 7, "hard");
        assert!(prompt.contains("hard level quiz about: lifetimes"));
        assert!(prompt.contains("exactly 7 questions"));
        assert!(explanation_request_prompt("Q?", " ").contains("(not provided)"));
    }
}
