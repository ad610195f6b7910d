use std::env;

pub const DEFAULT_OPENROUTER_MODELS: &[&str] = &[
    "deepseek/deepseek-chat-v3.1:free",
    "deepseek/deepseek-r1-0528:free",
    "google/gemini-2.0-flash-exp:free",
];

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub vault_base_url: String,
    pub public_base_url: String,
    pub openrouter_api_base: String,
    pub openrouter_models: Vec<String>,
    pub session_file: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            vault_base_url: env::var("VAULT_BASE_URL")
                .unwrap_or_else(|_| "https://getpantry.cloud/apiv1/pantry".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            openrouter_api_base: env::var("OPENROUTER_API_BASE")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            openrouter_models: env::var("OPENROUTER_MODELS")
                .ok()
                .map(|raw| parse_model_list(&raw))
                .filter(|models| !models.is_empty())
                .unwrap_or_else(default_models),
            session_file: env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".fantoms-session.json".to_string()),
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            vault_base_url: "http://127.0.0.1:9/pantry".to_string(),
            public_base_url: "https://quiz.example.com".to_string(),
            openrouter_api_base: "http://127.0.0.1:9/v1".to_string(),
            openrouter_models: vec!["test/model-a".to_string(), "test/model-b".to_string()],
            session_file: "test-session.json".to_string(),
        }
    }
}

fn default_models() -> Vec<String> {
    DEFAULT_OPENROUTER_MODELS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        assert!(!config.vault_base_url.is_empty());
        assert!(!config.openrouter_models.is_empty());
        assert!(config.web_server_port > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.public_base_url, "https://quiz.example.com");
        assert_eq!(config.openrouter_models.len(), 2);
    }

    #[test]
    fn test_parse_model_list_skips_blanks() {
        let models = parse_model_list(" a/one , ,b/two,");
        assert_eq!(models, vec!["a/one".to_string(), "b/two".to_string()]);
    }
}
