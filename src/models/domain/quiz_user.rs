use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const QUIZ_USERS_TABLE: &str = "quiz_users";

/// A quiz participant. The password is stored and compared as plaintext.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewQuizUser {
    pub tenant_key: String,
    pub user_id: String,
    pub name: String,
    pub password: String,
}

impl NewQuizUser {
    pub fn new(tenant_key: &str, name: &str, password: &str) -> Self {
        NewQuizUser {
            tenant_key: tenant_key.to_string(),
            user_id: generate_user_id(name),
            name: name.trim().to_string(),
            password: password.to_string(),
        }
    }
}

/// Derives a login handle from a display name: `"Ada Lovelace"` becomes
/// something like `ada_lovelace_4821`.
pub fn generate_user_id(name: &str) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..10000);
    format!("{}_{}", user_id_stem(name), suffix)
}

fn user_id_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.trim().to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' {
            stem.push(ch);
        }
    }

    if stem.is_empty() {
        "user".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
impl QuizUser {
    pub fn test_user(id: &str, user_id: &str, password: &str) -> Self {
        QuizUser {
            id: id.to_string(),
            tenant_key: None,
            user_id: user_id.to_string(),
            name: "Test User".to_string(),
            password: password.to_string(),
            created_at: Some(Utc::now()),
        }
    }
}
