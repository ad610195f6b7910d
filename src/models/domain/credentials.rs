use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult};

pub const SUPABASE_URL: &str = "supabaseUrl";
pub const SUPABASE_ANON_KEY: &str = "supabaseAnonKey";
pub const OPENROUTER_KEY: &str = "openrouterKey";
pub const COLOR_THEME: &str = "colorTheme";
pub const SAVED_AT: &str = "savedAt";
pub const PASSWORD_VERIFIER: &str = "passwordVerifier";

const SEPARATOR: char = '|';

/// Address of one credential document in the vault; also the tenant identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCoordinates {
    pub store_id: String,
    pub bucket: String,
}

impl StoreCoordinates {
    pub fn new(store_id: &str, bucket: &str) -> AppResult<Self> {
        let store_id = store_id.trim();
        let bucket = bucket.trim();
        if store_id.is_empty() || bucket.is_empty() {
            return Err(AppError::ValidationError(
                "Missing storeId or bucket".to_string(),
            ));
        }
        // `|` joins the pair in tenant keys and salts; keeping it out of the
        // store id makes the join unambiguous.
        if store_id.contains(SEPARATOR) {
            return Err(AppError::ValidationError(format!(
                "storeId must not contain '{}'",
                SEPARATOR
            )));
        }
        Ok(Self {
            store_id: store_id.to_string(),
            bucket: bucket.to_string(),
        })
    }

    pub fn tenant_key(&self) -> String {
        crate::codec::tenant_key(&self.store_id, &self.bucket)
    }
}

/// Schemaless JSON object held per tenant in the vault.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CredentialDocument(pub Map<String, Value>);

impl CredentialDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Present and non-blank string field.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get_str(key).filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlays every field of `other` onto this document.
    pub fn merge(&mut self, other: CredentialDocument) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    pub fn touch(&mut self) {
        self.set(SAVED_AT, chrono::Utc::now().to_rfc3339());
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for CredentialDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_are_trimmed_and_required() {
        let coords = StoreCoordinates::new("  store-1 ", "fantoms").unwrap();
        assert_eq!(coords.store_id, "store-1");
        assert!(matches!(
            StoreCoordinates::new("store-1", "  "),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn store_id_cannot_carry_the_pair_separator() {
        assert!(matches!(
            StoreCoordinates::new("a|b", "c"),
            Err(AppError::ValidationError(_))
        ));

        let coords = StoreCoordinates::new("a", "b|c").unwrap();
        assert_eq!(coords.bucket, "b|c");
        assert_ne!(
            crate::crypto::password::tenant_salt(&coords.store_id, &coords.bucket),
            crate::crypto::password::tenant_salt("a", "b")
        );
    }

    #[test]
    fn coordinates_derive_the_codec_tenant_key() {
        let coords = StoreCoordinates::new("store-1", "fantoms").unwrap();
        assert_eq!(coords.tenant_key(), crate::codec::tenant_key("store-1", "fantoms"));
    }

    #[test]
    fn document_is_a_transparent_json_object() {
        let doc: CredentialDocument = serde_json::from_value(json!({
            "supabaseUrl": "https://abc.supabase.co",
            "custom": 42
        }))
        .unwrap();

        assert_eq!(doc.get_str(SUPABASE_URL), Some("https://abc.supabase.co"));
        assert_eq!(doc.get_str("custom"), None);
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({ "supabaseUrl": "https://abc.supabase.co", "custom": 42 })
        );
    }

    #[test]
    fn merge_overwrites_and_keeps_extension_fields() {
        let mut doc = CredentialDocument::new();
        doc.set(COLOR_THEME, "default");
        doc.set("extra", true);

        let mut update = CredentialDocument::new();
        update.set(COLOR_THEME, "ocean");
        doc.merge(update);

        assert_eq!(doc.get_str(COLOR_THEME), Some("ocean"));
        assert_eq!(doc.0.get("extra"), Some(&json!(true)));
    }

    #[test]
    fn non_empty_ignores_blank_values() {
        let mut doc = CredentialDocument::new();
        doc.set(OPENROUTER_KEY, "   ");
        assert_eq!(doc.non_empty(OPENROUTER_KEY), None);
    }
}
