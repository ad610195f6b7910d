use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::Value;

use super::VaultStore;
use crate::{
    errors::{AppError, AppResult},
    models::domain::{CredentialDocument, StoreCoordinates},
};

/// Key-value vault addressed as `<base>/<storeId>/basket/<bucket>`.
#[derive(Clone)]
pub struct PantryVault {
    http: reqwest::Client,
    base_url: String,
}

impl PantryVault {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    fn basket_url(&self, coords: &StoreCoordinates) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::InternalError(format!("Invalid vault base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::InternalError("Vault base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&coords.store_id)
            .push("basket")
            .push(&coords.bucket);
        Ok(url)
    }
}

async fn failure(response: reqwest::Response) -> AppError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = if text.trim().is_empty() {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    } else {
        text
    };
    AppError::remote(status.as_u16(), message)
}

#[async_trait]
impl VaultStore for PantryVault {
    async fn fetch(&self, coords: &StoreCoordinates) -> AppResult<CredentialDocument> {
        let url = self.basket_url(coords)?;
        log::debug!("Fetching credential document for store {}", coords.store_id);

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "No credential document in bucket '{}'",
                coords.bucket
            )));
        }
        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(CredentialDocument::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(CredentialDocument::from(map)),
            other => {
                log::warn!("Vault returned a non-object document ({}), treating as empty", type_name(&other));
                Ok(CredentialDocument::new())
            }
        }
    }

    async fn store(&self, coords: &StoreCoordinates, document: &CredentialDocument) -> AppResult<()> {
        let url = self.basket_url(coords)?;
        log::debug!("Storing credential document for store {}", coords.store_id);

        let response = self.http.put(url).json(document).send().await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
