use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            credentials::{COLOR_THEME, OPENROUTER_KEY, SUPABASE_ANON_KEY, SUPABASE_URL},
            CredentialDocument, StoreCoordinates,
        },
        dto::{request::SignupRequest, response::AccountSummary},
    },
    vault::{CredentialVault, EncryptionMode},
};

pub const DEFAULT_COLOR_THEME: &str = "default";

pub struct AccountService {
    vault: CredentialVault,
    mode: EncryptionMode,
}

impl AccountService {
    pub fn new(vault: CredentialVault, mode: EncryptionMode) -> Self {
        Self { vault, mode }
    }

    /// Stores the backend credentials under the chosen coordinates, replacing
    /// anything already there.
    pub async fn signup(&self, coords: &StoreCoordinates, request: SignupRequest) -> AppResult<AccountSummary> {
        request.validate()?;

        let mut document = CredentialDocument::new();
        document.set(SUPABASE_URL, request.supabase_url.trim());
        document.set(SUPABASE_ANON_KEY, request.supabase_anon_key.trim());
        document.set(OPENROUTER_KEY, request.openrouter_key.trim());
        document.touch();

        let has_openrouter_key = !request.openrouter_key.trim().is_empty();
        self.vault.save(coords, document, &self.mode).await?;
        log::info!("Signed up store '{}' bucket '{}'", coords.store_id, coords.bucket);

        Ok(summary(coords, has_openrouter_key))
    }

    /// Requires every credential field; a partial document is an unfinished
    /// signup, not an account.
    pub async fn login(&self, coords: &StoreCoordinates) -> AppResult<AccountSummary> {
        let document = self.vault.load(coords, &self.mode).await?;
        let complete = [SUPABASE_URL, SUPABASE_ANON_KEY, OPENROUTER_KEY]
            .iter()
            .all(|field| document.non_empty(field).is_some());
        if !complete {
            return Err(AppError::ValidationError(
                "Stored credentials incomplete".to_string(),
            ));
        }
        Ok(summary(coords, true))
    }

    /// An empty bucket is seeded with defaults and the seed is returned.
    pub async fn load_settings(&self, coords: &StoreCoordinates) -> AppResult<CredentialDocument> {
        let document = self.load_or_empty(coords).await?;
        if !document.is_empty() {
            return Ok(document);
        }

        let defaults = default_settings();
        self.vault.save(coords, defaults.clone(), &self.mode).await?;
        log::info!("Seeded default settings for bucket '{}'", coords.bucket);
        Ok(defaults)
    }

    /// Read-modify-write: fields not in `changes` keep their stored values.
    pub async fn save_settings(
        &self,
        coords: &StoreCoordinates,
        changes: CredentialDocument,
    ) -> AppResult<CredentialDocument> {
        let mut document = self.load_or_empty(coords).await?;
        document.merge(changes);
        document.touch();
        self.vault.save(coords, document.clone(), &self.mode).await?;
        Ok(document)
    }

    /// A bucket that was never written reads as an empty document.
    async fn load_or_empty(&self, coords: &StoreCoordinates) -> AppResult<CredentialDocument> {
        match self.vault.load(coords, &self.mode).await {
            Err(AppError::NotFound(_)) => Ok(CredentialDocument::new()),
            other => other,
        }
    }

    /// Decrypted document as stored, no defaults applied.
    pub async fn fetch_document(&self, coords: &StoreCoordinates) -> AppResult<CredentialDocument> {
        self.vault.load(coords, &self.mode).await
    }

    pub async fn store_document(&self, coords: &StoreCoordinates, document: CredentialDocument) -> AppResult<()> {
        self.vault.save(coords, document, &self.mode).await
    }
}

pub fn default_settings() -> CredentialDocument {
    let mut document = CredentialDocument::new();
    document.set(COLOR_THEME, DEFAULT_COLOR_THEME);
    document.set(SUPABASE_URL, "");
    document.set(SUPABASE_ANON_KEY, "");
    document.set(OPENROUTER_KEY, "");
    document.touch();
    document
}

fn summary(coords: &StoreCoordinates, has_openrouter_key: bool) -> AccountSummary {
    AccountSummary {
        store_id: coords.store_id.clone(),
        bucket: coords.bucket.clone(),
        tenant_key: coords.tenant_key(),
        has_openrouter_key,
    }
}
