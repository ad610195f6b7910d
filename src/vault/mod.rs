//! Credential Vault Adapter: reads and writes a tenant's credential document
//! and applies field encryption on the way in and out.

pub mod pantry;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::{
    crypto::{self, fixed_secret, password, Key},
    errors::{AppError, AppResult},
    models::domain::{credentials::PASSWORD_VERIFIER, CredentialDocument, StoreCoordinates},
};

pub use pantry::PantryVault;

/// Raw document storage. Implementations neither encrypt nor merge: `store`
/// replaces whatever was there.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VaultStore: Send + Sync {
    async fn fetch(&self, coords: &StoreCoordinates) -> AppResult<CredentialDocument>;
    async fn store(&self, coords: &StoreCoordinates, document: &CredentialDocument) -> AppResult<()>;
}

#[derive(Clone, Debug)]
pub enum EncryptionMode {
    FixedSecret,
    Password(SecretString),
}

impl EncryptionMode {
    /// Blank or missing passwords select fixed-secret mode.
    pub fn from_password(password: Option<&str>) -> Self {
        match password.map(str::trim) {
            Some(pw) if !pw.is_empty() => EncryptionMode::Password(SecretString::from(pw.to_string())),
            _ => EncryptionMode::FixedSecret,
        }
    }
}

#[derive(Clone)]
pub struct CredentialVault {
    store: Arc<dyn VaultStore>,
}

impl CredentialVault {
    pub fn new(store: Arc<dyn VaultStore>) -> Self {
        Self { store }
    }

    pub async fn load_raw(&self, coords: &StoreCoordinates) -> AppResult<CredentialDocument> {
        self.store.fetch(coords).await
    }

    pub async fn save_raw(&self, coords: &StoreCoordinates, document: &CredentialDocument) -> AppResult<()> {
        self.store.store(coords, document).await
    }

    pub async fn load(&self, coords: &StoreCoordinates, mode: &EncryptionMode) -> AppResult<CredentialDocument> {
        let stored = self.store.fetch(coords).await?;
        let coords = coords.clone();
        let mode = mode.clone();
        run_blocking(move || decrypt_document(stored, &coords, &mode)).await
    }

    /// Encrypts and replaces the stored document. Last write wins.
    pub async fn save(
        &self,
        coords: &StoreCoordinates,
        document: CredentialDocument,
        mode: &EncryptionMode,
    ) -> AppResult<()> {
        let encrypted = {
            let coords = coords.clone();
            let mode = mode.clone();
            run_blocking(move || Ok(encrypt_document(document, &coords, &mode))).await?
        };
        self.store.store(coords, &encrypted).await?;
        log::info!("Stored credential document for bucket '{}'", coords.bucket);
        Ok(())
    }
}

/// Key derivation runs 100k PBKDF2 rounds; keep it off the async workers.
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalError(format!("Encryption task failed: {}", e)))?
}

pub fn encrypt_document(
    mut document: CredentialDocument,
    coords: &StoreCoordinates,
    mode: &EncryptionMode,
) -> CredentialDocument {
    match mode {
        EncryptionMode::FixedSecret => {
            document.remove(PASSWORD_VERIFIER);
            for field in fixed_secret::ENCRYPTED_FIELDS {
                if let Some(Value::String(plain)) = document.0.get_mut(field) {
                    if !plain.is_empty() {
                        *plain = fixed_secret::encrypt(plain);
                    }
                }
            }
        }
        EncryptionMode::Password(secret) => {
            let pw = secret.expose_secret();
            let key = password::tenant_key_for(pw, &coords.store_id, &coords.bucket);
            for (name, value) in document.0.iter_mut() {
                if name == PASSWORD_VERIFIER {
                    continue;
                }
                if let Value::String(plain) = value {
                    if !plain.is_empty() && !password::is_verifier(plain) {
                        *plain = password::encrypt_with_key(&key, plain);
                    }
                }
            }
            document.set(PASSWORD_VERIFIER, password::create_verifier(pw));
        }
    }
    document
}

pub fn decrypt_document(
    mut document: CredentialDocument,
    coords: &StoreCoordinates,
    mode: &EncryptionMode,
) -> AppResult<CredentialDocument> {
    let password = match mode {
        EncryptionMode::Password(secret) => Some(secret.expose_secret()),
        EncryptionMode::FixedSecret => None,
    };

    if let (Some(pw), Some(verifier)) = (password, document.get_str(PASSWORD_VERIFIER)) {
        if !password::verify_password(pw, verifier) {
            log::warn!("Password verifier mismatch for bucket '{}'", coords.bucket);
            return Err(AppError::WrongPasswordOrCorruptData);
        }
    }

    let mut key: Option<Key> = None;
    for (name, value) in document.0.iter_mut() {
        let Value::String(stored) = value else {
            continue;
        };

        if password::is_password_encrypted(stored) {
            let pw = password.ok_or(AppError::WrongPasswordOrCorruptData)?;
            let key = key.get_or_insert_with(|| {
                password::tenant_key_for(pw, &coords.store_id, &coords.bucket)
            });
            *stored = password::decrypt_with_key(key, stored)?;
        } else if password::is_verifier(stored) {
            continue;
        } else if fixed_secret::is_encrypted_field(name) {
            *stored = crypto::decrypt(stored);
        }
    }
    Ok(document)
}
