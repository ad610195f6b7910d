use sha2::{Digest, Sha256};

use super::{derive_key, open, seal, Key, PASSWORD_PREFIX, VERIFIER_PREFIX};
use crate::errors::{AppError, AppResult};

const TENANT_SALT_DOMAIN: &str = "fantoms-tenant-salt";
const VERIFY_SALT: &str = "fantoms-verify-salt";
const VERIFY_CONSTANT: &str = "fantoms-password-check";

/// Salt is deterministic per tenant so the same password always derives the
/// same key for a given store address.
pub fn tenant_salt(store_id: &str, bucket: &str) -> [u8; 16] {
    let digest = Sha256::digest(format!("{}|{}|{}", TENANT_SALT_DOMAIN, store_id, bucket));
    let mut salt = [0u8; 16];
    salt.copy_from_slice(&digest[..16]);
    salt
}

pub fn tenant_key_for(password: &str, store_id: &str, bucket: &str) -> Key {
    derive_key(password.as_bytes(), &tenant_salt(store_id, bucket))
}

pub fn encrypt_with_key(key: &Key, text: &str) -> String {
    format!("{}{}", PASSWORD_PREFIX, seal(key, text))
}

/// Values without the `enc:` prefix are returned as is.
pub fn decrypt_with_key(key: &Key, value: &str) -> AppResult<String> {
    let Some(sealed) = value.strip_prefix(PASSWORD_PREFIX) else {
        return Ok(value.to_string());
    };
    open(key, sealed).map_err(|_| AppError::WrongPasswordOrCorruptData)
}

pub fn encrypt_with_password(text: &str, password: &str, store_id: &str, bucket: &str) -> String {
    encrypt_with_key(&tenant_key_for(password, store_id, bucket), text)
}

pub fn decrypt_with_password(
    value: &str,
    password: &str,
    store_id: &str,
    bucket: &str,
) -> AppResult<String> {
    decrypt_with_key(&tenant_key_for(password, store_id, bucket), value)
}

pub fn is_password_encrypted(value: &str) -> bool {
    value.starts_with(PASSWORD_PREFIX)
}

pub fn is_verifier(value: &str) -> bool {
    value.starts_with(VERIFIER_PREFIX)
}

pub fn create_verifier(password: &str) -> String {
    let key = derive_key(password.as_bytes(), VERIFY_SALT.as_bytes());
    format!("{}{}", VERIFIER_PREFIX, seal(&key, VERIFY_CONSTANT))
}

pub fn verify_password(password: &str, verifier: &str) -> bool {
    let Some(sealed) = verifier.strip_prefix(VERIFIER_PREFIX) else {
        return false;
    };
    let key = derive_key(password.as_bytes(), VERIFY_SALT.as_bytes());
    matches!(open(&key, sealed), Ok(plain) if plain == VERIFY_CONSTANT)
}
