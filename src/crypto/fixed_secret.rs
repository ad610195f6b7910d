use once_cell::sync::Lazy;

use super::{derive_key, open, seal, split_sealed, Key};

const PASSPHRASE: &str = "SatvikSingh";
const SALT: &str = "fantoms-salt";

/// Fields encrypted under the fixed application secret.
pub const ENCRYPTED_FIELDS: [&str; 3] = ["supabaseUrl", "supabaseAnonKey", "openrouterKey"];

static FIXED_KEY: Lazy<Key> = Lazy::new(|| derive_key(PASSPHRASE.as_bytes(), SALT.as_bytes()));

pub fn encrypt(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    seal(&FIXED_KEY, text)
}

/// Values that are not `iv:cipher` shaped, or that fail to decrypt, are
/// returned unchanged so documents written before encryption still load.
pub fn decrypt(encrypted: &str) -> String {
    if encrypted.is_empty() {
        return String::new();
    }
    if split_sealed(encrypted).is_none() {
        return encrypted.to_string();
    }

    match open(&FIXED_KEY, encrypted) {
        Ok(plain) => plain,
        Err(err) => {
            log::warn!("Fixed-secret decryption failed ({:?}), keeping stored value", err);
            encrypted.to_string()
        }
    }
}

pub fn is_encrypted_field(name: &str) -> bool {
    ENCRYPTED_FIELDS.contains(&name)
}
