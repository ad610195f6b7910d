//! Field-level symmetric encryption for credential documents.
//!
//! Two mutually exclusive encodings exist and are told apart by prefix:
//! fixed-secret values are bare `iv:cipher`, password values are
//! `enc:iv:cipher`, and password verifiers are `verify:iv:cipher`.
//! The fixed-secret passphrase ships with the binary, so that mode is
//! obfuscation only.

pub mod fixed_secret;
pub mod password;

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::Sha256;

pub use fixed_secret::{decrypt, encrypt};
pub use password::{
    create_verifier, decrypt_with_password, encrypt_with_password, verify_password,
};

pub const ITERATIONS: u32 = 100_000;
pub const KEY_LENGTH: usize = 32;
pub const IV_LENGTH: usize = 16;

pub const PASSWORD_PREFIX: &str = "enc:";
pub const VERIFIER_PREFIX: &str = "verify:";

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub type Key = [u8; KEY_LENGTH];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    Malformed,
    Decrypt,
}

pub fn derive_key(passphrase: &[u8], salt: &[u8]) -> Key {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, ITERATIONS, &mut key);
    key
}

/// Encrypts under a fresh random IV and renders `base64(iv):base64(cipher)`.
pub(crate) fn seal(key: &Key, plaintext: &str) -> String {
    let mut iv = [0u8; IV_LENGTH];
    rand::thread_rng().fill_bytes(&mut iv);

    let cipher = Aes256CbcEnc::new(&(*key).into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    format!("{}:{}", BASE64.encode(iv), BASE64.encode(cipher))
}

/// Reverses [`seal`]. Expects exactly one `:` separating IV and ciphertext.
pub(crate) fn open(key: &Key, sealed: &str) -> Result<String, CipherError> {
    let (iv_part, cipher_part) = split_sealed(sealed).ok_or(CipherError::Malformed)?;

    let iv = BASE64.decode(iv_part).map_err(|_| CipherError::Malformed)?;
    let cipher = BASE64
        .decode(cipher_part)
        .map_err(|_| CipherError::Malformed)?;

    let decryptor =
        Aes256CbcDec::new_from_slices(key, &iv).map_err(|_| CipherError::Malformed)?;
    let plain = decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(&cipher)
        .map_err(|_| CipherError::Decrypt)?;

    String::from_utf8(plain).map_err(|_| CipherError::Decrypt)
}

pub(crate) fn split_sealed(sealed: &str) -> Option<(&str, &str)> {
    let mut parts = sealed.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(iv), Some(cipher), None) => Some((iv, cipher)),
        _ => None,
    }
}
