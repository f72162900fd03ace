use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

use crate::error::CryptoError;

/// Version byte identifying the ciphertext layout below. Bumped whenever
/// the blob format changes so old ciphertexts fail fast instead of
/// silently decrypting to garbage.
const VERSION: u8 = 1;
const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` under `conversation_key`, producing
/// `version || nonce || ciphertext+tag`.
pub fn encrypt(conversation_key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(conversation_key));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    let body = cipher
        .encrypt(&nonce, plaintext)
        .expect("chacha20poly1305 encryption does not fail for in-memory buffers");

    let mut blob = Vec::with_capacity(1 + NONCE_LEN + body.len());
    blob.push(VERSION);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&body);
    blob
}

/// Decrypt a blob produced by [`encrypt`]. Any version mismatch or MAC
/// failure is reported as [`CryptoError::DecryptFailed`] /
/// [`CryptoError::UnsupportedVersion`] — callers typically just skip the
/// event rather than propagate the error further.
pub fn decrypt(conversation_key: &[u8; 32], blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if blob.len() < 1 + NONCE_LEN {
        return Err(CryptoError::CiphertextTooShort);
    }
    let version = blob[0];
    if version != VERSION {
        return Err(CryptoError::UnsupportedVersion(version));
    }
    let nonce = Nonce::from_slice(&blob[1..1 + NONCE_LEN]);
    let ciphertext = &blob[1 + NONCE_LEN..];

    let cipher = ChaCha20Poly1305::new(Key::from_slice(conversation_key));
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::DecryptFailed)
}
